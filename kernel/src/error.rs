use std::fmt::Display;

use error_stack::Context;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KernelError {
    /// The car does not exist or is not published.
    NotAvailable,
    /// The user already holds a reservation overlapping the requested dates.
    DateConflict,
    NotFound,
    Validation,
    Concurrency,
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::NotAvailable => {
                write!(f, "This car is already reserved or does not exist.")
            }
            KernelError::DateConflict => write!(
                f,
                "You already have a reservation in the requested date range. Please choose a different date range."
            ),
            KernelError::NotFound => write!(
                f,
                "Can't find the reservation or you don't have a permission to reach this reservation"
            ),
            KernelError::Validation => write!(f, "The request is invalid."),
            KernelError::Concurrency => write!(f, "Concurrency error"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
