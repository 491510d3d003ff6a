use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Daily rate in the rental's currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct CarPricePerDay(f64);

impl CarPricePerDay {
    pub fn new(value: impl Into<f64>) -> Self {
        Self(value.into())
    }
}
