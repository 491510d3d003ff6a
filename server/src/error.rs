use std::process::{ExitCode, Termination};

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::QueryRejection;
use error_stack::{AttachmentKind, FrameKind, Report};
use kernel::KernelError;
use serde::Serialize;

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

impl Termination for StackTrace {
    fn report(self) -> ExitCode {
        self.0.report()
    }
}

/// Body of every failed response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: bool,
    message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub struct ErrorStatus(Report<KernelError>);

impl From<Report<KernelError>> for ErrorStatus {
    fn from(e: Report<KernelError>) -> Self {
        ErrorStatus(e)
    }
}

impl From<JsonRejection> for ErrorStatus {
    fn from(rejection: JsonRejection) -> Self {
        ErrorStatus(Report::new(KernelError::Validation).attach_printable(rejection.body_text()))
    }
}

impl From<QueryRejection> for ErrorStatus {
    fn from(rejection: QueryRejection) -> Self {
        ErrorStatus(Report::new(KernelError::Validation).attach_printable(rejection.to_string()))
    }
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> axum::response::Response {
        let context = *self.0.current_context();
        let status = match context {
            KernelError::NotAvailable | KernelError::DateConflict | KernelError::Validation => {
                StatusCode::BAD_REQUEST
            }
            KernelError::NotFound => StatusCode::NOT_FOUND,
            KernelError::Concurrency => StatusCode::CONFLICT,
            KernelError::Timeout | KernelError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match context {
            KernelError::Validation => {
                first_printable(&self.0).unwrap_or_else(|| context.to_string())
            }
            KernelError::Timeout | KernelError::Internal => {
                tracing::error!("{:?}", self.0);
                context.to_string()
            }
            _ => {
                tracing::debug!("{:?}", self.0);
                context.to_string()
            }
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

fn first_printable(report: &Report<KernelError>) -> Option<String> {
    report.frames().find_map(|frame| match frame.kind() {
        FrameKind::Attachment(AttachmentKind::Printable(printable)) => Some(printable.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use error_stack::Report;
    use kernel::KernelError;

    use super::ErrorStatus;

    fn status(error: KernelError) -> StatusCode {
        ErrorStatus::from(Report::new(error)).into_response().status()
    }

    #[test]
    fn status_per_context() {
        assert_eq!(status(KernelError::NotAvailable), StatusCode::BAD_REQUEST);
        assert_eq!(status(KernelError::DateConflict), StatusCode::BAD_REQUEST);
        assert_eq!(status(KernelError::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status(KernelError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(KernelError::Concurrency), StatusCode::CONFLICT);
        assert_eq!(status(KernelError::Internal), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(KernelError::Timeout), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_uses_attached_reason() {
        let report = Report::new(KernelError::Validation).attach_printable("endDate is missing");
        assert_eq!(
            super::first_printable(&report).as_deref(),
            Some("endDate is missing")
        );
    }
}
