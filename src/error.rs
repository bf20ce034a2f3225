use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use serde_json::json;

/// Failures raised by the timekeeping engine and its HTTP collaborators.
///
/// `MalformedTime` never escapes classification or aggregation: both degrade
/// the affected record instead. Session-state violations are the only hard
/// errors of the engine and the caller can recover from them.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum TimekeepingError {
    #[display(fmt = "malformed time value '{}', expected HH:MM", value)]
    MalformedTime { value: String },

    #[display(fmt = "employee {} already has an active session since {}", employee_id, since)]
    AlreadyActive {
        employee_id: u64,
        since: DateTime<Utc>,
    },

    #[display(fmt = "no active work session")]
    NotActive,

    #[display(fmt = "start date {} is after end date {}", start, end)]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[display(fmt = "invalid month '{}', expected YYYY-MM", value)]
    InvalidMonth { value: String },

    #[display(fmt = "unknown scan type '{}', expected checkin or checkout", value)]
    InvalidScanType { value: String },

    #[display(fmt = "export failed: {}", reason)]
    Export { reason: String },

    #[display(fmt = "invalid employee data: {}", reason)]
    InvalidEmployee { reason: String },
}

impl std::error::Error for TimekeepingError {}

impl ResponseError for TimekeepingError {
    fn status_code(&self) -> StatusCode {
        match self {
            TimekeepingError::AlreadyActive { .. } => StatusCode::CONFLICT,
            TimekeepingError::NotActive => StatusCode::NOT_FOUND,
            TimekeepingError::Export { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            TimekeepingError::MalformedTime { .. }
            | TimekeepingError::InvalidDateRange { .. }
            | TimekeepingError::InvalidMonth { .. }
            | TimekeepingError::InvalidScanType { .. }
            | TimekeepingError::InvalidEmployee { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": self.to_string()
        }))
    }
}
