use axum::http::StatusCode;

use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> Problem {
    Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{}", code))
        .with_code(code)
        .with_instance(instance)
}

/// Map domain error to RFC9457 ProblemResponse.
/// Client errors are 4xx and final; store failures are 5xx and retryable.
pub fn map_domain_error(e: &DomainError, instance: &str, request_id: Option<&str>) -> ProblemResponse {
    let problem = match e {
        DomainError::MissingField { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "ATTENDANCE_MISSING_UID",
            "Missing field",
            "Error: UID is required.",
            instance,
        ),
        DomainError::MalformedPayload { reason } => from_parts(
            StatusCode::BAD_REQUEST,
            "ATTENDANCE_MALFORMED_PAYLOAD",
            "Malformed payload",
            format!("Error: {reason}"),
            instance,
        ),
        DomainError::EmptyBatch => from_parts(
            StatusCode::BAD_REQUEST,
            "ATTENDANCE_EMPTY_BATCH",
            "Empty batch",
            "Error: No offline logs to sync.",
            instance,
        ),
        DomainError::BatchTooLarge { limit, .. } => from_parts(
            StatusCode::PAYLOAD_TOO_LARGE,
            "ATTENDANCE_BATCH_TOO_LARGE",
            "Batch too large",
            format!("Error: Offline logs exceed {limit} bytes; sync them in smaller parts."),
            instance,
        ),
        DomainError::NotFound => from_parts(
            StatusCode::NOT_FOUND,
            "ATTENDANCE_LOG_NOT_FOUND",
            "Not found",
            "No attendance has been recorded yet.",
            instance,
        ),
        DomainError::StoreFailure { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Attendance store failure");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "ATTENDANCE_STORE_FAILURE",
                "Internal error",
                "Server error: Failed to log attendance.",
                instance,
            )
        }
    }
    .with_retryable(e.is_retryable());

    match request_id {
        Some(id) => ProblemResponse(problem.with_request_id(id)),
        None => ProblemResponse(problem),
    }
}
