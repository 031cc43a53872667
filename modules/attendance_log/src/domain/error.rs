use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Malformed payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("Batch is empty")]
    EmptyBatch,

    #[error("Batch of {size} bytes exceeds the limit of {limit} bytes")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("Attendance store failure: {message}")]
    StoreFailure { message: String },

    #[error("Attendance log has not been created yet")]
    NotFound,
}

impl DomainError {
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    pub fn store_failure(message: impl Into<String>) -> Self {
        Self::StoreFailure {
            message: message.into(),
        }
    }

    /// Whether a well-behaved client should resend the same request.
    /// Only store failures qualify; client errors would fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreFailure { .. })
    }
}
