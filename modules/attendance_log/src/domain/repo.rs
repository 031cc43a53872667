use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Nothing has ever been appended.
    #[error("log file does not exist")]
    NotFound,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for the domain layer: the append-only attendance log.
///
/// Implementations must make every `append` atomic with respect to other
/// appends and to `read_all`: the bytes of one call land as a single
/// contiguous run, and a reader never sees half of it.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Append `bytes` at the end of the log, creating the log if needed.
    async fn append(&self, bytes: &[u8]) -> Result<(), StoreError>;
    /// Current log contents, verbatim.
    async fn read_all(&self) -> Result<Vec<u8>, StoreError>;
}
