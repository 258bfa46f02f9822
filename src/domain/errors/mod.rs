// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Malformed settings (negative sizes, fps < 1, empty paths)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Degenerate or unreadable source media
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Trim window resolves to an empty or inverted range
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    /// Failure surfaced by the transcode or extraction engine
    #[error("Engine failure: {0}")]
    EngineFailure(String),
    /// No frame could be decoded at the requested timestamp
    #[error("Frame not found: {0}")]
    FrameNotFound(String),
    /// Releasing an engine instance failed
    #[error("Resource cleanup failed: {0}")]
    ResourceCleanupFailure(String),
    /// Media probing failed
    #[error("Probe failed: {0}")]
    ProbeFail(String),
    /// File system operation failed
    #[error("File system error: {0}")]
    FsFail(String),
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    /// True for errors raised before any engine resource is acquired
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidArgument(_) | DomainError::InvalidInput(_) | DomainError::InvalidRange(_)
        )
    }
}
