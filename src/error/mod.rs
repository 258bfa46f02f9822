//! Error handling module for vedit

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Process exit code for validation failures
pub const EXIT_INVALID_INPUT: i32 = 2;
/// Process exit code for a job cancelled by the user
pub const EXIT_CANCELED: i32 = 130;

/// Top-level error type for the CLI surface
#[derive(Error, Debug)]
pub enum VeditError {
    /// Validation, probe, engine or filesystem failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Job ended in the cancelled state
    #[error("Transcode canceled")]
    Canceled,

    /// Job ended in the failed state
    #[error("Transcode failed: {message}")]
    TranscodeFailed { message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl VeditError {
    pub fn exit_code(&self) -> i32 {
        match self {
            VeditError::Domain(e) if e.is_validation() => EXIT_INVALID_INPUT,
            VeditError::Canceled => EXIT_CANCELED,
            _ => 1,
        }
    }

    /// Terminal job outcomes were already reported through the lifecycle sink
    pub fn already_reported(&self) -> bool {
        matches!(
            self,
            VeditError::Canceled | VeditError::TranscodeFailed { .. }
        )
    }
}

/// Result type alias for vedit operations
pub type VeditResult<T> = std::result::Result<T, VeditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let invalid = VeditError::from(DomainError::InvalidRange("empty".to_string()));
        assert_eq!(invalid.exit_code(), EXIT_INVALID_INPUT);
        assert_eq!(VeditError::Canceled.exit_code(), EXIT_CANCELED);

        let engine = VeditError::from(DomainError::EngineFailure("boom".to_string()));
        assert_eq!(engine.exit_code(), 1);
        assert!(!engine.already_reported());
    }

    #[test]
    fn test_messages() {
        let failed = VeditError::TranscodeFailed {
            message: "encoder crashed".to_string(),
        };
        assert_eq!(failed.to_string(), "Transcode failed: encoder crashed");
        assert!(failed.already_reported());
        assert_eq!(VeditError::Canceled.to_string(), "Transcode canceled");
    }
}
