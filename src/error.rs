//! Error types for top-of-book reconstruction.
//!
//! The book itself never fails: unknown actions, missing orders and empty
//! sides are ordinary states. Errors come from the edges (decoding, file
//! I/O, configuration) and from explicit invariant checks.

use thiserror::Error;

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, TobError>;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum TobError {
    /// Underlying I/O failure while reading events or writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input ended in the middle of a fixed-size event record
    #[error("Truncated event record at byte offset {offset}: got {len} of {expected} bytes")]
    TruncatedRecord {
        offset: u64,
        len: usize,
        expected: usize,
    },

    /// Book containers disagree with each other
    #[error("Book inconsistency: {0}")]
    InconsistentState(String),

    /// Replay configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Summary (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TobError {
    /// Create an inconsistency error from any string-like type.
    pub fn inconsistent(msg: impl Into<String>) -> Self {
        TobError::InconsistentState(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TobError::TruncatedRecord {
            offset: 52,
            len: 12,
            expected: 26,
        };
        assert_eq!(
            err.to_string(),
            "Truncated event record at byte offset 52: got 12 of 26 bytes"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.bin");
        let err: TobError = io.into();
        assert!(matches!(err, TobError::Io(_)));
        assert!(err.to_string().contains("missing.bin"));
    }

    #[test]
    fn test_result_type() {
        let result: Result<i32> = Err(TobError::inconsistent("level 100 is empty"));
        assert!(result.is_err());
    }
}
