//! Error types for the record store seam and grading corrections.
//!
//! Defined in `invigil-core` so session dispatch and the grading helpers can
//! classify store failures without knowing which store implementation is
//! behind the trait. Invalid session transitions are deliberately not errors:
//! the reducer treats stale events as no-ops.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by [`ResultStore`](crate::traits::ResultStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists under the given id.
    #[error("no record with id {0}")]
    NotFound(Uuid),

    /// The backing file or directory could not be read or written.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be parsed, or a record could not be encoded.
    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The store rejected the operation (e.g. duplicate record id).
    #[error("store rejected operation: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Returns `true` when retrying the same operation cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::Rejected(_))
    }
}

/// Errors raised when applying a manual grading correction to a result.
#[derive(Debug, Error)]
pub enum CorrectionError {
    /// The result has no answer entry for the given question id.
    #[error("result has no answer for question '{0}'")]
    UnknownQuestion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_permanent() {
        assert!(StoreError::NotFound(Uuid::nil()).is_permanent());
        let io = StoreError::Io(std::io::Error::other("disk gone"));
        assert!(!io.is_permanent());
    }

    #[test]
    fn error_messages_name_the_subject() {
        let err = CorrectionError::UnknownQuestion("q9".into());
        assert_eq!(err.to_string(), "result has no answer for question 'q9'");
    }
}
