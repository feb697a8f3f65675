//! Store error types
//!
//! Journal I/O failures, corruption detected on replay, and lock poisoning
//! all surface through `StoreError`.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the record store and its journal
#[derive(Debug, Error)]
pub enum StoreError {
    /// Journal write or fsync failure
    #[error("Journal write failed: {context}")]
    WriteFailed {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Journal read failure
    #[error("Journal read failed: {context}")]
    ReadFailed {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Corrupted journal entry detected at a byte offset
    #[error("Journal corruption at offset {offset}: {reason}")]
    Corruption { offset: u64, reason: String },

    /// Record body could not be serialized or deserialized
    #[error("Record serialization failed: {0}")]
    Serialization(String),

    /// A store lock was poisoned by a panicking thread
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Build a `WriteFailed` error with context
    pub fn write_failed(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::WriteFailed {
            context: context.into(),
            source,
        }
    }

    /// Build a `ReadFailed` error with context
    pub fn read_failed(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::ReadFailed {
            context: context.into(),
            source,
        }
    }

    /// Build a `Corruption` error pinned to a byte offset
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self::Corruption {
            offset,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::corruption_at_offset(42, "bad checksum");
        assert_eq!(
            err.to_string(),
            "Journal corruption at offset 42: bad checksum"
        );
    }

    #[test]
    fn test_write_failed_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = StoreError::write_failed("appending entry", io);
        assert!(err.to_string().contains("appending entry"));
    }
}
