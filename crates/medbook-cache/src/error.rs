use std::sync::Arc;

use medbook_storage::StoreError;
use thiserror::Error;

/// Errors that can occur in the caching layer.
///
/// Cloneable so a single origin-fetch outcome can be handed to every caller
/// waiting on the same key's lease.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The cache backend could not be reached. Always degradable: readers
    /// treat it as a miss, writers as a logged no-op.
    #[error("Cache transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// A cache operation exceeded its bounded timeout.
    #[error("Cache operation timed out: {op}")]
    Timeout {
        /// The operation that timed out (get/set/delete/fetch).
        op: &'static str,
    },

    /// A value could not be encoded for storage. Treated as a failed write.
    #[error("Encode error: {message}")]
    Encode {
        /// Description of the encode failure.
        message: String,
    },

    /// A cached payload could not be decoded. Treated as a miss on read.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    /// The origin fetch behind a lease failed. Propagated to every waiter;
    /// the value is never cached.
    #[error("Origin fetch failed: {0}")]
    OriginFetch(Arc<StoreError>),

    /// The lease holder vanished without reporting a result.
    #[error("Lease abandoned without a result")]
    LeaseBroken,
}

impl CacheError {
    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout(op: &'static str) -> Self {
        Self::Timeout { op }
    }

    /// Creates a new `Encode` error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Wraps a backing-store error for propagation to lease waiters.
    #[must_use]
    pub fn origin_fetch(err: StoreError) -> Self {
        Self::OriginFetch(Arc::new(err))
    }

    /// Returns `true` when the read path may treat this error as a plain
    /// cache miss and fall through to the backing store.
    #[must_use]
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::Decode { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CacheError::transport("connection refused");
        assert_eq!(err.to_string(), "Cache transport error: connection refused");

        let err = CacheError::timeout("get");
        assert_eq!(err.to_string(), "Cache operation timed out: get");
    }

    #[test]
    fn test_degradable_classification() {
        assert!(CacheError::transport("down").is_degradable());
        assert!(CacheError::timeout("set").is_degradable());
        assert!(CacheError::decode("bad tag").is_degradable());
        assert!(!CacheError::encode("unrepresentable").is_degradable());
        assert!(!CacheError::origin_fetch(StoreError::internal("boom")).is_degradable());
        assert!(!CacheError::LeaseBroken.is_degradable());
    }

    #[test]
    fn test_origin_fetch_is_cloneable() {
        let err = CacheError::origin_fetch(StoreError::not_found("doctor", "42"));
        let clone = err.clone();
        assert_eq!(err.to_string(), clone.to_string());
    }
}
