//! Cache store: a thin, fail-open wrapper over a remote key-value backend.
//!
//! Every backend call carries a bounded timeout. On timeout or transport
//! failure the read path degrades to a miss and the write path to a logged
//! no-op; the system must remain fully functional (correct, slower) with the
//! cache entirely unavailable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::envelope::{decode_value, encode_value};
use crate::error::CacheError;
use crate::settings::CacheSettings;

/// The contract a remote key-value cache backend must implement.
///
/// Implementations must be thread-safe (`Send + Sync`). Patterns passed to
/// `delete_pattern` are either exact keys or a prefix followed by `*`.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetches the raw payload stored under `key`, if present and unexpired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `bytes` under `key` with the given time-to-live.
    async fn set(&self, key: &str, bytes: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Deletes `key`. Returns `true` if an entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Deletes every key matching `pattern` and returns how many were
    /// removed. A trailing `*` makes the pattern a prefix match; otherwise
    /// it is an exact key.
    async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError>;

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// Fail-open cache store owning a shared backend handle.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    op_timeout: Duration,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("backend", &self.backend.backend_name())
            .field("op_timeout", &self.op_timeout)
            .finish()
    }
}

impl CacheStore {
    /// Creates a store over `backend` with the default operation timeout.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self::with_settings(backend, &CacheSettings::default())
    }

    /// Creates a store over `backend` with settings-derived timeouts.
    pub fn with_settings(backend: Arc<dyn CacheBackend>, settings: &CacheSettings) -> Self {
        Self {
            backend,
            op_timeout: settings.op_timeout(),
        }
    }

    /// Fetches and decodes the value under `key`.
    ///
    /// Transport errors, timeouts and decode failures are all reported as
    /// `None`; the caller falls through to the backing store.
    pub async fn get_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.get_raw(key).await?;
        match decode_value(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "cached payload undecodable, treating as miss");
                None
            }
        }
    }

    /// Encodes and stores `value` under `key`. Returns `true` if stored.
    ///
    /// Encode failures and backend errors are logged, never propagated.
    pub async fn set_value<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) -> bool {
        let bytes = match encode_value(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key, error = %err, "failed to encode value for cache");
                return false;
            }
        };
        self.set_raw(key, bytes, ttl_secs).await
    }

    /// Fetches the raw envelope bytes under `key`, degrading errors to a
    /// miss.
    pub async fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        let result = tokio::time::timeout(self.op_timeout, self.backend.get(key)).await;
        match result {
            Ok(Ok(found)) => found,
            Ok(Err(err)) => {
                warn!(key, error = %err, "cache get failed, treating as miss");
                None
            }
            Err(_) => {
                warn!(key, "cache get timed out, treating as miss");
                None
            }
        }
    }

    /// Stores raw envelope bytes under `key`. Returns `true` if stored.
    pub async fn set_raw(&self, key: &str, bytes: Vec<u8>, ttl_secs: u64) -> bool {
        let ttl = Duration::from_secs(ttl_secs);
        let result = tokio::time::timeout(self.op_timeout, self.backend.set(key, bytes, ttl)).await;
        match result {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(key, error = %err, "cache set failed, proceeding uncached");
                false
            }
            Err(_) => {
                warn!(key, "cache set timed out, proceeding uncached");
                false
            }
        }
    }

    /// Deletes `key`. Returns `true` if an entry was removed; failures are
    /// logged and reported as `false`.
    pub async fn delete(&self, key: &str) -> bool {
        let result = tokio::time::timeout(self.op_timeout, self.backend.delete(key)).await;
        match result {
            Ok(Ok(removed)) => removed,
            Ok(Err(err)) => {
                warn!(key, error = %err, "cache delete failed");
                false
            }
            Err(_) => {
                warn!(key, "cache delete timed out");
                false
            }
        }
    }

    /// Deletes every key matching `pattern`, returning the removal count
    /// (0 on failure, logged).
    pub async fn delete_pattern(&self, pattern: &str) -> usize {
        let result =
            tokio::time::timeout(self.op_timeout, self.backend.delete_pattern(pattern)).await;
        match result {
            Ok(Ok(count)) => {
                debug!(pattern, count, "cache pattern delete");
                count
            }
            Ok(Err(err)) => {
                warn!(pattern, error = %err, "cache pattern delete failed");
                0
            }
            Err(_) => {
                warn!(pattern, "cache pattern delete timed out");
                0
            }
        }
    }

    /// Name of the underlying backend.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCacheBackend;

    /// Backend that fails every operation, for fail-open tests.
    struct UnreachableBackend;

    #[async_trait]
    impl CacheBackend for UnreachableBackend {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::transport("connection refused"))
        }

        async fn set(&self, _key: &str, _bytes: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::transport("connection refused"))
        }

        async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
            Err(CacheError::transport("connection refused"))
        }

        async fn delete_pattern(&self, _pattern: &str) -> Result<usize, CacheError> {
            Err(CacheError::transport("connection refused"))
        }

        fn backend_name(&self) -> &'static str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn test_set_then_get_round_trip() {
        let store = CacheStore::new(Arc::new(MemoryCacheBackend::new()));
        assert!(store.set_value("doctor:42", &"Dr. Ada".to_string(), 900).await);

        let value: Option<String> = store.get_value("doctor:42").await;
        assert_eq!(value.as_deref(), Some("Dr. Ada"));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = CacheStore::new(Arc::new(MemoryCacheBackend::new()));
        let value: Option<String> = store.get_value("doctor:missing").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend_degrades_to_miss() {
        let store = CacheStore::new(Arc::new(UnreachableBackend));

        let value: Option<String> = store.get_value("doctor:42").await;
        assert!(value.is_none());

        // Writes and deletes report failure without raising.
        assert!(!store.set_value("doctor:42", &"x".to_string(), 900).await);
        assert!(!store.delete("doctor:42").await);
        assert_eq!(store.delete_pattern("doctor:list:*").await, 0);
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_a_miss() {
        let backend = Arc::new(MemoryCacheBackend::new());
        backend
            .set("doctor:42", vec![0x7f, 1, 2], Duration::from_secs(60))
            .await
            .unwrap();

        let store = CacheStore::new(backend);
        let value: Option<String> = store.get_value("doctor:42").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let store = CacheStore::new(Arc::new(MemoryCacheBackend::new()));
        store.set_value("clinic:7", &1u32, 60).await;
        assert!(store.delete("clinic:7").await);
        assert!(!store.delete("clinic:7").await);
    }
}
