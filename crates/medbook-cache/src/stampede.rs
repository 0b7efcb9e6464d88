//! Per-key stampede prevention for origin fetches.
//!
//! N concurrent cache misses for one key must cost exactly one backing-store
//! query. The first caller to miss creates a flight (the lease) and spawns
//! the fetch; everyone else subscribes to the flight's outcome. The fetch
//! runs in its own task, so a waiting caller that is cancelled abandons its
//! wait without cancelling the shared fetch - the result still lands in the
//! cache for subsequent callers.
//!
//! The flight table entry is removed by a drop guard on every exit path
//! (success, origin error, timeout, panic); a leaked lease would block every
//! future miss for that key.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, warn};

use medbook_storage::StoreError;

use crate::envelope::{decode_value, encode_value};
use crate::error::CacheError;
use crate::settings::CacheSettings;
use crate::store::CacheStore;

/// The value shared with every waiter; the flight table is keyed by string,
/// so the payload is type-erased and waiters downcast back to their `T`.
type FlightPayload = Arc<dyn Any + Send + Sync>;

/// Shared state of one in-flight origin fetch.
#[derive(Clone)]
enum FlightState {
    Pending,
    Done(Result<FlightPayload, CacheError>),
}

type FlightTable = DashMap<String, watch::Receiver<FlightState>>;

/// Serializes origin fetches so at most one is in flight per key per
/// process.
pub struct StampedeGuard {
    store: CacheStore,
    flights: Arc<FlightTable>,
    lease_timeout: Duration,
}

impl std::fmt::Debug for StampedeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StampedeGuard")
            .field("in_flight", &self.flights.len())
            .field("lease_timeout", &self.lease_timeout)
            .finish()
    }
}

impl StampedeGuard {
    /// Creates a guard over `store` with the default lease timeout.
    #[must_use]
    pub fn new(store: CacheStore) -> Self {
        Self::with_settings(store, &CacheSettings::default())
    }

    /// Creates a guard with a settings-derived lease timeout.
    #[must_use]
    pub fn with_settings(store: CacheStore, settings: &CacheSettings) -> Self {
        Self {
            store,
            flights: Arc::new(DashMap::new()),
            lease_timeout: settings.lease_timeout(),
        }
    }

    /// Number of fetches currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.flights.len()
    }

    /// Cache-aside read with double-checked locking.
    ///
    /// 1. Return the cached value if present.
    /// 2. Otherwise acquire (or join) the key's flight.
    /// 3. The flight holder re-checks the cache, then runs `fetch` under the
    ///    lease timeout; a successful value is stored with `ttl_secs` and
    ///    broadcast, a failure is broadcast uncached.
    ///
    /// Every waiter observes the single fetch's outcome and clones the shared
    /// value; origin errors are propagated to all of them and never cached.
    /// Cache encode/store failures are not caller-visible: the fetched value
    /// is delivered as if the cache were absent.
    pub async fn with_lease<T, F, Fut>(
        &self,
        key: &str,
        ttl_secs: u64,
        fetch: F,
    ) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StoreError>> + Send + 'static,
    {
        if let Some(value) = self.store.get_value(key).await {
            return Ok(value);
        }

        let mut rx = match self.flights.entry(key.to_string()) {
            Entry::Occupied(occupied) => {
                debug!(key, "joining in-flight origin fetch");
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => {
                let (tx, rx) = watch::channel(FlightState::Pending);
                vacant.insert(rx.clone());
                self.spawn_fetch(key.to_string(), ttl_secs, fetch(), tx);
                rx
            }
        };

        let outcome = loop {
            if let FlightState::Done(result) = rx.borrow().clone() {
                break result;
            }
            if rx.changed().await.is_err() {
                // Holder vanished without reporting.
                break Err(CacheError::LeaseBroken);
            }
        };

        match outcome {
            Ok(payload) => payload
                .downcast::<T>()
                .map(|value| (*value).clone())
                .map_err(|_| CacheError::decode("in-flight payload type mismatch")),
            Err(err) => Err(err),
        }
    }

    fn spawn_fetch<T, Fut>(
        &self,
        key: String,
        ttl_secs: u64,
        fut: Fut,
        tx: watch::Sender<FlightState>,
    ) where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        Fut: Future<Output = Result<T, StoreError>> + Send + 'static,
    {
        let store = self.store.clone();
        let flights = Arc::clone(&self.flights);
        let lease_timeout = self.lease_timeout;

        tokio::spawn(async move {
            // Declared first so the lease is released after the result is
            // broadcast, on every exit path including panic in `fut`.
            let _release = FlightRelease {
                flights,
                key: key.clone(),
            };

            // Double-check after acquiring the lease: a previous flight may
            // have populated the entry while this caller raced for it. An
            // entry that no longer decodes is a miss like any other: drop it
            // and fall through to the origin fetch.
            if let Some(bytes) = store.get_raw(&key).await {
                match decode_value::<T>(&bytes) {
                    Ok(value) => {
                        let _ = tx.send(FlightState::Done(Ok(Arc::new(value))));
                        return;
                    }
                    Err(err) => {
                        warn!(key, error = %err, "cached payload undecodable, refetching");
                        store.delete(&key).await;
                    }
                }
            }

            let outcome = match tokio::time::timeout(lease_timeout, fut).await {
                Ok(Ok(value)) => {
                    // Cache write is fail-open; waiters get the fetched value
                    // whether or not it could be encoded and stored.
                    match encode_value(&value) {
                        Ok(bytes) => {
                            store.set_raw(&key, bytes, ttl_secs).await;
                        }
                        Err(err) => {
                            warn!(key, error = %err, "fetched value not cacheable, proceeding uncached");
                        }
                    }
                    Ok(Arc::new(value) as FlightPayload)
                }
                Ok(Err(store_err)) => Err(CacheError::origin_fetch(store_err)),
                Err(_) => Err(CacheError::timeout("origin fetch")),
            };
            let _ = tx.send(FlightState::Done(outcome));
        });
    }
}

/// Removes the flight-table entry when the fetch task ends, however it ends.
struct FlightRelease {
    flights: Arc<FlightTable>,
    key: String,
}

impl Drop for FlightRelease {
    fn drop(&mut self) {
        self.flights.remove(&self.key);
    }
}
