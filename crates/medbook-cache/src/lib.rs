//! # medbook-cache
//!
//! Cache-aside data-access layer sitting between stateless service logic and
//! the backing store.
//!
//! ## Overview
//!
//! - [`KeyBuilder`] derives deterministic cache keys (`{entity}:{id}`,
//!   `{entity}:list:{filterHash}`, `{entity}:{id}:{subkey}`), hashing filter
//!   sets canonically so set-equal filters always share one key.
//! - [`TtlPolicy`] resolves entry lifetimes from a static base table, with a
//!   longer lifetime for verified entities.
//! - [`CacheStore`] wraps a [`CacheBackend`] with a bounded operation timeout
//!   and fail-open semantics: transport errors degrade to misses and logged
//!   no-ops, never to caller-visible failures.
//! - [`StampedeGuard`] serializes origin fetches per key so N concurrent
//!   misses cost one backing-store query.
//! - [`InvalidationDispatcher`] maps committed write events to the narrowest
//!   correct set of key deletions.
//!
//! The whole layer is eventually consistent by design: a failed invalidation
//! leaves a stale entry until its TTL expires, and the read path stays
//! correct (just slower) with the cache entirely unreachable.

mod envelope;
mod error;
mod invalidation;
mod key;
mod memory;
mod settings;
mod stampede;
mod store;
mod ttl;

pub use envelope::{Encoding, decode_value, encode_value};
pub use error::CacheError;
pub use invalidation::{InvalidationDispatcher, KeyPattern, WriteEvent};
pub use key::{FILTER_HASH_HEX_LEN, KeyBuilder};
pub use memory::{CacheStatsSnapshot, MemoryCacheBackend};
pub use settings::CacheSettings;
pub use stampede::StampedeGuard;
pub use store::{CacheBackend, CacheStore};
pub use ttl::TtlPolicy;

/// Type alias for a cache result.
pub type CacheResult<T> = Result<T, CacheError>;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::CacheError;
    pub use crate::invalidation::{InvalidationDispatcher, WriteEvent};
    pub use crate::key::KeyBuilder;
    pub use crate::memory::MemoryCacheBackend;
    pub use crate::settings::CacheSettings;
    pub use crate::stampede::StampedeGuard;
    pub use crate::store::{CacheBackend, CacheStore};
    pub use crate::ttl::TtlPolicy;
    pub use crate::CacheResult;
}
