//! # medbook-storage
//!
//! Backing-store abstraction for the Medbook platform.
//!
//! This crate defines the traits and types that all directory backends must
//! implement. It does not contain any implementations - those are provided by
//! separate crates (see `medbook-db-memory`).
//!
//! The caching layer (`medbook-cache`) reaches the store only on cache miss
//! or write; proximity search (`medbook-search`) reaches it on every call.
//!
//! ## Example
//!
//! ```ignore
//! use medbook_storage::{DirectoryStore, StoreError, DirectoryRecord};
//!
//! async fn load_doctor(
//!     store: &dyn DirectoryStore,
//!     id: &str,
//! ) -> Result<DirectoryRecord, StoreError> {
//!     store
//!         .fetch(medbook_core::EntityKind::Doctor, id)
//!         .await?
//!         .ok_or_else(|| StoreError::not_found("doctor", id))
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StoreError};
pub use traits::DirectoryStore;
pub use types::{DirectoryRecord, RadiusQuery, RecordFilters};

/// Type alias for a store result.
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for a shareable store trait object.
pub type DynDirectoryStore = std::sync::Arc<dyn DirectoryStore>;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ErrorCategory, StoreError};
    pub use crate::traits::DirectoryStore;
    pub use crate::types::{DirectoryRecord, RadiusQuery, RecordFilters};
    pub use crate::{DynDirectoryStore, StoreResult};
}
