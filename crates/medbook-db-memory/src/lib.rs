//! In-memory backing store for the Medbook platform.
//!
//! This crate provides an in-memory implementation of the `DirectoryStore`
//! trait from `medbook-storage`, using a concurrent hash map. It is the
//! reference backend for tests and local development; spatial queries are
//! answered by a linear scan, which keeps the semantics obvious at the cost
//! of scale.
//!
//! # Example
//!
//! ```ignore
//! use medbook_db_memory::InMemoryDirectory;
//! use medbook_storage::{DirectoryStore, DirectoryRecord};
//! use medbook_core::EntityKind;
//!
//! let store = InMemoryDirectory::new();
//! let record = DirectoryRecord::new(
//!     EntityKind::Doctor,
//!     "42",
//!     serde_json::json!({"name": "Dr. Ada"}),
//! );
//! store.insert(record).await?;
//! ```

mod storage;

pub use storage::InMemoryDirectory;

// Re-export the store trait for convenience
pub use medbook_storage::{DirectoryStore, StoreError};

/// Creates a new shareable in-memory store instance.
pub fn create_memory_store() -> medbook_storage::DynDirectoryStore {
    std::sync::Arc::new(InMemoryDirectory::new())
}
