//! Storage traits for the backing-store abstraction layer.

use async_trait::async_trait;

use medbook_core::EntityKind;

use crate::error::StoreError;
use crate::types::{DirectoryRecord, RadiusQuery};

/// The contract every directory backend must implement.
///
/// The caching layer treats this as a black box reached only on cache miss or
/// write; proximity search reaches it on every call. Implementations must be
/// thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use medbook_storage::{DirectoryStore, StoreError, DirectoryRecord};
///
/// async fn load(store: &dyn DirectoryStore, id: &str) -> Result<DirectoryRecord, StoreError> {
///     store
///         .fetch(medbook_core::EntityKind::Clinic, id)
///         .await?
///         .ok_or_else(|| StoreError::not_found("clinic", id))
/// }
/// ```
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Fetches a record by kind and id.
    ///
    /// Returns `None` if the record does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing
    /// records.
    async fn fetch(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Option<DirectoryRecord>, StoreError>;

    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if a record with the same kind and
    /// id exists.
    async fn insert(&self, record: DirectoryRecord) -> Result<DirectoryRecord, StoreError>;

    /// Updates an existing record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record does not exist.
    async fn update(&self, record: DirectoryRecord) -> Result<DirectoryRecord, StoreError>;

    /// Deletes a record by kind and id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record does not exist.
    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), StoreError>;

    /// Lists records of a kind, in unspecified order.
    ///
    /// Backends may apply their own internal limits; callers needing
    /// determinism sort the result themselves.
    async fn list(&self, kind: EntityKind) -> Result<Vec<DirectoryRecord>, StoreError>;

    /// Returns candidate records within the query's bounding radius.
    ///
    /// The backend applies the query's pre-filters where possible and bounds
    /// the candidate set by `radius_km`; exact geodesic ranking is the search
    /// engine's job, so the backend may over-return (never under-return)
    /// within the radius.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SpatialUnsupported` for kinds without a spatial
    /// index.
    async fn find_within_radius(
        &self,
        query: &RadiusQuery,
    ) -> Result<Vec<DirectoryRecord>, StoreError>;

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
