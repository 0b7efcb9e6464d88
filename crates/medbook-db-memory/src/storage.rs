use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use medbook_core::EntityKind;
use medbook_storage::{DirectoryRecord, DirectoryStore, RadiusQuery, StoreError};

pub(crate) type StorageKey = String; // Format: "kind/id"

pub(crate) fn make_storage_key(kind: EntityKind, id: &str) -> StorageKey {
    format!("{kind}/{id}")
}

/// In-memory directory backend using a concurrent hash map.
///
/// Spatial queries are linear scans over the kind's records; the bounding
/// check uses exact haversine distance, so this backend never over-returns.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    data: DashMap<StorageKey, DirectoryRecord>,
}

impl InMemoryDirectory {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Number of records held, across all kinds.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectory {
    async fn fetch(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Option<DirectoryRecord>, StoreError> {
        let key = make_storage_key(kind, id);
        Ok(self.data.get(&key).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, mut record: DirectoryRecord) -> Result<DirectoryRecord, StoreError> {
        let key = make_storage_key(record.kind, &record.id);
        if self.data.contains_key(&key) {
            return Err(StoreError::already_exists(
                record.kind.as_str(),
                record.id.clone(),
            ));
        }
        record.updated_at = OffsetDateTime::now_utc();
        self.data.insert(key, record.clone());
        Ok(record)
    }

    async fn update(&self, mut record: DirectoryRecord) -> Result<DirectoryRecord, StoreError> {
        let key = make_storage_key(record.kind, &record.id);
        if !self.data.contains_key(&key) {
            return Err(StoreError::not_found(record.kind.as_str(), record.id.clone()));
        }
        record.updated_at = OffsetDateTime::now_utc();
        self.data.insert(key, record.clone());
        Ok(record)
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), StoreError> {
        let key = make_storage_key(kind, id);
        if self.data.remove(&key).is_none() {
            return Err(StoreError::not_found(kind.as_str(), id));
        }
        Ok(())
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<DirectoryRecord>, StoreError> {
        let prefix = format!("{kind}/");
        Ok(self
            .data
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_within_radius(
        &self,
        query: &RadiusQuery,
    ) -> Result<Vec<DirectoryRecord>, StoreError> {
        if !query.kind.is_locatable() {
            return Err(StoreError::spatial_unsupported(query.kind.as_str()));
        }

        let prefix = format!("{}/", query.kind);
        let candidates = self
            .data
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .filter_map(|entry| {
                let record = entry.value();
                let location = record.location?;
                if !query.filters.matches(record) {
                    return None;
                }
                if location.distance_km(&query.center) > query.radius_km {
                    return None;
                }
                Some(record.clone())
            })
            .collect();
        Ok(candidates)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
