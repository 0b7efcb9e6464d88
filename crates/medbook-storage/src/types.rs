//! Shared types for the backing-store abstraction.

use medbook_core::{EntityKind, GeoPoint};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// A record as stored by a directory backend.
///
/// `payload` is the opaque domain document (profile fields, schedule, etc.);
/// the envelope fields are what the caching and search layers key on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryRecord {
    /// Entity family this record belongs to.
    pub kind: EntityKind,
    /// Opaque identifier, unique within the kind.
    pub id: String,
    /// The domain document.
    pub payload: Value,
    /// Whether the entity passed platform verification. Verified entities
    /// change less often and earn a longer cache lifetime.
    pub verified: bool,
    /// Whether the entity is currently active (visible to searches).
    pub active: bool,
    /// Capability flags (e.g. "telehealth", "pediatrics") used as search
    /// pre-filters.
    pub capabilities: Vec<String>,
    /// Geographic location, present for locatable kinds.
    pub location: Option<GeoPoint>,
    /// Last modification timestamp.
    pub updated_at: OffsetDateTime,
}

impl DirectoryRecord {
    /// Creates a minimal record with the given kind, id and payload.
    pub fn new(kind: EntityKind, id: impl Into<String>, payload: Value) -> Self {
        Self {
            kind,
            id: id.into(),
            payload,
            verified: false,
            active: true,
            capabilities: Vec::new(),
            location: None,
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    /// Builder-style setter for the verified flag.
    #[must_use]
    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Builder-style setter for the active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Builder-style setter for the location.
    #[must_use]
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Builder-style setter for capability flags.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// Pre-filters pushed down to the backend on spatial queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilters {
    /// Only return active records.
    pub active_only: bool,
    /// Only return verified records.
    pub verified_only: bool,
    /// Required capability flags; a record must carry all of them.
    pub capabilities: Vec<String>,
}

impl RecordFilters {
    /// Returns `true` when `record` satisfies every filter.
    #[must_use]
    pub fn matches(&self, record: &DirectoryRecord) -> bool {
        if self.active_only && !record.active {
            return false;
        }
        if self.verified_only && !record.verified {
            return false;
        }
        self.capabilities
            .iter()
            .all(|c| record.capabilities.iter().any(|rc| rc == c))
    }
}

/// A bounded-radius spatial query against the backend's spatial index.
#[derive(Debug, Clone)]
pub struct RadiusQuery {
    /// Entity kind to search.
    pub kind: EntityKind,
    /// Center of the search circle.
    pub center: GeoPoint,
    /// Search radius in kilometers. Validated by the caller before the query
    /// reaches the backend.
    pub radius_km: f64,
    /// Pre-filters applied backend-side where possible.
    pub filters: RecordFilters,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doctor(id: &str) -> DirectoryRecord {
        DirectoryRecord::new(EntityKind::Doctor, id, json!({"name": "Dr. Example"}))
    }

    #[test]
    fn test_filters_default_match_everything() {
        let filters = RecordFilters::default();
        assert!(filters.matches(&doctor("1")));
        assert!(filters.matches(&doctor("2").with_active(false)));
    }

    #[test]
    fn test_active_only_filter() {
        let filters = RecordFilters {
            active_only: true,
            ..Default::default()
        };
        assert!(filters.matches(&doctor("1")));
        assert!(!filters.matches(&doctor("2").with_active(false)));
    }

    #[test]
    fn test_verified_only_filter() {
        let filters = RecordFilters {
            verified_only: true,
            ..Default::default()
        };
        assert!(!filters.matches(&doctor("1")));
        assert!(filters.matches(&doctor("2").with_verified(true)));
    }

    #[test]
    fn test_capability_filter_requires_all() {
        let filters = RecordFilters {
            capabilities: vec!["telehealth".into(), "pediatrics".into()],
            ..Default::default()
        };
        let partial = doctor("1").with_capabilities(vec!["telehealth".into()]);
        let full = doctor("2")
            .with_capabilities(vec!["telehealth".into(), "pediatrics".into(), "extra".into()]);
        assert!(!filters.matches(&partial));
        assert!(filters.matches(&full));
    }
}
