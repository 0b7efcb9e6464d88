//! Write-event invalidation.
//!
//! Maps a committed domain write to the narrowest set of cache key patterns
//! that must be cleared, then issues the deletions. Invalidation always runs
//! AFTER the backing-store write commits - clearing before commit would let
//! a concurrent reader repopulate the cache with pre-write data.
//!
//! Failures are logged, never propagated: the committed write stands, and a
//! stale entry lives at most until its TTL expires.

use medbook_core::EntityKind;
use tracing::debug;

use crate::store::CacheStore;

/// A committed write event on the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteEvent {
    /// A new entity was created.
    Created { kind: EntityKind, id: String },
    /// An existing entity's fields were updated.
    Updated { kind: EntityKind, id: String },
    /// An entity passed (or lost) platform verification.
    Verified { kind: EntityKind, id: String },
    /// An entity was deleted.
    Deleted { kind: EntityKind, id: String },
    /// Two entities were associated (e.g. a doctor joined a clinic).
    RelationshipAdded {
        kind: EntityKind,
        id: String,
        other_kind: EntityKind,
        other_id: String,
    },
    /// Two entities were dissociated.
    RelationshipRemoved {
        kind: EntityKind,
        id: String,
        other_kind: EntityKind,
        other_id: String,
    },
}

/// A cache key pattern to clear: either one exact key or a prefix wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPattern {
    /// Exactly one key.
    Exact(String),
    /// Every key starting with the prefix.
    Prefix(String),
}

impl KeyPattern {
    /// Renders the pattern in the backend's wildcard grammar.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Exact(key) => key.clone(),
            Self::Prefix(prefix) => format!("{prefix}*"),
        }
    }
}

/// Patterns affected by the record `kind:{id}` itself: the record key and
/// its subkeys, but not the kind's list views.
fn record_patterns(kind: EntityKind, id: &str) -> Vec<KeyPattern> {
    vec![
        KeyPattern::Exact(format!("{kind}:{id}")),
        KeyPattern::Prefix(format!("{kind}:{id}:")),
    ]
}

/// The kind's parameterized list views.
fn list_pattern(kind: EntityKind) -> KeyPattern {
    KeyPattern::Prefix(format!("{kind}:list:"))
}

impl WriteEvent {
    /// The set of key patterns this event invalidates.
    ///
    /// Kept as narrow as correctness allows: a field update clears the
    /// record, its subkeys and the kind's list views - never the whole
    /// `{kind}:*` space.
    #[must_use]
    pub fn affected_patterns(&self) -> Vec<KeyPattern> {
        match self {
            // A new entity cannot be cached yet; only list views change.
            Self::Created { kind, .. } => vec![list_pattern(*kind)],

            Self::Updated { kind, id } | Self::Deleted { kind, id } => {
                let mut patterns = record_patterns(*kind, id);
                patterns.push(list_pattern(*kind));
                patterns
            }

            // Verification also flips the cached verification-state record.
            Self::Verified { kind, id } => {
                let mut patterns = record_patterns(*kind, id);
                patterns.push(list_pattern(*kind));
                patterns.push(KeyPattern::Exact(format!(
                    "{}:{id}",
                    EntityKind::Verification
                )));
                patterns
            }

            // Both sides' relationship subkeys and list views.
            Self::RelationshipAdded {
                kind,
                id,
                other_kind,
                other_id,
            }
            | Self::RelationshipRemoved {
                kind,
                id,
                other_kind,
                other_id,
            } => vec![
                KeyPattern::Prefix(format!("{kind}:{id}:")),
                list_pattern(*kind),
                KeyPattern::Prefix(format!("{other_kind}:{other_id}:")),
                list_pattern(*other_kind),
            ],
        }
    }
}

/// Issues cache deletions for committed write events.
#[derive(Debug, Clone)]
pub struct InvalidationDispatcher {
    store: CacheStore,
}

impl InvalidationDispatcher {
    /// Creates a dispatcher over `store`.
    #[must_use]
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    /// Clears every pattern the event affects and returns how many entries
    /// were removed.
    ///
    /// Must be called only after the backing-store write has committed.
    /// Deletion failures are absorbed by the store (logged); the entry then
    /// goes stale until TTL expiry, which is the documented degraded mode.
    pub async fn on_event(&self, event: &WriteEvent) -> usize {
        let mut invalidated = 0;
        for pattern in event.affected_patterns() {
            invalidated += match &pattern {
                KeyPattern::Exact(key) => usize::from(self.store.delete(key).await),
                KeyPattern::Prefix(_) => self.store.delete_pattern(&pattern.render()).await,
            };
        }
        debug!(?event, invalidated, "write-event invalidation");
        invalidated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCacheBackend;
    use crate::store::CacheBackend;
    use std::sync::Arc;
    use std::time::Duration;

    fn pattern_strings(event: &WriteEvent) -> Vec<String> {
        event.affected_patterns().iter().map(KeyPattern::render).collect()
    }

    #[test]
    fn test_created_touches_only_lists() {
        let event = WriteEvent::Created {
            kind: EntityKind::Doctor,
            id: "42".into(),
        };
        assert_eq!(pattern_strings(&event), vec!["doctor:list:*"]);
    }

    #[test]
    fn test_update_is_narrow() {
        let event = WriteEvent::Updated {
            kind: EntityKind::Doctor,
            id: "42".into(),
        };
        let patterns = pattern_strings(&event);
        assert_eq!(patterns, vec!["doctor:42", "doctor:42:*", "doctor:list:*"]);
        // Never the whole kind space.
        assert!(!patterns.contains(&"doctor:*".to_string()));
    }

    #[test]
    fn test_verified_includes_verification_record() {
        let event = WriteEvent::Verified {
            kind: EntityKind::Doctor,
            id: "42".into(),
        };
        let patterns = pattern_strings(&event);
        assert!(patterns.contains(&"verification:42".to_string()));
    }

    #[test]
    fn test_relationship_touches_both_sides() {
        let event = WriteEvent::RelationshipAdded {
            kind: EntityKind::Doctor,
            id: "42".into(),
            other_kind: EntityKind::Clinic,
            other_id: "7".into(),
        };
        let patterns = pattern_strings(&event);
        assert!(patterns.contains(&"doctor:42:*".to_string()));
        assert!(patterns.contains(&"doctor:list:*".to_string()));
        assert!(patterns.contains(&"clinic:7:*".to_string()));
        assert!(patterns.contains(&"clinic:list:*".to_string()));
    }

    #[tokio::test]
    async fn test_on_event_clears_affected_entries() {
        let backend = Arc::new(MemoryCacheBackend::new());
        let ttl = Duration::from_secs(300);
        for key in [
            "doctor:42",
            "doctor:42:schedule",
            "doctor:list:aaa",
            "doctor:list:bbb",
            "doctor:7", // another doctor, untouched
            "clinic:list:ccc",
        ] {
            backend.set(key, b"x".to_vec(), ttl).await.unwrap();
        }

        let store = CacheStore::new(backend.clone());
        let dispatcher = InvalidationDispatcher::new(store);

        let count = dispatcher
            .on_event(&WriteEvent::Updated {
                kind: EntityKind::Doctor,
                id: "42".into(),
            })
            .await;
        assert_eq!(count, 4);

        assert!(backend.get("doctor:42").await.unwrap().is_none());
        assert!(backend.get("doctor:42:schedule").await.unwrap().is_none());
        assert!(backend.get("doctor:list:aaa").await.unwrap().is_none());
        assert!(backend.get("doctor:7").await.unwrap().is_some());
        assert!(backend.get("clinic:list:ccc").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_on_event_with_empty_cache_counts_zero() {
        let store = CacheStore::new(Arc::new(MemoryCacheBackend::new()));
        let dispatcher = InvalidationDispatcher::new(store);
        let count = dispatcher
            .on_event(&WriteEvent::Deleted {
                kind: EntityKind::Clinic,
                id: "7".into(),
            })
            .await;
        assert_eq!(count, 0);
    }
}
