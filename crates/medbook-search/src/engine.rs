//! Proximity ranking over backing-store candidates.

use serde::Serialize;
use tracing::debug;

use medbook_storage::{DirectoryRecord, DirectoryStore, RadiusQuery};

use crate::params::{NearbyQuery, SearchError};

/// A search result: the record annotated with its geodesic distance from
/// the query center.
#[derive(Debug, Clone, Serialize)]
pub struct ProximityHit {
    pub record: DirectoryRecord,
    pub distance_km: f64,
}

/// Executes nearby queries against a directory store's spatial index.
pub struct ProximityEngine;

impl ProximityEngine {
    /// Finds entities within the query radius, ordered ascending by
    /// distance with the record id as tie-break, paginated after sorting.
    ///
    /// Zero matches return an empty set, not an error. The store may
    /// over-return within its bounding radius; every candidate's true
    /// geodesic distance is computed here and anything beyond the radius is
    /// dropped.
    pub async fn nearby(
        store: &dyn DirectoryStore,
        query: &NearbyQuery,
    ) -> Result<Vec<ProximityHit>, SearchError> {
        let radius_query = RadiusQuery {
            kind: query.kind,
            center: query.center,
            radius_km: query.radius_km,
            filters: query.filters.clone(),
        };
        let candidates = store.find_within_radius(&radius_query).await?;
        debug!(
            kind = %query.kind,
            radius_km = query.radius_km,
            candidates = candidates.len(),
            "proximity candidates"
        );

        let mut hits: Vec<ProximityHit> = candidates
            .into_iter()
            .filter_map(|record| Self::rank(record, query))
            .collect();

        hits.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.record.id.cmp(&b.record.id))
        });

        Ok(hits
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .collect())
    }

    fn rank(record: DirectoryRecord, query: &NearbyQuery) -> Option<ProximityHit> {
        let location = record.location?;
        let distance_km = query.center.distance_km(&location);
        if distance_km > query.radius_km {
            return None;
        }
        Some(ProximityHit {
            record,
            distance_km,
        })
    }
}
