//! Proximity-search parameters and validation.
//!
//! Invalid input is rejected here, before any store access, and surfaces as
//! a client error.

use thiserror::Error;

use medbook_core::{CoreError, EntityKind, GeoPoint};
use medbook_storage::{RecordFilters, StoreError};

/// Largest accepted search radius, in kilometers.
pub const MAX_RADIUS_KM: f64 = 100.0;

/// Radius applied when the caller does not supply one.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Largest accepted page size.
pub const MAX_LIMIT: usize = 100;

/// Page size applied when the caller does not supply one.
pub const DEFAULT_LIMIT: usize = 20;

/// Errors from the proximity-search path.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Invalid coordinates or entity kind.
    #[error("validation error: {0}")]
    Validation(#[from] CoreError),

    /// Radius outside the accepted range.
    #[error("invalid radius: {got} km (must be in (0, {max}])")]
    InvalidRadius { got: f64, max: f64 },

    /// Page size outside the accepted range.
    #[error("invalid limit: {got} (must be in [1, {max}])")]
    InvalidLimit { got: usize, max: usize },

    /// The kind has no spatial index.
    #[error("kind does not support proximity search: {kind}")]
    KindNotSearchable { kind: EntityKind },

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SearchError {
    /// Returns `true` when the caller supplied bad input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

/// A validated nearby query.
#[derive(Debug, Clone)]
pub struct NearbyQuery {
    pub kind: EntityKind,
    pub center: GeoPoint,
    pub radius_km: f64,
    pub filters: RecordFilters,
    pub skip: usize,
    pub limit: usize,
}

impl NearbyQuery {
    /// Builds and validates a query.
    ///
    /// Coordinates are range-checked, the radius must be in
    /// `(0, MAX_RADIUS_KM]` and the limit in `[1, MAX_LIMIT]`. The kind must
    /// carry a spatial index.
    pub fn new(kind: EntityKind, latitude: f64, longitude: f64) -> Result<Self, SearchError> {
        if !kind.is_locatable() {
            return Err(SearchError::KindNotSearchable { kind });
        }
        let center = GeoPoint::new(latitude, longitude)?;
        Ok(Self {
            kind,
            center,
            radius_km: DEFAULT_RADIUS_KM,
            filters: RecordFilters::default(),
            skip: 0,
            limit: DEFAULT_LIMIT,
        })
    }

    /// Sets the search radius, validated against `(0, MAX_RADIUS_KM]`.
    pub fn with_radius_km(mut self, radius_km: f64) -> Result<Self, SearchError> {
        if !radius_km.is_finite() || radius_km <= 0.0 || radius_km > MAX_RADIUS_KM {
            return Err(SearchError::InvalidRadius {
                got: radius_km,
                max: MAX_RADIUS_KM,
            });
        }
        self.radius_km = radius_km;
        Ok(self)
    }

    /// Sets the entity pre-filters.
    #[must_use]
    pub fn with_filters(mut self, filters: RecordFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Sets pagination, validating the limit against `[1, MAX_LIMIT]`.
    pub fn with_page(mut self, skip: usize, limit: usize) -> Result<Self, SearchError> {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(SearchError::InvalidLimit {
                got: limit,
                max: MAX_LIMIT,
            });
        }
        self.skip = skip;
        self.limit = limit;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = NearbyQuery::new(EntityKind::Doctor, 40.7128, -74.0060).unwrap();
        assert_eq!(query.radius_km, 10.0);
        assert_eq!(query.limit, 20);
        assert_eq!(query.skip, 0);
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let err = NearbyQuery::new(EntityKind::Doctor, 91.0, 0.0).unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
        assert!(err.is_client_error());

        let err = NearbyQuery::new(EntityKind::Doctor, 0.0, -181.0).unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
    }

    #[test]
    fn test_radius_bounds() {
        let query = NearbyQuery::new(EntityKind::Clinic, 0.0, 0.0).unwrap();
        assert!(query.clone().with_radius_km(100.0).is_ok());
        assert!(query.clone().with_radius_km(0.0).is_err());
        assert!(query.clone().with_radius_km(-5.0).is_err());
        assert!(query.clone().with_radius_km(100.1).is_err());
        assert!(query.with_radius_km(f64::NAN).is_err());
    }

    #[test]
    fn test_limit_bounds() {
        let query = NearbyQuery::new(EntityKind::Clinic, 0.0, 0.0).unwrap();
        assert!(query.clone().with_page(0, 1).is_ok());
        assert!(query.clone().with_page(50, 100).is_ok());
        assert!(query.clone().with_page(0, 0).is_err());
        assert!(query.with_page(0, 101).is_err());
    }

    #[test]
    fn test_non_locatable_kind_rejected() {
        let err = NearbyQuery::new(EntityKind::Session, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, SearchError::KindNotSearchable { .. }));
        assert!(err.is_client_error());
    }
}
