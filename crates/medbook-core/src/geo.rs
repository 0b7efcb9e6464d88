use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Largest valid latitude in degrees.
pub const MAX_LATITUDE: f64 = 90.0;

/// Largest valid longitude in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Mean Earth radius in kilometers, used for great-circle distance.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated geographic coordinate pair.
///
/// Construction through [`GeoPoint::new`] enforces the valid ranges
/// (latitude in [-90, 90], longitude in [-180, 180]); a deserialized point
/// should be re-validated at the boundary before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting out-of-range or non-finite coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        if !latitude.is_finite() || latitude.abs() > MAX_LATITUDE {
            return Err(CoreError::invalid_coordinate("latitude", latitude));
        }
        if !longitude.is_finite() || longitude.abs() > MAX_LONGITUDE {
            return Err(CoreError::invalid_coordinate("longitude", longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle (haversine) distance to `other`, in kilometers.
    #[must_use]
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlng = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_KM * c
    }

    /// Returns a copy with both axes rounded to `precision` decimal places.
    ///
    /// Rounding nearby coordinates onto a shared grid lets non-geospatial
    /// cached views share one cache entry; 3 decimal places is roughly a
    /// 100 m cell.
    #[must_use]
    pub fn rounded(&self, precision: u32) -> GeoPoint {
        let factor = 10f64.powi(precision as i32);
        GeoPoint {
            latitude: (self.latitude * factor).round() / factor,
            longitude: (self.longitude * factor).round() / factor,
        }
    }
}
