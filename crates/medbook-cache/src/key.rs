//! Deterministic cache-key construction.
//!
//! Key grammar, shared with any process using the same store:
//!
//! - `{entity}:{id}`
//! - `{entity}:list:{filterHash}`
//! - `{entity}:{id}:{subkey}`
//!
//! The filter hash is a 128-bit digest over a canonical, order-independent
//! serialization of the filter set, so two set-equal filter maps always
//! derive the same key and distinct maps collide only with negligible
//! probability.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use medbook_core::{EntityKind, GeoPoint};

use crate::settings::CacheSettings;

/// Length in characters of the hex-rendered filter hash (128 bits).
pub const FILTER_HASH_HEX_LEN: usize = 32;

/// Default number of decimal places for coordinate rounding (~100 m cells).
const DEFAULT_COORDINATE_PRECISION: u32 = 3;

/// Builds cache keys for entities, parameterized list views and subkeys.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    coordinate_precision: u32,
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self {
            coordinate_precision: DEFAULT_COORDINATE_PRECISION,
        }
    }
}

impl KeyBuilder {
    /// Creates a builder with the default coordinate precision.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with a custom coordinate precision.
    #[must_use]
    pub fn with_coordinate_precision(precision: u32) -> Self {
        Self {
            coordinate_precision: precision,
        }
    }

    /// Creates a builder with the settings-configured coordinate precision.
    #[must_use]
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::with_coordinate_precision(settings.coordinate_precision)
    }

    /// Key for a single entity record: `{entity}:{id}`.
    #[must_use]
    pub fn entity_key(&self, kind: EntityKind, id: &str) -> String {
        format!("{kind}:{id}")
    }

    /// Key for a named view of an entity: `{entity}:{id}:{subkey}`.
    #[must_use]
    pub fn sub_key(&self, kind: EntityKind, id: &str, subkey: &str) -> String {
        format!("{kind}:{id}:{subkey}")
    }

    /// Key for a parameterized list query: `{entity}:list:{filterHash}`.
    ///
    /// The page number participates in the hash so distinct pages get
    /// distinct entries; filter insertion order does not matter.
    #[must_use]
    pub fn list_key<'a, I>(&self, kind: EntityKind, filters: I, page: u32) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        format!("{kind}:list:{}", Self::filter_hash(filters, page))
    }

    /// Canonical 128-bit filter digest, lower-hex.
    ///
    /// Every key and value is length-prefixed before hashing, so no filter
    /// content can imitate the pair framing, and the page number is appended
    /// as a fixed-width field after the filter set. There are no reserved
    /// filter names.
    #[must_use]
    pub fn filter_hash<'a, I>(filters: I, page: u32) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        // BTreeMap gives lexicographic key order independent of insertion
        // order; duplicate keys keep the last value.
        let canonical: BTreeMap<&str, &str> = filters.into_iter().collect();

        let mut hasher = Sha256::new();
        for (k, v) in &canonical {
            hasher.update((k.len() as u64).to_le_bytes());
            hasher.update(k.as_bytes());
            hasher.update((v.len() as u64).to_le_bytes());
            hasher.update(v.as_bytes());
        }
        hasher.update(page.to_le_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..FILTER_HASH_HEX_LEN / 2])
    }

    /// Rounds a point onto the shared coordinate grid.
    ///
    /// Used for pre-aggregated cached views keyed by location, so nearby
    /// callers share one entry. Proximity search itself never uses this; its
    /// results are a continuous function of the exact caller position and
    /// are never cached.
    #[must_use]
    pub fn rounded_point(&self, point: &GeoPoint) -> GeoPoint {
        point.rounded(self.coordinate_precision)
    }

    /// Rounds a raw coordinate value onto the shared grid.
    #[must_use]
    pub fn round_coordinate(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.coordinate_precision as i32);
        (value * factor).round() / factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key_grammar() {
        let builder = KeyBuilder::new();
        assert_eq!(builder.entity_key(EntityKind::Doctor, "42"), "doctor:42");
        assert_eq!(
            builder.sub_key(EntityKind::Clinic, "7", "schedule"),
            "clinic:7:schedule"
        );
    }

    #[test]
    fn test_list_key_shape() {
        let builder = KeyBuilder::new();
        let key = builder.list_key(EntityKind::Doctor, [("city", "nyc")], 0);
        let parts: Vec<&str> = key.split(':').collect();
        assert_eq!(parts[0], "doctor");
        assert_eq!(parts[1], "list");
        assert_eq!(parts[2].len(), FILTER_HASH_HEX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_filter_order_independence() {
        let a = KeyBuilder::filter_hash([("city", "nyc"), ("specialty", "derm")], 1);
        let b = KeyBuilder::filter_hash([("specialty", "derm"), ("city", "nyc")], 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_filters_distinct_hashes() {
        let a = KeyBuilder::filter_hash([("city", "nyc")], 0);
        let b = KeyBuilder::filter_hash([("city", "sf")], 0);
        let c = KeyBuilder::filter_hash([("town", "nyc")], 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_page_participates_in_hash() {
        let p0 = KeyBuilder::filter_hash([("city", "nyc")], 0);
        let p1 = KeyBuilder::filter_hash([("city", "nyc")], 1);
        assert_ne!(p0, p1);
    }

    #[test]
    fn test_separator_is_not_ambiguous() {
        // "ab"="c" must not hash like "a"="bc".
        let a = KeyBuilder::filter_hash([("ab", "c")], 0);
        let b = KeyBuilder::filter_hash([("a", "bc")], 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_filters_still_deterministic() {
        let a = KeyBuilder::filter_hash(std::iter::empty(), 0);
        let b = KeyBuilder::filter_hash(std::iter::empty(), 0);
        assert_eq!(a, b);
        assert_eq!(a.len(), FILTER_HASH_HEX_LEN);
    }

    #[test]
    fn test_no_reserved_filter_names() {
        // A filter literally named "_page" is an ordinary filter and never
        // collides with the page counter.
        let with_filter = KeyBuilder::filter_hash([("_page", "5")], 0);
        assert_ne!(with_filter, KeyBuilder::filter_hash(std::iter::empty(), 0));
        assert_ne!(with_filter, KeyBuilder::filter_hash(std::iter::empty(), 5));
    }

    #[test]
    fn test_precision_from_settings() {
        let settings = CacheSettings {
            coordinate_precision: 2,
            ..Default::default()
        };
        let builder = KeyBuilder::from_settings(&settings);
        assert_eq!(builder.round_coordinate(40.7128), 40.71);
        assert_eq!(builder.round_coordinate(-74.0060), -74.01);
    }

    #[test]
    fn test_coordinate_rounding_default_precision() {
        let builder = KeyBuilder::new();
        assert_eq!(builder.round_coordinate(40.712845), 40.713);
        assert_eq!(builder.round_coordinate(-74.006012), -74.006);
    }

    #[test]
    fn test_rounded_point_shares_grid_cell() {
        let builder = KeyBuilder::new();
        let a = GeoPoint::new(40.71281, -74.00604).unwrap();
        let b = GeoPoint::new(40.71279, -74.00596).unwrap();
        assert_eq!(builder.rounded_point(&a), builder.rounded_point(&b));
    }
}
