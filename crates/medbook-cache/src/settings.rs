//! Typed settings for the caching layer.
//!
//! Loaded once at startup (TOML or defaults) and treated as immutable for
//! the life of the process.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use medbook_core::EntityKind;

/// Settings for the caching layer, with serde defaults for every field.
///
/// ```ignore
/// let settings = CacheSettings::from_toml_str(r#"
///     op_timeout_secs = 2
///     lease_timeout_secs = 10
///
///     [ttl_secs]
///     doctor = 600
/// "#)?;
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Bounded timeout for each cache backend operation, in seconds.
    pub op_timeout_secs: u64,
    /// Bounded timeout for one origin fetch under a lease, in seconds.
    /// Chosen safely below client-facing request timeouts.
    pub lease_timeout_secs: u64,
    /// Decimal places for coordinate rounding on cached location views.
    pub coordinate_precision: u32,
    /// Multiplier applied to verified entities in the multiplier program.
    pub verified_multiplier: f64,
    /// TTL for parameterized list entries, in seconds.
    pub list_ttl_secs: u64,
    /// Per-kind base TTL overrides, keyed by the lower-case wire name.
    pub ttl_secs: BTreeMap<String, u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            op_timeout_secs: 2,
            lease_timeout_secs: 10,
            coordinate_precision: 3,
            verified_multiplier: crate::ttl::DEFAULT_VERIFIED_MULTIPLIER,
            list_ttl_secs: crate::ttl::TTL_LIST_SECS,
            ttl_secs: BTreeMap::new(),
        }
    }
}

impl CacheSettings {
    /// Parses settings from a TOML document; missing fields take defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Bounded per-operation cache timeout.
    #[must_use]
    pub fn op_timeout(&self) -> Duration {
        Duration::from_secs(self.op_timeout_secs)
    }

    /// Bounded origin-fetch (lease) timeout.
    #[must_use]
    pub fn lease_timeout(&self) -> Duration {
        Duration::from_secs(self.lease_timeout_secs)
    }

    /// Resolved per-kind TTL overrides; unknown kind names are logged and
    /// skipped rather than failing startup.
    #[must_use]
    pub fn ttl_overrides(&self) -> Vec<(EntityKind, u64)> {
        self.ttl_secs
            .iter()
            .filter_map(|(name, &secs)| match name.parse::<EntityKind>() {
                Ok(kind) => Some((kind, secs)),
                Err(_) => {
                    warn!(kind = %name, "ignoring TTL override for unknown entity kind");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = CacheSettings::default();
        assert_eq!(settings.op_timeout(), Duration::from_secs(2));
        assert_eq!(settings.lease_timeout(), Duration::from_secs(10));
        assert_eq!(settings.coordinate_precision, 3);
        assert_eq!(settings.verified_multiplier, 1.5);
        assert!(settings.ttl_overrides().is_empty());
    }

    #[test]
    fn test_partial_toml_takes_defaults() {
        let settings = CacheSettings::from_toml_str("lease_timeout_secs = 5").unwrap();
        assert_eq!(settings.lease_timeout_secs, 5);
        assert_eq!(settings.op_timeout_secs, 2);
    }

    #[test]
    fn test_ttl_override_table() {
        let settings = CacheSettings::from_toml_str(
            r#"
            [ttl_secs]
            doctor = 600
            clinic = 1200
            "#,
        )
        .unwrap();
        let overrides = settings.ttl_overrides();
        assert_eq!(overrides.len(), 2);
        assert!(overrides.contains(&(EntityKind::Doctor, 600)));
        assert!(overrides.contains(&(EntityKind::Clinic, 1200)));
    }

    #[test]
    fn test_unknown_override_kind_skipped() {
        let settings = CacheSettings::from_toml_str(
            r#"
            [ttl_secs]
            pharmacy = 60
            doctor = 600
            "#,
        )
        .unwrap();
        let overrides = settings.ttl_overrides();
        assert_eq!(overrides, vec![(EntityKind::Doctor, 600)]);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(CacheSettings::from_toml_str("op_timeout_secs = \"soon\"").is_err());
    }
}
