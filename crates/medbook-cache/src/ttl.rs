//! Time-to-live policy for cache entries.
//!
//! Lifetimes come from a static base table, loaded once and immutable at
//! runtime. Entities in the verified-multiplier program (doctors, clinics)
//! earn a 1.5x lifetime once verified: their underlying data changes less
//! often, so the staleness risk buys real hit-rate.

use std::collections::HashMap;

use medbook_core::EntityKind;

use crate::settings::CacheSettings;

/// Base TTL for individual records, in seconds.
pub const TTL_RECORD_SECS: u64 = 900;

/// Base TTL for parameterized list queries, in seconds.
pub const TTL_LIST_SECS: u64 = 300;

/// Base TTL for session-like records, in seconds.
pub const TTL_SESSION_SECS: u64 = 86_400;

/// Base TTL for long-lived issued credentials, in seconds (30 days).
pub const TTL_CREDENTIAL_SECS: u64 = 2_592_000;

/// Base TTL for verification-state records, in seconds.
pub const TTL_VERIFICATION_SECS: u64 = 3_600;

/// Fallback TTL for kinds missing from a configured table.
pub const TTL_FALLBACK_SECS: u64 = TTL_LIST_SECS;

/// Default multiplier applied to verified entities in the program.
pub const DEFAULT_VERIFIED_MULTIPLIER: f64 = 1.5;

/// Resolves a TTL for a cache entry from entity kind and state.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    base: HashMap<EntityKind, u64>,
    list_ttl: u64,
    verified_multiplier: f64,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl TtlPolicy {
    /// Creates the policy with the platform's default table.
    #[must_use]
    pub fn new() -> Self {
        let mut base = HashMap::new();
        base.insert(EntityKind::Doctor, TTL_RECORD_SECS);
        base.insert(EntityKind::Clinic, TTL_RECORD_SECS);
        base.insert(EntityKind::Patient, TTL_RECORD_SECS);
        base.insert(EntityKind::Appointment, TTL_RECORD_SECS);
        base.insert(EntityKind::Session, TTL_SESSION_SECS);
        base.insert(EntityKind::Credential, TTL_CREDENTIAL_SECS);
        base.insert(EntityKind::Verification, TTL_VERIFICATION_SECS);
        Self {
            base,
            list_ttl: TTL_LIST_SECS,
            verified_multiplier: DEFAULT_VERIFIED_MULTIPLIER,
        }
    }

    /// Creates the policy from settings, applying any table overrides.
    #[must_use]
    pub fn from_settings(settings: &CacheSettings) -> Self {
        let mut policy = Self::new();
        for (kind, secs) in settings.ttl_overrides() {
            policy.base.insert(kind, secs);
        }
        policy.list_ttl = settings.list_ttl_secs;
        policy.verified_multiplier = settings.verified_multiplier;
        policy
    }

    /// Resolves the TTL in seconds for a record of `kind`.
    ///
    /// The verified multiplier applies only to kinds in the multiplier
    /// program; the result is rounded to the nearest second.
    #[must_use]
    pub fn resolve(&self, kind: EntityKind, verified: bool) -> u64 {
        let base = self.base.get(&kind).copied().unwrap_or(TTL_FALLBACK_SECS);
        if verified && Self::in_multiplier_program(kind) {
            (base as f64 * self.verified_multiplier).round() as u64
        } else {
            base
        }
    }

    /// TTL in seconds for parameterized list entries.
    #[must_use]
    pub fn list_ttl(&self) -> u64 {
        self.list_ttl
    }

    /// Kinds whose verified state earns the longer lifetime.
    #[must_use]
    pub fn in_multiplier_program(kind: EntityKind) -> bool {
        matches!(kind, EntityKind::Doctor | EntityKind::Clinic)
    }
}
