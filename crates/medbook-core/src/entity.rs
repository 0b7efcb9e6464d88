use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The closed set of entity families the platform caches and searches.
///
/// The lower-case wire form (`doctor`, `clinic`, ...) is the first segment of
/// every cache key, so `Display`/`FromStr` round-trip exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Doctor,
    Clinic,
    Patient,
    Appointment,
    Session,
    Credential,
    Verification,
}

impl EntityKind {
    /// All kinds, for iteration in configuration and tests.
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Doctor,
        EntityKind::Clinic,
        EntityKind::Patient,
        EntityKind::Appointment,
        EntityKind::Session,
        EntityKind::Credential,
        EntityKind::Verification,
    ];

    /// The lower-case wire form used in cache keys.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Clinic => "clinic",
            Self::Patient => "patient",
            Self::Appointment => "appointment",
            Self::Session => "session",
            Self::Credential => "credential",
            Self::Verification => "verification",
        }
    }

    /// Returns `true` for kinds that can carry a geographic location and be
    /// targeted by proximity search.
    #[must_use]
    pub fn is_locatable(&self) -> bool {
        matches!(self, Self::Doctor | Self::Clinic)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Self::Doctor),
            "clinic" => Ok(Self::Clinic),
            "patient" => Ok(Self::Patient),
            "appointment" => Ok(Self::Appointment),
            "session" => Ok(Self::Session),
            "credential" => Ok(Self::Credential),
            "verification" => Ok(Self::Verification),
            other => Err(CoreError::invalid_entity_kind(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_form_round_trip() {
        for kind in EntityKind::ALL {
            let parsed: EntityKind = kind.as_str().parse().expect("round trip");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_wire_form_is_lowercase() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str(), kind.as_str().to_lowercase());
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = "pharmacy".parse::<EntityKind>().unwrap_err();
        assert!(err.to_string().contains("pharmacy"));
    }

    #[test]
    fn test_serde_matches_wire_form() {
        let json = serde_json::to_string(&EntityKind::Doctor).unwrap();
        assert_eq!(json, "\"doctor\"");
    }

    #[test]
    fn test_locatable_kinds() {
        assert!(EntityKind::Doctor.is_locatable());
        assert!(EntityKind::Clinic.is_locatable());
        assert!(!EntityKind::Session.is_locatable());
    }
}
