use thiserror::Error;

/// Core error types for Medbook domain operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid entity kind: {0}")]
    InvalidEntityKind(String),

    #[error("Invalid {axis}: {value} is out of range")]
    InvalidCoordinate { axis: &'static str, value: f64 },

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new InvalidEntityKind error
    pub fn invalid_entity_kind(kind: impl Into<String>) -> Self {
        Self::InvalidEntityKind(kind.into())
    }

    /// Create a new InvalidCoordinate error
    pub fn invalid_coordinate(axis: &'static str, value: f64) -> Self {
        Self::InvalidCoordinate { axis, value }
    }

    /// Create a new InvalidId error
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }

    /// Check if this error is a client error (caller supplied bad input)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidEntityKind(_) | Self::InvalidCoordinate { .. } | Self::InvalidId(_)
        )
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidEntityKind(_) | Self::InvalidCoordinate { .. } | Self::InvalidId(_) => {
                ErrorCategory::Validation
            }
            Self::JsonError(_) => ErrorCategory::Serialization,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Serialization,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Serialization => write!(f, "serialization"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CoreError::invalid_entity_kind("pharmacy");
        assert_eq!(err.to_string(), "Invalid entity kind: pharmacy");
        assert!(err.is_client_error());
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_coordinate_error_message() {
        let err = CoreError::invalid_coordinate("latitude", 91.5);
        assert_eq!(err.to_string(), "Invalid latitude: 91.5 is out of range");
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope }").unwrap_err();
        let core_err: CoreError = json_err.into();
        assert!(matches!(core_err, CoreError::JsonError(_)));
        assert_eq!(core_err.category(), ErrorCategory::Serialization);
        assert!(!core_err.is_client_error());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::Serialization.to_string(), "serialization");
    }
}
