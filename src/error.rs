//! Error types for the platform operator

use thiserror::Error;

/// Main error type for reconciliation passes.
///
/// Every failure bubbles up to the single reconcile return carrying enough
/// identification (kind, name, subcomponent) to log and act on. The core
/// performs no internal retries; the watch layer owns retry timing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A resolved configuration is missing a required field. Fatal for the
    /// owning subcomponent; no cluster mutation is attempted for it.
    #[error("validation error: {component}: missing required field {field}")]
    Validation {
        /// Subcomponent whose configuration failed validation
        component: String,
        /// Field that was empty or unset
        field: String,
    },

    /// A secret exists but lacks the requested field. Never silently
    /// defaulted.
    #[error("secret {secret} exists but has no field {field}")]
    SecretField {
        /// Secret name
        secret: String,
        /// Missing field name
        field: String,
    },

    /// Concurrency-token mismatch on update. Surfaced for external retry.
    #[error("conflict updating {kind} {name}: resource version changed")]
    Conflict {
        /// Resource kind
        kind: String,
        /// Resource name
        name: String,
    },

    /// Creation race: the object appeared between fetch and create.
    #[error("{kind} {name} already exists")]
    AlreadyExists {
        /// Resource kind
        kind: String,
        /// Resource name
        name: String,
    },

    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Serialization/deserialization error while shaping resource bodies
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error for the given subcomponent and field
    pub fn validation(component: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            component: component.into(),
            field: field.into(),
        }
    }

    /// Create a missing-secret-field error
    pub fn secret_field(secret: impl Into<String>, field: impl Into<String>) -> Self {
        Self::SecretField {
            secret: secret.into(),
            field: field.into(),
        }
    }

    /// Create a conflict error for the given object
    pub fn conflict(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Conflict {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an already-exists error for the given object
    pub fn already_exists(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_component_and_field() {
        let err = Error::validation("backend", "tenantName");
        assert!(err.to_string().contains("backend"));
        assert!(err.to_string().contains("tenantName"));
    }

    #[test]
    fn test_secret_field_error_is_distinct_from_validation() {
        let err = Error::secret_field("backend-redis", "storage-url");
        match err {
            Error::SecretField { secret, field } => {
                assert_eq!(secret, "backend-redis");
                assert_eq!(field, "storage-url");
            }
            _ => panic!("expected SecretField variant"),
        }
    }

    #[test]
    fn test_conflict_and_already_exists_carry_object_identity() {
        let conflict = Error::conflict("Deployment", "backend-listener");
        assert!(conflict.to_string().contains("backend-listener"));

        let exists = Error::already_exists("Service", "gateway-production");
        assert!(exists.to_string().contains("gateway-production"));
    }
}
