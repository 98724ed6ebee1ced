//! # Resolver
//!
//! Turns one `AppPlatformSpec` plus externally stored secret values into a
//! fully-resolved, validated configuration per subcomponent.
//!
//! Resolution order per subcomponent is fixed: identity fields, images,
//! secret-backed fields, resource footprint, replica counts. Each resolved
//! config is validated before any desired state is built or any cluster call
//! is made; a failed validation aborts the pass with no mutation attempted
//! for that subcomponent.
//!
//! Secret-backed fields follow one rule: a present secret field wins, an
//! absent secret falls back to the computed default, and a secret that exists
//! without the requested field is a fatal error. The root spec deliberately
//! offers no override path for these fields.

mod backend;
mod cache;
mod console;
mod gateway;
mod images;
mod sync;

pub use backend::{resolve_backend, BackendConfig};
pub use cache::{resolve_cache, CacheConfig};
pub use console::{resolve_console, ConsoleConfig};
pub use gateway::{resolve_gateway, GatewayConfig};
pub use images::{resolve_images, ImagesConfig};
pub use sync::{resolve_sync, SyncConfig};

use k8s_openapi::api::core::v1::ResourceRequirements;

use crate::crd::{AppPlatformSpec, RoleSpec};
use crate::error::{Error, Result};

/// Identity fields shared by every subcomponent, copied from the root spec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// Value of the `app` label on every managed resource
    pub app_label: String,
    /// Tenant name
    pub tenant_name: String,
    /// Wildcard DNS domain
    pub wildcard_domain: String,
}

impl Identity {
    pub(crate) fn from_spec(spec: &AppPlatformSpec) -> Self {
        Self {
            app_label: spec.app_label.clone().unwrap_or_default(),
            tenant_name: spec.tenant_name.clone().unwrap_or_default(),
            wildcard_domain: spec.wildcard_domain.clone().unwrap_or_default(),
        }
    }

    pub(crate) fn validate(&self, component: &str) -> Result<()> {
        require(component, "appLabel", &self.app_label)?;
        require(component, "tenantName", &self.tenant_name)?;
        require(component, "wildcardDomain", &self.wildcard_domain)?;
        Ok(())
    }
}

/// Reject an empty required string field.
pub(crate) fn require(component: &str, field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(component, field));
    }
    Ok(())
}

/// Replica counts carry no implicit default.
pub(crate) fn required_replicas(
    component: &str,
    field: &str,
    role: Option<&RoleSpec>,
) -> Result<i32> {
    match role.and_then(|r| r.replicas) {
        Some(replicas) if replicas > 0 => Ok(replicas),
        _ => Err(Error::validation(component, field)),
    }
}

/// Apply the resource-footprint toggle: the fixed profile when enabled,
/// unconstrained requirements when disabled.
pub(crate) fn role_requirements(
    enabled: bool,
    profile: &ResourceRequirements,
) -> ResourceRequirements {
    if enabled {
        profile.clone()
    } else {
        ResourceRequirements::default()
    }
}
