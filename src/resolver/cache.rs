//! Caching layer resolution.
//!
//! The cache is a fixed single instance: no replicas, no secret-backed
//! fields, only the footprint toggle.

use k8s_openapi::api::core::v1::ResourceRequirements;

use crate::catalog::Catalog;
use crate::crd::AppPlatformSpec;
use crate::error::Result;
use crate::resolver::{role_requirements, Identity};

/// Fully-resolved cache configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheConfig {
    /// Shared identity fields
    pub identity: Identity,
    /// Cache resource requirements
    pub resources: ResourceRequirements,
}

impl CacheConfig {
    fn validate(&self) -> Result<()> {
        self.identity.validate("cache")
    }
}

/// Resolve the cache subcomponent.
pub fn resolve_cache(spec: &AppPlatformSpec, catalog: &Catalog) -> Result<CacheConfig> {
    let config = CacheConfig {
        identity: Identity::from_spec(spec),
        resources: role_requirements(spec.resource_requirements_enabled, &catalog.profiles.cache),
    };
    config.validate()?;
    Ok(config)
}
