//! Container image resolution.
//!
//! Every image defaults to the release-pinned catalog value and is overridden
//! only when the owning subcomponent section sets one explicitly.

use crate::catalog::Catalog;
use crate::crd::AppPlatformSpec;
use crate::error::Result;

/// Fully-resolved image set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagesConfig {
    /// API gateway image
    pub gateway: String,
    /// Backend image
    pub backend: String,
    /// Console image
    pub console: String,
    /// Cache image
    pub cache: String,
    /// Sync image
    pub sync: String,
    /// Sync database image
    pub sync_database: String,
}

impl ImagesConfig {
    fn validate(&self) -> Result<()> {
        super::require("images", "gateway", &self.gateway)?;
        super::require("images", "backend", &self.backend)?;
        super::require("images", "console", &self.console)?;
        super::require("images", "cache", &self.cache)?;
        super::require("images", "sync", &self.sync)?;
        super::require("images", "syncDatabase", &self.sync_database)?;
        Ok(())
    }
}

/// Resolve the image set for every subcomponent.
pub fn resolve_images(spec: &AppPlatformSpec, catalog: &Catalog) -> Result<ImagesConfig> {
    let defaults = &catalog.images;
    let config = ImagesConfig {
        gateway: spec
            .gateway
            .as_ref()
            .and_then(|g| g.image.clone())
            .unwrap_or_else(|| defaults.gateway.clone()),
        backend: spec
            .backend
            .as_ref()
            .and_then(|b| b.image.clone())
            .unwrap_or_else(|| defaults.backend.clone()),
        console: spec
            .console
            .as_ref()
            .and_then(|c| c.image.clone())
            .unwrap_or_else(|| defaults.console.clone()),
        cache: spec
            .cache
            .as_ref()
            .and_then(|c| c.image.clone())
            .unwrap_or_else(|| defaults.cache.clone()),
        sync: spec
            .sync
            .as_ref()
            .and_then(|s| s.image.clone())
            .unwrap_or_else(|| defaults.sync.clone()),
        sync_database: spec
            .sync
            .as_ref()
            .and_then(|s| s.database_image.clone())
            .unwrap_or_else(|| defaults.sync_database.clone()),
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::GatewaySpec;

    #[test]
    fn test_catalog_defaults_used_when_unset() {
        let spec = AppPlatformSpec {
            app_label: Some("platform".to_string()),
            tenant_name: Some("acme".to_string()),
            wildcard_domain: Some("example.com".to_string()),
            resource_requirements_enabled: true,
            gateway: None,
            backend: None,
            console: None,
            cache: None,
            sync: None,
        };
        let catalog = Catalog::default();
        let images = resolve_images(&spec, &catalog).expect("resolves");
        assert_eq!(images.gateway, catalog.images.gateway);
        assert_eq!(images.sync_database, catalog.images.sync_database);
    }

    #[test]
    fn test_explicit_image_overrides_catalog() {
        let spec = AppPlatformSpec {
            app_label: Some("platform".to_string()),
            tenant_name: Some("acme".to_string()),
            wildcard_domain: Some("example.com".to_string()),
            resource_requirements_enabled: true,
            gateway: Some(GatewaySpec {
                image: Some("registry.example.com/custom/gateway:2.0".to_string()),
                ..Default::default()
            }),
            backend: None,
            console: None,
            cache: None,
            sync: None,
        };
        let catalog = Catalog::default();
        let images = resolve_images(&spec, &catalog).expect("resolves");
        assert_eq!(images.gateway, "registry.example.com/custom/gateway:2.0");
        assert_eq!(images.backend, catalog.images.backend);
    }
}
