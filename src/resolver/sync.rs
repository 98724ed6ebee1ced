//! Sync service resolution.

use k8s_openapi::api::core::v1::ResourceRequirements;

use crate::catalog::{
    Catalog, SYNC_AUTHENTICATION_TOKEN_FIELD, SYNC_DATABASE_URL_FIELD, SYNC_SECRET,
};
use crate::crd::AppPlatformSpec;
use crate::error::Result;
use crate::resolver::{required_replicas, role_requirements, Identity};
use crate::store::SecretStore;

/// Fully-resolved sync configuration.
///
/// The database role is a fixed single instance and carries no replica field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncConfig {
    /// Shared identity fields
    pub identity: Identity,
    /// Database connection URL
    pub database_url: String,
    /// Shared authentication token
    pub authentication_token: String,
    /// App replicas
    pub app_replicas: i32,
    /// App resource requirements
    pub app_resources: ResourceRequirements,
    /// Database resource requirements
    pub database_resources: ResourceRequirements,
}

impl SyncConfig {
    fn validate(&self) -> Result<()> {
        self.identity.validate("sync")?;
        super::require("sync", "databaseUrl", &self.database_url)?;
        super::require("sync", "authenticationToken", &self.authentication_token)?;
        Ok(())
    }
}

/// Resolve the sync subcomponent.
pub async fn resolve_sync(
    spec: &AppPlatformSpec,
    catalog: &Catalog,
    secrets: &dyn SecretStore,
) -> Result<SyncConfig> {
    let mut config = SyncConfig {
        identity: Identity::from_spec(spec),
        ..Default::default()
    };

    config.database_url = secrets
        .field_or(
            SYNC_SECRET,
            SYNC_DATABASE_URL_FIELD,
            &catalog.sync.database_url,
        )
        .await?;
    config.authentication_token = secrets
        .field_or(
            SYNC_SECRET,
            SYNC_AUTHENTICATION_TOKEN_FIELD,
            &catalog.sync.authentication_token,
        )
        .await?;

    let enabled = spec.resource_requirements_enabled;
    config.app_resources = role_requirements(enabled, &catalog.profiles.sync_app);
    config.database_resources = role_requirements(enabled, &catalog.profiles.sync_database);

    config.app_replicas = required_replicas(
        "sync",
        "app.replicas",
        spec.sync.as_ref().and_then(|s| s.app.as_ref()),
    )?;

    config.validate()?;
    Ok(config)
}
