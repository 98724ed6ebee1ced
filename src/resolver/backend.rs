//! Backend tier resolution.
//!
//! The backend carries the largest secret-backed surface: internal API
//! credentials, listener endpoints, and redis connection topology all live in
//! secrets, with computed defaults when the secrets are absent. The route
//! endpoint default is templated from the tenant name and wildcard domain.

use k8s_openapi::api::core::v1::ResourceRequirements;

use crate::catalog::{
    Catalog, BACKEND_INTERNAL_API_PASSWORD_FIELD, BACKEND_INTERNAL_API_SECRET,
    BACKEND_INTERNAL_API_USERNAME_FIELD, BACKEND_LISTENER_ROUTE_ENDPOINT_FIELD,
    BACKEND_LISTENER_SECRET, BACKEND_LISTENER_SERVICE_ENDPOINT_FIELD,
    BACKEND_REDIS_QUEUES_SENTINEL_HOSTS_FIELD, BACKEND_REDIS_QUEUES_SENTINEL_ROLE_FIELD,
    BACKEND_REDIS_QUEUES_URL_FIELD, BACKEND_REDIS_SECRET,
    BACKEND_REDIS_STORAGE_SENTINEL_HOSTS_FIELD, BACKEND_REDIS_STORAGE_SENTINEL_ROLE_FIELD,
    BACKEND_REDIS_STORAGE_URL_FIELD,
};
use crate::crd::AppPlatformSpec;
use crate::error::Result;
use crate::resolver::{required_replicas, role_requirements, Identity};
use crate::store::SecretStore;

/// Fully-resolved backend configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendConfig {
    /// Shared identity fields
    pub identity: Identity,
    /// Internal API username
    pub internal_api_username: String,
    /// Internal API password
    pub internal_api_password: String,
    /// In-cluster listener endpoint
    pub service_endpoint: String,
    /// Externally reachable route endpoint
    pub route_endpoint: String,
    /// Storage redis URL
    pub storage_url: String,
    /// Queues redis URL
    pub queues_url: String,
    /// Storage sentinel hosts
    pub storage_sentinel_hosts: String,
    /// Storage sentinel role
    pub storage_sentinel_role: String,
    /// Queues sentinel hosts
    pub queues_sentinel_hosts: String,
    /// Queues sentinel role
    pub queues_sentinel_role: String,
    /// Listener replicas
    pub listener_replicas: i32,
    /// Worker replicas
    pub worker_replicas: i32,
    /// Cron replicas
    pub cron_replicas: i32,
    /// Listener resource requirements
    pub listener_resources: ResourceRequirements,
    /// Worker resource requirements
    pub worker_resources: ResourceRequirements,
    /// Cron resource requirements
    pub cron_resources: ResourceRequirements,
}

impl BackendConfig {
    fn validate(&self) -> Result<()> {
        self.identity.validate("backend")?;
        super::require("backend", "internalApiUsername", &self.internal_api_username)?;
        super::require("backend", "internalApiPassword", &self.internal_api_password)?;
        super::require("backend", "serviceEndpoint", &self.service_endpoint)?;
        super::require("backend", "routeEndpoint", &self.route_endpoint)?;
        super::require("backend", "storageUrl", &self.storage_url)?;
        super::require("backend", "queuesUrl", &self.queues_url)?;
        // Sentinel topology is optional; replica counts are checked at
        // extraction time.
        Ok(())
    }
}

/// Resolve the backend subcomponent.
pub async fn resolve_backend(
    spec: &AppPlatformSpec,
    catalog: &Catalog,
    secrets: &dyn SecretStore,
) -> Result<BackendConfig> {
    let identity = Identity::from_spec(spec);
    let defaults = &catalog.backend;
    let route_default = format!(
        "https://backend-{}.{}",
        identity.tenant_name, identity.wildcard_domain
    );

    let mut config = BackendConfig {
        identity,
        ..Default::default()
    };

    config.internal_api_username = secrets
        .field_or(
            BACKEND_INTERNAL_API_SECRET,
            BACKEND_INTERNAL_API_USERNAME_FIELD,
            &defaults.internal_api_username,
        )
        .await?;
    config.internal_api_password = secrets
        .field_or(
            BACKEND_INTERNAL_API_SECRET,
            BACKEND_INTERNAL_API_PASSWORD_FIELD,
            &defaults.internal_api_password,
        )
        .await?;
    config.service_endpoint = secrets
        .field_or(
            BACKEND_LISTENER_SECRET,
            BACKEND_LISTENER_SERVICE_ENDPOINT_FIELD,
            &defaults.service_endpoint,
        )
        .await?;
    config.route_endpoint = secrets
        .field_or(
            BACKEND_LISTENER_SECRET,
            BACKEND_LISTENER_ROUTE_ENDPOINT_FIELD,
            &route_default,
        )
        .await?;
    config.storage_url = secrets
        .field_or(
            BACKEND_REDIS_SECRET,
            BACKEND_REDIS_STORAGE_URL_FIELD,
            &defaults.storage_url,
        )
        .await?;
    config.queues_url = secrets
        .field_or(
            BACKEND_REDIS_SECRET,
            BACKEND_REDIS_QUEUES_URL_FIELD,
            &defaults.queues_url,
        )
        .await?;
    config.storage_sentinel_hosts = secrets
        .field_or(
            BACKEND_REDIS_SECRET,
            BACKEND_REDIS_STORAGE_SENTINEL_HOSTS_FIELD,
            &defaults.storage_sentinel_hosts,
        )
        .await?;
    config.storage_sentinel_role = secrets
        .field_or(
            BACKEND_REDIS_SECRET,
            BACKEND_REDIS_STORAGE_SENTINEL_ROLE_FIELD,
            &defaults.storage_sentinel_role,
        )
        .await?;
    config.queues_sentinel_hosts = secrets
        .field_or(
            BACKEND_REDIS_SECRET,
            BACKEND_REDIS_QUEUES_SENTINEL_HOSTS_FIELD,
            &defaults.queues_sentinel_hosts,
        )
        .await?;
    config.queues_sentinel_role = secrets
        .field_or(
            BACKEND_REDIS_SECRET,
            BACKEND_REDIS_QUEUES_SENTINEL_ROLE_FIELD,
            &defaults.queues_sentinel_role,
        )
        .await?;

    let enabled = spec.resource_requirements_enabled;
    config.listener_resources = role_requirements(enabled, &catalog.profiles.backend_listener);
    config.worker_resources = role_requirements(enabled, &catalog.profiles.backend_worker);
    config.cron_resources = role_requirements(enabled, &catalog.profiles.backend_cron);

    let backend = spec.backend.as_ref();
    config.listener_replicas = required_replicas(
        "backend",
        "listener.replicas",
        backend.and_then(|b| b.listener.as_ref()),
    )?;
    config.worker_replicas = required_replicas(
        "backend",
        "worker.replicas",
        backend.and_then(|b| b.worker.as_ref()),
    )?;
    config.cron_replicas = required_replicas(
        "backend",
        "cron.replicas",
        backend.and_then(|b| b.cron.as_ref()),
    )?;

    config.validate()?;
    Ok(config)
}
