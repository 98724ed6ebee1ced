//! Management console resolution.

use k8s_openapi::api::core::v1::ResourceRequirements;

use crate::catalog::{
    Catalog, CONSOLE_APP_ADMIN_ENDPOINT_FIELD, CONSOLE_APP_SECRET,
    CONSOLE_APP_SECRET_KEY_BASE_FIELD, CONSOLE_DATABASE_SECRET, CONSOLE_DATABASE_URL_FIELD,
    CONSOLE_MEMCACHE_SECRET, CONSOLE_MEMCACHE_SERVERS_FIELD,
};
use crate::crd::AppPlatformSpec;
use crate::error::Result;
use crate::resolver::{required_replicas, role_requirements, Identity};
use crate::store::SecretStore;

/// Fully-resolved console configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsoleConfig {
    /// Shared identity fields
    pub identity: Identity,
    /// Database connection URL
    pub database_url: String,
    /// Session signing key
    pub secret_key_base: String,
    /// Cache server list
    pub memcache_servers: String,
    /// Externally reachable admin endpoint
    pub admin_endpoint: String,
    /// App replicas
    pub app_replicas: i32,
    /// Worker replicas
    pub worker_replicas: i32,
    /// App resource requirements
    pub app_resources: ResourceRequirements,
    /// Worker resource requirements
    pub worker_resources: ResourceRequirements,
}

impl ConsoleConfig {
    fn validate(&self) -> Result<()> {
        self.identity.validate("console")?;
        super::require("console", "databaseUrl", &self.database_url)?;
        super::require("console", "secretKeyBase", &self.secret_key_base)?;
        super::require("console", "memcacheServers", &self.memcache_servers)?;
        super::require("console", "adminEndpoint", &self.admin_endpoint)?;
        Ok(())
    }
}

/// Resolve the console subcomponent.
pub async fn resolve_console(
    spec: &AppPlatformSpec,
    catalog: &Catalog,
    secrets: &dyn SecretStore,
) -> Result<ConsoleConfig> {
    let identity = Identity::from_spec(spec);
    let defaults = &catalog.console;
    let admin_default = format!(
        "https://console-{}.{}",
        identity.tenant_name, identity.wildcard_domain
    );

    let mut config = ConsoleConfig {
        identity,
        ..Default::default()
    };

    config.database_url = secrets
        .field_or(
            CONSOLE_DATABASE_SECRET,
            CONSOLE_DATABASE_URL_FIELD,
            &defaults.database_url,
        )
        .await?;
    config.secret_key_base = secrets
        .field_or(
            CONSOLE_APP_SECRET,
            CONSOLE_APP_SECRET_KEY_BASE_FIELD,
            &defaults.secret_key_base,
        )
        .await?;
    config.admin_endpoint = secrets
        .field_or(
            CONSOLE_APP_SECRET,
            CONSOLE_APP_ADMIN_ENDPOINT_FIELD,
            &admin_default,
        )
        .await?;
    config.memcache_servers = secrets
        .field_or(
            CONSOLE_MEMCACHE_SECRET,
            CONSOLE_MEMCACHE_SERVERS_FIELD,
            &defaults.memcache_servers,
        )
        .await?;

    let enabled = spec.resource_requirements_enabled;
    config.app_resources = role_requirements(enabled, &catalog.profiles.console_app);
    config.worker_resources = role_requirements(enabled, &catalog.profiles.console_worker);

    let console = spec.console.as_ref();
    config.app_replicas = required_replicas(
        "console",
        "app.replicas",
        console.and_then(|c| c.app.as_ref()),
    )?;
    config.worker_replicas = required_replicas(
        "console",
        "worker.replicas",
        console.and_then(|c| c.worker.as_ref()),
    )?;

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{ConsoleSpec, RoleSpec};
    use crate::resolver::test_support::MapSecretStore;

    fn base_spec() -> AppPlatformSpec {
        AppPlatformSpec {
            app_label: Some("platform".to_string()),
            tenant_name: Some("acme".to_string()),
            wildcard_domain: Some("example.com".to_string()),
            resource_requirements_enabled: true,
            gateway: None,
            backend: None,
            console: Some(ConsoleSpec {
                image: None,
                app: Some(RoleSpec { replicas: Some(1) }),
                worker: Some(RoleSpec { replicas: Some(1) }),
            }),
            cache: None,
            sync: None,
        }
    }

    #[tokio::test]
    async fn test_admin_endpoint_templated_from_tenant_and_domain() {
        let config = resolve_console(&base_spec(), &Catalog::default(), &MapSecretStore::empty())
            .await
            .expect("resolves");
        assert_eq!(config.admin_endpoint, "https://console-acme.example.com");
    }

    #[tokio::test]
    async fn test_secret_values_win_over_defaults() {
        let secrets = MapSecretStore::empty()
            .with_field(
                CONSOLE_DATABASE_SECRET,
                CONSOLE_DATABASE_URL_FIELD,
                "mysql2://console:pw@db.external:3306/console",
            )
            .with_field(CONSOLE_APP_SECRET, CONSOLE_APP_SECRET_KEY_BASE_FIELD, "k")
            .with_field(
                CONSOLE_APP_SECRET,
                CONSOLE_APP_ADMIN_ENDPOINT_FIELD,
                "https://admin.acme.net",
            );
        let config = resolve_console(&base_spec(), &Catalog::default(), &secrets)
            .await
            .expect("resolves");
        assert_eq!(
            config.database_url,
            "mysql2://console:pw@db.external:3306/console"
        );
        assert_eq!(config.admin_endpoint, "https://admin.acme.net");
        assert_eq!(config.secret_key_base, "k");
    }
}
