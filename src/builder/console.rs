//! Console desired state: app and worker deployments plus the app service.

use k8s_openapi::api::core::v1::EnvVar;

use super::{component_labels, deployment, env, service, DesiredResource};
use crate::error::Result;
use crate::resolver::{ConsoleConfig, ImagesConfig};

const CONSOLE_PORT: i32 = 3000;

fn console_env(config: &ConsoleConfig) -> Vec<EnvVar> {
    vec![
        env("DATABASE_URL", config.database_url.clone()),
        env("SECRET_KEY_BASE", config.secret_key_base.clone()),
        env("MEMCACHE_SERVERS", config.memcache_servers.clone()),
        env("ADMIN_ENDPOINT", config.admin_endpoint.clone()),
    ]
}

/// Build every console child resource.
pub fn console_resources(
    config: &ConsoleConfig,
    images: &ImagesConfig,
    namespace: &str,
) -> Result<Vec<DesiredResource>> {
    let labels = component_labels(&config.identity.app_label, "console");

    Ok(vec![
        deployment(
            namespace,
            "console-app",
            labels.clone(),
            config.app_replicas,
            &images.console,
            CONSOLE_PORT,
            console_env(config),
            &config.app_resources,
        )?,
        deployment(
            namespace,
            "console-worker",
            labels.clone(),
            config.worker_replicas,
            &images.console,
            CONSOLE_PORT,
            console_env(config),
            &config.worker_resources,
        )?,
        service(namespace, "console", labels, "console-app", CONSOLE_PORT)?,
    ])
}
