//! Backend desired state: listener, worker, and cron deployments, the
//! listener service, and the monitoring set.

use k8s_openapi::api::core::v1::EnvVar;

use super::{component_labels, deployment, env, monitoring_resources, service, DesiredResource};
use crate::error::Result;
use crate::resolver::{BackendConfig, ImagesConfig};

const LISTENER_PORT: i32 = 3000;

fn redis_env(config: &BackendConfig) -> Vec<EnvVar> {
    vec![
        env("REDIS_STORAGE_URL", config.storage_url.clone()),
        env("REDIS_QUEUES_URL", config.queues_url.clone()),
        env(
            "REDIS_STORAGE_SENTINEL_HOSTS",
            config.storage_sentinel_hosts.clone(),
        ),
        env(
            "REDIS_STORAGE_SENTINEL_ROLE",
            config.storage_sentinel_role.clone(),
        ),
        env(
            "REDIS_QUEUES_SENTINEL_HOSTS",
            config.queues_sentinel_hosts.clone(),
        ),
        env(
            "REDIS_QUEUES_SENTINEL_ROLE",
            config.queues_sentinel_role.clone(),
        ),
    ]
}

/// Build every backend child resource.
pub fn backend_resources(
    config: &BackendConfig,
    images: &ImagesConfig,
    namespace: &str,
) -> Result<Vec<DesiredResource>> {
    let labels = component_labels(&config.identity.app_label, "backend");

    let mut listener_env = redis_env(config);
    listener_env.push(env("PORT", LISTENER_PORT.to_string()));
    listener_env.push(env(
        "INTERNAL_API_USER",
        config.internal_api_username.clone(),
    ));
    listener_env.push(env(
        "INTERNAL_API_PASSWORD",
        config.internal_api_password.clone(),
    ));

    let mut resources = vec![
        deployment(
            namespace,
            "backend-listener",
            labels.clone(),
            config.listener_replicas,
            &images.backend,
            LISTENER_PORT,
            listener_env,
            &config.listener_resources,
        )?,
        deployment(
            namespace,
            "backend-worker",
            labels.clone(),
            config.worker_replicas,
            &images.backend,
            LISTENER_PORT,
            redis_env(config),
            &config.worker_resources,
        )?,
        deployment(
            namespace,
            "backend-cron",
            labels.clone(),
            config.cron_replicas,
            &images.backend,
            LISTENER_PORT,
            redis_env(config),
            &config.cron_resources,
        )?,
        service(
            namespace,
            "backend-listener",
            labels.clone(),
            "backend-listener",
            LISTENER_PORT,
        )?,
    ];
    resources.extend(monitoring_resources(
        "backend",
        &config.identity.app_label,
        namespace,
    )?);
    Ok(resources)
}
