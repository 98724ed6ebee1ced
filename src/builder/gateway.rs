//! Gateway desired state: staging and production deployments, their
//! services, the environment config map, and the monitoring set.

use std::collections::BTreeMap;

use super::{component_labels, config_map, deployment, env, monitoring_resources, service, DesiredResource};
use crate::error::Result;
use crate::resolver::{GatewayConfig, ImagesConfig};

const GATEWAY_PORT: i32 = 8080;

/// Build every gateway child resource.
pub fn gateway_resources(
    config: &GatewayConfig,
    images: &ImagesConfig,
    namespace: &str,
) -> Result<Vec<DesiredResource>> {
    let labels = component_labels(&config.identity.app_label, "gateway");

    let environment = [
        ("MANAGEMENT_API", config.management_api.clone()),
        ("OPENSSL_VERIFY", config.openssl_verify.to_string()),
        ("RESPONSE_CODES", config.response_codes.to_string()),
    ];
    let env_vars = || environment.iter().map(|(k, v)| env(k, v.clone())).collect();
    let data: BTreeMap<String, String> = environment
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();

    let mut resources = vec![
        config_map(namespace, "gateway-environment", labels.clone(), data)?,
        deployment(
            namespace,
            "gateway-staging",
            labels.clone(),
            config.staging_replicas,
            &images.gateway,
            GATEWAY_PORT,
            env_vars(),
            &config.staging_resources,
        )?,
        deployment(
            namespace,
            "gateway-production",
            labels.clone(),
            config.production_replicas,
            &images.gateway,
            GATEWAY_PORT,
            env_vars(),
            &config.production_resources,
        )?,
        service(
            namespace,
            "gateway-staging",
            labels.clone(),
            "gateway-staging",
            GATEWAY_PORT,
        )?,
        service(
            namespace,
            "gateway-production",
            labels.clone(),
            "gateway-production",
            GATEWAY_PORT,
        )?,
    ];
    resources.extend(monitoring_resources(
        "gateway",
        &config.identity.app_label,
        namespace,
    )?);
    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Identity;
    use crate::store::ResourceKind;

    fn config() -> GatewayConfig {
        GatewayConfig {
            identity: Identity {
                app_label: "platform".to_string(),
                tenant_name: "acme".to_string(),
                wildcard_domain: "example.com".to_string(),
            },
            management_api: "status".to_string(),
            openssl_verify: false,
            response_codes: true,
            staging_replicas: 1,
            production_replicas: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_gateway_builds_workloads_services_and_monitoring() {
        let images = ImagesConfig {
            gateway: "quay.io/platformkit/gateway:1.8".to_string(),
            ..Default::default()
        };
        let resources = gateway_resources(&config(), &images, "acme").expect("builds");

        let deployments: Vec<_> = resources
            .iter()
            .filter(|r| r.kind == ResourceKind::DEPLOYMENT)
            .collect();
        assert_eq!(deployments.len(), 2);
        assert_eq!(deployments[0].object.data["spec"]["replicas"], 1);
        assert_eq!(deployments[1].object.data["spec"]["replicas"], 2);

        assert!(resources.iter().any(|r| r.kind == ResourceKind::SERVICE_MONITOR));
        assert!(resources.iter().any(|r| r.kind == ResourceKind::PROMETHEUS_RULE));
        assert!(resources.iter().any(|r| r.kind == ResourceKind::GRAFANA_DASHBOARD));
    }

    #[test]
    fn test_environment_config_map_tracks_tuning_flags() {
        let images = ImagesConfig::default();
        let resources = gateway_resources(&config(), &images, "acme").expect("builds");
        let cm = resources
            .iter()
            .find(|r| r.kind == ResourceKind::CONFIG_MAP)
            .expect("config map present");
        assert_eq!(cm.object.data["data"]["MANAGEMENT_API"], "status");
        assert_eq!(cm.object.data["data"]["OPENSSL_VERIFY"], "false");
        assert_eq!(cm.object.data["data"]["RESPONSE_CODES"], "true");
    }
}
