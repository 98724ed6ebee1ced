//! # Desired State Builder
//!
//! Pure templating from resolved configurations to child-resource bodies.
//! Builders perform no cluster reads and have no side effects; outputs are
//! plain values testable by equality.
//!
//! Monitoring resources (dashboards, alert rules, scrape endpoints) are
//! always built here regardless of whether their kinds are registered in the
//! target cluster; the apply/skip decision belongs to the reconciler.

mod backend;
mod cache;
mod console;
mod gateway;
mod monitoring;
mod sync;

pub use backend::backend_resources;
pub use cache::cache_resources;
pub use console::console_resources;
pub use gateway::gateway_resources;
pub use monitoring::monitoring_resources;
pub use sync::sync_resources;

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    ConfigMap, Container, ContainerPort, EnvVar, PodSpec, PodTemplateSpec, ResourceRequirements,
    Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::{DynamicObject, TypeMeta};

use crate::error::Result;
use crate::store::ResourceKind;

/// One fully rendered child resource: the kind it belongs to and its body.
///
/// The owner reference is stamped by the reconciler from the managing
/// `AppPlatform`; builders stay ignorant of cluster identity.
#[derive(Debug, Clone)]
pub struct DesiredResource {
    /// Kind of the resource
    pub kind: ResourceKind,
    /// Full desired body
    pub object: DynamicObject,
}

impl DesiredResource {
    /// Resource name
    pub fn name(&self) -> &str {
        self.object.metadata.name.as_deref().unwrap_or("unknown")
    }

    /// Resource namespace
    pub fn namespace(&self) -> &str {
        self.object.metadata.namespace.as_deref().unwrap_or("default")
    }
}

/// Standard labels for a managed resource.
pub(crate) fn component_labels(
    app_label: &str,
    component: &str,
) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_string(), app_label.to_string());
    labels.insert(
        "app.kubernetes.io/component".to_string(),
        component.to_string(),
    );
    labels.insert(
        "app.kubernetes.io/managed-by".to_string(),
        "platform-operator".to_string(),
    );
    labels
}

/// Convert a typed or raw JSON body into a `DynamicObject` with the kind's
/// type metadata attached.
pub(crate) fn to_dynamic(kind: &ResourceKind, body: serde_json::Value) -> Result<DesiredResource> {
    let mut object: DynamicObject = serde_json::from_value(body)?;
    object.types = Some(TypeMeta {
        api_version: kind.api_version(),
        kind: kind.kind.to_string(),
    });
    Ok(DesiredResource {
        kind: kind.clone(),
        object,
    })
}

pub(crate) fn env(name: &str, value: impl Into<String>) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.into()),
        value_from: None,
    }
}

/// Build a single-container Deployment for one process role.
pub(crate) fn deployment(
    namespace: &str,
    name: &str,
    labels: BTreeMap<String, String>,
    replicas: i32,
    image: &str,
    container_port: i32,
    env: Vec<EnvVar>,
    resources: &ResourceRequirements,
) -> Result<DesiredResource> {
    let mut selector = BTreeMap::new();
    selector.insert("deployment".to_string(), name.to_string());

    let mut pod_labels = labels.clone();
    pod_labels.insert("deployment".to_string(), name.to_string());

    let body = Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(replicas),
            selector: LabelSelector {
                match_labels: Some(selector),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(pod_labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: name.to_string(),
                        image: Some(image.to_string()),
                        ports: Some(vec![ContainerPort {
                            container_port,
                            ..Default::default()
                        }]),
                        env: Some(env),
                        resources: Some(resources.clone()),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        status: None,
    };
    to_dynamic(&ResourceKind::DEPLOYMENT, serde_json::to_value(&body)?)
}

/// Build a ClusterIP Service selecting one deployment.
pub(crate) fn service(
    namespace: &str,
    name: &str,
    labels: BTreeMap<String, String>,
    target_deployment: &str,
    port: i32,
) -> Result<DesiredResource> {
    let mut selector = BTreeMap::new();
    selector.insert("deployment".to_string(), target_deployment.to_string());

    let body = Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                port,
                target_port: Some(IntOrString::Int(port)),
                ..Default::default()
            }]),
            selector: Some(selector),
            ..Default::default()
        }),
        status: None,
    };
    to_dynamic(&ResourceKind::SERVICE, serde_json::to_value(&body)?)
}

/// Build a ConfigMap.
pub(crate) fn config_map(
    namespace: &str,
    name: &str,
    labels: BTreeMap<String, String>,
    data: BTreeMap<String, String>,
) -> Result<DesiredResource> {
    let body = ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    };
    to_dynamic(&ResourceKind::CONFIG_MAP, serde_json::to_value(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_body_shape() {
        let labels = component_labels("platform", "backend");
        let desired = deployment(
            "acme",
            "backend-listener",
            labels,
            3,
            "quay.io/platformkit/backend:1.8",
            3000,
            vec![env("PORT", "3000")],
            &ResourceRequirements::default(),
        )
        .expect("builds");

        assert_eq!(desired.kind, ResourceKind::DEPLOYMENT);
        assert_eq!(desired.name(), "backend-listener");
        assert_eq!(desired.namespace(), "acme");

        let spec = &desired.object.data["spec"];
        assert_eq!(spec["replicas"], 3);
        assert_eq!(
            spec["selector"]["matchLabels"]["deployment"],
            "backend-listener"
        );
        assert_eq!(
            spec["template"]["spec"]["containers"][0]["image"],
            "quay.io/platformkit/backend:1.8"
        );
    }

    #[test]
    fn test_builders_are_deterministic() {
        let labels = component_labels("platform", "cache");
        let first = service("acme", "cache", labels.clone(), "cache", 11211).expect("builds");
        let second = service("acme", "cache", labels, "cache", 11211).expect("builds");
        assert_eq!(first.object.data, second.object.data);
        assert_eq!(first.object.metadata.labels, second.object.metadata.labels);
    }

    #[test]
    fn test_dynamic_object_carries_type_metadata() {
        let desired = config_map(
            "acme",
            "gateway-environment",
            component_labels("platform", "gateway"),
            BTreeMap::new(),
        )
        .expect("builds");
        let types = desired.object.types.as_ref().expect("types set");
        assert_eq!(types.api_version, "v1");
        assert_eq!(types.kind, "ConfigMap");
    }
}
