//! # Cluster and Secret Stores
//!
//! Abstract interfaces over the Kubernetes API consumed by the reconciliation
//! core, plus their client-backed implementations.
//!
//! The core never talks to `kube::Client` directly. It sees:
//! - [`ClusterStore`] — fetch/create/update child resources and query whether
//!   a kind is registered with the API server
//! - [`SecretStore`] — look up externally managed secret fields with a
//!   computed fallback
//!
//! Both are object-safe async traits so tests can substitute in-memory fakes.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, ApiResource, DynamicObject, PostParams};
use kube::core::GroupVersionKind;
use kube::Client;
use tracing::debug;

use crate::error::{Error, Result};

/// Identity of a child-resource kind managed by the operator.
///
/// `optional` marks companion kinds (monitoring CRDs) that may not be
/// registered in a given cluster; reconciliation skips them instead of
/// failing when the API server does not know the kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceKind {
    /// API group ("" for core)
    pub group: &'static str,
    /// API version
    pub version: &'static str,
    /// Kind name
    pub kind: &'static str,
    /// Plural resource name
    pub plural: &'static str,
    /// Whether the kind may legitimately be absent from the cluster
    pub optional: bool,
}

impl ResourceKind {
    /// apps/v1 Deployment
    pub const DEPLOYMENT: ResourceKind = ResourceKind {
        group: "apps",
        version: "v1",
        kind: "Deployment",
        plural: "deployments",
        optional: false,
    };

    /// v1 Service
    pub const SERVICE: ResourceKind = ResourceKind {
        group: "",
        version: "v1",
        kind: "Service",
        plural: "services",
        optional: false,
    };

    /// v1 ConfigMap
    pub const CONFIG_MAP: ResourceKind = ResourceKind {
        group: "",
        version: "v1",
        kind: "ConfigMap",
        plural: "configmaps",
        optional: false,
    };

    /// integreatly.org/v1alpha1 GrafanaDashboard (optional companion kind)
    pub const GRAFANA_DASHBOARD: ResourceKind = ResourceKind {
        group: "integreatly.org",
        version: "v1alpha1",
        kind: "GrafanaDashboard",
        plural: "grafanadashboards",
        optional: true,
    };

    /// monitoring.coreos.com/v1 PrometheusRule (optional companion kind)
    pub const PROMETHEUS_RULE: ResourceKind = ResourceKind {
        group: "monitoring.coreos.com",
        version: "v1",
        kind: "PrometheusRule",
        plural: "prometheusrules",
        optional: true,
    };

    /// monitoring.coreos.com/v1 ServiceMonitor (optional companion kind)
    pub const SERVICE_MONITOR: ResourceKind = ResourceKind {
        group: "monitoring.coreos.com",
        version: "v1",
        kind: "ServiceMonitor",
        plural: "servicemonitors",
        optional: true,
    };

    /// `group/version` string, or bare version for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Typed group-version-kind for API resource construction
    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind {
            group: self.group.to_string(),
            version: self.version.to_string(),
            kind: self.kind.to_string(),
        }
    }
}

/// Cluster-facing store for managed child resources.
#[async_trait]
pub trait ClusterStore: Send + Sync {
    /// Fetch a live object. `Ok(None)` is the normal not-found branch, not an
    /// error.
    async fn get(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Option<DynamicObject>>;

    /// Create a new object. A creation race (object already present) is
    /// surfaced as [`Error::AlreadyExists`].
    async fn create(&self, kind: &ResourceKind, object: &DynamicObject) -> Result<DynamicObject>;

    /// Replace an existing object, guarded by the `resourceVersion` carried
    /// in `object`. A token mismatch is surfaced as [`Error::Conflict`] and
    /// never retried here.
    async fn update(&self, kind: &ResourceKind, object: &DynamicObject) -> Result<DynamicObject>;

    /// Whether the kind is registered with the API server.
    async fn is_registered(&self, kind: &ResourceKind) -> Result<bool>;
}

/// External key-value lookup for secret-backed configuration fields.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Return the stored value of `field` in `secret`, or `default` when the
    /// secret does not exist at all. Fails only when the secret exists but
    /// lacks the field.
    async fn field_or(&self, secret: &str, field: &str, default: &str) -> Result<String>;
}

/// [`ClusterStore`] backed by the Kubernetes API via dynamic typing.
#[derive(Clone)]
pub struct KubeClusterStore {
    client: Client,
}

impl std::fmt::Debug for KubeClusterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterStore").finish_non_exhaustive()
    }
}

impl KubeClusterStore {
    /// Create a store over the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, kind: &ResourceKind, namespace: &str) -> Api<DynamicObject> {
        let ar = ApiResource::from_gvk(&kind.gvk());
        Api::namespaced_with(self.client.clone(), namespace, &ar)
    }
}

fn object_name(object: &DynamicObject) -> &str {
    object.metadata.name.as_deref().unwrap_or("unknown")
}

fn object_namespace(object: &DynamicObject) -> &str {
    object.metadata.namespace.as_deref().unwrap_or("default")
}

#[async_trait]
impl ClusterStore for KubeClusterStore {
    async fn get(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Option<DynamicObject>> {
        match self.api(kind, namespace).get(name).await {
            Ok(object) => Ok(Some(object)),
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => Ok(None),
            Err(e) => Err(Error::Kube(e)),
        }
    }

    async fn create(&self, kind: &ResourceKind, object: &DynamicObject) -> Result<DynamicObject> {
        let api = self.api(kind, object_namespace(object));
        match api.create(&PostParams::default(), object).await {
            Ok(created) => Ok(created),
            Err(kube::Error::Api(api_err)) if api_err.code == 409 => {
                Err(Error::already_exists(kind.kind, object_name(object)))
            }
            Err(e) => Err(Error::Kube(e)),
        }
    }

    async fn update(&self, kind: &ResourceKind, object: &DynamicObject) -> Result<DynamicObject> {
        let api = self.api(kind, object_namespace(object));
        let name = object_name(object).to_string();
        match api.replace(&name, &PostParams::default(), object).await {
            Ok(updated) => Ok(updated),
            Err(kube::Error::Api(api_err)) if api_err.code == 409 => {
                Err(Error::conflict(kind.kind, name))
            }
            Err(e) => Err(Error::Kube(e)),
        }
    }

    async fn is_registered(&self, kind: &ResourceKind) -> Result<bool> {
        match kube::discovery::oneshot::pinned_kind(&self.client, &kind.gvk()).await {
            Ok(_) => Ok(true),
            // Discovery reports a missing group or kind; the API server
            // answers 404 for a group it has never heard of.
            Err(kube::Error::Discovery(_)) => {
                debug!("kind {} not registered with the API server", kind.kind);
                Ok(false)
            }
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
                debug!("kind {} not registered with the API server", kind.kind);
                Ok(false)
            }
            Err(e) => Err(Error::Kube(e)),
        }
    }
}

/// [`SecretStore`] reading `v1/Secret` objects in the instance namespace.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
    namespace: String,
}

impl std::fmt::Debug for KubeSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl KubeSecretStore {
    /// Create a store scoped to one namespace
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn field_or(&self, secret: &str, field: &str, default: &str) -> Result<String> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), &self.namespace);
        let found = match api.get(secret).await {
            Ok(found) => found,
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
                return Ok(default.to_string());
            }
            Err(e) => return Err(Error::Kube(e)),
        };

        // The secret is present: the field must be too.
        let data = found.data.unwrap_or_default();
        match data.get(field) {
            Some(bytes) => String::from_utf8(bytes.0.clone())
                .map_err(|_| Error::secret_field(secret, field)),
            None => Err(Error::secret_field(secret, field)),
        }
    }
}
