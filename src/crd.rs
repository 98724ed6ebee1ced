//! # Custom Resource Definition
//!
//! The `AppPlatform` resource is the single declarative input for one managed
//! platform instance. Each subcomponent section is optional; unset fields fall
//! back to catalog defaults during resolution.
//!
//! Secret-backed settings (credentials, endpoints, connection URLs) are
//! intentionally absent from this schema. They are managed through Kubernetes
//! secrets in the instance namespace and resolved by the resolver layer.
//!
//! # Example
//!
//! ```yaml
//! apiVersion: apps.platformkit.io/v1alpha1
//! kind: AppPlatform
//! metadata:
//!   name: acme-platform
//!   namespace: acme
//! spec:
//!   appLabel: platform
//!   tenantName: acme
//!   wildcardDomain: example.com
//!   resourceRequirementsEnabled: false
//!   gateway:
//!     staging:
//!       replicas: 1
//!     production:
//!       replicas: 2
//!   backend:
//!     listener:
//!       replicas: 3
//!     worker:
//!       replicas: 2
//!     cron:
//!       replicas: 1
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// AppPlatform custom resource.
///
/// One `AppPlatform` per managed platform instance. The operator converges
/// the gateway, backend, console, cache, and sync subcomponents toward this
/// declaration.
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "apps.platformkit.io",
    version = "v1alpha1",
    kind = "AppPlatform",
    namespaced,
    status = "AppPlatformStatus",
    printcolumn = r#"{"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct AppPlatformSpec {
    /// Label applied to every managed child resource (`app` label value)
    #[serde(default)]
    pub app_label: Option<String>,
    /// Tenant name, used for templated external endpoints
    #[serde(default)]
    pub tenant_name: Option<String>,
    /// Wildcard DNS domain under which external routes are published
    #[serde(default)]
    pub wildcard_domain: Option<String>,
    /// When true, every process role gets the default CPU/memory
    /// requests and limits; when false all roles run unconstrained
    #[serde(default = "default_true")]
    pub resource_requirements_enabled: bool,
    /// API gateway tier (staging and production)
    #[serde(default)]
    pub gateway: Option<GatewaySpec>,
    /// Backend processing tier (listener, worker, cron)
    #[serde(default)]
    pub backend: Option<BackendSpec>,
    /// Management console
    #[serde(default)]
    pub console: Option<ConsoleSpec>,
    /// Caching layer
    #[serde(default)]
    pub cache: Option<CacheSpec>,
    /// Sync service
    #[serde(default)]
    pub sync: Option<SyncSpec>,
}

pub(crate) fn default_true() -> bool {
    true
}

/// Replica declaration for one process role.
///
/// Replicas carry no implicit default; a missing count is a validation error
/// for the owning subcomponent.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleSpec {
    /// Desired replica count for this role
    #[serde(default)]
    pub replicas: Option<i32>,
}

/// API gateway configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    /// Container image override; catalog default when unset
    #[serde(default)]
    pub image: Option<String>,
    /// Gateway management API mode (e.g. "status", "debug")
    #[serde(default)]
    pub management_api: Option<String>,
    /// Verify upstream TLS certificates
    #[serde(default)]
    pub openssl_verify: Option<bool>,
    /// Include response codes in gateway analytics
    #[serde(default)]
    pub response_codes: Option<bool>,
    /// Staging gateway role
    #[serde(default)]
    pub staging: Option<RoleSpec>,
    /// Production gateway role
    #[serde(default)]
    pub production: Option<RoleSpec>,
}

/// Backend tier configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackendSpec {
    /// Container image override; catalog default when unset
    #[serde(default)]
    pub image: Option<String>,
    /// Listener role (serves the internal API)
    #[serde(default)]
    pub listener: Option<RoleSpec>,
    /// Worker role (processes queued jobs)
    #[serde(default)]
    pub worker: Option<RoleSpec>,
    /// Cron role (scheduled jobs)
    #[serde(default)]
    pub cron: Option<RoleSpec>,
}

/// Management console configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleSpec {
    /// Container image override; catalog default when unset
    #[serde(default)]
    pub image: Option<String>,
    /// Console web application role
    #[serde(default)]
    pub app: Option<RoleSpec>,
    /// Console background worker role
    #[serde(default)]
    pub worker: Option<RoleSpec>,
}

/// Caching layer configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheSpec {
    /// Container image override; catalog default when unset
    #[serde(default)]
    pub image: Option<String>,
}

/// Sync service configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncSpec {
    /// Container image override; catalog default when unset
    #[serde(default)]
    pub image: Option<String>,
    /// Database image override; catalog default when unset
    #[serde(default)]
    pub database_image: Option<String>,
    /// Sync application role
    #[serde(default)]
    pub app: Option<RoleSpec>,
}

/// Status of the AppPlatform resource
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppPlatformStatus {
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Generation most recently acted upon
    #[serde(default)]
    pub observed_generation: Option<i64>,
    /// Last reconciliation time
    #[serde(default)]
    pub last_reconcile_time: Option<String>,
}

/// Condition represents a status condition for the resource
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing condition
    #[serde(default)]
    pub message: Option<String>,
}
