//! # Controller glue
//!
//! Wires the convergence core into a `kube_runtime::Controller` watch loop:
//! builds per-pass stores, runs the orchestrator, records a `Ready`
//! condition on the `AppPlatform` status, and maps errors to a fixed
//! requeue. Retry and backoff timing live here, outside the core.

use std::sync::Arc;

use futures::StreamExt;
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use kube_runtime::controller::Action;
use kube_runtime::{watcher, Controller};
use thiserror::Error;
use tracing::{error, info};

use crate::catalog::Catalog;
use crate::constants::DEFAULT_ERROR_REQUEUE_SECS;
use crate::crd::{AppPlatform, AppPlatformStatus, Condition};
use crate::orchestrator::Orchestrator;
use crate::store::{KubeClusterStore, KubeSecretStore};

/// Error type surfaced to the watch loop.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A reconciliation pass failed
    #[error("reconciliation failed: {0}")]
    Pass(#[from] crate::error::Error),
    /// Status update failed after an otherwise successful pass
    #[error("status update failed: {0}")]
    Status(#[source] kube::Error),
}

/// Shared context for every reconcile invocation.
pub struct Context {
    client: Client,
    catalog: Catalog,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}

impl Context {
    /// Create the shared context
    pub fn new(client: Client, catalog: Catalog) -> Self {
        Self { client, catalog }
    }
}

/// Reconcile one `AppPlatform`.
pub async fn reconcile(
    platform: Arc<AppPlatform>,
    ctx: Arc<Context>,
) -> Result<Action, ControllerError> {
    let name = platform.metadata.name.as_deref().unwrap_or("unknown");
    let namespace = platform.metadata.namespace.as_deref().unwrap_or("default");
    info!("reconciling AppPlatform {}/{}", namespace, name);

    let cluster = Arc::new(KubeClusterStore::new(ctx.client.clone()));
    let secrets = Arc::new(KubeSecretStore::new(ctx.client.clone(), namespace));
    let orchestrator = Orchestrator::new(cluster, secrets, ctx.catalog.clone());

    let summary = orchestrator.reconcile(&platform).await?;

    update_status(&ctx.client, &platform, summary.is_converged())
        .await
        .map_err(ControllerError::Status)?;

    match summary.requeue_hint {
        Some(interval) => Ok(Action::requeue(interval)),
        None => Ok(Action::await_change()),
    }
}

/// Map a failed pass to a fixed requeue; backoff policy lives with the
/// trigger layer, not the core.
pub fn error_policy(
    platform: Arc<AppPlatform>,
    error: &ControllerError,
    _ctx: Arc<Context>,
) -> Action {
    error!(
        "reconciliation error for {}: {}",
        platform.metadata.name.as_deref().unwrap_or("unknown"),
        error
    );
    Action::requeue(std::time::Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS))
}

async fn update_status(
    client: &Client,
    platform: &AppPlatform,
    converged: bool,
) -> Result<(), kube::Error> {
    let api: Api<AppPlatform> = Api::namespaced(
        client.clone(),
        platform.metadata.namespace.as_deref().unwrap_or("default"),
    );

    let status = AppPlatformStatus {
        conditions: vec![Condition {
            r#type: "Ready".to_string(),
            status: "True".to_string(),
            last_transition_time: Some(chrono::Utc::now().to_rfc3339()),
            reason: Some("ReconciliationSucceeded".to_string()),
            message: Some(if converged {
                "all child resources converged".to_string()
            } else {
                "child resources applied".to_string()
            }),
        }],
        observed_generation: platform.metadata.generation,
        last_reconcile_time: Some(chrono::Utc::now().to_rfc3339()),
    };

    api.patch_status(
        platform.metadata.name.as_deref().unwrap_or("unknown"),
        &PatchParams::apply("platform-operator"),
        &Patch::Merge(serde_json::json!({ "status": status })),
    )
    .await?;
    Ok(())
}

/// Run the watch loop until shutdown.
pub async fn run(client: Client) -> anyhow::Result<()> {
    let platforms: Api<AppPlatform> = Api::all(client.clone());
    let context = Arc::new(Context::new(client, Catalog::default()));

    Controller::new(platforms, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, context)
        .for_each(|_| std::future::ready(()))
        .await;

    info!("controller stopped");
    Ok(())
}
