//! # Orchestrator
//!
//! Sequences resolve → build → reconcile for every subcomponent of one
//! `AppPlatform`, in a fixed order: images, gateway, backend, console,
//! cache, sync. The first error from any step aborts the pass;
//! already-applied resources are left applied and the next pass re-runs the
//! whole sequence from scratch.
//!
//! A pass is a pure function of the root spec, the live cluster state, and
//! the secret store captured at invocation time; the orchestrator holds no
//! cross-instance state and no locks.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::builder::{
    backend_resources, cache_resources, console_resources, gateway_resources, sync_resources,
    DesiredResource,
};
use crate::catalog::Catalog;
use crate::crd::AppPlatform;
use crate::error::Result;
use crate::reconciler::{reconcile_resource, Outcome, OwnerIdentity};
use crate::resolver::{
    resolve_backend, resolve_cache, resolve_console, resolve_gateway, resolve_images, resolve_sync,
};
use crate::store::{ClusterStore, SecretStore};

/// Outcome of one reconciled resource, kept for logging and aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedResource {
    /// Resource kind
    pub kind: &'static str,
    /// Resource name
    pub name: String,
    /// What happened to it
    pub outcome: Outcome,
}

/// Aggregated result of one pass.
#[derive(Debug, Clone, Default)]
pub struct PassSummary {
    /// Per-resource outcomes in apply order
    pub resources: Vec<AppliedResource>,
    /// Advisory hint for the trigger layer; carries no guarantees
    pub requeue_hint: Option<Duration>,
}

impl PassSummary {
    fn count(&self, matches: fn(&Outcome) -> bool) -> usize {
        self.resources.iter().filter(|r| matches(&r.outcome)).count()
    }

    /// Number of created resources
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Created))
    }

    /// Number of updated resources
    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Updated))
    }

    /// Number of skipped resources
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    /// Whether the pass changed nothing (every outcome unchanged or skipped)
    pub fn is_converged(&self) -> bool {
        self.resources
            .iter()
            .all(|r| matches!(r.outcome, Outcome::Unchanged | Outcome::Skipped(_)))
    }
}

/// Drives one reconciliation pass for one managed instance.
pub struct Orchestrator {
    cluster: Arc<dyn ClusterStore>,
    secrets: Arc<dyn SecretStore>,
    catalog: Catalog,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator").finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an orchestrator over the given stores and catalog.
    pub fn new(
        cluster: Arc<dyn ClusterStore>,
        secrets: Arc<dyn SecretStore>,
        catalog: Catalog,
    ) -> Self {
        Self {
            cluster,
            secrets,
            catalog,
        }
    }

    /// Run one full pass for the platform. The single entry point of the
    /// core.
    pub async fn reconcile(&self, platform: &AppPlatform) -> Result<PassSummary> {
        let owner = OwnerIdentity::from_platform(platform)?;
        let namespace = platform
            .metadata
            .namespace
            .as_deref()
            .unwrap_or("default")
            .to_string();
        let spec = &platform.spec;

        let images = resolve_images(spec, &self.catalog)?;
        let mut summary = PassSummary::default();

        let gateway = resolve_gateway(spec, &self.catalog)?;
        self.apply(
            gateway_resources(&gateway, &images, &namespace)?,
            &owner,
            &mut summary,
        )
        .await?;

        let backend = resolve_backend(spec, &self.catalog, self.secrets.as_ref()).await?;
        self.apply(
            backend_resources(&backend, &images, &namespace)?,
            &owner,
            &mut summary,
        )
        .await?;

        let console = resolve_console(spec, &self.catalog, self.secrets.as_ref()).await?;
        self.apply(
            console_resources(&console, &images, &namespace)?,
            &owner,
            &mut summary,
        )
        .await?;

        let cache = resolve_cache(spec, &self.catalog)?;
        self.apply(
            cache_resources(&cache, &images, &namespace)?,
            &owner,
            &mut summary,
        )
        .await?;

        let sync = resolve_sync(spec, &self.catalog, self.secrets.as_ref()).await?;
        self.apply(
            sync_resources(&sync, &images, &namespace)?,
            &owner,
            &mut summary,
        )
        .await?;

        info!(
            "pass complete for {}/{}: {} created, {} updated, {} skipped of {} resources",
            namespace,
            owner.name,
            summary.created(),
            summary.updated(),
            summary.skipped(),
            summary.resources.len()
        );
        Ok(summary)
    }

    async fn apply(
        &self,
        resources: Vec<DesiredResource>,
        owner: &OwnerIdentity,
        summary: &mut PassSummary,
    ) -> Result<()> {
        for desired in resources {
            let outcome = reconcile_resource(self.cluster.as_ref(), owner, &desired).await?;
            summary.resources.push(AppliedResource {
                kind: desired.kind.kind,
                name: desired.name().to_string(),
                outcome,
            });
        }
        Ok(())
    }
}
