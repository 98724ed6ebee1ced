//! # Reconciler Core
//!
//! Converges one desired child resource toward the cluster, synchronously
//! within a pass:
//!
//! 1. Optional kinds only: check the kind is registered, otherwise skip.
//! 2. Fetch the live object; not-found is the normal create branch.
//! 3. On create, stamp the owner reference and submit; a creation race
//!    surfaces as an error, never a merge.
//! 4. On update, reconcile metadata unconditionally, then let the per-kind
//!    strategy decide whether tracked fields diverge and copy exactly those
//!    onto the already-fetched live body. The update is guarded by the live
//!    object's resource version; a conflict surfaces to the caller.
//!
//! The core never retries. A failed pass leaves earlier resources applied;
//! the next pass re-runs the whole sequence and converges the rest.

mod metadata;
mod strategy;

pub use metadata::OwnerIdentity;
pub use strategy::{strategy_for, Strategy};

use tracing::{debug, info};

use crate::builder::DesiredResource;
use crate::error::Result;
use crate::store::ClusterStore;

/// Result of reconciling one desired resource. Transient; exists only for
/// logging and aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Live state already matched
    Unchanged,
    /// Object was absent and has been created
    Created,
    /// Tracked fields or metadata diverged and have been updated
    Updated,
    /// Kind not registered in this cluster; nothing attempted
    Skipped(String),
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unchanged => write!(f, "unchanged"),
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Skipped(reason) => write!(f, "skipped ({reason})"),
        }
    }
}

/// Converge one desired resource.
pub async fn reconcile_resource(
    cluster: &dyn ClusterStore,
    owner: &OwnerIdentity,
    desired: &DesiredResource,
) -> Result<Outcome> {
    let kind = &desired.kind;
    let name = desired.name();
    let namespace = desired.namespace();

    if kind.optional && !cluster.is_registered(kind).await? {
        info!(
            "{} {} skipped: kind not registered with the API server",
            kind.kind, name
        );
        return Ok(Outcome::Skipped("kind not registered".to_string()));
    }

    match cluster.get(kind, name, namespace).await? {
        None => {
            let mut object = desired.object.clone();
            metadata::stamp_owner(&mut object, owner);
            cluster.create(kind, &object).await?;
            info!("created {} {}/{}", kind.kind, namespace, name);
            Ok(Outcome::Created)
        }
        Some(mut existing) => {
            let strategy = strategy_for(kind);
            let metadata_changed = metadata::ensure_metadata(&mut existing, &desired.object, owner);
            let fields_changed = (strategy.needs_update)(&desired.object, &existing);
            if fields_changed {
                (strategy.apply_tracked)(&desired.object, &mut existing);
            }
            if fields_changed || metadata_changed {
                cluster.update(kind, &existing).await?;
                info!("updated {} {}/{}", kind.kind, namespace, name);
                Ok(Outcome::Updated)
            } else {
                debug!("{} {}/{} already converged", kind.kind, namespace, name);
                Ok(Outcome::Unchanged)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Unchanged.to_string(), "unchanged");
        assert_eq!(Outcome::Created.to_string(), "created");
        assert_eq!(
            Outcome::Skipped("kind not registered".to_string()).to_string(),
            "skipped (kind not registered)"
        );
    }
}
