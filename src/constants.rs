//! # Constants
//!
//! Shared constants used by the controller glue. The convergence core itself
//! takes everything it needs through the catalog.

/// Default requeue interval after a failed reconciliation pass (seconds)
pub const DEFAULT_ERROR_REQUEUE_SECS: u64 = 60;

/// Minimum reconcile interval suggested to the watch layer (seconds)
pub const MIN_RECONCILE_INTERVAL_SECS: u64 = 60;
