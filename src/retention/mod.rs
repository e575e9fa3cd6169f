//! Retention and pruning
//!
//! Channels are written by many uncoordinated producers; pruning bounds
//! their growth by age and by count. Pruning is best-effort housekeeping:
//! filesystem failures are logged and summarized, never returned.

pub mod policy;
mod pruner;

pub use policy::{default_max_files, default_retention_secs, ChannelLimits};
pub use pruner::{PruneOutcome, PruneSummary, RetentionPruner, PRUNE_STAMP};
