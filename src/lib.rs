//! interband - filesystem-backed sideband messaging
//!
//! Independent processes exchange small JSON envelopes by writing and
//! reading keyed files under a shared root:
//!
//! ```text
//! {root}/{namespace}/{channel}/{safe_key}.json
//! {root}/{namespace}/{channel}/.interband-prune.stamp
//! ```
//!
//! Writes are atomic (temp file + rename in the same directory), payloads are
//! checked against per-`(namespace, type)` contracts, and channels are pruned
//! by age and count. Last write wins per key; this is not a durable log.
//!
//! ```no_run
//! use interband::{Interband, InterbandConfig};
//! use serde_json::json;
//!
//! let band = Interband::new(InterbandConfig::from_env());
//! let path = band.path("interphase", "bead", "iv-hoqj")?;
//! band.write_value(
//!     &path,
//!     "interphase",
//!     "bead_phase",
//!     "sess1",
//!     json!({"id": "iv-hoqj", "phase": "executing", "ts": 1700000000}),
//! )?;
//! let payload = band.read_payload(&path)?;
//! assert_eq!(payload["phase"], "executing");
//! band.prune_channel("interphase", "bead")?;
//! # Ok::<(), interband::InterbandError>(())
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod observability;
pub mod paths;
pub mod reader;
pub mod retention;
pub mod schema;
pub mod writer;

pub use client::Interband;
pub use config::InterbandConfig;
pub use envelope::{validate_envelope, Envelope};
pub use errors::{ErrorKind, InterbandError, InterbandResult, ValidationDetails};
pub use paths::{safe_key, PathResolver};
pub use reader::{read_envelope, read_payload};
pub use retention::{PruneOutcome, PruneSummary, RetentionPruner};
pub use schema::{validate_payload, validate_payload_value};
pub use writer::AtomicWriter;
