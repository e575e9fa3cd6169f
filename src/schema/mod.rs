//! Payload schema validation
//!
//! Contracts are keyed by `(namespace, type)`. Known pairs are enforced
//! exactly; unknown pairs only need an object payload, which keeps the
//! protocol open to new producers.

mod contracts;
mod types;
mod validator;

pub use contracts::{lookup, BEAD_PHASES, CONTRACTS};
pub use types::{CheckFailure, Contract, FieldCheck, FieldRule};
pub use validator::{validate_payload, validate_payload_value};

pub(crate) use validator::not_an_object;
