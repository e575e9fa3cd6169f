//! Envelope reader
//!
//! Reads never block on writers: the atomic rename guarantees a complete
//! file, old or new. Every envelope is validated before it is returned.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::envelope::{self, Envelope};
use crate::errors::{InterbandError, InterbandResult};
use crate::observability::{log_event, Event};
use crate::paths::is_blank;

/// Loads and validates the envelope at `source`.
///
/// Returns the first failure: I/O, decode, version, or validation.
pub fn read_envelope(source: &Path) -> InterbandResult<Envelope> {
    if is_blank(&source.to_string_lossy()) {
        return Err(InterbandError::argument("source path is required"));
    }

    let bytes = fs::read(source)
        .map_err(|e| InterbandError::io(format!("failed to read {}", source.display()), e))?;

    let env = envelope::decode(&bytes).and_then(|env| {
        envelope::validate_envelope(&env)?;
        Ok(env)
    });

    if let Err(err) = &env {
        log_event(
            Event::ReadRejected,
            &[
                ("code", err.code()),
                ("path", &source.display().to_string()),
                ("reason", &err.to_string()),
            ],
        );
    }
    env
}

/// Loads the envelope at `source` and returns only its payload.
pub fn read_payload(source: &Path) -> InterbandResult<Map<String, Value>> {
    read_envelope(source).map(Envelope::into_payload)
}
