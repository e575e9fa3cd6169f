//! Payload validation
//!
//! - Payload must be a JSON object
//! - Known `(namespace, type)` pairs are checked against their contract
//! - Unknown pairs are accepted as-is
//! - Values are never coerced; the first violation is reported

use serde_json::{Map, Value};

use super::contracts;
use crate::errors::{InterbandError, InterbandResult};

/// Validates a payload object for `(namespace, kind)`.
pub fn validate_payload(
    namespace: &str,
    kind: &str,
    payload: &Map<String, Value>,
) -> InterbandResult<()> {
    let Some(contract) = contracts::lookup(namespace, kind) else {
        return Ok(());
    };

    match contract.first_violation(payload) {
        Some((field, failure)) => Err(InterbandError::validation(
            contract.subject(),
            field,
            failure.reason(),
        )),
        None => Ok(()),
    }
}

/// Validates an arbitrary JSON value as a payload for `(namespace, kind)`.
///
/// Fails unless the value is an object.
pub fn validate_payload_value(namespace: &str, kind: &str, payload: &Value) -> InterbandResult<()> {
    match payload.as_object() {
        Some(obj) => validate_payload(namespace, kind, obj),
        None => Err(not_an_object(namespace, kind)),
    }
}

pub(crate) fn not_an_object(namespace: &str, kind: &str) -> InterbandError {
    InterbandError::validation(format!("{}/{}", namespace, kind), "payload", "must be an object")
}
