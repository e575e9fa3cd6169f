//! Envelope wire format
//!
//! One envelope per file, a flat UTF-8 JSON object:
//!
//! ```json
//! {"version":"1.0.0","namespace":"interphase","type":"bead_phase",
//!  "session_id":"sess1","timestamp":"2024-01-01T00:00:00Z","payload":{}}
//! ```
//!
//! Unknown top-level fields are ignored on read so newer minor versions stay
//! readable. Only the major version is a compatibility gate.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::{InterbandError, InterbandResult};
use crate::paths::is_blank;
use crate::schema;

/// Major-version prefix every readable envelope must carry
pub const SUPPORTED_MAJOR_PREFIX: &str = "1.";

/// The versioned wrapper persisted for every message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub version: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub namespace: String,

    /// Message kind within the namespace (`type` on the wire)
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub kind: String,

    /// Opaque correlation token, may be empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub session_id: String,

    /// UTC write time, RFC 3339 with `Z` suffix
    #[serde(default, deserialize_with = "null_as_empty")]
    pub timestamp: String,

    /// `None` only when a file carries `null` or omits the payload
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
}

impl Envelope {
    /// Creates an envelope stamped with the current UTC time.
    pub fn new(
        version: impl Into<String>,
        namespace: impl Into<String>,
        kind: impl Into<String>,
        session_id: impl Into<String>,
        payload: Map<String, Value>,
    ) -> Self {
        Self {
            version: version.into(),
            namespace: namespace.into(),
            kind: kind.into(),
            session_id: session_id.into(),
            timestamp: now_timestamp(),
            payload: Some(payload),
        }
    }

    /// Payload object, if present.
    pub fn payload(&self) -> Option<&Map<String, Value>> {
        self.payload.as_ref()
    }

    /// Consumes the envelope, returning its payload (empty if absent).
    pub fn into_payload(self) -> Map<String, Value> {
        self.payload.unwrap_or_default()
    }
}

/// Current UTC time in the wire format, e.g. `2024-01-01T00:00:00Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// True if `version` belongs to a readable major version.
pub fn is_supported_version(version: &str) -> bool {
    version.starts_with(SUPPORTED_MAJOR_PREFIX)
}

/// Checks envelope structure, then the payload contract for its
/// `(namespace, type)` pair.
pub fn validate_envelope(env: &Envelope) -> InterbandResult<()> {
    if !is_supported_version(&env.version) {
        return Err(InterbandError::version(env.version.clone()));
    }
    if is_blank(&env.namespace) {
        return Err(InterbandError::validation("envelope", "namespace", "is required"));
    }
    if is_blank(&env.kind) {
        return Err(InterbandError::validation("envelope", "type", "is required"));
    }
    if is_blank(&env.timestamp) {
        return Err(InterbandError::validation("envelope", "timestamp", "is required"));
    }
    let payload = env
        .payload
        .as_ref()
        .ok_or_else(|| InterbandError::validation("envelope", "payload", "must be an object"))?;

    schema::validate_payload(&env.namespace, &env.kind, payload)
}

/// Serializes an envelope as one compact JSON line.
///
/// Characters such as `<`, `>` and `&` are written literally.
pub fn encode(env: &Envelope) -> InterbandResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec(env)
        .map_err(|e| InterbandError::encode("failed to serialize envelope", e))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parses an envelope without validating it.
pub fn decode(bytes: &[u8]) -> InterbandResult<Envelope> {
    serde_json::from_slice(bytes).map_err(|e| InterbandError::decode("failed to parse envelope", e))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
