//! Error types for interband
//!
//! Error codes:
//! - INTERBAND_ARGUMENT_ERROR (blank or missing required input)
//! - INTERBAND_VALIDATION_FAILED (envelope or payload contract violated)
//! - INTERBAND_UNSUPPORTED_VERSION (envelope major version is not 1)
//! - INTERBAND_IO_ERROR (filesystem failure)
//! - INTERBAND_DECODE_ERROR (file content is not a decodable envelope)
//! - INTERBAND_ENCODE_ERROR (envelope could not be serialized for writing)

use std::fmt;
use std::io;

use thiserror::Error;

/// Result type for interband operations
pub type InterbandResult<T> = Result<T, InterbandError>;

/// Broad error category, for callers that branch on the kind of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Blank or missing required input
    Argument,
    /// Envelope or payload failed its contract
    Validation,
    /// Envelope major version unsupported
    Version,
    /// Filesystem, decode, or encode failure
    Io,
}

/// Which field failed validation and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Contract that was checked, e.g. `interphase/bead_phase` or `envelope`
    pub subject: String,
    /// Offending field
    pub field: String,
    /// Human-readable reason, completes the sentence "<field> ..."
    pub reason: String,
}

impl ValidationDetails {
    pub fn new(
        subject: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.subject, self.field, self.reason)
    }
}

/// Interband error taxonomy
#[derive(Debug, Error)]
pub enum InterbandError {
    #[error("{message}")]
    Argument { message: String },

    #[error("{0}")]
    Validation(ValidationDetails),

    #[error("unsupported version {found:?}")]
    Version { found: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{context}: {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl InterbandError {
    /// Create an argument error
    pub fn argument(message: impl Into<String>) -> Self {
        InterbandError::Argument {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(
        subject: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        InterbandError::Validation(ValidationDetails::new(subject, field, reason))
    }

    /// Create an unsupported version error
    pub fn version(found: impl Into<String>) -> Self {
        InterbandError::Version {
            found: found.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        InterbandError::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a decode error with context
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        InterbandError::Decode {
            context: context.into(),
            source,
        }
    }

    /// Create an encode error with context
    pub fn encode(context: impl Into<String>, source: serde_json::Error) -> Self {
        InterbandError::Encode {
            context: context.into(),
            source,
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            InterbandError::Argument { .. } => "INTERBAND_ARGUMENT_ERROR",
            InterbandError::Validation(_) => "INTERBAND_VALIDATION_FAILED",
            InterbandError::Version { .. } => "INTERBAND_UNSUPPORTED_VERSION",
            InterbandError::Io { .. } => "INTERBAND_IO_ERROR",
            InterbandError::Decode { .. } => "INTERBAND_DECODE_ERROR",
            InterbandError::Encode { .. } => "INTERBAND_ENCODE_ERROR",
        }
    }

    /// Returns the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            InterbandError::Argument { .. } => ErrorKind::Argument,
            InterbandError::Validation(_) => ErrorKind::Validation,
            InterbandError::Version { .. } => ErrorKind::Version,
            InterbandError::Io { .. }
            | InterbandError::Decode { .. }
            | InterbandError::Encode { .. } => ErrorKind::Io,
        }
    }

    /// Returns validation details if applicable
    pub fn details(&self) -> Option<&ValidationDetails> {
        match self {
            InterbandError::Validation(details) => Some(details),
            _ => None,
        }
    }
}
