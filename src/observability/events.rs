//! Observable events
//!
//! Events are explicit and typed; the string form is what appears in the
//! `event` field of a log line.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration built from the environment
    ConfigLoaded,

    /// Envelope renamed into place
    WriteCommit,
    /// Write refused before touching disk
    WriteRejected,

    /// Read failed validation or decoding
    ReadRejected,

    /// Prune pass skipped (missing directory or throttled)
    PruneSkipped,
    /// Prune pass finished
    PruneComplete,
    /// Channel directory could not be listed
    PruneListFailed,
    /// Prune stamp could not be touched
    PruneStampFailed,
    /// An entry could not be deleted
    PruneDeleteFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::WriteCommit => "WRITE_COMMIT",
            Event::WriteRejected => "WRITE_REJECTED",
            Event::ReadRejected => "READ_REJECTED",
            Event::PruneSkipped => "PRUNE_SKIPPED",
            Event::PruneComplete => "PRUNE_COMPLETE",
            Event::PruneListFailed => "PRUNE_LIST_FAILED",
            Event::PruneStampFailed => "PRUNE_STAMP_FAILED",
            Event::PruneDeleteFailed => "PRUNE_DELETE_FAILED",
        }
    }

    /// True for events reporting an absorbed failure
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            Event::PruneListFailed | Event::PruneStampFailed | Event::PruneDeleteFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
