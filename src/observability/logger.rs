//! Structured JSON logger
//!
//! - One log line = one JSON object
//! - `event` first, then `severity`, then fields sorted by key
//! - Synchronous, written to stderr, never fails the caller
//! - Lines below the minimum severity (`INTERBAND_LOG`, default `warn`) are dropped

use std::fmt;
use std::io::{self, Write};
use std::sync::OnceLock;

/// Environment variable selecting the minimum emitted severity
pub const ENV_LOG_LEVEL: &str = "INTERBAND_LOG";

static MIN_SEVERITY: OnceLock<Severity> = OnceLock::new();

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    /// Parse a level name, case-insensitively
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Severity::Trace),
            "info" => Some(Severity::Info),
            "warn" | "warning" => Some(Severity::Warn),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimum severity that reaches stderr (read once per process)
pub fn min_severity() -> Severity {
    *MIN_SEVERITY.get_or_init(|| {
        std::env::var(ENV_LOG_LEVEL)
            .ok()
            .and_then(|raw| Severity::parse(&raw))
            .unwrap_or(Severity::Warn)
    })
}

pub struct Logger;

impl Logger {
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if severity < min_severity() {
            return;
        }
        Self::log_to_writer(severity, event, fields, &mut io::stderr());
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let line = render(severity, event, fields);
        // Single write so concurrent processes do not interleave within a line
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }
}

fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(128);
    out.push_str("{\"event\":");
    out.push_str(&quote(event));
    out.push_str(",\"severity\":");
    out.push_str(&quote(severity.as_str()));

    let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);
    for (key, value) in sorted {
        out.push(',');
        out.push_str(&quote(key));
        out.push(':');
        out.push_str(&quote(value));
    }

    out.push_str("}\n");
    out
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| String::from("\"\""))
}

#[cfg(test)]
pub fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::log_to_writer(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}
