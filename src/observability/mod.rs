//! Observability for interband
//!
//! Structured JSON logging of typed events. Logging is synchronous, goes to
//! stderr, and has no effect on the outcome of the operation being logged.

mod events;
mod logger;

pub use events::Event;
pub use logger::{min_severity, Logger, Severity, ENV_LOG_LEVEL};

/// Log an event at the severity its kind implies
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_diagnostic() {
        Severity::Warn
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
