//! `Interband` facade
//!
//! Bundles path resolution, writing, reading and pruning around one
//! configuration so callers do not thread `&InterbandConfig` everywhere.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::InterbandConfig;
use crate::envelope::Envelope;
use crate::errors::InterbandResult;
use crate::observability::{log_event, Event};
use crate::paths::PathResolver;
use crate::reader;
use crate::retention::{PruneSummary, RetentionPruner};
use crate::writer::AtomicWriter;

#[derive(Debug, Clone)]
pub struct Interband {
    config: InterbandConfig,
}

impl Interband {
    pub fn new(config: InterbandConfig) -> Self {
        Self { config }
    }

    /// Configuration read from the process environment.
    pub fn from_env() -> Self {
        let config = InterbandConfig::from_env();
        log_event(
            Event::ConfigLoaded,
            &[
                ("protocol_version", &config.protocol_version),
                ("root", &config.root.display().to_string()),
            ],
        );
        Self::new(config)
    }

    pub fn config(&self) -> &InterbandConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn channel_dir(&self, namespace: &str, channel: &str) -> InterbandResult<PathBuf> {
        PathResolver::new(&self.config).channel_dir(namespace, channel)
    }

    pub fn path(&self, namespace: &str, channel: &str, key: &str) -> InterbandResult<PathBuf> {
        PathResolver::new(&self.config).path(namespace, channel, key)
    }

    pub fn write(
        &self,
        target: &Path,
        namespace: &str,
        kind: &str,
        session_id: &str,
        payload: Map<String, Value>,
    ) -> InterbandResult<()> {
        AtomicWriter::new(&self.config).write(target, namespace, kind, session_id, payload)
    }

    /// Writes a `serde_json::Value` payload, which must be an object.
    pub fn write_value(
        &self,
        target: &Path,
        namespace: &str,
        kind: &str,
        session_id: &str,
        payload: Value,
    ) -> InterbandResult<()> {
        AtomicWriter::new(&self.config).write_value(target, namespace, kind, session_id, payload)
    }

    pub fn read_envelope(&self, source: &Path) -> InterbandResult<Envelope> {
        reader::read_envelope(source)
    }

    pub fn read_payload(&self, source: &Path) -> InterbandResult<Map<String, Value>> {
        reader::read_payload(source)
    }

    pub fn prune_channel(&self, namespace: &str, channel: &str) -> InterbandResult<PruneSummary> {
        RetentionPruner::new(&self.config).prune_channel(namespace, channel)
    }
}
