//! Atomic envelope writer
//!
//! Atomicity is achieved via:
//! 1. Validate the payload (nothing on disk is touched if this fails)
//! 2. Write the envelope to a uniquely named temp file in the target's directory
//! 3. fsync the temp file
//! 4. Rename temp onto the target (atomic within one directory on POSIX)
//!
//! A concurrent reader sees either the old file or the new one, never a mix.
//! The temp file is removed on every failure path.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::InterbandConfig;
use crate::envelope::{self, Envelope};
use crate::errors::{InterbandError, InterbandResult};
use crate::observability::{log_event, Event};
use crate::paths::is_blank;
use crate::schema;

/// Prefix of in-flight temp files; never ends in `.json`
pub const TEMP_PREFIX: &str = ".interband-tmp.";

/// Persists envelopes with write-to-temp-then-rename.
pub struct AtomicWriter<'a> {
    config: &'a InterbandConfig,
}

impl<'a> AtomicWriter<'a> {
    pub fn new(config: &'a InterbandConfig) -> Self {
        Self { config }
    }

    /// Validates `payload` for `(namespace, kind)` and atomically replaces
    /// `target` with a new envelope carrying it.
    pub fn write(
        &self,
        target: &Path,
        namespace: &str,
        kind: &str,
        session_id: &str,
        payload: Map<String, Value>,
    ) -> InterbandResult<()> {
        if let Err(err) = check_arguments(target, namespace, kind)
            .and_then(|_| schema::validate_payload(namespace, kind, &payload))
        {
            reject(target, &err);
            return Err(err);
        }

        let env = Envelope::new(
            self.config.protocol_version.clone(),
            namespace,
            kind,
            session_id,
            payload,
        );
        let bytes = envelope::encode(&env)?;

        persist(target, &bytes)?;

        log_event(
            Event::WriteCommit,
            &[
                ("namespace", namespace),
                ("path", &target.display().to_string()),
                ("type", kind),
            ],
        );
        Ok(())
    }

    /// Like [`write`](Self::write) for an arbitrary JSON value, which must be
    /// an object.
    pub fn write_value(
        &self,
        target: &Path,
        namespace: &str,
        kind: &str,
        session_id: &str,
        payload: Value,
    ) -> InterbandResult<()> {
        match payload {
            Value::Object(map) => self.write(target, namespace, kind, session_id, map),
            _ => {
                let err = check_arguments(target, namespace, kind)
                    .err()
                    .unwrap_or_else(|| schema::not_an_object(namespace, kind));
                reject(target, &err);
                Err(err)
            }
        }
    }
}

fn check_arguments(target: &Path, namespace: &str, kind: &str) -> InterbandResult<()> {
    if is_blank(&target.to_string_lossy()) {
        return Err(InterbandError::argument("target path is required"));
    }
    if is_blank(namespace) || is_blank(kind) {
        return Err(InterbandError::argument("namespace and type are required"));
    }
    Ok(())
}

fn reject(target: &Path, err: &InterbandError) {
    log_event(
        Event::WriteRejected,
        &[
            ("code", err.code()),
            ("path", &target.display().to_string()),
            ("reason", &err.to_string()),
        ],
    );
}

fn parent_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn persist(target: &Path, bytes: &[u8]) -> InterbandResult<()> {
    let dir = parent_dir(target);
    fs::create_dir_all(&dir).map_err(|e| {
        InterbandError::io(format!("failed to create directory {}", dir.display()), e)
    })?;

    // Same directory as the target so the rename never crosses a filesystem
    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(&dir)
        .map_err(|e| {
            InterbandError::io(format!("failed to create temp file in {}", dir.display()), e)
        })?;

    temp.write_all(bytes)
        .map_err(|e| InterbandError::io("failed to write envelope", e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| InterbandError::io("failed to fsync envelope", e))?;

    temp.persist(target).map_err(|e| {
        InterbandError::io(
            format!("failed to rename envelope onto {}", target.display()),
            e.error,
        )
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn config(tmp: &TempDir) -> InterbandConfig {
        InterbandConfig::default().with_root(tmp.path())
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_creates_parents_and_leaves_no_temp() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);
        let target = tmp.path().join("custom/events/x.json");

        AtomicWriter::new(&config)
            .write_value(&target, "custom", "anything", "sess", json!({"k": "v"}))
            .unwrap();

        assert_eq!(entries(target.parent().unwrap()), vec!["x.json"]);
    }

    #[test]
    fn test_write_stamps_configured_version() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp).with_protocol_version("1.3.0");
        let target = tmp.path().join("custom/events/x.json");

        AtomicWriter::new(&config)
            .write_value(&target, "custom", "anything", "sess", json!({}))
            .unwrap();

        let env = envelope::decode(&fs::read(&target).unwrap()).unwrap();
        assert_eq!(env.version, "1.3.0");
        assert_eq!(env.session_id, "sess");
    }

    #[test]
    fn test_overwrite_replaces_whole_file() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);
        let writer = AtomicWriter::new(&config);
        let target = tmp.path().join("custom/events/x.json");

        writer
            .write_value(&target, "custom", "anything", "", json!({"long": "x".repeat(512)}))
            .unwrap();
        writer
            .write_value(&target, "custom", "anything", "", json!({"short": 1}))
            .unwrap();

        let env = envelope::decode(&fs::read(&target).unwrap()).unwrap();
        assert_eq!(env.into_payload(), json!({"short": 1}).as_object().cloned().unwrap());
        assert_eq!(entries(target.parent().unwrap()), vec!["x.json"]);
    }

    #[test]
    fn test_invalid_payload_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);
        let target = tmp.path().join("interphase/bead/bad.json");

        let err = AtomicWriter::new(&config)
            .write_value(
                &target,
                "interphase",
                "bead_phase",
                "sess",
                json!({"id": "iv-hoqj", "phase": "not-a-phase", "ts": 1}),
            )
            .unwrap_err();

        assert_eq!(err.code(), "INTERBAND_VALIDATION_FAILED");
        assert!(!tmp.path().join("interphase").exists());
    }

    #[test]
    fn test_blank_arguments_rejected() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);
        let writer = AtomicWriter::new(&config);
        let target = tmp.path().join("a/b/c.json");

        let err = writer
            .write_value(Path::new(" "), "custom", "x", "", json!({}))
            .unwrap_err();
        assert_eq!(err.code(), "INTERBAND_ARGUMENT_ERROR");

        let err = writer.write_value(&target, "", "x", "", json!({})).unwrap_err();
        assert_eq!(err.code(), "INTERBAND_ARGUMENT_ERROR");

        let err = writer.write_value(&target, "custom", " ", "", json!({})).unwrap_err();
        assert_eq!(err.code(), "INTERBAND_ARGUMENT_ERROR");

        let err = writer.write_value(&target, "custom", "x", "", json!([1])).unwrap_err();
        assert_eq!(err.code(), "INTERBAND_VALIDATION_FAILED");
    }

    #[test]
    fn test_rename_failure_removes_temp() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);
        let dir = tmp.path().join("custom/events");
        // A directory at the target path makes the final rename fail
        let target = dir.join("x.json");
        fs::create_dir_all(target.join("occupied")).unwrap();

        let err = AtomicWriter::new(&config)
            .write_value(&target, "custom", "anything", "", json!({"k": 1}))
            .unwrap_err();

        assert_eq!(err.code(), "INTERBAND_IO_ERROR");
        assert_eq!(entries(&dir), vec!["x.json"]);
        assert!(target.is_dir());
    }
}
