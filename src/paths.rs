//! Path resolution
//!
//! Layout: `{root}/{namespace}/{channel}/{safe_key}.json`

use std::path::{Path, PathBuf};

use crate::config::InterbandConfig;
use crate::errors::{InterbandError, InterbandResult};

/// Extension of entry files; the only files a pruner considers
pub const ENTRY_EXTENSION: &str = "json";

/// Resolves directories and entry paths under the configured root.
pub struct PathResolver<'a> {
    config: &'a InterbandConfig,
}

impl<'a> PathResolver<'a> {
    pub fn new(config: &'a InterbandConfig) -> Self {
        Self { config }
    }

    /// Shared root directory.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// `{root}/{namespace}/{channel}`
    pub fn channel_dir(&self, namespace: &str, channel: &str) -> InterbandResult<PathBuf> {
        if is_blank(namespace) || is_blank(channel) {
            return Err(InterbandError::argument(
                "namespace and channel are required",
            ));
        }
        Ok(self.root().join(namespace).join(channel))
    }

    /// `{root}/{namespace}/{channel}/{safe_key(key)}.json`
    pub fn path(&self, namespace: &str, channel: &str, key: &str) -> InterbandResult<PathBuf> {
        if is_blank(namespace) || is_blank(channel) || is_blank(key) {
            return Err(InterbandError::argument(
                "namespace, channel, and key are required",
            ));
        }
        Ok(self
            .root()
            .join(namespace)
            .join(channel)
            .join(format!("{}.{}", safe_key(key), ENTRY_EXTENSION)))
    }
}

/// Maps an arbitrary key to a filesystem-safe token.
///
/// `[A-Za-z0-9._-]` pass through, everything else (separators, whitespace,
/// non-ASCII) becomes `_`. An empty key becomes `default`. Idempotent.
pub fn safe_key(raw: &str) -> String {
    let out: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if out.is_empty() {
        "default".to_string()
    } else {
        out
    }
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
