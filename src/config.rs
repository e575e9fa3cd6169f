//! Interband configuration
//!
//! All tunables are carried by one explicit `InterbandConfig` that is built
//! once (usually from the environment) and borrowed by every component.
//!
//! Environment variables:
//! - `INTERBAND_ROOT`: root directory override
//! - `INTERBAND_PROTOCOL_VERSION`: version written into new envelopes
//! - `INTERBAND_PRUNE_INTERVAL_SECS`: prune throttle interval
//! - `INTERBAND_RETENTION_SECS` / `INTERBAND_MAX_FILES`: global limits
//! - `INTERBAND_RETENTION_<KEY>_SECS` / `INTERBAND_MAX_FILES_<KEY>`: per-channel
//!   limits, where `<KEY>` is `channel_key(namespace, channel)`

use std::collections::HashMap;
use std::path::PathBuf;

use crate::retention::policy;

pub const ENV_ROOT: &str = "INTERBAND_ROOT";
pub const ENV_PROTOCOL_VERSION: &str = "INTERBAND_PROTOCOL_VERSION";
pub const ENV_PRUNE_INTERVAL: &str = "INTERBAND_PRUNE_INTERVAL_SECS";
pub const ENV_RETENTION: &str = "INTERBAND_RETENTION_SECS";
pub const ENV_MAX_FILES: &str = "INTERBAND_MAX_FILES";

const RETENTION_PREFIX: &str = "INTERBAND_RETENTION_";
const RETENTION_SUFFIX: &str = "_SECS";
const MAX_FILES_PREFIX: &str = "INTERBAND_MAX_FILES_";

/// Protocol version written when nothing overrides it
pub const DEFAULT_PROTOCOL_VERSION: &str = "1.0.0";

/// Prune throttle interval in seconds
pub const DEFAULT_PRUNE_INTERVAL_SECS: i64 = 300;

/// Root directory name under the home directory, also the last-resort relative root
pub const DEFAULT_ROOT_DIR: &str = ".interband";

/// Per-channel limit overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelOverride {
    pub retention_secs: Option<i64>,
    pub max_files: Option<i64>,
}

/// Configuration shared by path resolution, writing and pruning.
#[derive(Debug, Clone)]
pub struct InterbandConfig {
    /// Shared root directory
    pub root: PathBuf,
    /// Version stamped on written envelopes
    pub protocol_version: String,
    /// Minimum seconds between two prune passes of one channel
    pub prune_interval_secs: i64,
    /// Global retention override
    pub retention_secs: Option<i64>,
    /// Global max-files override
    pub max_files: Option<i64>,
    /// Per-channel overrides keyed by `channel_key(namespace, channel)`
    pub channel_overrides: HashMap<String, ChannelOverride>,
}

impl Default for InterbandConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            prune_interval_secs: DEFAULT_PRUNE_INTERVAL_SECS,
            retention_secs: None,
            max_files: None,
            channel_overrides: HashMap::new(),
        }
    }
}

impl InterbandConfig {
    /// Build a configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build a configuration from `(name, value)` pairs.
    ///
    /// Blank or unparsable values are ignored, so resolution falls through to
    /// the next level exactly as if the variable were unset.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (name, value) in vars {
            let name = name.as_ref();
            let value = value.as_ref();

            match name {
                ENV_ROOT => {
                    if let Some(root) = non_blank(value) {
                        config.root = PathBuf::from(root);
                    }
                }
                ENV_PROTOCOL_VERSION => {
                    if let Some(version) = non_blank(value) {
                        config.protocol_version = version.to_string();
                    }
                }
                ENV_PRUNE_INTERVAL => {
                    if let Some(secs) = parse_int(value) {
                        config.prune_interval_secs = secs;
                    }
                }
                ENV_RETENTION => {
                    if let Some(secs) = parse_int(value) {
                        config.retention_secs = Some(secs);
                    }
                }
                ENV_MAX_FILES => {
                    if let Some(n) = parse_int(value) {
                        config.max_files = Some(n);
                    }
                }
                _ => {
                    let Some(parsed) = parse_int(value) else {
                        continue;
                    };
                    if let Some(key) = name
                        .strip_prefix(RETENTION_PREFIX)
                        .and_then(|rest| rest.strip_suffix(RETENTION_SUFFIX))
                        .filter(|key| !key.is_empty())
                    {
                        config
                            .channel_overrides
                            .entry(key.to_string())
                            .or_default()
                            .retention_secs = Some(parsed);
                    } else if let Some(key) = name
                        .strip_prefix(MAX_FILES_PREFIX)
                        .filter(|key| !key.is_empty())
                    {
                        config
                            .channel_overrides
                            .entry(key.to_string())
                            .or_default()
                            .max_files = Some(parsed);
                    }
                }
            }
        }

        config
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }

    pub fn with_prune_interval(mut self, secs: i64) -> Self {
        self.prune_interval_secs = secs;
        self
    }

    pub fn with_retention_secs(mut self, secs: i64) -> Self {
        self.retention_secs = Some(secs);
        self
    }

    pub fn with_max_files(mut self, n: i64) -> Self {
        self.max_files = Some(n);
        self
    }

    pub fn with_channel_retention(mut self, namespace: &str, channel: &str, secs: i64) -> Self {
        self.channel_overrides
            .entry(channel_key(namespace, channel))
            .or_default()
            .retention_secs = Some(secs);
        self
    }

    pub fn with_channel_max_files(mut self, namespace: &str, channel: &str, n: i64) -> Self {
        self.channel_overrides
            .entry(channel_key(namespace, channel))
            .or_default()
            .max_files = Some(n);
        self
    }

    /// Prune throttle interval, negative values clamped to zero.
    pub fn effective_prune_interval(&self) -> i64 {
        self.prune_interval_secs.max(0)
    }

    /// Retention window for a channel: per-channel override, then global
    /// override, then the built-in table.
    pub fn retention_secs_for(&self, namespace: &str, channel: &str) -> i64 {
        self.channel_override(namespace, channel)
            .and_then(|o| o.retention_secs)
            .or(self.retention_secs)
            .unwrap_or_else(|| policy::default_retention_secs(namespace, channel))
    }

    /// Max-file cap for a channel, same resolution order as retention.
    pub fn max_files_for(&self, namespace: &str, channel: &str) -> i64 {
        self.channel_override(namespace, channel)
            .and_then(|o| o.max_files)
            .or(self.max_files)
            .unwrap_or_else(|| policy::default_max_files(namespace, channel))
    }

    fn channel_override(&self, namespace: &str, channel: &str) -> Option<&ChannelOverride> {
        self.channel_overrides.get(&channel_key(namespace, channel))
    }
}

/// Lookup key for per-channel overrides: `NS_CH`, uppercased, with every
/// character outside `[A-Z0-9]` replaced by `_`.
pub fn channel_key(namespace: &str, channel: &str) -> String {
    format!("{}_{}", env_safe(namespace), env_safe(channel))
}

/// Name of the per-channel retention variable.
pub fn retention_env_var(namespace: &str, channel: &str) -> String {
    format!(
        "{}{}{}",
        RETENTION_PREFIX,
        channel_key(namespace, channel),
        RETENTION_SUFFIX
    )
}

/// Name of the per-channel max-files variable.
pub fn max_files_env_var(namespace: &str, channel: &str) -> String {
    format!("{}{}", MAX_FILES_PREFIX, channel_key(namespace, channel))
}

/// Uppercases per character, then maps anything outside `[A-Z0-9]` to `_`.
/// Letters with a single-character uppercase form that is ASCII (`ı`, `ſ`)
/// contribute that letter; multi-character expansions (`ß`) are not applied.
fn env_safe(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) if u.is_ascii_uppercase() || u.is_ascii_digit() => u,
                _ => '_',
            }
        })
        .collect()
}

fn default_root() -> PathBuf {
    match dirs::home_dir() {
        Some(home) if !home.as_os_str().is_empty() => home.join(DEFAULT_ROOT_DIR),
        _ => PathBuf::from(DEFAULT_ROOT_DIR),
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_int(value: &str) -> Option<i64> {
    non_blank(value).and_then(|v| v.parse::<i64>().ok())
}
