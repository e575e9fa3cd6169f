//! Retention limits
//!
//! Resolution order, most specific first:
//! per-channel override -> global override -> built-in channel default -> global default

use std::time::Duration;

use crate::config::InterbandConfig;

/// Retention window for channels without a built-in entry (24h)
pub const DEFAULT_RETENTION_SECS: i64 = 86_400;

/// File cap for channels without a built-in entry
pub const DEFAULT_MAX_FILES: i64 = 256;

struct ChannelDefault {
    namespace: &'static str,
    channel: &'static str,
    retention_secs: i64,
    max_files: i64,
}

const CHANNEL_DEFAULTS: &[ChannelDefault] = &[
    ChannelDefault {
        namespace: "clavain",
        channel: "dispatch",
        retention_secs: 21_600,
        max_files: 128,
    },
    ChannelDefault {
        namespace: "interlock",
        channel: "coordination",
        retention_secs: 43_200,
        max_files: 256,
    },
    ChannelDefault {
        namespace: "interphase",
        channel: "bead",
        retention_secs: 86_400,
        max_files: 256,
    },
];

fn channel_default(namespace: &str, channel: &str) -> Option<&'static ChannelDefault> {
    CHANNEL_DEFAULTS
        .iter()
        .find(|d| d.namespace == namespace && d.channel == channel)
}

/// Built-in retention window for a channel, in seconds.
pub fn default_retention_secs(namespace: &str, channel: &str) -> i64 {
    channel_default(namespace, channel)
        .map(|d| d.retention_secs)
        .unwrap_or(DEFAULT_RETENTION_SECS)
}

/// Built-in file cap for a channel.
pub fn default_max_files(namespace: &str, channel: &str) -> i64 {
    channel_default(namespace, channel)
        .map(|d| d.max_files)
        .unwrap_or(DEFAULT_MAX_FILES)
}

/// Effective limits for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLimits {
    /// Files older than this are expired
    pub retention: Duration,
    /// `None` disables the count cap
    pub max_files: Option<usize>,
}

impl ChannelLimits {
    pub fn resolve(config: &InterbandConfig, namespace: &str, channel: &str) -> Self {
        let retention_secs = config.retention_secs_for(namespace, channel).max(0);
        let max_files = config.max_files_for(namespace, channel);

        Self {
            retention: Duration::from_secs(retention_secs as u64),
            max_files: if max_files > 0 {
                usize::try_from(max_files).ok()
            } else {
                None
            },
        }
    }
}
