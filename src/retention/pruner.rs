//! Channel pruner
//!
//! A pass over `{root}/{namespace}/{channel}`:
//! 1. Missing directory: nothing to do
//! 2. Stamp younger than the prune interval: skip without listing
//! 3. Touch the stamp (throttles on last attempt, not last success)
//! 4. Delete `.json` entries older than the retention window
//! 5. If survivors exceed the cap, keep the newest and delete the rest
//!
//! Races with writers and other pruners are tolerated: a concurrent pass is
//! merely redundant and a delete of a vanished file is not a failure.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::policy::ChannelLimits;
use crate::config::InterbandConfig;
use crate::errors::InterbandResult;
use crate::observability::{log_event, Event};
use crate::paths::{PathResolver, ENTRY_EXTENSION};

/// Marker whose mtime records the last prune attempt of a channel
pub const PRUNE_STAMP: &str = ".interband-prune.stamp";

/// How a prune pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneOutcome {
    /// Channel directory does not exist
    MissingDirectory,
    /// Last attempt is within the prune interval
    Throttled,
    /// Directory was scanned (possibly with absorbed failures)
    Completed,
}

/// What a prune pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneSummary {
    pub outcome: PruneOutcome,
    /// Entry files considered
    pub scanned: usize,
    /// Deleted for exceeding the retention window
    pub expired: usize,
    /// Deleted for exceeding the file cap
    pub evicted: usize,
    /// Left in place
    pub retained: usize,
    /// Deletes that failed for a reason other than the file being gone
    pub delete_failures: usize,
}

impl PruneSummary {
    fn skipped(outcome: PruneOutcome) -> Self {
        Self {
            outcome,
            scanned: 0,
            expired: 0,
            evicted: 0,
            retained: 0,
            delete_failures: 0,
        }
    }

    /// Total files removed by this pass
    pub fn deleted(&self) -> usize {
        self.expired + self.evicted
    }

    /// True if the directory was actually scanned
    pub fn ran(&self) -> bool {
        self.outcome == PruneOutcome::Completed
    }
}

struct Candidate {
    path: PathBuf,
    modified: SystemTime,
}

/// Applies retention limits to channel directories.
pub struct RetentionPruner<'a> {
    config: &'a InterbandConfig,
}

impl<'a> RetentionPruner<'a> {
    pub fn new(config: &'a InterbandConfig) -> Self {
        Self { config }
    }

    /// Prunes one channel, throttled by the prune stamp.
    ///
    /// Only blank `namespace`/`channel` produce an error; every filesystem
    /// failure is absorbed into the summary and the diagnostic log.
    pub fn prune_channel(&self, namespace: &str, channel: &str) -> InterbandResult<PruneSummary> {
        self.prune_channel_at(namespace, channel, SystemTime::now())
    }

    /// Same as [`prune_channel`](Self::prune_channel) with an explicit clock.
    pub fn prune_channel_at(
        &self,
        namespace: &str,
        channel: &str,
        now: SystemTime,
    ) -> InterbandResult<PruneSummary> {
        let dir = PathResolver::new(self.config).channel_dir(namespace, channel)?;
        let dir_display = dir.display().to_string();

        if let Err(e) = fs::metadata(&dir) {
            if e.kind() == io::ErrorKind::NotFound {
                log_event(
                    Event::PruneSkipped,
                    &[("dir", &dir_display), ("reason", "missing_directory")],
                );
                return Ok(PruneSummary::skipped(PruneOutcome::MissingDirectory));
            }
        }

        let interval = Duration::from_secs(self.config.effective_prune_interval() as u64);
        let stamp = dir.join(PRUNE_STAMP);
        if is_throttled(&stamp, interval, now) {
            log_event(
                Event::PruneSkipped,
                &[("dir", &dir_display), ("reason", "throttled")],
            );
            return Ok(PruneSummary::skipped(PruneOutcome::Throttled));
        }

        if let Err(e) = fs::write(&stamp, b"") {
            log_event(
                Event::PruneStampFailed,
                &[("error", &e.to_string()), ("path", &stamp.display().to_string())],
            );
        }

        let limits = ChannelLimits::resolve(self.config, namespace, channel);
        let summary = prune_dir(&dir, &limits, now);

        log_event(
            Event::PruneComplete,
            &[
                ("delete_failures", &summary.delete_failures.to_string()),
                ("dir", &dir_display),
                ("evicted", &summary.evicted.to_string()),
                ("expired", &summary.expired.to_string()),
                ("retained", &summary.retained.to_string()),
                ("scanned", &summary.scanned.to_string()),
            ],
        );
        Ok(summary)
    }
}

/// A stamp dated in the future counts as fresh.
fn is_throttled(stamp: &Path, interval: Duration, now: SystemTime) -> bool {
    let Ok(modified) = fs::metadata(stamp).and_then(|m| m.modified()) else {
        return false;
    };
    match now.duration_since(modified) {
        Ok(elapsed) => elapsed < interval,
        Err(_) => true,
    }
}

fn prune_dir(dir: &Path, limits: &ChannelLimits, now: SystemTime) -> PruneSummary {
    let mut summary = PruneSummary::skipped(PruneOutcome::Completed);

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log_event(
                Event::PruneListFailed,
                &[("dir", &dir.display().to_string()), ("error", &e.to_string())],
            );
            return summary;
        }
    };

    let mut survivors = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !is_entry_file(&entry) {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        summary.scanned += 1;

        let expired = matches!(now.duration_since(modified), Ok(age) if age > limits.retention);
        if expired {
            if remove_entry(&path) {
                summary.expired += 1;
            } else {
                summary.delete_failures += 1;
            }
            continue;
        }
        survivors.push(Candidate { path, modified });
    }

    if let Some(cap) = limits.max_files {
        if survivors.len() > cap {
            survivors.sort_by(newest_first);
            for victim in survivors.drain(cap..) {
                if remove_entry(&victim.path) {
                    summary.evicted += 1;
                } else {
                    summary.delete_failures += 1;
                }
            }
        }
    }

    summary.retained = survivors.len();
    summary
}

/// Regular files whose name ends in `.json`, including one named just `.json`
fn is_entry_file(entry: &fs::DirEntry) -> bool {
    let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
    let name = entry.file_name();
    is_file
        && name
            .to_str()
            .and_then(|name| name.strip_suffix(ENTRY_EXTENSION))
            .map(|stem| stem.ends_with('.'))
            .unwrap_or(false)
}

/// Newest first; equal times ordered by path, descending.
fn newest_first(a: &Candidate, b: &Candidate) -> Ordering {
    b.modified
        .cmp(&a.modified)
        .then_with(|| b.path.cmp(&a.path))
}

/// Returns false only for failures other than the file already being gone.
fn remove_entry(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            log_event(
                Event::PruneDeleteFailed,
                &[("error", &e.to_string()), ("path", &path.display().to_string())],
            );
            false
        }
    }
}
