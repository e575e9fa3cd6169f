//! Retention Invariant Tests
//!
//! - Files older than the retention window are removed
//! - The count cap keeps the newest files
//! - The prune stamp throttles repeated passes
//! - Filesystem trouble never surfaces as an error

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use interband::retention::PRUNE_STAMP;
use interband::{Interband, InterbandConfig, PruneOutcome, RetentionPruner};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

fn age(path: &Path, secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(secs))
        .unwrap();
}

fn entry(dir: &Path, name: &str, age_secs: u64) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "{}").unwrap();
    age(&path, age_secs);
    path
}

fn channel_dir(config: &InterbandConfig, ns: &str, ch: &str) -> PathBuf {
    let dir = Interband::new(config.clone()).channel_dir(ns, ch).unwrap();
    fs::create_dir_all(&dir).unwrap();
    dir
}

// =============================================================================
// Age window
// =============================================================================

#[test]
fn test_retention_removes_only_aged_file() {
    let tmp = TempDir::new().unwrap();
    let config = InterbandConfig::from_vars([
        ("INTERBAND_ROOT", tmp.path().to_str().unwrap()),
        ("INTERBAND_RETENTION_INTERPHASE_BEAD_SECS", "1"),
        ("INTERBAND_PRUNE_INTERVAL_SECS", "0"),
    ]);
    let dir = channel_dir(&config, "interphase", "bead");
    let old = entry(&dir, "old.json", 3);
    let new = entry(&dir, "new.json", 0);

    let summary = RetentionPruner::new(&config)
        .prune_channel("interphase", "bead")
        .unwrap();

    assert!(!old.exists());
    assert!(new.exists());
    assert_eq!(summary.expired, 1);
}

#[test]
fn test_builtin_window_applies_without_overrides() {
    let tmp = TempDir::new().unwrap();
    let config = InterbandConfig::default()
        .with_root(tmp.path())
        .with_prune_interval(0);
    let dir = channel_dir(&config, "clavain", "dispatch");
    // clavain/dispatch keeps 6h
    let stale = entry(&dir, "stale.json", 7 * 3600);
    let recent = entry(&dir, "recent.json", 5 * 3600);

    RetentionPruner::new(&config)
        .prune_channel("clavain", "dispatch")
        .unwrap();

    assert!(!stale.exists());
    assert!(recent.exists());
}

// =============================================================================
// Count cap
// =============================================================================

#[test]
fn test_max_files_removes_single_oldest() {
    let tmp = TempDir::new().unwrap();
    let config = InterbandConfig::from_vars([
        ("INTERBAND_ROOT", tmp.path().to_str().unwrap()),
        ("INTERBAND_MAX_FILES_INTERLOCK_COORDINATION", "2"),
        ("INTERBAND_RETENTION_INTERLOCK_COORDINATION_SECS", "3600"),
        ("INTERBAND_PRUNE_INTERVAL_SECS", "0"),
    ]);
    let dir = channel_dir(&config, "interlock", "coordination");
    let a = entry(&dir, "a.json", 3);
    let b = entry(&dir, "b.json", 2);
    let c = entry(&dir, "c.json", 1);

    let summary = RetentionPruner::new(&config)
        .prune_channel("interlock", "coordination")
        .unwrap();

    assert!(!a.exists());
    assert!(b.exists());
    assert!(c.exists());
    assert_eq!(summary.evicted, 1);
    assert_eq!(summary.retained, 2);
}

#[test]
fn test_age_then_count() {
    let tmp = TempDir::new().unwrap();
    let config = InterbandConfig::default()
        .with_root(tmp.path())
        .with_prune_interval(0)
        .with_retention_secs(100)
        .with_max_files(2);
    let dir = channel_dir(&config, "custom", "events");
    let expired = entry(&dir, "expired.json", 500);
    let oldest_kept_candidate = entry(&dir, "x.json", 50);
    let mid = entry(&dir, "y.json", 20);
    let newest = entry(&dir, "z.json", 10);

    let summary = RetentionPruner::new(&config)
        .prune_channel("custom", "events")
        .unwrap();

    assert!(!expired.exists());
    assert!(!oldest_kept_candidate.exists());
    assert!(mid.exists());
    assert!(newest.exists());
    assert_eq!((summary.expired, summary.evicted, summary.retained), (1, 1, 2));
}

#[test]
fn test_global_override_below_channel_override() {
    let tmp = TempDir::new().unwrap();
    let config = InterbandConfig::from_vars([
        ("INTERBAND_ROOT", tmp.path().to_str().unwrap()),
        ("INTERBAND_MAX_FILES", "1"),
        ("INTERBAND_MAX_FILES_CUSTOM_EVENTS", "3"),
        ("INTERBAND_PRUNE_INTERVAL_SECS", "0"),
    ]);
    let dir = channel_dir(&config, "custom", "events");
    for (i, name) in ["a.json", "b.json", "c.json"].iter().enumerate() {
        entry(&dir, name, 10 - i as u64);
    }

    let summary = RetentionPruner::new(&config)
        .prune_channel("custom", "events")
        .unwrap();
    assert_eq!(summary.retained, 3);
}

// =============================================================================
// Throttling
// =============================================================================

#[test]
fn test_second_prune_within_interval_is_noop() {
    let tmp = TempDir::new().unwrap();
    let config = InterbandConfig::default()
        .with_root(tmp.path())
        .with_retention_secs(60);
    let dir = channel_dir(&config, "custom", "events");
    let pruner = RetentionPruner::new(&config);

    let first = pruner.prune_channel("custom", "events").unwrap();
    assert_eq!(first.outcome, PruneOutcome::Completed);
    assert!(dir.join(PRUNE_STAMP).exists());

    let stale = entry(&dir, "stale.json", 3600);
    let second = pruner.prune_channel("custom", "events").unwrap();
    assert_eq!(second.outcome, PruneOutcome::Throttled);
    assert!(stale.exists());
}

#[test]
fn test_old_stamp_allows_prune() {
    let tmp = TempDir::new().unwrap();
    let config = InterbandConfig::default()
        .with_root(tmp.path())
        .with_retention_secs(60);
    let dir = channel_dir(&config, "custom", "events");
    let stamp = dir.join(PRUNE_STAMP);
    fs::write(&stamp, b"").unwrap();
    age(&stamp, 301);
    let stale = entry(&dir, "stale.json", 3600);

    let summary = RetentionPruner::new(&config)
        .prune_channel("custom", "events")
        .unwrap();

    assert!(summary.ran());
    assert!(!stale.exists());
    // stamp refreshed
    let refreshed = fs::metadata(&stamp).unwrap().modified().unwrap();
    assert!(SystemTime::now().duration_since(refreshed).unwrap() < Duration::from_secs(60));
}

// =============================================================================
// Best effort
// =============================================================================

#[test]
fn test_prune_of_missing_channel_succeeds() {
    let tmp = TempDir::new().unwrap();
    let band = Interband::new(InterbandConfig::default().with_root(tmp.path()));
    let summary = band.prune_channel("nobody", "here").unwrap();
    assert_eq!(summary.outcome, PruneOutcome::MissingDirectory);
}

#[test]
fn test_pruning_does_not_disturb_written_entries() {
    let tmp = TempDir::new().unwrap();
    let band = Interband::new(
        InterbandConfig::default()
            .with_root(tmp.path())
            .with_prune_interval(0),
    );
    for key in ["a", "b", "c"] {
        let path = band.path("custom", "events", key).unwrap();
        band.write_value(&path, "custom", "ping", "", json!({"key": key}))
            .unwrap();
    }

    let summary = band.prune_channel("custom", "events").unwrap();
    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.deleted(), 0);

    for key in ["a", "b", "c"] {
        let path = band.path("custom", "events", key).unwrap();
        assert_eq!(band.read_payload(&path).unwrap()["key"], json!(key));
    }
}

#[test]
fn test_unlistable_channel_is_absorbed() {
    let tmp = TempDir::new().unwrap();
    let config = InterbandConfig::default()
        .with_root(tmp.path())
        .with_prune_interval(0)
        .with_retention_secs(1);
    // A regular file where the channel directory belongs: metadata succeeds,
    // but both the stamp write and the listing fail
    fs::create_dir_all(tmp.path().join("custom")).unwrap();
    let occupant = tmp.path().join("custom").join("events");
    fs::write(&occupant, "x").unwrap();
    age(&occupant, 100);

    let summary = RetentionPruner::new(&config)
        .prune_channel("custom", "events")
        .unwrap();

    assert_eq!(summary.outcome, PruneOutcome::Completed);
    assert!(summary.ran());
    assert_eq!(summary.scanned, 0);
    assert_eq!(summary.deleted(), 0);
    assert_eq!(summary.delete_failures, 0);
    assert_eq!(fs::read_to_string(&occupant).unwrap(), "x");
    assert!(!tmp.path().join("custom").join(PRUNE_STAMP).exists());
}
