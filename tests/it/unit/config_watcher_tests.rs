//! Unit tests for config_watcher module.

use canvasflow::config_watcher::{ConfigWatcher, default_config_path};
use std::fs;
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_watcher_creation() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("engine.json");
    fs::write(&config_path, "{}").unwrap();

    let watcher = ConfigWatcher::new(config_path);
    assert!(watcher.is_ok());
}

#[test]
fn test_watcher_creates_missing_directory() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("not").join("yet").join("engine.json");

    let watcher = ConfigWatcher::new(config_path).unwrap();
    assert!(watcher.path().ends_with("engine.json"));
    assert!(dir.path().join("not").join("yet").is_dir());
}

#[test]
fn test_no_events_without_changes() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("engine.json");
    fs::write(&config_path, "{}").unwrap();

    let mut watcher = ConfigWatcher::new(config_path).unwrap();
    assert_eq!(watcher.poll(), None);
}

#[test]
fn test_default_paths() {
    // These should return Some on most systems
    let config = default_config_path();
    assert!(config.is_some() || cfg!(target_os = "unknown"));
}

/// File watcher event delivery is timing-dependent and platform-specific,
/// so this only checks that polling after a write does not misbehave.
#[test]
#[ignore]
fn test_file_modification_detection() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("engine.json");
    fs::write(&config_path, "{}").unwrap();

    let mut watcher = ConfigWatcher::new(config_path.clone()).unwrap();

    let mut file = fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(&config_path)
        .unwrap();
    writeln!(file, "{{\"history_capacity\": 10}}").unwrap();
    file.sync_all().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(200));
    let _event = watcher.poll();
}
