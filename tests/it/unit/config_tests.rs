//! Unit tests for engine configuration.

use canvasflow::config::{EngineConfig, default_config_path};
use canvasflow::error::CanvasError;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let config = EngineConfig::load(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn test_load_clamps_out_of_range_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.json");
    fs::write(&path, r#"{"history_capacity": 1, "min_zoom": -3.0, "max_zoom": 8.0}"#).unwrap();

    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.history_capacity, 2);
    assert_eq!(config.min_zoom, EngineConfig::default().min_zoom);
    assert_eq!(config.max_zoom, 8.0);
}

#[test]
fn test_invalid_json_is_a_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.json");
    fs::write(&path, "{ history_capacity: ").unwrap();
    assert!(matches!(EngineConfig::load(&path), Err(CanvasError::Config(_))));
}

#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("engine.json");
    let config = EngineConfig {
        history_capacity: 12,
        autosave_debounce_ms: 500,
        ..EngineConfig::default()
    };
    config.save(&path).unwrap();
    assert_eq!(EngineConfig::load(&path).unwrap(), config);
}

#[test]
fn test_derived_settings_follow_fields() {
    let config = EngineConfig {
        box_select_epsilon: 6.0,
        fit_padding: 10.0,
        ..EngineConfig::default()
    };
    assert_eq!(config.controller_settings().min_marquee_size, 6.0);
    assert_eq!(config.fit_options().padding, 10.0);
    assert_eq!(config.autosave_delay().as_millis(), 1500);
}

#[test]
fn test_default_path_lives_under_app_dir() {
    if let Some(path) = default_config_path() {
        assert!(path.ends_with("canvasflow/engine.json"));
    }
}
