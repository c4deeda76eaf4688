//! Engine configuration.
//!
//! Every field has a default from `constants`, so a partial (or empty) JSON
//! file is valid. Values are clamped by `sanitized()` rather than rejected.

use crate::constants::{
    ANCHOR_HIT_RADIUS, AUTOSAVE_DEBOUNCE_MS, CONNECTION_HIT_DISTANCE, CURVE_HIT_SAMPLES,
    FIT_MARGIN_FACTOR, FIT_MAX_SCALE, FIT_PADDING, MAX_HISTORY_STATES, MAX_ZOOM, MIN_ITEM_HEIGHT,
    MIN_ITEM_WIDTH, MIN_MARQUEE_SIZE, MIN_ZOOM, MINIMAP_PADDING, MINIMAP_SIZE, RESIZE_CORNER_SIZE,
    VIEWPORT_ANIMATION_MS,
};
use crate::error::{CanvasError, CanvasResult};
use crate::input::ControllerSettings;
use crate::viewport::FitOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub history_capacity: usize,
    pub autosave_debounce_ms: u64,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub min_item_size: (f32, f32),
    pub animation_ms: u64,
    pub minimap_size: (f32, f32),
    pub minimap_padding: f32,
    pub fit_padding: f32,
    pub fit_margin_factor: f32,
    pub fit_max_scale: f32,
    /// Box-select extent (screen px) below which a release counts as a click
    pub box_select_epsilon: f32,
    pub anchor_hit_radius: f32,
    pub resize_corner_size: f32,
    pub connection_hit_distance: f32,
    pub curve_samples: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: MAX_HISTORY_STATES,
            autosave_debounce_ms: AUTOSAVE_DEBOUNCE_MS,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            min_item_size: (MIN_ITEM_WIDTH, MIN_ITEM_HEIGHT),
            animation_ms: VIEWPORT_ANIMATION_MS,
            minimap_size: MINIMAP_SIZE,
            minimap_padding: MINIMAP_PADDING,
            fit_padding: FIT_PADDING,
            fit_margin_factor: FIT_MARGIN_FACTOR,
            fit_max_scale: FIT_MAX_SCALE,
            box_select_epsilon: MIN_MARQUEE_SIZE,
            anchor_hit_radius: ANCHOR_HIT_RADIUS,
            resize_corner_size: RESIZE_CORNER_SIZE,
            connection_hit_distance: CONNECTION_HIT_DISTANCE,
            curve_samples: CURVE_HIT_SAMPLES,
        }
    }
}

/// `<config dir>/canvasflow/engine.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("canvasflow").join("engine.json"))
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 { value } else { fallback }
}

fn non_negative_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value >= 0.0 { value } else { fallback }
}

impl EngineConfig {
    /// Load from `path`. A missing file yields defaults; a malformed one is
    /// an error so the caller can keep its current config.
    pub fn load(path: &Path) -> CanvasResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No engine config, using defaults");
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| CanvasError::Config(format!("{}: {e}", path.display())))?;
        Ok(config.sanitized())
    }

    /// Load from the default location, falling back to defaults on any error.
    pub fn load_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load engine config, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> CanvasResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Clamp every field into its usable range.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        self.history_capacity = self.history_capacity.max(2);
        self.min_zoom = positive_or(self.min_zoom, defaults.min_zoom);
        self.max_zoom = positive_or(self.max_zoom, defaults.max_zoom);
        if self.min_zoom > self.max_zoom {
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        self.min_item_size = (
            positive_or(self.min_item_size.0, defaults.min_item_size.0),
            positive_or(self.min_item_size.1, defaults.min_item_size.1),
        );
        self.minimap_size = (
            positive_or(self.minimap_size.0, defaults.minimap_size.0),
            positive_or(self.minimap_size.1, defaults.minimap_size.1),
        );
        self.minimap_padding = non_negative_or(self.minimap_padding, defaults.minimap_padding);
        self.fit_padding = non_negative_or(self.fit_padding, defaults.fit_padding);
        self.fit_margin_factor = positive_or(self.fit_margin_factor, defaults.fit_margin_factor).min(1.0);
        self.fit_max_scale = positive_or(self.fit_max_scale, defaults.fit_max_scale);
        self.box_select_epsilon = non_negative_or(self.box_select_epsilon, defaults.box_select_epsilon);
        self.anchor_hit_radius = non_negative_or(self.anchor_hit_radius, defaults.anchor_hit_radius);
        self.resize_corner_size = non_negative_or(self.resize_corner_size, defaults.resize_corner_size);
        self.connection_hit_distance =
            non_negative_or(self.connection_hit_distance, defaults.connection_hit_distance);
        self.curve_samples = self.curve_samples.max(2);
        self
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            min_marquee_size: self.box_select_epsilon,
            anchor_hit_radius: self.anchor_hit_radius,
            resize_corner_size: self.resize_corner_size,
            connection_hit_distance: self.connection_hit_distance,
            curve_samples: self.curve_samples,
        }
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            padding: self.fit_padding,
            max_scale: self.fit_max_scale,
            margin_factor: self.fit_margin_factor,
        }
    }
}
