//! Engine-wide constants.
//!
//! Centralizes magic numbers so that the scene, controller, and projector
//! agree on the same bounds. Most of these are defaults for `EngineConfig`.

// ============================================================================
// Item Bounds
// ============================================================================

/// Minimum item width in world units (keeps handles usable)
pub const MIN_ITEM_WIDTH: f32 = 140.0;

/// Minimum item height in world units
pub const MIN_ITEM_HEIGHT: f32 = 80.0;

/// Default note size
pub const DEFAULT_NOTE_SIZE: (f32, f32) = (240.0, 160.0);

/// Default memo size
pub const DEFAULT_MEMO_SIZE: (f32, f32) = (200.0, 120.0);

/// Default link card size
pub const DEFAULT_LINK_SIZE: (f32, f32) = (280.0, 110.0);

/// Default image size
pub const DEFAULT_IMAGE_SIZE: (f32, f32) = (320.0, 240.0);

/// Default video size (16:9)
pub const DEFAULT_VIDEO_SIZE: (f32, f32) = (384.0, 216.0);

/// Horizontal gap between a parent and a spawned child
pub const CHILD_SPAWN_GAP: f32 = 80.0;

// ============================================================================
// Zoom & Pan
// ============================================================================

/// Minimum zoom level
pub const MIN_ZOOM: f32 = 0.1;

/// Maximum zoom level
pub const MAX_ZOOM: f32 = 5.0;

/// Default zoom level
pub const DEFAULT_ZOOM: f32 = 1.0;

/// Wheel delta divisor for zoom steps
pub const WHEEL_ZOOM_DIVISOR: f32 = 500.0;

/// Fit-to-content never zooms in beyond this
pub const FIT_MAX_SCALE: f32 = 2.0;

/// Fit-to-content under-fill factor
pub const FIT_MARGIN_FACTOR: f32 = 0.92;

/// World-space padding around content when fitting
pub const FIT_PADDING: f32 = 60.0;

/// Default viewport size when the host has not reported one
pub const DEFAULT_VIEWPORT_SIZE: (f32, f32) = (1280.0, 800.0);

// ============================================================================
// Animation & Timing
// ============================================================================

/// Zoom/pan/fit transition duration in milliseconds
pub const VIEWPORT_ANIMATION_MS: u64 = 300;

/// Autosave debounce delay in milliseconds
pub const AUTOSAVE_DEBOUNCE_MS: u64 = 1500;

/// Maximum undo history states to keep
pub const MAX_HISTORY_STATES: usize = 50;

/// Target frame time for 60 FPS
pub const TARGET_FRAME_MS: f64 = 16.67;

// ============================================================================
// Input Handling
// ============================================================================

/// Minimum box-select extent in screen pixels (prevents click selection)
pub const MIN_MARQUEE_SIZE: f32 = 2.0;

/// Size of the resize corner area in screen pixels
pub const RESIZE_CORNER_SIZE: f32 = 16.0;

/// Hit radius around a connection anchor in screen pixels
pub const ANCHOR_HIT_RADIUS: f32 = 10.0;

/// Hit distance from a connection curve in screen pixels
pub const CONNECTION_HIT_DISTANCE: f32 = 8.0;

/// Samples used when hit-testing a connection curve
pub const CURVE_HIT_SAMPLES: usize = 24;

// ============================================================================
// Curves
// ============================================================================

/// Control point offset as a fraction of endpoint distance
pub const CURVE_OFFSET_FACTOR: f32 = 0.3;

/// Upper bound on the control point offset
pub const CURVE_MAX_OFFSET: f32 = 80.0;

// ============================================================================
// Minimap
// ============================================================================

/// Overview region size in pixels
pub const MINIMAP_SIZE: (f32, f32) = (200.0, 140.0);

/// World-space padding around the scene bounds in the overview
pub const MINIMAP_PADDING: f32 = 100.0;

/// Neutral fill for items without a color tag
pub const MINIMAP_NEUTRAL_COLOR: &str = "#8a8f98";
