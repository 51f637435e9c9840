//! Shared numeric constants for the canvas crate.

// ── Transform defaults ──────────────────────────────────────────

/// Default left offset for a new element when it cannot be centered.
pub const DEFAULT_X: f64 = 0.0;

/// Default top offset for a new element when it cannot be centered.
pub const DEFAULT_Y: f64 = 0.0;

/// Default rotation in degrees.
pub const DEFAULT_ANGLE: f64 = 0.0;

/// Default uniform scale.
pub const DEFAULT_SCALE: f64 = 1.0;

// ── Layering ────────────────────────────────────────────────────

/// Relative z-index step used by the layer up/down buttons.
pub const ZINDEX_STEP: i64 = 10;

/// z-index assigned to newly created elements.
pub const DEFAULT_ZINDEX: i64 = 10;

// ── Gestures ────────────────────────────────────────────────────

/// Rotation tracks the handle at this fraction of the pointer's angular velocity.
pub const ROTATE_SENSITIVITY: f64 = 0.5;

/// Scale units per horizontal pixel on the zoom handle.
pub const ZOOM_SENSITIVITY: f64 = 0.01;

/// Lower scale bound shared by every element kind.
pub const MIN_SCALE: f64 = 0.3;

/// Upper scale bound for text and stickers.
pub const MAX_SCALE: f64 = 2.0;

/// Upper scale bound for a user's own photo.
pub const PRINTED_IMAGE_MAX_SCALE: f64 = 3.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Diagonal offset from a frame corner to the center of its handle, in
/// unscaled element pixels.
pub const HANDLE_OFFSET_PX: f64 = 15.0;

/// Hit radius of a handle, in unscaled element pixels.
pub const HANDLE_RADIUS_PX: f64 = 13.0;

// ── Bounds ──────────────────────────────────────────────────────

/// Quiet period before the print-area check re-runs after pointer movement.
pub const BOUNDS_DEBOUNCE_MS: u64 = 50;

// ── Text ────────────────────────────────────────────────────────

/// Font size corresponding to a text element at scale 1.0.
pub const TEXT_BASE_FONT_SIZE: f64 = 24.0;

/// Decimal places kept when converting between font size and scale.
pub const SCALE_ROUND_DECIMALS: i32 = 12;

/// Default text color.
pub const TEXT_DEFAULT_COLOR: &str = "#000000";

/// Default text font family.
pub const TEXT_DEFAULT_FONT_FAMILY: &str = "Arial";

/// Default text font weight.
pub const TEXT_DEFAULT_FONT_WEIGHT: u16 = 400;

// ── Initial sizing ──────────────────────────────────────────────

/// Maximum initial display width of an image element.
pub const MAX_INITIAL_WIDTH_PX: f64 = 200.0;

/// Maximum initial display height of an image element.
pub const MAX_INITIAL_HEIGHT_PX: f64 = 300.0;
