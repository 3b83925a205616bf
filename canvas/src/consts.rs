//! Shared numeric constants for the canvas crate.

// ── Sizing ──────────────────────────────────────────────────────

/// Smallest width or height an item can be resized to.
pub const MIN_ITEM_SIZE: f64 = 100.0;

/// Width and height used for an item whose position was never persisted.
pub const FALLBACK_ITEM_SIZE: f64 = 250.0;

// ── Canvas ──────────────────────────────────────────────────────

/// Canvas width of a freshly created board.
pub const DEFAULT_CANVAS_WIDTH: f64 = 1200.0;

/// Canvas height of a freshly created board.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 800.0;

// ── Placement ───────────────────────────────────────────────────

/// Lower bound of the random width/height given to a new item.
pub const PLACEMENT_SIZE_MIN: f64 = 200.0;

/// Exclusive upper bound of the random width/height given to a new item.
pub const PLACEMENT_SIZE_MAX: f64 = 350.0;

/// New items land in the top-left `1 / PLACEMENT_REGION_DIVISOR` of the canvas
/// on each axis (600×400 on the default canvas).
pub const PLACEMENT_REGION_DIVISOR: f64 = 2.0;

// ── Stacking ────────────────────────────────────────────────────

/// Bottom-most stacking layer. Z-indices never go below this.
pub const MIN_Z_INDEX: i32 = 1;
