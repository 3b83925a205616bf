//! Geometry model: where an item sits on the board and how it stacks.
//!
//! `Geometry` is plain data. It is the JSON shape the server stores in an
//! item's `position` field and the value the layout engine produces, so the
//! serde names (`zIndex`) are part of the wire contract.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, FALLBACK_ITEM_SIZE, MIN_Z_INDEX};

/// Unique identifier for a mood-board item.
pub type ItemId = Uuid;

/// Placement of one item on the canvas.
///
/// `x`/`y` are offsets of the top-left corner from the canvas origin and may
/// be negative or beyond the canvas edge. `z_index` starts at 1 (bottom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i32,
}

impl Geometry {
    /// Geometry rendered for an item whose position was never persisted.
    #[must_use]
    pub const fn fallback() -> Self {
        Self { x: 0.0, y: 0.0, width: FALLBACK_ITEM_SIZE, height: FALLBACK_ITEM_SIZE, z_index: MIN_Z_INDEX }
    }

    /// True when every component is finite, the box has positive area, and
    /// the z-index is at or above the bottom layer.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
            && self.z_index >= MIN_Z_INDEX
    }

    /// Same placement with a different stacking layer.
    #[must_use]
    pub fn with_z(self, z_index: i32) -> Self {
        Self { z_index, ..self }
    }
}

/// Pixel dimensions of a board's canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

/// What an item displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Remote image referenced by an `http(s)` URL.
    ImageUrl,
    /// Image uploaded inline as a `data:image/...` URI.
    ImageUpload,
}

impl ItemKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImageUrl => "image_url",
            Self::ImageUpload => "image_upload",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "image_url" => Some(Self::ImageUrl),
            "image_upload" => Some(Self::ImageUpload),
            _ => None,
        }
    }

    /// Whether `content` is an acceptable payload for this kind.
    #[must_use]
    pub fn accepts(self, content: &str) -> bool {
        match self {
            Self::ImageUrl => content.starts_with("http://") || content.starts_with("https://"),
            Self::ImageUpload => content.starts_with("data:image/"),
        }
    }
}
