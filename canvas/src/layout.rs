//! Layout math for mood-board items.
//!
//! DESIGN
//! ======
//! Every function here is pure: it takes a starting geometry and a gesture
//! or canvas change and returns the new geometry. Stateful concerns (which
//! gesture is active, what is pending persistence) live in [`crate::gesture`]
//! and [`crate::doc`].
//!
//! Drags are unclamped: an item may be moved partly or fully off the visible
//! canvas. Resizes floor each dimension at [`MIN_ITEM_SIZE`]. Canvas rescales
//! scale position and size proportionally and never touch the z-index.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use rand::Rng;

use crate::consts::{MIN_ITEM_SIZE, PLACEMENT_REGION_DIVISOR, PLACEMENT_SIZE_MAX, PLACEMENT_SIZE_MIN};
use crate::geometry::{CanvasSize, Geometry, ItemId};
use crate::zorder;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: f64, height: f64 },
}

/// Translate `start` by a cumulative pointer delta.
#[must_use]
pub fn apply_drag(start: &Geometry, dx: f64, dy: f64) -> Geometry {
    Geometry { x: start.x + dx, y: start.y + dy, ..*start }
}

/// Grow or shrink `start` by a cumulative pointer delta, anchored at the
/// top-left corner. Neither dimension drops below [`MIN_ITEM_SIZE`].
#[must_use]
pub fn apply_resize(start: &Geometry, dw: f64, dh: f64) -> Geometry {
    Geometry {
        width: (start.width + dw).max(MIN_ITEM_SIZE),
        height: (start.height + dh).max(MIN_ITEM_SIZE),
        ..*start
    }
}

fn check_canvas(size: CanvasSize) -> Result<(), LayoutError> {
    if size.is_valid() {
        Ok(())
    } else {
        Err(LayoutError::InvalidCanvas { width: size.width, height: size.height })
    }
}

/// Scale one item from `old` canvas coordinates into `new` canvas coordinates.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidCanvas`] if either canvas has a zero,
/// negative or non-finite dimension.
pub fn rescale_geometry(g: &Geometry, old: CanvasSize, new: CanvasSize) -> Result<Geometry, LayoutError> {
    check_canvas(old)?;
    check_canvas(new)?;
    let sx = new.width / old.width;
    let sy = new.height / old.height;
    Ok(Geometry { x: g.x * sx, y: g.y * sy, width: g.width * sx, height: g.height * sy, z_index: g.z_index })
}

/// Rescale every item for a canvas resize. Output order follows input order.
///
/// # Errors
///
/// Same as [`rescale_geometry`]; nothing is computed if a canvas is invalid.
pub fn rescale_on_canvas_resize<'a, I>(
    items: I,
    old: CanvasSize,
    new: CanvasSize,
) -> Result<Vec<(ItemId, Geometry)>, LayoutError>
where
    I: IntoIterator<Item = (ItemId, &'a Geometry)>,
{
    check_canvas(old)?;
    check_canvas(new)?;
    items
        .into_iter()
        .map(|(id, g)| rescale_geometry(g, old, new).map(|scaled| (id, scaled)))
        .collect()
}

/// Pick a spot for a newly added item.
///
/// Position is uniform over the top-left quarter of the canvas, size uniform
/// in `[PLACEMENT_SIZE_MIN, PLACEMENT_SIZE_MAX)`, and the item is stacked
/// above everything in `existing_z`. A canvas that is invalid, or so small
/// that its quarter region collapses to zero, falls back to the default size.
pub fn random_initial_placement<R, I>(rng: &mut R, canvas: CanvasSize, existing_z: I) -> Geometry
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = i32>,
{
    let (max_x, max_y) = match placement_region(canvas) {
        Some(region) => region,
        None => placement_region(CanvasSize::default()).unwrap_or((1.0, 1.0)),
    };
    Geometry {
        x: rng.random_range(0.0..max_x),
        y: rng.random_range(0.0..max_y),
        width: rng.random_range(PLACEMENT_SIZE_MIN..PLACEMENT_SIZE_MAX),
        height: rng.random_range(PLACEMENT_SIZE_MIN..PLACEMENT_SIZE_MAX),
        z_index: zorder::next_z_index(existing_z),
    }
}

/// Exclusive upper bounds for placement, or `None` when either range is empty.
fn placement_region(canvas: CanvasSize) -> Option<(f64, f64)> {
    if !canvas.is_valid() {
        return None;
    }
    let max_x = canvas.width / PLACEMENT_REGION_DIVISOR;
    let max_y = canvas.height / PLACEMENT_REGION_DIVISOR;
    (max_x > 0.0 && max_y > 0.0).then_some((max_x, max_y))
}
