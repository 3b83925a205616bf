//! Stacking order for mood-board items.
//!
//! Z-indices are a floor-only counter: they start at [`MIN_Z_INDEX`], grow
//! without compaction on bring-forward, and never drop below the floor on
//! send-backward. Duplicates are allowed. Equal z-indices render in listing
//! (creation) order, so the later-created item is drawn on top.

#[cfg(test)]
#[path = "zorder_test.rs"]
mod zorder_test;

use crate::consts::MIN_Z_INDEX;

/// One layer up. Saturates at `i32::MAX`.
#[must_use]
pub fn bring_forward(z_index: i32) -> i32 {
    z_index.saturating_add(1).max(MIN_Z_INDEX)
}

/// One layer down, floored at [`MIN_Z_INDEX`].
#[must_use]
pub fn send_backward(z_index: i32) -> i32 {
    z_index.saturating_sub(1).max(MIN_Z_INDEX)
}

/// Z-index that places a new item above all of `existing`.
#[must_use]
pub fn next_z_index<I>(existing: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    existing
        .into_iter()
        .max()
        .map_or(MIN_Z_INDEX, |max| max.saturating_add(1).max(MIN_Z_INDEX))
}

/// Indices of `z_indices` in bottom-to-top draw order.
///
/// The input slice is in listing order; the sort is stable so ties keep it.
#[must_use]
pub fn render_order(z_indices: &[i32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..z_indices.len()).collect();
    order.sort_by_key(|&i| z_indices[i]);
    order
}
