//! Per-item drag and resize gestures.
//!
//! A gesture captures the item's geometry when the pointer goes down and
//! interprets every move as a cumulative delta from that origin, so a lost
//! intermediate event never skews the result. Intermediate results are only
//! staged for rendering; the caller persists the value returned by
//! [`GestureTable::finish`].
//!
//! Each item has at most one gesture at a time (drag XOR resize). Gestures on
//! different items are independent and may overlap.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::collections::HashMap;

use crate::geometry::{Geometry, ItemId};
use crate::layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GestureError {
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),
    #[error("item {0} already has a gesture in progress")]
    Busy(ItemId),
    #[error("no gesture in progress for item {0}")]
    NoGesture(ItemId),
}

/// State of one in-flight gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub kind: GestureKind,
    /// Geometry when the gesture began.
    pub origin: Geometry,
    /// Geometry after the latest move.
    pub staged: Geometry,
}

impl Gesture {
    fn project(&self, dx: f64, dy: f64) -> Geometry {
        match self.kind {
            GestureKind::Drag => layout::apply_drag(&self.origin, dx, dy),
            GestureKind::Resize => layout::apply_resize(&self.origin, dx, dy),
        }
    }
}

/// Active gestures keyed by item.
#[derive(Debug, Default)]
pub struct GestureTable {
    active: HashMap<ItemId, Gesture>,
}

impl GestureTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a gesture on `id` from `origin`.
    ///
    /// # Errors
    ///
    /// [`GestureError::Busy`] if the item already has a gesture.
    pub fn begin(&mut self, id: ItemId, kind: GestureKind, origin: Geometry) -> Result<(), GestureError> {
        if self.active.contains_key(&id) {
            return Err(GestureError::Busy(id));
        }
        self.active.insert(id, Gesture { kind, origin, staged: origin });
        Ok(())
    }

    /// Apply a cumulative pointer delta and return the staged geometry.
    ///
    /// # Errors
    ///
    /// [`GestureError::NoGesture`] if nothing is in progress for `id`.
    pub fn update(&mut self, id: &ItemId, dx: f64, dy: f64) -> Result<Geometry, GestureError> {
        let gesture = self.active.get_mut(id).ok_or(GestureError::NoGesture(*id))?;
        gesture.staged = gesture.project(dx, dy);
        Ok(gesture.staged)
    }

    /// End the gesture and return the geometry to persist.
    ///
    /// # Errors
    ///
    /// [`GestureError::NoGesture`] if nothing is in progress for `id`.
    pub fn finish(&mut self, id: &ItemId) -> Result<Geometry, GestureError> {
        self.active
            .remove(id)
            .map(|gesture| gesture.staged)
            .ok_or(GestureError::NoGesture(*id))
    }

    /// Abandon the gesture and return the origin geometry.
    ///
    /// # Errors
    ///
    /// [`GestureError::NoGesture`] if nothing is in progress for `id`.
    pub fn cancel(&mut self, id: &ItemId) -> Result<Geometry, GestureError> {
        self.active
            .remove(id)
            .map(|gesture| gesture.origin)
            .ok_or(GestureError::NoGesture(*id))
    }

    /// Drop a gesture without reporting, e.g. when its item is deleted.
    pub fn forget(&mut self, id: &ItemId) {
        self.active.remove(id);
    }

    /// Drop every gesture.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Gesture> {
        self.active.get(id)
    }

    #[must_use]
    pub fn staged(&self, id: &ItemId) -> Option<Geometry> {
        self.active.get(id).map(|gesture| gesture.staged)
    }

    #[must_use]
    pub fn is_active(&self, id: &ItemId) -> bool {
        self.active.contains_key(id)
    }
}
