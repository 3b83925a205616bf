use rand::Rng;

use crate::doc::{BoardItem, DocStore};
use crate::geometry::{CanvasSize, Geometry, ItemId};
use crate::gesture::{GestureError, GestureKind, GestureTable};
use crate::layout::{self, LayoutError};
use crate::zorder;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from engine operations for the host to process.
///
/// `PersistItem` and `PersistCanvas` are independent writes. The host reports
/// each outcome back through [`EngineCore::acknowledge`] /
/// [`EngineCore::mark_failed`] (or [`EngineCore::acknowledge_canvas`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    PersistItem { id: ItemId, geometry: Geometry },
    PersistCanvas { size: CanvasSize },
    RenderNeeded,
}

/// Core engine state for one open mood board.
#[derive(Default)]
pub struct EngineCore {
    pub doc: DocStore,
    pub gestures: GestureTable,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Hydrate from a server read. Drops pending edits and active gestures.
    pub fn load_snapshot(&mut self, canvas: CanvasSize, items: Vec<BoardItem>) {
        self.gestures.clear();
        self.doc.load_snapshot(canvas, items);
    }

    /// An item was created on the server.
    pub fn apply_create(&mut self, item: BoardItem) {
        self.doc.insert(item);
    }

    /// An item was deleted on the server.
    pub fn apply_delete(&mut self, id: &ItemId) {
        self.gestures.forget(id);
        self.doc.remove(id);
    }

    /// A write of `geometry` for `id` succeeded.
    pub fn acknowledge(&mut self, id: &ItemId, geometry: Geometry) {
        self.doc.acknowledge(id, geometry);
    }

    /// A write for `id` failed. The local value is kept until the next snapshot.
    pub fn mark_failed(&mut self, id: &ItemId) {
        self.doc.mark_failed(id);
    }

    /// A canvas size write succeeded.
    pub fn acknowledge_canvas(&mut self, size: CanvasSize) {
        self.doc.acknowledge_canvas(size);
    }

    // --- Gestures ---

    /// Pointer down on an item body.
    ///
    /// # Errors
    ///
    /// Unknown item, or the item already has a gesture.
    pub fn begin_drag(&mut self, id: &ItemId) -> Result<(), GestureError> {
        self.begin(id, GestureKind::Drag)
    }

    /// Pointer down on an item's resize handle.
    ///
    /// # Errors
    ///
    /// Unknown item, or the item already has a gesture.
    pub fn begin_resize(&mut self, id: &ItemId) -> Result<(), GestureError> {
        self.begin(id, GestureKind::Resize)
    }

    fn begin(&mut self, id: &ItemId, kind: GestureKind) -> Result<(), GestureError> {
        let origin = self.doc.effective(id).ok_or(GestureError::UnknownItem(*id))?;
        self.gestures.begin(*id, kind, origin)
    }

    /// Pointer moved; `dx`/`dy` are measured from the gesture start.
    ///
    /// # Errors
    ///
    /// No gesture in progress for the item.
    pub fn move_gesture(&mut self, id: &ItemId, dx: f64, dy: f64) -> Result<Vec<Action>, GestureError> {
        self.gestures.update(id, dx, dy)?;
        Ok(vec![Action::RenderNeeded])
    }

    /// Pointer released: stage the final geometry and ask for it to be persisted.
    ///
    /// # Errors
    ///
    /// No gesture in progress for the item.
    pub fn end_gesture(&mut self, id: &ItemId) -> Result<Vec<Action>, GestureError> {
        let geometry = self.gestures.finish(id)?;
        if !self.doc.set_pending(id, geometry) {
            return Err(GestureError::UnknownItem(*id));
        }
        Ok(vec![Action::PersistItem { id: *id, geometry }, Action::RenderNeeded])
    }

    /// Gesture abandoned (e.g. pointer capture lost). Nothing is persisted.
    ///
    /// # Errors
    ///
    /// No gesture in progress for the item.
    pub fn cancel_gesture(&mut self, id: &ItemId) -> Result<Vec<Action>, GestureError> {
        self.gestures.cancel(id)?;
        Ok(vec![Action::RenderNeeded])
    }

    // --- Stacking ---

    /// Raise an item one layer.
    ///
    /// # Errors
    ///
    /// Unknown item, or the item is mid-gesture.
    pub fn bring_forward(&mut self, id: &ItemId) -> Result<Vec<Action>, GestureError> {
        self.restack(id, zorder::bring_forward)
    }

    /// Lower an item one layer. At the bottom layer this is a no-op and
    /// returns no actions.
    ///
    /// # Errors
    ///
    /// Unknown item, or the item is mid-gesture.
    pub fn send_backward(&mut self, id: &ItemId) -> Result<Vec<Action>, GestureError> {
        self.restack(id, zorder::send_backward)
    }

    fn restack(&mut self, id: &ItemId, step: fn(i32) -> i32) -> Result<Vec<Action>, GestureError> {
        if self.gestures.is_active(id) {
            return Err(GestureError::Busy(*id));
        }
        let current = self.doc.effective(id).ok_or(GestureError::UnknownItem(*id))?;
        let z_index = step(current.z_index);
        if z_index == current.z_index {
            return Ok(Vec::new());
        }
        let geometry = current.with_z(z_index);
        self.doc.set_pending(id, geometry);
        Ok(vec![Action::PersistItem { id: *id, geometry }, Action::RenderNeeded])
    }

    // --- Canvas ---

    /// Resize the canvas and rescale every item proportionally.
    ///
    /// Emits `PersistCanvas` first, then one `PersistItem` per item in listing
    /// order. Active gestures are abandoned since their origins are stale.
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidCanvas`] if the current or requested size is
    /// degenerate; nothing changes in that case.
    pub fn resize_canvas(&mut self, size: CanvasSize) -> Result<Vec<Action>, LayoutError> {
        let old = self.doc.canvas();
        let current: Vec<(ItemId, Geometry)> = self
            .doc
            .ids()
            .iter()
            .filter_map(|id| Some((*id, self.doc.effective(id)?)))
            .collect();
        let rescaled = layout::rescale_on_canvas_resize(current.iter().map(|(id, g)| (*id, g)), old, size)?;

        self.gestures.clear();
        self.doc.set_pending_canvas(size);
        let mut actions = Vec::with_capacity(rescaled.len() + 2);
        actions.push(Action::PersistCanvas { size });
        for (id, geometry) in rescaled {
            self.doc.set_pending(&id, geometry);
            actions.push(Action::PersistItem { id, geometry });
        }
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    /// Geometry for an item about to be created: random spot in the current
    /// canvas, stacked above every existing item.
    pub fn place_new_item<R: Rng + ?Sized>(&self, rng: &mut R) -> Geometry {
        let existing: Vec<i32> = self
            .doc
            .ids()
            .iter()
            .filter_map(|id| self.geometry(id))
            .map(|g| g.z_index)
            .collect();
        layout::random_initial_placement(rng, self.doc.canvas(), existing)
    }

    // --- Queries ---

    /// Geometry to draw right now: staged gesture value, else effective.
    #[must_use]
    pub fn geometry(&self, id: &ItemId) -> Option<Geometry> {
        self.gestures.staged(id).or_else(|| self.doc.effective(id))
    }

    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&BoardItem> {
        self.doc.get(id)
    }

    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.doc.canvas()
    }

    /// Items to draw, bottom-to-top, with their current geometry.
    #[must_use]
    pub fn render_list(&self) -> Vec<(ItemId, Geometry)> {
        let listed: Vec<(ItemId, Geometry)> = self
            .doc
            .ids()
            .iter()
            .filter_map(|id| Some((*id, self.geometry(id)?)))
            .collect();
        let z_indices: Vec<i32> = listed.iter().map(|(_, g)| g.z_index).collect();
        zorder::render_order(&z_indices)
            .into_iter()
            .map(|i| listed[i])
            .collect()
    }
}
