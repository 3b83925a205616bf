//! Document model: mood-board items and their two layers of geometry.
//!
//! Every item has exactly one effective geometry at a time, resolved as
//! `pending ?? confirmed ?? fallback`:
//!
//! - **confirmed** is the last value the server returned (`position` on the
//!   wire, possibly null for items created without one).
//! - **pending** is a local edit that has been handed to the host for
//!   persistence but not yet acknowledged.
//!
//! A fresh snapshot replaces every confirmed value and discards every pending
//! one. An acknowledgement promotes the acknowledged value to confirmed and
//! only clears the pending slot when nothing newer was staged on top of it.
//! Failed writes are recorded in an unsynced set and are not retried here;
//! the item keeps rendering its pending value until the next snapshot.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::geometry::{CanvasSize, Geometry, ItemId, ItemKind};
use crate::zorder;

/// A mood-board item as listed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardItem {
    pub id: ItemId,
    pub board_id: uuid::Uuid,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Last persisted geometry. `None` renders at [`Geometry::fallback`].
    pub position: Option<Geometry>,
}

/// In-memory store of the items on one board.
pub struct DocStore {
    /// Item ids in server listing (creation) order.
    order: Vec<ItemId>,
    items: HashMap<ItemId, BoardItem>,
    pending: HashMap<ItemId, Geometry>,
    unsynced: HashSet<ItemId>,
    canvas: CanvasSize,
    pending_canvas: Option<CanvasSize>,
}

impl DocStore {
    /// Create an empty store with the default canvas.
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            items: HashMap::new(),
            pending: HashMap::new(),
            unsynced: HashSet::new(),
            canvas: CanvasSize::default(),
            pending_canvas: None,
        }
    }

    /// Replace everything with a server snapshot. Pending edits are dropped.
    pub fn load_snapshot(&mut self, canvas: CanvasSize, items: Vec<BoardItem>) {
        self.order.clear();
        self.items.clear();
        self.pending.clear();
        self.unsynced.clear();
        self.canvas = canvas;
        self.pending_canvas = None;
        for item in items {
            self.insert(item);
        }
    }

    /// Insert a new item at the end of the listing, or replace an existing
    /// item's data (keeping its listing slot and any pending edit).
    pub fn insert(&mut self, item: BoardItem) {
        if !self.items.contains_key(&item.id) {
            self.order.push(item.id);
        }
        self.items.insert(item.id, item);
    }

    /// Remove an item and any local state attached to it.
    pub fn remove(&mut self, id: &ItemId) -> Option<BoardItem> {
        self.order.retain(|existing| existing != id);
        self.pending.remove(id);
        self.unsynced.remove(id);
        self.items.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&BoardItem> {
        self.items.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Item ids in listing order.
    #[must_use]
    pub fn ids(&self) -> &[ItemId] {
        &self.order
    }

    /// Last server-confirmed geometry of an item.
    #[must_use]
    pub fn confirmed(&self, id: &ItemId) -> Option<Geometry> {
        self.items.get(id).and_then(|item| item.position)
    }

    /// Locally staged geometry awaiting acknowledgement.
    #[must_use]
    pub fn pending(&self, id: &ItemId) -> Option<Geometry> {
        self.pending.get(id).copied()
    }

    /// Geometry to render for an item. `None` only when the item is unknown.
    #[must_use]
    pub fn effective(&self, id: &ItemId) -> Option<Geometry> {
        let item = self.items.get(id)?;
        Some(
            self.pending
                .get(id)
                .copied()
                .or(item.position)
                .unwrap_or_else(Geometry::fallback),
        )
    }

    /// Stage a local edit. Returns false if the item doesn't exist.
    pub fn set_pending(&mut self, id: &ItemId, geometry: Geometry) -> bool {
        if !self.items.contains_key(id) {
            return false;
        }
        self.pending.insert(*id, geometry);
        true
    }

    /// Record a successful write of `geometry`. Returns false if the item
    /// doesn't exist.
    pub fn acknowledge(&mut self, id: &ItemId, geometry: Geometry) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        item.position = Some(geometry);
        if self.pending.get(id) == Some(&geometry) {
            self.pending.remove(id);
            self.unsynced.remove(id);
        }
        true
    }

    /// Record a failed write. The pending value stays in place.
    pub fn mark_failed(&mut self, id: &ItemId) -> bool {
        if !self.pending.contains_key(id) {
            return false;
        }
        self.unsynced.insert(*id);
        true
    }

    #[must_use]
    pub fn is_unsynced(&self, id: &ItemId) -> bool {
        self.unsynced.contains(id)
    }

    /// Items whose last write failed, in listing order.
    #[must_use]
    pub fn unsynced(&self) -> Vec<ItemId> {
        self.order.iter().filter(|id| self.unsynced.contains(id)).copied().collect()
    }

    /// Canvas size to render: pending resize if any, else confirmed.
    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.pending_canvas.unwrap_or(self.canvas)
    }

    /// Stage a canvas resize.
    pub fn set_pending_canvas(&mut self, size: CanvasSize) {
        self.pending_canvas = Some(size);
    }

    /// Record a successful canvas write.
    pub fn acknowledge_canvas(&mut self, size: CanvasSize) {
        self.canvas = size;
        if self.pending_canvas == Some(size) {
            self.pending_canvas = None;
        }
    }

    /// Every item with its effective geometry, bottom-to-top.
    #[must_use]
    pub fn sorted_items(&self) -> Vec<(&BoardItem, Geometry)> {
        let listed: Vec<(&BoardItem, Geometry)> = self
            .order
            .iter()
            .filter_map(|id| Some((self.items.get(id)?, self.effective(id)?)))
            .collect();
        let z_indices: Vec<i32> = listed.iter().map(|(_, g)| g.z_index).collect();
        zorder::render_order(&z_indices)
            .into_iter()
            .map(|i| listed[i])
            .collect()
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}
