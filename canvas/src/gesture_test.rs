#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;

fn start() -> Geometry {
    Geometry { x: 10.0, y: 10.0, width: 200.0, height: 200.0, z_index: 2 }
}

#[test]
fn drag_deltas_are_cumulative_from_origin() {
    let mut table = GestureTable::new();
    let id = Uuid::new_v4();
    table.begin(id, GestureKind::Drag, start()).unwrap();
    table.update(&id, 5.0, 5.0).unwrap();
    let staged = table.update(&id, 30.0, -10.0).unwrap();
    assert_eq!((staged.x, staged.y), (40.0, 0.0));
    assert_eq!(table.finish(&id).unwrap(), staged);
    assert!(!table.is_active(&id));
}

#[test]
fn resize_respects_floor_during_gesture() {
    let mut table = GestureTable::new();
    let id = Uuid::new_v4();
    table.begin(id, GestureKind::Resize, start()).unwrap();
    let staged = table.update(&id, -500.0, 25.0).unwrap();
    assert_eq!((staged.width, staged.height), (100.0, 225.0));
    assert_eq!((staged.x, staged.y), (10.0, 10.0));
}

#[test]
fn finish_without_moves_returns_origin() {
    let mut table = GestureTable::new();
    let id = Uuid::new_v4();
    table.begin(id, GestureKind::Drag, start()).unwrap();
    assert_eq!(table.finish(&id).unwrap(), start());
}

#[test]
fn second_gesture_on_same_item_is_busy() {
    let mut table = GestureTable::new();
    let id = Uuid::new_v4();
    table.begin(id, GestureKind::Drag, start()).unwrap();
    assert_eq!(table.begin(id, GestureKind::Resize, start()), Err(GestureError::Busy(id)));
    assert_eq!(table.get(&id).map(|g| g.kind), Some(GestureKind::Drag));
}

#[test]
fn different_items_may_overlap() {
    let mut table = GestureTable::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    table.begin(a, GestureKind::Drag, start()).unwrap();
    table.begin(b, GestureKind::Resize, start()).unwrap();
    table.update(&a, 1.0, 1.0).unwrap();
    table.update(&b, 50.0, 50.0).unwrap();
    assert_eq!(table.staged(&a).map(|g| g.width), Some(200.0));
    assert_eq!(table.staged(&b).map(|g| g.width), Some(250.0));
}

#[test]
fn cancel_returns_origin() {
    let mut table = GestureTable::new();
    let id = Uuid::new_v4();
    table.begin(id, GestureKind::Drag, start()).unwrap();
    table.update(&id, 99.0, 99.0).unwrap();
    assert_eq!(table.cancel(&id).unwrap(), start());
    assert!(table.staged(&id).is_none());
}

#[test]
fn operations_without_gesture_fail() {
    let mut table = GestureTable::new();
    let id = Uuid::new_v4();
    assert_eq!(table.update(&id, 1.0, 1.0), Err(GestureError::NoGesture(id)));
    assert_eq!(table.finish(&id), Err(GestureError::NoGesture(id)));
    assert_eq!(table.cancel(&id), Err(GestureError::NoGesture(id)));
}
