//! Mood-board layout engine for the yearly notebook.
//!
//! This crate runs next to the mood-board UI. It owns item geometry while the
//! user drags, resizes and restacks images, keeps the distinction between what
//! the server last confirmed and what is still in flight, and tells the host
//! which writes to send through [`engine::Action`]s. It performs no I/O of its
//! own; the host is responsible for wiring pointer events in and persisting
//! actions out.
//!
//! The server crate depends on [`geometry`] and [`zorder`] so that both sides
//! agree on the wire shape of a position and on how new items are stacked.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::EngineCore`] and the actions it emits |
//! | [`doc`] | Confirmed vs pending geometry store and board items |
//! | [`gesture`] | Per-item drag/resize gesture state machine |
//! | [`layout`] | Pure drag, resize, rescale and placement math |
//! | [`zorder`] | Bring-forward / send-backward and render ordering |
//! | [`geometry`] | `Geometry` and `CanvasSize` wire types |
//! | [`consts`] | Shared numeric constants (minimum sizes, defaults, etc.) |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod gesture;
pub mod layout;
pub mod zorder;
