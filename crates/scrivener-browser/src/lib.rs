//! Browser DOM layer for the scrivener rich-text editor.
//!
//! Implements the `scrivener-core` platform traits on top of `web-sys`. It
//! assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `backend`: `execCommand` formatting and DOM `Range` selection persistence
//! - `surface`: the contenteditable container, source surface and ancestor walk
//! - `focus`: where focus went when the editor blurred
//! - `mount`: DOM listeners feeding a controller
//!
//! # Re-exports
//!
//! This crate re-exports `scrivener-core` for convenience, so consumers
//! only need to depend on `scrivener-browser`.

pub use scrivener_core;
pub use scrivener_core::*;

pub mod backend;
pub mod focus;
pub mod mount;
pub mod surface;

pub use backend::BrowserBackend;
pub use focus::{CONTROLS_SELECTOR, SELECTION_KEEPING_SELECTOR, blur_target, classify_focus_target};
pub use mount::{BrowserEditor, MountedEditor};
pub use surface::{
    BrowserSurface, DISABLED_CLASS, DomNode, PLACEHOLDER_CLASS, SurfaceEvent, SurfaceSink,
    dom_selection_context,
};
