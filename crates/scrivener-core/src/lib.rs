//! scrivener-core: rich-text editor widget logic without platform dependencies.
//!
//! This crate provides:
//! - `EditingBackend` / `EditableSurface` traits over the environment's
//!   rich-text primitives
//! - `EditorController` - host value contract, mode transitions, focus and
//!   command dispatch
//! - `ToolbarSynchronizer` - toolbar state derived from the selection
//! - `ancestor_chain` - the selection context the toolbar classifies
//!
//! Browser bindings live in `scrivener-browser`.

pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod platform;
pub mod sanitize;
pub mod selection;
pub mod toolbar;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use commands::{BlockType, DEFAULT_BLOCK_TAGS, EditorCommand, FormatCommand};
pub use config::{CustomClass, EditorConfig, FontOption, SelectOption, ToolbarPosition};
pub use controller::{EditorController, EditorEvent, EditorMode, FocusTarget, PasteOutcome};
pub use error::EditorError;
pub use platform::{EditableSurface, EditingBackend, PlatformError};
pub use sanitize::{BasicSanitizer, HtmlSanitizer};
pub use selection::{AncestorNode, NodeInfo, SelectionContext, ancestor_chain};
pub use smol_str::SmolStr;
pub use toolbar::{SelectionFormatting, ToolbarState, ToolbarSynchronizer};
