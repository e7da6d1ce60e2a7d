//! Platform abstraction traits for editor operations.
//!
//! These traits define the interface between the editor logic and the
//! environment's rich-text primitives (browser `execCommand`/Selection API,
//! or an in-memory double in tests). The controller never touches the
//! environment directly.

use crate::config::CustomClass;
use crate::selection::SelectionContext;

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Selection persistence and formatting-command execution.
///
/// The browser implementation drives `document.execCommand` and the DOM
/// Selection API. Queries return `Err` when the host does not support the
/// command; callers treat that as inactive/empty.
pub trait EditingBackend {
    /// Remember the current selection so it survives focus moving elsewhere.
    fn save_selection(&mut self);

    /// Re-apply the remembered selection.
    ///
    /// Returns false if nothing was saved or the range can no longer be applied.
    fn restore_selection(&mut self) -> bool;

    /// Run a formatting command against the current selection.
    fn execute_command(&mut self, name: &str, value: Option<&str>) -> Result<(), PlatformError>;

    /// Whether a toggle command (bold, lists, ...) is active at the selection.
    fn query_command_state(&self, name: &str) -> Result<bool, PlatformError>;

    /// Current value of a value command (font name, colors, ...).
    fn query_command_value(&self, name: &str) -> Result<String, PlatformError>;

    /// Unwrap elements matching a comma-separated tag list inside the
    /// selection, keeping their text.
    fn remove_selected_elements(&mut self, tag_selectors: &str) -> Result<(), PlatformError>;

    fn set_default_paragraph_separator(&mut self, tag: &str) -> Result<(), PlatformError>;

    fn set_font_name(&mut self, name: &str) -> Result<(), PlatformError>;

    fn set_font_size(&mut self, size: &str) -> Result<(), PlatformError>;

    /// Wrap the selection in the class's tag (`span` when unset) carrying its class.
    fn create_custom_class(&mut self, class: &CustomClass) -> Result<(), PlatformError>;

    /// Insert markup at the current selection.
    fn insert_html(&mut self, html: &str) -> Result<(), PlatformError>;

    /// Text covered by the current selection, if any.
    fn selected_text(&self) -> Option<String> {
        None
    }
}

/// The editable region the controller owns.
///
/// Covers the container element, the source-mode surface injected into it,
/// and the presentation flags the widget toggles on its wrapper.
pub trait EditableSurface {
    /// Markup of the container.
    fn inner_html(&self) -> String;

    fn set_inner_html(&mut self, html: &str);

    /// Rendered text of the container. In source mode this is the source text.
    fn inner_text(&self) -> String;

    /// Toggle direct editing of the container.
    fn set_editable(&mut self, editable: bool);

    /// Request focus on the container. Focus events arrive later, if at all.
    fn focus(&mut self);

    /// Replace the container content with a plain-text editable surface
    /// seeded with `text` and start listening to its focus/blur events.
    fn mount_source(&mut self, text: &str) -> Result<(), PlatformError>;

    /// Request focus on the source surface.
    fn focus_source(&mut self);

    /// Read the source text back through structural queries.
    fn source_text(&self) -> Result<String, PlatformError>;

    /// Read the source text back through a range over the container's
    /// first child. Used when structural queries are unavailable.
    fn source_text_from_range(&self) -> Option<String>;

    /// Stop listening to the source surface.
    fn unmount_source(&mut self);

    fn set_placeholder_visible(&mut self, visible: bool);

    fn set_disabled(&mut self, disabled: bool);

    /// Ancestor chain of the current selection's focus node, or None when
    /// there is no selection inside the editor.
    fn selection_context(&self) -> Option<SelectionContext>;
}
