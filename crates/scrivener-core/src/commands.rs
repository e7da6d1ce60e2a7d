//! Command names exchanged between the toolbar, the controller and the backend.
//!
//! The toolbar speaks in command strings; the controller parses them into
//! [`EditorCommand`] and handles a few itself before forwarding the rest.

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;

/// A command as dispatched by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    /// Empty command: refocus the editor only.
    Refocus,
    /// Focus the editor, nothing else.
    Focus,
    /// Switch between visual and source mode.
    ToggleEditorMode,
    /// Strip custom-class tags from the selection.
    Clear,
    /// Strip block tags from the selection.
    Default,
    /// Anything else, forwarded to the backend untouched.
    Backend(SmolStr),
}

impl EditorCommand {
    pub fn as_str(&self) -> &str {
        match self {
            EditorCommand::Refocus => "",
            EditorCommand::Focus => "focus",
            EditorCommand::ToggleEditorMode => "toggleEditorMode",
            EditorCommand::Clear => "clear",
            EditorCommand::Default => "default",
            EditorCommand::Backend(name) => name.as_str(),
        }
    }
}

impl FromStr for EditorCommand {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" => EditorCommand::Refocus,
            "focus" => EditorCommand::Focus,
            "toggleEditorMode" => EditorCommand::ToggleEditorMode,
            "clear" => EditorCommand::Clear,
            "default" => EditorCommand::Default,
            other => EditorCommand::Backend(SmolStr::new(other)),
        })
    }
}

impl From<&str> for EditorCommand {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(cmd) => cmd,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for EditorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Toggle commands whose active state is mirrored on toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    UnorderedList,
    OrderedList,
}

impl FormatCommand {
    /// Every toolbar button, in display order.
    pub const ALL: [FormatCommand; 5] = [
        FormatCommand::Bold,
        FormatCommand::Italic,
        FormatCommand::Underline,
        FormatCommand::UnorderedList,
        FormatCommand::OrderedList,
    ];

    /// Backend command name.
    pub fn as_str(self) -> &'static str {
        match self {
            FormatCommand::Bold => "bold",
            FormatCommand::Italic => "italic",
            FormatCommand::Underline => "underline",
            FormatCommand::UnorderedList => "insertUnorderedList",
            FormatCommand::OrderedList => "insertOrderedList",
        }
    }
}

/// Block type shown in the heading picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockType {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Paragraph,
    Pre,
    Div,
    /// No enumerated block around the selection.
    #[default]
    Default,
}

impl BlockType {
    /// Enumerated block tags in classification priority.
    pub const ENUMERATED: [BlockType; 9] = [
        BlockType::H1,
        BlockType::H2,
        BlockType::H3,
        BlockType::H4,
        BlockType::H5,
        BlockType::H6,
        BlockType::Paragraph,
        BlockType::Pre,
        BlockType::Div,
    ];

    /// Upper-case node name matched against ancestors.
    pub fn node_name(self) -> Option<&'static str> {
        Some(match self {
            BlockType::H1 => "H1",
            BlockType::H2 => "H2",
            BlockType::H3 => "H3",
            BlockType::H4 => "H4",
            BlockType::H5 => "H5",
            BlockType::H6 => "H6",
            BlockType::Paragraph => "P",
            BlockType::Pre => "PRE",
            BlockType::Div => "DIV",
            BlockType::Default => return None,
        })
    }

    /// Lower-case picker value (`"h1"`, `"p"`, `"default"`).
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::H1 => "h1",
            BlockType::H2 => "h2",
            BlockType::H3 => "h3",
            BlockType::H4 => "h4",
            BlockType::H5 => "h5",
            BlockType::H6 => "h6",
            BlockType::Paragraph => "p",
            BlockType::Pre => "pre",
            BlockType::Div => "div",
            BlockType::Default => "default",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags stripped by the `default` command.
pub const DEFAULT_BLOCK_TAGS: &str = "h1,h2,h3,h4,h5,h6,p,pre";
