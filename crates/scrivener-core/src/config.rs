//! Host configuration for the editor widget.
//!
//! Hosts hand over a plain object (JSON in JavaScript); every field is
//! optional and falls back to the defaults below.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Where the toolbar is rendered relative to the editable region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolbarPosition {
    #[default]
    Top,
    Bottom,
}

/// A font offered in the font picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontOption {
    pub name: String,
}

impl FontOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A host-defined class the user can apply to a selection.
///
/// Position in [`EditorConfig::custom_classes`] is the identifier the toolbar
/// reports, not the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomClass {
    /// Label shown in the picker.
    pub name: String,
    /// CSS class written onto the wrapping element.
    pub class: String,
    /// Wrapping element tag, `span` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl CustomClass {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Tag used when wrapping a selection in this class.
    pub fn tag_name(&self) -> &str {
        self.tag.as_deref().unwrap_or("span")
    }
}

/// Label/value pair for picker controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: SmolStr,
    pub value: SmolStr,
}

impl SelectOption {
    pub fn new(label: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub toolbar_position: ToolbarPosition,
    pub show_toolbar: bool,
    pub fonts: Option<Vec<FontOption>>,
    pub custom_classes: Vec<CustomClass>,
    /// Sanitize outgoing values. Defaults to true.
    pub sanitize: bool,
    /// Paste clipboard text verbatim instead of the platform's rich paste.
    pub raw_paste: bool,
    pub default_paragraph_separator: Option<String>,
    pub default_font_name: Option<String>,
    pub default_font_size: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            toolbar_position: ToolbarPosition::Top,
            show_toolbar: true,
            fonts: None,
            custom_classes: Vec::new(),
            sanitize: true,
            raw_paste: false,
            default_paragraph_separator: None,
            default_font_name: None,
            default_font_size: None,
        }
    }
}

/// Fonts offered when the host configures none.
pub const DEFAULT_FONTS: &[&str] = &["Arial", "Times New Roman", "Calibri", "Comic Sans MS"];

impl EditorConfig {
    /// Font picker entries: configured fonts, or [`DEFAULT_FONTS`].
    pub fn font_options(&self) -> Vec<SelectOption> {
        match &self.fonts {
            Some(fonts) => fonts
                .iter()
                .map(|f| SelectOption::new(f.name.as_str(), f.name.as_str()))
                .collect(),
            None => DEFAULT_FONTS
                .iter()
                .map(|name| SelectOption::new(*name, *name))
                .collect(),
        }
    }

    /// Selector list of tags stripped by the `clear` command: `span` plus
    /// every distinct tag configured on a custom class.
    pub fn custom_tags(&self) -> String {
        let mut tags = vec!["span"];
        for class in &self.custom_classes {
            if let Some(tag) = class.tag.as_deref() {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
        tags.join(",")
    }
}
