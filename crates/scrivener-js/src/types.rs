//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use scrivener_core::{
    CustomClass, EditorConfig, EditorEvent, FontOption, FormatCommand, SelectOption,
    ToolbarPosition, ToolbarSynchronizer,
};

/// Host configuration. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsEditorConfig {
    #[tsify(optional, type = "\"top\" | \"bottom\"")]
    pub toolbar_position: Option<String>,
    #[tsify(optional)]
    pub show_toolbar: Option<bool>,
    #[tsify(optional)]
    pub fonts: Option<Vec<JsFont>>,
    #[tsify(optional)]
    pub custom_classes: Option<Vec<JsCustomClass>>,
    #[tsify(optional)]
    pub sanitize: Option<bool>,
    #[tsify(optional)]
    pub raw_paste: Option<bool>,
    #[tsify(optional)]
    pub default_paragraph_separator: Option<String>,
    #[tsify(optional)]
    pub default_font_name: Option<String>,
    #[tsify(optional)]
    pub default_font_size: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsFont {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsCustomClass {
    pub name: String,
    pub class: String,
    #[tsify(optional)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl From<JsEditorConfig> for EditorConfig {
    fn from(js: JsEditorConfig) -> Self {
        let defaults = EditorConfig::default();
        let toolbar_position = match js.toolbar_position.as_deref() {
            Some("bottom") => ToolbarPosition::Bottom,
            Some("top") | None => ToolbarPosition::Top,
            Some(other) => {
                tracing::warn!(target: "scrivener::js", position = other, "unknown toolbar position, using top");
                ToolbarPosition::Top
            }
        };
        EditorConfig {
            toolbar_position,
            show_toolbar: js.show_toolbar.unwrap_or(defaults.show_toolbar),
            fonts: js
                .fonts
                .map(|fonts| fonts.into_iter().map(|f| FontOption::new(f.name)).collect()),
            custom_classes: js
                .custom_classes
                .unwrap_or_default()
                .into_iter()
                .map(|c| CustomClass {
                    name: c.name,
                    class: c.class,
                    tag: c.tag,
                })
                .collect(),
            sanitize: js.sanitize.unwrap_or(defaults.sanitize),
            raw_paste: js.raw_paste.unwrap_or(defaults.raw_paste),
            default_paragraph_separator: js.default_paragraph_separator,
            default_font_name: js.default_font_name,
            default_font_size: js.default_font_size,
        }
    }
}

/// Label/value pair for a picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsSelectOption {
    pub label: String,
    pub value: String,
}

impl From<SelectOption> for JsSelectOption {
    fn from(option: SelectOption) -> Self {
        Self {
            label: option.label.to_string(),
            value: option.value.to_string(),
        }
    }
}

/// Toolbar display state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsToolbarState {
    /// Active toggle commands (`bold`, `insertOrderedList`, ...).
    pub active_commands: Vec<String>,
    /// Block picker value, `"default"` when unclassified.
    pub current_block: String,
    /// Custom class picker value, `"-1"` when none.
    pub custom_class_id: String,
    pub font_name: String,
    pub font_size: String,
    pub link_selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fore_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_color: Option<String>,
    pub source_mode: bool,
    pub visible: bool,
}

impl From<&ToolbarSynchronizer> for JsToolbarState {
    fn from(toolbar: &ToolbarSynchronizer) -> Self {
        let state = toolbar.state();
        Self {
            active_commands: FormatCommand::ALL
                .iter()
                .filter(|c| state.is_active(**c))
                .map(|c| c.as_str().to_string())
                .collect(),
            current_block: state.current_block().as_str().to_string(),
            custom_class_id: state.custom_class_id().to_string(),
            font_name: toolbar.font_name().to_string(),
            font_size: toolbar.font_size().to_string(),
            link_selected: state.formatting.link_selected,
            fore_color: state.formatting.fore_color.clone(),
            back_color: state.formatting.back_color.clone(),
            source_mode: toolbar.is_source_mode(),
            visible: toolbar.is_visible(),
        }
    }
}

/// Focus, blur and view-mode signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JsEditorEvent {
    Focus,
    Blur,
    ViewMode { visual: bool },
}

impl From<EditorEvent> for JsEditorEvent {
    fn from(event: EditorEvent) -> Self {
        match event {
            EditorEvent::Focused => JsEditorEvent::Focus,
            EditorEvent::Blurred => JsEditorEvent::Blur,
            EditorEvent::ViewModeChanged { visual } => JsEditorEvent::ViewMode { visual },
        }
    }
}
