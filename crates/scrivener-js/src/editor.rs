//! JsRichEditor - the editor widget exposed to JavaScript form frameworks.

use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use scrivener_browser::{EditingBackend, EditorConfig, MountedEditor, ToolbarSynchronizer};

use crate::types::{JsEditorConfig, JsEditorEvent, JsSelectOption, JsToolbarState};

fn call_with(callback: &js_sys::Function, arg: &JsValue) {
    if let Err(e) = callback.call1(&JsValue::NULL, arg) {
        tracing::warn!(target: "scrivener::js", "host callback threw: {:?}", e);
    }
}

fn busy() -> JsError {
    JsError::new("Editor is busy")
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Rich-text editor attached to a container element.
///
/// Implements the usual form-control contract: `writeValue`,
/// `registerOnChange`, `registerOnTouched`, `setDisabledState`.
#[wasm_bindgen]
pub struct JsRichEditor {
    mounted: Option<MountedEditor>,
}

impl JsRichEditor {
    fn editor(&self) -> Result<&MountedEditor, JsError> {
        self.mounted
            .as_ref()
            .ok_or_else(|| JsError::new("Editor is unmounted"))
    }
}

#[wasm_bindgen]
impl JsRichEditor {
    /// Mount an editor on `container`.
    ///
    /// `config` is a plain object; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, id: &str, config: JsValue) -> Result<JsRichEditor, JsError> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value::<JsEditorConfig>(config)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
                .into()
        };

        let mounted = MountedEditor::mount(container, id, config)
            .map_err(|e| JsError::new(&format!("Mount failed: {}", e)))?;
        Ok(Self {
            mounted: Some(mounted),
        })
    }

    // === Form-control contract ===

    /// Write a value from the host. `null`, `""` and `"<br>"` all mean empty.
    #[wasm_bindgen(js_name = writeValue)]
    pub fn write_value(&self, value: Option<String>) -> Result<(), JsError> {
        self.editor()?.write_value(value.as_deref());
        Ok(())
    }

    /// `callback(value: string)` runs on every content change.
    #[wasm_bindgen(js_name = registerOnChange)]
    pub fn register_on_change(&self, callback: js_sys::Function) -> Result<(), JsError> {
        self.editor()?
            .register_on_change(move |value| call_with(&callback, &JsValue::from_str(value)));
        Ok(())
    }

    #[wasm_bindgen(js_name = registerOnTouched)]
    pub fn register_on_touched(&self, callback: js_sys::Function) -> Result<(), JsError> {
        self.editor()?.with(move |editor| {
            editor.register_on_touched(move || {
                if let Err(e) = callback.call0(&JsValue::NULL) {
                    tracing::warn!(target: "scrivener::js", "touched callback threw: {:?}", e);
                }
            })
        });
        Ok(())
    }

    /// `callback(event)` for focus, blur and view-mode changes.
    #[wasm_bindgen(js_name = registerOnEvent)]
    pub fn register_on_event(&self, callback: js_sys::Function) -> Result<(), JsError> {
        self.editor()?
            .register_on_event(move |event| match to_js(&JsEditorEvent::from(event)) {
                Ok(value) => call_with(&callback, &value),
                Err(e) => tracing::warn!(target: "scrivener::js", "event conversion failed: {:?}", e),
            });
        Ok(())
    }

    /// `callback(state)` whenever the toolbar state changes.
    #[wasm_bindgen(js_name = registerOnToolbarChange)]
    pub fn register_on_toolbar_change(&self, callback: js_sys::Function) -> Result<(), JsError> {
        self.editor()?.on_toolbar_change(move |toolbar| {
            match to_js(&JsToolbarState::from(toolbar)) {
                Ok(state) => call_with(&callback, &state),
                Err(e) => tracing::warn!(target: "scrivener::js", "toolbar conversion failed: {:?}", e),
            }
        });
        Ok(())
    }

    #[wasm_bindgen(js_name = setDisabledState)]
    pub fn set_disabled_state(&self, disabled: bool) -> Result<(), JsError> {
        self.editor()?
            .with(move |editor| editor.set_disabled_state(disabled));
        Ok(())
    }

    /// Current value as the host would receive it.
    #[wasm_bindgen(js_name = getValue)]
    pub fn get_value(&self) -> Result<String, JsError> {
        Ok(self.editor()?.value())
    }

    // === Commands ===

    /// Run a toolbar command (`bold`, `h1`, `toggleEditorMode`, `clear`, ...).
    #[wasm_bindgen(js_name = executeCommand)]
    pub fn execute_command(&self, command: &str, value: Option<String>) -> Result<(), JsError> {
        self.editor()?.execute_command(command, value.as_deref());
        Ok(())
    }

    #[wasm_bindgen(js_name = selectCustomClass)]
    pub fn select_custom_class(&self, class_id: &str) -> Result<(), JsError> {
        let class_id = class_id.to_owned();
        self.editor()?
            .with(move |editor| editor.select_custom_class(&class_id));
        Ok(())
    }

    #[wasm_bindgen(js_name = selectFontName)]
    pub fn select_font_name(&self, name: &str) -> Result<(), JsError> {
        let name = name.to_owned();
        self.editor()?.with(move |editor| editor.select_font_name(&name));
        Ok(())
    }

    #[wasm_bindgen(js_name = selectFontSize)]
    pub fn select_font_size(&self, size: &str) -> Result<(), JsError> {
        let size = size.to_owned();
        self.editor()?.with(move |editor| editor.select_font_size(&size));
        Ok(())
    }

    /// Remember the selection for a later `insertAtCursor`.
    #[wasm_bindgen(js_name = saveCursorPosition)]
    pub fn save_cursor_position(&self) -> Result<(), JsError> {
        self.editor()?.with(|editor| editor.save_cursor_position());
        Ok(())
    }

    /// Insert markup at the saved selection; does nothing without one.
    #[wasm_bindgen(js_name = insertAtCursor)]
    pub fn insert_at_cursor(&self, html: &str) -> Result<(), JsError> {
        let html = html.to_owned();
        self.editor()?.with(move |editor| editor.insert_at_cursor(&html));
        Ok(())
    }

    #[wasm_bindgen]
    pub fn focus(&self) -> Result<(), JsError> {
        self.editor()?.with(|editor| editor.focus());
        Ok(())
    }

    // === Toolbar ===

    #[wasm_bindgen(js_name = toolbarState)]
    pub fn toolbar_state(&self) -> Result<JsToolbarState, JsError> {
        Ok(JsToolbarState::from(&self.editor()?.toolbar()))
    }

    #[wasm_bindgen(js_name = isVisual)]
    pub fn is_visual(&self) -> Result<bool, JsError> {
        Ok(self.editor()?.is_visual())
    }

    /// Whether the link button should be disabled for the current selection.
    #[wasm_bindgen(js_name = isLinkButtonDisabled)]
    pub fn is_link_button_disabled(&self) -> Result<bool, JsError> {
        self.editor()?
            .read(|editor| {
                let has_text = editor
                    .backend()
                    .selected_text()
                    .is_some_and(|text| !text.is_empty());
                editor.toolbar().is_link_button_disabled(has_text)
            })
            .ok_or_else(busy)
    }

    #[wasm_bindgen(js_name = fontOptions)]
    pub fn font_options(&self) -> Result<JsValue, JsError> {
        let options: Vec<JsSelectOption> = self
            .editor()?
            .read(|editor| editor.font_options())
            .ok_or_else(busy)?
            .into_iter()
            .map(Into::into)
            .collect();
        to_js(&options)
    }

    #[wasm_bindgen(js_name = customClassOptions)]
    pub fn custom_class_options(&self) -> Result<JsValue, JsError> {
        let options: Vec<JsSelectOption> = self
            .editor()?
            .toolbar()
            .custom_class_options()
            .into_iter()
            .map(Into::into)
            .collect();
        to_js(&options)
    }

    #[wasm_bindgen(js_name = blockOptions)]
    pub fn block_options() -> Result<JsValue, JsError> {
        let options: Vec<JsSelectOption> = ToolbarSynchronizer::block_options()
            .into_iter()
            .map(Into::into)
            .collect();
        to_js(&options)
    }

    // === Lifecycle ===

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Remove every listener and release host callbacks.
    #[wasm_bindgen]
    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.unmount();
        }
    }
}
