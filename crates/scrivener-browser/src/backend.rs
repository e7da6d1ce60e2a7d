//! `execCommand` implementation of [`EditingBackend`].
//!
//! Formatting goes through the legacy `document.execCommand` family, which is
//! still the only built-in way to get undoable rich-text edits in a
//! contenteditable region. Selection persistence holds a cloned DOM `Range`.

use markdown_weaver_escape::{FmtWriter, escape_html};
use wasm_bindgen::JsCast;

use scrivener_core::{BlockType, CustomClass, EditingBackend, PlatformError};

/// Browser backend scoped to one editor container.
pub struct BrowserBackend {
    root: web_sys::HtmlElement,
    document: web_sys::HtmlDocument,
    saved_range: Option<web_sys::Range>,
}

impl BrowserBackend {
    /// Create a backend for the given contenteditable container.
    pub fn new(root: web_sys::HtmlElement) -> Result<Self, PlatformError> {
        let document = root
            .owner_document()
            .ok_or("editor element has no document")?
            .dyn_into::<web_sys::HtmlDocument>()
            .map_err(|_| "document is not an HTML document")?;
        Ok(Self {
            root,
            document,
            saved_range: None,
        })
    }

    pub fn root(&self) -> &web_sys::HtmlElement {
        &self.root
    }

    /// Whether a selection is currently saved.
    pub fn has_saved_selection(&self) -> bool {
        self.saved_range.is_some()
    }

    fn exec(&self, command: &str, value: &str) -> Result<bool, PlatformError> {
        self.document
            .exec_command_with_show_ui_and_value(command, false, value)
            .map_err(|e| format!("execCommand({command}) failed: {:?}", e).into())
    }

    /// Live range of the window selection, falling back to the saved one.
    fn active_range(&self) -> Option<web_sys::Range> {
        live_selection()
            .filter(|sel| sel.range_count() > 0)
            .and_then(|sel| sel.get_range_at(0).ok())
            .or_else(|| self.saved_range.clone())
    }

    /// Elements matching `tag_selectors` that the range touches, including
    /// partially selected containers up to the editor root.
    fn selected_elements(
        &self,
        range: &web_sys::Range,
        tag_selectors: &str,
    ) -> Result<Vec<web_sys::Element>, PlatformError> {
        let common = range
            .common_ancestor_container()
            .map_err(|e| format!("commonAncestorContainer failed: {:?}", e))?;
        if !self.root.contains(Some(&common)) {
            return Ok(Vec::new());
        }
        let scope = match common.dyn_ref::<web_sys::Element>() {
            Some(el) => el.clone(),
            None => match common.parent_element() {
                Some(el) => el,
                None => return Ok(Vec::new()),
            },
        };

        let mut elements = Vec::new();
        let list = scope
            .query_selector_all(tag_selectors)
            .map_err(|e| format!("querySelectorAll({tag_selectors}) failed: {:?}", e))?;
        for i in 0..list.length() {
            let Some(node) = list.item(i) else {
                continue;
            };
            if !range.intersects_node(&node).unwrap_or(false) {
                continue;
            }
            if let Ok(el) = node.dyn_into::<web_sys::Element>() {
                elements.push(el);
            }
        }

        let mut ancestor = Some(scope);
        while let Some(el) = ancestor {
            if el.is_same_node(Some(self.root.as_ref())) {
                break;
            }
            if el.matches(tag_selectors).unwrap_or(false) {
                elements.push(el.clone());
            }
            ancestor = el.parent_element();
        }
        Ok(elements)
    }
}

fn live_selection() -> Option<web_sys::Selection> {
    web_sys::window()?.get_selection().ok()?
}

/// Replace an element with its own children.
fn unwrap_element(el: &web_sys::Element) -> Result<(), PlatformError> {
    let Some(parent) = el.parent_node() else {
        return Ok(());
    };
    while let Some(child) = el.first_child() {
        parent
            .insert_before(&child, Some(el.as_ref()))
            .map_err(|e| format!("insertBefore failed: {:?}", e))?;
    }
    parent
        .remove_child(el)
        .map_err(|e| format!("removeChild failed: {:?}", e))?;
    Ok(())
}

fn escaped(text: &str) -> Result<String, PlatformError> {
    let mut out = String::with_capacity(text.len());
    escape_html(FmtWriter(&mut out), text).map_err(|e| format!("escaping failed: {:?}", e))?;
    Ok(out)
}

impl EditingBackend for BrowserBackend {
    fn save_selection(&mut self) {
        self.saved_range = live_selection()
            .filter(|sel| sel.range_count() > 0)
            .and_then(|sel| sel.get_range_at(0).ok())
            .map(|range| range.clone_range());
        tracing::trace!(target: "scrivener::backend", saved = self.saved_range.is_some(), "save selection");
    }

    fn restore_selection(&mut self) -> bool {
        let Some(range) = &self.saved_range else {
            return false;
        };
        let Some(sel) = live_selection() else {
            return false;
        };
        if let Err(e) = sel.remove_all_ranges() {
            tracing::warn!(target: "scrivener::backend", "removeAllRanges failed: {:?}", e);
            return false;
        }
        match sel.add_range(range) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(target: "scrivener::backend", "addRange failed: {:?}", e);
                false
            }
        }
    }

    /// Block tags go through `formatBlock`; everything else is passed as is.
    fn execute_command(&mut self, name: &str, value: Option<&str>) -> Result<(), PlatformError> {
        let is_block = BlockType::ENUMERATED
            .iter()
            .any(|block| *block != BlockType::Div && block.as_str() == name);
        if is_block {
            self.exec("formatBlock", name)?;
        } else {
            self.exec(name, value.unwrap_or(""))?;
        }
        Ok(())
    }

    fn query_command_state(&self, name: &str) -> Result<bool, PlatformError> {
        self.document
            .query_command_state(name)
            .map_err(|e| format!("queryCommandState({name}) failed: {:?}", e).into())
    }

    fn query_command_value(&self, name: &str) -> Result<String, PlatformError> {
        self.document
            .query_command_value(name)
            .map_err(|e| format!("queryCommandValue({name}) failed: {:?}", e).into())
    }

    fn remove_selected_elements(&mut self, tag_selectors: &str) -> Result<(), PlatformError> {
        let Some(range) = self.active_range() else {
            return Ok(());
        };
        let elements = self.selected_elements(&range, tag_selectors)?;
        tracing::debug!(target: "scrivener::backend", tag_selectors, count = elements.len(), "unwrapping selected elements");
        for el in &elements {
            unwrap_element(el)?;
        }
        Ok(())
    }

    fn set_default_paragraph_separator(&mut self, tag: &str) -> Result<(), PlatformError> {
        self.exec("defaultParagraphSeparator", tag).map(|_| ())
    }

    fn set_font_name(&mut self, name: &str) -> Result<(), PlatformError> {
        self.exec("fontName", name).map(|_| ())
    }

    fn set_font_size(&mut self, size: &str) -> Result<(), PlatformError> {
        self.exec("fontSize", size).map(|_| ())
    }

    fn create_custom_class(&mut self, class: &CustomClass) -> Result<(), PlatformError> {
        let text = self.selected_text().unwrap_or_default();
        let tag = class.tag_name();
        let html = format!(
            r#"<{tag} class="{}">{}</{tag}>"#,
            escaped(&class.class)?,
            escaped(&text)?
        );
        self.insert_html(&html)
    }

    fn insert_html(&mut self, html: &str) -> Result<(), PlatformError> {
        if self.exec("insertHTML", html)? {
            Ok(())
        } else {
            Err("unable to insert markup at the selection".into())
        }
    }

    fn selected_text(&self) -> Option<String> {
        let text = match &self.saved_range {
            Some(range) => String::from(range.to_string()),
            None => String::from(live_selection()?.to_string()),
        };
        (!text.is_empty()).then_some(text)
    }
}
