//! In-memory platform doubles.
//!
//! [`FakePlatform`] hands out a [`FakeBackend`] and a [`FakeSurface`] that
//! share one [`FakeDom`], so commands issued through the backend are visible
//! in the surface's content the way they would be in a browser. Markup is
//! kept as a plain string; only the operations the controller relies on are
//! modelled.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use markdown_weaver_escape::{FmtWriter, escape_html_body_text};

use crate::config::CustomClass;
use crate::platform::{EditableSurface, EditingBackend, PlatformError};
use crate::selection::{NodeInfo, SelectionContext};

/// A backend call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    SaveSelection,
    RestoreSelection,
    Execute { name: String, value: Option<String> },
    RemoveSelected(String),
    SetParagraphSeparator(String),
    SetFontName(String),
    SetFontSize(String),
    CreateCustomClass(String),
    InsertHtml(String),
}

#[derive(Debug)]
pub struct FakeDom {
    pub html: String,
    pub source: Option<String>,
    pub editable: bool,
    pub placeholder_visible: bool,
    pub disabled: bool,
    pub focus_requests: usize,
    pub source_focus_requests: usize,
    pub source_listeners: bool,
    pub structural_queries: bool,
    pub selection: Option<SelectionContext>,
    pub saved_selection: bool,
    pub command_states: HashMap<String, bool>,
    pub command_values: HashMap<String, String>,
    pub failing_queries: HashSet<String>,
    pub applied_classes: Vec<CustomClass>,
    pub calls: Vec<BackendCall>,
}

impl Default for FakeDom {
    fn default() -> Self {
        Self {
            html: String::new(),
            source: None,
            editable: true,
            placeholder_visible: false,
            disabled: false,
            focus_requests: 0,
            source_focus_requests: 0,
            source_listeners: false,
            structural_queries: true,
            selection: None,
            saved_selection: false,
            command_states: HashMap::new(),
            command_values: HashMap::new(),
            failing_queries: HashSet::new(),
            applied_classes: Vec::new(),
            calls: Vec::new(),
        }
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_body_text(FmtWriter(&mut out), text).expect("writing to a String");
    out
}

fn strip_tags(html: &str) -> String {
    let tag = regex_lite::Regex::new(r"<[^>]*>").expect("static pattern");
    tag.replace_all(html, "").into_owned()
}

/// Remove the opening and closing tags of every listed element, keeping
/// their content.
fn unwrap_tags(html: &str, tag_selectors: &str) -> String {
    let names: Vec<_> = tag_selectors
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(regex_lite::escape)
        .collect();
    if names.is_empty() {
        return html.to_string();
    }
    let pattern = format!(r"(?i)</?(?:{})\b[^>]*>", names.join("|"));
    let re = regex_lite::Regex::new(&pattern).expect("escaped tag names");
    re.replace_all(html, "").into_owned()
}

/// Shared handle to the fake environment.
#[derive(Debug, Clone, Default)]
pub struct FakePlatform {
    dom: Rc<RefCell<FakeDom>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> FakeBackend {
        FakeBackend {
            dom: self.dom.clone(),
        }
    }

    pub fn surface(&self) -> FakeSurface {
        FakeSurface {
            dom: self.dom.clone(),
        }
    }

    pub fn dom(&self) -> std::cell::Ref<'_, FakeDom> {
        self.dom.borrow()
    }

    /// Simulate the user editing the container directly.
    pub fn type_html(&self, html: &str) {
        self.dom.borrow_mut().html = html.to_string();
    }

    /// Simulate the user editing the source surface.
    pub fn type_source(&self, text: &str) {
        self.dom.borrow_mut().source = Some(text.to_string());
    }

    /// Place the live selection inside the given ancestors (outer to inner).
    pub fn select(&self, ancestors: Vec<NodeInfo>) {
        self.dom.borrow_mut().selection = Some(SelectionContext::new(ancestors));
    }

    pub fn clear_selection(&self) {
        self.dom.borrow_mut().selection = None;
    }

    pub fn set_command_state(&self, name: &str, active: bool) {
        self.dom
            .borrow_mut()
            .command_states
            .insert(name.to_string(), active);
    }

    pub fn set_command_value(&self, name: &str, value: &str) {
        self.dom
            .borrow_mut()
            .command_values
            .insert(name.to_string(), value.to_string());
    }

    /// Make queries for `name` report an unsupported command.
    pub fn fail_query(&self, name: &str) {
        self.dom.borrow_mut().failing_queries.insert(name.to_string());
    }

    /// Make structural reads of the source surface fail.
    pub fn disable_structural_queries(&self) {
        self.dom.borrow_mut().structural_queries = false;
    }

    pub fn html(&self) -> String {
        self.dom.borrow().html.clone()
    }

    pub fn source(&self) -> Option<String> {
        self.dom.borrow().source.clone()
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.dom.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.dom.borrow_mut().calls.clear();
    }

    pub fn applied_classes(&self) -> Vec<CustomClass> {
        self.dom.borrow().applied_classes.clone()
    }

    pub fn placeholder_visible(&self) -> bool {
        self.dom.borrow().placeholder_visible
    }
}

/// [`EditingBackend`] over a [`FakeDom`].
#[derive(Debug, Clone)]
pub struct FakeBackend {
    dom: Rc<RefCell<FakeDom>>,
}

impl FakeBackend {
    fn record(&self, call: BackendCall) {
        self.dom.borrow_mut().calls.push(call);
    }
}

impl EditingBackend for FakeBackend {
    fn save_selection(&mut self) {
        let mut dom = self.dom.borrow_mut();
        dom.saved_selection = dom.selection.is_some();
        dom.calls.push(BackendCall::SaveSelection);
    }

    fn restore_selection(&mut self) -> bool {
        self.record(BackendCall::RestoreSelection);
        self.dom.borrow().saved_selection
    }

    /// Flips the command's reported state, as toggling bold would.
    fn execute_command(&mut self, name: &str, value: Option<&str>) -> Result<(), PlatformError> {
        let mut dom = self.dom.borrow_mut();
        let state = dom.command_states.entry(name.to_string()).or_insert(false);
        *state = !*state;
        dom.calls.push(BackendCall::Execute {
            name: name.to_string(),
            value: value.map(str::to_string),
        });
        Ok(())
    }

    fn query_command_state(&self, name: &str) -> Result<bool, PlatformError> {
        let dom = self.dom.borrow();
        if dom.failing_queries.contains(name) {
            return Err(PlatformError(format!("unsupported command {name}")));
        }
        Ok(dom.command_states.get(name).copied().unwrap_or(false))
    }

    fn query_command_value(&self, name: &str) -> Result<String, PlatformError> {
        let dom = self.dom.borrow();
        if dom.failing_queries.contains(name) {
            return Err(PlatformError(format!("unsupported command {name}")));
        }
        Ok(dom.command_values.get(name).cloned().unwrap_or_default())
    }

    fn remove_selected_elements(&mut self, tag_selectors: &str) -> Result<(), PlatformError> {
        let mut dom = self.dom.borrow_mut();
        dom.html = unwrap_tags(&dom.html, tag_selectors);
        dom.calls
            .push(BackendCall::RemoveSelected(tag_selectors.to_string()));
        Ok(())
    }

    fn set_default_paragraph_separator(&mut self, tag: &str) -> Result<(), PlatformError> {
        self.record(BackendCall::SetParagraphSeparator(tag.to_string()));
        Ok(())
    }

    fn set_font_name(&mut self, name: &str) -> Result<(), PlatformError> {
        self.record(BackendCall::SetFontName(name.to_string()));
        Ok(())
    }

    fn set_font_size(&mut self, size: &str) -> Result<(), PlatformError> {
        self.record(BackendCall::SetFontSize(size.to_string()));
        Ok(())
    }

    fn create_custom_class(&mut self, class: &CustomClass) -> Result<(), PlatformError> {
        let mut dom = self.dom.borrow_mut();
        dom.applied_classes.push(class.clone());
        dom.calls
            .push(BackendCall::CreateCustomClass(class.class.clone()));
        Ok(())
    }

    /// Appends at the end of the container, standing in for the caret.
    fn insert_html(&mut self, html: &str) -> Result<(), PlatformError> {
        let mut dom = self.dom.borrow_mut();
        dom.html.push_str(html);
        dom.calls.push(BackendCall::InsertHtml(html.to_string()));
        Ok(())
    }

    fn selected_text(&self) -> Option<String> {
        self.dom.borrow().selection.as_ref().map(|_| strip_tags(&self.dom.borrow().html))
    }
}

/// [`EditableSurface`] over a [`FakeDom`].
#[derive(Debug, Clone)]
pub struct FakeSurface {
    dom: Rc<RefCell<FakeDom>>,
}

impl EditableSurface for FakeSurface {
    fn inner_html(&self) -> String {
        let dom = self.dom.borrow();
        match &dom.source {
            Some(source) => format!("<pre><code>{}</code></pre>", escape_text(source)),
            None => dom.html.clone(),
        }
    }

    fn set_inner_html(&mut self, html: &str) {
        let mut dom = self.dom.borrow_mut();
        dom.source = None;
        dom.html = html.to_string();
    }

    fn inner_text(&self) -> String {
        let dom = self.dom.borrow();
        match &dom.source {
            Some(source) => source.clone(),
            None => strip_tags(&dom.html),
        }
    }

    fn set_editable(&mut self, editable: bool) {
        self.dom.borrow_mut().editable = editable;
    }

    fn focus(&mut self) {
        self.dom.borrow_mut().focus_requests += 1;
    }

    fn mount_source(&mut self, text: &str) -> Result<(), PlatformError> {
        let mut dom = self.dom.borrow_mut();
        dom.html.clear();
        dom.source = Some(text.to_string());
        dom.source_listeners = true;
        Ok(())
    }

    fn focus_source(&mut self) {
        self.dom.borrow_mut().source_focus_requests += 1;
    }

    fn source_text(&self) -> Result<String, PlatformError> {
        let dom = self.dom.borrow();
        if !dom.structural_queries {
            return Err(PlatformError::from("structural queries unavailable"));
        }
        dom.source
            .clone()
            .ok_or_else(|| PlatformError::from("no source surface mounted"))
    }

    fn source_text_from_range(&self) -> Option<String> {
        self.dom.borrow().source.clone()
    }

    fn unmount_source(&mut self) {
        self.dom.borrow_mut().source_listeners = false;
    }

    fn set_placeholder_visible(&mut self, visible: bool) {
        self.dom.borrow_mut().placeholder_visible = visible;
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.dom.borrow_mut().disabled = disabled;
    }

    fn selection_context(&self) -> Option<SelectionContext> {
        self.dom.borrow().selection.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_tags_keeps_text() {
        assert_eq!(
            unwrap_tags(r#"<p><span class="x">a</span><b>b</b></p>"#, "span,p"),
            "a<b>b</b>"
        );
        assert_eq!(unwrap_tags("<h1>t</h1>", "h1,h2"), "t");
        assert_eq!(unwrap_tags("<pre>t</pre>", "p"), "<pre>t</pre>");
    }

    #[test]
    fn test_backend_edits_are_visible_to_surface() {
        let platform = FakePlatform::new();
        let mut backend = platform.backend();
        let surface = platform.surface();

        platform.type_html("<p>a</p>");
        backend.insert_html("<b>b</b>").unwrap();
        assert_eq!(surface.inner_html(), "<p>a</p><b>b</b>");
        assert_eq!(surface.inner_text(), "ab");
    }
}
