//! Contenteditable implementation of [`EditableSurface`].
//!
//! The container element is edited directly in visual mode. Source mode
//! replaces its content with a `<pre><code contenteditable>` pair holding the
//! markup as text; focus events on that inner element don't bubble, so the
//! surface listens to them itself and forwards them through a sink.

use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;

use scrivener_core::{
    AncestorNode, EditableSurface, FocusTarget, NodeInfo, PlatformError, SelectionContext,
    SmolStr, ancestor_chain,
};

use crate::focus::blur_target;

/// CSS class on the wrapper while the region is logically empty.
pub const PLACEHOLDER_CLASS: &str = "show-placeholder";

/// CSS class on the container while disabled.
pub const DISABLED_CLASS: &str = "disabled";

const SOURCE_PRE_STYLE: &str = "margin: 0; outline: none;";
const SOURCE_CODE_STYLE: &str = "display: block; white-space: pre-wrap; word-break: keep-all; \
     outline: none; margin: 0; background-color: #fff5b9;";

/// Focus changes on the source surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Focus,
    Blur(Option<FocusTarget>),
}

pub type SurfaceSink = Rc<dyn Fn(SurfaceEvent)>;

/// DOM node walked by [`ancestor_chain`].
#[derive(Debug, Clone)]
pub struct DomNode(pub web_sys::Node);

impl AncestorNode for DomNode {
    fn parent(&self) -> Option<Self> {
        self.0.parent_node().map(DomNode)
    }

    fn info(&self) -> NodeInfo {
        let node_name = SmolStr::new(self.0.node_name());
        match self.0.dyn_ref::<web_sys::Element>() {
            Some(el) => NodeInfo {
                node_name,
                class_name: Some(SmolStr::new(el.get_attribute("class").unwrap_or_default())),
            },
            None => NodeInfo {
                node_name,
                class_name: None,
            },
        }
    }
}

/// Selection context of the window selection's focus node, relative to `root`.
pub fn dom_selection_context(root: &web_sys::Node) -> Option<SelectionContext> {
    let selection = web_sys::window()?.get_selection().ok()??;
    let node = selection.focus_node().or_else(|| selection.anchor_node())?;
    ancestor_chain(DomNode(node), |n| n.0.is_same_node(Some(root)))
}

struct SourceSurface {
    code: web_sys::HtmlElement,
    _listeners: [EventListener; 2],
}

/// The editor container plus the wrapper carrying presentation classes.
pub struct BrowserSurface {
    root: web_sys::HtmlElement,
    wrapper: web_sys::Element,
    source_id: String,
    source: Option<SourceSurface>,
    sink: SurfaceSink,
}

impl BrowserSurface {
    /// `source_id` becomes the id of the source-mode code element.
    pub fn new(root: web_sys::HtmlElement, source_id: impl Into<String>, sink: SurfaceSink) -> Self {
        let wrapper = root
            .parent_element()
            .unwrap_or_else(|| root.clone().unchecked_into());
        Self {
            root,
            wrapper,
            source_id: source_id.into(),
            source: None,
            sink,
        }
    }

    pub fn root(&self) -> &web_sys::HtmlElement {
        &self.root
    }

    pub fn is_source_mounted(&self) -> bool {
        self.source.is_some()
    }

    fn document(&self) -> Result<web_sys::Document, PlatformError> {
        Ok(self.root.owner_document().ok_or("editor element has no document")?)
    }

    fn build_source(&self, text: &str) -> Result<SourceSurface, PlatformError> {
        let document = self.document()?;
        let pre = document
            .create_element("pre")
            .map_err(|e| format!("create pre failed: {:?}", e))?;
        pre.set_attribute("style", SOURCE_PRE_STYLE)
            .map_err(|e| format!("style pre failed: {:?}", e))?;

        let code = document
            .create_element("code")
            .map_err(|e| format!("create code failed: {:?}", e))?
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| "code element is not an HtmlElement")?;
        code.set_id(&self.source_id);
        code.set_attribute("style", SOURCE_CODE_STYLE)
            .map_err(|e| format!("style code failed: {:?}", e))?;
        code.set_content_editable("true");
        code.append_child(&document.create_text_node(text))
            .map_err(|e| format!("append source text failed: {:?}", e))?;
        pre.append_child(&code)
            .map_err(|e| format!("append code failed: {:?}", e))?;

        self.root.set_inner_html("");
        self.root
            .append_child(&pre)
            .map_err(|e| format!("append source surface failed: {:?}", e))?;

        let on_focus = self.sink.clone();
        let on_blur = self.sink.clone();
        let listeners = [
            EventListener::new(&code, "focus", move |_| on_focus(SurfaceEvent::Focus)),
            EventListener::new(&code, "blur", move |event| {
                on_blur(SurfaceEvent::Blur(blur_target(event)))
            }),
        ];

        Ok(SourceSurface {
            code,
            _listeners: listeners,
        })
    }
}

impl EditableSurface for BrowserSurface {
    fn inner_html(&self) -> String {
        self.root.inner_html()
    }

    fn set_inner_html(&mut self, html: &str) {
        self.root.set_inner_html(html);
    }

    fn inner_text(&self) -> String {
        self.root.inner_text()
    }

    fn set_editable(&mut self, editable: bool) {
        self.root
            .set_content_editable(if editable { "true" } else { "false" });
    }

    fn focus(&mut self) {
        if let Err(e) = self.root.focus() {
            tracing::debug!(target: "scrivener::surface", "focus request failed: {:?}", e);
        }
    }

    fn mount_source(&mut self, text: &str) -> Result<(), PlatformError> {
        let source = self.build_source(text)?;
        self.source = Some(source);
        Ok(())
    }

    fn focus_source(&mut self) {
        if let Some(source) = &self.source {
            if let Err(e) = source.code.focus() {
                tracing::debug!(target: "scrivener::surface", "source focus request failed: {:?}", e);
            }
        }
    }

    fn source_text(&self) -> Result<String, PlatformError> {
        let document = self.document()?;
        let code = document
            .get_element_by_id(&self.source_id)
            .ok_or_else(|| format!("no element #{}", self.source_id))?
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| format!("#{} is not an HTML element", self.source_id))?;
        // Rendered text, so line breaks typed into the surface survive.
        Ok(code.inner_text())
    }

    fn source_text_from_range(&self) -> Option<String> {
        let first = self.root.first_child()?;
        let range = self.document().ok()?.create_range().ok()?;
        range.select_node_contents(&first).ok()?;
        Some(String::from(range.to_string()))
    }

    fn unmount_source(&mut self) {
        if self.source.take().is_some() {
            tracing::trace!(target: "scrivener::surface", "source listeners released");
        }
    }

    fn set_placeholder_visible(&mut self, visible: bool) {
        if let Err(e) = self
            .wrapper
            .class_list()
            .toggle_with_force(PLACEHOLDER_CLASS, visible)
        {
            tracing::warn!(target: "scrivener::surface", "placeholder toggle failed: {:?}", e);
        }
    }

    fn set_disabled(&mut self, disabled: bool) {
        if let Err(e) = self
            .root
            .class_list()
            .toggle_with_force(DISABLED_CLASS, disabled)
        {
            tracing::warn!(target: "scrivener::surface", "disabled toggle failed: {:?}", e);
        }
    }

    fn selection_context(&self) -> Option<SelectionContext> {
        dom_selection_context(self.root.as_ref())
    }
}
