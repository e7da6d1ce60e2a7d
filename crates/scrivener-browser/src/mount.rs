//! Wiring DOM events to an [`EditorController`].
//!
//! DOM events can fire synchronously while the controller is busy (the
//! `focus` event raised by its own focus request, for one), and host
//! callbacks run while it is busy and may call straight back into the
//! editor. Mutations are therefore queued and drained by whoever holds the
//! controller when the outstanding call returns, and reads made while it is
//! busy are answered from the last [`Snapshot`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;

use scrivener_core::{
    EditorConfig, EditorController, EditorEvent, FocusTarget, PasteOutcome, ToolbarState,
    ToolbarSynchronizer,
};

use crate::backend::BrowserBackend;
use crate::focus::blur_target;
use crate::surface::{BrowserSurface, SurfaceEvent, SurfaceSink};

pub type BrowserEditor = EditorController<BrowserBackend, BrowserSurface>;

type ToolbarCallback = Box<dyn FnMut(&ToolbarSynchronizer)>;
type HostCall = Box<dyn FnOnce(&mut BrowserEditor)>;

/// A DOM event waiting for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DomEvent {
    Focus,
    Blur(Option<FocusTarget>),
    Input,
    SelectionMoved,
}

impl From<SurfaceEvent> for DomEvent {
    fn from(event: SurfaceEvent) -> Self {
        match event {
            SurfaceEvent::Focus => DomEvent::Focus,
            SurfaceEvent::Blur(target) => DomEvent::Blur(target),
        }
    }
}

enum Pending {
    Dom(DomEvent),
    Host(HostCall),
}

/// What the host last saw, for reads made while the controller is busy.
struct Snapshot {
    value: String,
    visual: bool,
    toolbar: ToolbarSynchronizer,
}

struct Shared {
    pending: RefCell<VecDeque<Pending>>,
    snapshot: RefCell<Snapshot>,
    on_toolbar_change: RefCell<Option<ToolbarCallback>>,
}

impl Shared {
    fn new(config: &EditorConfig) -> Self {
        Self {
            pending: RefCell::default(),
            snapshot: RefCell::new(Snapshot {
                value: String::new(),
                visual: true,
                toolbar: ToolbarSynchronizer::new(config),
            }),
            on_toolbar_change: RefCell::default(),
        }
    }

    /// Queue `item` and drain the queue if the controller is free.
    fn dispatch(&self, controller: &RefCell<BrowserEditor>, item: Pending) {
        self.pending.borrow_mut().push_back(item);
        match controller.try_borrow_mut() {
            Ok(mut editor) => self.drain(&mut editor),
            Err(_) => {
                tracing::trace!(target: "scrivener::mount", "controller busy, call deferred");
            }
        }
    }

    fn pop(&self) -> Option<Pending> {
        self.pending.borrow_mut().pop_front()
    }

    fn drain(&self, editor: &mut BrowserEditor) {
        // The toolbar callback may queue more work.
        loop {
            let before = editor.toolbar().state().clone();
            while let Some(next) = self.pop() {
                match next {
                    Pending::Dom(event) => apply_dom_event(editor, event),
                    Pending::Host(call) => call(editor),
                }
            }
            self.remember(editor);
            self.notify_toolbar(&before, editor.toolbar());
            if self.pending.borrow().is_empty() {
                break;
            }
        }
    }

    fn remember(&self, editor: &BrowserEditor) {
        let mut snapshot = self.snapshot.borrow_mut();
        snapshot.value = editor.current_value();
        snapshot.visual = editor.is_visual();
        snapshot.toolbar = editor.toolbar().clone();
    }

    fn notify_toolbar(&self, before: &ToolbarState, toolbar: &ToolbarSynchronizer) {
        if before == toolbar.state() {
            return;
        }
        // Taken out while running so the callback may replace itself.
        let taken = self.on_toolbar_change.borrow_mut().take();
        if let Some(mut callback) = taken {
            callback(toolbar);
            let mut slot = self.on_toolbar_change.borrow_mut();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
    }
}

fn apply_dom_event(editor: &mut BrowserEditor, event: DomEvent) {
    tracing::trace!(target: "scrivener::mount", ?event, "dom event");
    match event {
        DomEvent::Focus => editor.on_focus(),
        DomEvent::Blur(target) => editor.on_blur(target),
        DomEvent::Input => editor.on_content_changed(),
        DomEvent::SelectionMoved => {
            editor.refresh_toolbar();
        }
    }
}

/// An editor controller attached to a contenteditable element.
///
/// Every method may be called from inside the editor's own callbacks.
/// Dropping it removes every listener it installed.
pub struct MountedEditor {
    controller: Rc<RefCell<BrowserEditor>>,
    shared: Rc<Shared>,
    _listeners: Vec<EventListener>,
}

impl MountedEditor {
    /// Attach to `root`, which becomes contenteditable. `id` names the
    /// source surface (`sourceText<id>`).
    pub fn mount(
        root: web_sys::HtmlElement,
        id: &str,
        config: EditorConfig,
    ) -> Result<Self, scrivener_core::PlatformError> {
        let backend = BrowserBackend::new(root.clone())?;
        let shared = Rc::new(Shared::new(&config));

        let controller = Rc::new_cyclic(|weak: &Weak<RefCell<BrowserEditor>>| {
            let sink_shared = shared.clone();
            let sink_controller = weak.clone();
            let sink: SurfaceSink = Rc::new(move |event: SurfaceEvent| {
                if let Some(controller) = sink_controller.upgrade() {
                    sink_shared.dispatch(&controller, Pending::Dom(event.into()));
                }
            });
            let surface = BrowserSurface::new(root.clone(), format!("sourceText{id}"), sink);
            RefCell::new(EditorController::new(backend, surface, config).with_id(id))
        });

        root.set_content_editable("true");

        let listen = |event_type: &'static str, event: fn(&web_sys::Event) -> DomEvent| {
            let shared = shared.clone();
            let controller = Rc::downgrade(&controller);
            EventListener::new(&root, event_type, move |e| {
                if let Some(controller) = controller.upgrade() {
                    shared.dispatch(&controller, Pending::Dom(event(e)));
                }
            })
        };

        let mut listeners = vec![
            listen("focus", |_| DomEvent::Focus),
            listen("blur", |e| DomEvent::Blur(blur_target(e))),
            listen("input", |_| DomEvent::Input),
            listen("keyup", |_| DomEvent::SelectionMoved),
            listen("mouseup", |_| DomEvent::SelectionMoved),
        ];

        let paste_controller = Rc::downgrade(&controller);
        let paste_shared = shared.clone();
        listeners.push(EventListener::new_with_options(
            &root,
            "paste",
            EventListenerOptions::enable_prevent_default(),
            move |e| {
                let Some(controller) = paste_controller.upgrade() else {
                    return;
                };
                let text = e
                    .dyn_ref::<web_sys::ClipboardEvent>()
                    .and_then(|ce| ce.clipboard_data())
                    .and_then(|data| data.get_data("text/plain").ok())
                    .unwrap_or_default();
                let Ok(mut editor) = controller.try_borrow_mut() else {
                    tracing::debug!(target: "scrivener::mount", "paste while busy left to the browser");
                    return;
                };
                if editor.on_paste(&text) == PasteOutcome::Handled {
                    e.prevent_default();
                }
                paste_shared.drain(&mut editor);
            },
        ));

        let mounted = Self {
            controller,
            shared,
            _listeners: listeners,
        };
        // Keep the snapshot current even before the host registers anything.
        mounted.register_on_change(|_| {});
        mounted.register_on_event(|_| {});

        tracing::debug!(target: "scrivener::mount", id, "editor mounted");
        Ok(mounted)
    }

    /// Run `f` against the controller, then apply DOM events it caused.
    ///
    /// From inside an editor callback `f` is queued and runs once the
    /// current operation finishes.
    pub fn with(&self, f: impl FnOnce(&mut BrowserEditor) + 'static) {
        self.shared
            .dispatch(&self.controller, Pending::Host(Box::new(f)));
    }

    /// Read from the controller, or `None` while it is busy.
    pub fn read<R>(&self, f: impl FnOnce(&BrowserEditor) -> R) -> Option<R> {
        self.controller.try_borrow().ok().map(|editor| f(&editor))
    }

    /// Called with every value delivered to the host.
    pub fn register_on_change(&self, mut f: impl FnMut(&str) + 'static) {
        let shared = self.shared.clone();
        self.with(move |editor| {
            editor.register_on_change(move |value| {
                shared.snapshot.borrow_mut().value = value.to_string();
                f(value);
            })
        });
    }

    /// Called with focus, blur and view-mode signals.
    pub fn register_on_event(&self, mut f: impl FnMut(EditorEvent) + 'static) {
        let shared = self.shared.clone();
        self.with(move |editor| {
            editor.on_event(move |event| {
                if let EditorEvent::ViewModeChanged { visual } = event {
                    shared.snapshot.borrow_mut().visual = visual;
                }
                f(event);
            })
        });
    }

    /// Called with the toolbar whenever its state changes.
    pub fn on_toolbar_change(&self, f: impl FnMut(&ToolbarSynchronizer) + 'static) {
        *self.shared.on_toolbar_change.borrow_mut() = Some(Box::new(f));
    }

    pub fn toolbar(&self) -> ToolbarSynchronizer {
        self.read(|editor| editor.toolbar().clone())
            .unwrap_or_else(|| self.shared.snapshot.borrow().toolbar.clone())
    }

    pub fn toolbar_state(&self) -> ToolbarState {
        self.read(|editor| editor.toolbar().state().clone())
            .unwrap_or_else(|| self.shared.snapshot.borrow().toolbar.state().clone())
    }

    pub fn is_visual(&self) -> bool {
        self.read(|editor| editor.is_visual())
            .unwrap_or_else(|| self.shared.snapshot.borrow().visual)
    }

    pub fn execute_command(&self, name: &str, value: Option<&str>) {
        let name = name.to_owned();
        let value = value.map(str::to_owned);
        self.with(move |editor| editor.execute_command(&name, value.as_deref()));
    }

    pub fn write_value(&self, value: Option<&str>) {
        let value = value.map(str::to_owned);
        self.with(move |editor| editor.write_value(value.as_deref()));
    }

    /// Current value, or the last one delivered while the editor is busy.
    pub fn value(&self) -> String {
        self.read(|editor| editor.current_value())
            .unwrap_or_else(|| self.shared.snapshot.borrow().value.clone())
    }

    /// Release the source surface and host callbacks. Listeners go with `self`.
    pub fn unmount(self) {
        self.with(|editor| editor.unmount());
        tracing::debug!(target: "scrivener::mount", "editor unmounted");
    }
}
