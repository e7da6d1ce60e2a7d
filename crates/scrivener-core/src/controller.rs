//! The editor controller.
//!
//! [`EditorController`] owns the editable region through an
//! [`EditableSurface`], talks to the environment's formatting primitives
//! through an [`EditingBackend`], and keeps the host's value, the region's
//! mode and the toolbar state in step. Every method runs to completion; the
//! only thing it asks for without waiting on is focus.

use smol_str::SmolStr;

use crate::commands::{DEFAULT_BLOCK_TAGS, EditorCommand};
use crate::config::{EditorConfig, SelectOption};
use crate::error::EditorError;
use crate::platform::{EditableSurface, EditingBackend};
use crate::sanitize::{BasicSanitizer, HtmlSanitizer};
use crate::toolbar::ToolbarSynchronizer;

/// Paragraph separator used while the source surface is active.
const SOURCE_PARAGRAPH_SEPARATOR: &str = "div";

/// Which view of the content is editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    /// Rendered markup, edited structurally.
    #[default]
    Visual,
    /// Markup shown and edited as plain text.
    Source,
}

/// Signals for the host besides the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    Focused,
    /// Focus left the editor and its controls.
    Blurred,
    ViewModeChanged { visual: bool },
}

/// Where focus went when the editor blurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusTarget {
    /// Target sits in a region that must not disturb the saved selection
    /// (non-blur-trigger controls, autocomplete popups).
    pub keeps_selection: bool,
    /// Target is one of the editor's own controls (toolbar, pickers).
    pub inside_controls: bool,
}

impl FocusTarget {
    /// Some element unrelated to the editor.
    pub fn outside() -> Self {
        Self::default()
    }

    /// A toolbar control or picker.
    pub fn toolbar() -> Self {
        Self {
            keeps_selection: false,
            inside_controls: true,
        }
    }
}

/// Whether the platform should run its own paste handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteOutcome {
    /// The controller inserted the text; prevent the default.
    Handled,
    PassThrough,
}

type ChangeCallback = Box<dyn FnMut(&str)>;
type TouchedCallback = Box<dyn FnMut()>;
type EventCallback = Box<dyn FnMut(EditorEvent)>;

fn is_logically_empty(html: &str) -> bool {
    html.is_empty() || html == "<br>"
}

/// Owns the editable region and keeps host value, mode and toolbar in sync.
pub struct EditorController<B, S> {
    backend: B,
    surface: S,
    config: EditorConfig,
    toolbar: ToolbarSynchronizer,
    sanitizer: Box<dyn HtmlSanitizer>,
    id: SmolStr,

    mode: EditorMode,
    show_placeholder: bool,
    disabled: bool,
    focused: bool,
    touched: bool,
    changed: bool,
    in_content_change: bool,

    on_change: Option<ChangeCallback>,
    on_touched: Option<TouchedCallback>,
    on_event: Option<EventCallback>,
}

impl<B: EditingBackend, S: EditableSurface> EditorController<B, S> {
    pub fn new(backend: B, surface: S, config: EditorConfig) -> Self {
        let toolbar = ToolbarSynchronizer::new(&config);
        let sanitizer = BasicSanitizer::default()
            .allow_tags(config.custom_classes.iter().filter_map(|c| c.tag.clone()));
        Self {
            backend,
            surface,
            config,
            toolbar,
            sanitizer: Box::new(sanitizer),
            id: SmolStr::default(),
            mode: EditorMode::Visual,
            show_placeholder: false,
            disabled: false,
            focused: false,
            touched: false,
            changed: false,
            in_content_change: false,
            on_change: None,
            on_touched: None,
            on_event: None,
        }
    }

    /// Instance id, used to name the source surface.
    pub fn with_id(mut self, id: impl Into<SmolStr>) -> Self {
        self.id = id.into();
        self
    }

    /// Replace the sanitizer applied to outgoing values.
    pub fn with_sanitizer(mut self, sanitizer: impl HtmlSanitizer + 'static) -> Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    // === Accessors ===

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Element id of the source surface.
    pub fn source_surface_id(&self) -> String {
        format!("sourceText{}", self.id)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn is_visual(&self) -> bool {
        self.mode == EditorMode::Visual
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn show_placeholder(&self) -> bool {
        self.show_placeholder
    }

    pub fn toolbar(&self) -> &ToolbarSynchronizer {
        &self.toolbar
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Font picker entries.
    pub fn font_options(&self) -> Vec<SelectOption> {
        self.config.font_options()
    }

    /// Tags stripped by the `clear` command.
    pub fn custom_tags(&self) -> String {
        self.config.custom_tags()
    }

    // === Host value contract ===

    /// Register the host's change callback.
    ///
    /// A bare line break is delivered as the empty string.
    pub fn register_on_change(&mut self, mut f: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(move |value: &str| {
            if value == "<br>" { f("") } else { f(value) }
        }));
    }

    pub fn register_on_touched(&mut self, f: impl FnMut() + 'static) {
        self.on_touched = Some(Box::new(f));
    }

    /// Register a listener for focus, blur and view-mode signals.
    pub fn on_event(&mut self, f: impl FnMut(EditorEvent) + 'static) {
        self.on_event = Some(Box::new(f));
    }

    /// Write a value coming from the host.
    ///
    /// None, `""` and `"<br>"` all mean empty.
    pub fn write_value(&mut self, value: Option<&str>) {
        let value = value.filter(|v| !is_logically_empty(v));
        let empty = value.is_none();
        if empty != self.show_placeholder {
            self.set_placeholder(empty);
        }
        self.surface.set_inner_html(value.unwrap_or(""));
    }

    /// Replace the region content.
    pub fn set_value(&mut self, html: &str) {
        self.write_value(Some(html));
    }

    /// Toggle the disabled presentation. Programmatic edits still go through.
    pub fn set_disabled_state(&mut self, disabled: bool) {
        self.surface.set_disabled(disabled);
        self.disabled = disabled;
    }

    /// Current content as the host would receive it.
    pub fn current_value(&self) -> String {
        let html = self.read_content();
        if self.config.sanitize {
            self.sanitizer.sanitize(&html)
        } else {
            html
        }
    }

    fn read_content(&self) -> String {
        let raw = match self.mode {
            EditorMode::Visual => self.surface.inner_html(),
            EditorMode::Source => self.surface.inner_text(),
        };
        if is_logically_empty(&raw) {
            String::new()
        } else {
            raw
        }
    }

    /// Push the region's content to the host.
    pub fn on_content_changed(&mut self) {
        if self.in_content_change {
            tracing::trace!(target: "scrivener::controller", "re-entrant content change ignored");
            return;
        }
        self.in_content_change = true;

        let html = self.read_content();
        if self.on_change.is_some() {
            let value = if self.config.sanitize {
                self.sanitizer.sanitize(&html)
            } else {
                html.clone()
            };
            if let Some(on_change) = self.on_change.as_mut() {
                on_change(&value);
            }
        }

        let empty = html.is_empty();
        if empty != self.show_placeholder {
            self.set_placeholder(empty);
        }
        self.changed = true;
        self.in_content_change = false;
    }

    fn set_placeholder(&mut self, visible: bool) {
        self.surface.set_placeholder_visible(visible);
        self.show_placeholder = visible;
    }

    fn emit(&mut self, event: EditorEvent) {
        tracing::debug!(target: "scrivener::controller", ?event, "editor event");
        if let Some(on_event) = self.on_event.as_mut() {
            on_event(event);
        }
    }

    // === Commands ===

    /// Run a command from the toolbar or the host.
    ///
    /// The toolbar is re-synchronized after every dispatched command, so the
    /// command's effect shows up in the very next toolbar state.
    pub fn execute_command(&mut self, name: &str, value: Option<&str>) {
        self.focus();

        match EditorCommand::from(name) {
            EditorCommand::Refocus | EditorCommand::Focus => return,
            EditorCommand::ToggleEditorMode => self.toggle_editor_mode(),
            EditorCommand::Clear => {
                let tags = self.config.custom_tags();
                self.remove_selected(&tags);
                self.on_content_changed();
            }
            EditorCommand::Default => {
                self.remove_selected(DEFAULT_BLOCK_TAGS);
                self.on_content_changed();
            }
            EditorCommand::Backend(name) => {
                if let Err(e) = self.backend.execute_command(&name, value) {
                    tracing::warn!(target: "scrivener::controller", command = %name, error = %e, "backend command failed");
                }
            }
        }

        self.refresh_toolbar();
    }

    fn remove_selected(&mut self, tags: &str) {
        if let Err(e) = self.backend.remove_selected_elements(tags) {
            tracing::warn!(target: "scrivener::controller", tags, error = %e, "failed to remove selected elements");
        }
    }

    /// Re-derive toolbar state from the current selection.
    ///
    /// Saves the selection on the way, so a later blur into the toolbar
    /// still has something to restore. Returns whether the state changed.
    pub fn refresh_toolbar(&mut self) -> bool {
        let ctx = self.surface.selection_context();
        if ctx.is_some() {
            self.backend.save_selection();
        }
        self.toolbar.synchronize(ctx.as_ref(), &self.backend)
    }

    /// A custom class was picked in the toolbar.
    pub fn select_custom_class(&mut self, class_id: &str) {
        if let Some(command) = self.toolbar.select_custom_class(class_id, &mut self.backend) {
            self.execute_command(command.as_str(), None);
        }
    }

    /// A font was picked in the toolbar.
    pub fn select_font_name(&mut self, name: &str) {
        let command = self.toolbar.select_font_name(name, &mut self.backend);
        self.execute_command(command.as_str(), None);
    }

    /// A font size was picked in the toolbar.
    pub fn select_font_size(&mut self, size: &str) {
        let command = self.toolbar.select_font_size(size, &mut self.backend);
        self.execute_command(command.as_str(), None);
    }

    // === Mode transitions ===

    /// Switch between the visual and the source view.
    pub fn toggle_editor_mode(&mut self) {
        match self.mode {
            EditorMode::Visual => self.enter_source_mode(),
            EditorMode::Source => self.enter_visual_mode(),
        }
        self.toolbar.set_mode(self.mode == EditorMode::Source);
    }

    fn enter_source_mode(&mut self) {
        let markup = self.surface.inner_html();
        self.surface.set_editable(false);
        if let Err(e) = self.surface.mount_source(&markup) {
            tracing::warn!(target: "scrivener::controller", error = %e, "could not mount source surface, staying in visual mode");
            self.surface.set_editable(true);
            return;
        }

        if let Err(e) = self
            .backend
            .set_default_paragraph_separator(SOURCE_PARAGRAPH_SEPARATOR)
        {
            tracing::warn!(target: "scrivener::controller", error = %e, "failed to switch paragraph separator");
        }

        self.mode = EditorMode::Source;
        tracing::debug!(target: "scrivener::controller", len = markup.len(), "entered source mode");
        self.emit(EditorEvent::ViewModeChanged { visual: false });
        self.surface.focus_source();
    }

    fn enter_visual_mode(&mut self) {
        let text = self.source_markup();
        self.surface.unmount_source();
        self.surface.set_inner_html(&text);
        self.surface.set_editable(true);

        self.mode = EditorMode::Visual;
        tracing::debug!(target: "scrivener::controller", len = text.len(), "entered visual mode");
        self.on_content_changed();
        self.emit(EditorEvent::ViewModeChanged { visual: true });
        self.surface.focus();
    }

    /// Source text to reparse as markup, falling back to a range read and
    /// then to the container's rendered text.
    fn source_markup(&self) -> String {
        match self.surface.source_text() {
            Ok(text) => text,
            Err(e) => {
                let err = EditorError::MalformedModeTransitionInput(e.0);
                tracing::debug!(target: "scrivener::controller", error = %err, "reconstructing source from range");
                self.surface
                    .source_text_from_range()
                    .unwrap_or_else(|| self.surface.inner_text())
            }
        }
    }

    // === Focus ===

    /// Move focus into the active view.
    pub fn focus(&mut self) {
        match self.mode {
            EditorMode::Visual => self.surface.focus(),
            EditorMode::Source => {
                self.surface.focus_source();
                self.focused = true;
            }
        }
    }

    /// The region or source surface gained focus.
    pub fn on_focus(&mut self) {
        if self.focused {
            tracing::trace!(target: "scrivener::controller", "focus while focused ignored");
            return;
        }
        self.focused = true;
        self.emit(EditorEvent::Focused);

        if !self.touched || !self.changed {
            self.configure();
            self.touched = true;
        }
    }

    /// The region or source surface lost focus to `target`.
    ///
    /// `None` means the platform reported no related target (window switch,
    /// click on a non-focusable area). The selection is still saved and the
    /// host touched, but focus is not considered to have left the editor.
    pub fn on_blur(&mut self, target: Option<FocusTarget>) {
        if !target.is_some_and(|t| t.keeps_selection) {
            self.backend.save_selection();
        }

        if let Some(on_touched) = self.on_touched.as_mut() {
            on_touched();
        }

        if target.is_some_and(|t| !t.inside_controls) {
            self.focused = false;
            self.emit(EditorEvent::Blurred);
        }
    }

    /// Apply the configured defaults on first focus.
    fn configure(&mut self) {
        let config = &self.config;
        let backend = &mut self.backend;
        let results = [
            config
                .default_paragraph_separator
                .as_deref()
                .map(|sep| backend.set_default_paragraph_separator(sep)),
            config
                .default_font_name
                .as_deref()
                .map(|name| backend.set_font_name(name)),
            config
                .default_font_size
                .as_deref()
                .map(|size| backend.set_font_size(size)),
        ];
        for result in results.into_iter().flatten() {
            if let Err(e) = result {
                tracing::warn!(target: "scrivener::controller", error = %e, "failed to apply configured default");
            }
        }
    }

    // === Cursor ===

    /// Remember the selection for a later [`insert_at_cursor`](Self::insert_at_cursor).
    pub fn save_cursor_position(&mut self) {
        self.backend.save_selection();
    }

    /// Insert markup at the saved selection. Does nothing if none was saved.
    pub fn insert_at_cursor(&mut self, html: &str) {
        match self.try_insert_at_cursor(html) {
            Ok(()) => {}
            Err(EditorError::SelectionUnavailable) => {
                tracing::debug!(target: "scrivener::controller", "no saved selection, insert skipped");
            }
            Err(e) => {
                tracing::warn!(target: "scrivener::controller", error = %e, "insert at cursor failed");
            }
        }
    }

    fn try_insert_at_cursor(&mut self, html: &str) -> Result<(), EditorError> {
        if !self.backend.restore_selection() {
            return Err(EditorError::SelectionUnavailable);
        }
        self.backend.insert_html(html)?;
        self.on_content_changed();
        Ok(())
    }

    /// Clipboard paste with its plain-text payload.
    pub fn on_paste(&mut self, plain_text: &str) -> PasteOutcome {
        if !self.config.raw_paste {
            return PasteOutcome::PassThrough;
        }
        if let Err(e) = self.backend.insert_html(plain_text) {
            tracing::warn!(target: "scrivener::controller", error = %e, "raw paste failed");
        }
        self.on_content_changed();
        PasteOutcome::Handled
    }

    /// Tear down listeners owned by the region.
    pub fn unmount(&mut self) {
        self.surface.unmount_source();
        self.on_change = None;
        self.on_touched = None;
        self.on_event = None;
    }
}
