//! Toolbar state derived from the selection.
//!
//! [`ToolbarSynchronizer`] rebuilds a [`ToolbarState`] from scratch on every
//! cycle out of two inputs: the selection's ancestor chain and the backend's
//! command queries. Nothing about the previous cycle leaks into the next one
//! except the comparison used to report a change.

use std::collections::BTreeSet;

use smol_str::SmolStr;

use crate::commands::{BlockType, EditorCommand, FormatCommand};
use crate::config::{CustomClass, EditorConfig, SelectOption};
use crate::error::EditorError;
use crate::platform::EditingBackend;
use crate::selection::SelectionContext;

/// Font shown when neither the selection nor the config names one.
pub const FALLBACK_FONT_NAME: &str = "Arial";
/// Font size shown when neither the selection nor the config names one.
pub const FALLBACK_FONT_SIZE: &str = "3";
/// Picker value meaning "no custom class".
pub const NO_CUSTOM_CLASS: &str = "-1";

/// Formatting context read from the ancestor chain and value queries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionFormatting {
    pub link_selected: bool,
    pub current_block: BlockType,
    /// Position in the configured custom class list.
    pub current_custom_class: Option<usize>,
    /// Font name with quotes removed.
    pub font_name: Option<String>,
    pub font_size: Option<String>,
    pub fore_color: Option<String>,
    pub back_color: Option<String>,
}

/// Everything the toolbar displays for one synchronization cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolbarState {
    pub active_commands: BTreeSet<FormatCommand>,
    pub formatting: SelectionFormatting,
}

impl ToolbarState {
    pub fn is_active(&self, command: FormatCommand) -> bool {
        self.active_commands.contains(&command)
    }

    pub fn current_block(&self) -> BlockType {
        self.formatting.current_block
    }

    /// Custom class picker value: the class position, or `"-1"`.
    pub fn custom_class_id(&self) -> SmolStr {
        match self.formatting.current_custom_class {
            Some(idx) => SmolStr::new(idx.to_string()),
            None => SmolStr::new_static(NO_CUSTOM_CLASS),
        }
    }
}

/// Block classification: the first enumerated tag, in enumeration order,
/// that occurs anywhere in the chain.
pub fn classify_block(ctx: &SelectionContext) -> BlockType {
    for block in BlockType::ENUMERATED {
        let Some(name) = block.node_name() else {
            continue;
        };
        if ctx.find(|node| node.node_name == name).is_some() {
            return block;
        }
    }
    BlockType::Default
}

/// Custom class classification: the first configured class, in catalog
/// order, whose class name equals some ancestor's class attribute.
pub fn classify_custom_class(ctx: &SelectionContext, catalog: &[CustomClass]) -> Option<usize> {
    let mut found = None;
    for (idx, class) in catalog.iter().enumerate() {
        if ctx.find(|node| node.has_class_attribute(&class.class)).is_some() {
            found = Some(idx);
            break;
        }
    }
    found
}

fn query_value<B: EditingBackend + ?Sized>(backend: &B, name: &str) -> Option<String> {
    match backend.query_command_value(name) {
        Ok(value) if value.is_empty() => None,
        Ok(value) => Some(value),
        Err(e) => {
            let err = EditorError::query(name, e);
            tracing::debug!(target: "scrivener::toolbar", error = %err, "value query unsupported");
            None
        }
    }
}

/// Derives toolbar state and turns toolbar interactions into commands.
#[derive(Debug, Clone)]
pub struct ToolbarSynchronizer {
    show_toolbar: bool,
    custom_classes: Vec<CustomClass>,
    default_font_name: Option<String>,
    default_font_size: Option<String>,
    state: ToolbarState,
    source_mode: bool,
}

impl ToolbarSynchronizer {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            show_toolbar: config.show_toolbar,
            custom_classes: config.custom_classes.clone(),
            default_font_name: config.default_font_name.clone(),
            default_font_size: config.default_font_size.clone(),
            state: ToolbarState::default(),
            source_mode: false,
        }
    }

    pub fn state(&self) -> &ToolbarState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.show_toolbar
    }

    /// Whether the mode control is shown active.
    pub fn is_source_mode(&self) -> bool {
        self.source_mode
    }

    /// Query each toolbar button's command state.
    ///
    /// Unsupported queries count as inactive. Returns None when the toolbar
    /// is hidden.
    pub fn sync_active_commands<B: EditingBackend + ?Sized>(
        &self,
        backend: &B,
    ) -> Option<BTreeSet<FormatCommand>> {
        if !self.show_toolbar {
            return None;
        }

        let mut active = BTreeSet::new();
        for command in FormatCommand::ALL {
            match backend.query_command_state(command.as_str()) {
                Ok(true) => {
                    active.insert(command);
                }
                Ok(false) => {}
                Err(e) => {
                    let err = EditorError::query(command.as_str(), e);
                    tracing::debug!(
                        target: "scrivener::toolbar",
                        error = %err,
                        "state query unsupported, treating as inactive"
                    );
                }
            }
        }
        Some(active)
    }

    /// Classify the ancestor chain and read font/color values.
    ///
    /// Returns None when the toolbar is hidden.
    pub fn sync_block_and_font<B: EditingBackend + ?Sized>(
        &self,
        ctx: &SelectionContext,
        backend: &B,
    ) -> Option<SelectionFormatting> {
        if !self.show_toolbar {
            return None;
        }

        Some(SelectionFormatting {
            link_selected: ctx.link_selected,
            current_block: classify_block(ctx),
            current_custom_class: classify_custom_class(ctx, &self.custom_classes),
            font_name: query_value(backend, "FontName").map(|name| name.replace('"', "")),
            font_size: query_value(backend, "FontSize"),
            fore_color: query_value(backend, "ForeColor"),
            back_color: query_value(backend, "backColor"),
        })
    }

    /// Run one full synchronization cycle.
    ///
    /// Without a selection context the block/font pass is skipped and the
    /// previous formatting carries over. Returns whether the state changed.
    pub fn synchronize<B: EditingBackend + ?Sized>(
        &mut self,
        ctx: Option<&SelectionContext>,
        backend: &B,
    ) -> bool {
        let Some(active_commands) = self.sync_active_commands(backend) else {
            return false;
        };

        let formatting = match ctx {
            Some(ctx) => self
                .sync_block_and_font(ctx, backend)
                .unwrap_or_default(),
            None => {
                tracing::trace!(target: "scrivener::toolbar", "no selection, skipping block/font sync");
                self.state.formatting.clone()
            }
        };

        let next = ToolbarState {
            active_commands,
            formatting,
        };
        if next == self.state {
            return false;
        }

        tracing::trace!(target: "scrivener::toolbar", state = ?next, "toolbar state changed");
        self.state = next;
        true
    }

    /// Toggle the mode control's active flag.
    pub fn set_mode(&mut self, is_source: bool) {
        self.source_mode = is_source;
    }

    /// A toolbar button was pressed.
    pub fn trigger_command(&self, name: &str) -> EditorCommand {
        EditorCommand::from(name)
    }

    /// A custom class was picked.
    ///
    /// `"-1"` yields a `clear` command for the controller; anything else is
    /// applied directly through the backend.
    pub fn select_custom_class<B: EditingBackend + ?Sized>(
        &self,
        class_id: &str,
        backend: &mut B,
    ) -> Option<EditorCommand> {
        if class_id == NO_CUSTOM_CLASS {
            return Some(EditorCommand::Clear);
        }

        let Some(class) = class_id
            .parse::<usize>()
            .ok()
            .and_then(|idx| self.custom_classes.get(idx))
        else {
            tracing::warn!(target: "scrivener::toolbar", class_id, "unknown custom class id");
            return None;
        };

        if let Err(e) = backend.create_custom_class(class) {
            tracing::warn!(target: "scrivener::toolbar", class = %class.class, error = %e, "failed to apply custom class");
        }
        None
    }

    /// Apply a font from the picker. The returned command hands focus back
    /// to the editor.
    pub fn select_font_name<B: EditingBackend + ?Sized>(
        &self,
        name: &str,
        backend: &mut B,
    ) -> EditorCommand {
        if let Err(e) = backend.set_font_name(name) {
            tracing::warn!(target: "scrivener::toolbar", font = name, error = %e, "failed to set font name");
        }
        EditorCommand::Refocus
    }

    /// Apply a font size from the picker. The returned command hands focus
    /// back to the editor.
    pub fn select_font_size<B: EditingBackend + ?Sized>(
        &self,
        size: &str,
        backend: &mut B,
    ) -> EditorCommand {
        if let Err(e) = backend.set_font_size(size) {
            tracing::warn!(target: "scrivener::toolbar", size, error = %e, "failed to set font size");
        }
        EditorCommand::Refocus
    }

    /// Font name to display.
    pub fn font_name(&self) -> &str {
        self.state
            .formatting
            .font_name
            .as_deref()
            .or(self.default_font_name.as_deref())
            .unwrap_or(FALLBACK_FONT_NAME)
    }

    /// Font size to display.
    pub fn font_size(&self) -> &str {
        self.state
            .formatting
            .font_size
            .as_deref()
            .or(self.default_font_size.as_deref())
            .unwrap_or(FALLBACK_FONT_SIZE)
    }

    pub fn is_link_button_disabled(&self, has_selected_text: bool) -> bool {
        self.source_mode || !has_selected_text
    }

    /// Heading picker entries.
    pub fn block_options() -> Vec<SelectOption> {
        vec![
            SelectOption::new("Heading 1", "h1"),
            SelectOption::new("Heading 2", "h2"),
            SelectOption::new("Heading 3", "h3"),
            SelectOption::new("Paragraph", "p"),
            SelectOption::new("Standard", "div"),
        ]
    }

    /// Custom class picker entries, led by the clearing entry.
    pub fn custom_class_options(&self) -> Vec<SelectOption> {
        let mut options = vec![SelectOption::new("Clear Class", NO_CUSTOM_CLASS)];
        options.extend(
            self.custom_classes
                .iter()
                .enumerate()
                .map(|(i, class)| SelectOption::new(class.name.as_str(), i.to_string())),
        );
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::NodeInfo;
    use crate::testing::FakePlatform;

    fn config() -> EditorConfig {
        EditorConfig {
            custom_classes: vec![
                CustomClass::new("Quote", "quote"),
                CustomClass::new("Custom", "custom"),
            ],
            ..Default::default()
        }
    }

    fn chain(nodes: &[NodeInfo]) -> SelectionContext {
        SelectionContext::new(nodes.to_vec())
    }

    #[test]
    fn test_block_and_class_resolved_together() {
        let platform = FakePlatform::new();
        let sync = ToolbarSynchronizer::new(&config());
        let ctx = chain(&[
            NodeInfo::element_with_class("div", "custom"),
            NodeInfo::element("p"),
            NodeInfo::text(),
        ]);

        let formatting = sync.sync_block_and_font(&ctx, &platform.backend()).unwrap();
        assert_eq!(formatting.current_block, BlockType::Paragraph);
        assert_eq!(formatting.current_custom_class, Some(1));
        assert!(!formatting.link_selected);
    }

    #[test]
    fn test_no_match_gives_sentinels() {
        let platform = FakePlatform::new();
        let mut sync = ToolbarSynchronizer::new(&config());
        let ctx = chain(&[NodeInfo::element("span"), NodeInfo::text()]);

        sync.synchronize(Some(&ctx), &platform.backend());
        assert_eq!(sync.state().current_block(), BlockType::Default);
        assert_eq!(sync.state().custom_class_id(), "-1");
    }

    #[test]
    fn test_earlier_enumerated_tag_wins() {
        let ctx = chain(&[
            NodeInfo::element("div"),
            NodeInfo::element("pre"),
            NodeInfo::element("h2"),
        ]);
        assert_eq!(classify_block(&ctx), BlockType::H2);

        let ctx = chain(&[NodeInfo::element("div"), NodeInfo::element("div")]);
        assert_eq!(classify_block(&ctx), BlockType::Div);
    }

    #[test]
    fn test_first_configured_class_wins() {
        let ctx = chain(&[
            NodeInfo::element_with_class("div", "custom"),
            NodeInfo::element_with_class("span", "quote"),
        ]);
        assert_eq!(classify_custom_class(&ctx, &config().custom_classes), Some(0));
        assert_eq!(classify_custom_class(&ctx, &[]), None);
    }

    #[test]
    fn test_link_detection() {
        let platform = FakePlatform::new();
        let sync = ToolbarSynchronizer::new(&config());
        let ctx = chain(&[NodeInfo::element("p"), NodeInfo::element("a"), NodeInfo::text()]);
        let formatting = sync.sync_block_and_font(&ctx, &platform.backend()).unwrap();
        assert!(formatting.link_selected);
    }

    #[test]
    fn test_values_read_from_backend() {
        let platform = FakePlatform::new();
        platform.set_command_value("FontName", "\"Times New Roman\"");
        platform.set_command_value("FontSize", "5");
        platform.set_command_value("ForeColor", "rgb(255, 0, 0)");
        platform.set_command_value("backColor", "rgb(0, 0, 0)");
        let sync = ToolbarSynchronizer::new(&config());

        let formatting = sync
            .sync_block_and_font(&SelectionContext::default(), &platform.backend())
            .unwrap();
        assert_eq!(formatting.font_name.as_deref(), Some("Times New Roman"));
        assert_eq!(formatting.font_size.as_deref(), Some("5"));
        assert_eq!(formatting.fore_color.as_deref(), Some("rgb(255, 0, 0)"));
        assert_eq!(formatting.back_color.as_deref(), Some("rgb(0, 0, 0)"));
    }

    #[test]
    fn test_failing_queries_degrade_to_inactive() {
        let platform = FakePlatform::new();
        platform.set_command_state("bold", true);
        platform.set_command_state("italic", true);
        platform.fail_query("italic");
        platform.fail_query("FontName");
        let mut sync = ToolbarSynchronizer::new(&config());

        assert!(sync.synchronize(Some(&SelectionContext::default()), &platform.backend()));
        let state = sync.state();
        assert!(state.is_active(FormatCommand::Bold));
        assert!(!state.is_active(FormatCommand::Italic));
        assert_eq!(state.formatting.font_name, None);
        assert_eq!(sync.font_name(), FALLBACK_FONT_NAME);
    }

    #[test]
    fn test_hidden_toolbar_is_noop() {
        let platform = FakePlatform::new();
        platform.set_command_state("bold", true);
        let mut sync = ToolbarSynchronizer::new(&EditorConfig {
            show_toolbar: false,
            ..config()
        });
        let ctx = chain(&[NodeInfo::element("p")]);

        assert!(sync.sync_active_commands(&platform.backend()).is_none());
        assert!(sync.sync_block_and_font(&ctx, &platform.backend()).is_none());
        assert!(!sync.synchronize(Some(&ctx), &platform.backend()));
        assert_eq!(sync.state(), &ToolbarState::default());
    }

    #[test]
    fn test_synchronize_is_deterministic() {
        let platform = FakePlatform::new();
        platform.set_command_state("underline", true);
        let mut sync = ToolbarSynchronizer::new(&config());
        let ctx = chain(&[NodeInfo::element("h1")]);

        assert!(sync.synchronize(Some(&ctx), &platform.backend()));
        let first = sync.state().clone();
        assert!(!sync.synchronize(Some(&ctx), &platform.backend()));
        assert_eq!(sync.state(), &first);
    }

    #[test]
    fn test_missing_selection_keeps_formatting() {
        let platform = FakePlatform::new();
        let mut sync = ToolbarSynchronizer::new(&config());
        sync.synchronize(Some(&chain(&[NodeInfo::element("h3")])), &platform.backend());

        platform.set_command_state("bold", true);
        assert!(sync.synchronize(None, &platform.backend()));
        assert_eq!(sync.state().current_block(), BlockType::H3);
        assert!(sync.state().is_active(FormatCommand::Bold));
    }

    #[test]
    fn test_select_custom_class() {
        let platform = FakePlatform::new();
        let mut backend = platform.backend();
        let sync = ToolbarSynchronizer::new(&config());

        assert_eq!(
            sync.select_custom_class("-1", &mut backend),
            Some(EditorCommand::Clear)
        );
        assert_eq!(sync.select_custom_class("1", &mut backend), None);
        assert_eq!(sync.select_custom_class("9", &mut backend), None);
        assert_eq!(
            platform.applied_classes(),
            vec![CustomClass::new("Custom", "custom")]
        );
    }

    #[test]
    fn test_font_display_fallbacks() {
        let platform = FakePlatform::new();
        let mut sync = ToolbarSynchronizer::new(&EditorConfig {
            default_font_name: Some("Calibri".into()),
            ..config()
        });
        assert_eq!(sync.font_name(), "Calibri");
        assert_eq!(sync.font_size(), FALLBACK_FONT_SIZE);

        platform.set_command_value("FontSize", "6");
        sync.synchronize(Some(&SelectionContext::default()), &platform.backend());
        assert_eq!(sync.font_size(), "6");
    }

    #[test]
    fn test_mode_and_link_button() {
        let mut sync = ToolbarSynchronizer::new(&config());
        assert!(!sync.is_link_button_disabled(true));
        assert!(sync.is_link_button_disabled(false));
        sync.set_mode(true);
        assert!(sync.is_source_mode());
        assert!(sync.is_link_button_disabled(true));
    }

    #[test]
    fn test_custom_class_options() {
        let sync = ToolbarSynchronizer::new(&config());
        let values: Vec<_> = sync
            .custom_class_options()
            .into_iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(values, ["-1", "0", "1"]);
    }
}
