//! Controller behaviour against the in-memory platform.

use std::cell::RefCell;
use std::rc::Rc;

use scrivener_core::testing::{BackendCall, FakeBackend, FakePlatform, FakeSurface};
use scrivener_core::{
    BasicSanitizer, BlockType, CustomClass, EditorConfig, EditorController, EditorEvent,
    EditorMode, FocusTarget, FormatCommand, HtmlSanitizer, NodeInfo, PasteOutcome,
};

type TestEditor = EditorController<FakeBackend, FakeSurface>;

/// Everything the host observes.
#[derive(Default)]
struct Host {
    values: Vec<String>,
    touched: usize,
    events: Vec<EditorEvent>,
}

fn make_editor(platform: &FakePlatform, config: EditorConfig) -> (TestEditor, Rc<RefCell<Host>>) {
    let host = Rc::new(RefCell::new(Host::default()));
    let mut editor = EditorController::new(platform.backend(), platform.surface(), config)
        .with_id("editor");

    let h = host.clone();
    editor.register_on_change(move |v| h.borrow_mut().values.push(v.to_string()));
    let h = host.clone();
    editor.register_on_touched(move || h.borrow_mut().touched += 1);
    let h = host.clone();
    editor.on_event(move |e| h.borrow_mut().events.push(e));

    (editor, host)
}

fn classes_config() -> EditorConfig {
    EditorConfig {
        custom_classes: vec![
            CustomClass::new("Quote", "quote"),
            CustomClass::new("Custom", "custom"),
            CustomClass::new("Title", "title").with_tag("h1"),
        ],
        ..Default::default()
    }
}

// === Host value contract ===

#[test]
fn test_set_value_then_change_delivers_sanitized_value() {
    for input in [
        "<p>plain</p>",
        "<p><b>bold</b> and <i>italic</i></p>",
        r#"<p onclick="x()">a</p><script>alert(1)</script>"#,
    ] {
        let platform = FakePlatform::new();
        let (mut editor, host) = make_editor(&platform, EditorConfig::default());

        editor.set_value(input);
        editor.on_content_changed();

        assert_eq!(host.borrow().values, vec![BasicSanitizer::default().sanitize(input)]);
        assert!(!editor.show_placeholder());
    }
}

#[test]
fn test_sanitize_disabled_delivers_raw_value() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(
        &platform,
        EditorConfig {
            sanitize: false,
            ..Default::default()
        },
    );

    editor.set_value("<p>a</p><script>x</script>");
    editor.on_content_changed();
    assert_eq!(host.borrow().values, vec!["<p>a</p><script>x</script>"]);
}

#[test]
fn test_empty_values_are_equivalent() {
    let mut states = Vec::new();
    for value in [None, Some(""), Some("<br>")] {
        let platform = FakePlatform::new();
        let (mut editor, host) = make_editor(&platform, EditorConfig::default());

        editor.set_value("<p>previous</p>");
        assert!(!platform.placeholder_visible());

        editor.write_value(value);
        editor.on_content_changed();

        states.push((
            editor.show_placeholder(),
            platform.placeholder_visible(),
            platform.html(),
            host.borrow().values.last().cloned(),
        ));
    }

    assert_eq!(states[0], (true, true, String::new(), Some(String::new())));
    assert_eq!(states[0], states[1]);
    assert_eq!(states[1], states[2]);
}

#[test]
fn test_bare_line_break_content_reads_as_empty() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, EditorConfig::default());

    editor.set_value("<p>text</p>");
    platform.type_html("<br>");
    editor.on_content_changed();

    assert_eq!(host.borrow().values, vec![""]);
    assert!(editor.show_placeholder());
}

#[test]
fn test_set_value_is_idempotent() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, EditorConfig::default());

    editor.set_value("<p>same</p>");
    editor.set_value("<p>same</p>");
    assert_eq!(platform.html(), "<p>same</p>");
    assert!(!editor.show_placeholder());
    assert!(host.borrow().values.is_empty());
    assert!(platform.calls().is_empty());
}

#[test]
fn test_disabled_state_is_presentation_only() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(&platform, EditorConfig::default());

    editor.set_disabled_state(true);
    assert!(editor.is_disabled());
    assert!(platform.dom().disabled);

    editor.set_value("<p>still written</p>");
    assert_eq!(platform.html(), "<p>still written</p>");

    editor.set_disabled_state(false);
    assert!(!platform.dom().disabled);
}

// === Mode transitions ===

#[test]
fn test_source_round_trip_is_lossless() {
    let markup = "<p>Hello <b>bold</b> &amp; <i>italic</i> <em>x &lt; y</em></p>";
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, EditorConfig::default());
    editor.set_value(markup);

    editor.execute_command("toggleEditorMode", None);
    assert_eq!(editor.mode(), EditorMode::Source);
    assert!(editor.toolbar().is_source_mode());
    assert_eq!(platform.source().as_deref(), Some(markup));
    assert!(!platform.dom().editable);
    assert!(platform.dom().source_listeners);
    assert_eq!(platform.dom().source_focus_requests, 1);
    assert!(
        platform
            .calls()
            .contains(&BackendCall::SetParagraphSeparator("div".into()))
    );

    editor.execute_command("toggleEditorMode", None);
    assert_eq!(editor.mode(), EditorMode::Visual);
    assert!(!editor.toolbar().is_source_mode());
    assert_eq!(platform.html(), markup);
    assert_eq!(platform.source(), None);
    assert!(platform.dom().editable);
    assert!(!platform.dom().source_listeners);

    let host = host.borrow();
    assert_eq!(host.values.last().map(String::as_str), Some(markup));
    assert_eq!(
        host.events,
        vec![
            EditorEvent::ViewModeChanged { visual: false },
            EditorEvent::ViewModeChanged { visual: true },
        ]
    );
}

#[test]
fn test_source_edits_become_markup() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, EditorConfig::default());
    editor.set_value("<p>old</p>");

    editor.toggle_editor_mode();
    platform.type_source("<h1>new</h1>");
    editor.on_content_changed();
    assert_eq!(host.borrow().values.last().unwrap(), "<h1>new</h1>");

    editor.toggle_editor_mode();
    assert_eq!(platform.html(), "<h1>new</h1>");
}

#[test]
fn test_source_exit_without_structural_queries() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(&platform, EditorConfig::default());
    editor.set_value("<p>a <b>b</b></p>");

    editor.toggle_editor_mode();
    platform.disable_structural_queries();
    editor.toggle_editor_mode();

    assert!(editor.is_visual());
    assert_eq!(platform.html(), "<p>a <b>b</b></p>");
}

#[test]
fn test_focus_in_source_mode_targets_source_surface() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(&platform, EditorConfig::default());
    editor.toggle_editor_mode();

    let before = platform.dom().focus_requests;
    editor.focus();
    assert_eq!(platform.dom().focus_requests, before);
    assert_eq!(platform.dom().source_focus_requests, 2);
    assert!(editor.is_focused());
}

// === Commands ===

#[test]
fn test_backend_command_visible_in_next_sync() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(&platform, EditorConfig::default());
    platform.select(vec![NodeInfo::element("p"), NodeInfo::text()]);

    editor.execute_command("bold", None);
    assert!(editor.toolbar().state().is_active(FormatCommand::Bold));

    let calls = platform.calls();
    let exec = calls
        .iter()
        .position(|c| matches!(c, BackendCall::Execute { name, .. } if name == "bold"))
        .unwrap();
    let save = calls
        .iter()
        .position(|c| *c == BackendCall::SaveSelection)
        .unwrap();
    assert!(exec < save);
    assert_eq!(platform.dom().focus_requests, 1);
}

#[test]
fn test_command_value_is_forwarded() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(&platform, EditorConfig::default());

    editor.execute_command("foreColor", Some("#ff0000"));
    assert_eq!(
        platform.calls()[0],
        BackendCall::Execute {
            name: "foreColor".into(),
            value: Some("#ff0000".into())
        }
    );
}

#[test]
fn test_focus_only_commands_do_not_dispatch() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(&platform, EditorConfig::default());

    editor.execute_command("", None);
    editor.execute_command("focus", None);
    assert_eq!(platform.dom().focus_requests, 2);
    assert!(platform.calls().is_empty());
}

#[test]
fn test_clear_strips_custom_tags() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, classes_config());
    editor.set_value(r#"<p><span class="quote">a</span></p><h1 class="title">b</h1>"#);

    editor.execute_command("clear", None);
    assert!(
        platform
            .calls()
            .contains(&BackendCall::RemoveSelected("span,h1".into()))
    );
    assert_eq!(platform.html(), "<p>a</p>b");
    assert_eq!(host.borrow().values, vec!["<p>a</p>b"]);
}

#[test]
fn test_default_strips_block_tags() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, EditorConfig::default());
    editor.set_value("<h2>t</h2><p>a</p><pre>c</pre><div>d</div>");

    editor.execute_command("default", None);
    assert_eq!(platform.html(), "tac<div>d</div>");
    assert_eq!(host.borrow().values.len(), 1);
}

#[test]
fn test_custom_class_picker() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(&platform, classes_config());
    editor.set_value(r#"<span class="quote">q</span>"#);

    editor.select_custom_class("1");
    assert_eq!(
        platform.applied_classes(),
        vec![CustomClass::new("Custom", "custom")]
    );

    editor.select_custom_class("-1");
    assert_eq!(platform.html(), "q");
}

#[test]
fn test_font_pickers_apply_and_refocus() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(&platform, EditorConfig::default());

    editor.select_font_name("Calibri");
    editor.select_font_size("5");
    assert_eq!(
        platform.calls(),
        vec![
            BackendCall::SetFontName("Calibri".into()),
            BackendCall::SetFontSize("5".into()),
        ]
    );
    assert_eq!(platform.dom().focus_requests, 2);
}

// === Toolbar synchronization ===

#[test]
fn test_block_and_custom_class_from_selection() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(&platform, classes_config());
    platform.select(vec![
        NodeInfo::element("div"),
        NodeInfo::element_with_class("div", "custom"),
        NodeInfo::element("p"),
    ]);

    assert!(editor.refresh_toolbar());
    let state = editor.toolbar().state();
    assert_eq!(state.current_block(), BlockType::Paragraph);
    assert_eq!(state.formatting.current_custom_class, Some(1));
    assert_eq!(state.custom_class_id(), "1");
}

#[test]
fn test_unclassified_selection_gives_sentinels() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(&platform, classes_config());
    platform.select(vec![
        NodeInfo::element_with_class("span", "other"),
        NodeInfo::element("b"),
        NodeInfo::text(),
    ]);

    editor.refresh_toolbar();
    let state = editor.toolbar().state();
    assert_eq!(state.current_block(), BlockType::Default);
    assert_eq!(state.custom_class_id(), "-1");
}

#[test]
fn test_refresh_without_selection_skips_save() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(&platform, EditorConfig::default());
    platform.clear_selection();

    editor.refresh_toolbar();
    assert!(!platform.calls().contains(&BackendCall::SaveSelection));
}

// === Focus and blur ===

#[test]
fn test_blur_into_toolbar_picker() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, EditorConfig::default());
    editor.on_focus();

    editor.on_blur(Some(FocusTarget {
        keeps_selection: true,
        inside_controls: true,
    }));

    let host = host.borrow();
    assert_eq!(host.touched, 1);
    assert!(!host.events.contains(&EditorEvent::Blurred));
    assert!(editor.is_focused());
    assert!(!platform.calls().contains(&BackendCall::SaveSelection));
}

#[test]
fn test_blur_into_toolbar_saves_selection() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, EditorConfig::default());
    editor.on_focus();

    editor.on_blur(Some(FocusTarget::toolbar()));
    assert!(platform.calls().contains(&BackendCall::SaveSelection));
    assert!(!host.borrow().events.contains(&EditorEvent::Blurred));
}

#[test]
fn test_blur_elsewhere_emits_blurred() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, EditorConfig::default());
    editor.on_focus();

    editor.on_blur(Some(FocusTarget::outside()));
    assert_eq!(
        host.borrow().events,
        vec![EditorEvent::Focused, EditorEvent::Blurred]
    );
    assert_eq!(host.borrow().touched, 1);
    assert!(!editor.is_focused());
    assert_eq!(platform.calls(), vec![BackendCall::SaveSelection]);
}

#[test]
fn test_blur_without_related_target_stays_focused() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, EditorConfig::default());
    editor.on_focus();

    editor.on_blur(None);
    assert_eq!(host.borrow().events, vec![EditorEvent::Focused]);
    assert_eq!(host.borrow().touched, 1);
    assert!(editor.is_focused());
    assert_eq!(platform.calls(), vec![BackendCall::SaveSelection]);

    // Still focused, so refocusing is noise.
    editor.on_focus();
    assert_eq!(host.borrow().events, vec![EditorEvent::Focused]);
}

#[test]
fn test_repeated_focus_configures_once() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(
        &platform,
        EditorConfig {
            default_paragraph_separator: Some("p".into()),
            default_font_name: Some("Calibri".into()),
            default_font_size: Some("4".into()),
            ..Default::default()
        },
    );

    editor.on_focus();
    editor.on_focus();

    assert_eq!(
        platform.calls(),
        vec![
            BackendCall::SetParagraphSeparator("p".into()),
            BackendCall::SetFontName("Calibri".into()),
            BackendCall::SetFontSize("4".into()),
        ]
    );
    assert_eq!(host.borrow().events, vec![EditorEvent::Focused]);
    assert!(editor.is_touched());
}

#[test]
fn test_refocus_after_change_skips_configuration() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(
        &platform,
        EditorConfig {
            default_font_name: Some("Calibri".into()),
            ..Default::default()
        },
    );

    editor.on_focus();
    editor.on_content_changed();
    editor.on_blur(None);
    platform.clear_calls();

    editor.on_focus();
    assert!(platform.calls().is_empty());
}

// === Cursor insertion and paste ===

#[test]
fn test_insert_without_saved_selection_is_noop() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, EditorConfig::default());
    editor.set_value("<p>body</p>");

    editor.insert_at_cursor("<b>x</b>");

    assert_eq!(platform.html(), "<p>body</p>");
    assert!(host.borrow().values.is_empty());
    assert_eq!(platform.calls(), vec![BackendCall::RestoreSelection]);
}

#[test]
fn test_insert_at_saved_selection() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, EditorConfig::default());
    editor.set_value("<p>body</p>");
    platform.select(vec![NodeInfo::element("p"), NodeInfo::text()]);

    editor.save_cursor_position();
    platform.clear_selection();
    editor.insert_at_cursor("<b>x</b>");

    assert_eq!(platform.html(), "<p>body</p><b>x</b>");
    assert_eq!(host.borrow().values, vec!["<p>body</p><b>x</b>"]);
}

#[test]
fn test_paste_modes() {
    let platform = FakePlatform::new();
    let (mut editor, _host) = make_editor(&platform, EditorConfig::default());
    assert_eq!(editor.on_paste("text"), PasteOutcome::PassThrough);
    assert!(platform.calls().is_empty());

    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(
        &platform,
        EditorConfig {
            raw_paste: true,
            ..Default::default()
        },
    );
    assert_eq!(editor.on_paste("<u>raw</u>"), PasteOutcome::Handled);
    assert_eq!(platform.calls(), vec![BackendCall::InsertHtml("<u>raw</u>".into())]);
    assert_eq!(host.borrow().values, vec!["<u>raw</u>"]);
}

#[test]
fn test_unmount_releases_source_listeners() {
    let platform = FakePlatform::new();
    let (mut editor, host) = make_editor(&platform, EditorConfig::default());
    editor.toggle_editor_mode();
    assert!(platform.dom().source_listeners);

    editor.unmount();
    assert!(!platform.dom().source_listeners);

    editor.on_content_changed();
    assert!(host.borrow().values.is_empty());
}
