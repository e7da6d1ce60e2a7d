//! Classification of where focus went on blur.

use wasm_bindgen::JsCast;

use scrivener_core::FocusTarget;

/// Regions that must not disturb the saved selection when focused.
pub const SELECTION_KEEPING_SELECTOR: &str = ".re-non-blur-trigger, .autocomplete-suggestions";

/// The editor's own controls: toolbar sets and pickers.
pub const CONTROLS_SELECTOR: &str = ".re-toolbar, .re-picker";

/// Classify a blur's related target.
///
/// Returns None when focus left the document or went to something that is
/// not an element.
pub fn classify_focus_target(related: Option<web_sys::EventTarget>) -> Option<FocusTarget> {
    let element = related?.dyn_into::<web_sys::Element>().ok()?;
    let within = |selector: &str| matches!(element.closest(selector), Ok(Some(_)));
    Some(FocusTarget {
        keeps_selection: within(SELECTION_KEEPING_SELECTOR),
        inside_controls: within(CONTROLS_SELECTOR),
    })
}

/// Classify the related target of a `blur` event.
pub fn blur_target(event: &web_sys::Event) -> Option<FocusTarget> {
    let focus_event = event.dyn_ref::<web_sys::FocusEvent>()?;
    classify_focus_target(focus_event.related_target())
}
