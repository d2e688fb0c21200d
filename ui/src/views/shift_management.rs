use api::EntryKind;
use dioxus::prelude::*;

use crate::shift_management::EntryEditorCard;

#[component]
pub fn ShiftWarnings() -> Element {
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    rsx! {
        div { style: "display:none", "{lang_marker}" }
        section { class: "page page-shifts",
            EntryEditorCard { kind: EntryKind::SlotWarning }
        }
    }
}

#[component]
pub fn Qualifications() -> Element {
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    rsx! {
        div { style: "display:none", "{lang_marker}" }
        section { class: "page page-shifts",
            EntryEditorCard { kind: EntryKind::UserCapability }
        }
    }
}
