use dioxus::prelude::*;

#[component]
pub fn Home() -> Element {
    // Subscribe to the global language code so the page re-renders on change.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    rsx! {
        div { style: "display:none", "{lang_marker}" }
        section { class: "page page-home",
            h1 { {crate::t!("home-title")} }
            p { {crate::t!("home-intro")} }
            ul { class: "page-home__features",
                li { {crate::t!("home-graph")} }
                li { {crate::t!("home-export")} }
                li { {crate::t!("home-welcome")} }
                li { {crate::t!("home-shifts")} }
            }
        }
    }
}
