use dioxus::prelude::*;
use tracing::{info, Level};

use ui::components::app_navbar::{register_nav, NavBuilder};
use ui::components::AppNavbar;
use ui::core::config::UiConfig;
use ui::views::{
    Home, Qualifications, ShiftWarnings, StatisticsExport, StatisticsGraph, WelcomeDesk,
};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(WebNavbar)]
    #[route("/")]
    Home {},
    #[route("/statistics/graph")]
    StatisticsGraph {},
    #[route("/statistics/export")]
    StatisticsExport {},
    #[route("/welcome-desk")]
    WelcomeDesk {},
    #[route("/shifts/warnings")]
    ShiftWarnings {},
    #[route("/shifts/qualifications")]
    Qualifications {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn nav_home(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Home {},
        "{label}"
    })
}
fn nav_graph(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::StatisticsGraph {},
        "{label}"
    })
}
fn nav_export(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::StatisticsExport {},
        "{label}"
    })
}
fn nav_welcome_desk(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::WelcomeDesk {},
        "{label}"
    })
}
fn nav_warnings(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::ShiftWarnings {},
        "{label}"
    })
}
fn nav_qualifications(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Qualifications {},
        "{label}"
    })
}

fn main() {
    dioxus::logger::init(Level::INFO).expect("logger already initialised");
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    {
        ui::i18n::init();
        register_nav(NavBuilder {
            home: nav_home,
            graph: nav_graph,
            export: nav_export,
            welcome_desk: nav_welcome_desk,
            warnings: nav_warnings,
            qualifications: nav_qualifications,
        });
    }

    use_context_provider(|| {
        let config = UiConfig::load();
        info!(api = %config.resolved_api_base(), "tapir islands starting");
        config
    });
    use_context_provider(|| Signal::new("en-US".to_string()));

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        Router::<Route> {}
    }
}

/// Web-specific layout around the shared `AppNavbar`, which lets the shared
/// crate stay unaware of the `Route` enum.
#[component]
fn WebNavbar() -> Element {
    rsx! {
        AppNavbar { }
        Outlet::<Route> {}
    }
}
