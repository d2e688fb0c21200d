use api::ShareOwnerForWelcomeDesk;
use dioxus::prelude::*;

use crate::core::config::{use_api_client, use_ui_config};

use super::search::{run_query, DetailTone, SearchController, SearchStep};

#[component]
pub fn WelcomeDeskCard() -> Element {
    let config = use_ui_config();
    let client = use_api_client(&config);
    let min_len = config.welcome_desk.min_query_len;
    let mut search = use_signal(move || SearchController::new(min_len));

    let on_input = move |evt: FormEvent| {
        let input = evt.value();
        let step = search.with_mut(|s| s.begin(&input));
        if let SearchStep::Query {
            generation,
            input,
            registration,
        } = step
        {
            let client = client.clone();
            spawn(async move {
                let outcome = run_query(&client, &input, registration).await;
                search.with_mut(|s| s.finish(generation, outcome));
            });
        }
    };

    let current = search.read();
    let has_input = !current.input().is_empty();
    let loading = current.is_loading();
    let error = current.error().map(str::to_string);
    let results = current.results().to_vec();
    let selected = current.selected().cloned();
    drop(current);
    let selected_id = selected.as_ref().map(|member| member.id);

    rsx! {
        div { class: "card-group",
            div { class: "card",
                div { class: "card-header d-flex align-items-center justify-content-between",
                    h5 { {crate::t!("welcome-title")} }
                    input {
                        class: "form-control w-auto",
                        placeholder: crate::t!("welcome-search-placeholder"),
                        oninput: on_input,
                    }
                }
                div { class: "card-body",
                    if loading {
                        div { class: "spinner-border", role: "status" }
                    } else if let Some(err) = error {
                        div { class: "alert alert-danger", "{err}" }
                    } else if !has_input || results.is_empty() {
                        div { class: "alert alert-primary", {crate::t!("welcome-search-hint")} }
                    } else {
                        table { class: "table table-striped table-hover",
                            thead {
                                tr {
                                    th { {crate::t!("welcome-column-name")} }
                                    th { {crate::t!("welcome-column-can-shop")} }
                                }
                            }
                            tbody {
                                for member in results.iter().cloned() {
                                    tr {
                                        key: "{member.id}",
                                        class: if selected_id == Some(member.id) { "table-primary" } else { "" },
                                        style: "cursor: pointer",
                                        onclick: move |_| search.with_mut(|s| s.toggle_selection(member.id)),
                                        td { "{member.display_name}" }
                                        td {
                                            if member.can_shop {
                                                {crate::t!("welcome-yes")}
                                            } else {
                                                {crate::t!("welcome-no")}
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
            if let Some(member) = selected {
                MemberDetails { member }
            }
        }
    }
}

#[component]
fn MemberDetails(member: ShareOwnerForWelcomeDesk) -> Element {
    let tone = DetailTone::for_member(&member).css_class();
    let can_shop = if member.can_shop {
        crate::t!("welcome-yes")
    } else {
        crate::t!("welcome-no")
    };
    let co_purchaser = member
        .co_purchaser
        .clone()
        .unwrap_or_else(|| crate::t!("welcome-none"));

    rsx! {
        div { class: "card {tone}",
            div { class: "card-header", h5 { {crate::t!("welcome-details-title")} } }
            div { class: "card-body",
                div { {crate::t!("welcome-member")} ": {member.display_name}" }
                div { {crate::t!("welcome-column-can-shop")} ": {can_shop}" }
                if !member.warnings.is_empty() {
                    div {
                        {crate::t!("welcome-warnings")}
                        ul {
                            for warning in member.warnings.iter() {
                                li { "{warning}" }
                            }
                        }
                    }
                }
                if !member.reasons_cannot_shop.is_empty() {
                    div {
                        {crate::t!("welcome-reasons")}
                        ul {
                            for reason in member.reasons_cannot_shop.iter() {
                                li { "{reason}" }
                            }
                        }
                    }
                }
                div { {crate::t!("welcome-co-purchaser")} ": {co_purchaser}" }
            }
        }
    }
}
