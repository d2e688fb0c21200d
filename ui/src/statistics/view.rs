use api::{Dataset, DatasetId, StatisticsApi};
use dioxus::prelude::*;
use futures_util::StreamExt;
use tracing::{debug, info};

use crate::core::config::{use_api_client, use_ui_config};
use crate::core::format::format_progress;
use crate::core::platform;

use super::cache::Variant;
use super::chart::GraphChart;
use super::dates::{format_input_date, parse_input_date, DateRange, Granularity};
use super::engine::{drain, GraphHandle, GraphState};
use super::export::{copy_to_clipboard, GraphExportPanel};
use super::fancy_export::{lookup, render_value, ExportSelection};

impl GraphHandle for Signal<GraphState> {
    fn update<R>(&mut self, change: impl FnOnce(&mut GraphState) -> R) -> R {
        self.with_mut(change)
    }
}

#[derive(Debug, Clone, Copy)]
enum GraphEvent {
    /// Selection or range changed; fetch whatever is still missing.
    Refresh,
}

#[component]
pub fn FancyGraphCard() -> Element {
    let config = use_ui_config();
    let client = use_api_client(&config);
    let today = use_hook(platform::today);

    let defaults = config.graph.clone();
    let mut state = use_signal(move || {
        let range = DateRange::default_for(
            today,
            defaults.months_back,
            defaults.granularity,
            defaults.include_today,
        );
        GraphState::new(range, today)
    });
    let mut colourblindness = use_signal(|| config.graph.colourblindness.clone());

    let datasets = {
        let client = client.clone();
        use_resource(move || {
            let client = client.clone();
            let mode = colourblindness();
            async move {
                client
                    .available_datasets(&mode)
                    .await
                    .map_err(|err| err.to_string())
            }
        })
    };

    let colour_modes = {
        let client = client.clone();
        use_resource(move || {
            let client = client.clone();
            async move {
                client
                    .available_colourblindness_types()
                    .await
                    .map_err(|err| err.to_string())
            }
        })
    };

    let fetcher = use_coroutine(move |mut rx: UnboundedReceiver<GraphEvent>| {
        let client = client.clone();
        let mut handle = state;
        async move {
            info!("statistics graph fetcher started");
            while let Some(GraphEvent::Refresh) = rx.next().await {
                let stored = drain(&mut handle, &client).await;
                debug!(stored, "graph fetch chain settled");
            }
        }
    });

    let (dataset_list, datasets_error) = match &*datasets.read() {
        Some(Ok(list)) => (list.clone(), None),
        Some(Err(err)) => (Vec::new(), Some(err.clone())),
        None => (Vec::new(), None),
    };
    let datasets_loading = datasets.read().is_none();
    let modes: Vec<String> = match &*colour_modes.read() {
        Some(Ok(modes)) => modes.clone(),
        _ => Vec::new(),
    };

    let snapshot = state.read();
    let matrix = snapshot.project(&dataset_list);
    let range = snapshot.range().clone();
    let fetch_error = snapshot.error().map(str::to_string);
    let fetching = snapshot.is_fetching();
    let (fetched, total) = snapshot.progress();
    // Stale dates left over from a wider range may still be fetching.
    let in_range_pending = snapshot.pending() > 0;
    let range_incomplete = snapshot.dates().is_empty();
    let enabled = snapshot.enabled().clone();
    drop(snapshot);

    let from_value = range.from().map(format_input_date).unwrap_or_default();
    let to_value = range.to().map(format_input_date).unwrap_or_default();
    let granularity = range.granularity().as_str();
    let include_today = range.include_today();

    rsx! {
        div { class: "card",
            div { class: "card-header d-flex align-items-center justify-content-between",
                h5 { {crate::t!("graph-title")} }
                if fetching && in_range_pending {
                    span { class: "graph-progress",
                        {crate::t!("graph-loading")}
                        " "
                        {format_progress(fetched, total)}
                    }
                }
            }
            div { class: "card-body",
                if let Some(err) = fetch_error {
                    div { class: "alert alert-danger", "{err}" }
                }
                if range_incomplete {
                    div { class: "alert alert-primary", {crate::t!("graph-range-incomplete")} }
                }
                GraphChart { matrix: matrix.clone() }
                GraphExportPanel { matrix }
            }
        }

        div { class: "card",
            div { class: "card-header", h5 { {crate::t!("graph-datasets-title")} } }
            div { class: "card-body",
                if let Some(err) = datasets_error {
                    div { class: "alert alert-danger", "{err}" }
                } else if datasets_loading {
                    div { class: "spinner-border", role: "status" }
                } else {
                    table { class: "table table-sm table-hover",
                        thead {
                            tr {
                                th { {crate::t!("graph-dataset-column")} }
                                th { {crate::t!("graph-absolute-column")} }
                                th { {crate::t!("graph-relative-column")} }
                            }
                        }
                        tbody {
                            for dataset in dataset_list.iter().cloned() {
                                DatasetRow {
                                    key: "{dataset.id}",
                                    absolute: enabled.is_enabled(Variant::Absolute, &dataset.id),
                                    relative: enabled.is_enabled(Variant::Relative, &dataset.id),
                                    dataset,
                                    on_toggle: move |(variant, id, on): (Variant, DatasetId, bool)| {
                                        state.with_mut(|s| s.set_enabled(variant, id, on));
                                        fetcher.send(GraphEvent::Refresh);
                                    },
                                }
                            }
                        }
                    }
                }
            }
        }

        div { class: "card",
            div { class: "card-header", h5 { {crate::t!("graph-range-title")} } }
            div { class: "card-body d-flex flex-column gap-2",
                label {
                    {crate::t!("graph-range-from")}
                    input {
                        r#type: "date",
                        class: "form-control",
                        value: "{from_value}",
                        oninput: move |evt: FormEvent| {
                            let date = parse_input_date(&evt.value());
                            state.with_mut(|s| s.update_range(today, |r| r.set_from(date)));
                            fetcher.send(GraphEvent::Refresh);
                        },
                    }
                }
                label {
                    {crate::t!("graph-range-to")}
                    input {
                        r#type: "date",
                        class: "form-control",
                        value: "{to_value}",
                        oninput: move |evt: FormEvent| {
                            let date = parse_input_date(&evt.value());
                            state.with_mut(|s| s.update_range(today, |r| r.set_to(date)));
                            fetcher.send(GraphEvent::Refresh);
                        },
                    }
                }
                label {
                    {crate::t!("graph-granularity")}
                    select {
                        class: "form-select",
                        value: "{granularity}",
                        oninput: move |evt: FormEvent| {
                            if let Some(granularity) = Granularity::parse(&evt.value()) {
                                state.with_mut(|s| s.update_range(today, |r| r.set_granularity(granularity)));
                                fetcher.send(GraphEvent::Refresh);
                            }
                        },
                        option { value: "first_of_month", {crate::t!("graph-granularity-first")} }
                        option { value: "last_of_month", {crate::t!("graph-granularity-last")} }
                    }
                }
                label { class: "form-check",
                    input {
                        r#type: "checkbox",
                        class: "form-check-input",
                        checked: include_today,
                        onchange: move |evt: FormEvent| {
                            let checked = evt.checked();
                            state.with_mut(|s| s.update_range(today, |r| r.set_include_today(checked)));
                            fetcher.send(GraphEvent::Refresh);
                        },
                    }
                    {crate::t!("graph-include-today")}
                }
                label {
                    {crate::t!("graph-colourblindness")}
                    select {
                        class: "form-select",
                        value: "{colourblindness}",
                        oninput: move |evt: FormEvent| colourblindness.set(evt.value()),
                        option { value: "", {crate::t!("graph-colourblindness-none")} }
                        for mode in modes.iter().filter(|mode| !mode.is_empty()).cloned() {
                            option { key: "{mode}", value: "{mode}", "{mode}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn DatasetRow(
    dataset: Dataset,
    absolute: bool,
    relative: bool,
    on_toggle: EventHandler<(Variant, DatasetId, bool)>,
) -> Element {
    let absolute_id = dataset.id.clone();
    let relative_id = dataset.id.clone();

    rsx! {
        tr {
            td {
                span { class: "graph-legend__swatch", style: "background:{dataset.color}" }
                strong { "{dataset.display_name}" }
                if !dataset.description.is_empty() {
                    div { class: "text-muted small", "{dataset.description}" }
                }
            }
            td {
                input {
                    r#type: "checkbox",
                    class: "form-check-input",
                    checked: absolute,
                    onchange: move |evt: FormEvent| {
                        on_toggle.call((Variant::Absolute, absolute_id.clone(), evt.checked()))
                    },
                }
            }
            td {
                input {
                    r#type: "checkbox",
                    class: "form-check-input",
                    checked: relative,
                    onchange: move |evt: FormEvent| {
                        on_toggle.call((Variant::Relative, relative_id.clone(), evt.checked()))
                    },
                }
            }
        }
    }
}

#[component]
pub fn FancyExportCard() -> Element {
    let config = use_ui_config();
    let client = use_api_client(&config);
    let today = use_hook(platform::today);

    let mut selection = use_signal(move || ExportSelection::new(today));
    let mut building = use_signal(|| false);
    let mut build_error = use_signal(|| Option::<String>::None);
    let mut copy_feedback = use_signal(|| Option::<String>::None);

    let datasets = {
        let client = client.clone();
        use_resource(move || {
            let client = client.clone();
            async move {
                client
                    .available_datasets("")
                    .await
                    .map_err(|err| err.to_string())
            }
        })
    };
    let columns = {
        let client = client.clone();
        use_resource(move || {
            let client = client.clone();
            async move {
                client
                    .available_export_columns()
                    .await
                    .map(|columns| {
                        columns
                            .into_iter()
                            .map(|column| column.column_name)
                            .collect::<Vec<_>>()
                    })
                    .map_err(|err| err.to_string())
            }
        })
    };

    let build_handler = move |_| {
        if building() {
            return;
        }
        let request = match selection.read().request() {
            Ok(request) => request,
            Err(message) => {
                build_error.set(Some(message));
                return;
            }
        };
        building.set(true);
        build_error.set(None);
        let client = client.clone();
        spawn(async move {
            match client
                .export_dataset(&request.dataset, &request.columns, request.date)
                .await
            {
                Ok(rows) => {
                    debug!(rows = rows.len(), dataset = %request.dataset, "export built");
                    selection.with_mut(|s| s.set_rows(rows));
                }
                Err(err) => build_error.set(Some(err.to_string())),
            }
            building.set(false);
        });
    };

    let copy_handler = move |_| {
        let payload = selection.read().clipboard_text();
        spawn(async move {
            match copy_to_clipboard(payload).await {
                Ok(()) => copy_feedback.set(Some("Copied".to_string())),
                Err(err) => copy_feedback.set(Some(err)),
            }
        });
    };

    let dataset_list: Vec<Dataset> = match &*datasets.read() {
        Some(Ok(list)) => list.clone(),
        _ => Vec::new(),
    };
    let datasets_error = match &*datasets.read() {
        Some(Err(err)) => Some(err.clone()),
        _ => None,
    };
    let (column_list, columns_error) = match &*columns.read() {
        Some(Ok(list)) => (list.clone(), None),
        Some(Err(err)) => (Vec::new(), Some(err.clone())),
        None => (Vec::new(), None),
    };

    let current = selection.read().clone();
    let selected_columns: Vec<String> = current.columns().map(str::to_string).collect();
    let build_label = match current.dataset() {
        Some(dataset) => crate::t!("export-build-for", dataset = dataset.display_name.clone()),
        None => crate::t!("export-pick-dataset"),
    };
    let date_value = format_input_date(current.date());
    let datasets_for_select = dataset_list.clone();

    rsx! {
        div { class: "card",
            div { class: "card-header d-flex align-items-center justify-content-between",
                h5 { {crate::t!("export-title")} }
            }
            div { class: "card-body d-flex flex-column gap-2",
                if let Some(err) = datasets_error {
                    div { class: "alert alert-danger", "{err}" }
                } else {
                    label {
                        {crate::t!("export-pick-dataset")}
                        select {
                            class: "form-select",
                            oninput: move |evt: FormEvent| {
                                let id = evt.value();
                                selection.with_mut(|s| s.select_dataset(&id, &datasets_for_select));
                            },
                            option { value: "" }
                            for dataset in dataset_list.iter() {
                                option { key: "{dataset.id}", value: "{dataset.id}", "{dataset.display_name}" }
                            }
                        }
                    }
                }
                if let Some(dataset) = current.dataset() {
                    div { class: "text-muted", "{dataset.description}" }
                }

                if let Some(err) = columns_error {
                    div { class: "alert alert-danger", "{err}" }
                } else {
                    label {
                        {crate::t!("export-add-column")}
                        select {
                            class: "form-select",
                            oninput: move |evt: FormEvent| {
                                let column = evt.value();
                                selection.with_mut(|s| s.add_column(&column));
                            },
                            option { value: "" }
                            for column in column_list.iter() {
                                option { key: "{column}", value: "{column}", "{column}" }
                            }
                        }
                    }
                }
                div { class: "d-flex flex-row flex-wrap gap-2",
                    for column in selected_columns.iter().cloned() {
                        span {
                            key: "{column}",
                            class: "badge text-bg-primary",
                            style: "cursor: pointer",
                            onclick: {
                                let column = column.clone();
                                move |_| selection.with_mut(|s| s.remove_column(&column))
                            },
                            "{column}"
                        }
                    }
                }
                label {
                    {crate::t!("export-date")}
                    input {
                        r#type: "date",
                        class: "form-control",
                        value: "{date_value}",
                        oninput: move |evt: FormEvent| {
                            if let Some(date) = parse_input_date(&evt.value()) {
                                selection.with_mut(|s| s.set_date(date));
                            }
                        },
                    }
                }
                div { class: "d-flex flex-row gap-2",
                    button {
                        class: "btn btn-outline-secondary",
                        disabled: current.dataset().is_none() || building(),
                        onclick: build_handler,
                        if building() {
                            span { class: "spinner-border spinner-border-sm me-1" }
                        }
                        "{build_label}"
                    }
                    if !current.rows().is_empty() {
                        button {
                            class: "btn btn-outline-secondary",
                            onclick: copy_handler,
                            {crate::t!("export-copy")}
                        }
                    }
                }
                if let Some(message) = copy_feedback() {
                    p { class: "export-feedback", "{message}" }
                }
                if let Some(err) = build_error() {
                    div { class: "alert alert-danger", "{err}" }
                } else {
                    table { class: "table table-striped table-hover table-bordered table-sm",
                        thead {
                            tr {
                                for column in selected_columns.iter() {
                                    th { key: "{column}", "{column}" }
                                }
                            }
                        }
                        tbody {
                            for (index, row) in current.rows().iter().enumerate() {
                                tr { key: "{index}",
                                    for column in selected_columns.iter() {
                                        td { key: "{index}_{column}", {render_value(lookup(row, column))} }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
