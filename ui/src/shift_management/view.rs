use api::{EntryKind, Language, ShiftsApi};
use dioxus::prelude::*;
use futures_util::StreamExt;
use tracing::info;

use crate::core::config::{use_api_client, use_ui_config};

use super::editor::{run_save, EditorRow, EntryEditor, RowKey};

#[derive(Debug, Clone, Copy)]
enum EditorEvent {
    Save(RowKey),
    ConfirmDelete,
}

fn title(kind: EntryKind) -> String {
    match kind {
        EntryKind::SlotWarning => crate::t!("shifts-warnings-title"),
        EntryKind::UserCapability => crate::t!("shifts-qualifications-title"),
    }
}

fn add_label(kind: EntryKind) -> String {
    match kind {
        EntryKind::SlotWarning => crate::t!("shifts-add-warning"),
        EntryKind::UserCapability => crate::t!("shifts-add-qualification"),
    }
}

/// Editable table of shift warnings or qualifications, one column per language.
#[component]
pub fn EntryEditorCard(kind: EntryKind) -> Element {
    let config = use_ui_config();
    let client = use_api_client(&config);
    let mut editor = use_signal(EntryEditor::new);

    {
        let client = client.clone();
        use_future(move || {
            let client = client.clone();
            async move {
                let outcome = client.list_entries(kind).await;
                editor.with_mut(|e| e.finish_load(outcome));
            }
        });
    }

    let languages = {
        let client = client.clone();
        use_resource(move || {
            let client = client.clone();
            async move { client.languages().await.map_err(|err| err.to_string()) }
        })
    };

    let worker = use_coroutine(move |mut rx: UnboundedReceiver<EditorEvent>| {
        let client = client.clone();
        async move {
            info!(?kind, "entry editor started");
            while let Some(event) = rx.next().await {
                match event {
                    EditorEvent::Save(row) => {
                        let Some(request) = editor.with_mut(|e| e.begin_save(row)) else {
                            continue;
                        };
                        let outcome = run_save(&client, kind, &request).await;
                        editor.with_mut(|e| e.finish_save(request.row(), outcome));
                    }
                    EditorEvent::ConfirmDelete => {
                        let Some(request) = editor.with_mut(|e| e.confirm_delete()) else {
                            continue;
                        };
                        let outcome = client.delete_entry(kind, request.id).await;
                        editor.with_mut(|e| e.finish_delete(request.row, outcome));
                    }
                }
            }
        }
    });

    let (language_list, languages_error) = match &*languages.read() {
        Some(Ok(list)) => (list.clone(), None),
        Some(Err(err)) => (Vec::new(), Some(err.clone())),
        None => (Vec::new(), None),
    };

    let current = editor.read();
    let loading = current.is_loading();
    let error = current.error().map(str::to_string).or(languages_error);
    let rows = current.rows().to_vec();
    let prompt = current.deletion_prompt();
    drop(current);

    rsx! {
        div { class: "card",
            div { class: "card-header", h5 { {title(kind)} } }
            div { class: "card-body",
                if let Some(err) = error {
                    div { class: "alert alert-danger", "{err}" }
                }
                if loading {
                    div { class: "spinner-border", role: "status" }
                } else {
                    table { class: "table table-striped",
                        thead {
                            tr {
                                for language in language_list.iter() {
                                    th { key: "{language.short_name}", "{language.display_name}" }
                                }
                                th { {crate::t!("shifts-column-actions")} }
                            }
                        }
                        tbody {
                            for row in rows.into_iter() {
                                EntryRow {
                                    key: "{row.key()}",
                                    row,
                                    languages: language_list.clone(),
                                    on_edit: move |(row, language, name): (RowKey, String, String)| {
                                        editor.with_mut(|e| e.set_translation(row, &language, name));
                                    },
                                    on_save: move |row: RowKey| worker.send(EditorEvent::Save(row)),
                                    on_delete: move |row: RowKey| editor.with_mut(|e| e.ask_delete(row)),
                                }
                            }
                        }
                    }
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| {
                            editor.with_mut(|e| e.add_row());
                        },
                        {add_label(kind)}
                    }
                }
            }
            if let Some(prompt) = prompt {
                div { class: "card border-danger mt-2",
                    div { class: "card-body",
                        p {
                            {crate::t!("shifts-delete-question")}
                            " "
                            strong {
                                {prompt.name.clone().unwrap_or_else(|| crate::t!("shifts-no-name"))}
                            }
                        }
                        if prompt.shifts.is_empty() {
                            p { {crate::t!("shifts-not-used")} }
                        } else {
                            p { {crate::t!("shifts-used-in")} }
                            ul {
                                for shift in prompt.shifts.iter() {
                                    li { "{shift}" }
                                }
                            }
                        }
                        button {
                            class: "btn btn-outline-secondary me-2",
                            onclick: move |_| editor.with_mut(|e| e.cancel_delete()),
                            {crate::t!("shifts-cancel")}
                        }
                        button {
                            class: "btn btn-danger",
                            onclick: move |_| worker.send(EditorEvent::ConfirmDelete),
                            {crate::t!("shifts-delete")}
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn EntryRow(
    row: EditorRow,
    languages: Vec<Language>,
    on_edit: EventHandler<(RowKey, String, String)>,
    on_save: EventHandler<RowKey>,
    on_delete: EventHandler<RowKey>,
) -> Element {
    let key = row.key();
    let busy = row.is_busy();
    let cells: Vec<(String, String)> = languages
        .iter()
        .map(|language| {
            let name = row.translation(&language.short_name).to_string();
            (language.short_name.clone(), name)
        })
        .collect();
    let save_class = if row.is_confirmed() {
        "btn btn-success me-2"
    } else {
        "btn btn-outline-primary me-2"
    };

    let row_class = if row.id().is_none() { "table-warning" } else { "" };

    rsx! {
        tr { class: row_class,
            for (language, name) in cells {
                td { key: "{language}",
                    input {
                        class: "form-control",
                        value: "{name}",
                        disabled: busy,
                        oninput: move |evt: FormEvent| {
                            on_edit.call((key, language.clone(), evt.value()))
                        },
                    }
                }
            }
            td {
                button {
                    class: save_class,
                    disabled: busy,
                    onclick: move |_| on_save.call(key),
                    if row.is_confirmed() {
                        {crate::t!("shifts-saved")}
                    } else {
                        {crate::t!("shifts-save")}
                    }
                }
                button {
                    class: "btn btn-outline-danger",
                    disabled: busy,
                    onclick: move |_| on_delete.call(key),
                    {crate::t!("shifts-delete")}
                }
            }
        }
    }
}
