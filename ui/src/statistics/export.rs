use dioxus::prelude::*;
use time::{macros::format_description, OffsetDateTime};

#[cfg(target_arch = "wasm32")]
use crate::core::platform;

use super::graph::GraphMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ExportStatus {
    Idle,
    Working(&'static str),
    Done(String),
    Error(String),
}

impl ExportStatus {
    /// CSS class and text for the feedback line under the buttons.
    pub(crate) fn feedback(&self) -> Option<(&'static str, String)> {
        match self {
            Self::Idle => None,
            Self::Working(label) => Some(("export-feedback", format!("{label}…"))),
            Self::Done(message) => Some((
                "export-feedback export-feedback--success",
                format!("✅ {message}"),
            )),
            Self::Error(err) => Some((
                "export-feedback export-feedback--error",
                format!("⚠️ {err}"),
            )),
        }
    }
}

/// Serialises the matrix: a `date` column followed by one column per series,
/// one row per sample date. Missing values are empty fields.
pub fn to_delimited(matrix: &GraphMatrix, delimiter: Delimiter) -> String {
    let sep = delimiter.as_char();
    let mut out = String::new();

    let header = std::iter::once("date".to_string())
        .chain(matrix.series.iter().map(|series| series.id.clone()))
        .map(|field| escape_field(&field, sep))
        .collect::<Vec<_>>();
    push_line(&mut out, &header, sep);

    for (row, date) in matrix.dates.iter().enumerate() {
        let fields = std::iter::once(date.label())
            .chain(matrix.series.iter().map(|series| {
                series
                    .data
                    .get(row)
                    .copied()
                    .flatten()
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            }))
            .map(|field| escape_field(&field, sep))
            .collect::<Vec<_>>();
        push_line(&mut out, &fields, sep);
    }

    out
}

fn push_line(out: &mut String, fields: &[String], sep: char) {
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            out.push(sep);
        }
        out.push_str(field);
    }
    out.push('\n');
}

fn escape_field(value: &str, sep: char) -> String {
    if value.is_empty() {
        return String::new();
    }

    let needs_quotes = value.contains(sep) || value.contains('"') || value.contains('\n');
    if needs_quotes {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

pub(crate) fn timestamp_slug() -> String {
    OffsetDateTime::now_utc()
        .format(&format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| "export".into())
}

pub fn export_file_name(slug: &str) -> String {
    format!("tapir graph export {slug}.csv")
}

#[component]
pub fn GraphExportPanel(matrix: GraphMatrix) -> Element {
    let status = use_signal(|| ExportStatus::Idle);
    let busy = use_signal(|| false);
    let disabled = matrix.is_empty() || busy();

    let csv_handler = {
        let matrix = matrix.clone();
        let mut status_signal = status;
        let mut busy_signal = busy;
        move |_| {
            if busy_signal() {
                return;
            }
            busy_signal.set(true);
            status_signal.set(ExportStatus::Working("Preparing CSV"));
            let payload = to_delimited(&matrix, Delimiter::Comma);
            #[cfg(target_arch = "wasm32")]
            {
                platform::spawn_future(async move {
                    let outcome = perform_csv_download(payload).await;
                    finish(status_signal, busy_signal, outcome);
                });
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let outcome = futures::executor::block_on(perform_csv_download(payload));
                finish(status_signal, busy_signal, outcome);
            }
        }
    };

    let copy_handler = {
        let matrix = matrix.clone();
        let mut status_signal = status;
        let mut busy_signal = busy;
        move |_| {
            if busy_signal() {
                return;
            }
            busy_signal.set(true);
            status_signal.set(ExportStatus::Working("Copying"));
            let payload = to_delimited(&matrix, Delimiter::Tab);
            #[cfg(target_arch = "wasm32")]
            {
                platform::spawn_future(async move {
                    let outcome = copy_to_clipboard(payload)
                        .await
                        .map(|_| "Copied to clipboard".to_string());
                    finish(status_signal, busy_signal, outcome);
                });
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let outcome = futures::executor::block_on(copy_to_clipboard(payload))
                    .map(|_| "Copied to clipboard".to_string());
                finish(status_signal, busy_signal, outcome);
            }
        }
    };

    let feedback = status().feedback();

    rsx! {
        div { class: "graph-export",
            button {
                class: "btn btn-outline-primary btn-sm",
                disabled,
                onclick: csv_handler,
                {crate::t!("graph-export-csv")}
            }
            button {
                class: "btn btn-outline-secondary btn-sm",
                disabled,
                onclick: copy_handler,
                {crate::t!("graph-export-copy")}
            }
            if let Some((class, text)) = feedback {
                p { class: "{class}", "{text}" }
            }
        }
    }
}

fn finish(
    mut status: Signal<ExportStatus>,
    mut busy: Signal<bool>,
    outcome: Result<String, String>,
) {
    match outcome {
        Ok(message) => status.set(ExportStatus::Done(message)),
        Err(err) => status.set(ExportStatus::Error(err)),
    }
    busy.set(false);
}

async fn perform_csv_download(payload: String) -> Result<String, String> {
    let filename = export_file_name(&timestamp_slug());
    let saved = download_bytes(&filename, "text/csv", payload.into_bytes()).await?;
    Ok(match saved {
        Some(path) => format!("Saved to {path}"),
        None => format!("Downloaded {filename}"),
    })
}

pub(crate) async fn copy_to_clipboard(payload: String) -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;

        let window = web_sys::window().ok_or("window unavailable")?;
        let document = window.document().ok_or("document unavailable")?;
        let body = document.body().ok_or("missing body")?;

        let textarea = document
            .create_element("textarea")
            .map_err(|_| "Unable to create textarea")?
            .dyn_into::<web_sys::HtmlTextAreaElement>()
            .map_err(|_| "Textarea cast failed")?;
        textarea.set_value(&payload);
        let style = textarea.style();
        style.set_property("position", "fixed").ok();
        style.set_property("opacity", "0").ok();

        body.append_child(&textarea).ok();
        textarea.select();
        let copied = document
            .dyn_ref::<web_sys::HtmlDocument>()
            .and_then(|html| html.exec_command("copy").ok())
            .unwrap_or(false);
        textarea.remove();
        if copied {
            Ok(())
        } else {
            Err("Clipboard copy blocked".into())
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use arboard::Clipboard;

        let mut clipboard = Clipboard::new().map_err(|err| err.to_string())?;
        clipboard.set_text(payload).map_err(|err| err.to_string())
    }
}

/// Web: triggers a browser download and returns `None`.
/// Native: writes into the export directory and returns the path.
async fn download_bytes(
    filename: &str,
    mime: &str,
    bytes: Vec<u8>,
) -> Result<Option<String>, String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let opts = BlobPropertyBag::new();
        opts.set_type(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| "Failed to create blob".to_string())?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Unable to create download".to_string())?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("Document unavailable")?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|_| "Unable to create anchor")?
            .dyn_into()
            .map_err(|_| "Anchor cast failed")?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or("Missing body")?
            .append_child(&anchor)
            .ok();
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url).ok();

        Ok(None)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::fs;
        use std::io::Write;

        let _ = mime;
        let dir = native_export_dir()?;
        fs::create_dir_all(&dir).map_err(|err| err.to_string())?;
        let path = dir.join(filename);
        let mut file = fs::File::create(&path).map_err(|err| err.to_string())?;
        file.write_all(&bytes).map_err(|err| err.to_string())?;
        Ok(Some(path.to_string_lossy().to_string()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn native_export_dir() -> Result<std::path::PathBuf, String> {
    let dirs = directories::ProjectDirs::from("org", "Tapir", "Tapir")
        .ok_or("Unable to determine export directory")?;
    Ok(dirs.data_dir().join("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::dates::SampleDate;
    use crate::statistics::graph::{ChartKind, GraphSeries, PointStyle};
    use time::macros::date;

    fn series(id: &str, data: Vec<Option<f64>>) -> GraphSeries {
        GraphSeries {
            id: id.to_string(),
            label: id.to_string(),
            kind: ChartKind::Line,
            color: "#000".to_string(),
            point_style: PointStyle::Circle,
            data,
        }
    }

    fn matrix() -> GraphMatrix {
        GraphMatrix {
            dates: vec![
                SampleDate::new(date!(2024 - 01 - 01)),
                SampleDate::new(date!(2024 - 02 - 01)),
            ],
            series: vec![
                series("members", vec![Some(10.0), None]),
                series("members_relative", vec![Some(-2.5), Some(4.0)]),
            ],
        }
    }

    #[test]
    fn csv_has_date_column_and_empty_gaps() {
        assert_eq!(
            to_delimited(&matrix(), Delimiter::Comma),
            "date,members,members_relative\n01.01.2024,10,-2.5\n01.02.2024,,4\n"
        );
    }

    #[test]
    fn tab_form_is_used_for_spreadsheets() {
        let tsv = to_delimited(&matrix(), Delimiter::Tab);
        assert_eq!(tsv.lines().next(), Some("date\tmembers\tmembers_relative"));
    }

    #[test]
    fn fields_with_separators_are_quoted() {
        assert_eq!(escape_field("a,b", ','), "\"a,b\"");
        assert_eq!(escape_field("a,b", '\t'), "a,b");
        assert_eq!(escape_field("say \"hi\"", ','), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn file_name_carries_the_timestamp() {
        assert_eq!(
            export_file_name("20240301_101500"),
            "tapir graph export 20240301_101500.csv"
        );
        assert_eq!(timestamp_slug().len(), 15);
    }
}
