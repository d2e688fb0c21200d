//! Member export of a single dataset with user-picked columns.

use api::{DatapointExport, Dataset, DatasetId};
use indexmap::IndexSet;
use serde_json::Value;
use time::Date;

pub const MISSING_VALUE: &str = "N/A";

/// What the export card has picked so far and the rows last built for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSelection {
    dataset: Option<Dataset>,
    columns: IndexSet<String>,
    date: Date,
    rows: Vec<DatapointExport>,
}

/// Parameters of one `export_dataset` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub dataset: DatasetId,
    pub columns: Vec<String>,
    pub date: Date,
}

impl ExportSelection {
    pub fn new(date: Date) -> Self {
        Self {
            dataset: None,
            columns: IndexSet::new(),
            date,
            rows: Vec::new(),
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn rows(&self) -> &[DatapointExport] {
        &self.rows
    }

    /// Picks the dataset with id `id` among `available`. An unknown or empty id
    /// clears the choice.
    pub fn select_dataset(&mut self, id: &str, available: &[Dataset]) {
        match available.iter().find(|dataset| dataset.id.as_str() == id) {
            Some(dataset) => {
                self.dataset = Some(dataset.clone());
                self.rows.clear();
            }
            None => self.dataset = None,
        }
    }

    pub fn add_column(&mut self, column: &str) {
        if column.is_empty() {
            return;
        }
        self.columns.insert(column.to_string());
        self.rows.clear();
    }

    pub fn remove_column(&mut self, column: &str) {
        self.columns.shift_remove(column);
        self.rows.clear();
    }

    pub fn set_date(&mut self, date: Date) {
        self.date = date;
    }

    pub fn set_rows(&mut self, rows: Vec<DatapointExport>) {
        self.rows = rows;
    }

    pub fn request(&self) -> Result<ExportRequest, String> {
        let dataset = self
            .dataset
            .as_ref()
            .ok_or("You must first select which dataset you want to export")?;
        Ok(ExportRequest {
            dataset: dataset.id.clone(),
            columns: self.columns.iter().cloned().collect(),
            date: self.date,
        })
    }

    pub fn clipboard_text(&self) -> String {
        let columns: Vec<&str> = self.columns().collect();
        clipboard_text(&columns, &self.rows)
    }
}

/// Header line of column names followed by one comma-joined line per row.
pub fn clipboard_text(columns: &[&str], rows: &[DatapointExport]) -> String {
    let mut text = columns.join(",");
    for row in rows {
        text.push('\n');
        let line = columns
            .iter()
            .map(|column| render_value(lookup(row, column)))
            .collect::<Vec<_>>()
            .join(",");
        text.push_str(&line);
    }
    text
}

/// Cell text as shown in the preview table and the clipboard.
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING_VALUE.to_string(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(Value::String(text)) if text.is_empty() => MISSING_VALUE.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" - "),
        Some(other) => other.to_string(),
    }
}

/// Rows may carry either the snake_case column name or its camelCase form.
pub fn lookup<'a>(row: &'a DatapointExport, column: &str) -> Option<&'a Value> {
    row.get(column).or_else(|| row.get(&snake_to_camel(column)))
}

fn snake_to_camel(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (index, word) in input.split('_').enumerate() {
        if index == 0 {
            out.push_str(&word.to_lowercase());
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}
