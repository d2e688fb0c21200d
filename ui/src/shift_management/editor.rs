//! Local editing of a translated list (shift warnings or qualifications).
//!
//! Rows are edited in place and saved one at a time. A row without a server
//! id is new: saving creates it, deleting just drops it. Deleting a saved row
//! goes through a confirmation step first because the entry may still be
//! referenced by shift slots.

use api::{ApiError, EntryKind, ShiftsApi, TranslatedEntry};
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Stable key of a row for the lifetime of the editor, independent of the
/// server id a new row only gets after its first save.
pub type RowKey = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct EditorRow {
    key: RowKey,
    id: Option<i64>,
    translations: IndexMap<String, String>,
    shifts: Vec<String>,
    busy: bool,
    confirmed: bool,
}

impl EditorRow {
    pub fn key(&self) -> RowKey {
        self.key
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Name in `language`, empty when there is none yet.
    pub fn translation(&self, language: &str) -> &str {
        self.translations
            .get(language)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// A save or delete request for this row is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Saved, and not edited since.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    fn payload(&self) -> Vec<(String, String)> {
        self.translations
            .iter()
            .map(|(language, name)| (language.clone(), name.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    Create {
        row: RowKey,
        translations: Vec<(String, String)>,
    },
    Update {
        row: RowKey,
        id: i64,
        translations: Vec<(String, String)>,
    },
}

impl SaveRequest {
    pub fn row(&self) -> RowKey {
        match self {
            Self::Create { row, .. } | Self::Update { row, .. } => *row,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRequest {
    pub row: RowKey,
    pub id: i64,
}

/// What the confirmation dialog shows before a saved entry is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionPrompt {
    /// First translation of the entry, `None` when it has no name at all.
    pub name: Option<String>,
    pub shifts: Vec<String>,
}

#[derive(Debug, Default)]
pub struct EntryEditor {
    rows: Vec<EditorRow>,
    next_key: RowKey,
    pending_deletion: Option<RowKey>,
    loading: bool,
    error: Option<String>,
}

impl EntryEditor {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[EditorRow] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn row_mut(&mut self, key: RowKey) -> Option<&mut EditorRow> {
        self.rows.iter_mut().find(|row| row.key == key)
    }

    fn push_row(&mut self, id: Option<i64>, translations: IndexMap<String, String>, shifts: Vec<String>) -> RowKey {
        let key = self.next_key;
        self.next_key += 1;
        self.rows.push(EditorRow {
            key,
            id,
            translations,
            shifts,
            busy: false,
            confirmed: false,
        });
        key
    }

    /// Replaces all rows with the server's list.
    pub fn finish_load(&mut self, outcome: Result<Vec<TranslatedEntry>, ApiError>) {
        self.loading = false;
        match outcome {
            Ok(entries) => {
                self.rows.clear();
                self.pending_deletion = None;
                for entry in entries {
                    let translations = entry
                        .translations
                        .into_iter()
                        .map(|translation| (translation.language, translation.name))
                        .collect();
                    self.push_row(Some(entry.id), translations, entry.shifts);
                }
            }
            Err(err) => {
                warn!(error = %err, "loading translated entries failed");
                self.error = Some(format!("Could not load the list: {err}"));
            }
        }
    }

    /// Appends an empty, unsaved row.
    pub fn add_row(&mut self) -> RowKey {
        self.push_row(None, IndexMap::new(), Vec::new())
    }

    pub fn set_translation(&mut self, row: RowKey, language: &str, name: String) {
        if let Some(row) = self.row_mut(row) {
            row.translations.insert(language.to_string(), name);
            row.confirmed = false;
        }
    }

    /// Marks the row busy and describes the request to send, or `None` while
    /// the row is already busy.
    pub fn begin_save(&mut self, row: RowKey) -> Option<SaveRequest> {
        let row = self.row_mut(row).filter(|row| !row.busy)?;
        row.busy = true;
        let translations = row.payload();
        Some(match row.id {
            None => SaveRequest::Create {
                row: row.key,
                translations,
            },
            Some(id) => SaveRequest::Update {
                row: row.key,
                id,
                translations,
            },
        })
    }

    /// `Ok(Some(id))` is the answer to a create, `Ok(None)` to an update.
    pub fn finish_save(&mut self, row: RowKey, outcome: Result<Option<i64>, ApiError>) {
        let Some(entry) = self.row_mut(row) else {
            return;
        };
        entry.busy = false;
        match outcome {
            Ok(created) => {
                if let Some(id) = created {
                    entry.id = Some(id);
                }
                entry.confirmed = true;
                self.error = None;
            }
            Err(err) => {
                warn!(error = %err, "saving translated entry failed");
                self.error = Some(format!("Could not save: {err}"));
            }
        }
    }

    pub fn ask_delete(&mut self, row: RowKey) {
        if self.rows.iter().any(|entry| entry.key == row) {
            self.pending_deletion = Some(row);
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_deletion = None;
    }

    pub fn deletion_prompt(&self) -> Option<DeletionPrompt> {
        let key = self.pending_deletion?;
        let row = self.rows.iter().find(|row| row.key == key)?;
        Some(DeletionPrompt {
            name: row.translations.values().next().cloned(),
            shifts: row.shifts.clone(),
        })
    }

    /// Unsaved rows are dropped right away; saved ones become busy and the
    /// returned request has to be sent.
    pub fn confirm_delete(&mut self) -> Option<DeleteRequest> {
        let key = self.pending_deletion.take()?;
        let position = self.rows.iter().position(|row| row.key == key)?;
        match self.rows[position].id {
            None => {
                self.rows.remove(position);
                None
            }
            Some(id) => {
                self.rows[position].busy = true;
                Some(DeleteRequest { row: key, id })
            }
        }
    }

    pub fn finish_delete(&mut self, row: RowKey, outcome: Result<(), ApiError>) {
        match outcome {
            Ok(()) => {
                debug!(row, "translated entry deleted");
                self.rows.retain(|entry| entry.key != row);
            }
            Err(err) => {
                warn!(error = %err, "deleting translated entry failed");
                if let Some(entry) = self.row_mut(row) {
                    entry.busy = false;
                }
                self.error = Some(format!("Could not delete: {err}"));
            }
        }
    }
}

/// Sends a save produced by [`EntryEditor::begin_save`].
pub async fn run_save<A>(
    api: &A,
    kind: EntryKind,
    request: &SaveRequest,
) -> Result<Option<i64>, ApiError>
where
    A: ShiftsApi + ?Sized,
{
    match request {
        SaveRequest::Create { translations, .. } => {
            api.create_entry(kind, translations).await.map(Some)
        }
        SaveRequest::Update {
            id, translations, ..
        } => api.update_entry(kind, *id, translations).await.map(|()| None),
    }
}
