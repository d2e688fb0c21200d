use std::fmt;

use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

/// Identifier of a statistics data provider, e.g. `number_of_active_members`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new<T: Into<String>>(id: T) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: DatasetId,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// CSS colour, e.g. `#318ce7`.
    pub color: String,
    #[serde(default = "default_point_style")]
    pub point_style: String,
}

fn default_point_style() -> String {
    "circle".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportColumn {
    pub column_name: String,
}

/// One member row of a dataset export, keyed by the requested column names.
pub type DatapointExport = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareOwnerForWelcomeDesk {
    pub id: i64,
    pub display_name: String,
    pub can_shop: bool,
    #[serde(default)]
    pub co_purchaser: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub reasons_cannot_shop: Vec<String>,
}

/// Language a shift warning or qualification can be named in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Django language code, e.g. `de`.
    pub short_name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTranslation {
    pub language: String,
    pub name: String,
}

/// A shift-slot warning or a user qualification as listed by the server: one
/// name per language plus the slots that reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedEntry {
    pub id: i64,
    #[serde(default)]
    pub translations: Vec<EntryTranslation>,
    #[serde(default)]
    pub shifts: Vec<String>,
}

/// The two translated lists managed from the shift admin pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    SlotWarning,
    UserCapability,
}

impl EntryKind {
    pub(crate) fn list_path(self) -> &'static str {
        match self {
            Self::SlotWarning => "shifts/shift_slot_warnings/",
            Self::UserCapability => "shifts/shift_user_capabilities/",
        }
    }

    /// Create (POST), partial update (PATCH) and delete (DELETE `?id=`).
    pub(crate) fn item_path(self) -> &'static str {
        match self {
            Self::SlotWarning => "shifts/api/shift_slot_warning",
            Self::UserCapability => "shifts/api/shift_user_capability",
        }
    }
}

/// `YYYY-MM-DD`, the form the server parses `at_date` with.
pub fn format_wire_date(date: Date) -> String {
    date.format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}
