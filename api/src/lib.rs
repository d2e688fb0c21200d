//! HTTP boundary for the Tapir frontend islands.
//!
//! The server exposes one value per call for the statistics graph, list
//! endpoints for datasets and export columns, a member search for the
//! welcome desk, and CRUD endpoints for shift warnings and qualifications.
//! Islands depend on the traits below so the fetch logic can be driven by
//! fakes in tests.

mod client;
mod dto;
mod errors;

pub use client::HttpClient;
pub use dto::{
    format_wire_date, DatapointExport, Dataset, DatasetId, EntryKind, EntryTranslation,
    ExportColumn, Language, ShareOwnerForWelcomeDesk, TranslatedEntry,
};
pub use errors::ApiError;

use async_trait::async_trait;
use time::Date;

/// Statistics endpoints consumed by the graph and export islands.
#[async_trait(?Send)]
pub trait StatisticsApi {
    /// Value of `dataset` at `at_date`, `None` when the server has no data for
    /// that day. With `relative` the server returns the difference to the first
    /// day of the previous month.
    async fn graph_point(
        &self,
        dataset: &DatasetId,
        at_date: Date,
        relative: bool,
    ) -> Result<Option<f64>, ApiError>;

    /// Datasets with colours picked for the given colour-vision mode (`""` = none).
    async fn available_datasets(&self, colourblindness: &str) -> Result<Vec<Dataset>, ApiError>;

    async fn available_colourblindness_types(&self) -> Result<Vec<String>, ApiError>;

    async fn available_export_columns(&self) -> Result<Vec<ExportColumn>, ApiError>;

    async fn export_dataset(
        &self,
        dataset: &DatasetId,
        columns: &[String],
        at_date: Date,
    ) -> Result<Vec<DatapointExport>, ApiError>;
}

/// Member lookup used at the shop entrance.
#[async_trait(?Send)]
pub trait WelcomeDeskApi {
    async fn search(&self, input: &str) -> Result<Vec<ShareOwnerForWelcomeDesk>, ApiError>;
}

/// Shift admin endpoints for the translated warning and qualification lists.
///
/// `translations` maps a language code to the name in that language. An update
/// replaces every translation of the entry.
#[async_trait(?Send)]
pub trait ShiftsApi {
    async fn languages(&self) -> Result<Vec<Language>, ApiError>;

    async fn list_entries(&self, kind: EntryKind) -> Result<Vec<TranslatedEntry>, ApiError>;

    /// Returns the id of the new entry.
    async fn create_entry(
        &self,
        kind: EntryKind,
        translations: &[(String, String)],
    ) -> Result<i64, ApiError>;

    async fn update_entry(
        &self,
        kind: EntryKind,
        id: i64,
        translations: &[(String, String)],
    ) -> Result<(), ApiError>;

    async fn delete_entry(&self, kind: EntryKind, id: i64) -> Result<(), ApiError>;
}
