use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use time::Date;
use tracing::debug;

use crate::dto::{
    format_wire_date, DatapointExport, Dataset, DatasetId, EntryKind, ExportColumn, Language,
    TranslatedEntry,
};
use crate::{ApiError, ShareOwnerForWelcomeDesk, ShiftsApi, StatisticsApi, WelcomeDeskApi};

/// Header Django reads the CSRF token from on unsafe methods.
const CSRF_HEADER: &str = "X-CSRFToken";

/// reqwest-backed implementation of the REST boundary.
///
/// Authentication rides on the session cookie the browser already sends, so
/// the client only needs to know where the API lives and, for writes, the
/// CSRF token of the page.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl HttpClient {
    pub fn new<T: Into<String>>(base_url: T) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            csrf_token: None,
        }
    }

    /// Token sent with every non-GET request. Empty tokens are ignored.
    pub fn with_csrf_token<T: Into<String>>(mut self, token: T) -> Self {
        let token = token.into();
        self.csrf_token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.send_json(Method::GET, path, query, None).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let endpoint = self.endpoint(path);
        debug!(%method, %endpoint, params = query.len(), "request");

        let mut request = self.http.request(method.clone(), &endpoint).query(query);
        if method != Method::GET {
            if let Some(token) = &self.csrf_token {
                request = request.header(CSRF_HEADER, token);
            }
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;
        serde_json::from_str(json_or_null(&body))
            .map_err(|source| ApiError::Decode { endpoint, source })
    }
}

/// Writes may answer `204 No Content`; an empty body reads as `null`.
fn json_or_null(body: &str) -> &str {
    if body.trim().is_empty() {
        "null"
    } else {
        body
    }
}

/// `{"<language>": "<name>", ...}` as the create and update endpoints expect.
fn translations_body(translations: &[(String, String)]) -> Value {
    let map: Map<String, Value> = translations
        .iter()
        .map(|(language, name)| (language.clone(), Value::String(name.clone())))
        .collect();
    Value::Object(map)
}

#[async_trait(?Send)]
impl StatisticsApi for HttpClient {
    async fn graph_point(
        &self,
        dataset: &DatasetId,
        at_date: Date,
        relative: bool,
    ) -> Result<Option<f64>, ApiError> {
        self.get_json(
            "statistics/graph_point",
            &[
                ("dataset", dataset.to_string()),
                ("at_date", format_wire_date(at_date)),
                ("relative", relative.to_string()),
            ],
        )
        .await
    }

    async fn available_datasets(&self, colourblindness: &str) -> Result<Vec<Dataset>, ApiError> {
        self.get_json(
            "statistics/available_datasets",
            &[("colourblindness", colourblindness.to_string())],
        )
        .await
    }

    async fn available_colourblindness_types(&self) -> Result<Vec<String>, ApiError> {
        self.get_json("statistics/available_colourblindness_types", &[])
            .await
    }

    async fn available_export_columns(&self) -> Result<Vec<ExportColumn>, ApiError> {
        self.get_json("statistics/available_export_columns", &[]).await
    }

    async fn export_dataset(
        &self,
        dataset: &DatasetId,
        columns: &[String],
        at_date: Date,
    ) -> Result<Vec<DatapointExport>, ApiError> {
        let mut query = vec![
            ("dataset", dataset.to_string()),
            ("at_date", format_wire_date(at_date)),
        ];
        query.extend(columns.iter().map(|column| ("export_columns", column.clone())));
        self.get_json("statistics/export_dataset", &query).await
    }
}

#[async_trait(?Send)]
impl WelcomeDeskApi for HttpClient {
    async fn search(&self, input: &str) -> Result<Vec<ShareOwnerForWelcomeDesk>, ApiError> {
        self.get_json("welcomedesk/api/search", &[("search_input", input.to_string())])
            .await
    }
}

#[async_trait(?Send)]
impl ShiftsApi for HttpClient {
    async fn languages(&self) -> Result<Vec<Language>, ApiError> {
        self.get_json("shifts/api/languages", &[]).await
    }

    async fn list_entries(&self, kind: EntryKind) -> Result<Vec<TranslatedEntry>, ApiError> {
        self.get_json(kind.list_path(), &[]).await
    }

    async fn create_entry(
        &self,
        kind: EntryKind,
        translations: &[(String, String)],
    ) -> Result<i64, ApiError> {
        let body = serde_json::json!({ "translations": translations_body(translations) });
        self.send_json(Method::POST, kind.item_path(), &[], Some(body))
            .await
    }

    async fn update_entry(
        &self,
        kind: EntryKind,
        id: i64,
        translations: &[(String, String)],
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "id": id,
            "translations": translations_body(translations),
        });
        let _: Value = self
            .send_json(Method::PATCH, kind.item_path(), &[], Some(body))
            .await?;
        Ok(())
    }

    async fn delete_entry(&self, kind: EntryKind, id: i64) -> Result<(), ApiError> {
        let _: Value = self
            .send_json(Method::DELETE, kind.item_path(), &[("id", id.to_string())], None)
            .await?;
        Ok(())
    }
}
