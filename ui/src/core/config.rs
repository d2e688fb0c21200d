//! Runtime configuration of the islands.
//!
//! The server-rendered page embeds a JSON object in
//! `<script id="tapir-ui-config" type="application/json">`. Every field is
//! optional; anything missing or unreadable falls back to the defaults below.

use api::HttpClient;
use dioxus::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::platform;
use crate::statistics::dates::Granularity;

/// Id of the element holding the JSON configuration.
pub const CONFIG_ELEMENT_ID: &str = "tapir-ui-config";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Base URL of the REST API. Empty means "same origin as the page".
    pub api_base_url: String,
    /// Django CSRF token of the page, sent with create, update and delete
    /// requests.
    pub csrf_token: String,
    pub graph: GraphDefaults,
    pub welcome_desk: WelcomeDeskConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphDefaults {
    pub months_back: u32,
    pub granularity: Granularity,
    pub include_today: bool,
    /// Colour-vision mode for dataset colours, `""` for none.
    pub colourblindness: String,
}

impl Default for GraphDefaults {
    fn default() -> Self {
        Self {
            months_back: 12,
            granularity: Granularity::FirstOfMonth,
            include_today: false,
            colourblindness: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WelcomeDeskConfig {
    /// Inputs with fewer characters than this do not hit the API. The input
    /// is counted as typed, whitespace included.
    pub min_query_len: usize,
}

impl Default for WelcomeDeskConfig {
    fn default() -> Self {
        Self { min_query_len: 1 }
    }
}

impl UiConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads the page configuration, falling back to defaults.
    pub fn load() -> Self {
        let Some(raw) = platform::element_text(CONFIG_ELEMENT_ID) else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable ui config");
                Self::default()
            }
        }
    }

    /// API base URL with the page origin filled in when none was configured.
    pub fn resolved_api_base(&self) -> String {
        if !self.api_base_url.is_empty() {
            return self.api_base_url.clone();
        }
        platform::page_origin().unwrap_or_default()
    }
}

/// Configuration provided by an ancestor component, or read from the page.
pub fn use_ui_config() -> UiConfig {
    use_hook(|| try_consume_context::<UiConfig>().unwrap_or_else(UiConfig::load))
}

/// REST client for the component's lifetime.
pub fn use_api_client(config: &UiConfig) -> HttpClient {
    let base = config.resolved_api_base();
    let token = config.csrf_token.clone();
    use_hook(move || HttpClient::new(base).with_csrf_token(token))
}
