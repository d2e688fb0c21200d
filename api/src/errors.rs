use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("could not decode the response of {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// The request was cancelled because a newer one superseded it.
    #[error("request aborted")]
    Aborted,
}

impl ApiError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
