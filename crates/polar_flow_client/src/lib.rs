//! Minimal Polar Flow client: cookie-authenticated session, activity listing
//! and CSV export reshaping.

use async_trait::async_trait;
use schemars::JsonSchema;
use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;

pub mod activity;
pub mod client;
pub mod config;
pub mod http_client;
pub mod reshape;
pub mod window;

pub use activity::{Activity, ExportFormat};
pub use client::{ActivityList, FlowClient};
pub use reshape::{CsvExport, HeaderMap, Table, reshape};
pub use window::DateWindow;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication failed with status {status}: {body}")]
    AuthenticationFailed { status: u16, body: String },
    #[error("request to {url} failed with status {status}: {body}")]
    Transport {
        url: String,
        status: u16,
        body: String,
    },
    #[error("unexpected response from {url}: {reason}")]
    UnexpectedResponse { url: String, reason: String },
    #[error("activity #{index} is not a valid record: {reason}")]
    InvalidRecord { index: usize, reason: String },
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),
    #[error("attribute {field} has unexpected shape: {reason}")]
    UnexpectedField { field: String, reason: String },
    #[error("payload too short at {stage} stage: expected at least 4 lines, got {lines}")]
    PayloadTooShort { stage: PayloadStage, lines: usize },
    #[error("malformed payload at {stage} stage: {reason}")]
    MalformedPayload { stage: PayloadStage, reason: String },
    #[error("unknown export format: {0}")]
    UnknownExportFormat(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl FlowError {
    /// HTTP status attached to the error, if the remote service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            FlowError::AuthenticationFailed { status, .. } | FlowError::Transport { status, .. } => {
                Some(*status)
            }
            FlowError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Section of a CSV export being read when reshaping failed.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PayloadStage {
    Decode,
    Header,
    Columns,
    Rows,
}

impl std::fmt::Display for PayloadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PayloadStage::Decode => "decode",
            PayloadStage::Header => "header",
            PayloadStage::Columns => "columns",
            PayloadStage::Rows => "rows",
        };
        f.write_str(name)
    }
}

/// Authenticated access to the Flow web service.
///
/// One implementor owns one cookie session. Every call is a single attempt;
/// failures surface immediately with the status code attached.
#[async_trait]
pub trait FlowSession: Send + Sync {
    /// Service root, without a trailing slash (e.g. `https://flow.polar.com`).
    fn base_url(&self) -> &str;

    /// Prime the session cookies and post the credentials.
    async fn authenticate(&self, username: &str, password: &SecretString)
    -> Result<(), FlowError>;

    /// Authenticated GET returning a fully parsed JSON body.
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, FlowError>;

    /// Authenticated GET returning the raw body.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FlowError>;
}
