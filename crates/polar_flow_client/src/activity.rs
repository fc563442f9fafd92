//! A single training session as listed by the Flow calendar.

use crate::reshape::{CsvExport, reshape_bytes};
use crate::{FlowError, FlowSession};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Field every listed activity carries; keys its export.
pub const LIST_ITEM_ID: &str = "listItemId";

/// Export formats offered by `/api/export/training/<format>/<id>`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Tcx,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Tcx => "tcx",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcx" => Ok(ExportFormat::Tcx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(FlowError::UnknownExportFormat(other.to_string())),
        }
    }
}

/// Read-only view over one element of the activity list.
///
/// Fields are whatever the service sent for this element; look them up with
/// [`Activity::get`]. The record borrows the session it was listed through and
/// only uses it to fetch exports on demand. Exports are never cached.
#[derive(Clone)]
pub struct Activity<'a> {
    session: &'a dyn FlowSession,
    list_item_id: String,
    data: Map<String, Value>,
}

impl<'a> Activity<'a> {
    /// Wrap one list element. Fails unless it is an object with a `listItemId`.
    pub fn from_value(
        session: &'a dyn FlowSession,
        index: usize,
        value: Value,
    ) -> Result<Self, FlowError> {
        let data = match value {
            Value::Object(data) => data,
            other => {
                return Err(FlowError::InvalidRecord {
                    index,
                    reason: format!("expected object, got {}", json_kind(&other)),
                });
            }
        };
        let list_item_id = match data.get(LIST_ITEM_ID) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(FlowError::InvalidRecord {
                    index,
                    reason: format!("{LIST_ITEM_ID} must be a string or number, got {other}"),
                });
            }
            None => {
                return Err(FlowError::InvalidRecord {
                    index,
                    reason: format!("missing {LIST_ITEM_ID}"),
                });
            }
        };
        Ok(Self {
            session,
            list_item_id,
            data,
        })
    }

    /// Stable listing identifier, rendered as text.
    pub fn list_item_id(&self) -> &str {
        &self.list_item_id
    }

    /// Path of the activity's page in the Flow web UI, when listed.
    pub fn url(&self) -> Option<&str> {
        self.data.get("url").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Result<&Value, FlowError> {
        self.data
            .get(field)
            .ok_or_else(|| FlowError::AttributeNotFound(field.to_string()))
    }

    /// Deserialize one field into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Result<T, FlowError> {
        let value = self.get(field)?;
        T::deserialize(value).map_err(|e| FlowError::UnexpectedField {
            field: field.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn contains(&self, field: &str) -> bool {
        self.data.contains_key(field)
    }

    /// Names of all available fields, sorted.
    pub fn fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.data.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The raw field mapping as received.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn export_url(&self, format: ExportFormat) -> String {
        format!(
            "{}/api/export/training/{}/{}",
            self.session.base_url(),
            format,
            self.list_item_id
        )
    }

    /// Download the export in the given format, bytes untouched.
    pub async fn fetch_export(&self, format: ExportFormat) -> Result<Vec<u8>, FlowError> {
        let url = self.export_url(format);
        tracing::debug!(
            "fetching {} export for {} ({})",
            format,
            self.list_item_id,
            self.url().unwrap_or("-")
        );
        self.session.get_bytes(&url).await
    }

    pub async fn fetch_tcx(&self) -> Result<Vec<u8>, FlowError> {
        self.fetch_export(ExportFormat::Tcx).await
    }

    pub async fn fetch_csv(&self) -> Result<Vec<u8>, FlowError> {
        self.fetch_export(ExportFormat::Csv).await
    }

    /// Fetch the CSV export and reshape it into header and sample table.
    pub async fn fetch_table(&self) -> Result<CsvExport, FlowError> {
        let raw = self.fetch_csv().await?;
        let export = reshape_bytes(&raw)?;
        tracing::trace!(
            "reshaped export for {}: {} columns, {} rows",
            self.list_item_id,
            export.table.columns.len(),
            export.table.len()
        );
        Ok(export)
    }
}

impl fmt::Debug for Activity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activity")
            .field("list_item_id", &self.list_item_id)
            .field("data", &self.data)
            .finish()
    }
}

impl fmt::Display for Activity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Activity({})", self.list_item_id)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
