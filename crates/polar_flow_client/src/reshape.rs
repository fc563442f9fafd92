//! Reshaping of Flow CSV exports.
//!
//! An export is laid out as:
//! - line 1: metadata keys
//! - line 2: metadata values, paired positionally with line 1
//! - line 3: column names
//! - lines 4..N-1: samples
//! - line N: footer, ignored
//!
//! All cells are kept as text.

use crate::{FlowError, PayloadStage};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

/// Metadata pairs from the first two lines of an export.
pub type HeaderMap = BTreeMap<String, String>;

const MIN_LINES: usize = 4;

/// Sample table of an export.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq, JsonSchema)]
pub struct Table {
    pub columns: Vec<String>,
    /// Rows in payload order. Row widths are not checked against `columns`.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of the named column, one per row; `None` where a row is too short.
    ///
    /// Returns `None` if no column has that name. With duplicate names the
    /// first column wins.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str))
                .collect(),
        )
    }
}

/// A reshaped CSV export.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq, JsonSchema)]
pub struct CsvExport {
    pub header: HeaderMap,
    pub table: Table,
}

/// Reshape raw export text into its header mapping and sample table.
///
/// When the key and value lines differ in length, pairing stops at the
/// shorter one and the extra fields are dropped.
pub fn reshape(raw: &str) -> Result<CsvExport, FlowError> {
    let lines: Vec<&str> = raw.split('\n').collect();
    if lines.len() < MIN_LINES {
        let stage = match lines.len() {
            0 | 1 => PayloadStage::Header,
            2 => PayloadStage::Columns,
            _ => PayloadStage::Rows,
        };
        return Err(FlowError::PayloadTooShort {
            stage,
            lines: lines.len(),
        });
    }

    let header: HeaderMap = split_fields(lines[0])
        .zip(split_fields(lines[1]))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let columns = split_fields(lines[2]).map(str::to_string).collect();
    // last line is a footer, not a sample
    let rows = lines[3..lines.len() - 1]
        .iter()
        .map(|line| split_fields(line).map(str::to_string).collect())
        .collect();

    Ok(CsvExport {
        header,
        table: Table { columns, rows },
    })
}

/// Reshape a raw export body that has not been decoded yet.
pub fn reshape_bytes(raw: &[u8]) -> Result<CsvExport, FlowError> {
    let text = std::str::from_utf8(raw).map_err(|e| FlowError::MalformedPayload {
        stage: PayloadStage::Decode,
        reason: e.to_string(),
    })?;
    reshape(text)
}

fn split_fields(line: &str) -> std::str::Split<'_, char> {
    line.split(',')
}
