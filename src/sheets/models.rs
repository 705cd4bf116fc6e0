// src/sheets/models.rs
use serde::{Deserialize, Serialize};

/// Response body of `GET spreadsheets/{id}/values/{range}`.
/// Example: https://sheets.googleapis.com/v4/spreadsheets/{id}/values/'Sheet1'!1:1
/// `values` is omitted entirely when the range is empty.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[allow(dead_code)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    /// Cells come back as JSON strings for RAW text, but numbers and booleans are possible
    /// when someone typed into the sheet by hand.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

fn cell_to_string(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Request body for append and update calls.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRangeBody<'a> {
    pub major_dimension: &'static str,
    pub values: Vec<&'a [String]>,
}

impl<'a> ValueRangeBody<'a> {
    pub fn single_row(row: &'a [String]) -> Self {
        Self {
            major_dimension: "ROWS",
            values: vec![row],
        }
    }
}

/// Response body of `values:append`; only the summary counts are of interest.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResponse {
    #[serde(default)]
    pub updates: Option<UpdateSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: u32,
}
