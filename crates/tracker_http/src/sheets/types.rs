//! Response types for the Sheets v4 JSON api.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// <https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets#Spreadsheet>
//
// Only what's requested with `fields=sheets.properties.title`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub properties: Option<SheetProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub title: Option<String>,
}

impl Spreadsheet {
    /// Title of the first sheet in the document, if there is one.
    pub fn first_sheet_title(&self) -> Option<&str> {
        self.sheets
            .first()
            .and_then(|s| s.properties.as_ref())
            .and_then(|p| p.title.as_deref())
    }
}

// <https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values#ValueRange>
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub range: Option<String>,
    pub major_dimension: Option<String>,
    /// Omitted entirely when the range is empty. Trailing empty cells and rows
    /// are omitted too.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// Render a cell value as a string.
///
/// Formatted values are always strings, but unformatted ones may be numbers
/// or booleans.
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
