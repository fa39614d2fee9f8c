//! Wire types for the proxy's data endpoint.

use serde::{Deserialize, Deserializer, Serialize};

use crate::row::Row;

/// Body of a successful `GET /api/data` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetContents {
    pub sheet_name: String,
    /// Data rows in canonical field order, header excluded.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rows: Vec<Vec<String>>,
}

impl SheetContents {
    pub fn new(sheet_name: impl Into<String>, rows: impl IntoIterator<Item = Row>) -> Self {
        SheetContents {
            sheet_name: sheet_name.into(),
            rows: rows.into_iter().map(Row::into_cells).collect(),
        }
    }
}

/// Body of a failed `GET /api/data` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: crate::errors::ErrorKind,
    pub message: String,
    pub retryable: bool,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let v: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(v.unwrap_or_default())
}

/// Every row fetched from the proxy, along with the sheet it came from.
///
/// This is only ever replaced wholesale, never modified in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    sheet_name: String,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// All rows, including ones that won't be displayed.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl From<SheetContents> for Dataset {
    fn from(contents: SheetContents) -> Self {
        Dataset {
            sheet_name: contents.sheet_name,
            rows: contents.rows.into_iter().map(Row::from_cells).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Field;

    #[test]
    fn camel_case_wire_format() {
        let contents = SheetContents::new(
            "January",
            [Row::from_cells(["V1", "2020", "Ford", "F150"])],
        );
        let json = serde_json::to_value(&contents).unwrap();
        assert_eq!("January", json["sheetName"]);
        assert_eq!(9, json["rows"][0].as_array().unwrap().len());
    }

    #[test]
    fn missing_or_null_rows() {
        let contents: SheetContents = serde_json::from_str(r#"{"sheetName": "S"}"#).unwrap();
        assert!(contents.rows.is_empty());

        let contents: SheetContents =
            serde_json::from_str(r#"{"sheetName": "S", "rows": null}"#).unwrap();
        assert!(contents.rows.is_empty());
    }

    #[test]
    fn dataset_pads_ragged_rows() {
        let contents: SheetContents =
            serde_json::from_str(r#"{"sheetName": "S", "rows": [["V1", "2020"]]}"#).unwrap();
        let dataset = Dataset::from(contents);
        assert_eq!("S", dataset.sheet_name());
        assert_eq!(1, dataset.rows().len());
        assert_eq!("", dataset.rows()[0].get(Field::Status));
    }
}
