//! Binding sheet columns to row fields.
//!
//! Sheets are edited by hand, so columns get reordered and renamed. Binding by
//! header name (row 1 of the sheet) keeps rows correct when that happens, while
//! positional binding keeps the old fixed A..I layout working.

use crate::errors::{Result, TrackerError};
use crate::row::{FIELD_COUNT, Field, Row};

/// Header names accepted for each field, already normalized.
fn aliases(field: Field) -> &'static [&'static str] {
    match field {
        Field::Vin => &["vin", "vin number", "vin no"],
        Field::Year => &["year"],
        Field::Make => &["make"],
        Field::Model => &["model"],
        Field::Pickup => &["pickup", "pickup location", "pick up", "pick up location", "origin"],
        Field::Delivery => &["delivery", "delivery location", "destination"],
        Field::PickupEstimate => &[
            "pickup date",
            "pickup date estimate",
            "pickup estimate",
            "estimated pickup",
            "estimated pickup date",
            "est. pickup",
            "est pickup",
        ],
        Field::DeliveryEstimate => &[
            "delivery date",
            "delivery date estimate",
            "delivery estimate",
            "estimated delivery",
            "estimated delivery date",
            "est. delivery",
            "est delivery",
        ],
        Field::Status => &["status", "status code"],
    }
}

/// Normalize a header cell for matching.
///
/// Lowercases, trims, drops trailing '#' and collapses inner whitespace.
fn normalize_header(cell: &str) -> String {
    let trimmed = cell.trim().trim_end_matches('#');
    trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Mapping from fields to column indices in the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    columns: [Option<usize>; FIELD_COUNT],
}

impl ColumnBinding {
    /// Fixed layout, field N is read from column N.
    pub fn positional() -> Self {
        let mut columns = [None; FIELD_COUNT];
        for field in Field::ALL {
            columns[field.index()] = Some(field.index());
        }
        ColumnBinding { columns }
    }

    /// Bind fields using the header row.
    ///
    /// Errors if any key field has no matching header. If a field matches
    /// multiple headers, the leftmost one is used.
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Result<Self> {
        let mut columns = [None; FIELD_COUNT];

        for (col, cell) in header.iter().enumerate() {
            let name = normalize_header(cell.as_ref());
            if name.is_empty() {
                continue;
            }

            let matched = Field::ALL
                .into_iter()
                .find(|field| aliases(*field).contains(&name.as_str()));

            if let Some(field) = matched {
                let slot = &mut columns[field.index()];
                if slot.is_none() {
                    *slot = Some(col);
                }
            }
        }

        let missing: Vec<_> = Field::KEY
            .into_iter()
            .filter(|field| columns[field.index()].is_none())
            .map(|field| field.title())
            .collect();

        if !missing.is_empty() {
            return Err(TrackerError::provider(format!(
                "Sheet header is missing required columns: {}",
                missing.join(", ")
            )));
        }

        Ok(ColumnBinding { columns })
    }

    /// Column index a field is read from, if bound.
    pub fn column(&self, field: Field) -> Option<usize> {
        self.columns[field.index()]
    }

    /// Read a row from sheet cells.
    ///
    /// Unbound fields and cells past the end of the input are empty.
    pub fn bind_row<S: AsRef<str>>(&self, cells: &[S]) -> Row {
        let mut row = Row::default();
        for field in Field::ALL {
            let value = self
                .column(field)
                .and_then(|col| cells.get(col))
                .map(|cell| cell.as_ref())
                .unwrap_or("");
            row.set(field, value);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize() {
        assert_eq!("vin", normalize_header(" VIN# "));
        assert_eq!("pickup location", normalize_header("Pickup   Location"));
        assert_eq!("", normalize_header("  "));
    }

    #[test]
    fn positional_is_identity() {
        let binding = ColumnBinding::positional();
        let row = binding.bind_row(&["V1", "2020", "Ford", "F150", "A", "B", "C", "D", "P"]);
        assert_eq!(
            Row::from_cells(["V1", "2020", "Ford", "F150", "A", "B", "C", "D", "P"]),
            row
        );
    }

    #[test]
    fn header_in_canonical_order() {
        let header = [
            "VIN#",
            "Year",
            "Make",
            "Model",
            "Pickup",
            "Delivery",
            "Pickup Date Estimate",
            "Delivery Date Estimate",
            "Status",
        ];
        let binding = ColumnBinding::from_header(&header).unwrap();
        assert_eq!(ColumnBinding::positional(), binding);
    }

    #[test]
    fn reordered_header() {
        let header = ["Status", "Make", "Model", "Year", "VIN"];
        let binding = ColumnBinding::from_header(&header).unwrap();

        let row = binding.bind_row(&["P", "Ford", "F150", "2020", "V1"]);
        assert_eq!("V1", row.get(Field::Vin));
        assert_eq!("2020", row.get(Field::Year));
        assert_eq!("Ford", row.get(Field::Make));
        assert_eq!("F150", row.get(Field::Model));
        assert_eq!("P", row.get(Field::Status));
        assert_eq!("", row.get(Field::Pickup));
        assert_eq!(None, binding.column(Field::Delivery));
    }

    #[test]
    fn missing_key_column() {
        let header = ["VIN", "Year", "Model", "Status"];
        let err = ColumnBinding::from_header(&header).unwrap_err();
        assert_eq!(crate::errors::ErrorKind::Provider, err.kind());
        assert!(err.to_string().contains("Make"), "{err}");
    }

    #[test]
    fn duplicate_header_keeps_leftmost() {
        let header = ["VIN", "Year", "Make", "Model", "VIN"];
        let binding = ColumnBinding::from_header(&header).unwrap();
        assert_eq!(Some(0), binding.column(Field::Vin));
    }

    #[test]
    fn short_data_row() {
        let binding = ColumnBinding::from_header(&["VIN", "Year", "Make", "Model", "Status"]).unwrap();
        let row = binding.bind_row(&["V1", "2020"]);
        assert_eq!("V1", row.get(Field::Vin));
        assert_eq!("", row.get(Field::Status));
        assert!(!row.is_displayable());
    }
}
