//! Table renderer state and the views derived from it.

use crate::contents::{Dataset, SheetContents};
use crate::row::Row;

/// Rows that should currently be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView<'a> {
    sheet_name: &'a str,
    rows: Vec<&'a Row>,
}

impl<'a> TableView<'a> {
    pub fn sheet_name(&self) -> &'a str {
        self.sheet_name
    }

    /// Displayable rows, in sheet order.
    pub fn rows(&self) -> &[&'a Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Text for the count element, e.g. "January - Vehicles: 12".
    pub fn count_label(&self) -> String {
        format!("{} - Vehicles: {}", self.sheet_name, self.rows.len())
    }
}

/// Owns the fetched dataset for a single page session.
///
/// Starts out empty, and transitions exactly once when the dataset is loaded.
/// Every view after that is derived from the same stored rows.
#[derive(Debug, Default)]
pub struct TableRenderer {
    dataset: Option<Dataset>,
}

impl TableRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// Store fetched contents, replacing anything loaded before.
    pub fn load(&mut self, contents: SheetContents) {
        self.dataset = Some(Dataset::from(contents));
    }

    /// Apply the outcome of a fetch.
    ///
    /// Contents are loaded. A failed fetch leaves whatever was displayed
    /// before untouched and hands the error back for reporting.
    pub fn apply<E>(&mut self, fetched: Result<SheetContents, E>) -> Result<(), E> {
        let contents = fetched?;
        self.load(contents);
        Ok(())
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// View of every displayable row. None if nothing's been loaded yet.
    pub fn render(&self) -> Option<TableView<'_>> {
        self.filter("")
    }

    /// View of displayable rows whose VIN contains `query`, ignoring case.
    ///
    /// An empty query matches every row. None if nothing's been loaded yet.
    pub fn filter(&self, query: &str) -> Option<TableView<'_>> {
        let dataset = self.dataset.as_ref()?;
        let query = query.to_lowercase();

        let rows = dataset
            .rows()
            .iter()
            .filter(|row| row.is_displayable())
            .filter(|row| query.is_empty() || row.vin().to_lowercase().contains(&query))
            .collect();

        Some(TableView {
            sheet_name: dataset.sheet_name(),
            rows,
        })
    }
}
