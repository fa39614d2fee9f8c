//! Plain text rendering of a table view for the terminal.

use std::fmt::Write;

use tracker_core::row::{Field, Row};
use tracker_core::view::TableView;

const SEPARATOR: &str = " | ";

fn cell_text(row: &Row, field: Field) -> String {
    match field {
        Field::Status => row.status().to_string(),
        other => row.get(other).to_string(),
    }
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn push_line<'a>(out: &mut String, widths: &[usize], cells: impl IntoIterator<Item = &'a str>) {
    let mut line = String::new();
    for (idx, (cell, w)) in cells.into_iter().zip(widths).enumerate() {
        if idx > 0 {
            line.push_str(SEPARATOR);
        }
        line.push_str(cell);
        for _ in width(cell)..*w {
            line.push(' ');
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Format a view as an aligned text table followed by its count label.
pub fn format_view(view: &TableView<'_>) -> String {
    let body: Vec<Vec<String>> = view
        .rows()
        .iter()
        .map(|row| Field::ALL.iter().map(|f| cell_text(row, *f)).collect())
        .collect();

    let mut widths: Vec<usize> = Field::ALL.iter().map(|f| width(f.title())).collect();
    for cells in &body {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(width(cell));
        }
    }

    let mut out = String::new();
    push_line(&mut out, &widths, Field::ALL.iter().map(|f| f.title()));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &widths, rule.iter().map(String::as_str));
    for cells in &body {
        push_line(&mut out, &widths, cells.iter().map(String::as_str));
    }

    let _ = writeln!(out, "\n{}", view.count_label());
    out
}
