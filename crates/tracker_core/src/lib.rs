//! Core types shared by the tracker proxy service and the browser renderer.
//!
//! Nothing in here does IO. The proxy uses the row model and column binding to
//! normalize what the spreadsheet provider returns, and the renderer uses the
//! view logic to derive what should be displayed from the fetched dataset.
pub mod binding;
pub mod contents;
pub mod errors;
pub mod row;
pub mod status;
pub mod view;
