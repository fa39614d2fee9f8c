use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use tracker_core::contents::SheetContents;
use tracker_http::client::HttpClient;
use tracker_http::sheets::SheetsClient;

use crate::errors::ServerResult;

pub const WELCOME_TEXT: &str =
    "Welcome to the Vehicle Transport Tracker API! Use /api/data to fetch data.";

/// State that's passed to all handlers.
///
/// Never mutated after startup.
#[derive(Debug)]
pub struct ServerState<C: HttpClient> {
    /// Client for reading the configured spreadsheet.
    pub sheets: SheetsClient<C>,
}

pub async fn root() -> &'static str {
    WELCOME_TEXT
}

pub async fn healthz() -> &'static str {
    "OK"
}

/// Get the current contents of the first sheet.
pub async fn get_data<C: HttpClient>(
    State(state): State<Arc<ServerState<C>>>,
) -> ServerResult<Json<SheetContents>> {
    let contents = state.sheets.fetch_contents().await?;
    Ok(Json(contents))
}
