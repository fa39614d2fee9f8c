//! Reading the first sheet of a Google Sheets document.
pub mod types;

use reqwest::{Method, Request};
use tracing::{debug, trace};
use tracker_core::binding::ColumnBinding;
use tracker_core::contents::SheetContents;
use tracker_core::errors::{Result, TrackerError};
use tracker_core::row::Row;
use types::{Spreadsheet, ValueRange, cell_to_string};
use url::Url;

use crate::client::{HttpClient, HttpResponse, check_response, read_json_response, set_bearer_auth};
use crate::gcp::credentials::Credentials;

pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com";

/// Name reported when the document doesn't list any sheets.
pub const UNKNOWN_SHEET_NAME: &str = "Unknown Sheet";

/// Last sheet row that's read.
pub const LAST_ROW: usize = 1000;

/// How sheet columns map to row fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnMode {
    /// Row 1 holds column headers, bind by name.
    #[default]
    Header,
    /// No header, columns A..I are the fields in canonical order.
    Positional,
}

impl ColumnMode {
    /// First sheet row holding data.
    pub const fn first_row(&self) -> usize {
        match self {
            Self::Header => 1,
            Self::Positional => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Base url of the sheets api.
    pub api_url: Url,
    pub spreadsheet_id: String,
    pub column_mode: ColumnMode,
}

/// Quote a sheet title and append a cell range, in A1 notation.
///
/// E.g. `Bob's Sheet` with `A1:I1000` becomes `'Bob''s Sheet'!A1:I1000`.
pub fn a1_range(sheet_title: &str, cells: &str) -> String {
    format!("'{}'!{}", sheet_title.replace('\'', "''"), cells)
}

/// The cell range covering every field for a column mode.
pub fn cell_range(sheet_title: &str, mode: ColumnMode) -> String {
    a1_range(sheet_title, &format!("A{}:I{}", mode.first_row(), LAST_ROW))
}

/// Turn raw sheet values into rows in canonical field order.
///
/// In header mode the first row is consumed as the header. An empty range
/// produces no rows.
pub fn rows_from_values(values: &[Vec<serde_json::Value>], mode: ColumnMode) -> Result<Vec<Row>> {
    let to_strings = |cells: &[serde_json::Value]| -> Vec<String> {
        cells.iter().map(cell_to_string).collect()
    };

    let (binding, data) = match mode {
        ColumnMode::Positional => (ColumnBinding::positional(), values),
        ColumnMode::Header => match values.split_first() {
            Some((header, data)) => (ColumnBinding::from_header(&to_strings(header))?, data),
            None => return Ok(Vec::new()),
        },
    };

    Ok(data
        .iter()
        .map(|cells| binding.bind_row(&to_strings(cells)))
        .collect())
}

/// Client for reading sheet contents.
#[derive(Debug, Clone)]
pub struct SheetsClient<C: HttpClient> {
    client: C,
    credentials: Credentials,
    config: SheetsConfig,
}

impl<C> SheetsClient<C>
where
    C: HttpClient,
{
    pub fn new(client: C, credentials: Credentials, config: SheetsConfig) -> Self {
        SheetsClient {
            client,
            credentials,
            config,
        }
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    /// Get the current contents of the document's first sheet.
    ///
    /// Authenticates, resolves the first sheet's title, then reads its cell
    /// range. Nothing is cached between calls.
    pub async fn fetch_contents(&self) -> Result<SheetContents> {
        let token = self.credentials.access_token(&self.client).await?;

        let sheet_name = self.first_sheet_name(&token).await?;
        debug!(%sheet_name, "resolved first sheet");

        let range = cell_range(&sheet_name, self.config.column_mode);
        let values = self.fetch_values(&token, &range).await?;
        trace!(num_values = values.values.len(), %range, "fetched values");

        let rows = rows_from_values(&values.values, self.config.column_mode)?;

        Ok(SheetContents::new(sheet_name, rows))
    }

    async fn first_sheet_name(&self, token: &str) -> Result<String> {
        let mut url = self.spreadsheet_url(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let spreadsheet: Spreadsheet = self.get_json(url, token, "Metadata request").await?;

        Ok(spreadsheet
            .first_sheet_title()
            .unwrap_or(UNKNOWN_SHEET_NAME)
            .to_string())
    }

    async fn fetch_values(&self, token: &str, range: &str) -> Result<ValueRange> {
        let url = self.spreadsheet_url(&["values", range])?;
        self.get_json(url, token, "Values request").await
    }

    async fn get_json<T>(&self, url: Url, token: &str, what: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut request = Request::new(Method::GET, url);
        set_bearer_auth(&mut request, token)?;

        let resp = self.client.do_request(request).await?;
        let resp = check_response(resp, what).await?;

        read_json_response(resp.into_bytes_stream()).await
    }

    /// Build `{api_url}/v4/spreadsheets/{id}/{extra...}`, encoding each
    /// segment.
    fn spreadsheet_url(&self, extra: &[&str]) -> Result<Url> {
        let mut url = self.config.api_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| TrackerError::config("Sheets api url cannot be a base url"))?;
            segments
                .pop_if_empty()
                .extend(["v4", "spreadsheets", self.config.spreadsheet_id.as_str()])
                .extend(extra);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use tracker_core::errors::ErrorKind;
    use tracker_core::row::Field;

    use super::*;
    use crate::testutil::{FakeClient, FakeReply};

    const METADATA_PATH: &str = "/v4/spreadsheets/doc-1";

    fn config(mode: ColumnMode) -> SheetsConfig {
        SheetsConfig {
            api_url: Url::parse("https://sheets.test").unwrap(),
            spreadsheet_id: "doc-1".to_string(),
            column_mode: mode,
        }
    }

    fn sheets(client: FakeClient, mode: ColumnMode) -> SheetsClient<FakeClient> {
        SheetsClient::new(
            client,
            Credentials::StaticToken("tok".to_string()),
            config(mode),
        )
    }

    fn metadata(titles: &[&str]) -> String {
        let sheets: Vec<_> = titles
            .iter()
            .map(|t| serde_json::json!({"properties": {"title": t}}))
            .collect();
        serde_json::json!({ "sheets": sheets }).to_string()
    }

    #[test]
    fn ranges() {
        assert_eq!("'Sheet1'!A1:I1000", cell_range("Sheet1", ColumnMode::Header));
        assert_eq!(
            "'Sheet1'!A2:I1000",
            cell_range("Sheet1", ColumnMode::Positional)
        );
        assert_eq!("'Bob''s Sheet'!A1:B2", a1_range("Bob's Sheet", "A1:B2"));
    }

    #[test]
    fn spreadsheet_url_encodes_range() {
        let client = sheets(FakeClient::default(), ColumnMode::Header);
        let url = client
            .spreadsheet_url(&["values", "'Jan 2024'!A1:I1000"])
            .unwrap();
        assert_eq!(
            "https://sheets.test/v4/spreadsheets/doc-1/values/'Jan%202024'!A1:I1000",
            url.as_str()
        );
    }

    #[test]
    fn spreadsheet_url_with_trailing_slash() {
        let mut conf = config(ColumnMode::Header);
        conf.api_url = Url::parse("https://proxy.test/sheets/").unwrap();
        let client = SheetsClient::new(
            FakeClient::default(),
            Credentials::StaticToken("tok".to_string()),
            conf,
        );
        let url = client.spreadsheet_url(&[]).unwrap();
        assert_eq!("https://proxy.test/sheets/v4/spreadsheets/doc-1", url.as_str());
    }

    #[test]
    fn header_rows() {
        let values: Vec<Vec<serde_json::Value>> = serde_json::from_str(
            r#"[
                ["Status", "VIN#", "Year", "Make", "Model"],
                ["P", "V1", "2020", "Ford", "F150"],
                ["", "V2", 2021, "Toyota"]
            ]"#,
        )
        .unwrap();

        let rows = rows_from_values(&values, ColumnMode::Header).unwrap();
        assert_eq!(2, rows.len());
        assert_eq!(
            Row::from_cells(["V1", "2020", "Ford", "F150", "", "", "", "", "P"]),
            rows[0]
        );
        assert_eq!("2021", rows[1].get(Field::Year));
        assert_eq!("", rows[1].get(Field::Model));
    }

    #[test]
    fn header_only() {
        let values: Vec<Vec<serde_json::Value>> =
            serde_json::from_str(r#"[["VIN", "Year", "Make", "Model"]]"#).unwrap();
        assert!(rows_from_values(&values, ColumnMode::Header).unwrap().is_empty());
        assert!(rows_from_values(&[], ColumnMode::Header).unwrap().is_empty());
    }

    #[test]
    fn positional_rows() {
        let values: Vec<Vec<serde_json::Value>> =
            serde_json::from_str(r#"[["V1", "2020", "Ford", "F150", "A", "B", "", "", "P"]]"#)
                .unwrap();
        let rows = rows_from_values(&values, ColumnMode::Positional).unwrap();
        assert_eq!("P", rows[0].get(Field::Status));
    }

    #[tokio::test]
    async fn fetch_first_sheet() {
        let client = FakeClient::default()
            .respond(
                Method::GET,
                METADATA_PATH,
                StatusCode::OK,
                &metadata(&["January", "February"]),
            )
            .respond(
                Method::GET,
                "/v4/spreadsheets/doc-1/values/'January'!A1:I1000",
                StatusCode::OK,
                r#"{
                    "range": "January!A1:I1000",
                    "majorDimension": "ROWS",
                    "values": [
                        ["VIN", "Year", "Make", "Model", "Pickup", "Delivery", "Pickup Date", "Delivery Date", "Status"],
                        ["V1", "2020", "Ford", "F150", "A", "B", "", "", "P"],
                        ["", "2021", "Toyota", "Camry"]
                    ]
                }"#,
            );

        let contents = sheets(client.clone(), ColumnMode::Header)
            .fetch_contents()
            .await
            .unwrap();

        assert_eq!("January", contents.sheet_name);
        assert_eq!(2, contents.rows.len());
        assert_eq!(
            vec!["V1", "2020", "Ford", "F150", "A", "B", "", "", "P"],
            contents.rows[0]
        );
        assert_eq!(9, contents.rows[1].len());

        let requests = client.requests();
        assert_eq!(2, requests.len());
        for req in &requests {
            assert_eq!(Some("Bearer tok"), req.authorization.as_deref());
        }
        assert!(
            requests[0].url.ends_with("fields=sheets.properties.title"),
            "{}",
            requests[0].url
        );
    }

    #[tokio::test]
    async fn missing_values_is_empty() {
        let client = FakeClient::default()
            .respond(Method::GET, METADATA_PATH, StatusCode::OK, &metadata(&["S"]))
            .respond(
                Method::GET,
                "/v4/spreadsheets/doc-1/values/'S'!A2:I1000",
                StatusCode::OK,
                r#"{"range": "S!A2:I1000", "majorDimension": "ROWS"}"#,
            );

        let contents = sheets(client, ColumnMode::Positional)
            .fetch_contents()
            .await
            .unwrap();
        assert_eq!("S", contents.sheet_name);
        assert!(contents.rows.is_empty());
    }

    #[tokio::test]
    async fn no_sheets_uses_unknown_name() {
        let client = FakeClient::default()
            .respond(Method::GET, METADATA_PATH, StatusCode::OK, "{}")
            .respond(
                Method::GET,
                "/v4/spreadsheets/doc-1/values/'Unknown Sheet'!A1:I1000",
                StatusCode::OK,
                "{}",
            );

        let contents = sheets(client, ColumnMode::Header)
            .fetch_contents()
            .await
            .unwrap();
        assert_eq!(UNKNOWN_SHEET_NAME, contents.sheet_name);
        assert!(contents.rows.is_empty());
    }

    #[tokio::test]
    async fn error_kinds() {
        let cases = [
            (StatusCode::UNAUTHORIZED, ErrorKind::UpstreamAuth),
            (StatusCode::FORBIDDEN, ErrorKind::UpstreamAuth),
            (StatusCode::NOT_FOUND, ErrorKind::Provider),
            (StatusCode::SERVICE_UNAVAILABLE, ErrorKind::UpstreamUnavailable),
            (StatusCode::TOO_MANY_REQUESTS, ErrorKind::UpstreamUnavailable),
        ];

        for (status, kind) in cases {
            let client =
                FakeClient::default().respond(Method::GET, METADATA_PATH, status, "{}");
            let err = sheets(client, ColumnMode::Header)
                .fetch_contents()
                .await
                .unwrap_err();
            assert_eq!(kind, err.kind(), "status: {status}");
        }
    }

    #[tokio::test]
    async fn transport_failure() {
        let client =
            FakeClient::default().with_route(Method::GET, METADATA_PATH, FakeReply::Unavailable);
        let err = sheets(client, ColumnMode::Header)
            .fetch_contents()
            .await
            .unwrap_err();
        assert_eq!(ErrorKind::UpstreamUnavailable, err.kind());
    }

    #[tokio::test]
    async fn invalid_header_is_provider_error() {
        let client = FakeClient::default()
            .respond(Method::GET, METADATA_PATH, StatusCode::OK, &metadata(&["S"]))
            .respond(
                Method::GET,
                "/v4/spreadsheets/doc-1/values/'S'!A1:I1000",
                StatusCode::OK,
                r#"{"values": [["V1", "2020", "Ford", "F150"]]}"#,
            );

        let err = sheets(client, ColumnMode::Header)
            .fetch_contents()
            .await
            .unwrap_err();
        assert_eq!(ErrorKind::Provider, err.kind());
    }
}
