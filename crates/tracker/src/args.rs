use std::path::PathBuf;

use clap::Args;

/// Where to read the spreadsheet from, and how to authenticate.
#[derive(Debug, Clone, Default, Args)]
pub struct SheetArgs {
    /// Id of the spreadsheet document to read.
    ///
    /// The id is the long token in the document's url.
    #[arg(long, env = "SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Path to a service account key file.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    pub credentials_path: Option<PathBuf>,

    /// Base64 encoded service account key.
    ///
    /// Written to `--credentials-dir` at startup, then loaded from there.
    /// Takes precedence over `--credentials-path`.
    #[arg(long, env = "GOOGLE_CREDENTIALS_BASE64", hide_env_values = true)]
    pub credentials_base64: Option<String>,

    /// Directory to write decoded credentials to.
    ///
    /// Defaults to the system temp directory.
    #[arg(long, env = "TRACKER_CREDENTIALS_DIR")]
    pub credentials_dir: Option<PathBuf>,

    /// Pre-issued access token to use instead of a service account.
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Read columns A..I in fixed order instead of binding by header row.
    #[arg(long, env = "TRACKER_POSITIONAL_COLUMNS")]
    pub positional_columns: bool,

    /// Base url for the sheets api.
    #[arg(long, env = "SHEETS_API_URL", default_value = tracker_http::sheets::DEFAULT_SHEETS_API_URL)]
    pub sheets_api_url: String,

    /// Timeout in seconds for each request to the provider.
    #[arg(long, env = "TRACKER_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// TCP address to bind to.
    #[arg(short = 'b', long, env = "TRACKER_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    #[command(flatten)]
    pub sheet: SheetArgs,
}

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Only show rows whose VIN contains this text, ignoring case.
    #[arg(short, long)]
    pub query: Option<String>,

    /// Print the raw api response instead of a table.
    #[arg(long, conflicts_with = "query")]
    pub json: bool,

    #[command(flatten)]
    pub sheet: SheetArgs,
}
