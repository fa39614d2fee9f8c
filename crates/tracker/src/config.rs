//! Resolve command line arguments into a ready to use sheets client.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use tracing::{debug, info};
use tracker_core::errors::{ErrorKind, Result, ResultExt, TrackerError};
use tracker_http::client::ReqwestHttpClient;
use tracker_http::gcp::credentials::{Credentials, ServiceAccount};
use tracker_http::sheets::{ColumnMode, SheetsClient, SheetsConfig};
use url::Url;

use crate::args::SheetArgs;

/// File name used when writing decoded credentials to disk.
pub const MATERIALIZED_CREDENTIALS_FILE: &str = "service-account.json";

/// Everything needed to talk to the provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub sheets: SheetsConfig,
    pub credentials: Credentials,
    pub request_timeout: Duration,
}

impl ProviderConfig {
    pub fn from_args(args: SheetArgs) -> Result<Self> {
        let spreadsheet_id = match args.spreadsheet_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(TrackerError::config("missing spreadsheet id")),
        };

        let api_url = Url::parse(&args.sheets_api_url).context_fn(ErrorKind::Config, || {
            format!("invalid sheets api url: {}", args.sheets_api_url)
        })?;

        let column_mode = if args.positional_columns {
            ColumnMode::Positional
        } else {
            ColumnMode::Header
        };

        let credentials = resolve_credentials(&args)?;

        Ok(ProviderConfig {
            sheets: SheetsConfig {
                api_url,
                spreadsheet_id,
                column_mode,
            },
            credentials,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
        })
    }

    pub fn into_client(self) -> Result<SheetsClient<ReqwestHttpClient>> {
        let client = ReqwestHttpClient::with_timeout(self.request_timeout)?;
        Ok(SheetsClient::new(client, self.credentials, self.sheets))
    }
}

/// Pick credentials from the arguments.
///
/// Encoded credentials are checked first, then a credentials file, then a
/// static token.
pub fn resolve_credentials(args: &SheetArgs) -> Result<Credentials> {
    if let Some(encoded) = non_empty(args.credentials_base64.as_deref()) {
        let dir = args
            .credentials_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let path = materialize_credentials(encoded, &dir)?;
        return load_service_account(&path);
    }

    if let Some(path) = &args.credentials_path {
        return load_service_account(path);
    }

    if let Some(token) = non_empty(args.access_token.as_deref()) {
        info!("using static access token");
        return Ok(Credentials::StaticToken(token.to_string()));
    }

    Err(TrackerError::config(
        "no credentials provided, set one of GOOGLE_CREDENTIALS_BASE64, \
         GOOGLE_APPLICATION_CREDENTIALS or GOOGLE_ACCESS_TOKEN",
    ))
}

/// Decode base64 encoded service account json and write it to `dir`.
///
/// The decoded content is validated before anything is written. Returns the
/// path of the written file.
pub fn materialize_credentials(encoded: &str, dir: &Path) -> Result<PathBuf> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let decoded = STANDARD
        .decode(&compact)
        .or_else(|_| URL_SAFE.decode(&compact))
        .context(ErrorKind::Config, "failed to decode base64 credentials")?;
    let json = String::from_utf8(decoded)
        .context(ErrorKind::Config, "decoded credentials are not valid utf-8")?;

    let account = ServiceAccount::try_from_str(&json)?;

    fs::create_dir_all(dir).context_fn(ErrorKind::Config, || {
        format!("failed to create credentials directory {}", dir.display())
    })?;
    let path = dir.join(MATERIALIZED_CREDENTIALS_FILE);
    write_private(&path, json.as_bytes()).context_fn(ErrorKind::Config, || {
        format!("failed to write credentials to {}", path.display())
    })?;

    debug!(path = %path.display(), client_email = %account.client_email(), "wrote credentials");
    Ok(path)
}

/// Load service account credentials from a key file.
pub fn load_service_account(path: &Path) -> Result<Credentials> {
    let json = fs::read_to_string(path).context_fn(ErrorKind::Config, || {
        format!("failed to read credentials file {}", path.display())
    })?;
    let account = ServiceAccount::try_from_str(&json)?;
    info!(client_email = %account.client_email(), "loaded service account");
    Ok(Credentials::ServiceAccount(Arc::new(account)))
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // Mode only applies on create.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    fs::write(path, contents)
}
