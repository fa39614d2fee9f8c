use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;

/// Coarse classification of a failure.
///
/// Callers of the proxy use this to decide if a request is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Local configuration or credential material is unusable.
    Config,
    /// The provider (or its token endpoint) rejected our credentials.
    UpstreamAuth,
    /// The provider couldn't be reached, timed out, or is overloaded.
    UpstreamUnavailable,
    /// The provider answered, but with an error or a payload we can't use.
    Provider,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::UpstreamAuth => "upstream_auth",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::Provider => "provider",
        }
    }

    /// Only unavailability is transient, everything else needs someone to
    /// fix configuration or the sheet itself.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type used throughout the tracker crates.
#[derive(Debug, thiserror::Error)]
#[error("{msg}{}", .source.as_ref().map(|s| format!(": {s}")).unwrap_or_default())]
pub struct TrackerError {
    kind: ErrorKind,
    msg: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl TrackerError {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        TrackerError {
            kind,
            msg: msg.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: ErrorKind,
        msg: impl Into<String>,
        source: Box<dyn Error + Send + Sync + 'static>,
    ) -> Self {
        TrackerError {
            kind,
            msg: msg.into(),
            source: Some(source),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, msg)
    }

    pub fn upstream_auth(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamAuth, msg)
    }

    pub fn upstream_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamUnavailable, msg)
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Provider, msg)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The message without the source chain appended.
    pub fn message(&self) -> &str {
        &self.msg
    }
}

/// Attach a kind and message to foreign errors.
pub trait ResultExt<T> {
    fn context(self, kind: ErrorKind, msg: &'static str) -> Result<T>;

    fn context_fn<F>(self, kind: ErrorKind, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn context(self, kind: ErrorKind, msg: &'static str) -> Result<T> {
        self.map_err(|e| TrackerError::with_source(kind, msg, Box::new(e)))
    }

    fn context_fn<F>(self, kind: ErrorKind, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| TrackerError::with_source(kind, f(), Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_source() {
        let err: Result<u32> = "abc"
            .parse::<u32>()
            .context(ErrorKind::Provider, "Failed to parse cell");
        let err = err.unwrap_err();

        assert_eq!(ErrorKind::Provider, err.kind());
        assert_eq!("Failed to parse cell", err.message());
        assert!(err.to_string().starts_with("Failed to parse cell: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn display_without_source() {
        let err = TrackerError::config("Missing spreadsheet id");
        assert_eq!("Missing spreadsheet id", err.to_string());
    }

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(ErrorKind::UpstreamUnavailable.is_retryable());
        assert!(!ErrorKind::UpstreamAuth.is_retryable());
        assert!(!ErrorKind::Provider.is_retryable());
        assert!(!ErrorKind::Config.is_retryable());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let s = serde_json::to_string(&ErrorKind::UpstreamUnavailable).unwrap();
        assert_eq!("\"upstream_unavailable\"", s);
    }
}
