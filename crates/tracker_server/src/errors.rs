use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;
use tracker_core::contents::ErrorBody;
use tracker_core::errors::{ErrorKind, TrackerError};

pub type ServerResult<T, E = ServerError> = std::result::Result<T, E>;

/// Status code reported to clients for each kind of failure.
pub const fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::UpstreamAuth => StatusCode::BAD_GATEWAY,
        ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Provider => StatusCode::FAILED_DEPENDENCY,
    }
}

/// Wrapper around a tracker error that can be returned from handlers.
#[derive(Debug)]
pub struct ServerError(pub TrackerError);

impl From<TrackerError> for ServerError {
    fn from(value: TrackerError) -> Self {
        ServerError(value)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        error!(%kind, error = %self.0, "request failed");

        let body = ErrorBody {
            kind,
            message: self.0.to_string(),
            retryable: kind.is_retryable(),
        };

        (status_for_kind(kind), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_statuses() {
        let kinds = [
            ErrorKind::Config,
            ErrorKind::UpstreamAuth,
            ErrorKind::UpstreamUnavailable,
            ErrorKind::Provider,
        ];
        let mut statuses: Vec<_> = kinds.iter().map(|k| status_for_kind(*k)).collect();
        statuses.sort();
        statuses.dedup();
        assert_eq!(kinds.len(), statuses.len());
    }

    #[test]
    fn response_status_matches_kind() {
        let resp = ServerError(TrackerError::upstream_unavailable("down")).into_response();
        assert_eq!(StatusCode::SERVICE_UNAVAILABLE, resp.status());

        let resp = ServerError(TrackerError::config("bad key")).into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, resp.status());
    }
}
