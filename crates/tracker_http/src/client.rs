use std::fmt::Debug;
use std::time::Duration;

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{BoxStream, StreamExt};
use futures::{Stream, TryStreamExt};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Request, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracker_core::errors::{ErrorKind, Result, ResultExt, TrackerError};

/// Max number of bytes of an error response body to include in error
/// messages.
const ERROR_BODY_LIMIT: usize = 512;

pub trait HttpClient: Sync + Send + Debug + Clone + 'static {
    type Response: HttpResponse;
    type RequestFuture: Future<Output = Result<Self::Response>> + Send + Unpin;

    /// Do the request.
    ///
    /// Errors from this are transport errors. Non-2xx statuses are returned
    /// as normal responses.
    fn do_request(&self, request: Request) -> Self::RequestFuture;
}

pub trait HttpResponse: Send {
    type BytesStream: Stream<Item = Result<Bytes>> + Send + Unpin;

    fn status(&self) -> StatusCode;
    fn headers(&self) -> &HeaderMap;

    /// Convert the response body into a byte stream.
    fn into_bytes_stream(self) -> Self::BytesStream;
}

/// Http client backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(client: reqwest::Client) -> Self {
        ReqwestHttpClient { client }
    }

    /// Create a client where every request is bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context(ErrorKind::Config, "Failed to build http client")?;
        Ok(ReqwestHttpClient { client })
    }
}

impl HttpClient for ReqwestHttpClient {
    type Response = ReqwestHttpResponse;
    type RequestFuture = BoxFuture<'static, Result<Self::Response>>;

    fn do_request(&self, request: Request) -> Self::RequestFuture {
        self.client
            .execute(request)
            .map(|result| match result {
                Ok(resp) => Ok(ReqwestHttpResponse(resp)),
                Err(e) => Err(TrackerError::with_source(
                    ErrorKind::UpstreamUnavailable,
                    "Failed to send request",
                    Box::new(e),
                )),
            })
            .boxed()
    }
}

#[derive(Debug)]
pub struct ReqwestHttpResponse(reqwest::Response);

impl HttpResponse for ReqwestHttpResponse {
    type BytesStream = BoxStream<'static, Result<Bytes>>;

    fn status(&self) -> StatusCode {
        self.0.status()
    }

    fn headers(&self) -> &HeaderMap {
        self.0.headers()
    }

    fn into_bytes_stream(self) -> Self::BytesStream {
        self.0
            .bytes_stream()
            .map_err(|e| {
                TrackerError::with_source(
                    ErrorKind::UpstreamUnavailable,
                    "Failed to stream response body",
                    Box::new(e),
                )
            })
            .boxed()
    }
}

/// Helper to set a form body on this request.
///
/// Overwrites the existing body and 'Content-Type' of the request.
pub fn set_form_body<T>(request: &mut Request, body: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let body = serde_urlencoded::to_string(body).context(
        ErrorKind::Config,
        "Failed to serialize request body to url encoded form",
    )?;
    *request.body_mut() = Some(body.into());
    request.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );

    Ok(())
}

/// Helper to set a bearer token on this request.
pub fn set_bearer_auth(request: &mut Request, token: &str) -> Result<()> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .context(ErrorKind::Config, "Access token is not a valid header value")?;
    value.set_sensitive(true);
    request
        .headers_mut()
        .insert(reqwest::header::AUTHORIZATION, value);
    Ok(())
}

/// Helper to read a full response body from a byte stream.
pub async fn read_body<S>(mut stream: S) -> Result<Vec<u8>>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    let mut bytes = Vec::new();
    while let Some(resp) = stream.try_next().await? {
        bytes.extend_from_slice(resp.as_ref());
    }
    Ok(bytes)
}

/// Helper to read a json response from a byte stream.
///
/// This will collect the full response before trying to deserialize it.
pub async fn read_json_response<T, S>(stream: S) -> Result<T>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    let bytes = read_body(stream).await?;
    serde_json::from_slice(&bytes).context(
        ErrorKind::Provider,
        "Failed to deserialize response body as json",
    )
}

/// Classify a non-success status from the provider.
///
/// Returns None for success statuses.
pub fn classify_status(status: StatusCode) -> Option<ErrorKind> {
    if status.is_success() {
        return None;
    }

    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::UpstreamAuth,
        StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => {
            ErrorKind::UpstreamUnavailable
        }
        s if s.is_server_error() => ErrorKind::UpstreamUnavailable,
        _ => ErrorKind::Provider,
    };

    Some(kind)
}

/// Turn a response into an error if it doesn't have a success status.
///
/// `kind_fn` decides the error kind for non-success statuses, the response
/// body is included in the error message.
pub async fn check_response_with<R, F>(resp: R, what: &str, kind_fn: F) -> Result<R>
where
    R: HttpResponse,
    F: FnOnce(StatusCode) -> Option<ErrorKind>,
{
    let status = resp.status();
    let kind = match kind_fn(status) {
        Some(kind) => kind,
        None => return Ok(resp),
    };

    // Best effort, the status is what matters.
    let body = read_body(resp.into_bytes_stream())
        .await
        .unwrap_or_default();
    let mut body = String::from_utf8_lossy(&body).into_owned();
    if body.len() > ERROR_BODY_LIMIT {
        let mut end = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }

    Err(TrackerError::new(
        kind,
        format!(
            "{what} failed with status {}: {}",
            status.as_u16(),
            body.trim()
        ),
    ))
}

/// Turn a response into an error using the default status classification.
pub async fn check_response<R>(resp: R, what: &str) -> Result<R>
where
    R: HttpResponse,
{
    check_response_with(resp, what, classify_status).await
}
