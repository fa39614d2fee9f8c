//! In-memory http client for tests.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::future::{Ready, ready};
use futures::stream::{Iter, iter};
use percent_encoding::percent_decode_str;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, StatusCode};
use tracker_core::errors::{Result, TrackerError};

use crate::client::{HttpClient, HttpResponse};

#[derive(Debug)]
pub struct FakeResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl FakeResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        FakeResponse {
            status,
            headers: HeaderMap::new(),
            body: Bytes::from(body.into()),
        }
    }
}

impl HttpResponse for FakeResponse {
    type BytesStream = Iter<std::vec::IntoIter<Result<Bytes>>>;

    fn status(&self) -> StatusCode {
        self.status
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn into_bytes_stream(self) -> Self::BytesStream {
        iter(vec![Ok(self.body)])
    }
}

/// What a fake route answers with.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Respond(StatusCode, String),
    /// Simulate a transport failure.
    Unavailable,
}

/// A request as seen by the fake client.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub authorization: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug)]
struct Route {
    method: Method,
    path: String,
    reply: FakeReply,
}

/// Answers requests by matching method and decoded url path.
///
/// Unmatched requests get a 404.
#[derive(Debug, Clone, Default)]
pub struct FakeClient {
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeClient {
    pub fn with_route(self, method: Method, path: &str, reply: FakeReply) -> Self {
        self.routes.lock().unwrap().push(Route {
            method,
            path: path.to_string(),
            reply,
        });
        self
    }

    pub fn respond(self, method: Method, path: &str, status: StatusCode, body: &str) -> Self {
        self.with_route(method, path, FakeReply::Respond(status, body.to_string()))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn decoded_path(request: &Request) -> String {
    percent_decode_str(request.url().path())
        .decode_utf8_lossy()
        .into_owned()
}

impl HttpClient for FakeClient {
    type Response = FakeResponse;
    type RequestFuture = Ready<Result<FakeResponse>>;

    fn do_request(&self, request: Request) -> Self::RequestFuture {
        let path = decoded_path(&request);
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method().clone(),
            url: request.url().to_string(),
            authorization: request
                .headers()
                .get(reqwest::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()),
            body: request
                .body()
                .and_then(|b| b.as_bytes())
                .map(|b| String::from_utf8_lossy(b).into_owned()),
        });

        let routes = self.routes.lock().unwrap();
        let route = routes
            .iter()
            .find(|r| &r.method == request.method() && r.path == path);

        let result = match route.map(|r| r.reply.clone()) {
            Some(FakeReply::Respond(status, body)) => Ok(FakeResponse::new(status, body)),
            Some(FakeReply::Unavailable) => Err(TrackerError::upstream_unavailable(
                "Failed to send request",
            )),
            None => Ok(FakeResponse::new(StatusCode::NOT_FOUND, "no route")),
        };

        ready(result)
    }
}
