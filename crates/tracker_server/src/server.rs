use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracker_http::client::HttpClient;
use tracker_http::sheets::SheetsClient;

use crate::handlers::{self, ServerState};

pub const ENDPOINTS: Endpoints = Endpoints {
    root: "/",
    healthz: "/healthz",
    data: "/api/data",
};

#[derive(Debug)]
pub struct Endpoints {
    pub root: &'static str,
    pub healthz: &'static str,
    pub data: &'static str,
}

/// Build the router for all endpoints.
///
/// Any origin may read from the api, the renderer is usually hosted
/// elsewhere.
pub fn router<C: HttpClient>(state: Arc<ServerState<C>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route(ENDPOINTS.root, get(handlers::root))
        .route(ENDPOINTS.healthz, get(handlers::healthz))
        .route(ENDPOINTS.data, get(handlers::get_data::<C>))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub struct TrackerServer<C: HttpClient> {
    listener: TcpListener,
    state: Arc<ServerState<C>>,
}

impl<C: HttpClient> TrackerServer<C> {
    pub fn new(listener: TcpListener, sheets: SheetsClient<C>) -> Self {
        TrackerServer {
            listener,
            state: Arc::new(ServerState { sheets }),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until ctrl-c is received.
    pub async fn serve(self) -> io::Result<()> {
        self.serve_with_shutdown(async {
            // If we can't listen for the signal, just serve forever.
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
            info!("received shutdown signal");
        })
        .await
    }

    /// Serve until `signal` completes.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.listener.local_addr()?;
        info!(%addr, spreadsheet_id = %self.state.sheets.config().spreadsheet_id, "serving sheet contents");

        let app = router(self.state);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(signal)
            .await
    }
}
