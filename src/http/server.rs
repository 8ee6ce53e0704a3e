//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the upstream client and shared state once at startup
//! - Create the Axum Router for `/users/`
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown signal fires, then drain

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    http::{header, HeaderValue, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    BoxError, Router,
};
use tokio::net::TcpListener;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::request::{self, MakeRequestUuidV4};
use crate::http::response::{error_response, CorsHeaders};
use crate::http::users::users_handler;
use crate::lifecycle::ShutdownSignal;
use crate::upstream::{UpstreamError, UserDirectory};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub directory: UserDirectory,
    pub cors: CorsHeaders,
    pub expose_upstream_errors: bool,
}

impl AppState {
    pub fn from_config(config: &RelayConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            directory: UserDirectory::new(&config.upstream)?,
            cors: CorsHeaders::from_config(&config.cors),
            expose_upstream_errors: config.upstream.expose_errors,
        })
    }
}

/// HTTP server for the user relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, UpstreamError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let cors = state.cors.clone();
        Router::new()
            .route("/users", any(redirect_to_collection))
            .route("/users/", any(users_handler))
            .route("/users/{*rest}", any(users_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                        let request_id = request::request_id(req.headers()).unwrap_or("-");
                        tracing::info_span!(
                            "request",
                            method = %req.method(),
                            uri = %req.uri(),
                            request_id
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(HandleErrorLayer::new(move |err: BoxError| {
                        let cors = cors.clone();
                        async move { middleware_error_response(err, &cors) }
                    }))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Envelope for failures raised by the middleware stack itself.
///
/// Only the inbound timeout fails in practice; it is reported like any
/// other server-side failure so clients always get a JSON body.
fn middleware_error_response(err: BoxError, cors: &CorsHeaders) -> Response {
    if err.is::<Elapsed>() {
        tracing::error!("Request exceeded the inbound timeout");
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
    }
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    error_response(
        status,
        status.canonical_reason().unwrap_or("Internal Server Error"),
        cors,
    )
}

/// `/users` without the trailing slash moves permanently to `/users/`,
/// keeping the query string.
async fn redirect_to_collection(uri: Uri) -> Response {
    let location = match uri.query() {
        Some(query) => format!("/users/?{query}"),
        None => "/users/".to_string(),
    };
    match HeaderValue::from_str(&location) {
        Ok(location) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
        }
        Err(_) => StatusCode::MOVED_PERMANENTLY.into_response(),
    }
}
