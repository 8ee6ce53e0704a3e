//! The `/users/{id}` relay handler.
//!
//! `OPTIONS` answers the CORS preflight, `GET` looks the user up in the
//! directory, and every other method is rejected with 405. Neither the
//! preflight nor a rejected method touches the upstream.

use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::Response,
};

use crate::http::error::RelayError;
use crate::http::request;
use crate::http::response::{error_response, json_response, preflight_response};
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn users_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let request_id = request::request_id(&headers);

    let response = match relay(&state, &method, uri.path(), request_id).await {
        Ok(response) => response,
        Err(err) => render_error(&state, err, request_id.unwrap_or("unknown")),
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}

async fn relay(
    state: &AppState,
    method: &Method,
    path: &str,
    request_id: Option<&str>,
) -> Result<Response, RelayError> {
    match *method {
        Method::GET => {}
        Method::OPTIONS => return Ok(preflight_response(&state.cors)),
        _ => return Err(RelayError::MethodNotAllowed(method.clone())),
    }

    let id = parse_user_id(path)?;
    let user = state.directory.fetch_user(id, request_id).await?;

    let mut response = json_response(StatusCode::OK, &user);
    state.cors.apply(response.headers_mut());
    Ok(response)
}

fn render_error(state: &AppState, err: RelayError, request_id: &str) -> Response {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(request_id, status = status.as_u16(), error = ?err, "User lookup failed");
    } else {
        tracing::debug!(request_id, status = status.as_u16(), error = %err, "User lookup rejected");
    }
    error_response(
        status,
        err.client_message(state.expose_upstream_errors),
        &state.cors,
    )
}

/// Parse the user id from the final path segment.
///
/// Trailing slashes are ignored, so `/users/5/` reads as `5`, while
/// `/users/` reads as the segment `users` and fails.
pub fn parse_user_id(path: &str) -> Result<i64, RelayError> {
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    segment
        .parse()
        .map_err(|_| RelayError::InvalidUserId(segment.to_string()))
}
