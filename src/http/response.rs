//! Response construction.
//!
//! # Responsibilities
//! - Serialize JSON bodies with `Content-Type: application/json`
//! - Build the `{error, status_code}` envelope for failures
//! - Attach CORS headers
//!
//! # Design Decisions
//! - A body that fails to serialize becomes a logged, bare 500; it never
//!   panics the connection task
//! - CORS values are fixed apart from the allowed origin

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::config::CorsConfig;

/// Value of `Access-Control-Allow-Methods`.
pub const CORS_ALLOW_METHODS: &str = "GET, OPTIONS";

/// Value of `Access-Control-Allow-Headers`.
pub const CORS_ALLOW_HEADERS: &str = "Accept, Accept-Encoding, Content-Type, Content-Length";

/// JSON body for every non-2xx relay response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub status_code: u16,
}

impl ErrorEnvelope {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status_code: status.as_u16(),
        }
    }
}

/// Resolved CORS header set, built once from config.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_origin: HeaderValue,
    include_on_errors: bool,
}

impl CorsHeaders {
    /// Build from config. An origin that is not a valid header value
    /// falls back to `*`; validation rejects such configs earlier.
    pub fn from_config(config: &CorsConfig) -> Self {
        let allow_origin = HeaderValue::from_str(&config.allow_origin)
            .unwrap_or_else(|_| HeaderValue::from_static("*"));
        Self {
            allow_origin,
            include_on_errors: config.include_on_errors,
        }
    }

    pub fn include_on_errors(&self) -> bool {
        self.include_on_errors
    }

    /// Insert the three `Access-Control-Allow-*` headers.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            self.allow_origin.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        );
    }
}

impl Default for CorsHeaders {
    fn default() -> Self {
        Self::from_config(&CorsConfig::default())
    }
}

/// Serialize `body` as JSON with the given status.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        }
        Err(e) => {
            tracing::error!(error = %e, intended_status = status.as_u16(), "Failed to serialize response body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Error envelope response, with CORS headers when the policy asks for them.
pub fn error_response(status: StatusCode, message: impl Into<String>, cors: &CorsHeaders) -> Response {
    let mut response = json_response(status, &ErrorEnvelope::new(status, message));
    if cors.include_on_errors() {
        cors.apply(response.headers_mut());
    }
    response
}

/// Empty 200 answer to a CORS preflight.
pub fn preflight_response(cors: &CorsHeaders) -> Response {
    let mut response = StatusCode::OK.into_response();
    cors.apply(response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_cors(headers: &HeaderMap, origin: &str) {
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], origin);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Accept, Accept-Encoding, Content-Type, Content-Length"
        );
    }

    #[test]
    fn envelope_wire_shape() {
        let envelope = ErrorEnvelope::new(StatusCode::NOT_FOUND, "Not Found");
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"error":"Not Found","status_code":404}"#
        );
    }

    #[test]
    fn json_response_sets_status_and_content_type() {
        let response = json_response(StatusCode::OK, &serde_json::json!({"a": 1}));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn preflight_carries_cors_headers() {
        let response = preflight_response(&CorsHeaders::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(response.headers(), "*");
    }

    #[test]
    fn error_cors_follows_policy() {
        let with = error_response(StatusCode::NOT_FOUND, "Not Found", &CorsHeaders::default());
        assert_eq!(with.status(), StatusCode::NOT_FOUND);
        assert_cors(with.headers(), "*");

        let without = CorsHeaders::from_config(&CorsConfig {
            include_on_errors: false,
            ..CorsConfig::default()
        });
        let response = error_response(StatusCode::NOT_FOUND, "Not Found", &without);
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn custom_origin() {
        let cors = CorsHeaders::from_config(&CorsConfig {
            allow_origin: "https://app.example.com".into(),
            ..CorsConfig::default()
        });
        let mut headers = HeaderMap::new();
        cors.apply(&mut headers);
        assert_cors(&headers, "https://app.example.com");
    }
}
