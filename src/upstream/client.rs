//! Reqwest-backed user directory client.
//!
//! Owns transport details only: URL construction, timeouts, status
//! mapping, and JSON decoding into [`User`].

use std::time::{Duration, Instant};

use reqwest::{header, Client, StatusCode, Url};

use crate::config::UpstreamConfig;
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;
use crate::upstream::types::{UpstreamError, User};

/// Client for the fixed upstream user directory.
///
/// Cheap to share: the inner reqwest client pools connections and is
/// reference counted.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    client: Client,
    base_url: Url,
}

impl UserDirectory {
    /// Build a client with explicit total and connect timeouts.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| UpstreamError::InvalidBaseUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::InvalidBaseUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(UpstreamError::Client)?;

        Ok(Self { client, base_url })
    }

    /// URL of a single user: the base URL plus `id` as one more segment.
    pub fn user_url(&self, id: i64) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL can carry path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string());
        }
        url
    }

    /// Fetch one user by id.
    ///
    /// Only a 404 is treated specially; any other status has its body
    /// decoded as a user.
    pub async fn fetch_user(
        &self,
        id: i64,
        request_id: Option<&str>,
    ) -> Result<User, UpstreamError> {
        let start = Instant::now();
        let result = self.lookup(id, request_id).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.outcome(),
        };
        metrics::record_upstream(outcome, start);

        result
    }

    async fn lookup(&self, id: i64, request_id: Option<&str>) -> Result<User, UpstreamError> {
        let url = self.user_url(id);
        tracing::debug!(url = %url, request_id = request_id.unwrap_or("-"), "Fetching user");

        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json");
        if let Some(request_id) = request_id {
            request = request.header(X_REQUEST_ID, request_id);
        }

        let response = request.send().await.map_err(UpstreamError::Transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(UpstreamError::UserNotFound);
        }

        let body = response.bytes().await.map_err(UpstreamError::Transport)?;
        serde_json::from_slice(&body).map_err(UpstreamError::Decode)
    }
}
