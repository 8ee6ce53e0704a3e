//! User record and upstream error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A user as returned by the directory service.
///
/// Only `email` and `name` are kept; any other upstream fields are
/// ignored and absent ones decode as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct User {
    pub email: String,
    pub name: String,
}

/// Errors that can occur while looking up a user.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The directory answered 404 for the id.
    #[error("user not found")]
    UserNotFound,

    /// DNS, connect, timeout or body read failure.
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The body was not a JSON user object.
    #[error("invalid user payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),

    /// The configured base URL cannot be used to build user URLs.
    #[error("invalid upstream base URL `{0}`")]
    InvalidBaseUrl(String),
}

impl UpstreamError {
    /// Metric label for the lookup outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            UpstreamError::UserNotFound => "not_found",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Decode(_) => "decode",
            UpstreamError::Client(_) | UpstreamError::InvalidBaseUrl(_) => "config",
        }
    }
}
