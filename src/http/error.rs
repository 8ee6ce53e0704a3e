//! Relay error taxonomy and its HTTP mapping.

use axum::http::{Method, StatusCode};
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Terminal failure of one `/users/` request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The final path segment is not an integer. Reported as an absent
    /// resource rather than a bad request.
    #[error("Not Found")]
    InvalidUserId(String),

    #[error("Method Not Allowed")]
    MethodNotAllowed(Method),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidUserId(_) => StatusCode::NOT_FOUND,
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Upstream(UpstreamError::UserNotFound) => StatusCode::NOT_FOUND,
            RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the envelope's `error` field.
    ///
    /// Server errors carry only the canonical reason phrase unless
    /// `expose_detail` is set.
    pub fn client_message(&self, expose_detail: bool) -> String {
        let status = self.status();
        if status.is_server_error() && !expose_detail {
            return status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string();
        }
        self.to_string()
    }
}
