//! Upstream user directory subsystem.
//!
//! # Data Flow
//! ```text
//! http::users (parsed integer id)
//!     → client.rs (GET <base_url>/<id>, bounded by timeouts)
//!     → 404        → UpstreamError::UserNotFound
//!     → other      → types.rs (decode User)
//!     → transport  → UpstreamError::Transport
//! ```
//!
//! # Design Decisions
//! - One client per process, built at startup and shared through AppState
//! - No retries: every error is terminal for the request
//! - Dropping the lookup future cancels the in-flight request

pub mod client;
pub mod types;

pub use client::UserDirectory;
pub use types::{UpstreamError, User};
