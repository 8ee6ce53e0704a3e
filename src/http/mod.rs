//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign/propagate x-request-id)
//!     → users.rs (method dispatch, id parse, upstream lookup)
//!     → error.rs (failure → status + message)
//!     → response.rs (JSON body, envelope, CORS headers)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;
pub mod users;

pub use error::RelayError;
pub use request::X_REQUEST_ID;
pub use response::{CorsHeaders, ErrorEnvelope};
pub use server::{AppState, HttpServer};
