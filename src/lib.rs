//! User relay library.
//!
//! Serves `GET /users/{id}` by looking the id up in an upstream user
//! directory and reshaping the answer into a JSON body or a uniform
//! `{error, status_code}` envelope, with permissive CORS headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
