//! Mock REST backend for sandbench exercises.
//!
//! Inside an execution context, every request whose path starts with `/api/`
//! is served locally by a [`MockBackend`]: a tiny resource model
//! (`/api/<collection>`, `/api/<collection>/:id`) backed by a persisted
//! in-memory store seeded from exercise data, with scripted latency and
//! failure injection. Requests outside `/api/` pass through to a real
//! [`Upstream`] transport unchanged.
//!
//! From the exercise code's point of view the backend is indistinguishable
//! from a real (flaky) server: validation failures come back as 4xx
//! responses, injected chaos as 5xx, and nothing the exercise sends can make
//! the backend itself fail.

mod backend;
mod chaos;
mod db;
mod types;
mod upstream;

pub use backend::{reset_mock_db, CollectionRules, MockBackend};
pub use chaos::{ChaosConfig, ChaosState};
pub use db::MockDb;
pub use types::{ApiRequest, ApiResponse, Method};
pub use upstream::Upstream;

#[cfg(feature = "passthrough")]
pub use upstream::HttpUpstream;

/// Errors raised by the mock backend's own machinery.
///
/// These never reach exercise code: the backend maps them to 5xx responses
/// at its boundary. They surface directly only through host-side operations
/// such as [`reset_mock_db`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] sandbench_kv::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("invalid request URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("invalid HTTP method: {method}")]
    InvalidMethod { method: String },

    #[error("no upstream transport configured for '{url}'")]
    NoUpstream { url: String },

    #[cfg(feature = "passthrough")]
    #[error("upstream error: {0}")]
    UpstreamTransport(#[from] reqwest::Error),
}
