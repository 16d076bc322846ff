//! Async JSON API client that never caches and never retries.
//!
//! # Overview
//! Reads a base URL from configuration, then exposes four verb helpers
//! (`get`, `post`, `put`, `del`) that issue requests against
//! `base_url + path`. Every request carries `cache-control` and `pragma`
//! headers forbidding any intermediary from storing the response, and is
//! attempted exactly once.
//!
//! # Design
//! - `ApiClient` is stateless and holds only `base_url`. It builds
//!   `HttpRequest` values and parses `HttpResponse` values without touching
//!   the network.
//! - `Transport` performs the single round-trip. `ReqwestTransport` is the
//!   default; tests substitute their own.
//! - `Api` glues the two together into the four async helpers. Failures are
//!   returned as-is; nothing is translated or recovered.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;

pub use api::Api;
pub use client::ApiClient;
pub use config::{ApiConfig, API_BASE_ENV, DEFAULT_API_BASE};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, CACHE_CONTROL_NO_STORE, PRAGMA_NO_CACHE};
pub use transport::{ReqwestTransport, Transport};
