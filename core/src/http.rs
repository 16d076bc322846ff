//! HTTP requests and responses described as plain data.
//!
//! # Design
//! `ApiClient` produces `HttpRequest` values and consumes `HttpResponse`
//! values; a `Transport` sits in between and does the I/O. Owned fields keep
//! both types trivially `Send` and easy to assert on in tests.

/// Value of the `cache-control` header sent with every request.
pub const CACHE_CONTROL_NO_STORE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate";

/// Value of the legacy `pragma` header sent with every request.
pub const PRAGMA_NO_CACHE: &str = "no-cache";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is the full target: base URL, path and query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The two headers that keep browsers, proxies and shared caches from
/// storing or reusing a response.
pub fn no_cache_headers() -> Vec<(String, String)> {
    vec![
        ("cache-control".to_string(), CACHE_CONTROL_NO_STORE.to_string()),
        ("pragma".to_string(), PRAGMA_NO_CACHE.to_string()),
    ]
}
