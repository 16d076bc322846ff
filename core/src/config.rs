//! Base URL configuration.
//!
//! The base URL comes from `API_BASE`, optionally supplied through a `.env`
//! file. An unset variable falls back to `DEFAULT_API_BASE`; a variable set
//! to the empty string is kept empty so requests go out as bare paths.

/// Environment variable holding the API base URL.
pub const API_BASE_ENV: &str = "API_BASE";

/// Base URL used when `API_BASE` is unset.
pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
        }
    }

    /// Load `.env` if present, then read `API_BASE` from the process
    /// environment.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the config through `lookup` instead of the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(API_BASE_ENV).unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self::new(&raw)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

/// Strip every trailing `/` from a base URL.
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim_end_matches('/').to_string()
}
