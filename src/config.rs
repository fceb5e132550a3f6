//! API endpoint configuration
//!
//! One base-URL resolution, performed once at startup: explicit value >
//! environment variable > default. Nothing else in the crate consults
//! the environment or hardcodes a host.

use crate::error::{AppError, Result};
use url::Url;

/// Environment variable consulted when no explicit base URL is given.
pub const ENV_BASE_URL: &str = "PAPERTRADE_API_URL";

/// Default backend address for local development.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Resolved API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Resolve from the environment, falling back to [`DEFAULT_BASE_URL`].
    ///
    /// An invalid value in the environment variable is an error, not a
    /// silent fallback.
    pub fn from_env() -> Result<Self> {
        match std::env::var(ENV_BASE_URL) {
            Ok(raw) if !raw.trim().is_empty() => Self::with_base_url(raw.trim()),
            _ => Self::with_base_url(DEFAULT_BASE_URL),
        }
    }

    /// Build from an explicit base URL (highest precedence).
    pub fn with_base_url(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let parsed = Url::parse(trimmed)
            .map_err(|e| AppError::Config(format!("Invalid API base URL '{trimmed}': {e}")))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::Config(format!(
                "API base URL must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: trimmed.trim_end_matches('/').to_string(),
        })
    }

    /// The resolved base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join an absolute path (starting with `/`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash() {
        let config = ApiConfig::with_base_url("http://localhost:8000/").unwrap();
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(config.endpoint("/quotes?symbols=TCS"), "http://localhost:8000/quotes?symbols=TCS");
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(ApiConfig::with_base_url("ftp://example.com").is_err());
        assert!(ApiConfig::with_base_url("not a url").is_err());
    }

    #[test]
    fn env_precedence_over_default() {
        // Single test touches the process environment to avoid races.
        std::env::set_var(ENV_BASE_URL, "https://api.papertrade.test/");
        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.base_url(), "https://api.papertrade.test");

        std::env::set_var(ENV_BASE_URL, "   ");
        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);

        std::env::remove_var(ENV_BASE_URL);
        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }
}
