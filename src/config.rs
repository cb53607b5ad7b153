use std::time::Duration;

use reqwest::Url;

use crate::{ReqresError, Result};

/// Default target when `BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://reqres.in";

/// Free-tier API key accepted by the demo API.
pub const DEFAULT_API_KEY: &str = "reqres-free-v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable client configuration.
///
/// Always passed explicitly into [`ReqresClient::new`](crate::ReqresClient::new)
/// so that clients with different targets can coexist in one process (e.g.
/// parallel test workers). Nothing here is read from ambient global state
/// after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the API under test.
    pub base_url: Url,
    /// Value sent as the `x-api-key` header on every request.
    pub api_key: String,
    /// Per-attempt timeout applied when the request carries no override.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Builds a config from an explicit base URL, rejecting malformed URLs.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| ReqresError::Config(format!("invalid base URL '{base_url}': {err}")))?;
        if !base_url.has_host() {
            return Err(ReqresError::Config(format!(
                "base URL '{base_url}' has no host"
            )));
        }
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Builds a config from environment variables.
    ///
    /// Reads:
    /// - `BASE_URL` — base URL of the API under test (default `https://reqres.in`)
    /// - `REQRES_API_KEY` — API key (default free-tier key)
    ///
    /// A variable that is set but empty falls back to its default.
    pub fn from_env() -> Result<Self> {
        let base_url = non_empty_env("BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let api_key = non_empty_env("REQRES_API_KEY").unwrap_or_else(|| DEFAULT_API_KEY.to_owned());
        Self::new(&base_url, api_key)
    }

    /// Overrides the default per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::ClientConfig;
    use crate::ReqresError;

    #[test]
    fn valid_base_url_is_accepted() {
        let config = ClientConfig::new("https://reqres.in", "key").expect("config must build");
        assert_eq!(config.base_url.as_str(), "https://reqres.in/");
        assert_eq!(config.api_key, "key");
    }

    #[test]
    fn malformed_base_url_is_rejected_at_construction() {
        let err = ClientConfig::new("not a url", "key").expect_err("must reject");
        assert!(matches!(err, ReqresError::Config(_)));
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let err = ClientConfig::new("/api/users", "key").expect_err("must reject");
        assert!(matches!(err, ReqresError::Config(_)));
    }
}
