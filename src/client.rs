use std::fmt;
use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use tokio::time::sleep;

use crate::{
    ApiRequest, ApiResponse, ClientConfig, ReqresError, Result, RetryPolicy, UsersApi,
};

/// Resilient HTTP client for the ReqRes demo API.
///
/// Issues one logical operation per [`send`](ReqresClient::send) call,
/// transparently retrying transient failures with exponential backoff and
/// honoring server `Retry-After` pacing. Holds no cross-request state beyond
/// the immutable configuration and the underlying connection pool, so one
/// instance per test session (or per worker) is the intended lifecycle.
#[derive(Clone)]
pub struct ReqresClient {
    http: reqwest::Client,
    config: ClientConfig,
    policy: RetryPolicy,
}

impl fmt::Debug for ReqresClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqresClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("policy", &self.policy)
            .finish()
    }
}

impl ReqresClient {
    /// Creates a client from an explicit configuration with the default
    /// retry policy. Misconfiguration fails here, never mid-test.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_policy(config, RetryPolicy::default())
    }

    /// Creates a client with an explicit retry policy.
    pub fn with_policy(config: ClientConfig, policy: RetryPolicy) -> Result<Self> {
        policy.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|err| ReqresError::Config(format!("invalid API key value: {err}")))?;
        default_headers.insert("x-api-key", api_key);

        let http = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(|err| ReqresError::Config(format!("http client construction: {err}")))?;

        Ok(Self {
            http,
            config,
            policy,
        })
    }

    /// Creates a client from `BASE_URL` / `REQRES_API_KEY` environment
    /// variables, falling back to the public demo API defaults.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Typed bindings for the user and auth endpoints.
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    /// Convenience GET without body or overrides.
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::get(path)).await
    }

    /// Convenience DELETE without body or overrides.
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Issues one logical operation, retrying per policy.
    ///
    /// Any HTTP status — success or failure — on a terminal attempt comes
    /// back as an [`ApiResponse`]; the returned status and body always
    /// reflect the last attempt. Only transport failures that exhaust the
    /// retry budget are returned as [`ReqresError::Transport`].
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let policy = match &request.policy {
            Some(policy) => {
                policy.validate()?;
                policy.clone()
            }
            None => self.policy.clone(),
        };
        let url = self
            .config
            .base_url
            .join(&request.path)
            .map_err(|err| ReqresError::Config(format!("invalid path '{}': {err}", request.path)))?;
        let timeout = request.timeout.unwrap_or(self.config.timeout);

        let started = Instant::now();
        let mut attempt = 1u32;
        loop {
            let mut builder = self
                .http
                .request(request.method.clone(), url.clone())
                .headers(request.headers.clone())
                .timeout(timeout);
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            // A failure while reading the body is a transport failure too,
            // so fold it into the same outcome as the send itself.
            let outcome = match builder.send().await {
                Ok(response) => {
                    let status = response.status();
                    let headers = response.headers().clone();
                    response.text().await.map(|body| (status, headers, body))
                }
                Err(err) => Err(err),
            };

            match outcome {
                Ok((status, headers, body)) => {
                    let retryable = policy.is_retryable_status(status.as_u16());
                    if retryable && attempt < policy.max_attempts {
                        let delay = match retry_after(&headers) {
                            Some(wait) => policy.clamp_server_delay(wait),
                            None => policy.delay_for(attempt),
                        };
                        tracing::debug!(
                            status = status.as_u16(),
                            attempt,
                            max_attempts = policy.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            "retrying after retryable status"
                        );
                        sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    if retryable {
                        tracing::warn!(
                            status = status.as_u16(),
                            attempts = attempt,
                            "retry budget exhausted, returning last response"
                        );
                    }
                    return Ok(ApiResponse {
                        status,
                        headers,
                        body,
                        elapsed: started.elapsed(),
                        attempts: attempt,
                    });
                }
                Err(err) => {
                    if should_retry_transport(&err) && attempt < policy.max_attempts {
                        let delay = policy.delay_for(attempt);
                        tracing::debug!(
                            error = %err,
                            attempt,
                            max_attempts = policy.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            "retrying after transport error"
                        );
                        sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(ReqresError::Transport {
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }
}

fn should_retry_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}

/// Parses a `Retry-After` header in its delay-seconds form. The HTTP-date
/// form falls through to the computed backoff.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
