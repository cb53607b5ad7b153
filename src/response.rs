use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::{ReqresError, Result};

/// Normalized outcome of one logical operation, reflecting the *last*
/// attempt. HTTP-level failures (4xx/5xx) arrive here as plain values so the
/// caller can assert on them; only transport exhaustion is an error.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    /// Status code of the last attempt.
    pub status: StatusCode,
    /// Response headers of the last attempt.
    pub headers: HeaderMap,
    /// Raw body text; JSON is decoded lazily via [`ApiResponse::json`].
    pub body: String,
    /// Wall-clock time across all attempts, backoff sleeps included.
    pub elapsed: Duration,
    /// Attempts made, never more than the policy's `max_attempts`.
    pub attempts: u32,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decodes the body into `T`, with the offending payload in the error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            ReqresError::Decode(format!("invalid response JSON: {err}; body: {}", self.body))
        })
    }

    /// Decodes the body as untyped JSON.
    pub fn json_value(&self) -> Result<serde_json::Value> {
        self.json()
    }

    /// Returns a header value as UTF-8, if present and valid.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}
