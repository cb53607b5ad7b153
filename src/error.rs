/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ReqresError {
    /// Invalid base URL or malformed retry policy, rejected at construction.
    #[error("configuration error: {0}")]
    Config(String),
    /// Network-level failure that survived the whole retry budget.
    #[error("transport error after {attempts} attempt(s): {source}")]
    Transport {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Last underlying cause from `reqwest`.
        source: reqwest::Error,
    },
    /// Non-success HTTP status surfaced by the typed API layer.
    ///
    /// `ReqresClient::send` never returns this — HTTP-level failures come
    /// back as ordinary [`ApiResponse`](crate::ApiResponse) values so tests
    /// can assert on them.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Response body did not match the expected JSON shape.
    #[error("decode error: {0}")]
    Decode(String),
}
