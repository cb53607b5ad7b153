//! `reqres-http` is a resilient async HTTP client for the ReqRes demo API,
//! built for black-box API test suites.
//!
//! The core is [`ReqresClient::send`]: one logical operation per call, with
//! transparent retry, exponential backoff and `Retry-After` pacing. HTTP
//! failures come back as plain [`ApiResponse`] values so negative tests can
//! assert on them; typed bindings for the user and auth endpoints live in
//! [`users`], and [`report`] converts load-test stats into Allure result
//! records.

mod client;
mod config;
mod error;
mod policy;
pub mod report;
mod request;
mod response;
pub mod users;

pub use client::ReqresClient;
pub use config::{ClientConfig, DEFAULT_API_KEY, DEFAULT_BASE_URL};
pub use error::ReqresError;
pub use policy::{RetryPolicy, DEFAULT_RETRY_STATUSES};
pub use request::ApiRequest;
pub use response::ApiResponse;
pub use users::UsersApi;

pub type Result<T> = std::result::Result<T, ReqresError>;
