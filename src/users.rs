//! Typed bindings for the ReqRes user and auth endpoints.
//!
//! The serde models double as the schema-conformance check: a response that
//! deserializes has the shape the API contract promises. Non-success
//! statuses other than the modeled ones surface as [`ReqresError::Http`] —
//! unlike [`ReqresClient::send`], this layer is for callers that expect the
//! happy path.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{ApiRequest, ApiResponse, ReqresClient, ReqresError, Result};

const USERS_PATH: &str = "/api/users";
const LOGIN_PATH: &str = "/api/login";
const REGISTER_PATH: &str = "/api/register";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Support {
    pub url: String,
    pub text: String,
}

/// Paginated list envelope returned by `GET /api/users`.
#[derive(Clone, Debug, Deserialize)]
pub struct UserPage {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
    pub data: Vec<User>,
    #[serde(default)]
    pub support: Option<Support>,
}

#[derive(Debug, Deserialize)]
struct SingleUser {
    data: User,
}

/// Payload for create and update operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub job: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job: job.into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreatedUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpdatedUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Login / registration payload. `password` is optional so negative tests
/// can submit the missing-password case the API rejects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Some(password.into()),
        }
    }

    /// Credentials with the password deliberately omitted.
    pub fn email_only(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Token {
    pub token: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Registration {
    pub id: u64,
    pub token: String,
}

/// Error envelope the API uses for rejected requests.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Typed operations over a borrowed [`ReqresClient`].
#[derive(Clone, Copy, Debug)]
pub struct UsersApi<'a> {
    client: &'a ReqresClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ReqresClient) -> Self {
        Self { client }
    }

    /// Fetches one page of the user listing.
    pub async fn list(&self, page: u32) -> Result<UserPage> {
        let response = self
            .client
            .send(ApiRequest::get(USERS_PATH).query("page", page))
            .await?;
        expect_success(response)?.json()
    }

    /// Fetches a single user, `None` when the API reports 404.
    pub async fn get(&self, id: u64) -> Result<Option<User>> {
        let response = self.client.get(&format!("{USERS_PATH}/{id}")).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let single: SingleUser = expect_success(response)?.json()?;
        Ok(Some(single.data))
    }

    /// Creates a user, expecting 201 with the generated id and timestamp.
    pub async fn create(&self, user: &NewUser) -> Result<CreatedUser> {
        let response = self
            .client
            .send(ApiRequest::post(USERS_PATH).json(user)?)
            .await?;
        expect_success(response)?.json()
    }

    /// Replaces a user via PUT.
    pub async fn update(&self, id: u64, user: &NewUser) -> Result<UpdatedUser> {
        let response = self
            .client
            .send(ApiRequest::put(format!("{USERS_PATH}/{id}")).json(user)?)
            .await?;
        expect_success(response)?.json()
    }

    /// Partially updates a user via PATCH.
    pub async fn patch(&self, id: u64, user: &NewUser) -> Result<UpdatedUser> {
        let response = self
            .client
            .send(ApiRequest::patch(format!("{USERS_PATH}/{id}")).json(user)?)
            .await?;
        expect_success(response)?.json()
    }

    /// Deletes a user. The API answers 204 with an empty body.
    pub async fn delete(&self, id: u64) -> Result<()> {
        let response = self.client.delete(&format!("{USERS_PATH}/{id}")).await?;
        expect_success(response)?;
        Ok(())
    }

    /// Exchanges credentials for a session token.
    pub async fn login(&self, credentials: &Credentials) -> Result<Token> {
        let response = self
            .client
            .send(ApiRequest::post(LOGIN_PATH).json(credentials)?)
            .await?;
        expect_success(response)?.json()
    }

    /// Registers a new account, returning its id and token.
    pub async fn register(&self, credentials: &Credentials) -> Result<Registration> {
        let response = self
            .client
            .send(ApiRequest::post(REGISTER_PATH).json(credentials)?)
            .await?;
        expect_success(response)?.json()
    }
}

fn expect_success(response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ReqresError::Http {
            status: response.status.as_u16(),
            body: response.body,
        })
    }
}
