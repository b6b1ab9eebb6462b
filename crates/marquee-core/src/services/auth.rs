//! Auth service client (GoTrue-style `/auth/v1` API).
//!
//! Tokens are never logged; `Session`'s `Debug` output redacts them.

use std::future::Future;

use anyhow::Result;
use chrono::Utc;
use marquee_types::{Session, User, UserMetadata};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::http::{build_client, expect_success, read_json};
use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};

/// The auth operations the recall flow depends on.
///
/// `AuthClient` is the production implementation; tests substitute stubs.
pub trait Authenticator: Send + Sync {
    /// Signs in with email and password.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = ServiceResult<Session>> + Send;

    /// Exchanges a refresh token for a fresh session.
    fn resume(&self, refresh_token: &str) -> impl Future<Output = ServiceResult<Session>> + Send;

    /// Revokes the session on the server.
    fn sign_out(&self, access_token: &str) -> impl Future<Output = ServiceResult<()>> + Send;
}

/// Connection details shared by the auth and row clients.
#[derive(Debug, Clone)]
pub struct Backend {
    pub(crate) base_url: String,
    pub(crate) anon_key: String,
    pub(crate) http: reqwest::Client,
}

impl Backend {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            http: build_client(),
        }
    }

    /// Builds the backend from config/env.
    ///
    /// # Errors
    /// Returns an error if the URL or anon key is missing or invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.backend_url()?, config.anon_key()?))
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Request with the public key and, when given, the user's bearer token.
    pub(crate) fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        access_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }
}

/// Result of a sign-up request.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// The account is active and signed in.
    SignedIn(Session),
    /// The service requires the user to confirm their email first.
    ConfirmationRequired { email: String },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        let expires_at = token
            .expires_at
            .or_else(|| token.expires_in.map(|secs| Utc::now().timestamp() + secs));
        Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user,
        }
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

/// Auth service client.
#[derive(Debug, Clone)]
pub struct AuthClient {
    backend: Backend,
}

impl AuthClient {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    async fn token_grant(&self, grant_type: &str, body: &impl Serialize) -> ServiceResult<Session> {
        let response = self
            .backend
            .request(reqwest::Method::POST, "/auth/v1/token", None)
            .query(&[("grant_type", grant_type)])
            .json(body)
            .send()
            .await?;

        let token: TokenResponse = read_json(response).await.map_err(ServiceError::into_auth)?;
        Ok(token.into())
    }

    /// Creates an account.
    ///
    /// # Errors
    /// Returns an `Auth` error when the service rejects the request.
    pub async fn sign_up(&self, email: &str, password: &str) -> ServiceResult<SignUpOutcome> {
        let response = self
            .backend
            .request(reqwest::Method::POST, "/auth/v1/signup", None)
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        let body: Value = read_json(response).await.map_err(ServiceError::into_auth)?;
        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body).map_err(ServiceError::decode)?;
            info!("account created and signed in");
            return Ok(SignUpOutcome::SignedIn(token.into()));
        }

        info!("account created, confirmation pending");
        Ok(SignUpOutcome::ConfirmationRequired {
            email: email.to_string(),
        })
    }

    /// Fetches the user behind `access_token`; `None` if the token is no
    /// longer valid.
    ///
    /// # Errors
    /// Returns an error on network failures or unexpected statuses.
    pub async fn current_user(&self, access_token: &str) -> ServiceResult<Option<User>> {
        let response = self
            .backend
            .request(reqwest::Method::GET, "/auth/v1/user", Some(access_token))
            .send()
            .await?;

        match read_json::<User>(response).await {
            Ok(user) => Ok(Some(user)),
            Err(err) if matches!(err.status, Some(401 | 403)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Updates profile metadata. `None` fields are left untouched.
    ///
    /// # Errors
    /// Returns an error when the service rejects the update.
    pub async fn update_profile(
        &self,
        access_token: &str,
        username: Option<&str>,
        avatar_url: Option<&str>,
    ) -> ServiceResult<User> {
        let metadata = UserMetadata {
            username: username.map(str::to_string),
            avatar_url: avatar_url.map(str::to_string),
        };
        self.update_user(access_token, &json!({ "data": metadata }))
            .await
    }

    /// Changes the password of the signed-in user.
    ///
    /// # Errors
    /// Returns an error when the service rejects the new password.
    pub async fn update_password(&self, access_token: &str, password: &str) -> ServiceResult<User> {
        self.update_user(access_token, &json!({ "password": password }))
            .await
    }

    async fn update_user(&self, access_token: &str, body: &Value) -> ServiceResult<User> {
        let response = self
            .backend
            .request(reqwest::Method::PUT, "/auth/v1/user", Some(access_token))
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}

impl Authenticator for AuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<Session> {
        let session = self
            .token_grant("password", &PasswordGrant { email, password })
            .await?;
        info!("signed in");
        Ok(session)
    }

    async fn resume(&self, refresh_token: &str) -> ServiceResult<Session> {
        self.token_grant("refresh_token", &json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_out(&self, access_token: &str) -> ServiceResult<()> {
        let response = self
            .backend
            .request(reqwest::Method::POST, "/auth/v1/logout", Some(access_token))
            .send()
            .await?;
        expect_success(response).await?;
        info!("signed out");
        Ok(())
    }
}
