//! Client for the external auth provider (sign-up, sign-in, session lookup).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check, StoreClient, StoreError};

/// User record as returned by the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Session issued by the auth provider on sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: AuthUser,
}

/// Sign-up returns a session when email confirmation is off and a bare user
/// otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpOutcome {
    Session(Session),
    User(AuthUser),
}

impl SignUpOutcome {
    pub fn user(&self) -> &AuthUser {
        match self {
            SignUpOutcome::Session(session) => &session.user,
            SignUpOutcome::User(user) => user,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SignUpOutcome::Session(session) => Some(session),
            SignUpOutcome::User(_) => None,
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a serde_json::Value,
}

#[derive(Serialize)]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

/// Auth API client sharing the store's HTTP connection pool and API key.
#[derive(Debug, Clone)]
pub struct AuthClient {
    store: StoreClient,
}

impl AuthClient {
    pub fn new(store: &StoreClient) -> Self {
        Self {
            store: store.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.store.base_url())
    }

    /// Register a new account; `metadata` is stored on the auth user.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &serde_json::Value,
    ) -> Result<SignUpOutcome, StoreError> {
        let response = self
            .store
            .http()
            .post(self.url("signup"))
            .header("apikey", self.store.api_key())
            .json(&SignUpBody {
                email,
                password,
                data: metadata,
            })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Exchange email and password for a session.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, StoreError> {
        let response = self
            .store
            .http()
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", self.store.api_key())
            .json(&Credentials { email, password })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Exchange a refresh token for a fresh session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, StoreError> {
        let response = self
            .store
            .http()
            .post(self.url("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", self.store.api_key())
            .json(&RefreshBody { refresh_token })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Look up the user owning an access token.
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, StoreError> {
        let response = self
            .store
            .http()
            .get(self.url("user"))
            .header("apikey", self.store.api_key())
            .bearer_auth(access_token)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Revoke the session behind an access token.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), StoreError> {
        let response = self
            .store
            .http()
            .post(self.url("logout"))
            .header("apikey", self.store.api_key())
            .bearer_auth(access_token)
            .send()
            .await?;
        check(response).await.map(|_| ())
    }
}
