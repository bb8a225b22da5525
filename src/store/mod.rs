//! Client for the external hosted store: the REST data API and the auth API.
//!
//! Every call is a single request. There are no retries and no caching; the
//! store is the source of truth and callers re-fetch on failure.

pub mod auth;
pub mod query;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub use auth::AuthClient;
pub use query::Query;

/// Failure talking to the external store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store rejected request ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("store returned no rows")]
    Empty,
}

impl StoreError {
    /// Postgres unique-violation surfaced by the data API.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::Api { code: Some(code), .. } if code == "23505")
    }

    /// Foreign-key violation (row still referenced elsewhere).
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, StoreError::Api { code: Some(code), .. } if code == "23503")
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Api { status, .. } => Some(*status),
            StoreError::Transport(e) => e.status().map(|s| s.as_u16()),
            StoreError::Empty => None,
        }
    }
}

/// Error body returned by the data and auth APIs. Both dialects are covered:
/// the data API uses `code`/`message`, the auth API uses `error_code`/`msg`
/// or `error`/`error_description`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<serde_json::Value>,
    error_code: Option<String>,
    message: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Turn a non-success response into a `StoreError::Api`.
pub(crate) async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let code = body
        .error_code
        .or_else(|| {
            body.code.map(|c| match c {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
        })
        .or(body.error.clone());
    let message = body
        .message
        .or(body.msg)
        .or(body.error_description)
        .or(body.error)
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.to_string()
            } else {
                text
            }
        });
    Err(StoreError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

/// Typed wrapper around the hosted REST data API.
///
/// Cloning is cheap. `as_user` scopes a clone to a caller's access token so
/// the store's row-level policies apply to that caller.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: Client,
    base_url: String,
    api_key: String,
    bearer: Option<String>,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            bearer: None,
        }
    }

    /// A clone that authenticates as the given user.
    pub fn as_user(&self, access_token: &str) -> Self {
        Self {
            bearer: Some(access_token.to_string()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{table}", self.base_url);
        let bearer = self.bearer.as_deref().unwrap_or(&self.api_key);
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    /// Fetch every row matching `query`.
    pub async fn select<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        let response = self
            .request(Method::GET, query.table_name())
            .query(&query.params())
            .send()
            .await?;
        let rows = check(response).await?.json::<Vec<T>>().await?;
        tracing::debug!(table = query.table_name(), rows = rows.len(), "Store select");
        Ok(rows)
    }

    /// Fetch the first row matching `query`, if any.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        query: &Query,
    ) -> Result<Option<T>, StoreError> {
        let rows = self.select::<T>(&query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<B, T>(&self, table: &str, row: &B) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;
        let rows = check(response).await?.json::<Vec<T>>().await?;
        rows.into_iter().next().ok_or(StoreError::Empty)
    }

    /// Insert or merge rows on the `on_conflict` columns.
    pub async fn upsert<B, T>(
        &self,
        table: &str,
        on_conflict: &str,
        rows: &[B],
    ) -> Result<Vec<T>, StoreError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, table)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(rows)
            .send()
            .await?;
        Ok(check(response).await?.json::<Vec<T>>().await?)
    }

    /// Patch every row matching the query's filters.
    pub async fn update<B, T>(&self, query: &Query, patch: &B) -> Result<Vec<T>, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::PATCH, query.table_name())
            .query(&query.filter_params())
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;
        Ok(check(response).await?.json::<Vec<T>>().await?)
    }

    /// Delete every row matching the query's filters, returning how many went.
    pub async fn delete(&self, query: &Query) -> Result<usize, StoreError> {
        let response = self
            .request(Method::DELETE, query.table_name())
            .query(&query.filter_params())
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows = check(response).await?.json::<Vec<serde_json::Value>>().await?;
        Ok(rows.len())
    }

    /// Cheap reachability probe used by the readiness check.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .http
            .get(format!("{}/rest/v1/", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        check(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_detection() {
        let err = StoreError::Api {
            status: 409,
            code: Some("23505".to_string()),
            message: "duplicate key".to_string(),
        };
        assert!(err.is_unique_violation());
        assert!(!err.is_foreign_key_violation());
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn empty_has_no_status() {
        assert_eq!(StoreError::Empty.status(), None);
    }

    #[test]
    fn as_user_keeps_base_url() {
        let store = StoreClient::new("http://localhost:54321/", "anon");
        let scoped = store.as_user("token");
        assert_eq!(scoped.base_url(), "http://localhost:54321");
        assert_eq!(scoped.api_key(), "anon");
        assert_eq!(scoped.bearer.as_deref(), Some("token"));
        assert!(store.bearer.is_none());
    }
}
