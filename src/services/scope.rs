//! Per-view cancellation scope.
//!
//! Each request gets a child of the server's shutdown token. Store calls made
//! through [`ViewScope::run`] resolve to [`AppError::Cancelled`] once either the
//! server shuts down or the view itself is dropped.

use std::future::Future;

use axum::{extract::FromRequestParts, http::request::Parts};
use tokio_util::sync::CancellationToken;

use crate::errors::AppError;
use crate::AppState;

#[derive(Debug)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
        }
    }

    /// Drive `fut` to completion unless the scope is cancelled first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(AppError::Cancelled),
            result = fut => result,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl FromRequestParts<AppState> for ViewScope {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(ViewScope::new(&state.shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let root = CancellationToken::new();
        let scope = ViewScope::new(&root);
        let value = scope.run(async { Ok::<_, AppError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn shutdown_cancels_in_flight_work() {
        let root = CancellationToken::new();
        let scope = ViewScope::new(&root);
        root.cancel();
        let result = scope
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, AppError>(())
            })
            .await;
        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn dropping_a_view_leaves_siblings_running() {
        let root = CancellationToken::new();
        let first = ViewScope::new(&root);
        let second = ViewScope::new(&root);
        drop(first);
        assert!(!root.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn cancel_is_local_to_the_view() {
        let root = CancellationToken::new();
        let scope = ViewScope::new(&root);
        scope.cancel();
        assert!(scope.is_cancelled());
        assert!(!root.is_cancelled());
    }
}
