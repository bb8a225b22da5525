//! Role and tenant extractors for Axum handlers.
//!
//! Each one resolves the caller's role record through the store as that
//! caller, and rejects the request when the record is missing. The lookups
//! run in their own [`ViewScope`] so a server shutdown cuts them short too.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::business::Business;
use crate::models::client::Client;
use crate::services::{
    auth as auth_service, business as business_service, client as client_service,
};
use crate::services::scope::ViewScope;
use crate::store::StoreClient;
use crate::AppState;

/// Extractor that requires the user to hold an admin account.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        let scope = ViewScope::new(&state.shutdown);
        let store = user.store(state);
        if scope
            .run(auth_service::find_admin(&store, user.id))
            .await?
            .is_none()
        {
            return Err(AppError::Forbidden(
                "Platform admin access required".to_string(),
            ));
        }
        Ok(RequireAdmin(user))
    }
}

/// The business managed by the signed-in user.
#[derive(Debug, Clone)]
pub struct BusinessContext {
    pub user: CurrentUser,
    pub business: Business,
    pub store: StoreClient,
}

impl BusinessContext {
    pub fn business_id(&self) -> Uuid {
        self.business.id
    }
}

impl FromRequestParts<AppState> for BusinessContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        let store = user.store(state);
        let business = ViewScope::new(&state.shutdown)
            .run(business_service::find_by_admin(&store, user.id))
            .await?
            .ok_or_else(|| AppError::Forbidden("Business account required".to_string()))?;
        Ok(BusinessContext {
            user,
            business,
            store,
        })
    }
}

/// The signed-in client of the business named in the path.
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub user: CurrentUser,
    pub business: Business,
    pub client: Client,
    pub store: StoreClient,
}

impl ClientContext {
    pub fn business_id(&self) -> Uuid {
        self.business.id
    }
}

impl FromRequestParts<AppState> for ClientContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(business_id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Validation("Invalid business id".to_string()))?;
        let user = CurrentUser::from_request_parts(parts, state).await?;
        let scope = ViewScope::new(&state.shutdown);
        let email = match &user.email {
            Some(email) => email.clone(),
            // Tokens minted without the email claim: ask the provider.
            None => scope
                .run(async {
                    state
                        .auth
                        .get_user(&user.access_token)
                        .await
                        .map_err(AppError::from)
                })
                .await?
                .email
                .ok_or(AppError::Unauthorized)?,
        };
        let store = user.store(state);

        let business = scope
            .run(business_service::find_by_id(&store, business_id))
            .await?;
        let client = scope
            .run(client_service::find_by_email(&store, business_id, &email))
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("No client account for this business".to_string())
            })?;
        Ok(ClientContext {
            user,
            business,
            client,
            store,
        })
    }
}
