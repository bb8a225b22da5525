//! Authentication routes: role logins, registrations, refresh, logout, profile.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::services::auth::{
    self as auth_service, AdminRegistration, AuthResponse, BusinessRegistration,
    ClientRegistration, LoginRequest, Me, RefreshRequest, SessionTokens,
};
use crate::services::scope::ViewScope;
use crate::AppState;

/// POST /api/v1/auth/admin/register
pub async fn admin_register(
    State(state): State<AppState>,
    scope: ViewScope,
    Json(body): Json<AdminRegistration>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let out = scope
        .run(auth_service::register_admin(&state.auth, &state.store, &body))
        .await?;
    Ok(ApiResponse::success(out))
}

/// POST /api/v1/auth/admin/login
pub async fn admin_login(
    State(state): State<AppState>,
    scope: ViewScope,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let out = scope
        .run(auth_service::login_admin(&state.auth, &state.store, &body))
        .await?;
    Ok(ApiResponse::success(out))
}

/// POST /api/v1/auth/business/login
pub async fn business_login(
    State(state): State<AppState>,
    scope: ViewScope,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let out = scope
        .run(auth_service::login_business(&state.auth, &state.store, &body))
        .await?;
    Ok(ApiResponse::success(out))
}

/// POST /api/v1/auth/business/register
pub async fn business_register(
    State(state): State<AppState>,
    scope: ViewScope,
    Json(body): Json<BusinessRegistration>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let out = scope
        .run(auth_service::register_business(&state.auth, &state.store, &body))
        .await?;
    Ok(ApiResponse::success(out))
}

/// POST /api/v1/auth/client/{business_id}/register
pub async fn client_register(
    State(state): State<AppState>,
    scope: ViewScope,
    Path(business_id): Path<Uuid>,
    Json(body): Json<ClientRegistration>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let out = scope
        .run(auth_service::register_client(
            &state.auth,
            &state.store,
            business_id,
            &body,
        ))
        .await?;
    Ok(ApiResponse::success(out))
}

/// POST /api/v1/auth/client/{business_id}/login
pub async fn client_login(
    State(state): State<AppState>,
    scope: ViewScope,
    Path(business_id): Path<Uuid>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let out = scope
        .run(auth_service::login_client(
            &state.auth,
            &state.store,
            business_id,
            &body,
        ))
        .await?;
    Ok(ApiResponse::success(out))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    scope: ViewScope,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<SessionTokens>>, AppError> {
    let tokens = scope.run(auth_service::refresh(&state.auth, &body)).await?;
    Ok(ApiResponse::success(tokens))
}

/// POST /api/v1/auth/logout: revokes the caller's session at the provider.
pub async fn logout(
    State(state): State<AppState>,
    scope: ViewScope,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    scope
        .run(auth_service::logout(&state.auth, &current_user.access_token))
        .await?;
    Ok(ApiResponse::success("Logged out successfully"))
}

/// GET /api/v1/auth/me: who the caller is and which roles they hold.
pub async fn me(
    State(state): State<AppState>,
    scope: ViewScope,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<Me>>, AppError> {
    let store = current_user.store(&state);
    let me = scope
        .run(auth_service::me(
            &store,
            current_user.id,
            current_user.email.clone(),
        ))
        .await?;
    Ok(ApiResponse::success(me))
}
