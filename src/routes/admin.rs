//! Platform admin routes: overview dashboard, business management and the
//! admin's own settings.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::models::admin::{AdminAccount, UpdateAdminProfile};
use crate::models::business::{Business, CreateBusiness, UpdateBusiness};
use crate::services::admin::{self as admin_service, AdminDashboard, BusinessDetails};
use crate::services::business as business_service;
use crate::services::filtering::ListFilters;
use crate::services::scope::ViewScope;
use crate::AppState;

/// GET /api/v1/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    scope: ViewScope,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<ApiResponse<AdminDashboard>>, AppError> {
    let store = admin.store(&state);
    let view = scope
        .run(admin_service::get_dashboard(
            &store,
            &state.config.frontend_url,
            admin.id,
        ))
        .await?;
    Ok(ApiResponse::success(view))
}

/// GET /api/v1/admin/businesses?search=
pub async fn list_businesses(
    State(state): State<AppState>,
    scope: ViewScope,
    RequireAdmin(admin): RequireAdmin,
    Query(filters): Query<ListFilters>,
) -> Result<Json<ApiResponse<Vec<Business>>>, AppError> {
    let store = admin.store(&state);
    let rows = scope.run(business_service::list_all(&store)).await?;
    Ok(ApiResponse::success(filters.apply(rows)))
}

/// POST /api/v1/admin/businesses
pub async fn create_business(
    State(state): State<AppState>,
    scope: ViewScope,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<CreateBusiness>,
) -> Result<Json<ApiResponse<Business>>, AppError> {
    let store = admin.store(&state);
    let business = scope.run(business_service::create(&store, &body)).await?;
    Ok(ApiResponse::success(business))
}

/// GET /api/v1/admin/businesses/{id}: the business with its record counts.
pub async fn get_business(
    State(state): State<AppState>,
    scope: ViewScope,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BusinessDetails>>, AppError> {
    let store = admin.store(&state);
    let details = scope
        .run(admin_service::get_business_details(&store, id))
        .await?;
    Ok(ApiResponse::success(details))
}

/// PUT /api/v1/admin/businesses/{id}
pub async fn update_business(
    State(state): State<AppState>,
    scope: ViewScope,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateBusiness>,
) -> Result<Json<ApiResponse<Business>>, AppError> {
    let store = admin.store(&state);
    let business = scope
        .run(business_service::update(&store, id, &body))
        .await?;
    Ok(ApiResponse::success(business))
}

/// DELETE /api/v1/admin/businesses/{id}
pub async fn delete_business(
    State(state): State<AppState>,
    scope: ViewScope,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    let store = admin.store(&state);
    scope.run(business_service::delete(&store, id)).await?;
    Ok(ApiResponse::success("Business deleted"))
}

/// GET /api/v1/admin/settings
pub async fn get_settings(
    State(state): State<AppState>,
    scope: ViewScope,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<ApiResponse<AdminAccount>>, AppError> {
    let store = admin.store(&state);
    let profile = scope.run(admin_service::get_profile(&store, admin.id)).await?;
    Ok(ApiResponse::success(profile))
}

/// PUT /api/v1/admin/settings
pub async fn update_settings(
    State(state): State<AppState>,
    scope: ViewScope,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<UpdateAdminProfile>,
) -> Result<Json<ApiResponse<AdminAccount>>, AppError> {
    let store = admin.store(&state);
    let profile = scope
        .run(admin_service::update_profile(&store, admin.id, &body))
        .await?;
    Ok(ApiResponse::success(profile))
}
