//! Service catalog routes.

use axum::{
    extract::{Path, Query},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::BusinessContext;
use crate::models::service::{CreateService, Service, UpdateService};
use crate::services::catalog as catalog_service;
use crate::services::filtering::ListFilters;
use crate::services::scope::ViewScope;

/// GET /api/v1/business/services?search=
pub async fn list(
    scope: ViewScope,
    ctx: BusinessContext,
    Query(filters): Query<ListFilters>,
) -> Result<Json<ApiResponse<Vec<Service>>>, AppError> {
    let rows = scope
        .run(catalog_service::list_by_business(&ctx.store, ctx.business_id()))
        .await?;
    Ok(ApiResponse::success(filters.apply(rows)))
}

/// POST /api/v1/business/services
pub async fn create(
    scope: ViewScope,
    ctx: BusinessContext,
    Json(body): Json<CreateService>,
) -> Result<Json<ApiResponse<Service>>, AppError> {
    let service = scope
        .run(catalog_service::create(&ctx.store, ctx.business_id(), &body))
        .await?;
    Ok(ApiResponse::success(service))
}

/// GET /api/v1/business/services/{id}
pub async fn get_by_id(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Service>>, AppError> {
    let service = scope
        .run(catalog_service::find_by_id(&ctx.store, ctx.business_id(), id))
        .await?;
    Ok(ApiResponse::success(service))
}

/// PUT /api/v1/business/services/{id}
pub async fn update(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateService>,
) -> Result<Json<ApiResponse<Service>>, AppError> {
    let service = scope
        .run(catalog_service::update(&ctx.store, ctx.business_id(), id, &body))
        .await?;
    Ok(ApiResponse::success(service))
}

/// DELETE /api/v1/business/services/{id}
pub async fn delete(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    scope
        .run(catalog_service::delete(&ctx.store, ctx.business_id(), id))
        .await?;
    Ok(ApiResponse::success("Service deleted"))
}
