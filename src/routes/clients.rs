//! Business-side client management routes.

use axum::{
    extract::{Path, Query},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::BusinessContext;
use crate::models::client::{Client, CreateClient, UpdateClient};
use crate::services::client::{self as client_service, ClientHistory};
use crate::services::filtering::ListFilters;
use crate::services::scope::ViewScope;

/// GET /api/v1/business/clients?search=
pub async fn list(
    scope: ViewScope,
    ctx: BusinessContext,
    Query(filters): Query<ListFilters>,
) -> Result<Json<ApiResponse<Vec<Client>>>, AppError> {
    let rows = scope
        .run(client_service::list_by_business(&ctx.store, ctx.business_id()))
        .await?;
    Ok(ApiResponse::success(filters.apply(rows)))
}

/// POST /api/v1/business/clients
pub async fn create(
    scope: ViewScope,
    ctx: BusinessContext,
    Json(body): Json<CreateClient>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let client = scope
        .run(client_service::create(&ctx.store, ctx.business_id(), &body))
        .await?;
    Ok(ApiResponse::success(client))
}

/// GET /api/v1/business/clients/{id}
pub async fn get_by_id(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let client = scope
        .run(client_service::find_by_id(&ctx.store, ctx.business_id(), id))
        .await?;
    Ok(ApiResponse::success(client))
}

/// PUT /api/v1/business/clients/{id}
pub async fn update(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateClient>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let client = scope
        .run(client_service::update(&ctx.store, ctx.business_id(), id, &body))
        .await?;
    Ok(ApiResponse::success(client))
}

/// DELETE /api/v1/business/clients/{id}
pub async fn delete(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    scope
        .run(client_service::delete(&ctx.store, ctx.business_id(), id))
        .await?;
    Ok(ApiResponse::success("Client deleted"))
}

/// GET /api/v1/business/clients/{id}/history
pub async fn history(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ClientHistory>>, AppError> {
    let history = scope
        .run(client_service::get_history(&ctx.store, ctx.business_id(), id))
        .await?;
    Ok(ApiResponse::success(history))
}
