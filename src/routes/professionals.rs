//! Professional (staff) routes.

use axum::{
    extract::{Path, Query},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::BusinessContext;
use crate::models::professional::{CreateProfessional, Professional, UpdateProfessional};
use crate::services::filtering::ListFilters;
use crate::services::professional::{self as professional_service, ProfessionalSchedule};
use crate::services::scope::ViewScope;

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

/// GET /api/v1/business/professionals?search=
pub async fn list(
    scope: ViewScope,
    ctx: BusinessContext,
    Query(filters): Query<ListFilters>,
) -> Result<Json<ApiResponse<Vec<Professional>>>, AppError> {
    let rows = scope
        .run(professional_service::list_by_business(
            &ctx.store,
            ctx.business_id(),
        ))
        .await?;
    Ok(ApiResponse::success(filters.apply(rows)))
}

/// POST /api/v1/business/professionals
pub async fn create(
    scope: ViewScope,
    ctx: BusinessContext,
    Json(body): Json<CreateProfessional>,
) -> Result<Json<ApiResponse<Professional>>, AppError> {
    let professional = scope
        .run(professional_service::create(
            &ctx.store,
            ctx.business_id(),
            &body,
        ))
        .await?;
    Ok(ApiResponse::success(professional))
}

/// GET /api/v1/business/professionals/{id}
pub async fn get_by_id(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Professional>>, AppError> {
    let professional = scope
        .run(professional_service::find_by_id(
            &ctx.store,
            ctx.business_id(),
            id,
        ))
        .await?;
    Ok(ApiResponse::success(professional))
}

/// PUT /api/v1/business/professionals/{id}
pub async fn update(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProfessional>,
) -> Result<Json<ApiResponse<Professional>>, AppError> {
    let professional = scope
        .run(professional_service::update(
            &ctx.store,
            ctx.business_id(),
            id,
            &body,
        ))
        .await?;
    Ok(ApiResponse::success(professional))
}

/// DELETE /api/v1/business/professionals/{id}
pub async fn delete(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    scope
        .run(professional_service::delete(&ctx.store, ctx.business_id(), id))
        .await?;
    Ok(ApiResponse::success("Professional deleted"))
}

/// GET /api/v1/business/professionals/{id}/schedule?date=
pub async fn schedule(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ApiResponse<ProfessionalSchedule>>, AppError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let schedule = scope
        .run(professional_service::get_schedule(
            &ctx.store,
            ctx.business_id(),
            id,
            date,
        ))
        .await?;
    Ok(ApiResponse::success(schedule))
}
