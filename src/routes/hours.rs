//! Business opening hours routes.

use axum::Json;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::BusinessContext;
use crate::models::hours::{DayHours, UpdateHours};
use crate::services::hours as hours_service;
use crate::services::scope::ViewScope;

/// GET /api/v1/business/hours
pub async fn get_hours(
    scope: ViewScope,
    ctx: BusinessContext,
) -> Result<Json<ApiResponse<Vec<DayHours>>>, AppError> {
    let week = scope
        .run(hours_service::get_hours(&ctx.store, ctx.business_id()))
        .await?;
    Ok(ApiResponse::success(week))
}

/// PUT /api/v1/business/hours
pub async fn save_hours(
    scope: ViewScope,
    ctx: BusinessContext,
    Json(body): Json<UpdateHours>,
) -> Result<Json<ApiResponse<Vec<DayHours>>>, AppError> {
    let week = scope
        .run(hours_service::save_hours(&ctx.store, ctx.business_id(), &body))
        .await?;
    Ok(ApiResponse::success(week))
}
