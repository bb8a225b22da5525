//! Business profile settings routes.

use axum::Json;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::BusinessContext;
use crate::models::business::{Business, UpdateBusiness};
use crate::services::business as business_service;
use crate::services::scope::ViewScope;

/// GET /api/v1/business/settings
pub async fn get_settings(ctx: BusinessContext) -> Json<ApiResponse<Business>> {
    ApiResponse::success(ctx.business)
}

/// PUT /api/v1/business/settings
pub async fn update_settings(
    scope: ViewScope,
    ctx: BusinessContext,
    Json(body): Json<UpdateBusiness>,
) -> Result<Json<ApiResponse<Business>>, AppError> {
    let business = scope
        .run(business_service::update(&ctx.store, ctx.business_id(), &body))
        .await?;
    Ok(ApiResponse::success(business))
}
