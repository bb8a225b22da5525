//! Business dashboard route.

use axum::{extract::Query, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::BusinessContext;
use crate::services::dashboard::{self as dashboard_service, DashboardView};
use crate::services::scope::ViewScope;
use crate::services::stats::Period;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub period: Period,
}

/// GET /api/v1/business/dashboard?period=week|month|year
pub async fn get_dashboard(
    scope: ViewScope,
    ctx: BusinessContext,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<DashboardView>>, AppError> {
    let view = scope
        .run(dashboard_service::get_dashboard(
            &ctx.store,
            ctx.business_id(),
            query.period,
            Utc::now(),
        ))
        .await?;
    Ok(ApiResponse::success(view))
}
