//! Appointment routes: list, booking, status lifecycle and rescheduling.

use axum::{
    extract::{Path, Query},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::BusinessContext;
use crate::models::appointment::{
    Appointment, CreateAppointment, RescheduleAppointment, StatusUpdate,
};
use crate::services::appointment::{self as appointment_service, AppointmentFilters};
use crate::services::lifecycle::{self, TransitionResult};
use crate::services::scope::ViewScope;

/// GET /api/v1/business/appointments?date=&search=&status=
pub async fn list(
    scope: ViewScope,
    ctx: BusinessContext,
    Query(filters): Query<AppointmentFilters>,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, AppError> {
    let rows = scope
        .run(appointment_service::list(
            &ctx.store,
            ctx.business_id(),
            &filters,
        ))
        .await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/v1/business/appointments
pub async fn create(
    scope: ViewScope,
    ctx: BusinessContext,
    Json(body): Json<CreateAppointment>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let appointment = scope
        .run(appointment_service::create(
            &ctx.store,
            ctx.business_id(),
            &body,
        ))
        .await?;
    Ok(ApiResponse::success(appointment))
}

/// GET /api/v1/business/appointments/{id}
pub async fn get_by_id(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let appointment = scope
        .run(appointment_service::find_by_id(
            &ctx.store,
            ctx.business_id(),
            id,
        ))
        .await?;
    Ok(ApiResponse::success(appointment))
}

/// DELETE /api/v1/business/appointments/{id}
pub async fn delete(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    scope
        .run(appointment_service::delete(&ctx.store, ctx.business_id(), id))
        .await?;
    Ok(ApiResponse::success("Appointment deleted"))
}

/// PATCH /api/v1/business/appointments/{id}/status
pub async fn update_status(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<ApiResponse<TransitionResult>>, AppError> {
    let result = scope
        .run(lifecycle::transition(
            &ctx.store,
            ctx.business_id(),
            id,
            body.status,
        ))
        .await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/business/appointments/{id}/reschedule: books a canceled
/// appointment again and returns the new one.
pub async fn reschedule(
    scope: ViewScope,
    ctx: BusinessContext,
    Path(id): Path<Uuid>,
    Json(body): Json<RescheduleAppointment>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let appointment = scope
        .run(lifecycle::reschedule(
            &ctx.store,
            ctx.business_id(),
            id,
            &body,
        ))
        .await?;
    Ok(ApiResponse::success(appointment))
}
