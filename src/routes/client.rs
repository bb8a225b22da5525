//! Client portal routes: catalog, availability, booking, history, settings.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::ClientContext;
use crate::models::appointment::Appointment;
use crate::models::client::{Client, UpdateClient, UpdateClientSettings};
use crate::services::booking::{
    self as booking_service, AvailabilityQuery, AvailableSlot, BookingRequest, Catalog,
};
use crate::services::scope::ViewScope;
use crate::services::{business as business_service, client as client_service};
use crate::AppState;

/// GET /api/v1/client/{business_id}/catalog: services and professionals on offer.
pub async fn catalog(
    State(state): State<AppState>,
    scope: ViewScope,
    Path(business_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Catalog>>, AppError> {
    let catalog = scope
        .run(async {
            let business = business_service::find_by_id(&state.store, business_id).await?;
            booking_service::get_catalog(&state.store, business).await
        })
        .await?;
    Ok(ApiResponse::success(catalog))
}

/// GET /api/v1/client/{business_id}/availability?date=&service_id=&professional_id=
pub async fn availability(
    State(state): State<AppState>,
    scope: ViewScope,
    Path(business_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<Vec<AvailableSlot>>>, AppError> {
    let slots = scope
        .run(booking_service::get_availability(
            &state.store,
            business_id,
            &query,
            state.config.booking_slot_minutes,
            Utc::now().naive_utc(),
        ))
        .await?;
    Ok(ApiResponse::success(slots))
}

/// POST /api/v1/client/{business_id}/booking
pub async fn book(
    State(state): State<AppState>,
    scope: ViewScope,
    ctx: ClientContext,
    Json(body): Json<BookingRequest>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let appointment = scope
        .run(booking_service::book(
            &ctx.store,
            ctx.business_id(),
            &ctx.client,
            &body,
            state.config.booking_slot_minutes,
            Utc::now().naive_utc(),
        ))
        .await?;
    Ok(ApiResponse::success(appointment))
}

/// GET /api/v1/client/{business_id}/history
pub async fn history(
    scope: ViewScope,
    ctx: ClientContext,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, AppError> {
    let rows = scope
        .run(booking_service::client_history(
            &ctx.store,
            ctx.business_id(),
            ctx.client.id,
        ))
        .await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/v1/client/{business_id}/settings
pub async fn get_settings(ctx: ClientContext) -> Json<ApiResponse<Client>> {
    ApiResponse::success(ctx.client)
}

/// PUT /api/v1/client/{business_id}/settings
pub async fn update_settings(
    scope: ViewScope,
    ctx: ClientContext,
    Json(body): Json<UpdateClientSettings>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    body.validate()?;
    let patch = UpdateClient::from(body);
    let client = scope
        .run(client_service::update(
            &ctx.store,
            ctx.business_id(),
            ctx.client.id,
            &patch,
        ))
        .await?;
    Ok(ApiResponse::success(client))
}
