//! Appointment queries and writes.
//!
//! Reads pull the client, service and professional joins so list views can
//! render and search without extra lookups.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::appointment::{
    self, Appointment, AppointmentStatus, CreateAppointment, NewAppointment, StatusUpdate,
};
use crate::services::filtering::{ListFilters, StatusFilter};
use crate::services::{catalog, client, professional};
use crate::store::{Query, StoreClient};

/// Query parameters of the business appointment list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilters {
    pub date: Option<NaiveDate>,
    pub search: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
}

impl AppointmentFilters {
    pub fn list_filters(&self) -> ListFilters {
        ListFilters {
            search: self.search.clone(),
            status: self.status,
        }
    }
}

fn scoped(business_id: Uuid) -> Query {
    Query::table(appointment::TABLE)
        .select(appointment::SELECT_WITH_DETAILS)
        .eq("business_id", business_id)
}

/// All appointments of a business, earliest first.
pub async fn list_by_business(
    store: &StoreClient,
    business_id: Uuid,
) -> Result<Vec<Appointment>, AppError> {
    let query = scoped(business_id)
        .order("date", true)
        .order("time", true);
    Ok(store.select(&query).await?)
}

/// Appointments on one day, by time.
pub async fn list_by_date(
    store: &StoreClient,
    business_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<Appointment>, AppError> {
    let query = scoped(business_id).eq("date", date).order("time", true);
    Ok(store.select(&query).await?)
}

/// The list view: one day or everything, narrowed by search and status.
pub async fn list(
    store: &StoreClient,
    business_id: Uuid,
    filters: &AppointmentFilters,
) -> Result<Vec<Appointment>, AppError> {
    let rows = match filters.date {
        Some(date) => list_by_date(store, business_id, date).await?,
        None => list_by_business(store, business_id).await?,
    };
    Ok(filters.list_filters().apply(rows))
}

/// A client's appointments, most recent first.
pub async fn list_for_client(
    store: &StoreClient,
    business_id: Uuid,
    client_id: Uuid,
) -> Result<Vec<Appointment>, AppError> {
    let query = scoped(business_id)
        .eq("client_id", client_id)
        .order("date", false)
        .order("time", false);
    Ok(store.select(&query).await?)
}

/// A professional's appointments on one day, by time.
pub async fn list_for_professional_on(
    store: &StoreClient,
    business_id: Uuid,
    professional_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<Appointment>, AppError> {
    let query = scoped(business_id)
        .eq("professional_id", professional_id)
        .eq("date", date)
        .order("time", true);
    Ok(store.select(&query).await?)
}

/// Next scheduled appointments on or after `from`.
pub async fn list_upcoming(
    store: &StoreClient,
    business_id: Uuid,
    from: NaiveDate,
    limit: usize,
) -> Result<Vec<Appointment>, AppError> {
    let query = scoped(business_id)
        .eq("status", AppointmentStatus::Scheduled)
        .gte("date", from)
        .order("date", true)
        .order("time", true)
        .limit(limit);
    Ok(store.select(&query).await?)
}

pub async fn find_by_id(
    store: &StoreClient,
    business_id: Uuid,
    id: Uuid,
) -> Result<Appointment, AppError> {
    store
        .select_one(&scoped(business_id).eq("id", id))
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))
}

/// Insert a prepared row, returning it with its joins.
pub async fn insert(store: &StoreClient, row: &NewAppointment) -> Result<Appointment, AppError> {
    #[derive(Deserialize)]
    struct Inserted {
        id: Uuid,
    }

    let inserted: Inserted = store.insert(appointment::TABLE, row).await?;
    tracing::info!(
        business_id = %row.business_id,
        appointment_id = %inserted.id,
        date = %row.date,
        "Appointment created"
    );
    find_by_id(store, row.business_id, inserted.id).await
}

/// Business-side booking. The client, service and professional must belong
/// to the business; the value is the service's current price.
pub async fn create(
    store: &StoreClient,
    business_id: Uuid,
    input: &CreateAppointment,
) -> Result<Appointment, AppError> {
    let (_client, service, _professional) = tokio::try_join!(
        client::find_by_id(store, business_id, input.client_id),
        catalog::find_by_id(store, business_id, input.service_id),
        professional::find_by_id(store, business_id, input.professional_id),
    )?;

    let row = NewAppointment {
        business_id,
        client_id: input.client_id,
        service_id: service.id,
        professional_id: input.professional_id,
        date: input.date,
        time: input.time,
        status: AppointmentStatus::Scheduled,
        value: service.price,
    };
    insert(store, &row).await
}

/// Status write guarded on the status the caller last read. When another
/// request changed it first no row matches and the write is rejected.
pub async fn update_status(
    store: &StoreClient,
    business_id: Uuid,
    id: Uuid,
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<(), AppError> {
    let query = Query::table(appointment::TABLE)
        .eq("business_id", business_id)
        .eq("id", id)
        .eq("status", from);
    let rows: Vec<serde_json::Value> = store.update(&query, &StatusUpdate { status: to }).await?;
    if rows.is_empty() {
        return Err(AppError::InvalidTransition(format!(
            "Appointment is no longer {from}"
        )));
    }
    tracing::info!(
        business_id = %business_id,
        appointment_id = %id,
        from = %from,
        to = %to,
        "Appointment status updated"
    );
    Ok(())
}

pub async fn delete(store: &StoreClient, business_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let query = Query::table(appointment::TABLE)
        .eq("business_id", business_id)
        .eq("id", id);
    if store.delete(&query).await? == 0 {
        return Err(AppError::NotFound("Appointment not found".to_string()));
    }
    tracing::info!(business_id = %business_id, appointment_id = %id, "Appointment deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_default_to_everything() {
        let filters: AppointmentFilters = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(filters.date.is_none());
        assert_eq!(filters.list_filters().status, StatusFilter::All);
    }

    #[test]
    fn filters_parse_date_and_status() {
        let filters: AppointmentFilters = serde_json::from_value(serde_json::json!({
            "date": "2025-06-01",
            "status": "scheduled",
            "search": "ana"
        }))
        .unwrap();
        assert_eq!(filters.date, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(
            filters.list_filters().status,
            StatusFilter::Only(AppointmentStatus::Scheduled)
        );
        assert_eq!(filters.list_filters().search.as_deref(), Some("ana"));
    }
}
