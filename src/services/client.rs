//! A tenant's clients and their visit counters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::appointment::Appointment;
use crate::models::client::{self, Client, CreateClient, NewClient, UpdateClient, VisitCounters};
use crate::services::appointment;
use crate::store::{Query, StoreClient, StoreError};

/// A client with their appointments, most recent first.
#[derive(Debug, Serialize)]
pub struct ClientHistory {
    pub client: Client,
    pub appointments: Vec<Appointment>,
}

fn map_write_error(e: StoreError) -> AppError {
    if e.is_unique_violation() {
        AppError::Conflict("A client with this email already exists".to_string())
    } else if e.is_foreign_key_violation() {
        AppError::Conflict("Client still has appointments".to_string())
    } else {
        AppError::Store(e)
    }
}

fn scoped(business_id: Uuid) -> Query {
    Query::table(client::TABLE).eq("business_id", business_id)
}

/// Clients of a business, newest first.
pub async fn list_by_business(
    store: &StoreClient,
    business_id: Uuid,
) -> Result<Vec<Client>, AppError> {
    let query = scoped(business_id).order("created_at", false);
    Ok(store.select(&query).await?)
}

/// Clients created at or after `since`, newest first.
pub async fn list_created_since(
    store: &StoreClient,
    business_id: Uuid,
    since: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<Client>, AppError> {
    let query = scoped(business_id)
        .gte("created_at", since.to_rfc3339())
        .order("created_at", false)
        .limit(limit);
    Ok(store.select(&query).await?)
}

pub async fn find_by_id(
    store: &StoreClient,
    business_id: Uuid,
    id: Uuid,
) -> Result<Client, AppError> {
    store
        .select_one(&scoped(business_id).eq("id", id))
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))
}

pub async fn find_by_email(
    store: &StoreClient,
    business_id: Uuid,
    email: &str,
) -> Result<Option<Client>, AppError> {
    Ok(store.select_one(&scoped(business_id).eq("email", email)).await?)
}

pub async fn create(
    store: &StoreClient,
    business_id: Uuid,
    input: &CreateClient,
) -> Result<Client, AppError> {
    input.validate()?;
    let row = NewClient {
        business_id,
        name: &input.name,
        email: &input.email,
        phone: &input.phone,
    };
    let created: Client = store
        .insert(client::TABLE, &row)
        .await
        .map_err(map_write_error)?;
    tracing::info!(business_id = %business_id, client_id = %created.id, "Client created");
    Ok(created)
}

pub async fn update(
    store: &StoreClient,
    business_id: Uuid,
    id: Uuid,
    input: &UpdateClient,
) -> Result<Client, AppError> {
    input.validate()?;
    let rows: Vec<Client> = store
        .update(&scoped(business_id).eq("id", id), input)
        .await
        .map_err(map_write_error)?;
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))
}

pub async fn delete(store: &StoreClient, business_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let removed = store
        .delete(&scoped(business_id).eq("id", id))
        .await
        .map_err(map_write_error)?;
    if removed == 0 {
        return Err(AppError::NotFound("Client not found".to_string()));
    }
    tracing::info!(business_id = %business_id, client_id = %id, "Client deleted");
    Ok(())
}

pub async fn get_history(
    store: &StoreClient,
    business_id: Uuid,
    client_id: Uuid,
) -> Result<ClientHistory, AppError> {
    let (client, appointments) = tokio::try_join!(
        find_by_id(store, business_id, client_id),
        appointment::list_for_client(store, business_id, client_id),
    )?;
    Ok(ClientHistory {
        client,
        appointments,
    })
}

/// Counters after one more completed visit worth `value` at `at`.
pub fn counters_after_visit(client: &Client, value: Decimal, at: DateTime<Utc>) -> VisitCounters {
    VisitCounters {
        visits: client.visits + 1,
        total_spent: client.total_spent + value,
        last_visit: at,
    }
}

/// Read-modify-write of the visit counters. Concurrent completions of two
/// appointments of the same client are last-write-wins.
pub async fn record_visit(
    store: &StoreClient,
    business_id: Uuid,
    client_id: Uuid,
    value: Decimal,
    at: DateTime<Utc>,
) -> Result<Client, AppError> {
    let current = find_by_id(store, business_id, client_id).await?;
    let patch = counters_after_visit(&current, value, at);
    let rows: Vec<Client> = store
        .update(&scoped(business_id).eq("id", client_id), &patch)
        .await?;
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn visit_bumps_counters() {
        let client = Client {
            id: Uuid::new_v4(),
            business_id: Uuid::nil(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: "1".to_string(),
            visits: 2,
            total_spent: Decimal::new(7000, 2),
            last_visit: None,
            created_at: Utc::now(),
        };
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap();
        let next = counters_after_visit(&client, Decimal::new(3550, 2), at);
        assert_eq!(next.visits, 3);
        assert_eq!(next.total_spent, Decimal::new(10550, 2));
        assert_eq!(next.last_visit, at);
    }
}
