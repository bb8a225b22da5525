//! Business (tenant) records.

use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::business::{self, Business, CreateBusiness, UpdateBusiness};
use crate::store::{Query, StoreClient, StoreError};

fn map_write_error(e: StoreError) -> AppError {
    if e.is_unique_violation() {
        AppError::Conflict("A business with this email already exists".to_string())
    } else if e.is_foreign_key_violation() {
        AppError::Conflict("Business still has clients or appointments".to_string())
    } else {
        AppError::Store(e)
    }
}

/// Every business, newest first.
pub async fn list_all(store: &StoreClient) -> Result<Vec<Business>, AppError> {
    let query = Query::table(business::TABLE).order("created_at", false);
    Ok(store.select(&query).await?)
}

pub async fn find_by_id(store: &StoreClient, id: Uuid) -> Result<Business, AppError> {
    let query = Query::table(business::TABLE).eq("id", id);
    store
        .select_one(&query)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found".to_string()))
}

/// The business managed by an auth user, if any.
pub async fn find_by_admin(
    store: &StoreClient,
    admin_id: Uuid,
) -> Result<Option<Business>, AppError> {
    let query = Query::table(business::TABLE).eq("admin_id", admin_id);
    Ok(store.select_one(&query).await?)
}

pub async fn create(store: &StoreClient, input: &CreateBusiness) -> Result<Business, AppError> {
    input.validate()?;
    let created: Business = store
        .insert(business::TABLE, input)
        .await
        .map_err(map_write_error)?;
    tracing::info!(business_id = %created.id, "Business created");
    Ok(created)
}

pub async fn update(
    store: &StoreClient,
    id: Uuid,
    input: &UpdateBusiness,
) -> Result<Business, AppError> {
    input.validate()?;
    let query = Query::table(business::TABLE).eq("id", id);
    let rows: Vec<Business> = store.update(&query, input).await.map_err(map_write_error)?;
    let updated = rows
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("Business not found".to_string()))?;
    tracing::info!(business_id = %id, "Business updated");
    Ok(updated)
}

pub async fn delete(store: &StoreClient, id: Uuid) -> Result<(), AppError> {
    let query = Query::table(business::TABLE).eq("id", id);
    let removed = store.delete(&query).await.map_err(map_write_error)?;
    if removed == 0 {
        return Err(AppError::NotFound("Business not found".to_string()));
    }
    tracing::info!(business_id = %id, "Business deleted");
    Ok(())
}
