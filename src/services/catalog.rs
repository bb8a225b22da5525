//! Service catalog of a business.

use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::service::{self, CreateService, NewService, Service, UpdateService};
use crate::store::{Query, StoreClient, StoreError};

fn map_write_error(e: StoreError) -> AppError {
    if e.is_foreign_key_violation() {
        AppError::Conflict("Service is still referenced by appointments".to_string())
    } else {
        AppError::Store(e)
    }
}

fn scoped(business_id: Uuid) -> Query {
    Query::table(service::TABLE).eq("business_id", business_id)
}

pub async fn list_by_business(
    store: &StoreClient,
    business_id: Uuid,
) -> Result<Vec<Service>, AppError> {
    let query = scoped(business_id).order("created_at", false);
    Ok(store.select(&query).await?)
}

pub async fn find_by_id(
    store: &StoreClient,
    business_id: Uuid,
    id: Uuid,
) -> Result<Service, AppError> {
    store
        .select_one(&scoped(business_id).eq("id", id))
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))
}

pub async fn create(
    store: &StoreClient,
    business_id: Uuid,
    input: &CreateService,
) -> Result<Service, AppError> {
    input.validate()?;
    let row = NewService {
        business_id,
        name: &input.name,
        description: input.description.as_deref(),
        price: input.price,
        duration: input.duration,
    };
    let created: Service = store.insert(service::TABLE, &row).await?;
    tracing::info!(business_id = %business_id, service_id = %created.id, "Service created");
    Ok(created)
}

pub async fn update(
    store: &StoreClient,
    business_id: Uuid,
    id: Uuid,
    input: &UpdateService,
) -> Result<Service, AppError> {
    input.validate()?;
    let rows: Vec<Service> = store
        .update(&scoped(business_id).eq("id", id), input)
        .await?;
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))
}

pub async fn delete(store: &StoreClient, business_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let removed = store
        .delete(&scoped(business_id).eq("id", id))
        .await
        .map_err(map_write_error)?;
    if removed == 0 {
        return Err(AppError::NotFound("Service not found".to_string()));
    }
    tracing::info!(business_id = %business_id, service_id = %id, "Service deleted");
    Ok(())
}
