//! Professionals (staff) of a business.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::appointment::Appointment;
use crate::models::professional::{
    self, CreateProfessional, NewProfessional, Professional, UpdateProfessional,
};
use crate::services::appointment;
use crate::store::{Query, StoreClient, StoreError};

/// One professional's appointments for a day.
#[derive(Debug, Serialize)]
pub struct ProfessionalSchedule {
    pub professional: Professional,
    pub date: NaiveDate,
    pub appointments: Vec<Appointment>,
}

fn map_write_error(e: StoreError) -> AppError {
    if e.is_foreign_key_violation() {
        AppError::Conflict("Professional still has appointments".to_string())
    } else {
        AppError::Store(e)
    }
}

fn scoped(business_id: Uuid) -> Query {
    Query::table(professional::TABLE).eq("business_id", business_id)
}

pub async fn list_by_business(
    store: &StoreClient,
    business_id: Uuid,
) -> Result<Vec<Professional>, AppError> {
    let query = scoped(business_id).order("created_at", false);
    Ok(store.select(&query).await?)
}

pub async fn find_by_id(
    store: &StoreClient,
    business_id: Uuid,
    id: Uuid,
) -> Result<Professional, AppError> {
    store
        .select_one(&scoped(business_id).eq("id", id))
        .await?
        .ok_or_else(|| AppError::NotFound("Professional not found".to_string()))
}

pub async fn get_schedule(
    store: &StoreClient,
    business_id: Uuid,
    professional_id: Uuid,
    date: NaiveDate,
) -> Result<ProfessionalSchedule, AppError> {
    let (professional, appointments) = tokio::try_join!(
        find_by_id(store, business_id, professional_id),
        appointment::list_for_professional_on(store, business_id, professional_id, date),
    )?;
    Ok(ProfessionalSchedule {
        professional,
        date,
        appointments,
    })
}

pub async fn create(
    store: &StoreClient,
    business_id: Uuid,
    input: &CreateProfessional,
) -> Result<Professional, AppError> {
    input.validate()?;
    let row = NewProfessional {
        business_id,
        name: &input.name,
        specialty: &input.specialty,
        contact: &input.contact,
    };
    let created: Professional = store.insert(professional::TABLE, &row).await?;
    tracing::info!(
        business_id = %business_id,
        professional_id = %created.id,
        "Professional created"
    );
    Ok(created)
}

pub async fn update(
    store: &StoreClient,
    business_id: Uuid,
    id: Uuid,
    input: &UpdateProfessional,
) -> Result<Professional, AppError> {
    input.validate()?;
    let rows: Vec<Professional> = store
        .update(&scoped(business_id).eq("id", id), input)
        .await?;
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("Professional not found".to_string()))
}

pub async fn delete(store: &StoreClient, business_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let removed = store
        .delete(&scoped(business_id).eq("id", id))
        .await
        .map_err(map_write_error)?;
    if removed == 0 {
        return Err(AppError::NotFound("Professional not found".to_string()));
    }
    tracing::info!(business_id = %business_id, professional_id = %id, "Professional deleted");
    Ok(())
}
