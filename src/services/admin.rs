//! Platform admin views: overview dashboard, per-business details and the
//! admin's own profile.

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::admin::{self, AdminAccount, UpdateAdminProfile};
use crate::models::business::Business;
use crate::models::{appointment, client, professional, service};
use crate::services::{auth as auth_service, business as business_service};
use crate::services::stats::{self, CountPoint};
use crate::store::{Query, StoreClient};

const RECENT_BUSINESSES: usize = 5;

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub total_businesses: usize,
    pub recent_businesses: Vec<Business>,
    pub signups_by_month: Vec<CountPoint>,
    pub registration_link: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusinessCounts {
    pub clients: usize,
    pub professionals: usize,
    pub services: usize,
    pub appointments: usize,
}

#[derive(Debug, Serialize)]
pub struct BusinessDetails {
    pub business: Business,
    pub counts: BusinessCounts,
}

/// Link an admin shares with businesses so they land on the business login.
pub fn registration_link(frontend_url: &str, admin_user_id: Uuid) -> String {
    format!(
        "{}/business/login?ref={admin_user_id}",
        frontend_url.trim_end_matches('/')
    )
}

/// Build the dashboard from businesses listed newest first.
pub fn build_dashboard(
    businesses: Vec<Business>,
    frontend_url: &str,
    admin_user_id: Uuid,
) -> AdminDashboard {
    let signups_by_month =
        stats::count_by_month(businesses.iter().rev().map(|b| b.created_at.date_naive()));
    AdminDashboard {
        total_businesses: businesses.len(),
        recent_businesses: businesses.into_iter().take(RECENT_BUSINESSES).collect(),
        signups_by_month,
        registration_link: registration_link(frontend_url, admin_user_id),
    }
}

pub async fn get_dashboard(
    store: &StoreClient,
    frontend_url: &str,
    admin_user_id: Uuid,
) -> Result<AdminDashboard, AppError> {
    let businesses = business_service::list_all(store).await?;
    Ok(build_dashboard(businesses, frontend_url, admin_user_id))
}

async fn count_rows(
    store: &StoreClient,
    table: &str,
    business_id: Uuid,
) -> Result<usize, AppError> {
    let query = Query::table(table).select("id").eq("business_id", business_id);
    let rows: Vec<serde_json::Value> = store.select(&query).await?;
    Ok(rows.len())
}

pub async fn get_business_details(
    store: &StoreClient,
    business_id: Uuid,
) -> Result<BusinessDetails, AppError> {
    let (business, clients, professionals, services, appointments) = tokio::try_join!(
        business_service::find_by_id(store, business_id),
        count_rows(store, client::TABLE, business_id),
        count_rows(store, professional::TABLE, business_id),
        count_rows(store, service::TABLE, business_id),
        count_rows(store, appointment::TABLE, business_id),
    )?;
    Ok(BusinessDetails {
        business,
        counts: BusinessCounts {
            clients,
            professionals,
            services,
            appointments,
        },
    })
}

/// The signed-in admin's own account row.
pub async fn get_profile(store: &StoreClient, user_id: Uuid) -> Result<AdminAccount, AppError> {
    auth_service::find_admin(store, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin profile not found".to_string()))
}

pub async fn update_profile(
    store: &StoreClient,
    user_id: Uuid,
    input: &UpdateAdminProfile,
) -> Result<AdminAccount, AppError> {
    input.validate()?;
    if input.is_empty() {
        return get_profile(store, user_id).await;
    }
    let query = Query::table(admin::TABLE).eq("user_id", user_id);
    let rows: Vec<AdminAccount> = store.update(&query, input).await?;
    let updated = rows
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("Admin profile not found".to_string()))?;
    tracing::info!(user_id = %user_id, "Admin profile updated");
    Ok(updated)
}
