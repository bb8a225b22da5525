//! Client model: a tenant's customer with cumulative visit counters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const TABLE: &str = "clients";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub visits: i32,
    #[serde(default)]
    pub total_spent: Decimal,
    pub last_visit: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateClient {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub phone: String,
}

/// Insert row: the counters start at the store's defaults.
#[derive(Debug, Serialize)]
pub struct NewClient<'a> {
    pub business_id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateClient {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Profile fields a client may change on their own account. The email is
/// the link to their login and stays fixed.
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateClientSettings {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl From<UpdateClientSettings> for UpdateClient {
    fn from(settings: UpdateClientSettings) -> Self {
        Self {
            name: settings.name,
            email: None,
            phone: settings.phone,
        }
    }
}

/// Patch applied when one of the client's appointments is completed.
#[derive(Debug, Serialize)]
pub struct VisitCounters {
    pub visits: i32,
    pub total_spent: Decimal,
    pub last_visit: DateTime<Utc>,
}
