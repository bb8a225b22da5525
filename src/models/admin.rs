//! Administrator accounts: auth users holding the platform admin role.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Rows are created by a store-side trigger when an admin signs up.
pub const TABLE: &str = "admins_auth";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminContact<'a> {
    pub phone: &'a str,
}

/// Fields an admin may change on their own profile.
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateAdminProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UpdateAdminProfile {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}
