//! Appointment model with status lifecycle and denormalized joins for display.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TABLE: &str = "appointments";

/// Column list that pulls the display joins along with the row.
pub const SELECT_WITH_DETAILS: &str = "*,\
    client:client_id(id,name,email,phone),\
    service:service_id(id,name,price,duration),\
    professional:professional_id(id,name,specialty)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Canceled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "canceled" | "cancelled" => Ok(AppointmentStatus::Canceled),
            other => Err(format!("unknown appointment status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientRef {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceRef {
    pub id: Uuid,
    pub name: String,
    pub price: Option<Decimal>,
    pub duration: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfessionalRef {
    pub id: Uuid,
    pub name: String,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub business_id: Uuid,
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "crate::models::hhmm")]
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub value: Decimal,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional: Option<ProfessionalRef>,
}

impl Appointment {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Length of the booked service, when the service join was fetched.
    pub fn duration_minutes(&self) -> Option<i32> {
        self.service.as_ref().and_then(|s| s.duration)
    }

    pub fn client_name(&self) -> Option<&str> {
        self.client.as_ref().map(|c| c.name.as_str())
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service.as_ref().map(|s| s.name.as_str())
    }

    pub fn professional_name(&self) -> Option<&str> {
        self.professional.as_ref().map(|p| p.name.as_str())
    }
}

/// Business-side appointment form. Value is taken from the service price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointment {
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "crate::models::hhmm")]
    pub time: NaiveTime,
}

/// Insert row.
#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    pub business_id: Uuid,
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "crate::models::hhmm")]
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: AppointmentStatus,
}

/// New slot for a canceled appointment. Keeps the professional when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointment {
    pub date: NaiveDate,
    #[serde(with = "crate::models::hhmm")]
    pub time: NaiveTime,
    pub professional_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&AppointmentStatus::Canceled).unwrap();
        assert_eq!(json, "\"canceled\"");
    }

    #[test]
    fn status_round_trip() {
        let status: AppointmentStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, AppointmentStatus::Completed);
    }

    #[test]
    fn status_parse_accepts_british_spelling() {
        assert_eq!(
            "Cancelled".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Canceled
        );
        assert!("done".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn appointment_with_joins_deserializes() {
        let json = serde_json::json!({
            "id": "00000000-0000-0000-0000-0000000000a1",
            "business_id": "00000000-0000-0000-0000-0000000000b1",
            "client_id": "00000000-0000-0000-0000-0000000000c1",
            "service_id": "00000000-0000-0000-0000-0000000000d1",
            "professional_id": "00000000-0000-0000-0000-0000000000e1",
            "date": "2025-06-01",
            "time": "14:00:00",
            "status": "scheduled",
            "value": 55,
            "created_at": "2025-05-20T10:00:00+00:00",
            "client": { "id": "00000000-0000-0000-0000-0000000000c1", "name": "Rafael", "email": null, "phone": "1" },
            "service": { "id": "00000000-0000-0000-0000-0000000000d1", "name": "Corte + Barba", "price": 55, "duration": 50 },
            "professional": { "id": "00000000-0000-0000-0000-0000000000e1", "name": "João", "specialty": "Barbeiro" }
        });
        let appt: Appointment = serde_json::from_value(json).unwrap();
        assert_eq!(appt.client_name(), Some("Rafael"));
        assert_eq!(appt.service_name(), Some("Corte + Barba"));
        assert_eq!(appt.professional_name(), Some("João"));
        assert_eq!(appt.duration_minutes(), Some(50));
        assert_eq!(appt.value, Decimal::from(55));
        assert_eq!(
            appt.starts_at(),
            NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn new_appointment_serializes_short_time() {
        let row = NewAppointment {
            business_id: Uuid::nil(),
            client_id: Uuid::nil(),
            service_id: Uuid::nil(),
            professional_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            status: AppointmentStatus::Scheduled,
            value: Decimal::new(3500, 2),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["time"], "09:30");
        assert_eq!(json["date"], "2025-06-02");
        assert_eq!(json["status"], "scheduled");
    }
}
