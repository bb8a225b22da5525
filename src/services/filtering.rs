//! In-memory list filtering: case-insensitive search plus an exact status match.

use std::str::FromStr;

use serde::Deserialize;

use crate::models::appointment::{Appointment, AppointmentStatus};
use crate::models::business::Business;
use crate::models::client::Client;
use crate::models::professional::Professional;
use crate::models::service::Service;

/// Rows that can be narrowed by a free-text search term.
pub trait Searchable {
    /// Display fields the search term is matched against.
    fn search_fields(&self) -> Vec<&str>;

    /// Lifecycle status, for entities that have one.
    fn status(&self) -> Option<AppointmentStatus> {
        None
    }
}

impl Searchable for Business {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.city.as_str()]
    }
}

impl Searchable for Client {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.phone.as_str()]
    }
}

impl Searchable for Professional {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.specialty.as_str(),
            self.contact.as_str(),
        ]
    }
}

impl Searchable for Service {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        if let Some(description) = self.description.as_deref() {
            fields.push(description);
        }
        fields
    }
}

impl Searchable for Appointment {
    fn search_fields(&self) -> Vec<&str> {
        [
            self.client_name(),
            self.service_name(),
            self.professional_name(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn status(&self) -> Option<AppointmentStatus> {
        Some(self.status)
    }
}

/// `all` or one specific appointment status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(AppointmentStatus),
}

impl StatusFilter {
    /// Rows without a status are never excluded.
    pub fn accepts(&self, status: Option<AppointmentStatus>) -> bool {
        match (self, status) {
            (StatusFilter::All, _) | (_, None) => true,
            (StatusFilter::Only(wanted), Some(actual)) => *wanted == actual,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Search and status query parameters shared by the list views.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilters {
    pub search: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
}

impl ListFilters {
    pub fn matches<T: Searchable>(&self, row: &T) -> bool {
        self.status.accepts(row.status()) && matches_search(row, self.search.as_deref())
    }

    /// Keep only the rows passing both predicates, preserving order.
    pub fn apply<T: Searchable>(&self, rows: Vec<T>) -> Vec<T> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

/// True when any display field contains `term`, ignoring case. An absent or
/// empty term matches everything.
pub fn matches_search<T: Searchable>(row: &T, term: Option<&str>) -> bool {
    let needle = match term {
        Some(t) if !t.is_empty() => t.to_lowercase(),
        _ => return true,
    };
    row.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::{ClientRef, ProfessionalRef, ServiceRef};
    use chrono::{NaiveDate, NaiveTime, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn appointment(client: &str, service: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            business_id: Uuid::nil(),
            client_id: Uuid::nil(),
            service_id: Uuid::nil(),
            professional_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            status,
            value: Decimal::from(40),
            created_at: Utc::now(),
            client: Some(ClientRef {
                id: Uuid::nil(),
                name: client.to_string(),
                email: None,
                phone: None,
            }),
            service: Some(ServiceRef {
                id: Uuid::nil(),
                name: service.to_string(),
                price: None,
                duration: None,
            }),
            professional: Some(ProfessionalRef {
                id: Uuid::nil(),
                name: "João Barbeiro".to_string(),
                specialty: None,
            }),
        }
    }

    fn business(name: &str, city: &str) -> Business {
        Business {
            id: Uuid::new_v4(),
            admin_id: None,
            name: name.to_string(),
            email: "contato@example.com".to_string(),
            phone: "11 4000-0000".to_string(),
            city: city.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn status_filter_parses_all_and_statuses() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "completed".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(AppointmentStatus::Completed)
        );
        assert!("archived".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn status_filter_keeps_only_matching_status_regardless_of_search() {
        let rows = vec![
            appointment("Rafael", "Corte", AppointmentStatus::Completed),
            appointment("Rafael", "Corte", AppointmentStatus::Scheduled),
            appointment("Bruno", "Barba", AppointmentStatus::Completed),
            appointment("Carla", "Escova", AppointmentStatus::Canceled),
        ];
        let filters = ListFilters {
            search: None,
            status: StatusFilter::Only(AppointmentStatus::Completed),
        };
        let kept = filters.apply(rows.clone());
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|a| a.status == AppointmentStatus::Completed));

        let with_search = ListFilters {
            search: Some("rafa".to_string()),
            status: StatusFilter::Only(AppointmentStatus::Completed),
        };
        let kept = with_search.apply(rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].status, AppointmentStatus::Completed);
    }

    #[test]
    fn appointment_search_covers_joined_names() {
        let row = appointment("Rafael", "Corte + Barba", AppointmentStatus::Scheduled);
        assert!(matches_search(&row, Some("BARBA")));
        assert!(matches_search(&row, Some("joão")));
        assert!(!matches_search(&row, Some("escova")));
    }

    #[test]
    fn appointment_without_joins_only_matches_empty_search() {
        let mut row = appointment("Rafael", "Corte", AppointmentStatus::Scheduled);
        row.client = None;
        row.service = None;
        row.professional = None;
        assert!(matches_search(&row, None));
        assert!(matches_search(&row, Some("")));
        assert!(!matches_search(&row, Some("rafael")));
    }

    #[test]
    fn business_search_by_city_is_case_insensitive() {
        let rows = vec![
            business("Barbearia Central", "São Paulo"),
            business("Salão Bela", "Rio de Janeiro"),
        ];
        let filters = ListFilters {
            search: Some("rio".to_string()),
            status: StatusFilter::All,
        };
        let kept = filters.apply(rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Salão Bela");
    }

    #[test]
    fn status_filter_ignored_for_entities_without_status() {
        let filters = ListFilters {
            search: None,
            status: StatusFilter::Only(AppointmentStatus::Canceled),
        };
        assert!(filters.matches(&business("Barbearia", "Campinas")));
    }

    #[test]
    fn service_search_includes_description() {
        let service = Service {
            id: Uuid::new_v4(),
            business_id: Uuid::nil(),
            name: "Corte".to_string(),
            description: Some("Tesoura e máquina".to_string()),
            price: Decimal::from(35),
            duration: 30,
            created_at: Utc::now(),
        };
        assert!(matches_search(&service, Some("máquina")));
        assert!(!matches_search(&service, Some("barba")));
    }

    #[test]
    fn list_filters_deserialize_from_query() {
        let filters: ListFilters = serde_json::from_value(serde_json::json!({
            "search": "ana",
            "status": "canceled"
        }))
        .unwrap();
        assert_eq!(filters.status, StatusFilter::Only(AppointmentStatus::Canceled));
        let defaults: ListFilters = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(defaults.status, StatusFilter::All);
        assert!(defaults.search.is_none());
    }
}
