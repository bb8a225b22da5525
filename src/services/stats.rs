//! Appointment statistics: totals, revenue buckets and service popularity.
//!
//! Everything here is a pure function over borrowed rows. Calling any of them
//! twice on the same input yields the same output.

use chrono::{Datelike, Duration, Months, NaiveDate};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::appointment::{Appointment, AppointmentStatus};
use crate::models::client::Client;

/// Days covered by the dashboard totals.
pub const STATS_WINDOW_DAYS: i64 = 30;

/// How many services the popularity ranking keeps.
pub const POPULAR_SERVICES_LIMIT: usize = 5;

const UNKNOWN_SERVICE: &str = "Unknown";

/// Revenue chart window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    #[default]
    Month,
    Year,
}

impl Period {
    /// First day included in the window ending `today`.
    pub fn window_start(self, today: NaiveDate) -> NaiveDate {
        match self {
            Period::Week => today - Duration::days(7),
            Period::Month => today
                .checked_sub_months(Months::new(1))
                .unwrap_or(NaiveDate::MIN),
            Period::Year => today
                .checked_sub_months(Months::new(12))
                .unwrap_or(NaiveDate::MIN),
        }
    }

    /// Bucket key: `DD/MM` per day for week and month, `MM/YYYY` per month for year.
    pub fn bucket_key(self, date: NaiveDate) -> String {
        match self {
            Period::Week | Period::Month => date.format("%d/%m").to_string(),
            Period::Year => month_key(date),
        }
    }
}

pub fn month_key(date: NaiveDate) -> String {
    format!("{:02}/{}", date.month(), date.year())
}

/// Start of the dashboard totals window.
pub fn stats_window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(STATS_WINDOW_DAYS)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardTotals {
    pub total_clients: usize,
    pub total_appointments: usize,
    pub total_revenue: Decimal,
    pub return_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenuePoint {
    pub date: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicePopularity {
    pub id: Uuid,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountPoint {
    pub period: String,
    pub count: usize,
}

fn is_completed(row: &Appointment) -> bool {
    row.status == AppointmentStatus::Completed
}

/// Rows dated on or after `start`.
pub fn since(rows: &[Appointment], start: NaiveDate) -> Vec<&Appointment> {
    rows.iter().filter(|row| row.date >= start).collect()
}

/// Sum of `value` over completed appointments.
pub fn total_revenue<'a>(rows: impl IntoIterator<Item = &'a Appointment>) -> Decimal {
    rows.into_iter()
        .filter(|row| is_completed(row))
        .map(|row| row.value)
        .sum()
}

/// Share of clients with more than one visit, as a whole percentage rounded
/// half up. Zero when there are no clients.
pub fn return_rate(clients: &[Client]) -> u32 {
    let total = clients.len() as u64;
    if total == 0 {
        return 0;
    }
    let returning = clients.iter().filter(|c| c.visits > 1).count() as u64;
    ((returning * 200 + total) / (total * 2)) as u32
}

/// Completed revenue grouped by bucket key, in first-seen order.
pub fn revenue_by_period<'a>(
    rows: impl IntoIterator<Item = &'a Appointment>,
    period: Period,
) -> Vec<RevenuePoint> {
    let mut buckets: IndexMap<String, Decimal> = IndexMap::new();
    for row in rows.into_iter().filter(|row| is_completed(row)) {
        *buckets.entry(period.bucket_key(row.date)).or_default() += row.value;
    }
    buckets
        .into_iter()
        .map(|(date, value)| RevenuePoint { date, value })
        .collect()
}

/// Most booked services, highest count first. Ties keep the order in which
/// services were first seen.
pub fn popular_services<'a>(
    rows: impl IntoIterator<Item = &'a Appointment>,
) -> Vec<ServicePopularity> {
    let mut counts: IndexMap<Uuid, ServicePopularity> = IndexMap::new();
    for row in rows {
        counts
            .entry(row.service_id)
            .or_insert_with(|| ServicePopularity {
                id: row.service_id,
                name: row
                    .service_name()
                    .unwrap_or(UNKNOWN_SERVICE)
                    .to_string(),
                count: 0,
            })
            .count += 1;
    }
    let mut ranked: Vec<ServicePopularity> = counts.into_values().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(POPULAR_SERVICES_LIMIT);
    ranked
}

/// Number of dates per `MM/YYYY` month, in first-seen order.
pub fn count_by_month(dates: impl IntoIterator<Item = NaiveDate>) -> Vec<CountPoint> {
    let mut buckets: IndexMap<String, usize> = IndexMap::new();
    for date in dates {
        *buckets.entry(month_key(date)).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(period, count)| CountPoint { period, count })
        .collect()
}

/// Dashboard totals: every client, appointments and completed revenue of the
/// last [`STATS_WINDOW_DAYS`] days.
pub fn summarize(
    clients: &[Client],
    appointments: &[Appointment],
    today: NaiveDate,
) -> DashboardTotals {
    let recent = since(appointments, stats_window_start(today));
    DashboardTotals {
        total_clients: clients.len(),
        total_appointments: recent.len(),
        total_revenue: total_revenue(recent.iter().copied()),
        return_rate: return_rate(clients),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::ServiceRef;
    use chrono::{NaiveTime, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn appt(status: AppointmentStatus, value: i64, on: NaiveDate) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            business_id: Uuid::nil(),
            client_id: Uuid::nil(),
            service_id: Uuid::nil(),
            professional_id: Uuid::nil(),
            date: on,
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            status,
            value: Decimal::from(value),
            created_at: Utc::now(),
            client: None,
            service: None,
            professional: None,
        }
    }

    fn for_service(id: Uuid, name: Option<&str>) -> Appointment {
        let mut row = appt(AppointmentStatus::Scheduled, 10, date(2025, 6, 1));
        row.service_id = id;
        row.service = name.map(|n| ServiceRef {
            id,
            name: n.to_string(),
            price: None,
            duration: None,
        });
        row
    }

    fn client_with_visits(visits: i32) -> Client {
        Client {
            id: Uuid::new_v4(),
            business_id: Uuid::nil(),
            name: "c".to_string(),
            email: "c@example.com".to_string(),
            phone: "0".to_string(),
            visits,
            total_spent: Decimal::ZERO,
            last_visit: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn revenue_counts_completed_only() {
        let rows = vec![
            appt(AppointmentStatus::Completed, 50, date(2025, 6, 1)),
            appt(AppointmentStatus::Completed, 30, date(2025, 6, 1)),
            appt(AppointmentStatus::Scheduled, 20, date(2025, 6, 2)),
        ];
        assert_eq!(total_revenue(&rows), Decimal::from(80));
    }

    #[test]
    fn revenue_of_nothing_is_zero() {
        let none: Vec<Appointment> = Vec::new();
        assert_eq!(total_revenue(&none), Decimal::ZERO);
    }

    #[test]
    fn return_rate_rounds_half_up() {
        let clients: Vec<Client> = [1, 2, 3].into_iter().map(client_with_visits).collect();
        assert_eq!(return_rate(&clients), 67);

        let eighth: Vec<Client> = std::iter::once(2)
            .chain(std::iter::repeat(1).take(7))
            .map(client_with_visits)
            .collect();
        assert_eq!(return_rate(&eighth), 13);
    }

    #[test]
    fn return_rate_without_clients_is_zero() {
        assert_eq!(return_rate(&[]), 0);
    }

    #[test]
    fn week_view_groups_by_day_in_first_seen_order() {
        let rows = vec![
            appt(AppointmentStatus::Completed, 50, date(2025, 6, 1)),
            appt(AppointmentStatus::Completed, 30, date(2025, 6, 1)),
            appt(AppointmentStatus::Completed, 25, date(2025, 6, 3)),
            appt(AppointmentStatus::Canceled, 99, date(2025, 6, 4)),
        ];
        let points = revenue_by_period(&rows, Period::Week);
        assert_eq!(
            points,
            vec![
                RevenuePoint {
                    date: "01/06".to_string(),
                    value: Decimal::from(80)
                },
                RevenuePoint {
                    date: "03/06".to_string(),
                    value: Decimal::from(25)
                },
            ]
        );
    }

    #[test]
    fn first_seen_order_is_kept_for_unsorted_input() {
        let rows = vec![
            appt(AppointmentStatus::Completed, 10, date(2025, 6, 5)),
            appt(AppointmentStatus::Completed, 10, date(2025, 6, 1)),
            appt(AppointmentStatus::Completed, 10, date(2025, 6, 5)),
        ];
        let keys: Vec<String> = revenue_by_period(&rows, Period::Month)
            .into_iter()
            .map(|p| p.date)
            .collect();
        assert_eq!(keys, vec!["05/06", "01/06"]);
    }

    #[test]
    fn year_view_groups_by_month() {
        let rows = vec![
            appt(AppointmentStatus::Completed, 40, date(2024, 12, 30)),
            appt(AppointmentStatus::Completed, 60, date(2025, 1, 2)),
            appt(AppointmentStatus::Completed, 15, date(2025, 1, 20)),
        ];
        let points = revenue_by_period(&rows, Period::Year);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "12/2024");
        assert_eq!(points[1].date, "01/2025");
        assert_eq!(points[1].value, Decimal::from(75));
    }

    #[test]
    fn popular_services_counts_and_sorts() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![
            for_service(a, Some("A")),
            for_service(a, Some("A")),
            for_service(a, Some("A")),
            for_service(b, Some("B")),
            for_service(a, Some("A")),
        ];
        let ranked = popular_services(&rows);
        assert_eq!(
            ranked,
            vec![
                ServicePopularity {
                    id: a,
                    name: "A".to_string(),
                    count: 4
                },
                ServicePopularity {
                    id: b,
                    name: "B".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn popular_services_ties_keep_first_seen_and_truncate() {
        let ids: Vec<Uuid> = (0..7).map(|_| Uuid::new_v4()).collect();
        let rows: Vec<Appointment> = ids.iter().map(|id| for_service(*id, None)).collect();
        let ranked = popular_services(&rows);
        assert_eq!(ranked.len(), POPULAR_SERVICES_LIMIT);
        let got: Vec<Uuid> = ranked.iter().map(|s| s.id).collect();
        assert_eq!(got, ids[..5].to_vec());
        assert!(ranked.iter().all(|s| s.name == "Unknown"));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let rows = vec![
            appt(AppointmentStatus::Completed, 50, date(2025, 6, 1)),
            appt(AppointmentStatus::Scheduled, 20, date(2025, 6, 2)),
        ];
        assert_eq!(
            revenue_by_period(&rows, Period::Week),
            revenue_by_period(&rows, Period::Week)
        );
        assert_eq!(popular_services(&rows), popular_services(&rows));
        assert_eq!(total_revenue(&rows), total_revenue(&rows));
    }

    #[test]
    fn windows_follow_calendar() {
        let today = date(2025, 3, 31);
        assert_eq!(Period::Week.window_start(today), date(2025, 3, 24));
        assert_eq!(Period::Month.window_start(today), date(2025, 2, 28));
        assert_eq!(Period::Year.window_start(today), date(2024, 3, 31));
        assert_eq!(stats_window_start(today), date(2025, 3, 1));
    }

    #[test]
    fn summarize_uses_thirty_day_window() {
        let today = date(2025, 6, 30);
        let clients: Vec<Client> = [1, 3].into_iter().map(client_with_visits).collect();
        let rows = vec![
            appt(AppointmentStatus::Completed, 100, date(2025, 5, 1)),
            appt(AppointmentStatus::Completed, 50, date(2025, 6, 1)),
            appt(AppointmentStatus::Scheduled, 20, date(2025, 6, 29)),
        ];
        let totals = summarize(&clients, &rows, today);
        assert_eq!(totals.total_clients, 2);
        assert_eq!(totals.total_appointments, 2);
        assert_eq!(totals.total_revenue, Decimal::from(50));
        assert_eq!(totals.return_rate, 50);
    }

    #[test]
    fn count_by_month_buckets_dates() {
        let points = count_by_month(vec![date(2025, 5, 3), date(2025, 5, 20), date(2025, 6, 1)]);
        assert_eq!(
            points,
            vec![
                CountPoint {
                    period: "05/2025".to_string(),
                    count: 2
                },
                CountPoint {
                    period: "06/2025".to_string(),
                    count: 1
                },
            ]
        );
    }
}
