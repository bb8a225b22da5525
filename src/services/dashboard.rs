//! Business dashboard: totals, revenue chart, popular services and the
//! upcoming/new-client feeds.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::appointment::Appointment;
use crate::models::client::Client;
use crate::services::stats::{self, DashboardTotals, Period, RevenuePoint, ServicePopularity};
use crate::services::{appointment, client};
use crate::store::StoreClient;

const UPCOMING_LIMIT: usize = 3;
const NEW_CLIENTS_LIMIT: usize = 3;
const NEW_CLIENT_DAYS: i64 = 7;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub totals: DashboardTotals,
    pub period: Period,
    pub revenue: Vec<RevenuePoint>,
    pub popular_services: Vec<ServicePopularity>,
    pub upcoming: Vec<Appointment>,
    pub new_clients: Vec<Client>,
}

/// Aggregate already fetched rows. `appointments` must be ordered by date
/// ascending for the revenue chart to come out chronological.
pub fn build_view(
    clients: &[Client],
    appointments: &[Appointment],
    period: Period,
    today: NaiveDate,
) -> (DashboardTotals, Vec<RevenuePoint>, Vec<ServicePopularity>) {
    let totals = stats::summarize(clients, appointments, today);
    let window = stats::since(appointments, period.window_start(today));
    let revenue = stats::revenue_by_period(window, period);
    let popular = stats::popular_services(appointments);
    (totals, revenue, popular)
}

/// Fetch everything the dashboard needs in parallel and aggregate in memory.
pub async fn get_dashboard(
    store: &StoreClient,
    business_id: Uuid,
    period: Period,
    now: DateTime<Utc>,
) -> Result<DashboardView, AppError> {
    let today = now.date_naive();
    let new_since = now - Duration::days(NEW_CLIENT_DAYS);

    let (appointments, clients, upcoming, new_clients) = tokio::try_join!(
        appointment::list_by_business(store, business_id),
        client::list_by_business(store, business_id),
        appointment::list_upcoming(store, business_id, today, UPCOMING_LIMIT),
        client::list_created_since(store, business_id, new_since, NEW_CLIENTS_LIMIT),
    )?;

    let (totals, revenue, popular_services) = build_view(&clients, &appointments, period, today);
    tracing::debug!(
        business_id = %business_id,
        appointments = appointments.len(),
        clients = clients.len(),
        "Dashboard aggregated"
    );

    Ok(DashboardView {
        totals,
        period,
        revenue,
        popular_services,
        upcoming,
        new_clients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::AppointmentStatus;
    use chrono::NaiveTime;
    use rust_decimal::Decimal;

    fn appt(status: AppointmentStatus, value: i64, date: NaiveDate) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            business_id: Uuid::nil(),
            client_id: Uuid::nil(),
            service_id: Uuid::nil(),
            professional_id: Uuid::nil(),
            date,
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            status,
            value: Decimal::from(value),
            created_at: Utc::now(),
            client: None,
            service: None,
            professional: None,
        }
    }

    #[test]
    fn revenue_chart_only_covers_the_period() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let rows = vec![
            appt(AppointmentStatus::Completed, 70, NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()),
            appt(AppointmentStatus::Completed, 30, NaiveDate::from_ymd_opt(2025, 6, 5).unwrap()),
            appt(AppointmentStatus::Completed, 20, NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()),
        ];

        let (totals, week, popular) = build_view(&[], &rows, Period::Week, today);
        assert_eq!(week.len(), 2);
        assert_eq!(week[0].date, "05/06");
        assert_eq!(week[1].date, "09/06");
        assert_eq!(totals.total_revenue, Decimal::from(120));
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].count, 3);

        let (_, month, _) = build_view(&[], &rows, Period::Month, today);
        assert_eq!(month.len(), 3);
        assert_eq!(month[0].date, "20/05");
    }
}
