//! Client self-booking: catalog, free slots and booking creation.
//!
//! Slots are laid on a fixed grid from opening time. A slot is offered when
//! the service fits before closing and at least one eligible professional has
//! no scheduled appointment overlapping it.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::appointment::{Appointment, AppointmentStatus, NewAppointment};
use crate::models::business::Business;
use crate::models::client::Client;
use crate::models::professional::Professional;
use crate::models::service::Service;
use crate::services::{appointment, catalog, hours, professional};
use crate::store::StoreClient;

#[derive(Debug, Serialize)]
pub struct Catalog {
    pub business: Business,
    pub services: Vec<Service>,
    pub professionals: Vec<Professional>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub service_id: Uuid,
    /// `None` means no preference.
    pub professional_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableSlot {
    #[serde(with = "crate::models::hhmm")]
    pub time: NaiveTime,
    pub professional_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub service_id: Uuid,
    pub professional_id: Option<Uuid>,
    pub date: NaiveDate,
    #[serde(with = "crate::models::hhmm")]
    pub time: NaiveTime,
}

/// A professional's occupied interval, in minutes from midnight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Busy {
    pub professional_id: Uuid,
    pub start: u32,
    pub end: u32,
}

fn minutes(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

fn time_of(minutes: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

/// Occupied intervals from scheduled appointments. Rows without a service
/// join are assumed to last `fallback_minutes`.
pub fn busy_intervals(appointments: &[Appointment], fallback_minutes: u32) -> Vec<Busy> {
    appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Scheduled)
        .map(|a| {
            let start = minutes(a.time);
            let length = a
                .duration_minutes()
                .and_then(|d| u32::try_from(d).ok())
                .filter(|d| *d > 0)
                .unwrap_or(fallback_minutes);
            Busy {
                professional_id: a.professional_id,
                start,
                end: start + length,
            }
        })
        .collect()
}

/// Professionals from `candidates` free for `[start, start + length)`, in
/// candidate order.
pub fn free_professionals(
    candidates: &[Uuid],
    busy: &[Busy],
    start: u32,
    length: u32,
) -> Vec<Uuid> {
    let end = start + length;
    candidates
        .iter()
        .copied()
        .filter(|id| {
            !busy
                .iter()
                .any(|b| b.professional_id == *id && start < b.end && b.start < end)
        })
        .collect()
}

/// Offered start times between `open` and `close`. Slots at or before
/// `not_before` are dropped.
pub fn available_slots(
    open: NaiveTime,
    close: NaiveTime,
    service_minutes: u32,
    step_minutes: u32,
    candidates: &[Uuid],
    busy: &[Busy],
    not_before: Option<NaiveTime>,
) -> Vec<AvailableSlot> {
    let step = step_minutes.max(1);
    let close = minutes(close);
    let floor = not_before.map(minutes);
    let mut slots = Vec::new();
    let mut start = minutes(open);
    while start.saturating_add(service_minutes) <= close {
        if floor.map_or(true, |f| start > f) {
            let free = free_professionals(candidates, busy, start, service_minutes);
            if let (false, Some(time)) = (free.is_empty(), time_of(start)) {
                slots.push(AvailableSlot {
                    time,
                    professional_ids: free,
                });
            }
        }
        start = start.saturating_add(step);
    }
    slots
}

fn service_minutes(service: &Service) -> Result<u32, AppError> {
    u32::try_from(service.duration)
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| AppError::Internal(format!("Service {} has no duration", service.id)))
}

/// Reject dates before today and times already passed today.
pub fn check_not_past(
    date: NaiveDate,
    time: Option<NaiveTime>,
    now: NaiveDateTime,
) -> Result<(), AppError> {
    if date < now.date() {
        return Err(AppError::Validation("Cannot book a date in the past".to_string()));
    }
    if let Some(time) = time {
        if date == now.date() && time <= now.time() {
            return Err(AppError::Validation("Cannot book a time in the past".to_string()));
        }
    }
    Ok(())
}

fn candidates(
    professionals: &[Professional],
    preferred: Option<Uuid>,
) -> Result<Vec<Uuid>, AppError> {
    match preferred {
        Some(id) if professionals.iter().any(|p| p.id == id) => Ok(vec![id]),
        Some(_) => Err(AppError::NotFound("Professional not found".to_string())),
        None => Ok(professionals.iter().map(|p| p.id).collect()),
    }
}

pub async fn get_catalog(store: &StoreClient, business: Business) -> Result<Catalog, AppError> {
    let (services, professionals) = tokio::try_join!(
        catalog::list_by_business(store, business.id),
        professional::list_by_business(store, business.id),
    )?;
    Ok(Catalog {
        business,
        services,
        professionals,
    })
}

pub async fn get_availability(
    store: &StoreClient,
    business_id: Uuid,
    query: &AvailabilityQuery,
    slot_minutes: u32,
    now: NaiveDateTime,
) -> Result<Vec<AvailableSlot>, AppError> {
    check_not_past(query.date, None, now)?;

    let (service, week, professionals, booked) = tokio::try_join!(
        catalog::find_by_id(store, business_id, query.service_id),
        hours::get_hours(store, business_id),
        professional::list_by_business(store, business_id),
        appointment::list_by_date(store, business_id, query.date),
    )?;

    let Some((open, close)) = hours::open_hours_on(&week, query.date) else {
        return Ok(Vec::new());
    };
    let candidates = candidates(&professionals, query.professional_id)?;
    let busy = busy_intervals(&booked, slot_minutes);
    let not_before = (query.date == now.date()).then(|| now.time());

    Ok(available_slots(
        open,
        close,
        service_minutes(&service)?,
        slot_minutes,
        &candidates,
        &busy,
        not_before,
    ))
}

/// Book for `client`. With no preferred professional the first free one is
/// assigned. A slot nobody can take is a conflict.
pub async fn book(
    store: &StoreClient,
    business_id: Uuid,
    client: &Client,
    request: &BookingRequest,
    slot_minutes: u32,
    now: NaiveDateTime,
) -> Result<Appointment, AppError> {
    check_not_past(request.date, Some(request.time), now)?;

    let (service, week, professionals, booked) = tokio::try_join!(
        catalog::find_by_id(store, business_id, request.service_id),
        hours::get_hours(store, business_id),
        professional::list_by_business(store, business_id),
        appointment::list_by_date(store, business_id, request.date),
    )?;

    let length = service_minutes(&service)?;
    let start = minutes(request.time);
    let fits = hours::open_hours_on(&week, request.date)
        .is_some_and(|(open, close)| start >= minutes(open) && start + length <= minutes(close));
    if !fits {
        return Err(AppError::Validation(
            "The requested time is outside opening hours".to_string(),
        ));
    }

    let candidates = candidates(&professionals, request.professional_id)?;
    let busy = busy_intervals(&booked, slot_minutes);
    let professional_id = free_professionals(&candidates, &busy, start, length)
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Conflict("This time slot is already taken".to_string()))?;

    let row = NewAppointment {
        business_id,
        client_id: client.id,
        service_id: service.id,
        professional_id,
        date: request.date,
        time: request.time,
        status: AppointmentStatus::Scheduled,
        value: service.price,
    };
    appointment::insert(store, &row).await
}

/// The client's own appointments, most recent first.
pub async fn client_history(
    store: &StoreClient,
    business_id: Uuid,
    client_id: Uuid,
) -> Result<Vec<Appointment>, AppError> {
    appointment::list_for_client(store, business_id, client_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn times(slots: &[AvailableSlot]) -> Vec<NaiveTime> {
        slots.iter().map(|s| s.time).collect()
    }

    #[test]
    fn grid_stops_when_service_no_longer_fits() {
        let pro = Uuid::new_v4();
        let slots = available_slots(t(9, 0), t(11, 0), 45, 30, &[pro], &[], None);
        assert_eq!(times(&slots), vec![t(9, 0), t(9, 30), t(10, 0)]);
    }

    #[test]
    fn oversized_step_yields_the_opening_slot_only() {
        let pro = Uuid::new_v4();
        let slots = available_slots(t(9, 0), t(11, 0), 30, u32::MAX, &[pro], &[], None);
        assert_eq!(times(&slots), vec![t(9, 0)]);
    }

    #[test]
    fn overlapping_appointment_blocks_slots() {
        let pro = Uuid::new_v4();
        let busy = vec![Busy {
            professional_id: pro,
            start: 9 * 60 + 30,
            end: 10 * 60,
        }];
        let slots = available_slots(t(9, 0), t(11, 0), 30, 30, &[pro], &busy, None);
        assert_eq!(times(&slots), vec![t(9, 0), t(10, 0), t(10, 30)]);
    }

    #[test]
    fn no_preference_offers_slot_while_anyone_is_free() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let busy = vec![Busy {
            professional_id: first,
            start: 9 * 60,
            end: 10 * 60,
        }];
        let slots = available_slots(t(9, 0), t(10, 0), 30, 30, &[first, second], &busy, None);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].professional_ids, vec![second]);
    }

    #[test]
    fn past_times_today_are_hidden() {
        let pro = Uuid::new_v4();
        let slots = available_slots(t(9, 0), t(11, 0), 30, 30, &[pro], &[], Some(t(9, 45)));
        assert_eq!(times(&slots), vec![t(10, 0), t(10, 30)]);
    }

    #[test]
    fn only_scheduled_appointments_are_busy() {
        use chrono::Utc;
        use rust_decimal::Decimal;

        let pro = Uuid::new_v4();
        let mut rows = Vec::new();
        for status in [AppointmentStatus::Scheduled, AppointmentStatus::Canceled] {
            rows.push(Appointment {
                id: Uuid::new_v4(),
                business_id: Uuid::nil(),
                client_id: Uuid::nil(),
                service_id: Uuid::nil(),
                professional_id: pro,
                date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                time: t(14, 0),
                status,
                value: Decimal::from(30),
                created_at: Utc::now(),
                client: None,
                service: None,
                professional: None,
            });
        }
        let busy = busy_intervals(&rows, 30);
        assert_eq!(
            busy,
            vec![Busy {
                professional_id: pro,
                start: 14 * 60,
                end: 14 * 60 + 30,
            }]
        );
    }

    #[test]
    fn past_dates_are_rejected() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        assert!(check_not_past(yesterday, None, now).is_err());
        assert!(check_not_past(now.date(), Some(t(11, 0)), now).is_err());
        assert!(check_not_past(now.date(), Some(t(13, 0)), now).is_ok());
        assert!(check_not_past(now.date(), None, now).is_ok());
    }
}
