//! Appointment status state machine.
//!
//! A scheduled appointment can be completed or canceled. Both outcomes are
//! terminal for status updates; a canceled appointment is rebooked through
//! [`reschedule`], which leaves the original in place as history.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::appointment::{
    Appointment, AppointmentStatus, NewAppointment, RescheduleAppointment,
};
use crate::services::{appointment, client, professional};
use crate::store::StoreClient;

/// Result of a successful status change.
#[derive(Debug, Serialize)]
pub struct TransitionResult {
    pub appointment_id: Uuid,
    pub previous_status: AppointmentStatus,
    pub new_status: AppointmentStatus,
    pub appointment: Appointment,
}

/// Check whether a status transition is allowed.
pub fn is_valid_transition(from: &AppointmentStatus, to: &AppointmentStatus) -> bool {
    matches!(
        (from, to),
        (AppointmentStatus::Scheduled, AppointmentStatus::Completed)
            | (AppointmentStatus::Scheduled, AppointmentStatus::Canceled)
    )
}

pub fn validate_transition(
    from: &AppointmentStatus,
    to: &AppointmentStatus,
) -> Result<(), AppError> {
    if !is_valid_transition(from, to) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot change an appointment from {from} to {to}"
        )));
    }
    Ok(())
}

/// Only canceled appointments can be rebooked.
pub fn validate_reschedule(current: &AppointmentStatus) -> Result<(), AppError> {
    if *current != AppointmentStatus::Canceled {
        return Err(AppError::InvalidTransition(format!(
            "Only canceled appointments can be rescheduled, this one is {current}"
        )));
    }
    Ok(())
}

/// New scheduled row copying client, service and value from `original`.
pub fn rebooked_row(
    original: &Appointment,
    date: NaiveDate,
    time: NaiveTime,
    professional_id: Uuid,
) -> NewAppointment {
    NewAppointment {
        business_id: original.business_id,
        client_id: original.client_id,
        service_id: original.service_id,
        professional_id,
        date,
        time,
        status: AppointmentStatus::Scheduled,
        value: original.value,
    }
}

/// Validate and apply a status change. Completing also records the visit on
/// the client's counters.
pub async fn transition(
    store: &StoreClient,
    business_id: Uuid,
    appointment_id: Uuid,
    to: AppointmentStatus,
) -> Result<TransitionResult, AppError> {
    let current = appointment::find_by_id(store, business_id, appointment_id).await?;
    validate_transition(&current.status, &to)?;

    if to == AppointmentStatus::Completed {
        // Detached so a dropped view cannot land between the two writes.
        let store = store.clone();
        let visit = current.clone();
        tokio::spawn(async move { complete(&store, &visit).await })
            .await
            .map_err(|e| AppError::Internal(format!("completion task failed: {e}")))??;
    } else {
        appointment::update_status(store, business_id, appointment_id, current.status, to)
            .await?;
    }

    Ok(TransitionResult {
        appointment_id,
        previous_status: current.status,
        new_status: to,
        appointment: Appointment {
            status: to,
            ..current
        },
    })
}

/// Mark `current` completed and add the visit to its client. A failed visit
/// write puts the status back so the completion can be retried.
async fn complete(store: &StoreClient, current: &Appointment) -> Result<(), AppError> {
    let (business_id, id) = (current.business_id, current.id);
    appointment::update_status(
        store,
        business_id,
        id,
        current.status,
        AppointmentStatus::Completed,
    )
    .await?;

    let at = current.starts_at().and_utc();
    let Err(e) =
        client::record_visit(store, business_id, current.client_id, current.value, at).await
    else {
        return Ok(());
    };

    match appointment::update_status(
        store,
        business_id,
        id,
        AppointmentStatus::Completed,
        current.status,
    )
    .await
    {
        Ok(()) => tracing::warn!(
            appointment_id = %id,
            error = %e,
            "Visit not recorded, completion reverted"
        ),
        Err(revert) => tracing::error!(
            appointment_id = %id,
            error = %e,
            revert_error = %revert,
            "Visit not recorded and completion could not be reverted"
        ),
    }
    Err(e)
}

/// Book a canceled appointment again at a new slot.
pub async fn reschedule(
    store: &StoreClient,
    business_id: Uuid,
    appointment_id: Uuid,
    input: &RescheduleAppointment,
) -> Result<Appointment, AppError> {
    let original = appointment::find_by_id(store, business_id, appointment_id).await?;
    validate_reschedule(&original.status)?;

    let professional_id = match input.professional_id {
        Some(id) => professional::find_by_id(store, business_id, id).await?.id,
        None => original.professional_id,
    };

    let row = rebooked_row(&original, input.date, input.time, professional_id);
    let rebooked = appointment::insert(store, &row).await?;
    tracing::info!(
        business_id = %business_id,
        appointment_id = %appointment_id,
        rebooked_id = %rebooked.id,
        "Appointment rescheduled"
    );
    Ok(rebooked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    // -- Valid transitions --

    #[test]
    fn scheduled_to_completed() {
        assert!(is_valid_transition(
            &AppointmentStatus::Scheduled,
            &AppointmentStatus::Completed
        ));
    }

    #[test]
    fn scheduled_to_canceled() {
        assert!(is_valid_transition(
            &AppointmentStatus::Scheduled,
            &AppointmentStatus::Canceled
        ));
    }

    // -- Invalid transitions --

    #[test]
    fn completed_is_terminal() {
        assert!(!is_valid_transition(
            &AppointmentStatus::Completed,
            &AppointmentStatus::Canceled
        ));
        assert!(!is_valid_transition(
            &AppointmentStatus::Completed,
            &AppointmentStatus::Scheduled
        ));
    }

    #[test]
    fn canceled_is_terminal() {
        assert!(!is_valid_transition(
            &AppointmentStatus::Canceled,
            &AppointmentStatus::Scheduled
        ));
        assert!(!is_valid_transition(
            &AppointmentStatus::Canceled,
            &AppointmentStatus::Completed
        ));
    }

    #[test]
    fn same_status_is_rejected() {
        assert!(!is_valid_transition(
            &AppointmentStatus::Scheduled,
            &AppointmentStatus::Scheduled
        ));
    }

    #[test]
    fn invalid_transition_error_names_both_states() {
        let err = validate_transition(&AppointmentStatus::Completed, &AppointmentStatus::Canceled)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert_eq!(
            err.to_string(),
            "Invalid state transition: Cannot change an appointment from completed to canceled"
        );
    }

    // -- Reschedule --

    #[test]
    fn only_canceled_can_be_rescheduled() {
        assert!(validate_reschedule(&AppointmentStatus::Canceled).is_ok());
        assert!(validate_reschedule(&AppointmentStatus::Scheduled).is_err());
        assert!(validate_reschedule(&AppointmentStatus::Completed).is_err());
    }

    #[test]
    fn rebooked_row_keeps_client_service_and_value() {
        let original = Appointment {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            status: AppointmentStatus::Canceled,
            value: Decimal::new(4500, 2),
            created_at: Utc::now(),
            client: None,
            service: None,
            professional: None,
        };
        let new_professional = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 6, 8).unwrap();
        let time = NaiveTime::from_hms_opt(15, 30, 0).unwrap();

        let row = rebooked_row(&original, date, time, new_professional);
        assert_eq!(row.business_id, original.business_id);
        assert_eq!(row.client_id, original.client_id);
        assert_eq!(row.service_id, original.service_id);
        assert_eq!(row.value, original.value);
        assert_eq!(row.professional_id, new_professional);
        assert_eq!(row.date, date);
        assert_eq!(row.time, time);
        assert_eq!(row.status, AppointmentStatus::Scheduled);
    }
}
