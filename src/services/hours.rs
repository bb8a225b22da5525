//! Weekly opening hours with defaults for days never saved.

use chrono::{Datelike, NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::hours::{self, weekday_index, BusinessHours, DayHours, UpdateHours};
use crate::store::{Query, StoreClient};

fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Mon-Fri 09:00-19:00, Sat 09:00-17:00, Sun closed.
pub fn default_week() -> Vec<DayHours> {
    (0..7u8)
        .map(|weekday| match weekday {
            0..=4 => DayHours {
                weekday,
                is_open: true,
                start: at(9),
                end: at(19),
            },
            5 => DayHours {
                weekday,
                is_open: true,
                start: at(9),
                end: at(17),
            },
            _ => DayHours {
                weekday,
                is_open: false,
                start: at(9),
                end: at(14),
            },
        })
        .collect()
}

/// Overlay stored rows on the defaults, one entry per weekday.
pub fn merge_with_defaults(rows: Vec<BusinessHours>) -> Vec<DayHours> {
    let mut week = default_week();
    for row in rows {
        if let Some(slot) = week.get_mut(row.weekday as usize) {
            *slot = row.into();
        }
    }
    week
}

pub fn validate_week(days: &[DayHours]) -> Result<(), AppError> {
    let mut seen = [false; 7];
    for day in days {
        let idx = day.weekday as usize;
        if idx >= seen.len() {
            return Err(AppError::Validation(format!(
                "weekday must be between 0 and 6, got {}",
                day.weekday
            )));
        }
        if seen[idx] {
            return Err(AppError::Validation(format!(
                "weekday {} appears more than once",
                day.weekday
            )));
        }
        seen[idx] = true;
        if day.is_open && day.start >= day.end {
            return Err(AppError::Validation(format!(
                "weekday {} opens at {} but closes at {}",
                day.weekday,
                day.start.format("%H:%M"),
                day.end.format("%H:%M")
            )));
        }
    }
    Ok(())
}

/// Opening and closing time on `date`, or `None` when closed.
pub fn open_hours_on(week: &[DayHours], date: NaiveDate) -> Option<(NaiveTime, NaiveTime)> {
    let weekday = weekday_index(date.weekday());
    week.iter()
        .find(|d| d.weekday == weekday && d.is_open)
        .map(|d| (d.start, d.end))
}

pub async fn get_hours(store: &StoreClient, business_id: Uuid) -> Result<Vec<DayHours>, AppError> {
    let query = Query::table(hours::TABLE)
        .eq("business_id", business_id)
        .order("weekday", true);
    let rows: Vec<BusinessHours> = store.select(&query).await?;
    Ok(merge_with_defaults(rows))
}

pub async fn save_hours(
    store: &StoreClient,
    business_id: Uuid,
    input: &UpdateHours,
) -> Result<Vec<DayHours>, AppError> {
    validate_week(&input.days)?;
    let rows: Vec<BusinessHours> = input
        .days
        .iter()
        .map(|d| BusinessHours {
            business_id,
            weekday: d.weekday,
            is_open: d.is_open,
            start: d.start,
            end: d.end,
        })
        .collect();
    let saved: Vec<BusinessHours> = store
        .upsert(hours::TABLE, hours::CONFLICT_KEY, &rows)
        .await?;
    tracing::info!(business_id = %business_id, days = saved.len(), "Business hours saved");
    get_hours(store, business_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(weekday: u8, is_open: bool, start: u32, end: u32) -> DayHours {
        DayHours {
            weekday,
            is_open,
            start: at(start),
            end: at(end),
        }
    }

    #[test]
    fn defaults_cover_the_week() {
        let week = default_week();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0], day(0, true, 9, 19));
        assert_eq!(week[5], day(5, true, 9, 17));
        assert!(!week[6].is_open);
    }

    #[test]
    fn stored_rows_override_defaults() {
        let rows = vec![BusinessHours {
            business_id: Uuid::nil(),
            weekday: 6,
            is_open: true,
            start: at(10),
            end: at(14),
        }];
        let week = merge_with_defaults(rows);
        assert_eq!(week[6], day(6, true, 10, 14));
        assert_eq!(week[0], day(0, true, 9, 19));
    }

    #[test]
    fn open_day_must_close_after_opening() {
        let err = validate_week(&[day(2, true, 18, 9)]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(validate_week(&[day(2, false, 18, 9)]).is_ok());
    }

    #[test]
    fn rejects_bad_and_duplicate_weekdays() {
        assert!(validate_week(&[day(7, true, 9, 10)]).is_err());
        assert!(validate_week(&[day(1, true, 9, 10), day(1, false, 9, 10)]).is_err());
    }

    #[test]
    fn closed_on_sunday_by_default() {
        let week = default_week();
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert_eq!(open_hours_on(&week, sunday), None);
        assert_eq!(open_hours_on(&week, monday), Some((at(9), at(19))));
    }
}
