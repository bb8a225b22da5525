//! Weekly opening hours, one row per weekday and business.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TABLE: &str = "business_hours";

/// Upsert key: one row per (business, weekday).
pub const CONFLICT_KEY: &str = "business_id,weekday";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessHours {
    pub business_id: Uuid,
    /// 0 = Monday through 6 = Sunday.
    pub weekday: u8,
    pub is_open: bool,
    #[serde(with = "crate::models::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "crate::models::hhmm")]
    pub end: NaiveTime,
}

impl BusinessHours {
    pub fn day(&self) -> Option<Weekday> {
        weekday_from_index(self.weekday)
    }
}

/// One entry of the weekly schedule as edited by the business.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayHours {
    pub weekday: u8,
    pub is_open: bool,
    #[serde(with = "crate::models::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "crate::models::hhmm")]
    pub end: NaiveTime,
}

impl From<BusinessHours> for DayHours {
    fn from(row: BusinessHours) -> Self {
        Self {
            weekday: row.weekday,
            is_open: row.is_open,
            start: row.start,
            end: row.end,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateHours {
    pub days: Vec<DayHours>,
}

pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn weekday_index(day: Weekday) -> u8 {
    day.num_days_from_monday() as u8
}
