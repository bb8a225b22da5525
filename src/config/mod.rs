use std::env;
use std::ops::RangeInclusive;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub store_api_key: String,
    pub store_jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub booking_slot_minutes: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            store_url: env::var("STORE_URL")?
                .trim_end_matches('/')
                .to_string(),
            store_api_key: env::var("STORE_API_KEY")?,
            store_jwt_secret: env::var("STORE_JWT_SECRET")?,
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            booking_slot_minutes: slot_minutes(env::var("BOOKING_SLOT_MINUTES").ok().as_deref()),
        })
    }
}

pub const DEFAULT_SLOT_MINUTES: u32 = 30;
pub const SLOT_MINUTES_RANGE: RangeInclusive<u32> = 5..=240;

/// Parse the availability grid step. Unset, unparsable or out-of-range values
/// fall back to the default.
fn slot_minutes(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return DEFAULT_SLOT_MINUTES;
    };
    match raw.trim().parse::<u32>() {
        Ok(minutes) if SLOT_MINUTES_RANGE.contains(&minutes) => minutes,
        _ => {
            tracing::warn!(
                value = raw,
                default = DEFAULT_SLOT_MINUTES,
                "BOOKING_SLOT_MINUTES must be between 5 and 240, using default"
            );
            DEFAULT_SLOT_MINUTES
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_minutes_defaults_when_unset() {
        assert_eq!(slot_minutes(None), 30);
    }

    #[test]
    fn slot_minutes_accepts_values_in_range() {
        assert_eq!(slot_minutes(Some("15")), 15);
        assert_eq!(slot_minutes(Some(" 240 ")), 240);
        assert_eq!(slot_minutes(Some("5")), 5);
    }

    #[test]
    fn slot_minutes_rejects_out_of_range_and_garbage() {
        assert_eq!(slot_minutes(Some("0")), 30);
        assert_eq!(slot_minutes(Some("4")), 30);
        assert_eq!(slot_minutes(Some("241")), 30);
        assert_eq!(slot_minutes(Some("4294967295")), 30);
        assert_eq!(slot_minutes(Some("half an hour")), 30);
    }
}
