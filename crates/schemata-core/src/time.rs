//! Date and time-of-day sanitizers.
//!
//! Dates are normalized to `YYYY-MM-DD`, times of day to `HH:MM:SS`. Values that do not
//! describe a real calendar date or clock time fall back to the default.

use std::sync::LazyLock;

use serde_json::Value;
use time::{Date, Month, Time};

use crate::error::{CoreError, Result};
use crate::sanitize::sanitize_string;

static ISO_DATE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ].*)?$").expect("Invalid date regex")
});

static US_DATE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2}|\d{4})$").expect("Invalid date regex")
});

static CLOCK_TIME: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?(?::(\d{2}))?\s*(?:([ap])\.?m?\.?)?$")
        .expect("Invalid time regex")
});

/// Parse a calendar date from ISO (`2024-03-15`) or US (`3/15/2024`, `3/15/24`) notation.
pub fn parse_date(text: &str) -> Result<Date> {
    let text = text.trim();
    let (year, month, day) = if let Some(caps) = ISO_DATE.captures(text) {
        (caps[1].parse::<i32>(), caps[2].parse::<u8>(), caps[3].parse::<u8>())
    } else if let Some(caps) = US_DATE.captures(text) {
        let year = caps[3].parse::<i32>().map(|y| if y < 100 { 2000 + y } else { y });
        (year, caps[1].parse::<u8>(), caps[2].parse::<u8>())
    } else {
        return Err(CoreError::invalid_date(text));
    };
    let (Ok(year), Ok(month), Ok(day)) = (year, month, day) else {
        return Err(CoreError::invalid_date(text));
    };
    let month = Month::try_from(month).map_err(|_| CoreError::invalid_date(text))?;
    Date::from_calendar_date(year, month, day).map_err(|_| CoreError::invalid_date(text))
}

/// Parse a clock time such as `15:30`, `3pm`, `3:30 p.m.` or `09:05:10`.
pub fn parse_time(text: &str) -> Result<Time> {
    let text = text.trim();
    let caps = CLOCK_TIME
        .captures(text)
        .ok_or_else(|| CoreError::invalid_time(text))?;
    let number = |idx: usize| -> u8 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<u8>().ok())
            .unwrap_or(0)
    };
    let mut hour = number(1);
    let minute = number(2);
    let second = number(3);
    if let Some(meridiem) = caps.get(4) {
        if hour == 0 || hour > 12 {
            return Err(CoreError::invalid_time(text));
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("p");
        hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    }
    Time::from_hms(hour, minute, second).map_err(|_| CoreError::invalid_time(text))
}

/// Normalize a date to `YYYY-MM-DD`, falling back to the default.
pub fn sanitize_date(value: Option<&Value>, def: Option<&str>) -> Option<String> {
    let text = sanitize_string(value, None);
    match parse_date(&text) {
        Ok(date) => Some(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        )),
        Err(_) => def.map(str::to_string),
    }
}

/// Normalize a time of day to `HH:MM:SS`, falling back to the default.
pub fn sanitize_time(value: Option<&Value>, def: Option<&str>) -> Option<String> {
    let text = sanitize_string(value, None);
    match parse_time(&text) {
        Ok(t) => Some(format!(
            "{:02}:{:02}:{:02}",
            t.hour(),
            t.minute(),
            t.second()
        )),
        Err(_) => def.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_date_formats() {
        assert_eq!(
            sanitize_date(Some(&json!("2024-3-5")), None),
            Some("2024-03-05".to_string())
        );
        assert_eq!(
            sanitize_date(Some(&json!("12/25/2023")), None),
            Some("2023-12-25".to_string())
        );
        assert_eq!(
            sanitize_date(Some(&json!("1/2/24")), None),
            Some("2024-01-02".to_string())
        );
        assert_eq!(
            sanitize_date(Some(&json!("2024-01-15T10:00:00Z")), None),
            Some("2024-01-15".to_string())
        );
    }

    #[test]
    fn test_sanitize_date_rejects_impossible_dates() {
        assert_eq!(sanitize_date(Some(&json!("2023-02-30")), None), None);
        assert_eq!(
            sanitize_date(Some(&json!("soon")), Some("2000-01-01")),
            Some("2000-01-01".to_string())
        );
    }

    #[test]
    fn test_sanitize_time_formats() {
        assert_eq!(sanitize_time(Some(&json!("15:30")), None), Some("15:30:00".to_string()));
        assert_eq!(sanitize_time(Some(&json!("3pm")), None), Some("15:00:00".to_string()));
        assert_eq!(
            sanitize_time(Some(&json!("12:15 a.m.")), None),
            Some("00:15:00".to_string())
        );
        assert_eq!(
            sanitize_time(Some(&json!("09:05:10")), None),
            Some("09:05:10".to_string())
        );
    }

    #[test]
    fn test_sanitize_time_rejects_garbage() {
        assert_eq!(sanitize_time(Some(&json!("25:00")), None), None);
        assert_eq!(sanitize_time(Some(&json!("13pm")), None), None);
        assert_eq!(sanitize_time(Some(&json!("noon")), None), None);
    }
}
