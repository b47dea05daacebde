//! Request field validators for use with `#[validate(custom(function = ...))]`.

use chrono::{NaiveDate, NaiveTime};
use validator::ValidationError;

/// Accepted time-of-day formats, most specific first.
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Date format used for schedule effective periods.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validates that a string contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Parses a time of day in `HH:MM:SS` or `HH:MM` form.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value.trim(), format).ok())
}

/// Validates a time of day in `HH:MM:SS` or `HH:MM` form.
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    match parse_time_of_day(value) {
        Some(_) => Ok(()),
        None => {
            let mut err = ValidationError::new("time_format");
            err.message = Some("time must be formatted as HH:MM or HH:MM:SS".into());
            Err(err)
        }
    }
}

/// Parses a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Validates a calendar date in `YYYY-MM-DD` form.
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    match parse_date(value) {
        Some(_) => Ok(()),
        None => {
            let mut err = ValidationError::new("date_format");
            err.message = Some("date must be formatted as YYYY-MM-DD".into());
            Err(err)
        }
    }
}

/// Validates that a penalty weight is finite and non-negative.
pub fn validate_non_negative(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must be a non-negative number".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Week 1").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            parse_time_of_day("09:00"),
            NaiveTime::from_hms_opt(9, 0, 0)
        );
        assert_eq!(
            parse_time_of_day("13:30:15"),
            NaiveTime::from_hms_opt(13, 30, 15)
        );
        assert!(parse_time_of_day("25:00").is_none());
        assert!(parse_time_of_day("9am").is_none());
    }

    #[test]
    fn test_validate_time_of_day_message() {
        let err = validate_time_of_day("noon").unwrap_err();
        assert_eq!(err.code, "time_format");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-01-06"), NaiveDate::from_ymd_opt(2025, 1, 6));
        assert!(parse_date("06/01/2025").is_none());
        assert!(parse_date("2025-02-30").is_none());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2025-09-01").is_ok());
        assert!(validate_date("").is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(0.0).is_ok());
        assert!(validate_non_negative(12.5).is_ok());
        assert!(validate_non_negative(-0.1).is_err());
        assert!(validate_non_negative(f64::NAN).is_err());
        assert!(validate_non_negative(f64::INFINITY).is_err());
    }
}
