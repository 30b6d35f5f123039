//! Shape predicates for dynamic values captured from the network
//!
//! The backend emits dates either as RFC 3339 timestamps or as plain ISO
//! dates depending on the endpoint, so the date check accepts both.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// True when `value` parses as a calendar date or date-time
pub fn is_valid_date(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// True for monetary amounts the UI can render: finite and not negative
pub fn is_renderable_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_dates() {
        assert!(is_valid_date("2024-03-01"));
        assert!(is_valid_date("2024-03-01T10:30:00"));
        assert!(is_valid_date("2024-03-01T10:30:00+01:00"));
        assert!(is_valid_date("2024-03-01T10:30:00Z"));
    }

    #[test]
    fn test_invalid_dates() {
        assert!(!is_valid_date(""));
        assert!(!is_valid_date("not a date"));
        assert!(!is_valid_date("01/03/2024"));
        assert!(!is_valid_date("2024-13-01"));
    }

    #[test]
    fn test_renderable_amounts() {
        assert!(is_renderable_amount(0.0));
        assert!(is_renderable_amount(120.5));
        assert!(!is_renderable_amount(-1.0));
        assert!(!is_renderable_amount(f64::NAN));
        assert!(!is_renderable_amount(f64::INFINITY));
    }
}
