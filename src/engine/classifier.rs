//! Pure expiry classification over calendar dates.

use chrono::NaiveDate;

use crate::models::{Classification, DocStatus};

/// Number of days before termination during which a document is flagged.
///
/// Fixed policy, not configuration.
pub const WARNING_WINDOW_DAYS: i64 = 90;

/// Parses an ISO `YYYY-MM-DD` calendar date. `None` when malformed.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Classifies a termination date against `today`.
///
/// An absent or unreadable date classifies as [`DocStatus::Invalid`]; this
/// function never fails. Both operands are calendar dates, so the day
/// difference is exact — there is no time-of-day or DST component to round
/// away. `days_remaining` goes negative once the date has passed.
pub fn classify(termination_date: Option<&str>, today: NaiveDate) -> Classification {
    let Some(termination) = termination_date.and_then(parse_iso_date) else {
        return Classification { status: DocStatus::Invalid, days_remaining: None };
    };

    let days_remaining = (termination - today).num_days();
    let status = if days_remaining < 0 {
        DocStatus::Expired
    } else if days_remaining <= WARNING_WINDOW_DAYS {
        DocStatus::Warning
    } else {
        DocStatus::OnTime
    };

    Classification { status, days_remaining: Some(days_remaining) }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn classify_at_offset(offset_days: i64) -> Classification {
        let today = day(2026, 3, 2);
        let termination = (today + Duration::days(offset_days)).format("%Y-%m-%d").to_string();
        classify(Some(&termination), today)
    }

    #[test]
    fn test_absent_and_malformed_dates_are_invalid() {
        let today = day(2026, 3, 2);
        for raw in [None, Some(""), Some("not-a-date"), Some("2026-13-40"), Some("02/03/2026")] {
            let result = classify(raw, today);
            assert_eq!(result.status, DocStatus::Invalid, "input {raw:?}");
            assert_eq!(result.days_remaining, None);
        }
    }

    #[test]
    fn test_days_remaining_is_none_iff_invalid() {
        assert!(classify_at_offset(10).days_remaining.is_some());
        assert!(classify_at_offset(-10).days_remaining.is_some());
        assert!(classify(None, day(2026, 3, 2)).days_remaining.is_none());
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(classify_at_offset(91).status, DocStatus::OnTime);
        assert_eq!(classify_at_offset(90).status, DocStatus::Warning);
        assert_eq!(classify_at_offset(1).status, DocStatus::Warning);
        assert_eq!(classify_at_offset(0).status, DocStatus::Warning);
        assert_eq!(classify_at_offset(-1).status, DocStatus::Expired);
    }

    #[test]
    fn test_days_remaining_is_signed() {
        assert_eq!(classify_at_offset(5).days_remaining, Some(5));
        assert_eq!(classify_at_offset(-12).days_remaining, Some(-12));
    }

    #[test]
    fn test_monotonic_as_today_advances() {
        let termination = "2026-06-01";
        let mut today = day(2026, 2, 1);
        let mut previous = classify(Some(termination), today).days_remaining.unwrap();

        for _ in 0..200 {
            today += Duration::days(1);
            let current = classify(Some(termination), today).days_remaining.unwrap();
            assert_eq!(current, previous - 1);
            previous = current;
        }
    }

    #[test]
    fn test_leap_day_arithmetic_is_exact() {
        // 2028 is a leap year; the window spans February 29th.
        let today = day(2028, 2, 1);
        let result = classify(Some("2028-03-01"), today);
        assert_eq!(result.days_remaining, Some(29));
        assert_eq!(result.status, DocStatus::Warning);
    }
}
