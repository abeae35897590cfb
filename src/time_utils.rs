// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Calendar day of an ISO-8601 timestamp, dropping the time of day.
///
/// Polar reports local start times without an offset
/// (`2024-05-01T08:00:00`), so the date part is taken as written.
pub fn truncate_to_day(timestamp: &str) -> Option<NaiveDate> {
    let day = timestamp.split('T').next()?;
    NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d").ok()
}

/// ISO week key, e.g. `2024-W01`. Uses the ISO week-numbering year, so
/// 2024-12-30 belongs to `2025-W01`.
pub fn week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_day() {
        assert_eq!(
            truncate_to_day("2024-05-01T08:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(
            truncate_to_day("2024-05-01"),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(truncate_to_day("yesterday"), None);
        assert_eq!(truncate_to_day(""), None);
    }

    #[test]
    fn test_week_key() {
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(week_key(day(2024, 1, 1)), "2024-W01");
        assert_eq!(week_key(day(2024, 1, 7)), "2024-W01");
        assert_eq!(week_key(day(2024, 1, 8)), "2024-W02");
        assert_eq!(week_key(day(2024, 12, 30)), "2025-W01");
        assert_eq!(week_key(day(2021, 1, 3)), "2020-W53");
    }

    #[test]
    fn test_format_utc_rfc3339_uses_z() {
        let ts = DateTime::parse_from_rfc3339("2024-05-01T08:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_utc_rfc3339(ts), "2024-05-01T08:00:00.000Z");
    }
}
