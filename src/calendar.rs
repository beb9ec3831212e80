//! Working-day calendar arithmetic.
//!
//! Pure functions over `NaiveDate` — no shared state beyond the holiday set
//! passed in by the caller. Dates are date-only values, so there is no
//! time-of-day or timezone drift to normalise away.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// True if the date is neither a weekend day nor a registered holiday.
pub fn is_working_day(date: NaiveDate, holidays: &HashSet<NaiveDate>) -> bool {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => false,
        _ => !holidays.contains(&date),
    }
}

/// Shift a date by `n` calendar days (`n` may be negative). Ignores the
/// working-day calendar entirely.
pub fn add_calendar_days(date: NaiveDate, n: i64) -> NaiveDate {
    date + Duration::days(n)
}

/// Signed count of calendar days from `a` to `b` (`b - a`).
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Ordered, inclusive sequence of calendar dates from `start` to `end`.
/// Empty when `start > end`.
pub fn enumerate_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = start;
    while day <= end {
        days.push(day);
        day += Duration::days(1);
    }
    days
}

/// The date that is the `work_days`-th working day counting from `start`.
///
/// If `start` is a working day it counts as day 1; otherwise day 1 is the
/// first working day after it. `work_days` is rounded up to a whole day and
/// clamped to a minimum of 1, so the result is always itself a working day.
pub fn advance_working_days(
    start: NaiveDate,
    work_days: f64,
    holidays: &HashSet<NaiveDate>,
) -> NaiveDate {
    let mut remaining = work_days.ceil().max(1.0) as i64;
    let mut day = start;
    while !is_working_day(day, holidays) {
        day += Duration::days(1);
    }
    // `day` is now the first working day >= start and counts as day 1.
    while remaining > 1 {
        day += Duration::days(1);
        if is_working_day(day, holidays) {
            remaining -= 1;
        }
    }
    day
}

/// Number of working days in the inclusive range `[start, end]`.
/// Returns 0 when `start > end`.
pub fn count_working_days(start: NaiveDate, end: NaiveDate, holidays: &HashSet<NaiveDate>) -> i64 {
    let mut count = 0;
    let mut day = start;
    while day <= end {
        if is_working_day(day, holidays) {
            count += 1;
        }
        day += Duration::days(1);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_is_working_day() {
        let holidays: HashSet<NaiveDate> = [d(2025, 1, 1)].into_iter().collect();
        assert!(is_working_day(d(2024, 12, 30), &holidays)); // Monday
        assert!(!is_working_day(d(2024, 12, 28), &holidays)); // Saturday
        assert!(!is_working_day(d(2024, 12, 29), &holidays)); // Sunday
        assert!(!is_working_day(d(2025, 1, 1), &holidays)); // New Year
        assert!(is_working_day(d(2025, 1, 2), &holidays));
    }

    #[test]
    fn test_days_between_and_add() {
        assert_eq!(days_between(d(2025, 2, 1), d(2025, 2, 10)), 9);
        assert_eq!(days_between(d(2025, 2, 10), d(2025, 2, 1)), -9);
        assert_eq!(add_calendar_days(d(2024, 12, 30), 5), d(2025, 1, 4));
        assert_eq!(add_calendar_days(d(2025, 1, 1), -1), d(2024, 12, 31));
    }

    #[test]
    fn test_enumerate_days() {
        let days = enumerate_days(d(2025, 2, 27), d(2025, 3, 2));
        assert_eq!(
            days,
            vec![d(2025, 2, 27), d(2025, 2, 28), d(2025, 3, 1), d(2025, 3, 2)]
        );
        assert!(enumerate_days(d(2025, 3, 2), d(2025, 2, 27)).is_empty());
    }

    #[test]
    fn test_advance_skips_weekend_and_holiday() {
        // Mon 2024-12-30, Tue 12-31, Wed 1/1 is a holiday, so day 3 is Thu 1/2.
        let holidays: HashSet<NaiveDate> = [d(2025, 1, 1)].into_iter().collect();
        assert_eq!(
            advance_working_days(d(2024, 12, 30), 3.0, &holidays),
            d(2025, 1, 2)
        );
    }

    #[test]
    fn test_advance_from_non_working_start() {
        let holidays = HashSet::new();
        // Saturday start rolls forward to Monday, which counts as day 1.
        assert_eq!(
            advance_working_days(d(2025, 1, 4), 1.0, &holidays),
            d(2025, 1, 6)
        );
        assert_eq!(
            advance_working_days(d(2025, 1, 4), 2.0, &holidays),
            d(2025, 1, 7)
        );
    }

    #[test]
    fn test_advance_clamps_duration() {
        let holidays = HashSet::new();
        let start = d(2025, 1, 6); // Monday
        assert_eq!(advance_working_days(start, 0.0, &holidays), start);
        assert_eq!(advance_working_days(start, -3.0, &holidays), start);
        // Fractional durations round up.
        assert_eq!(advance_working_days(start, 1.5, &holidays), d(2025, 1, 7));
    }

    #[test]
    fn test_advance_monotonic_and_count_round_trip() {
        let holidays: HashSet<NaiveDate> =
            [d(2025, 1, 1), d(2025, 1, 6)].into_iter().collect();
        let start = d(2024, 12, 27); // Friday
        let mut prev = advance_working_days(start, 1.0, &holidays);
        for n in 1..=15 {
            let end = advance_working_days(start, n as f64, &holidays);
            assert!(end >= prev);
            prev = end;
            // First working day >= start, then the inclusive count matches n.
            let mut eff = start;
            while !is_working_day(eff, &holidays) {
                eff = add_calendar_days(eff, 1);
            }
            assert_eq!(count_working_days(eff, end, &holidays), n);
        }
    }

    #[test]
    fn test_holiday_on_weekend_not_double_counted() {
        // Sat 2025-01-04 registered as a holiday changes nothing.
        let with: HashSet<NaiveDate> = [d(2025, 1, 4)].into_iter().collect();
        let without = HashSet::new();
        assert_eq!(
            count_working_days(d(2025, 1, 1), d(2025, 1, 10), &with),
            count_working_days(d(2025, 1, 1), d(2025, 1, 10), &without)
        );
        assert_eq!(
            advance_working_days(d(2025, 1, 3), 2.0, &with),
            advance_working_days(d(2025, 1, 3), 2.0, &without)
        );
    }

    #[test]
    fn test_count_working_days_inverted_range() {
        let holidays = HashSet::new();
        assert_eq!(count_working_days(d(2025, 2, 10), d(2025, 2, 1), &holidays), 0);
    }
}
