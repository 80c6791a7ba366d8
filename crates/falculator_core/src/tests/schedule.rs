//! Calendar occurrence counting over half-open intervals.

use jiff::civil::date;

use crate::model::{AmountSchedule, Frequency, Weekday};

fn schedule(frequency: Frequency) -> AmountSchedule {
    AmountSchedule {
        frequency,
        ..AmountSchedule::default()
    }
}

#[test]
fn test_daily_counts_every_day() {
    let s = schedule(Frequency::Daily);
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2025, 1, 1)), 0);
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2025, 1, 2)), 1);
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2025, 2, 1)), 31);
    assert_eq!(s.occurrences(date(2024, 1, 1), date(2025, 1, 1)), 366);
}

#[test]
fn test_weekly_counts_matching_weekdays() {
    // 2025-01-06 is a Monday.
    let s = schedule(Frequency::Weekly);
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2025, 1, 5)), 0);
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2025, 1, 6)), 1);
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2025, 1, 31)), 4);
    // Half-open: a fire on the left edge is excluded, right edge included.
    assert_eq!(s.occurrences(date(2025, 1, 6), date(2025, 1, 13)), 1);
}

#[test]
fn test_weekly_respects_day_of_week() {
    let s = AmountSchedule {
        frequency: Frequency::Weekly,
        day_of_week: Some(Weekday::Friday),
        ..AmountSchedule::default()
    };
    // Fridays in January 2025: 3, 10, 17, 24, 31.
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2025, 1, 31)), 5);
    assert_eq!(s.occurrences(date(2025, 1, 3), date(2025, 1, 10)), 1);
}

#[test]
fn test_fortnightly_fires_every_second_week() {
    let s = schedule(Frequency::Fortnightly);
    // Four consecutive weeks contain exactly two anchored fires.
    let four_weeks = s.occurrences(date(2025, 1, 1), date(2025, 1, 29));
    assert_eq!(four_weeks, 2);
    // The anchor is global: shifting the window by one week cannot change
    // the fire spacing, only which weeks land inside.
    let shifted = s.occurrences(date(2025, 1, 8), date(2025, 2, 5));
    assert_eq!(shifted, 2);
}

#[test]
fn test_fortnightly_fires_are_fourteen_days_apart() {
    let s = schedule(Frequency::Fortnightly);
    // Walk a year day by day and collect fire dates.
    let mut fires = Vec::new();
    let mut prev = date(2025, 1, 1);
    for _ in 0..365 {
        let curr = crate::date_math::add_days(prev, 1);
        if s.occurrences(prev, curr) == 1 {
            fires.push(curr);
        }
        prev = curr;
    }
    assert_eq!(fires.len(), 26);
    for pair in fires.windows(2) {
        assert_eq!(crate::date_math::days_between(pair[0], pair[1]), 14);
    }
}

#[test]
fn test_monthly_day_31_means_last_day() {
    let s = AmountSchedule {
        frequency: Frequency::Monthly,
        day_of_month: Some(31),
        ..AmountSchedule::default()
    };
    // February fire lands on the 28th.
    assert_eq!(s.occurrences(date(2025, 2, 1), date(2025, 2, 27)), 0);
    assert_eq!(s.occurrences(date(2025, 2, 1), date(2025, 2, 28)), 1);
    // Leap February.
    assert_eq!(s.occurrences(date(2024, 2, 1), date(2024, 2, 29)), 1);
    // A full year has twelve month-end fires.
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2026, 1, 1)), 12);
}

#[test]
fn test_annual_fires_once_a_year() {
    let s = AmountSchedule {
        frequency: Frequency::Annual,
        day_of_month: Some(15),
        month_of_year: Some(6),
        ..AmountSchedule::default()
    };
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2025, 6, 14)), 0);
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2025, 6, 15)), 1);
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2030, 1, 1)), 5);
}

#[test]
fn test_trigger_limit_caps_occurrences() {
    let mut s = AmountSchedule {
        frequency: Frequency::Daily,
        trigger_limit: 5,
        ..AmountSchedule::default()
    };
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2025, 1, 31)), 5);
    s.record_fires(5);
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2025, 1, 31)), 0);
}

#[test]
fn test_trigger_limit_zero_is_unlimited() {
    let mut s = schedule(Frequency::Daily);
    s.record_fires(1_000);
    assert_eq!(s.occurrences(date(2025, 1, 1), date(2025, 1, 11)), 10);
}

#[test]
fn test_tick_dates_do_not_drift_at_month_end() {
    let start = date(2025, 1, 31);
    assert_eq!(Frequency::Monthly.date_at(start, 1), date(2025, 2, 28));
    // Computed from the start date, so March recovers the 31st.
    assert_eq!(Frequency::Monthly.date_at(start, 2), date(2025, 3, 31));
    assert_eq!(Frequency::Annual.date_at(date(2024, 2, 29), 1), date(2025, 2, 28));
}
