//! Calendar arithmetic for the scheduling engine.
//!
//! Schedule evaluation counts firing days over half-open date intervals on
//! every tick, so the helpers here work on Rata Die day numbers (days since
//! 0001-01-01, proleptic Gregorian) instead of repeatedly constructing
//! `jiff::Span` values. Day differences, weekday tests and fortnight
//! anchoring all reduce to integer arithmetic on the day number.

use jiff::civil::Date;

/// Fast leap year check.
#[inline]
pub fn is_leap_year(year: i16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Days in a month without constructing a `jiff::civil::Date`.
#[inline]
pub fn days_in_month(year: i16, month: i8) -> i8 {
    const DAYS: [i8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[(month - 1) as usize]
    }
}

/// Convert a civil date to a Rata Die day number (days since 0001-01-01).
///
/// Proleptic Gregorian algorithm from Baum (2017); O(1), no branches beyond
/// the month adjustment.
#[inline]
pub fn rata_die(d: Date) -> i32 {
    let y = d.year() as i32;
    let m = d.month() as i32;
    let day = d.day() as i32;

    // Shift March = month 1 so Feb (end of "year") is month 12
    let a = (14 - m) / 12;
    let y2 = y - a;
    let m2 = m + 12 * a - 3;

    day + (153 * m2 + 2) / 5 + 365 * y2 + y2 / 4 - y2 / 100 + y2 / 400 - 306
}

/// Convert a Rata Die day number back to a `jiff::civil::Date`.
#[inline]
fn rd_to_date(rd: i32) -> Date {
    // Shift so day 0 = March 1, year 0
    let z = rd + 306;
    let h = 100 * z - 25;
    let a = h / 3_652_425;
    let b = a - a / 4;
    let y = (100 * b + h) / 36_525;
    let c = b + z - 365 * y - y / 4;
    let m = (5 * c + 456) / 153;
    let day = c - (153 * m - 457) / 5;

    let (year, month) = if m > 12 { (y + 1, m - 12) } else { (y, m) };

    jiff::civil::date(year as i16, month as i8, day as i8)
}

/// Number of days between two dates (d2 - d1); positive when `d2 > d1`.
#[inline]
pub fn days_between(d1: Date, d2: Date) -> i32 {
    rata_die(d2) - rata_die(d1)
}

/// Add `n` days to a date.
#[inline]
pub fn add_days(d: Date, n: i32) -> Date {
    rd_to_date(rata_die(d) + n)
}

/// Weekday as a Monday-zero index (0 = Monday .. 6 = Sunday).
///
/// Rata Die day 1 (0001-01-01 proleptic Gregorian) is a Monday, so the
/// weekday falls out of the day number directly.
#[inline]
pub fn weekday_monday0(d: Date) -> i32 {
    (rata_die(d) - 1).rem_euclid(7)
}

/// Zero-based month counter since year 0 (year × 12 + month − 1).
///
/// Turns "each month in the interval" loops into plain integer ranges.
#[inline]
pub fn month_index(d: Date) -> i32 {
    d.year() as i32 * 12 + (d.month() as i32 - 1)
}

/// Inverse of [`month_index`].
#[inline]
pub fn ym_from_month_index(idx: i32) -> (i16, i8) {
    (idx.div_euclid(12) as i16, (idx.rem_euclid(12) + 1) as i8)
}

/// Add `n` calendar months, clamping the day to the destination month's
/// length (Jan 31 + 1 month = Feb 28/29).
#[inline]
pub fn add_months(d: Date, n: i32) -> Date {
    let idx = month_index(d) + n;
    let (year, month) = ym_from_month_index(idx);
    let day = d.day().min(days_in_month(year, month));
    jiff::civil::date(year, month, day)
}

/// Add `n` calendar years, clamping Feb 29 to Feb 28 off leap years.
#[inline]
pub fn add_years(d: Date, n: i32) -> Date {
    let year = (d.year() as i32 + n) as i16;
    let day = d.day().min(days_in_month(year, d.month()));
    jiff::civil::date(year, d.month(), day)
}

/// Whole years elapsed between two dates (simulation age).
///
/// `floor_years(birth, today)` is the conventional birthday-not-yet-reached
/// age calculation.
#[inline]
pub fn floor_years(from: Date, to: Date) -> i32 {
    let mut years = to.year() as i32 - from.year() as i32;
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}
