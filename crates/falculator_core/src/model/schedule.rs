//! Payment calendars.
//!
//! An [`AmountSchedule`] is a calendar predicate: given a half-open interval
//! `(prev, curr]` it answers how many times the schedule fires inside it.
//! Schedules never mutate their own `trigger_count`; the caller records
//! fires once the payment they gate actually produced an effect.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::{
    add_days, add_months, add_years, days_between, days_in_month, month_index, rata_die,
    ym_from_month_index,
};
use crate::model::wire::wire_enum;
use crate::sanitize::SanitizeReport;

wire_enum! {
    /// Tick and payment cadence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Frequency {
        Daily = 0,
        Weekly = 1,
        Fortnightly = 2,
        Monthly = 3,
        Annual = 4,
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Monthly
    }
}

impl Frequency {
    /// Simulation steps per year when used as the tick increment.
    pub fn steps_per_year(self) -> u32 {
        match self {
            Frequency::Daily => 365,
            Frequency::Weekly => 52,
            Frequency::Fortnightly => 26,
            Frequency::Monthly => 12,
            Frequency::Annual => 1,
        }
    }

    /// Date of tick `index` counted from `start`.
    ///
    /// Always computed from `start` rather than the previous tick, so
    /// month-end clamping never drifts (Jan 31 → Feb 28 → Mar 31).
    pub fn date_at(self, start: Date, index: u32) -> Date {
        let index = index as i32;
        match self {
            Frequency::Daily => add_days(start, index),
            Frequency::Weekly => add_days(start, 7 * index),
            Frequency::Fortnightly => add_days(start, 14 * index),
            Frequency::Monthly => add_months(start, index),
            Frequency::Annual => add_years(start, index),
        }
    }
}

wire_enum! {
    /// Day-of-week anchor for weekly and fortnightly schedules.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Weekday {
        Monday = 0,
        Tuesday = 1,
        Wednesday = 2,
        Thursday = 3,
        Friday = 4,
        Saturday = 5,
        Sunday = 6,
    }
}

impl Weekday {
    #[inline]
    fn monday0(self) -> i32 {
        self.legacy_code() as i32
    }
}

/// A recurring-payment calendar with trigger-limit accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountSchedule {
    #[serde(default)]
    pub frequency: Frequency,
    /// Weekly/Fortnightly anchor; Monday when absent.
    #[serde(default)]
    pub day_of_week: Option<Weekday>,
    /// Monthly/Annual firing day; clamped to the month length, so 31 means
    /// "last day of the month".
    #[serde(default)]
    pub day_of_month: Option<u8>,
    /// Annual firing month.
    #[serde(default)]
    pub month_of_year: Option<u8>,
    /// Maximum lifetime fires; 0 means unlimited.
    #[serde(default)]
    pub trigger_limit: u32,
    /// Fires recorded so far.
    #[serde(default)]
    pub trigger_count: u32,
}

impl Default for AmountSchedule {
    fn default() -> Self {
        Self {
            frequency: Frequency::Monthly,
            day_of_week: None,
            day_of_month: None,
            month_of_year: None,
            trigger_limit: 0,
            trigger_count: 0,
        }
    }
}

impl AmountSchedule {
    /// Monthly on the last day of the month, no limit — the shape forced on
    /// credit-card interest and on annual-rate-monthly-compounding flows.
    pub fn monthly_eom() -> Self {
        Self {
            frequency: Frequency::Monthly,
            day_of_month: Some(31),
            ..Self::default()
        }
    }

    /// Number of fires in the half-open interval `(prev, curr]`, capped by
    /// the remaining trigger budget.
    pub fn occurrences(&self, prev: Date, curr: Date) -> u32 {
        debug_assert!(prev <= curr);
        let raw = match self.frequency {
            Frequency::Daily => days_between(prev, curr).max(0) as u32,
            Frequency::Weekly => self.count_weekday_hits(prev, curr, 7),
            Frequency::Fortnightly => self.count_weekday_hits(prev, curr, 14),
            Frequency::Monthly => self.count_monthly_hits(prev, curr),
            Frequency::Annual => self.count_annual_hits(prev, curr),
        };
        if self.trigger_limit == 0 {
            raw
        } else {
            raw.min(self.trigger_limit.saturating_sub(self.trigger_count))
        }
    }

    /// Record `n` fires against the trigger budget. Called by the owner of
    /// the gated payment, never by the schedule itself.
    pub fn record_fires(&mut self, n: u32) {
        self.trigger_count = self.trigger_count.saturating_add(n);
    }

    /// Weekly (`period` 7) and fortnightly (`period` 14) hit counting.
    ///
    /// Matching days satisfy `rata_die ≡ anchor (mod period)` where the
    /// anchor row starts at the first proleptic Monday (Rata Die day 1);
    /// fortnights therefore share one global week-parity anchor rather than
    /// drifting per item.
    fn count_weekday_hits(&self, prev: Date, curr: Date, period: i32) -> u32 {
        let dow = self.day_of_week.unwrap_or(Weekday::Monday).monday0();
        let anchor = 1 + dow;
        let hits_to = |d: Date| (rata_die(d) - anchor).div_euclid(period);
        (hits_to(curr) - hits_to(prev)).max(0) as u32
    }

    fn count_monthly_hits(&self, prev: Date, curr: Date) -> u32 {
        let dom = (self.day_of_month.unwrap_or(1) as i8).max(1);
        let mut hits = 0;
        for idx in month_index(prev)..=month_index(curr) {
            let (year, month) = ym_from_month_index(idx);
            let day = dom.min(days_in_month(year, month));
            let fire = jiff::civil::date(year, month, day);
            if fire > prev && fire <= curr {
                hits += 1;
            }
        }
        hits
    }

    fn count_annual_hits(&self, prev: Date, curr: Date) -> u32 {
        let month = (self.month_of_year.unwrap_or(1) as i8).clamp(1, 12);
        let dom = (self.day_of_month.unwrap_or(1) as i8).max(1);
        let mut hits = 0;
        for year in prev.year()..=curr.year() {
            let day = dom.min(days_in_month(year, month));
            let fire = jiff::civil::date(year, month, day);
            if fire > prev && fire <= curr {
                hits += 1;
            }
        }
        hits
    }

    /// Clamp and default the calendar fields.
    pub fn sanitize(&mut self, context: &str, report: &mut SanitizeReport) {
        if let Some(dom) = self.day_of_month {
            if !(1..=31).contains(&dom) {
                let clamped = dom.clamp(1, 31);
                report.warn(
                    context,
                    format!("day_of_month {dom} out of range, clamped to {clamped}"),
                );
                self.day_of_month = Some(clamped);
            }
        }
        if let Some(month) = self.month_of_year {
            if !(1..=12).contains(&month) {
                let clamped = month.clamp(1, 12);
                report.warn(
                    context,
                    format!("month_of_year {month} out of range, clamped to {clamped}"),
                );
                self.month_of_year = Some(clamped);
            }
        }
        match self.frequency {
            Frequency::Monthly if self.day_of_month.is_none() => {
                tracing::debug!(context, "monthly schedule without day_of_month, defaulting to 1");
                self.day_of_month = Some(1);
            }
            Frequency::Annual => {
                if self.month_of_year.is_none() {
                    tracing::debug!(
                        context,
                        "annual schedule without month_of_year, defaulting to January"
                    );
                    self.month_of_year = Some(1);
                }
                if self.day_of_month.is_none() {
                    self.day_of_month = Some(1);
                }
            }
            _ => {}
        }
    }
}
