//! Recurring monetary deltas.
//!
//! An [`AmountFreq`] pairs an amount (fixed or percentage) with an
//! [`AmountSchedule`] and computes the signed delta it produces over a tick
//! interval.

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::schedule::{AmountSchedule, Frequency};
use crate::model::wire::wire_enum;
use crate::money;
use crate::sanitize::SanitizeReport;

wire_enum! {
    /// Which balance a percentage amount is taken of.
    ///
    /// `Destination` is only meaningful on event flows, where a transfer has
    /// two endpoints; item-level flows are restricted to `Source`/`Self` by
    /// sanitize.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PercentageBasis {
        Source = 0,
        Destination = 1,
        SelfValue as "Self" = 2,
    }
}

impl Default for PercentageBasis {
    fn default() -> Self {
        PercentageBasis::Source
    }
}

/// Outcome of evaluating an [`AmountFreq`] over an interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowDelta {
    pub amount: Decimal,
    pub fires: u32,
}

impl FlowDelta {
    pub const ZERO: FlowDelta = FlowDelta {
        amount: Decimal::ZERO,
        fires: 0,
    };

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

/// A payment or interest specification: amount, percentage semantics, and
/// the calendar it fires on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountFreq {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub is_percentage: bool,
    #[serde(default)]
    pub percentage_basis: PercentageBasis,
    /// The amount is an annual percentage rate applied with monthly
    /// compounding: each fire grows the basis by `(1+r/100)^(1/12) − 1`.
    #[serde(default)]
    pub annual_rate_monthly_compounding: bool,
    #[serde(default)]
    pub schedule: AmountSchedule,
}

impl Default for AmountFreq {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: Decimal::ZERO,
            is_percentage: false,
            percentage_basis: PercentageBasis::Source,
            annual_rate_monthly_compounding: false,
            schedule: AmountSchedule::default(),
        }
    }
}

impl AmountFreq {
    /// A fixed amount on the given cadence, enabled.
    pub fn fixed(amount: Decimal, frequency: Frequency) -> Self {
        Self {
            enabled: true,
            amount,
            schedule: AmountSchedule {
                frequency,
                ..AmountSchedule::default()
            },
            ..Self::default()
        }
    }

    /// An annual percentage rate compounded monthly, enabled. The schedule
    /// shape is forced to monthly/end-of-month per the compounding contract.
    pub fn annual_rate_monthly(percent: Decimal) -> Self {
        Self {
            enabled: true,
            amount: percent,
            is_percentage: true,
            annual_rate_monthly_compounding: true,
            schedule: AmountSchedule::monthly_eom(),
            ..Self::default()
        }
    }

    /// Signed delta produced over `(prev, curr]`.
    ///
    /// `dest_value` is the transfer destination's balance, supplied only in
    /// event context; a `Destination` basis without it falls back to the
    /// source balance.
    pub fn compute(
        &self,
        prev: Date,
        curr: Date,
        source_value: Decimal,
        dest_value: Option<Decimal>,
    ) -> FlowDelta {
        if !self.enabled || self.amount.is_zero() {
            return FlowDelta::ZERO;
        }
        let fires = self.schedule.occurrences(prev, curr);
        if fires == 0 {
            return FlowDelta::ZERO;
        }

        let amount = if !self.is_percentage {
            self.amount * Decimal::from(fires)
        } else {
            let basis = match (self.percentage_basis, dest_value) {
                (PercentageBasis::Destination, Some(value)) => value,
                _ => source_value,
            };
            let growth = if self.annual_rate_monthly_compounding {
                money::annual_rate_monthly_growth(self.amount, fires)
            } else {
                money::compound_growth(self.amount, fires)
            };
            basis * growth
        };

        FlowDelta { amount, fires }
    }

    /// Enforce the annual-rate-monthly-compounding shape and sanitize the
    /// embedded schedule.
    pub fn sanitize(&mut self, context: &str, report: &mut SanitizeReport) {
        if self.annual_rate_monthly_compounding {
            if !self.is_percentage {
                report.warn(
                    context,
                    "annual-rate-monthly-compounding flow must be a percentage, forcing",
                );
                self.is_percentage = true;
            }
            if self.schedule.frequency != Frequency::Monthly
                || self.schedule.day_of_month != Some(31)
                || self.schedule.month_of_year.is_some()
            {
                report.warn(
                    context,
                    "annual-rate-monthly-compounding flow requires a monthly end-of-month \
                     schedule, resetting",
                );
                let limit = self.schedule.trigger_limit;
                let count = self.schedule.trigger_count;
                self.schedule = AmountSchedule {
                    trigger_limit: limit,
                    trigger_count: count,
                    ..AmountSchedule::monthly_eom()
                };
            }
        }
        self.schedule.sanitize(context, report);
    }
}
