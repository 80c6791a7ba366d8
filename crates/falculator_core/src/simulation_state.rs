//! Runtime state shared by the tick loop.
//!
//! The validated config is split into an immutable plan (the item
//! definitions, timeline and tax policy) and mutable per-tick state (item
//! values and flows). Only the simulator mutates the state; frames project
//! it.

use jiff::civil::Date;
use rust_decimal::Decimal;

use crate::config::TaxMode;
use crate::date_math::floor_years;
use crate::model::{FinancialItem, Frequency, ItemType, PeerState};
use crate::money;

/// Withholding rules derived from the config's tax mode.
///
/// FlatTax withholds on savings interest and on item-level cash in. The
/// progressive mode is a stub and withholds nothing. Event transfers are
/// internal moves and are never withheld.
#[derive(Debug, Clone, Copy)]
pub struct TaxPolicy {
    pub mode: TaxMode,
    pub percent: Decimal,
}

impl TaxPolicy {
    fn withhold(&self, gross: Decimal) -> (Decimal, Decimal) {
        if self.mode != TaxMode::FlatTax || gross <= Decimal::ZERO {
            return (gross, Decimal::ZERO);
        }
        let tax = gross * money::rate_from_percent(self.percent);
        (gross - tax, tax)
    }

    /// Net/tax split for interest earned by an item. Only savings interest
    /// is taxable.
    pub fn withhold_interest(&self, gross: Decimal, item_type: ItemType) -> (Decimal, Decimal) {
        if item_type != ItemType::Savings {
            return (gross, Decimal::ZERO);
        }
        self.withhold(gross)
    }

    /// Net/tax split for a cash-in flow; applies to every item type.
    pub fn withhold_cash_in(&self, gross: Decimal) -> (Decimal, Decimal) {
        self.withhold(gross)
    }
}

/// Immutable clock parameters for one run.
#[derive(Debug, Clone, Copy)]
pub struct SimTimeline {
    pub start_date: Date,
    pub birth_date: Date,
    pub step: Frequency,
    /// Processing steps after the initial snapshot.
    pub total_steps: u32,
}

impl SimTimeline {
    /// Date of tick `index`; index 0 is the initial snapshot.
    pub fn date_at(&self, index: u32) -> Date {
        self.step.date_at(self.start_date, index)
    }

    /// Whole-year simulation age at `date`.
    pub fn age_at(&self, date: Date) -> Decimal {
        Decimal::from(floor_years(self.birth_date, date))
    }
}

/// Per-item running totals for the tick being processed. Reset every tick;
/// `cash_flow` is what the main-savings sweep collects.
#[derive(Debug, Clone, Default)]
pub struct ItemFlows {
    pub cash_in: Decimal,
    pub cash_out: Decimal,
    pub interest: Decimal,
    pub tax: Decimal,
    pub cash_flow: Decimal,
}

impl ItemFlows {
    pub fn reset(&mut self) {
        *self = ItemFlows::default();
    }
}

/// Simulation-wide values triggers can observe, computed from the state at
/// the start of the tick (i.e. the previous frame).
#[derive(Debug, Clone, Copy)]
pub struct Aggregates {
    pub age: Decimal,
    pub liquid_assets: Decimal,
    pub main_savings_balance: Decimal,
}

impl Aggregates {
    pub fn collect(items: &[FinancialItem], main_idx: usize, age: Decimal) -> Self {
        let liquid_assets: Decimal = items
            .iter()
            .filter(|i| i.is_liquid_asset && i.enabled_by_sim)
            .map(|i| i.value)
            .sum();
        Aggregates {
            age,
            liquid_assets,
            main_savings_balance: items[main_idx].value,
        }
    }
}

/// Snapshot the peer view tag predicates evaluate against. Taken before any
/// item is processed so predicates see the previous tick's enablement.
pub fn collect_peers(items: &[FinancialItem]) -> Vec<PeerState> {
    items
        .iter()
        .map(|i| PeerState {
            id: i.id.clone(),
            tags: i.tags.clone(),
            enabled_by_sim: i.enabled_by_sim,
        })
        .collect()
}
