//! Integration tests for the simulation engine.
//!
//! Tests are organized by topic:
//! - `schedule` - calendar occurrence counting
//! - `amounts` - fixed and percentage flow deltas
//! - `triggers` - value triggers, tag predicates, composites
//! - `sanitize` - normalization pipeline and its invariants
//! - `simulation` - tick mechanics, sweep, determinism
//! - `scenarios` - end-to-end portfolio scenarios
//! - `wire` - persisted-format compatibility

mod scenarios;
mod schedule;
mod wire;

use jiff::civil::Date;
use rust_decimal::Decimal;

use crate::config::Config;
use crate::model::{AmountFreq, FinancialItem, Frequency, ItemType, ShareDetails};

pub(crate) fn start() -> Date {
    jiff::civil::date(2025, 1, 1)
}

pub(crate) fn item(name: &str, item_type: ItemType, value: Decimal) -> FinancialItem {
    FinancialItem {
        name: name.to_string(),
        item_type,
        value,
        ..FinancialItem::default()
    }
}

pub(crate) fn main_savings(value: Decimal) -> FinancialItem {
    FinancialItem {
        is_main_savings: true,
        is_liquid_asset: true,
        ..item("Main Savings", ItemType::Savings, value)
    }
}

pub(crate) fn shares(name: &str, unit_count: u64, unit_price: Decimal) -> FinancialItem {
    FinancialItem {
        share_details: Some(ShareDetails {
            unit_count,
            unit_price,
            total_cost_base: Decimal::ZERO,
        }),
        ..item(name, ItemType::Shares, Decimal::ZERO)
    }
}

/// Monthly config starting 2025-01-01 with the given items.
pub(crate) fn monthly_config(years: u32, items: Vec<FinancialItem>) -> Config {
    Config {
        sim_name: "test".to_string(),
        birth_date: jiff::civil::date(1980, 6, 15),
        start_date: start(),
        years_to_sim: years,
        step_increment: Frequency::Monthly,
        items,
        ..Config::default()
    }
}

/// Fixed monthly flow firing on the 1st.
pub(crate) fn monthly_amount(amount: Decimal) -> AmountFreq {
    AmountFreq::fixed(amount, Frequency::Monthly)
}
