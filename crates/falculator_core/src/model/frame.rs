//! Per-tick snapshots.
//!
//! A [`SimFrame`] captures every item's runtime state at one instant plus
//! the events that fired during the tick. Frames are immutable once
//! emitted; the export layers consume them as-is.

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::events::TargetStateAction;

/// One item's state inside a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    pub id: String,
    pub value: Decimal,
    pub cash_in_amount: Decimal,
    pub cash_out_amount: Decimal,
    pub interest_amount: Decimal,
    /// Net flow swept into main savings at the end of the tick.
    pub cash_flow: Decimal,
    pub enabled_by_sim: bool,
    /// Tax withheld from this item during the tick.
    pub tax_paid: Decimal,
}

/// Something that happened during a tick, in the order it was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Cash pushed from a source item toward a target.
    CashPush {
        event_id: String,
        source_id: String,
        target_id: String,
        amount: Decimal,
    },
    /// Cash pulled from a target into a source item.
    CashPull {
        event_id: String,
        source_id: String,
        target_id: String,
        amount: Decimal,
    },
    /// Units bought with pushed cash; the leftover stays with the source.
    SharesBought {
        event_id: String,
        source_id: String,
        target_id: String,
        units: u64,
        cost: Decimal,
        leftover: Decimal,
    },
    /// Units sold to satisfy a pull.
    SharesSold {
        event_id: String,
        source_id: String,
        target_id: String,
        units: u64,
        proceeds: Decimal,
    },
    /// The target's enablement was changed by an event.
    StateChanged {
        event_id: String,
        target_id: String,
        action: TargetStateAction,
        enabled: bool,
    },
    /// The target's entire value was moved to main savings.
    Liquidated {
        target_id: String,
        amount: Decimal,
    },
    /// Terminal record: main savings went negative with fail-on-overdraw
    /// set.
    Overdraw {
        balance: Decimal,
    },
}

/// Immutable snapshot of the whole simulation at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimFrame {
    pub frame_date: Date,
    pub items: Vec<ItemState>,
    /// Tax withheld since the start of the run, inclusive of this tick.
    pub total_tax_paid: Decimal,
    pub events: Vec<SimEvent>,
}
