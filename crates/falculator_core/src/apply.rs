//! Per-tick item processing and event application.
//!
//! Everything here mutates item values and tick flows under the simulator's
//! fixed ordering: interest, own cash flows, then the item's events in
//! declaration order. Schedules only get their fires recorded when the
//! payment they gate actually moved something.

use jiff::civil::Date;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::model::{
    FinancialItem, ItemType, PeerState, SimEvent, TargetStateAction, TriggerContext,
};
use crate::simulation_state::{Aggregates, ItemFlows, TaxPolicy};

/// Apply interest for the interval to the item.
///
/// Shares grow through their unit price and resync `value`; every other
/// type compounds `value` directly. Savings interest is taxed at source.
pub(crate) fn accrue_interest(
    item: &mut FinancialItem,
    flows: &mut ItemFlows,
    prev: Date,
    curr: Date,
    tax: &TaxPolicy,
) {
    if item.item_type == ItemType::Shares {
        let Some(price) = item.share_details.as_ref().map(|d| d.unit_price) else {
            return;
        };
        let delta = item.interest.compute(prev, curr, price, None);
        if delta.fires == 0 || delta.is_zero() {
            return;
        }
        let before = item.value;
        if let Some(details) = item.share_details.as_mut() {
            details.unit_price += delta.amount;
        }
        item.interest.schedule.record_fires(delta.fires);
        item.sync_share_value();
        flows.interest += item.value - before;
        return;
    }

    let delta = item.interest.compute(prev, curr, item.value, None);
    if delta.fires == 0 || delta.is_zero() {
        return;
    }
    let (net, withheld) = tax.withhold_interest(delta.amount, item.item_type);
    item.value += net;
    flows.interest += delta.amount;
    flows.tax += withheld;
    item.interest.schedule.record_fires(delta.fires);
}

/// Apply the item's own cash-in and cash-out flows.
///
/// Flows accumulate into `cash_flow` for the end-of-tick sweep and do not
/// touch the item's value — except a loan's cash out, which pays principal
/// and snaps to zero rather than crossing it.
pub(crate) fn process_own_cash_flows(
    item: &mut FinancialItem,
    flows: &mut ItemFlows,
    prev: Date,
    curr: Date,
    tax: &TaxPolicy,
) {
    let cash_in = item.cash_in.compute(prev, curr, item.value, None);
    if cash_in.fires > 0 && !cash_in.is_zero() {
        let (net, withheld) = tax.withhold_cash_in(cash_in.amount);
        flows.cash_in += cash_in.amount;
        flows.tax += withheld;
        flows.cash_flow += net;
        item.cash_in.schedule.record_fires(cash_in.fires);
    }

    let cash_out = item.cash_out.compute(prev, curr, item.value, None);
    if cash_out.fires > 0 && !cash_out.is_zero() {
        let mut amount = cash_out.amount;
        if item.item_type == ItemType::Loan {
            if item.value + amount > Decimal::ZERO {
                amount = -item.value;
            }
            item.value += amount;
        }
        if amount.is_zero() {
            return;
        }
        flows.cash_out += amount;
        flows.cash_flow -= amount;
        item.cash_out.schedule.record_fires(cash_out.fires);
    }
}

/// Run the item's event list, in declaration order.
pub(crate) fn process_item_events(
    items: &mut [FinancialItem],
    flows: &mut [ItemFlows],
    source_idx: usize,
    peers: &[PeerState],
    aggs: &Aggregates,
    prev: Date,
    curr: Date,
    frame_events: &mut Vec<SimEvent>,
) {
    let owner_id = items[source_idx].id.clone();
    // Take the event list so the borrow checker lets events read and write
    // arbitrary items while we iterate.
    let mut events = std::mem::take(&mut items[source_idx].events);

    for event in events.iter_mut() {
        if !event.enabled {
            continue;
        }
        let Some(target_idx) = items.iter().position(|i| i.id == event.target_id) else {
            continue;
        };
        if target_idx == source_idx {
            continue;
        }

        let target_value = items[target_idx].value;
        let ctx = TriggerContext {
            peers,
            owner_id: &owner_id,
            sim_date: curr,
            age: aggs.age,
            liquid_assets: aggs.liquid_assets,
            main_savings_balance: aggs.main_savings_balance,
            target_value: Some(target_value),
        };
        // An event without configured conditions is gated only by its
        // payment schedules.
        let fired = if event.triggers.has_any_conditions(true) {
            event.triggers.evaluate(&ctx)
        } else {
            true
        };
        if !fired {
            continue;
        }

        if !event.liquidate {
            if event.cash_out.enabled {
                let source_value = items[source_idx].value;
                let delta = event
                    .cash_out
                    .compute(prev, curr, source_value, Some(items[target_idx].value));
                if delta.fires > 0
                    && !delta.is_zero()
                    && apply_push(
                        items,
                        flows,
                        source_idx,
                        target_idx,
                        &event.id,
                        delta.amount,
                        frame_events,
                    )
                {
                    event.cash_out.schedule.record_fires(delta.fires);
                }
            }
            if event.cash_in.enabled {
                let source_value = items[source_idx].value;
                let delta = event
                    .cash_in
                    .compute(prev, curr, source_value, Some(items[target_idx].value));
                if delta.fires > 0
                    && !delta.is_zero()
                    && apply_pull(
                        items,
                        flows,
                        source_idx,
                        target_idx,
                        &event.id,
                        delta.amount,
                        frame_events,
                    )
                {
                    event.cash_in.schedule.record_fires(delta.fires);
                }
            }
        }

        if event.set_state_on_trigger {
            let target = &mut items[target_idx];
            let enabled = match event.target_state_action {
                TargetStateAction::Enable => true,
                TargetStateAction::Disable => false,
                TargetStateAction::Toggle => !target.enabled_by_sim,
            };
            target.enabled_by_sim = enabled;
            tracing::debug!(
                event = %event.name,
                target = %target.name,
                enabled,
                "event changed target state"
            );
            frame_events.push(SimEvent::StateChanged {
                event_id: event.id.clone(),
                target_id: target.id.clone(),
                action: event.target_state_action,
                enabled,
            });
        }

        if event.liquidate {
            liquidate(items, flows, target_idx, frame_events);
        }
    }

    items[source_idx].events = events;
}

/// Push cash from the source toward the target. Returns whether anything
/// moved.
fn apply_push(
    items: &mut [FinancialItem],
    flows: &mut [ItemFlows],
    source_idx: usize,
    target_idx: usize,
    event_id: &str,
    amount: Decimal,
    frame_events: &mut Vec<SimEvent>,
) -> bool {
    let source_id = items[source_idx].id.clone();
    let target = &mut items[target_idx];

    if target.item_type.is_debt_target() {
        // Overpayment cap: never cross zero, land exactly on it.
        let mut applied = amount;
        if target.value + applied > Decimal::ZERO {
            applied = -target.value;
        }
        if applied.is_zero() {
            return false;
        }
        target.value += applied;
        let target_id = target.id.clone();
        flows[source_idx].cash_flow -= applied;
        frame_events.push(SimEvent::CashPush {
            event_id: event_id.to_string(),
            source_id,
            target_id,
            amount: applied,
        });
        return true;
    }

    if target.item_type == ItemType::Shares {
        let price = target
            .share_details
            .as_ref()
            .map(|d| d.unit_price)
            .unwrap_or_default();
        if price <= Decimal::ZERO {
            return false;
        }
        let Some(units) = (amount / price).floor().to_u64() else {
            return false;
        };
        if units == 0 {
            return false;
        }
        let cost = Decimal::from(units) * price;
        if let Some(details) = target.share_details.as_mut() {
            details.unit_count += units;
            details.total_cost_base += cost;
        }
        target.sync_share_value();
        let target_id = target.id.clone();
        // The leftover below one unit is never transferred.
        flows[source_idx].cash_flow -= cost;
        frame_events.push(SimEvent::SharesBought {
            event_id: event_id.to_string(),
            source_id,
            target_id,
            units,
            cost,
            leftover: amount - cost,
        });
        return true;
    }

    // Plain transfer: both sides realize against main savings in the sweep.
    let target_id = target.id.clone();
    flows[source_idx].cash_flow -= amount;
    flows[target_idx].cash_flow += amount;
    frame_events.push(SimEvent::CashPush {
        event_id: event_id.to_string(),
        source_id,
        target_id,
        amount,
    });
    true
}

/// Pull cash from the target into the source. Returns whether anything
/// moved.
fn apply_pull(
    items: &mut [FinancialItem],
    flows: &mut [ItemFlows],
    source_idx: usize,
    target_idx: usize,
    event_id: &str,
    amount: Decimal,
    frame_events: &mut Vec<SimEvent>,
) -> bool {
    let source_id = items[source_idx].id.clone();
    let target = &mut items[target_idx];

    if target.item_type.is_debt_target() {
        // Drawing against a debt grows it.
        target.value -= amount;
        let target_id = target.id.clone();
        flows[source_idx].cash_flow += amount;
        frame_events.push(SimEvent::CashPull {
            event_id: event_id.to_string(),
            source_id,
            target_id,
            amount,
        });
        return true;
    }

    if target.item_type == ItemType::Shares {
        let (price, held) = match target.share_details.as_ref() {
            Some(d) => (d.unit_price, d.unit_count),
            None => return false,
        };
        if price <= Decimal::ZERO {
            return false;
        }
        let Some(wanted) = (amount / price).ceil().to_u64() else {
            return false;
        };
        let units = wanted.min(held);
        if units == 0 {
            return false;
        }
        let proceeds = Decimal::from(units) * price;
        if let Some(details) = target.share_details.as_mut() {
            details.unit_count -= units;
        }
        target.sync_share_value();
        let target_id = target.id.clone();
        flows[source_idx].cash_flow += proceeds;
        frame_events.push(SimEvent::SharesSold {
            event_id: event_id.to_string(),
            source_id,
            target_id,
            units,
            proceeds,
        });
        return true;
    }

    let target_id = target.id.clone();
    flows[target_idx].cash_flow -= amount;
    flows[source_idx].cash_flow += amount;
    frame_events.push(SimEvent::CashPull {
        event_id: event_id.to_string(),
        source_id,
        target_id,
        amount,
    });
    true
}

/// Move the item's entire value to main savings and disable it.
pub(crate) fn liquidate(
    items: &mut [FinancialItem],
    flows: &mut [ItemFlows],
    idx: usize,
    frame_events: &mut Vec<SimEvent>,
) {
    let item = &mut items[idx];
    let amount = item.value;
    if let Some(details) = item.share_details.as_mut() {
        details.unit_count = 0;
    }
    item.value = Decimal::ZERO;
    item.enabled_by_sim = false;
    flows[idx].cash_flow += amount;
    tracing::info!(item = %item.name, %amount, "liquidated");
    frame_events.push(SimEvent::Liquidated {
        target_id: item.id.clone(),
        amount,
    });
}
