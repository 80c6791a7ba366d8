//! The tick driver.
//!
//! [`Simulator::new`] sanitizes the config, refuses fatal reports, seeds
//! runtime state and emits the initial snapshot. Each [`Simulator::tick`]
//! then processes one interval: items in ascending eval order (self trigger,
//! interest, own cash flows, events), the main-savings sweep, the overdraw
//! check, and a new [`SimFrame`].
//!
//! The core is single-threaded and strictly sequential per config; a tick
//! is atomic from the observer's perspective. Cancellation is cooperative
//! and only observed between ticks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use jiff::civil::Date;
use rust_decimal::Decimal;

use crate::apply;
use crate::config::Config;
use crate::error::{Result, SimError};
use crate::model::{ItemState, SimEvent, SimFrame, TriggerContext};
use crate::simulation_state::{Aggregates, ItemFlows, SimTimeline, TaxPolicy, collect_peers};

/// Clonable cooperative cancellation flag, checked between ticks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Running,
    Completed,
    Cancelled,
    Overdrawn,
}

/// Drives one simulation over a sanitized config.
pub struct Simulator {
    items: Vec<crate::model::FinancialItem>,
    /// Item indices in ascending eval order.
    order: Vec<usize>,
    main_idx: usize,
    timeline: SimTimeline,
    tax: TaxPolicy,
    fail_on_overdraw: bool,
    sim_name: String,

    flows: Vec<ItemFlows>,
    frames: Vec<SimFrame>,
    total_tax: Decimal,
    /// Next step to process; the initial snapshot is step 0.
    step_index: u32,
    stop: StopReason,
    cancel: CancelToken,
}

impl Simulator {
    /// Sanitize the config and build the initial frame.
    ///
    /// Fails when sanitize reports fatal findings (multiple main savings,
    /// zero-price shares wired into transfers).
    pub fn new(mut config: Config) -> Result<Self> {
        let report = config.sanitize();
        if report.is_fatal() {
            return Err(SimError::SanitizeFatal { report });
        }
        let main_idx = config.main_savings_idx.ok_or(SimError::NoMainSavings)?;

        let timeline = SimTimeline {
            start_date: config.start_date,
            birth_date: config.birth_date,
            step: config.step_increment,
            total_steps: config.years_to_sim * config.step_increment.steps_per_year(),
        };
        let tax = TaxPolicy {
            mode: config.tax_mode,
            percent: config.tax_percent,
        };

        let mut items = config.items;
        // Seed runtime enablement for the first frame; triggers are the
        // only mutator afterwards.
        for item in &mut items {
            item.enabled_by_sim = item.start_enabled && !item.disabled_by_user;
            item.sync_share_value();
        }

        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by_key(|&i| items[i].eval_order);

        let flows = vec![ItemFlows::default(); items.len()];

        let mut sim = Simulator {
            items,
            order,
            main_idx,
            timeline,
            tax,
            fail_on_overdraw: config.fail_on_overdraw,
            sim_name: config.sim_name,
            flows,
            frames: Vec::with_capacity(timeline.total_steps as usize + 1),
            total_tax: Decimal::ZERO,
            step_index: 0,
            stop: StopReason::Running,
            cancel: CancelToken::new(),
        };

        tracing::info!(
            sim = %sim.sim_name,
            steps = sim.timeline.total_steps,
            start = %sim.timeline.start_date,
            "simulation initialized"
        );
        sim.snapshot(sim.timeline.start_date, Vec::new());
        sim.step_index = 1;
        Ok(sim)
    }

    /// Process the next step and return its frame, or `None` when the run
    /// has ended (natural end, cancellation, or overdraw).
    pub fn tick(&mut self) -> Option<&SimFrame> {
        if self.stop != StopReason::Running {
            return None;
        }
        if self.step_index > self.timeline.total_steps {
            self.stop = StopReason::Completed;
            tracing::info!(sim = %self.sim_name, "simulation complete");
            return None;
        }
        if self.cancel.is_cancelled() {
            self.stop = StopReason::Cancelled;
            tracing::info!(sim = %self.sim_name, step = self.step_index, "simulation cancelled");
            return None;
        }

        let _span = tracing::info_span!("tick", sim = %self.sim_name, step = self.step_index)
            .entered();

        let curr = self.timeline.date_at(self.step_index);
        let prev = self.timeline.date_at(self.step_index - 1);
        self.process_step(prev, curr);
        self.step_index += 1;

        if self.step_index > self.timeline.total_steps && self.stop == StopReason::Running {
            self.stop = StopReason::Completed;
        }
        self.frames.last()
    }

    /// Run to completion and return the full frame history.
    pub fn run(&mut self) -> &[SimFrame] {
        while self.tick().is_some() {}
        &self.frames
    }

    /// Request cooperative cancellation. The flag is observed between
    /// ticks: an in-flight tick completes and keeps its frame, and once
    /// the flag is seen no further tick starts and no frame is emitted
    /// for the cancelled attempt.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clonable handle for cancelling from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Emitted frames so far, initial snapshot first.
    pub fn frames(&self) -> &[SimFrame] {
        &self.frames
    }

    /// `(completed_steps, total_steps)`, excluding the initial snapshot.
    pub fn progress(&self) -> (u32, u32) {
        (self.step_index.saturating_sub(1), self.timeline.total_steps)
    }

    fn process_step(&mut self, prev: Date, curr: Date) {
        // Aggregates and the peer view come from the state at tick start,
        // i.e. the previous frame.
        let age = self.timeline.age_at(curr);
        let aggs = Aggregates::collect(&self.items, self.main_idx, age);
        let peers = collect_peers(&self.items);

        for flow in &mut self.flows {
            flow.reset();
        }
        let mut frame_events: Vec<SimEvent> = Vec::new();

        for i in 0..self.order.len() {
            let idx = self.order[i];

            let outcome = {
                let item = &mut self.items[idx];
                let ctx = TriggerContext {
                    peers: &peers,
                    owner_id: &peers[idx].id,
                    sim_date: curr,
                    age: aggs.age,
                    liquid_assets: aggs.liquid_assets,
                    main_savings_balance: aggs.main_savings_balance,
                    target_value: None,
                };
                item.evaluate_self_trigger(&ctx)
            };
            if !outcome.active {
                continue;
            }

            apply::accrue_interest(
                &mut self.items[idx],
                &mut self.flows[idx],
                prev,
                curr,
                &self.tax,
            );
            apply::process_own_cash_flows(
                &mut self.items[idx],
                &mut self.flows[idx],
                prev,
                curr,
                &self.tax,
            );
            apply::process_item_events(
                &mut self.items,
                &mut self.flows,
                idx,
                &peers,
                &aggs,
                prev,
                curr,
                &mut frame_events,
            );

            if outcome.trigger_fired && self.items[idx].liquidate_self_on_trigger {
                apply::liquidate(&mut self.items, &mut self.flows, idx, &mut frame_events);
            }
        }

        // Main-savings sweep: every item's net flow lands in the hub.
        let swept: Decimal = self.flows.iter().map(|f| f.cash_flow).sum();
        self.items[self.main_idx].value += swept;

        let tick_tax: Decimal = self.flows.iter().map(|f| f.tax).sum();
        self.total_tax += tick_tax;

        if self.fail_on_overdraw && self.items[self.main_idx].value < Decimal::ZERO {
            let balance = self.items[self.main_idx].value;
            tracing::error!(sim = %self.sim_name, %balance, "main savings overdrawn, stopping");
            frame_events.push(SimEvent::Overdraw { balance });
            self.stop = StopReason::Overdrawn;
        }

        self.snapshot(curr, frame_events);
    }

    fn snapshot(&mut self, frame_date: Date, events: Vec<SimEvent>) {
        let items = self
            .items
            .iter()
            .zip(&self.flows)
            .map(|(item, flow)| ItemState {
                id: item.id.clone(),
                value: item.value,
                cash_in_amount: flow.cash_in,
                cash_out_amount: flow.cash_out,
                interest_amount: flow.interest,
                cash_flow: flow.cash_flow,
                enabled_by_sim: item.enabled_by_sim,
                tax_paid: flow.tax,
            })
            .collect();

        self.frames.push(SimFrame {
            frame_date,
            items,
            total_tax_paid: self.total_tax,
            events,
        });
    }
}
