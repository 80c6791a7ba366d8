//! Financial items.
//!
//! A [`FinancialItem`] is one entity in the portfolio: income, expense,
//! savings, asset, liability, loan, shares or credit card. The item type is
//! a closed sum and the type-specific behavior (credit-card forced enable,
//! loan zero-disable, share unit math) lives here with it; shared fields
//! stay on the common record.

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::amount::{AmountFreq, PercentageBasis};
use crate::model::events::EventItem;
use crate::model::schedule::{AmountSchedule, Frequency};
use crate::model::triggers::{TriggerConditions, TriggerContext};
use crate::model::wire::wire_enum;
use crate::sanitize::SanitizeReport;

wire_enum! {
    /// Item kind. Determines sanitize invariants and per-tick behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ItemType {
        Income = 0,
        Expense = 1,
        Savings = 2,
        Asset = 3,
        Liability = 4,
        Loan = 5,
        Shares = 6,
        CreditCard = 7,
    }
}

impl Default for ItemType {
    fn default() -> Self {
        ItemType::Savings
    }
}

impl ItemType {
    /// Debt-like targets where a cash push pays principal toward zero.
    pub fn is_debt_target(self) -> bool {
        matches!(self, ItemType::Loan | ItemType::Liability)
    }
}

/// Unitized holdings for [`ItemType::Shares`] items. Only shares are
/// unitized; every other type carries a plain balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ShareDetails {
    #[serde(default)]
    pub unit_count: u64,
    #[serde(default)]
    pub unit_price: Decimal,
    /// Cost base accumulated by purchases.
    #[serde(default)]
    pub total_cost_base: Decimal,
}

/// Result of the per-tick self-trigger evaluation.
///
/// `active` gates the rest of the frame for the item; `trigger_fired` is
/// true only when configured conditions actually evaluated true this tick,
/// which is what `liquidate_self_on_trigger` keys off.
#[derive(Debug, Clone, Copy)]
pub struct SelfTriggerOutcome {
    pub active: bool,
    pub trigger_fired: bool,
}

/// One portfolio entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    #[serde(default)]
    pub value: Decimal,
    #[serde(default)]
    pub cash_in: AmountFreq,
    #[serde(default)]
    pub cash_out: AmountFreq,
    #[serde(default = "default_interest")]
    pub interest: AmountFreq,
    #[serde(default)]
    pub share_details: Option<ShareDetails>,
    #[serde(default)]
    pub events: Vec<EventItem>,
    #[serde(default)]
    pub self_trigger: TriggerConditions,
    /// Enablement seed for the first frame.
    #[serde(default = "default_true")]
    pub start_enabled: bool,
    /// User switch; never changed mid-simulation.
    #[serde(default)]
    pub disabled_by_user: bool,
    /// Runtime enablement, mutated only by triggers and events.
    #[serde(default)]
    pub enabled_by_sim: bool,
    #[serde(default)]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub end_date: Option<Date>,
    #[serde(default)]
    pub is_main_savings: bool,
    #[serde(default)]
    pub is_liquid_asset: bool,
    /// Strict processing order within a tick; main savings is 0.
    #[serde(default)]
    pub eval_order: u32,
    #[serde(default)]
    pub liquidate_self_on_trigger: bool,
}

fn default_true() -> bool {
    true
}

fn default_interest() -> AmountFreq {
    AmountFreq {
        is_percentage: true,
        ..AmountFreq::default()
    }
}

impl Default for FinancialItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            tags: Vec::new(),
            item_type: ItemType::Savings,
            value: Decimal::ZERO,
            cash_in: AmountFreq::default(),
            cash_out: AmountFreq::default(),
            // Interest is inherently a percentage.
            interest: default_interest(),
            share_details: None,
            events: Vec::new(),
            self_trigger: TriggerConditions::default(),
            start_enabled: true,
            disabled_by_user: false,
            enabled_by_sim: false,
            start_date: None,
            end_date: None,
            is_main_savings: false,
            is_liquid_asset: false,
            eval_order: 0,
            liquidate_self_on_trigger: false,
        }
    }
}

impl FinancialItem {
    /// The synthesized fallback hub when a config has no main savings.
    /// Built already normalized so synthesizing one never adds corrections.
    pub fn default_main_savings() -> Self {
        Self {
            name: "Main Savings".to_string(),
            item_type: ItemType::Savings,
            is_main_savings: true,
            is_liquid_asset: true,
            start_enabled: true,
            eval_order: 0,
            ..Self::default()
        }
    }

    /// Re-derive `value` from the unit holdings. A user-disabled shares
    /// item reads as worthless.
    pub fn sync_share_value(&mut self) {
        if let Some(details) = &self.share_details {
            self.value = if self.disabled_by_user {
                Decimal::ZERO
            } else {
                Decimal::from(details.unit_count) * details.unit_price
            };
        }
    }

    /// Per-tick enablement decision.
    ///
    /// Precedence: user switch, credit-card forced enable, loan payoff,
    /// date range, configured trigger. With nothing configured the flag
    /// simply retains its previous value (seeded from `start_enabled`),
    /// except loans which re-enable while they carry a balance.
    pub fn evaluate_self_trigger(&mut self, ctx: &TriggerContext) -> SelfTriggerOutcome {
        let inactive = SelfTriggerOutcome {
            active: false,
            trigger_fired: false,
        };

        if self.disabled_by_user {
            self.enabled_by_sim = false;
            return inactive;
        }
        if self.item_type == ItemType::CreditCard {
            self.enabled_by_sim = true;
            return SelfTriggerOutcome {
                active: true,
                trigger_fired: false,
            };
        }
        if self.item_type == ItemType::Loan && self.value.is_zero() {
            self.enabled_by_sim = false;
            return inactive;
        }
        if let Some(start) = self.start_date {
            if start > ctx.sim_date {
                self.enabled_by_sim = false;
                return inactive;
            }
        }
        if let Some(end) = self.end_date {
            if end < ctx.sim_date {
                self.enabled_by_sim = false;
                return inactive;
            }
        }

        let mut trigger_fired = false;
        if self.self_trigger.has_any_conditions(false) {
            trigger_fired = self.self_trigger.evaluate(ctx);
            self.enabled_by_sim = trigger_fired;
        } else if self.item_type == ItemType::Loan {
            self.enabled_by_sim = true;
        }

        SelfTriggerOutcome {
            active: self.enabled_by_sim,
            trigger_fired,
        }
    }

    /// Enforce the structural invariants for this item's type.
    pub fn sanitize(&mut self, report: &mut SanitizeReport) {
        let context = format!("item `{}`", self.name);

        // Item-level flows never reference a transfer destination.
        for (label, freq) in [
            ("cash_in", &mut self.cash_in),
            ("cash_out", &mut self.cash_out),
            ("interest", &mut self.interest),
        ] {
            if freq.percentage_basis == PercentageBasis::Destination {
                report.warn(
                    &context,
                    format!("{label} cannot use a Destination basis, resetting to Source"),
                );
                freq.percentage_basis = PercentageBasis::Source;
            }
        }
        if !self.interest.is_percentage {
            report.warn(&context, "interest must be a percentage, forcing");
            self.interest.is_percentage = true;
        }

        match self.item_type {
            ItemType::Shares => self.sanitize_shares(&context, report),
            ItemType::CreditCard => self.sanitize_credit_card(&context, report),
            _ => {}
        }

        self.cash_in.sanitize(&context, report);
        self.cash_out.sanitize(&context, report);
        self.interest.sanitize(&context, report);

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                report.warn(
                    &context,
                    format!("start date {start} after end date {end}, clamping start"),
                );
                self.start_date = Some(end);
            }
        }

        self.self_trigger.sanitize(&context, report);
        for event in &mut self.events {
            event.sanitize(&context, report);
        }
    }

    fn sanitize_shares(&mut self, context: &str, report: &mut SanitizeReport) {
        if self.share_details.is_none() {
            report.warn(context, "shares item without share details, adding empty holdings");
            self.share_details = Some(ShareDetails::default());
        }
        if self.cash_out.enabled {
            report.warn(context, "shares items cannot have cash out, disabling");
            self.cash_out.enabled = false;
        }
        if self.cash_in.enabled && !self.cash_in.is_percentage {
            report.warn(context, "shares cash in must be a percentage yield, forcing");
            self.cash_in.is_percentage = true;
        }
        self.sync_share_value();
    }

    fn sanitize_credit_card(&mut self, context: &str, report: &mut SanitizeReport) {
        if self.value.is_sign_negative() && !self.value.is_zero() {
            report.warn(
                context,
                format!("credit card balance {} cannot be negative, resetting to 0", self.value),
            );
            self.value = Decimal::ZERO;
        }
        if !self.interest.enabled {
            report.warn(context, "credit card interest must stay enabled, forcing");
            self.interest.enabled = true;
        }
        if self.interest.amount.is_sign_negative() {
            report.warn(context, "credit card interest rate cannot be negative, resetting to 0");
            self.interest.amount = Decimal::ZERO;
        }
        if !self.interest.annual_rate_monthly_compounding {
            report.warn(
                context,
                "credit card interest is an annual rate compounded monthly, forcing",
            );
            self.interest.annual_rate_monthly_compounding = true;
        }
        if !self.interest.is_percentage {
            self.interest.is_percentage = true;
        }
        let schedule = &self.interest.schedule;
        if schedule.frequency != Frequency::Monthly
            || schedule.day_of_month != Some(31)
            || schedule.month_of_year.is_some()
            || schedule.trigger_limit != 0
        {
            report.warn(context, "credit card interest schedule reset to monthly end-of-month");
            self.interest.schedule = AmountSchedule::monthly_eom();
        }
        if self.disabled_by_user {
            report.warn(context, "credit cards cannot be disabled by the user, re-enabling");
            self.disabled_by_user = false;
        }
        if !self.start_enabled {
            report.warn(context, "credit cards always start enabled, forcing");
            self.start_enabled = true;
        }
        if self.is_liquid_asset {
            report.warn(context, "credit cards are not liquid assets, clearing flag");
            self.is_liquid_asset = false;
        }
        if self.self_trigger.has_any_conditions(true) {
            report.warn(context, "credit cards ignore self triggers, clearing conditions");
            let id = std::mem::take(&mut self.self_trigger.id);
            self.self_trigger = TriggerConditions {
                id,
                ..TriggerConditions::default()
            };
        }
    }
}
