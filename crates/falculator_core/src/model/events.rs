//! Inter-item events.
//!
//! An [`EventItem`] hangs off a source item and, when its triggers fire,
//! moves cash to or from a target item, flips the target's enablement, or
//! liquidates it. The application logic lives in `apply`; this module is
//! the wire shape plus its sanitize rules.

use serde::{Deserialize, Serialize};

use crate::model::amount::AmountFreq;
use crate::model::triggers::TriggerConditions;
use crate::model::wire::wire_enum;
use crate::sanitize::SanitizeReport;

wire_enum! {
    /// What a state-change event does to the target's enablement.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TargetStateAction {
        Enable = 0,
        Disable = 1,
        Toggle = 2,
    }
}

impl Default for TargetStateAction {
    fn default() -> Self {
        TargetStateAction::Enable
    }
}

/// A conditional operation against a target item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Preferred target reference; resolved and backfilled by sanitize.
    #[serde(default)]
    pub target_id: String,
    /// Fallback reference when `target_id` doesn't resolve.
    #[serde(default)]
    pub target_name: String,
    #[serde(default)]
    pub set_state_on_trigger: bool,
    #[serde(default)]
    pub target_state_action: TargetStateAction,
    /// Push: cash leaving the source toward the target.
    #[serde(default)]
    pub cash_out: AmountFreq,
    /// Pull: cash drawn from the target into the source.
    #[serde(default)]
    pub cash_in: AmountFreq,
    /// Move the target's entire value to main savings and disable it.
    #[serde(default)]
    pub liquidate: bool,
    #[serde(default)]
    pub triggers: TriggerConditions,
}

fn default_true() -> bool {
    true
}

impl Default for EventItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            enabled: true,
            target_id: String::new(),
            target_name: String::new(),
            set_state_on_trigger: false,
            target_state_action: TargetStateAction::Enable,
            cash_out: AmountFreq::default(),
            cash_in: AmountFreq::default(),
            liquidate: false,
            triggers: TriggerConditions::default(),
        }
    }
}

impl EventItem {
    /// Normalize flows and triggers. Target resolution happens later in the
    /// config-level pass, once every item id is known.
    pub fn sanitize(&mut self, owner_context: &str, report: &mut SanitizeReport) {
        let context = format!("{owner_context} event `{}`", self.name);

        if self.liquidate && (self.cash_in.enabled || self.cash_out.enabled) {
            report.warn(
                &context,
                "liquidation and cash flows are mutually exclusive, disabling cash flows",
            );
            self.cash_in.enabled = false;
            self.cash_out.enabled = false;
        }

        self.cash_in.sanitize(&context, report);
        self.cash_out.sanitize(&context, report);
        self.triggers.sanitize(&context, report);
    }
}
