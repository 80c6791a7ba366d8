//! The trigger language.
//!
//! Three layers compose here:
//! - [`ValueTrigger`] — one `value ⊙ k` comparison with firing-count limits.
//! - [`TagPredicate`] — a boolean over the enablement of other items
//!   carrying given tags.
//! - [`TriggerConditions`] — the composite combining tag rules, date ranges
//!   and value triggers under a match type.
//!
//! Evaluation is deliberately order-fixed (tag rules, start date, end date,
//! age, liquid assets, main savings balance, target balance) so runs are
//! reproducible condition-for-condition.

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::wire::wire_enum;
use crate::sanitize::SanitizeReport;

wire_enum! {
    /// Comparison operator for value triggers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CompareOp {
        Equal = 0,
        NotEqual = 1,
        GreaterThan = 2,
        GreaterThanOrEqual = 3,
        LessThan = 4,
        LessThanOrEqual = 5,
    }
}

impl Default for CompareOp {
    fn default() -> Self {
        CompareOp::GreaterThanOrEqual
    }
}

impl CompareOp {
    pub fn apply(self, lhs: Decimal, rhs: Decimal) -> bool {
        match self {
            CompareOp::Equal => lhs == rhs,
            CompareOp::NotEqual => lhs != rhs,
            CompareOp::GreaterThan => lhs > rhs,
            CompareOp::GreaterThanOrEqual => lhs >= rhs,
            CompareOp::LessThan => lhs < rhs,
            CompareOp::LessThanOrEqual => lhs <= rhs,
        }
    }
}

/// One comparison against a runtime value, with trigger-limit accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValueTrigger {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub operator: CompareOp,
    #[serde(default)]
    pub comparison_value: Decimal,
    /// Maximum firings; 0 means unlimited.
    #[serde(default)]
    pub trigger_limit: u32,
    #[serde(default)]
    pub trigger_count: u32,
    #[serde(default)]
    pub last_trigger_date: Option<Date>,
}

impl ValueTrigger {
    /// `value ≥ k`, enabled. Used by the legacy Min migration.
    pub fn at_least(value: Decimal) -> Self {
        Self {
            enabled: true,
            operator: CompareOp::GreaterThanOrEqual,
            comparison_value: value,
            ..Self::default()
        }
    }

    /// `value ≤ k`, enabled. Used by the legacy Max migration.
    pub fn at_most(value: Decimal) -> Self {
        Self {
            enabled: true,
            operator: CompareOp::LessThanOrEqual,
            comparison_value: value,
            ..Self::default()
        }
    }

    /// Does the trigger pass for `value`? Does not record a firing.
    pub fn check(&self, value: Decimal) -> bool {
        if !self.enabled {
            return false;
        }
        if !self.operator.apply(value, self.comparison_value) {
            return false;
        }
        if self.trigger_limit > 0 && self.trigger_count >= self.trigger_limit {
            return false;
        }
        true
    }

    /// Record one firing. Called exactly once per firing, when the
    /// enclosing [`TriggerConditions`] evaluated true.
    pub fn record(&mut self, now: Date) {
        self.trigger_count = self.trigger_count.saturating_add(1);
        self.last_trigger_date = Some(now);
    }
}

wire_enum! {
    /// Combining mode for predicates and condition lists.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MatchKind {
        All = 0,
        Any = 1,
        None = 2,
    }
}

impl Default for MatchKind {
    fn default() -> Self {
        MatchKind::All
    }
}

/// A peer item as seen by tag predicates: identity, tags, and enablement at
/// the start of the current tick. Built once per tick so predicates observe
/// the previous frame's state, never mid-tick mutations.
#[derive(Debug, Clone)]
pub struct PeerState {
    pub id: String,
    pub tags: Vec<String>,
    pub enabled_by_sim: bool,
}

/// A boolean over the set of items carrying any of the listed tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagPredicate {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub match_type: MatchKind,
    /// The enablement state candidates are matched against.
    #[serde(default = "default_true")]
    pub match_value: bool,
}

impl Default for TagPredicate {
    fn default() -> Self {
        Self {
            enabled: true,
            tags: Vec::new(),
            match_type: MatchKind::All,
            match_value: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl TagPredicate {
    /// Evaluate against the peer snapshot. The owner is excluded from the
    /// candidate set so an item never predicates on itself.
    pub fn evaluate(&self, peers: &[PeerState], owner_id: &str) -> bool {
        let candidates = peers
            .iter()
            .filter(|p| p.id != owner_id && p.tags.iter().any(|t| self.tags.contains(t)));

        let mut total = 0usize;
        let mut matched = 0usize;
        for peer in candidates {
            total += 1;
            if peer.enabled_by_sim == self.match_value {
                matched += 1;
            }
        }

        match self.match_type {
            MatchKind::All => {
                if self.tags.is_empty() {
                    tracing::warn!("tag predicate with no tags is vacuously true");
                    return true;
                }
                total > 0 && matched == total
            }
            MatchKind::Any => matched > 0,
            MatchKind::None => matched == 0,
        }
    }
}

/// Everything a trigger evaluation can observe about the simulation.
///
/// `target_value` is the transfer target's balance, present only when the
/// trigger belongs to an event; a target-balance condition in a self-trigger
/// context is ignored rather than failed.
#[derive(Debug, Clone)]
pub struct TriggerContext<'a> {
    pub peers: &'a [PeerState],
    pub owner_id: &'a str,
    pub sim_date: Date,
    pub age: Decimal,
    pub liquid_assets: Decimal,
    pub main_savings_balance: Decimal,
    pub target_value: Option<Decimal>,
}

/// Composite trigger: tag rules, a date range, and value comparisons,
/// combined under a match type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConditions {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub trigger_match_type: MatchKind,
    #[serde(default = "default_true")]
    pub trigger_match_value: bool,
    /// Combines the tag-rule sublist into the single bool that joins the
    /// condition list.
    #[serde(default)]
    pub tag_match_type: MatchKind,
    #[serde(default)]
    pub age: ValueTrigger,
    #[serde(default)]
    pub liquid_assets: ValueTrigger,
    #[serde(default)]
    pub main_savings_balance: ValueTrigger,
    #[serde(default)]
    pub target_balance: ValueTrigger,
    #[serde(default)]
    pub tag_rules: Vec<TagPredicate>,
    #[serde(default)]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub end_date: Option<Date>,

    // Deprecated numeric bounds from the legacy format. Parse-only: sanitize
    // migrates them into the operator-based triggers above and they are
    // never written back.
    #[serde(default, skip_serializing, alias = "MinAge")]
    pub min_age: Option<u32>,
    #[serde(default, skip_serializing, alias = "MaxAge")]
    pub max_age: Option<u32>,
    #[serde(default, skip_serializing, alias = "MinEnabled")]
    pub min_enabled: Option<bool>,
    #[serde(default, skip_serializing, alias = "MinValue")]
    pub min_value: Option<Decimal>,
    #[serde(default, skip_serializing, alias = "MaxEnabled")]
    pub max_enabled: Option<bool>,
    #[serde(default, skip_serializing, alias = "MaxValue")]
    pub max_value: Option<Decimal>,
}

impl Default for TriggerConditions {
    fn default() -> Self {
        Self {
            id: String::new(),
            trigger_match_type: MatchKind::All,
            trigger_match_value: true,
            tag_match_type: MatchKind::All,
            age: ValueTrigger::default(),
            liquid_assets: ValueTrigger::default(),
            main_savings_balance: ValueTrigger::default(),
            target_balance: ValueTrigger::default(),
            tag_rules: Vec::new(),
            start_date: None,
            end_date: None,
            min_age: None,
            max_age: None,
            min_enabled: None,
            min_value: None,
            max_enabled: None,
            max_value: None,
        }
    }
}

impl TriggerConditions {
    /// Whether any condition is configured. `event_context` controls
    /// whether a target-balance condition counts; it is inert on
    /// self-triggers.
    pub fn has_any_conditions(&self, event_context: bool) -> bool {
        self.tag_rules.iter().any(|r| r.enabled)
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.age.enabled
            || self.liquid_assets.enabled
            || self.main_savings_balance.enabled
            || (event_context && self.target_balance.enabled)
    }

    /// Evaluate the composite and, when it fires, record a firing on every
    /// enabled value trigger whose check passed.
    pub fn evaluate(&mut self, ctx: &TriggerContext) -> bool {
        let mut results: Vec<bool> = Vec::new();

        let rule_results: Vec<bool> = self
            .tag_rules
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.evaluate(ctx.peers, ctx.owner_id))
            .collect();
        if !rule_results.is_empty() {
            let combined = match self.tag_match_type {
                MatchKind::All => rule_results.iter().all(|r| *r),
                MatchKind::Any => rule_results.iter().any(|r| *r),
                MatchKind::None => !rule_results.iter().any(|r| *r),
            };
            results.push(combined);
        }

        if let Some(start) = self.start_date {
            results.push(ctx.sim_date >= start);
        }
        if let Some(end) = self.end_date {
            results.push(ctx.sim_date <= end);
        }

        let age_hit = self.age.enabled && self.age.check(ctx.age);
        if self.age.enabled {
            results.push(age_hit);
        }
        let liquid_hit = self.liquid_assets.enabled && self.liquid_assets.check(ctx.liquid_assets);
        if self.liquid_assets.enabled {
            results.push(liquid_hit);
        }
        let savings_hit = self.main_savings_balance.enabled
            && self.main_savings_balance.check(ctx.main_savings_balance);
        if self.main_savings_balance.enabled {
            results.push(savings_hit);
        }
        let mut target_hit = false;
        if let Some(target_value) = ctx.target_value {
            target_hit = self.target_balance.enabled && self.target_balance.check(target_value);
            if self.target_balance.enabled {
                results.push(target_hit);
            }
        }

        // An unconstrained trigger never fires.
        if results.is_empty() {
            return false;
        }

        let want = self.trigger_match_value;
        let fired = match self.trigger_match_type {
            MatchKind::All => results.iter().all(|r| *r == want),
            MatchKind::Any => results.iter().any(|r| *r == want),
            MatchKind::None => !results.iter().any(|r| *r == want),
        };

        if fired {
            let now = ctx.sim_date;
            if age_hit {
                self.age.record(now);
            }
            if liquid_hit {
                self.liquid_assets.record(now);
            }
            if savings_hit {
                self.main_savings_balance.record(now);
            }
            if target_hit {
                self.target_balance.record(now);
            }
        }

        fired
    }

    /// Migrate legacy bounds and repair the date range.
    pub fn sanitize(&mut self, context: &str, report: &mut SanitizeReport) {
        if let Some(min) = self.min_age.take() {
            if !self.age.enabled {
                report.warn(context, format!("migrated legacy MinAge {min} to age trigger"));
                self.age = ValueTrigger::at_least(Decimal::from(min));
            }
        }
        if let Some(max) = self.max_age.take() {
            if !self.age.enabled {
                report.warn(context, format!("migrated legacy MaxAge {max} to age trigger"));
                self.age = ValueTrigger::at_most(Decimal::from(max));
            } else {
                report.warn(
                    context,
                    format!("legacy MaxAge {max} dropped; age trigger already configured"),
                );
            }
        }
        let min_on = self.min_enabled.take().unwrap_or(self.min_value.is_some());
        if let Some(min) = self.min_value.take() {
            if min_on && !self.target_balance.enabled {
                report.warn(
                    context,
                    format!("migrated legacy MinValue {min} to target balance trigger"),
                );
                self.target_balance = ValueTrigger::at_least(min);
            }
        }
        let max_on = self.max_enabled.take().unwrap_or(self.max_value.is_some());
        if let Some(max) = self.max_value.take() {
            if max_on && !self.target_balance.enabled {
                report.warn(
                    context,
                    format!("migrated legacy MaxValue {max} to target balance trigger"),
                );
                self.target_balance = ValueTrigger::at_most(max);
            } else if max_on {
                report.warn(
                    context,
                    format!("legacy MaxValue {max} dropped; target balance trigger already configured"),
                );
            }
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                report.warn(
                    context,
                    format!("trigger start date {start} after end date {end}, clamping start"),
                );
                self.start_date = Some(end);
            }
        }
    }
}
