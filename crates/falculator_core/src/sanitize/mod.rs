//! Config normalization.
//!
//! Sanitize runs at load, save, simulation start, and on explicit request.
//! It is idempotent, never fails outright, and collects everything it did
//! (or refused to do) into a [`SanitizeReport`]: corrections are applied
//! in place and surfaced for the caller to accept; fatals leave the config
//! in a state the simulator refuses to start from.
//!
//! Pipeline order matters and is fixed:
//!
//! 1. id assignment/validation across every entity
//! 2. top-level normalization (version, dates, duration, tax percent)
//! 3. default main-savings synthesis for empty configs
//! 4. per-item structural invariants (types, flows, triggers, legacy
//!    migration)
//! 5. main-savings resolution
//! 6. main-savings invariants
//! 7. eval-order dedupe
//! 8. tag-reference validation
//! 9. event-target resolution
//! 10. per-item tag dedupe

mod registry;

pub use registry::{IdRegistry, TagRegistry};

use std::fmt;

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;

use crate::config::{CONFIG_VERSION, Config, today};
use crate::date_math::add_years;
use crate::model::{FinancialItem, ItemType};
use crate::money::HUNDRED;

/// One applied correction.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub context: String,
    pub message: String,
}

/// Everything a sanitize run changed or rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizeReport {
    corrections: Vec<Correction>,
    fatals: Vec<Correction>,
}

impl SanitizeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an auto-applied correction.
    pub fn warn(&mut self, context: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(context, "{message}");
        self.corrections.push(Correction {
            context: context.to_string(),
            message,
        });
    }

    /// Record a condition the simulator refuses to start with.
    pub fn fatal(&mut self, context: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(context, "{message}");
        self.fatals.push(Correction {
            context: context.to_string(),
            message,
        });
    }

    pub fn corrections(&self) -> &[Correction] {
        &self.corrections
    }

    pub fn fatals(&self) -> &[Correction] {
        &self.fatals
    }

    pub fn is_fatal(&self) -> bool {
        !self.fatals.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.corrections.is_empty() && self.fatals.is_empty()
    }
}

impl fmt::Display for SanitizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.fatals {
            writeln!(f, "ERROR {}: {}", c.context, c.message)?;
        }
        for c in &self.corrections {
            writeln!(f, "WARN  {}: {}", c.context, c.message)?;
        }
        if self.is_clean() {
            writeln!(f, "no corrections")?;
        }
        Ok(())
    }
}

/// Run the full pipeline against `config`.
pub fn run(config: &mut Config) -> SanitizeReport {
    let mut report = SanitizeReport::new();
    let mut ids = IdRegistry::new();

    assign_ids(config, &mut ids, &mut report);
    normalize_top_level(config, &mut report);

    if config.items.is_empty() {
        report.warn("config", "no items configured, synthesizing a default main savings");
        let mut main = FinancialItem::default_main_savings();
        main.id = ids.assign();
        main.self_trigger.id = ids.assign();
        config.items.push(main);
    }

    for item in &mut config.items {
        item.sanitize(&mut report);
    }

    resolve_main_savings(config, &mut ids, &mut report);
    dedupe_eval_orders(config, &mut report);
    validate_tag_references(config, &mut report);
    resolve_event_targets(config, &mut report);

    for item in &mut config.items {
        dedupe_tags(item);
    }

    report
}

/// Step 1: claim every well-formed unique id; replace the rest.
///
/// Single deterministic walk (item, its self-trigger, its events, each
/// event's trigger), so replacements are stable run-to-run and a second
/// pass claims everything unchanged.
fn assign_ids(config: &mut Config, ids: &mut IdRegistry, report: &mut SanitizeReport) {
    let mut ensure = |slot: &mut String, context: String, ids: &mut IdRegistry, report: &mut SanitizeReport| {
        if ids.claim(slot) {
            return;
        }
        let fresh = ids.assign();
        if !slot.is_empty() {
            report.warn(&context, format!("id `{slot}` invalid or duplicated, reassigned `{fresh}`"));
        }
        *slot = fresh;
    };

    for item in &mut config.items {
        let name = item.name.clone();
        ensure(&mut item.id, format!("item `{name}`"), ids, report);
        ensure(
            &mut item.self_trigger.id,
            format!("item `{name}` self trigger"),
            ids,
            report,
        );
        for event in &mut item.events {
            let event_name = event.name.clone();
            ensure(
                &mut event.id,
                format!("item `{name}` event `{event_name}`"),
                ids,
                report,
            );
            ensure(
                &mut event.triggers.id,
                format!("item `{name}` event `{event_name}` trigger"),
                ids,
                report,
            );
        }
    }
}

/// Step 2: version, financial-year default, duration clamp, start date.
fn normalize_top_level(config: &mut Config, report: &mut SanitizeReport) {
    config.version = CONFIG_VERSION;

    if config.end_of_fy.is_none() {
        let eofy = jiff::civil::date(today().year(), 6, 30);
        tracing::debug!(%eofy, "defaulting end of financial year");
        config.end_of_fy = Some(eofy);
    }
    if config.years_to_sim < 1 {
        report.warn("config", "years_to_sim must be at least 1, clamping");
        config.years_to_sim = 1;
    }
    if config.start_date_is_today {
        config.start_date = today();
    }
    if config.start_date < config.birth_date {
        report.warn(
            "config",
            format!(
                "start date {} precedes birth date {}",
                config.start_date, config.birth_date
            ),
        );
    }
    if config.tax_percent < Decimal::ZERO || config.tax_percent > HUNDRED {
        let clamped = config.tax_percent.clamp(Decimal::ZERO, HUNDRED);
        report.warn(
            "config",
            format!("tax percent {} out of range, clamped to {clamped}", config.tax_percent),
        );
        config.tax_percent = clamped;
    }
}

/// Steps 5–6: resolve the single main-savings item and pin its invariants.
fn resolve_main_savings(config: &mut Config, ids: &mut IdRegistry, report: &mut SanitizeReport) {
    let mains: Vec<usize> = config
        .items
        .iter()
        .enumerate()
        .filter(|(_, i)| i.is_main_savings)
        .map(|(idx, _)| idx)
        .collect();

    let idx = match mains.len() {
        0 => {
            report.warn("config", "no main savings item, synthesizing one");
            let mut main = FinancialItem::default_main_savings();
            main.id = ids.assign();
            main.self_trigger.id = ids.assign();
            // The per-item pass already ran; normalize the late arrival too.
            main.sanitize(report);
            config.items.push(main);
            config.items.len() - 1
        }
        1 => mains[0],
        n => {
            report.fatal(
                "config",
                format!("{n} items are flagged as main savings; exactly one is required"),
            );
            config.main_savings_idx = None;
            return;
        }
    };
    config.main_savings_idx = Some(idx);

    let start_date = config.start_date;
    let item = &mut config.items[idx];
    let context = format!("main savings `{}`", item.name);

    if item.item_type != ItemType::Savings {
        report.warn(&context, "main savings must be a Savings item, forcing");
        item.item_type = ItemType::Savings;
    }
    if item.eval_order != 0 {
        report.warn(&context, "main savings is always evaluated first, resetting eval order");
        item.eval_order = 0;
    }
    if !item.start_enabled {
        report.warn(&context, "main savings must start enabled, forcing");
        item.start_enabled = true;
    }
    if item.disabled_by_user {
        report.warn(&context, "main savings cannot be disabled, re-enabling");
        item.disabled_by_user = false;
    }
    if !item.is_liquid_asset {
        report.warn(&context, "main savings is a liquid asset, setting flag");
        item.is_liquid_asset = true;
    }
    let horizon = add_years(start_date, 95);
    if let Some(end) = item.end_date {
        if end < horizon {
            report.warn(
                &context,
                format!("end date {end} is inside the simulation horizon, extending"),
            );
            item.end_date = Some(add_years(start_date, 100));
        }
    }
}

/// Step 7: make eval orders distinct, shifting collisions upward while
/// preserving relative order. Main savings keeps 0.
fn dedupe_eval_orders(config: &mut Config, report: &mut SanitizeReport) {
    let main_idx = config.main_savings_idx;

    let mut order: Vec<usize> = (0..config.items.len())
        .filter(|i| Some(*i) != main_idx)
        .collect();
    order.sort_by_key(|&i| (config.items[i].eval_order, i));

    let mut next_min = if main_idx.is_some() { 1 } else { 0 };
    for i in order {
        let item = &mut config.items[i];
        let assigned = item.eval_order.max(next_min);
        if assigned != item.eval_order {
            report.warn(
                &format!("item `{}`", item.name),
                format!("eval order {} collides, shifted to {assigned}", item.eval_order),
            );
            item.eval_order = assigned;
        }
        next_min = assigned + 1;
    }
}

/// Step 8: disable tag predicates that reference tags no item carries.
fn validate_tag_references(config: &mut Config, report: &mut SanitizeReport) {
    let mut tags = TagRegistry::new();
    for item in &config.items {
        for tag in &item.tags {
            tags.insert(tag);
        }
    }

    for item in &mut config.items {
        let name = item.name.clone();
        let mut check = |rules: &mut Vec<crate::model::TagPredicate>, context: &str| {
            for rule in rules.iter_mut().filter(|r| r.enabled) {
                let missing: Vec<&String> =
                    rule.tags.iter().filter(|t| !tags.contains(t)).collect();
                if !missing.is_empty() {
                    report.warn(
                        context,
                        format!(
                            "tag predicate references unknown tags {missing:?}, disabling"
                        ),
                    );
                    rule.enabled = false;
                }
            }
        };

        check(
            &mut item.self_trigger.tag_rules,
            &format!("item `{name}` self trigger"),
        );
        for event in &mut item.events {
            let context = format!("item `{name}` event `{}`", event.name);
            check(&mut event.triggers.tag_rules, &context);
        }
    }
}

/// Step 9: resolve event targets by id, then by name; reject self
/// references; disable what cannot resolve. Shares targets with a zero
/// unit price wired into cash flows are fatal (division by zero in the
/// unit math).
fn resolve_event_targets(config: &mut Config, report: &mut SanitizeReport) {
    struct TargetInfo {
        id: String,
        name: String,
        zero_price_shares: bool,
    }
    let targets: Vec<TargetInfo> = config
        .items
        .iter()
        .map(|i| TargetInfo {
            id: i.id.clone(),
            name: i.name.clone(),
            zero_price_shares: i.item_type == ItemType::Shares
                && i.share_details
                    .as_ref()
                    .is_none_or(|d| d.unit_price.is_zero()),
        })
        .collect();

    for item_idx in 0..config.items.len() {
        let owner_id = config.items[item_idx].id.clone();
        let owner_name = config.items[item_idx].name.clone();
        for event in &mut config.items[item_idx].events {
            if !event.enabled {
                continue;
            }
            let context = format!("item `{owner_name}` event `{}`", event.name);

            let resolved = targets
                .iter()
                .find(|t| t.id == event.target_id)
                .or_else(|| {
                    if event.target_name.is_empty() {
                        None
                    } else {
                        targets.iter().find(|t| t.name == event.target_name)
                    }
                });

            let Some(target) = resolved else {
                report.warn(
                    &context,
                    format!(
                        "target `{}` / `{}` does not resolve, disabling event",
                        event.target_id, event.target_name
                    ),
                );
                event.enabled = false;
                continue;
            };

            if target.id == owner_id {
                report.warn(&context, "event targets its own item, disabling");
                event.enabled = false;
                continue;
            }

            if target.zero_price_shares && (event.cash_in.enabled || event.cash_out.enabled) {
                report.fatal(
                    &context,
                    format!(
                        "target `{}` is a shares item with zero unit price; transfers would \
                         divide by zero",
                        target.name
                    ),
                );
            }

            if event.target_id != target.id {
                event.target_id = target.id.clone();
            }
            event.target_name = target.name.clone();
        }
    }
}

/// Step 10: drop duplicate tags, preserving first occurrence
/// (case-sensitive).
fn dedupe_tags(item: &mut FinancialItem) {
    let mut seen = FxHashSet::default();
    item.tags.retain(|t| seen.insert(t.clone()));
}
