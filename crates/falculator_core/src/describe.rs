//! Typed entity schemas.
//!
//! GUI layers generate property editors from these descriptors instead of
//! reflecting over the model at runtime. The tables mirror the wire shapes
//! in `model` and `config`; constraints are advisory strings for editor
//! hints, not validation (sanitize owns validation).

use serde::Serialize;

/// Field kinds a property editor needs to distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Bool,
    Integer,
    Decimal,
    Text,
    Date,
    Enum,
    List,
    Nested,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Enum variants, where applicable.
    pub values: &'static [&'static str],
    /// Nested entity name, where applicable.
    pub entity: &'static str,
    pub constraints: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub fields: Vec<FieldSchema>,
}

fn field(name: &'static str, kind: FieldKind, constraints: &'static str) -> FieldSchema {
    FieldSchema {
        name,
        kind,
        values: &[],
        entity: "",
        constraints,
    }
}

fn enum_field(
    name: &'static str,
    values: &'static [&'static str],
    constraints: &'static str,
) -> FieldSchema {
    FieldSchema {
        name,
        kind: FieldKind::Enum,
        values,
        entity: "",
        constraints,
    }
}

fn nested(name: &'static str, entity: &'static str) -> FieldSchema {
    FieldSchema {
        name,
        kind: FieldKind::Nested,
        values: &[],
        entity,
        constraints: "",
    }
}

const FREQUENCIES: &[&str] = &["Daily", "Weekly", "Fortnightly", "Monthly", "Annual"];
const MATCH_KINDS: &[&str] = &["All", "Any", "None"];

/// Schemas for every persisted entity.
pub fn describe_entities() -> Vec<EntitySchema> {
    vec![
        EntitySchema {
            entity: "Config",
            fields: vec![
                field("version", FieldKind::Integer, "always 1"),
                field("sim_name", FieldKind::Text, ""),
                field("birth_date", FieldKind::Date, ""),
                field("years_to_sim", FieldKind::Integer, ">= 1"),
                enum_field("step_increment", FREQUENCIES, ""),
                field("start_date_is_today", FieldKind::Bool, ""),
                field("start_date", FieldKind::Date, ">= birth_date"),
                enum_field(
                    "tax_mode",
                    &["NoTax", "FlatTax", "AustralianComprehensive"],
                    "",
                ),
                field("tax_percent", FieldKind::Decimal, "0..=100"),
                field("end_of_fy", FieldKind::Date, ""),
                field("items", FieldKind::List, "one item flagged is_main_savings"),
                enum_field("log_level", &["Debug", "Info", "Warn", "Error"], ""),
                field("fail_on_overdraw", FieldKind::Bool, ""),
            ],
        },
        EntitySchema {
            entity: "FinancialItem",
            fields: vec![
                field("id", FieldKind::Text, "8 ascii chars, unique; assigned"),
                field("name", FieldKind::Text, ""),
                field("description", FieldKind::Text, ""),
                field("tags", FieldKind::List, "case-sensitive, deduped"),
                enum_field(
                    "type",
                    &[
                        "Income",
                        "Expense",
                        "Savings",
                        "Asset",
                        "Liability",
                        "Loan",
                        "Shares",
                        "CreditCard",
                    ],
                    "",
                ),
                field("value", FieldKind::Decimal, "credit cards >= 0"),
                nested("cash_in", "AmountFreq"),
                nested("cash_out", "AmountFreq"),
                nested("interest", "AmountFreq"),
                field("share_details", FieldKind::Nested, "Shares items only"),
                field("events", FieldKind::List, ""),
                nested("self_trigger", "TriggerConditions"),
                field("start_enabled", FieldKind::Bool, ""),
                field("disabled_by_user", FieldKind::Bool, ""),
                field("start_date", FieldKind::Date, ""),
                field("end_date", FieldKind::Date, ">= start_date"),
                field("is_main_savings", FieldKind::Bool, "exactly one item"),
                field("is_liquid_asset", FieldKind::Bool, ""),
                field("eval_order", FieldKind::Integer, "distinct; main savings 0"),
                field("liquidate_self_on_trigger", FieldKind::Bool, ""),
            ],
        },
        EntitySchema {
            entity: "AmountFreq",
            fields: vec![
                field("enabled", FieldKind::Bool, ""),
                field("amount", FieldKind::Decimal, "percentage when is_percentage"),
                field("is_percentage", FieldKind::Bool, ""),
                enum_field(
                    "percentage_basis",
                    &["Source", "Destination", "Self"],
                    "Destination on event flows only",
                ),
                field(
                    "annual_rate_monthly_compounding",
                    FieldKind::Bool,
                    "forces monthly end-of-month schedule",
                ),
                nested("schedule", "AmountSchedule"),
            ],
        },
        EntitySchema {
            entity: "AmountSchedule",
            fields: vec![
                enum_field("frequency", FREQUENCIES, ""),
                enum_field(
                    "day_of_week",
                    &[
                        "Monday",
                        "Tuesday",
                        "Wednesday",
                        "Thursday",
                        "Friday",
                        "Saturday",
                        "Sunday",
                    ],
                    "weekly/fortnightly",
                ),
                field("day_of_month", FieldKind::Integer, "1..=31, 31 = month end"),
                field("month_of_year", FieldKind::Integer, "1..=12, annual only"),
                field("trigger_limit", FieldKind::Integer, "0 = unlimited"),
                field("trigger_count", FieldKind::Integer, "runtime"),
            ],
        },
        EntitySchema {
            entity: "EventItem",
            fields: vec![
                field("id", FieldKind::Text, "assigned"),
                field("name", FieldKind::Text, ""),
                field("enabled", FieldKind::Bool, ""),
                field("target_id", FieldKind::Text, "must resolve, not self"),
                field("target_name", FieldKind::Text, "fallback reference"),
                field("set_state_on_trigger", FieldKind::Bool, ""),
                enum_field("target_state_action", &["Enable", "Disable", "Toggle"], ""),
                nested("cash_out", "AmountFreq"),
                nested("cash_in", "AmountFreq"),
                field("liquidate", FieldKind::Bool, "excludes cash flows"),
                nested("triggers", "TriggerConditions"),
            ],
        },
        EntitySchema {
            entity: "TriggerConditions",
            fields: vec![
                field("id", FieldKind::Text, "assigned"),
                enum_field("trigger_match_type", MATCH_KINDS, ""),
                field("trigger_match_value", FieldKind::Bool, ""),
                enum_field("tag_match_type", MATCH_KINDS, ""),
                nested("age", "ValueTrigger"),
                nested("liquid_assets", "ValueTrigger"),
                nested("main_savings_balance", "ValueTrigger"),
                nested("target_balance", "ValueTrigger"),
                field("tag_rules", FieldKind::List, ""),
                field("start_date", FieldKind::Date, ""),
                field("end_date", FieldKind::Date, ">= start_date"),
            ],
        },
        EntitySchema {
            entity: "ValueTrigger",
            fields: vec![
                field("enabled", FieldKind::Bool, ""),
                enum_field(
                    "operator",
                    &[
                        "Equal",
                        "NotEqual",
                        "GreaterThan",
                        "GreaterThanOrEqual",
                        "LessThan",
                        "LessThanOrEqual",
                    ],
                    "",
                ),
                field("comparison_value", FieldKind::Decimal, ""),
                field("trigger_limit", FieldKind::Integer, "0 = unlimited"),
                field("trigger_count", FieldKind::Integer, "runtime, monotonic"),
                field("last_trigger_date", FieldKind::Date, "runtime"),
            ],
        },
        EntitySchema {
            entity: "TagPredicate",
            fields: vec![
                field("enabled", FieldKind::Bool, "cleared on bad tag references"),
                field("tags", FieldKind::List, "must exist on some item"),
                enum_field("match_type", MATCH_KINDS, ""),
                field("match_value", FieldKind::Bool, ""),
            ],
        },
    ]
}
