//! Persisted-format compatibility.

use rust_decimal_macros::dec;

use super::{main_savings, monthly_config};
use crate::config::{Config, TaxMode};
use crate::model::{Frequency, ItemType, PercentageBasis, Weekday};

#[test]
fn test_enums_serialize_by_name() {
    assert_eq!(serde_json::to_string(&ItemType::CreditCard).unwrap(), r#""CreditCard""#);
    assert_eq!(serde_json::to_string(&Frequency::Fortnightly).unwrap(), r#""Fortnightly""#);
    assert_eq!(
        serde_json::to_string(&PercentageBasis::SelfValue).unwrap(),
        r#""Self""#
    );
}

#[test]
fn test_enums_accept_legacy_integer_codes() {
    assert_eq!(serde_json::from_str::<ItemType>("5").unwrap(), ItemType::Loan);
    assert_eq!(serde_json::from_str::<Frequency>("0").unwrap(), Frequency::Daily);
    assert_eq!(serde_json::from_str::<Weekday>("4").unwrap(), Weekday::Friday);
    assert_eq!(
        serde_json::from_str::<TaxMode>("2").unwrap(),
        TaxMode::AustralianComprehensive
    );
    assert_eq!(
        serde_json::from_str::<PercentageBasis>(r#""Self""#).unwrap(),
        PercentageBasis::SelfValue
    );
}

#[test]
fn test_unknown_enum_values_are_rejected() {
    assert!(serde_json::from_str::<ItemType>(r#""Crypto""#).is_err());
    assert!(serde_json::from_str::<ItemType>("99").is_err());
}

#[test]
fn test_dates_use_iso_day_strings() {
    let config = monthly_config(1, vec![main_savings(dec!(0))]);
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains(r#""start_date":"2025-01-01""#), "json: {json}");
}

#[test]
fn test_config_roundtrips_after_sanitize() {
    let mut config = monthly_config(3, vec![main_savings(dec!(2500.50))]);
    config.tax_mode = TaxMode::FlatTax;
    config.tax_percent = dec!(32.5);
    config.sanitize();

    let json = serde_json::to_string(&config).unwrap();
    let reloaded: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(config, reloaded);

    // Sanitizing the reloaded document is a no-op.
    let mut again = reloaded.clone();
    again.sanitize();
    assert_eq!(again, reloaded);
}

#[test]
fn test_minimal_document_loads_with_defaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.version, 1);
    assert_eq!(config.step_increment, Frequency::Monthly);
    assert!(config.items.is_empty());
    assert!(!config.fail_on_overdraw);
}

#[test]
fn test_entity_schemas_cover_the_data_model() {
    let schemas = crate::describe::describe_entities();
    let entities: Vec<&str> = schemas.iter().map(|s| s.entity).collect();
    for expected in [
        "Config",
        "FinancialItem",
        "AmountFreq",
        "AmountSchedule",
        "EventItem",
        "TriggerConditions",
        "ValueTrigger",
        "TagPredicate",
    ] {
        assert!(entities.contains(&expected), "missing schema for {expected}");
    }
    // Schemas serialize for the GUI boundary.
    let json = serde_json::to_string(&schemas).unwrap();
    assert!(json.contains("eval_order"));
}
