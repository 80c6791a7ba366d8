//! Simulation configuration.
//!
//! [`Config`] is the root container: global settings plus the full item
//! list. It is created by deserializing a single JSON document (or by hand
//! in tests), normalized by [`Config::sanitize`], and then handed by value
//! to the simulator. Running a simulation on an unsanitized config is
//! undefined.

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::wire::wire_enum;
use crate::model::{FinancialItem, Frequency};
use crate::sanitize::{self, SanitizeReport};

wire_enum! {
    /// Withholding mode applied to interest and cash-in flows.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TaxMode {
        NoTax = 0,
        FlatTax = 1,
        /// Progressive-bracket mode; accepted on the wire but currently
        /// behaves as NoTax.
        AustralianComprehensive = 2,
    }
}

impl Default for TaxMode {
    fn default() -> Self {
        TaxMode::NoTax
    }
}

wire_enum! {
    /// Minimum severity the log sink lets through.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    pub enum LogLevel {
        Debug = 0,
        Info = 1,
        Warn = 2,
        Error = 3,
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

pub const CONFIG_VERSION: u32 = 1;

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_birth_date() -> Date {
    jiff::civil::date(1970, 1, 1)
}

fn default_years_to_sim() -> u32 {
    10
}

/// Today's civil date in the system time zone.
pub fn today() -> Date {
    jiff::Zoned::now().date()
}

/// Root configuration: global simulation settings and the item list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub sim_name: String,
    #[serde(default = "default_birth_date")]
    pub birth_date: Date,
    #[serde(default = "default_years_to_sim")]
    pub years_to_sim: u32,
    /// Tick granularity.
    #[serde(default)]
    pub step_increment: Frequency,
    /// Force the start date to today on sanitize.
    #[serde(default)]
    pub start_date_is_today: bool,
    #[serde(default = "today")]
    pub start_date: Date,
    #[serde(default)]
    pub tax_mode: TaxMode,
    /// Flat withholding percentage, 0–100.
    #[serde(default)]
    pub tax_percent: Decimal,
    /// End of financial year; defaulted to June 30 by sanitize. Only the
    /// progressive tax mode consults it.
    #[serde(default)]
    pub end_of_fy: Option<Date>,
    #[serde(default)]
    pub items: Vec<FinancialItem>,
    /// Index of the main-savings item. Recomputed by sanitize; never
    /// trusted on load.
    #[serde(default)]
    pub main_savings_idx: Option<usize>,
    #[serde(default)]
    pub log_level: LogLevel,
    /// Stop the simulation when main savings goes negative.
    #[serde(default)]
    pub fail_on_overdraw: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            sim_name: String::new(),
            birth_date: default_birth_date(),
            years_to_sim: default_years_to_sim(),
            step_increment: Frequency::Monthly,
            start_date_is_today: false,
            start_date: today(),
            tax_mode: TaxMode::NoTax,
            tax_percent: Decimal::ZERO,
            end_of_fy: None,
            items: Vec::new(),
            main_savings_idx: None,
            log_level: LogLevel::Info,
            fail_on_overdraw: false,
        }
    }
}

impl Config {
    /// Run the full normalization pipeline, in place. Idempotent; returns
    /// the correction report for the caller to accept or reject.
    pub fn sanitize(&mut self) -> SanitizeReport {
        sanitize::run(self)
    }

    /// The resolved main-savings item, if sanitize found exactly one.
    pub fn main_savings(&self) -> Option<&FinancialItem> {
        self.items.get(self.main_savings_idx?)
    }

    /// Look an item up by id.
    pub fn item_by_id(&self, id: &str) -> Option<&FinancialItem> {
        self.items.iter().find(|i| i.id == id)
    }
}
