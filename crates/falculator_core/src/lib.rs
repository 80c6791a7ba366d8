//! Deterministic discrete-time financial simulation engine.
//!
//! A [`Config`] describes a portfolio of financial items (incomes,
//! expenses, savings, assets, liabilities, loans, shares, credit cards)
//! plus triggers and events that move money between them. The
//! [`Simulator`] advances a simulated clock in fixed steps and, for each
//! step, computes interest, cash flows, inter-item transfers, state
//! transitions and an immutable [`model::SimFrame`] snapshot.
//!
//! Runs are bit-reproducible: no stochastic inputs, fixed-point decimal
//! arithmetic throughout, and strictly ordered evaluation. A config must
//! pass through [`Config::sanitize`] before simulation; [`Simulator::new`]
//! does this itself and refuses fatal reports.

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

mod apply;
pub mod date_math;
pub mod describe;
pub mod error;
pub mod money;
pub mod sanitize;
pub mod simulation;
pub mod simulation_state;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{Config, LogLevel, TaxMode};
pub use error::{Result, SimError};
pub use sanitize::SanitizeReport;
pub use simulation::{CancelToken, Simulator};
