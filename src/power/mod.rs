//! # power
//!
//! Optical power budget: losses along cables and through splitters, propagation from the OLT,
//! and per-ONU link classification.

pub mod classify;
pub mod propagate;
pub mod report;
pub mod types;

pub use classify::{GOOD_MARGIN_DB, LinkQuality, classify, margin};
pub use propagate::{compute_power_map, compute_power_map_with};
pub use report::{BudgetReport, OnuBudget, budget_report};
pub use types::{loss::LossModel, power_map::PowerMap};
