//! # inventory
//!
//! Read-only snapshots handed over by the device inventory. They are only used to pre-fill
//! OLT and ONU nodes; measured values stay attached to the ONU for display.

pub mod types;

pub use types::candidate::{InventoryLink, InventorySnapshot, OltCandidate, OnuCandidate};
