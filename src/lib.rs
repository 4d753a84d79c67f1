//! # pon_tools
//!
//! Rust utilities for modeling **passive optical networks** and computing their optical power budget.
//!
//! ## Highlights
//! - **Typed topology**: OLTs, splitters, ONUs, switches and buildings in a SlotMap-backed [`Topology`].
//! - **Wiring rules**: every link is validated (legal type pairs, one link per input port, no loops).
//! - **Splitter catalog**: PLC 1:2 … 1:64 and asymmetric FBT 50/50 … 10/90 with their insertion losses.
//! - **Power propagation**: [`compute_power_map`] walks the tree from the OLT, subtracting fiber, connector and splitter losses.
//! - **Link quality**: [`classify`] rates every ONU GOOD / MARGINAL / FAIL against its receiver sensitivity.
//! - **Live editing**: [`Simulator`] recomputes the power map after every accepted edit.
//! - **Workspaces**: several named diagrams, persisted through a [`Storage`] back-end, with migration of single-diagram saves.
//!
//! ## Example
//! ```
//! use pon_tools::{LinkQuality, LinkRequest, NodeKind, Position, Simulator};
//!
//! let mut sim = Simulator::default();
//! let olt = sim.add_node("OLT", Position::default(), NodeKind::olt(1, 5.0)).unwrap();
//! let spl = sim.add_node("SPL", Position::default(), NodeKind::splitter("1:8").unwrap()).unwrap();
//! let onu = sim.add_node("ONU", Position::default(), NodeKind::onu(1000.0)).unwrap();
//! sim.connect(LinkRequest::new(olt, 0, spl, 0)).unwrap();
//! sim.connect(LinkRequest::new(spl, 0, onu, 0).cable(1000.0, 2)).unwrap();
//!
//! let rx = sim.power_map().received_power(onu).unwrap();
//! assert!((rx + 6.85).abs() < 1e-9);
//! assert_eq!(sim.quality_of(onu), LinkQuality::Good);
//! ```
//!

pub mod config;
pub mod inventory;
pub mod power;
pub mod simulator;
pub mod splitter;
pub mod topology;
pub mod types;
pub mod workspace;

// Top-level re-exports (appear under Crate Items → Structs)
#[doc(inline)]
pub use crate::{
    config::{SimulatorConfig, StorageKeys},
    inventory::{InventoryLink, InventorySnapshot, OltCandidate, OnuCandidate},
    power::{
        BudgetReport, LinkQuality, LossModel, OnuBudget, PowerMap, budget_report, classify,
        compute_power_map, compute_power_map_with,
    },
    simulator::Simulator,
    splitter::{CatalogEntry, SplitterCategory, SplitterLoss, SplitterProps},
    topology::{
        Connection, LinkRequest, Node, NodeKind, NodeType, Port, PortRole, Position, Topology,
    },
    types::{
        errors::{
            CatalogError, ConfigError, LinkRejection, StorageError, TopologyError, WorkspaceError,
        },
        ids::{ConnectionId, DiagramId, NodeId},
        settings::DiagramSettings,
    },
    workspace::{Diagram, MemoryStorage, Storage, Workspace},
};

#[cfg(feature = "fs")]
#[doc(inline)]
pub use crate::workspace::FileStorage;
