//! # topology
//!
//! Typed node/connection graph of a PON diagram and the rules that decide which ports may be
//! wired together.
//! Build a [`Topology`] with `add_node(...)` and `connect(...)`; every link is checked by
//! [`validate::check_link`] before it is stored.

pub mod types;
pub mod validate;

pub use types::connection::{Connection, LinkRequest, Port, PortRole};
pub use types::node::{
    BuildingProps, Floor, Node, NodeKind, NodeType, OltProps, OnuProps, Position, SwitchProps,
    UNITS_PER_FLOOR, Unit,
};
pub use types::topology::{ConnectionKey, NodeKey, Topology};
