use std::io;
use thiserror::Error;

use crate::topology::types::{connection::PortRole, node::NodeType};
use crate::types::ids::{ConnectionId, DiagramId, NodeId};

/// Errors produced by the splitter catalog.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("Unknown splitter type '{name}'")]
    UnknownSplitterType { name: String },
}

/// Reasons a candidate connection is refused by the connectivity validator.
///
/// A rejected link never changes the topology.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkRejection {
    #[error("Node not found for id {node_id}")]
    UnknownNode { node_id: NodeId },
    #[error("Expected an {expected:?} port, got an {found:?} port")]
    PortRole { expected: PortRole, found: PortRole },
    #[error("{from} cannot feed {to}")]
    IllegalPair { from: NodeType, to: NodeType },
    #[error("{role:?} port {index} does not exist on node {node_id} ({available} available)")]
    PortOutOfRange {
        node_id: NodeId,
        role: PortRole,
        index: usize,
        available: usize,
    },
    #[error("An identical connection already exists")]
    Duplicate,
    #[error("Input port {index} of node {node_id} already has an incoming connection")]
    InputOccupied { node_id: NodeId, index: usize },
    #[error("Connection would close a loop back to node {node_id}")]
    WouldCycle { node_id: NodeId },
}

/// Errors returned by mutations on a [`Topology`](crate::Topology).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("Node not found for id {node_id}")]
    NodeMissing { node_id: NodeId },
    #[error("Node id {node_id} is used more than once")]
    DuplicateNode { node_id: NodeId },
    #[error("Connection not found for id {connection_id}")]
    ConnectionMissing { connection_id: ConnectionId },
    #[error("Connection id {connection_id} is used more than once")]
    DuplicateConnection { connection_id: ConnectionId },
    #[error("A diagram can only hold one OLT")]
    SecondOlt,
    #[error("Node {node_id} is a {found}, expected a {expected}")]
    WrongNodeType {
        node_id: NodeId,
        expected: NodeType,
        found: NodeType,
    },
    #[error("Floor {floor} does not exist (building has {total_floors} floors)")]
    FloorOutOfRange { floor: usize, total_floors: usize },
    #[error("Unit {unit} does not exist (each floor has {units_per_floor} units)")]
    UnitOutOfRange { unit: usize, units_per_floor: usize },
    #[error("Value must be a finite number")]
    NotFinite,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Link(#[from] LinkRejection),
}

/// Errors produced by workspace storage back-ends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directories for '{path}'. \nError: {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while writing '{path}'. \nError: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to remove '{path}'. \nError: {source}")]
    Remove {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Errors returned while loading, saving or editing a [`Workspace`](crate::Workspace).
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Malformed workspace data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Diagram not found for id {diagram_id}")]
    DiagramMissing { diagram_id: DiagramId },
    #[error("Unsupported workspace format version {version}")]
    UnsupportedVersion { version: u32 },
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Errors produced while loading a [`SimulatorConfig`](crate::SimulatorConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Not a valid .json config file: {path}")]
    InvalidExtension { path: String },
    #[error("Failed to open '{path}'. \nError: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Invalid config '{path}'. \nError: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
