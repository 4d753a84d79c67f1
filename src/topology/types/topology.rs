//! Topology store (SlotMap-backed).
//!
//! Holds the nodes and connections of one diagram. Storage uses **SlotMap** arenas with stable
//! keys ([`NodeKey`], [`ConnectionKey`]); public iteration follows insertion-order vectors via
//! `iter_nodes()` and `iter_connections()`. Lookups by persistent id and by occupied input port
//! are O(1).
//!
//! Every mutation either succeeds completely or leaves the store untouched. New connections go
//! through [`validate::check_link`], so the store always satisfies the wiring rules:
//! legal type pairs, fan-in of one per input port, no duplicate links and no loops.

use slotmap::{SlotMap, new_key_type};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

use crate::inventory::types::candidate::InventoryLink;
use crate::splitter::types::splitter::SplitterProps;
use crate::topology::types::{
    connection::{Connection, LinkRequest, Port},
    node::{Node, NodeKind, NodeType, Position},
};
use crate::topology::validate;
use crate::types::errors::TopologyError;
use crate::types::ids::{ConnectionId, NodeId};

// --- Stable keys (SlotMap) ---
new_key_type! { pub struct NodeKey; }
new_key_type! { pub struct ConnectionKey; }

/// In-memory node/connection graph of one diagram.
#[derive(Default, Clone, Debug)]
pub struct Topology {
    // --- Main storage (stable-key maps) ---
    nodes: SlotMap<NodeKey, Node>,
    connections: SlotMap<ConnectionKey, Connection>,

    // --- Order "views" ---
    nodes_order: Vec<NodeKey>,
    connections_order: Vec<ConnectionKey>,

    // --- Lookups ---
    node_key_by_id: HashMap<NodeId, NodeKey>,
    conn_key_by_id: HashMap<ConnectionId, ConnectionKey>,
    conn_key_by_input: HashMap<(NodeId, usize), ConnectionKey>, // (to node, input index) → incoming link
}

impl Topology {
    pub fn new() -> Self {
        Topology::default()
    }

    /// Rebuilds a topology from saved node and connection lists.
    ///
    /// Node and connection ids must be unique. Connections that break the wiring rules are
    /// dropped with a warning; negative or non-finite cable lengths are reset to 0 m; a second
    /// OLT is kept, also with a warning.
    pub fn from_parts(
        nodes: Vec<Node>,
        connections: Vec<Connection>,
    ) -> Result<Topology, TopologyError> {
        let mut topology: Topology = Topology::default();

        for node in nodes {
            if topology.node_key_by_id.contains_key(&node.id) {
                return Err(TopologyError::DuplicateNode { node_id: node.id });
            }
            if node.node_type() == NodeType::Olt && topology.olt().is_some() {
                warn!(node = %node.id, "restored diagram holds more than one OLT");
            }
            topology.push_node(node);
        }

        for mut connection in connections {
            if topology.conn_key_by_id.contains_key(&connection.id) {
                return Err(TopologyError::DuplicateConnection {
                    connection_id: connection.id,
                });
            }
            let request: LinkRequest = LinkRequest::from_connection(&connection);
            match validate::check_link(&topology, &request) {
                Ok(()) => {
                    let length: f64 = connection.cable_length_meters;
                    if !length.is_finite() || length < 0.0 {
                        warn!(connection = %connection.id, length, "restored cable length reset to 0 m");
                        connection.cable_length_meters = 0.0;
                    }
                    topology.push_connection(connection);
                }
                Err(reason) => {
                    warn!(connection = %connection.id, %reason, "dropping invalid restored connection");
                }
            }
        }

        Ok(topology)
    }

    /// Node and connection lists in insertion order, ready to be saved.
    pub fn to_parts(&self) -> (Vec<Node>, Vec<Connection>) {
        (
            self.iter_nodes().cloned().collect(),
            self.iter_connections().cloned().collect(),
        )
    }

    // --------- Nodes --------
    /// Places a new node and returns its id.
    ///
    /// A diagram holds at most one OLT; adding a second returns [`TopologyError::SecondOlt`].
    pub fn add_node(
        &mut self,
        name: &str,
        position: Position,
        kind: NodeKind,
    ) -> Result<NodeId, TopologyError> {
        self.insert_node(Node {
            id: NodeId::new(),
            name: name.to_string(),
            position,
            kind,
        })
    }

    /// Inserts a fully built node, keeping its id.
    pub fn insert_node(&mut self, node: Node) -> Result<NodeId, TopologyError> {
        if self.node_key_by_id.contains_key(&node.id) {
            return Err(TopologyError::DuplicateNode { node_id: node.id });
        }
        if node.node_type() == NodeType::Olt && self.olt().is_some() {
            return Err(TopologyError::SecondOlt);
        }
        Ok(self.push_node(node))
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id: NodeId = node.id;
        let key: NodeKey = self.nodes.insert(node);
        self.nodes_order.push(key);
        self.node_key_by_id.insert(id, key);
        id
    }

    /// Deletes a node together with every connection that references it.
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<Node, TopologyError> {
        let key: NodeKey = self
            .node_key_by_id
            .remove(&node_id)
            .ok_or(TopologyError::NodeMissing { node_id })?;

        let attached: Vec<ConnectionKey> = self
            .connections_order
            .iter()
            .copied()
            .filter(|&ck| self.connections[ck].involves(node_id))
            .collect();
        for ck in attached {
            self.remove_connection_key(ck);
        }

        self.nodes_order.retain(|&k| k != key);
        self.nodes
            .remove(key)
            .ok_or(TopologyError::NodeMissing { node_id })
    }

    pub fn get_node(&self, node_id: NodeId) -> Option<&Node> {
        let key: NodeKey = *self.node_key_by_id.get(&node_id)?;
        self.nodes.get(key)
    }

    fn node_mut(&mut self, node_id: NodeId) -> Result<&mut Node, TopologyError> {
        self.node_key_by_id
            .get(&node_id)
            .and_then(|&key| self.nodes.get_mut(key))
            .ok_or(TopologyError::NodeMissing { node_id })
    }

    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.node_key_by_id.contains_key(&node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes_order.len()
    }

    /// Nodes in insertion order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes_order.iter().filter_map(|&k| self.nodes.get(k))
    }

    /// Nodes of one type, in insertion order.
    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> + '_ {
        self.iter_nodes()
            .filter(move |node| node.node_type() == node_type)
    }

    /// The diagram's OLT, if one has been placed.
    pub fn olt(&self) -> Option<&Node> {
        self.nodes_of_type(NodeType::Olt).next()
    }

    pub fn rename_node(&mut self, node_id: NodeId, name: &str) -> Result<(), TopologyError> {
        self.node_mut(node_id)?.name = name.to_string();
        Ok(())
    }

    pub fn move_node(&mut self, node_id: NodeId, position: Position) -> Result<(), TopologyError> {
        self.node_mut(node_id)?.position = position;
        Ok(())
    }

    /// Changes the number of PON ports of an OLT. Links on removed ports are deleted.
    pub fn set_olt_ports(&mut self, node_id: NodeId, pon_ports: usize) -> Result<(), TopologyError> {
        let node: &mut Node = self.node_mut(node_id)?;
        match &mut node.kind {
            NodeKind::Olt(olt) => olt.pon_ports = pon_ports,
            other => return Err(wrong_type(node_id, NodeType::Olt, other)),
        }
        self.prune_outputs(node_id, pon_ports);
        Ok(())
    }

    /// Sets the transmit power recorded on the OLT node(s).
    pub fn set_olt_power(&mut self, power: f64) -> Result<(), TopologyError> {
        if !power.is_finite() {
            return Err(TopologyError::NotFinite);
        }
        for node in self.nodes.values_mut() {
            if let NodeKind::Olt(olt) = &mut node.kind {
                olt.power = power;
            }
        }
        Ok(())
    }

    /// Changes a splitter's catalog type. Port count and losses follow the new type; links on
    /// output ports the new type does not have are deleted.
    pub fn set_splitter_type(
        &mut self,
        node_id: NodeId,
        splitter_type: &str,
    ) -> Result<(), TopologyError> {
        let node: &mut Node = self.node_mut(node_id)?;
        let ports: usize = match &mut node.kind {
            NodeKind::Splitter(splitter) => {
                *splitter = SplitterProps::new(splitter_type)?;
                splitter.output_ports()
            }
            other => return Err(wrong_type(node_id, NodeType::Splitter, other)),
        };
        self.prune_outputs(node_id, ports);
        Ok(())
    }

    /// Sets the recorded ONU distance. Negative values are clamped to zero.
    pub fn set_onu_distance(&mut self, node_id: NodeId, meters: f64) -> Result<(), TopologyError> {
        if !meters.is_finite() {
            return Err(TopologyError::NotFinite);
        }
        let node: &mut Node = self.node_mut(node_id)?;
        match &mut node.kind {
            NodeKind::Onu(onu) => onu.distance_meters = meters.max(0.0),
            other => return Err(wrong_type(node_id, NodeType::Onu, other)),
        }
        Ok(())
    }

    /// Sets or clears an ONU's own receiver sensitivity.
    pub fn set_onu_sensitivity(
        &mut self,
        node_id: NodeId,
        sensitivity_dbm: Option<f64>,
    ) -> Result<(), TopologyError> {
        if sensitivity_dbm.is_some_and(|value| !value.is_finite()) {
            return Err(TopologyError::NotFinite);
        }
        let node: &mut Node = self.node_mut(node_id)?;
        match &mut node.kind {
            NodeKind::Onu(onu) => onu.sensitivity_dbm = sensitivity_dbm,
            other => return Err(wrong_type(node_id, NodeType::Onu, other)),
        }
        Ok(())
    }

    /// Attaches (or detaches) an inventory device to an ONU.
    pub fn link_onu_inventory(
        &mut self,
        node_id: NodeId,
        inventory: Option<InventoryLink>,
    ) -> Result<(), TopologyError> {
        let node: &mut Node = self.node_mut(node_id)?;
        match &mut node.kind {
            NodeKind::Onu(onu) => onu.inventory = inventory,
            other => return Err(wrong_type(node_id, NodeType::Onu, other)),
        }
        Ok(())
    }

    /// Changes a switch's port count. Links on removed ports are deleted.
    pub fn set_switch_ports(&mut self, node_id: NodeId, port_count: usize) -> Result<(), TopologyError> {
        let node: &mut Node = self.node_mut(node_id)?;
        match &mut node.kind {
            NodeKind::Switch(switch) => switch.port_count = port_count,
            other => return Err(wrong_type(node_id, NodeType::Switch, other)),
        }
        self.prune_outputs(node_id, port_count);
        Ok(())
    }

    pub fn set_building_floors(
        &mut self,
        node_id: NodeId,
        total_floors: usize,
    ) -> Result<(), TopologyError> {
        let node: &mut Node = self.node_mut(node_id)?;
        match &mut node.kind {
            NodeKind::Building(building) => building.set_total_floors(total_floors),
            other => return Err(wrong_type(node_id, NodeType::Building, other)),
        }
        Ok(())
    }

    /// Sets the occupant label of one unit slot. See [`BuildingProps::set_occupant`](crate::topology::types::node::BuildingProps::set_occupant).
    pub fn set_unit_occupant(
        &mut self,
        node_id: NodeId,
        floor: usize,
        unit: usize,
        occupant: Option<&str>,
    ) -> Result<(), TopologyError> {
        let node: &mut Node = self.node_mut(node_id)?;
        match &mut node.kind {
            NodeKind::Building(building) => building.set_occupant(floor, unit, occupant),
            other => Err(wrong_type(node_id, NodeType::Building, other)),
        }
    }

    // ------------- Connections ------------
    /// Validates and creates a connection. Returns the new connection's id.
    ///
    /// # Errors
    /// [`TopologyError::Link`] with the validator's reason; the store is unchanged.
    /// [`TopologyError::NotFinite`] for a non-finite cable length.
    pub fn connect(&mut self, request: LinkRequest) -> Result<ConnectionId, TopologyError> {
        if !request.cable_length_meters.is_finite() {
            return Err(TopologyError::NotFinite);
        }
        if let Err(reason) = validate::check_link(self, &request) {
            debug!(%reason, "link not created");
            return Err(reason.into());
        }
        Ok(self.push_connection(Connection {
            id: ConnectionId::new(),
            from_node_id: request.from_node_id,
            from_port: request.from_port,
            to_node_id: request.to_node_id,
            to_port: request.to_port,
            cable_length_meters: request.cable_length_meters.max(0.0),
            connector_count: request.connector_count,
        }))
    }

    fn push_connection(&mut self, connection: Connection) -> ConnectionId {
        let id: ConnectionId = connection.id;
        let input: (NodeId, usize) = (connection.to_node_id, connection.to_port.index);
        let key: ConnectionKey = self.connections.insert(connection);
        self.connections_order.push(key);
        self.conn_key_by_id.insert(id, key);
        self.conn_key_by_input.insert(input, key);
        id
    }

    /// Deletes one connection.
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Result<Connection, TopologyError> {
        let key: ConnectionKey = *self
            .conn_key_by_id
            .get(&connection_id)
            .ok_or(TopologyError::ConnectionMissing { connection_id })?;
        self.remove_connection_key(key)
            .ok_or(TopologyError::ConnectionMissing { connection_id })
    }

    fn remove_connection_key(&mut self, key: ConnectionKey) -> Option<Connection> {
        let connection: Connection = self.connections.remove(key)?;
        self.connections_order.retain(|&k| k != key);
        self.conn_key_by_id.remove(&connection.id);
        self.conn_key_by_input
            .remove(&(connection.to_node_id, connection.to_port.index));
        Some(connection)
    }

    // Deletes links sourced at output ports `>= keep` of `node_id`.
    fn prune_outputs(&mut self, node_id: NodeId, keep: usize) {
        let stale: Vec<ConnectionKey> = self
            .connections_order
            .iter()
            .copied()
            .filter(|&ck| {
                let connection: &Connection = &self.connections[ck];
                connection.from_node_id == node_id && connection.from_port.index >= keep
            })
            .collect();
        if !stale.is_empty() {
            debug!(node = %node_id, removed = stale.len(), "deleted links on removed output ports");
        }
        for ck in stale {
            self.remove_connection_key(ck);
        }
    }

    pub fn get_connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        let key: ConnectionKey = *self.conn_key_by_id.get(&connection_id)?;
        self.connections.get(key)
    }

    fn connection_mut(&mut self, connection_id: ConnectionId) -> Result<&mut Connection, TopologyError> {
        self.conn_key_by_id
            .get(&connection_id)
            .and_then(|&key| self.connections.get_mut(key))
            .ok_or(TopologyError::ConnectionMissing { connection_id })
    }

    pub fn connection_count(&self) -> usize {
        self.connections_order.len()
    }

    /// Connections in insertion order.
    pub fn iter_connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.connections_order
            .iter()
            .filter_map(|&k| self.connections.get(k))
    }

    /// Connections sourced at output `port` of `node_id`, in insertion order.
    pub fn connections_from(
        &self,
        node_id: NodeId,
        port: Port,
    ) -> impl Iterator<Item = &Connection> + '_ {
        self.iter_connections()
            .filter(move |connection| connection.starts_at(node_id, port))
    }

    /// Connections touching `node_id` on either side.
    pub fn connections_of(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> + '_ {
        self.iter_connections()
            .filter(move |connection| connection.involves(node_id))
    }

    /// The connection terminating at input `index` of `node_id`, if any.
    pub fn incoming(&self, node_id: NodeId, index: usize) -> Option<&Connection> {
        let key: ConnectionKey = *self.conn_key_by_input.get(&(node_id, index))?;
        self.connections.get(key)
    }

    /// Sets a cable's length. Negative values are clamped to zero.
    pub fn set_cable_length(
        &mut self,
        connection_id: ConnectionId,
        meters: f64,
    ) -> Result<(), TopologyError> {
        if !meters.is_finite() {
            return Err(TopologyError::NotFinite);
        }
        self.connection_mut(connection_id)?.cable_length_meters = meters.max(0.0);
        Ok(())
    }

    pub fn set_connector_count(
        &mut self,
        connection_id: ConnectionId,
        connector_count: u32,
    ) -> Result<(), TopologyError> {
        self.connection_mut(connection_id)?.connector_count = connector_count;
        Ok(())
    }

    /// True when `target` can be reached from `start` by following connections downstream.
    /// A node always reaches itself.
    pub fn reaches(&self, start: NodeId, target: NodeId) -> bool {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            for connection in self.iter_connections() {
                if connection.from_node_id == current && !visited.contains(&connection.to_node_id) {
                    queue.push_back(connection.to_node_id);
                }
            }
        }
        false
    }
}

fn wrong_type(node_id: NodeId, expected: NodeType, found: &NodeKind) -> TopologyError {
    TopologyError::WrongNodeType {
        node_id,
        expected,
        found: found.node_type(),
    }
}
