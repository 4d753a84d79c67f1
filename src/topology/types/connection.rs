use serde::{Deserialize, Serialize};

use crate::types::ids::{ConnectionId, NodeId};

/// Direction of a port relative to its node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortRole {
    Input,
    Output,
}

/// A port on a node: role plus 0-based index within that role.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    #[serde(rename = "type")]
    pub role: PortRole,
    pub index: usize,
}

impl Port {
    pub fn input(index: usize) -> Self {
        Port {
            role: PortRole::Input,
            index,
        }
    }

    pub fn output(index: usize) -> Self {
        Port {
            role: PortRole::Output,
            index,
        }
    }
}

/// Directed cable from an output port to an input port.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub from_node_id: NodeId,
    pub from_port: Port,
    pub to_node_id: NodeId,
    pub to_port: Port,
    /// Cable length (meters).
    #[serde(default)]
    pub cable_length_meters: f64,
    /// Mated connector pairs along the cable.
    #[serde(default)]
    pub connector_count: u32,
}

impl Connection {
    /// True when `node_id` is either end of this connection.
    pub fn involves(&self, node_id: NodeId) -> bool {
        self.from_node_id == node_id || self.to_node_id == node_id
    }

    /// True when this connection starts at `(node_id, port)`.
    pub fn starts_at(&self, node_id: NodeId, port: Port) -> bool {
        self.from_node_id == node_id && self.from_port == port
    }

    pub(crate) fn same_endpoints(&self, request: &LinkRequest) -> bool {
        self.from_node_id == request.from_node_id
            && self.from_port == request.from_port
            && self.to_node_id == request.to_node_id
            && self.to_port == request.to_port
    }
}

/// A connection the caller would like to create.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkRequest {
    pub from_node_id: NodeId,
    pub from_port: Port,
    pub to_node_id: NodeId,
    pub to_port: Port,
    pub cable_length_meters: f64,
    pub connector_count: u32,
}

impl LinkRequest {
    /// Links output `from_index` of `from` to input `to_index` of `to`, with no cable loss.
    pub fn new(from: NodeId, from_index: usize, to: NodeId, to_index: usize) -> Self {
        LinkRequest {
            from_node_id: from,
            from_port: Port::output(from_index),
            to_node_id: to,
            to_port: Port::input(to_index),
            cable_length_meters: 0.0,
            connector_count: 0,
        }
    }

    /// Sets the cable length (meters) and the connector count.
    pub fn cable(mut self, length_meters: f64, connector_count: u32) -> Self {
        self.cable_length_meters = length_meters;
        self.connector_count = connector_count;
        self
    }

    pub(crate) fn from_connection(connection: &Connection) -> Self {
        LinkRequest {
            from_node_id: connection.from_node_id,
            from_port: connection.from_port,
            to_node_id: connection.to_node_id,
            to_port: connection.to_port,
            cable_length_meters: connection.cable_length_meters,
            connector_count: connection.connector_count,
        }
    }
}
