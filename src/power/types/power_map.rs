use std::collections::HashMap;

use crate::topology::types::connection::Port;
use crate::types::ids::{ConnectionId, NodeId};

/// Optical power computed for one diagram.
///
/// Holds the power (dBm) at every reached port, the power arriving at the far end of every
/// reached connection, and the received power of every reached ONU. Anything the OLT cannot
/// reach is simply absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PowerMap {
    ports: HashMap<(NodeId, Port), f64>,
    links: HashMap<ConnectionId, f64>,
    received: HashMap<NodeId, f64>,
}

impl PowerMap {
    /// Power at `port` of `node_id` (dBm).
    pub fn port_power(&self, node_id: NodeId, port: Port) -> Option<f64> {
        self.ports.get(&(node_id, port)).copied()
    }

    /// Power arriving at the destination end of a connection (dBm).
    pub fn link_power(&self, connection_id: ConnectionId) -> Option<f64> {
        self.links.get(&connection_id).copied()
    }

    /// Received power of an ONU (dBm). `None` when the ONU is not reachable from the OLT.
    pub fn received_power(&self, node_id: NodeId) -> Option<f64> {
        self.received.get(&node_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Number of ports with a recorded power.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn iter_ports(&self) -> impl Iterator<Item = (NodeId, Port, f64)> + '_ {
        self.ports
            .iter()
            .map(|(&(node_id, port), &power)| (node_id, port, power))
    }

    pub(crate) fn record_port(&mut self, node_id: NodeId, port: Port, power: f64) {
        self.ports.insert((node_id, port), power);
    }

    pub(crate) fn record_link(&mut self, connection_id: ConnectionId, power: f64) {
        self.links.insert(connection_id, power);
    }

    pub(crate) fn record_received(&mut self, node_id: NodeId, power: f64) {
        self.received.insert(node_id, power);
    }
}
