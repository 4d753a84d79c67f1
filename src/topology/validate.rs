//! Connectivity rules.
//!
//! Port roles form a small state machine: light leaves the OLT, is divided by splitters,
//! terminates at ONUs, and continues as Ethernet from an ONU through a switch into a building.
//! Only the hops listed in [`LEGAL_LINKS`] can be wired.

use crate::topology::types::{
    connection::{LinkRequest, PortRole},
    node::{Node, NodeType},
    topology::Topology,
};
use crate::types::errors::LinkRejection;

/// `(source type, destination type)` pairs that may be linked, always output → input.
pub const LEGAL_LINKS: [(NodeType, NodeType); 5] = [
    (NodeType::Olt, NodeType::Splitter),
    (NodeType::Splitter, NodeType::Splitter),
    (NodeType::Splitter, NodeType::Onu),
    (NodeType::Onu, NodeType::Switch),
    (NodeType::Switch, NodeType::Building),
];

/// True when an output of a `from` node may feed an input of a `to` node.
pub fn is_legal_pair(from: NodeType, to: NodeType) -> bool {
    LEGAL_LINKS.contains(&(from, to))
}

/// Decides whether `request` may be added to `topology`.
///
/// Checks, in order: both nodes exist, the source port is an output and the destination port
/// an input, the type pair is legal, both port indices exist, the identical link is not already
/// present, the destination input is free, and the link would not close a loop.
pub fn check_link(topology: &Topology, request: &LinkRequest) -> Result<(), LinkRejection> {
    let from: &Node = topology
        .get_node(request.from_node_id)
        .ok_or(LinkRejection::UnknownNode {
            node_id: request.from_node_id,
        })?;
    let to: &Node = topology
        .get_node(request.to_node_id)
        .ok_or(LinkRejection::UnknownNode {
            node_id: request.to_node_id,
        })?;

    if request.from_port.role != PortRole::Output {
        return Err(LinkRejection::PortRole {
            expected: PortRole::Output,
            found: request.from_port.role,
        });
    }
    if request.to_port.role != PortRole::Input {
        return Err(LinkRejection::PortRole {
            expected: PortRole::Input,
            found: request.to_port.role,
        });
    }

    if !is_legal_pair(from.node_type(), to.node_type()) {
        return Err(LinkRejection::IllegalPair {
            from: from.node_type(),
            to: to.node_type(),
        });
    }

    let outputs: usize = from.kind.output_ports();
    if request.from_port.index >= outputs {
        return Err(LinkRejection::PortOutOfRange {
            node_id: from.id,
            role: PortRole::Output,
            index: request.from_port.index,
            available: outputs,
        });
    }
    let inputs: usize = to.kind.input_ports();
    if request.to_port.index >= inputs {
        return Err(LinkRejection::PortOutOfRange {
            node_id: to.id,
            role: PortRole::Input,
            index: request.to_port.index,
            available: inputs,
        });
    }

    if topology
        .iter_connections()
        .any(|connection| connection.same_endpoints(request))
    {
        return Err(LinkRejection::Duplicate);
    }

    if topology.incoming(to.id, request.to_port.index).is_some() {
        return Err(LinkRejection::InputOccupied {
            node_id: to.id,
            index: request.to_port.index,
        });
    }

    // the new edge from → to closes a loop iff `to` already reaches `from`
    if topology.reaches(to.id, from.id) {
        return Err(LinkRejection::WouldCycle { node_id: from.id });
    }

    Ok(())
}
