//! Breadth-first power propagation.

use std::collections::{HashSet, VecDeque};
use tracing::warn;

use crate::power::types::{loss::LossModel, power_map::PowerMap};
use crate::topology::types::{
    connection::{Connection, Port},
    node::{Node, NodeKind, NodeType},
    topology::Topology,
};
use crate::types::ids::{ConnectionId, NodeId};
use crate::types::settings::DiagramSettings;

/// Computes the power map of a diagram with the default [`LossModel`].
///
/// See [`compute_power_map_with`].
pub fn compute_power_map(topology: &Topology, settings: &DiagramSettings) -> PowerMap {
    compute_power_map_with(topology, settings, &LossModel::default())
}

/// Computes the optical power at every port reachable from the diagram's OLT.
///
/// Every OLT output port transmits `settings.olt_power`. Each connection subtracts its fiber and
/// connector losses; each splitter subtracts the insertion loss of the output port the light
/// leaves through; ONUs record what they receive and stop the walk. Switches and buildings
/// carry Ethernet only and are never reached optically.
///
/// Returns an empty map when the diagram has no OLT. Every connection is walked at most once.
pub fn compute_power_map_with(
    topology: &Topology,
    settings: &DiagramSettings,
    loss: &LossModel,
) -> PowerMap {
    let mut map: PowerMap = PowerMap::default();

    let mut olts = topology.nodes_of_type(NodeType::Olt);
    let Some(olt) = olts.next() else {
        return map;
    };
    if olts.next().is_some() {
        warn!(olt = %olt.id, "diagram holds more than one OLT, propagating from the first");
    }
    let NodeKind::Olt(olt_props) = &olt.kind else {
        return map;
    };

    let mut queue: VecDeque<(&Connection, f64)> = VecDeque::new();
    let mut walked: HashSet<ConnectionId> = HashSet::new();

    for index in 0..olt_props.pon_ports {
        let port: Port = Port::output(index);
        map.record_port(olt.id, port, settings.olt_power);
        enqueue_from(topology, olt.id, port, settings.olt_power, &mut queue);
    }

    while let Some((connection, power)) = queue.pop_front() {
        if !walked.insert(connection.id) {
            warn!(connection = %connection.id, "connection reached twice, topology contains a loop");
            continue;
        }

        let attenuated: f64 = power - loss.link_loss(connection);
        map.record_link(connection.id, attenuated);
        map.record_port(connection.to_node_id, connection.to_port, attenuated);

        let Some(destination) = topology.get_node(connection.to_node_id) else {
            continue;
        };
        propagate_through(topology, destination, attenuated, &mut map, &mut queue);
    }

    map
}

fn propagate_through<'a>(
    topology: &'a Topology,
    node: &Node,
    input_power: f64,
    map: &mut PowerMap,
    queue: &mut VecDeque<(&'a Connection, f64)>,
) {
    match &node.kind {
        NodeKind::Splitter(splitter) => {
            for index in 0..splitter.output_ports() {
                let port: Port = Port::output(index);
                let output_power: f64 = input_power - splitter.port_loss(index);
                map.record_port(node.id, port, output_power);
                enqueue_from(topology, node.id, port, output_power, queue);
            }
        }
        NodeKind::Onu(_) => map.record_received(node.id, input_power),
        // Ethernet segment and head-end: nothing to propagate optically.
        NodeKind::Olt(_) | NodeKind::Switch(_) | NodeKind::Building(_) => {}
    }
}

fn enqueue_from<'a>(
    topology: &'a Topology,
    node_id: NodeId,
    port: Port,
    power: f64,
    queue: &mut VecDeque<(&'a Connection, f64)>,
) {
    for connection in topology.connections_from(node_id, port) {
        queue.push_back((connection, power));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::types::connection::LinkRequest;
    use crate::topology::types::node::Position;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual: f64 = actual.expect("power not recorded");
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn place(topo: &mut Topology, name: &str, kind: NodeKind) -> NodeId {
        topo.add_node(name, Position::default(), kind).unwrap()
    }

    #[test]
    fn test_worked_example() {
        // OLT 5 dBm → 1:8 PLC → 1000 m, 2 connectors → ONU
        let mut topo: Topology = Topology::new();
        let olt: NodeId = place(&mut topo, "OLT", NodeKind::olt(1, 5.0));
        let splitter: NodeId = place(&mut topo, "SPL", NodeKind::splitter("1:8").unwrap());
        let onu: NodeId = place(&mut topo, "ONU", NodeKind::onu(1000.0));
        topo.connect(LinkRequest::new(olt, 0, splitter, 0)).unwrap();
        let drop_cable = topo
            .connect(LinkRequest::new(splitter, 4, onu, 0).cable(1000.0, 2))
            .unwrap();

        let map: PowerMap = compute_power_map(&topo, &DiagramSettings::default());

        assert_close(map.port_power(olt, Port::output(0)), 5.0);
        assert_close(map.port_power(splitter, Port::input(0)), 5.0);
        assert_close(map.port_power(splitter, Port::output(4)), -5.5);
        assert_close(map.link_power(drop_cable), -6.85);
        assert_close(map.port_power(onu, Port::input(0)), -6.85);
        assert_close(map.received_power(onu), -6.85);
    }

    #[test]
    fn test_asymmetric_splitter_ports_differ() {
        let mut topo: Topology = Topology::new();
        let olt: NodeId = place(&mut topo, "OLT", NodeKind::olt(1, 0.0));
        let splitter: NodeId = place(&mut topo, "FBT", NodeKind::splitter("30/70").unwrap());
        topo.connect(LinkRequest::new(olt, 0, splitter, 0)).unwrap();

        let settings: DiagramSettings = DiagramSettings {
            olt_power: 0.0,
            ..Default::default()
        };
        let map: PowerMap = compute_power_map(&topo, &settings);
        assert_close(map.port_power(splitter, Port::output(0)), -5.2);
        assert_close(map.port_power(splitter, Port::output(1)), -1.5);
    }

    #[test]
    fn test_splitter_loss_is_independent_of_input_power() {
        for entry in crate::splitter::catalog::entries() {
            for input in [-12.0, 0.0, 3.0, 7.5] {
                let mut topo: Topology = Topology::new();
                let olt: NodeId = place(&mut topo, "OLT", NodeKind::olt(1, input));
                let splitter: NodeId =
                    place(&mut topo, "SPL", NodeKind::splitter(entry.name).unwrap());
                topo.connect(LinkRequest::new(olt, 0, splitter, 0)).unwrap();

                let settings: DiagramSettings = DiagramSettings {
                    olt_power: input,
                    ..Default::default()
                };
                let map: PowerMap = compute_power_map(&topo, &settings);
                for port in 0..entry.ports {
                    assert_close(
                        map.port_power(splitter, Port::output(port)),
                        input - entry.port_loss(port),
                    );
                }
            }
        }
    }

    #[test]
    fn test_cascaded_splitters_and_custom_loss_model() {
        let mut topo: Topology = Topology::new();
        let olt: NodeId = place(&mut topo, "OLT", NodeKind::olt(2, 5.0));
        let first: NodeId = place(&mut topo, "SPL-1", NodeKind::splitter("1:4").unwrap());
        let second: NodeId = place(&mut topo, "SPL-2", NodeKind::splitter("10/90").unwrap());
        let onu: NodeId = place(&mut topo, "ONU", NodeKind::onu(2000.0));
        topo.connect(LinkRequest::new(olt, 1, first, 0).cable(4000.0, 2))
            .unwrap();
        topo.connect(LinkRequest::new(first, 2, second, 0)).unwrap();
        topo.connect(LinkRequest::new(second, 1, onu, 0).cable(2000.0, 1))
            .unwrap();

        let loss: LossModel = LossModel {
            fiber_loss_db_per_km: 0.4,
            connector_loss_db: 0.3,
        };
        let map: PowerMap = compute_power_map_with(&topo, &DiagramSettings::default(), &loss);
        // 5 - (1.6 + 0.6) - 7.2 - 0.5 - (0.8 + 0.3)
        assert_close(map.received_power(onu), -6.0);
        // OLT port 0 transmits even with nothing attached
        assert_close(map.port_power(olt, Port::output(0)), 5.0);
    }

    #[test]
    fn test_unreachable_and_ethernet_nodes_have_no_power() {
        let mut topo: Topology = Topology::new();
        let olt: NodeId = place(&mut topo, "OLT", NodeKind::olt(1, 5.0));
        let splitter: NodeId = place(&mut topo, "SPL", NodeKind::splitter("1:2").unwrap());
        let fed: NodeId = place(&mut topo, "ONU-1", NodeKind::onu(100.0));
        let orphan: NodeId = place(&mut topo, "ONU-2", NodeKind::onu(100.0));
        let switch: NodeId = place(&mut topo, "SW", NodeKind::switch(4));
        let building: NodeId = place(&mut topo, "BLD", NodeKind::building(2));
        topo.connect(LinkRequest::new(olt, 0, splitter, 0)).unwrap();
        topo.connect(LinkRequest::new(splitter, 0, fed, 0)).unwrap();
        topo.connect(LinkRequest::new(fed, 0, switch, 0)).unwrap();
        topo.connect(LinkRequest::new(switch, 0, building, 0)).unwrap();

        let map: PowerMap = compute_power_map(&topo, &DiagramSettings::default());
        assert!(map.received_power(fed).is_some());
        assert_eq!(map.received_power(orphan), None);
        assert_eq!(map.port_power(switch, Port::input(0)), None);
        assert_eq!(map.port_power(building, Port::input(0)), None);
        assert_eq!(map.port_power(fed, Port::output(0)), None);
    }

    #[test]
    fn test_no_olt_gives_empty_map() {
        let mut topo: Topology = Topology::new();
        let splitter: NodeId = place(&mut topo, "SPL", NodeKind::splitter("1:2").unwrap());
        let onu: NodeId = place(&mut topo, "ONU", NodeKind::onu(10.0));
        topo.connect(LinkRequest::new(splitter, 0, onu, 0)).unwrap();

        let map: PowerMap = compute_power_map(&topo, &DiagramSettings::default());
        assert!(map.is_empty());
        assert_eq!(map.received_power(onu), None);
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let mut topo: Topology = Topology::new();
        let olt: NodeId = place(&mut topo, "OLT", NodeKind::olt(2, 5.0));
        let splitter: NodeId = place(&mut topo, "SPL", NodeKind::splitter("1:16").unwrap());
        topo.connect(LinkRequest::new(olt, 0, splitter, 0).cable(300.0, 2))
            .unwrap();
        for port in 0..6 {
            let onu: NodeId = place(&mut topo, "ONU", NodeKind::onu(50.0 * port as f64));
            topo.connect(LinkRequest::new(splitter, port, onu, 0).cable(50.0 * port as f64, 2))
                .unwrap();
        }

        let settings: DiagramSettings = DiagramSettings::default();
        let first: PowerMap = compute_power_map(&topo, &settings);
        let second: PowerMap = compute_power_map(&topo, &settings);
        assert_eq!(first, second);
        // 2 OLT ports + splitter input + 16 outputs + 6 ONU inputs
        assert_eq!(first.len(), 25);
    }

    #[test]
    fn test_restored_loop_is_dropped_before_propagation() {
        let mut topo: Topology = Topology::new();
        let olt: NodeId = place(&mut topo, "OLT", NodeKind::olt(1, 5.0));
        let a: NodeId = place(&mut topo, "A", NodeKind::splitter("1:2").unwrap());
        let b: NodeId = place(&mut topo, "B", NodeKind::splitter("1:2").unwrap());
        topo.connect(LinkRequest::new(olt, 0, a, 0)).unwrap();
        topo.connect(LinkRequest::new(a, 0, b, 0)).unwrap();

        // b → a closes a loop; only a hand-edited file can contain it
        let (nodes, mut connections) = topo.to_parts();
        connections.push(Connection {
            id: ConnectionId::new(),
            from_node_id: b,
            from_port: Port::output(1),
            to_node_id: a,
            to_port: Port::input(0),
            cable_length_meters: 0.0,
            connector_count: 0,
        });
        let restored: Topology = Topology::from_parts(nodes, connections).unwrap();
        assert_eq!(restored.connection_count(), 2);

        let map: PowerMap = compute_power_map(&restored, &DiagramSettings::default());
        assert_close(map.port_power(a, Port::input(0)), 5.0);
        assert_close(map.port_power(b, Port::output(1)), 5.0 - 3.8 - 3.8);
    }
}
