//! # simulator
//!
//! The live diagram: a [`Topology`] together with its [`DiagramSettings`] and the [`PowerMap`]
//! computed from them. Every accepted edit recomputes the map before returning, so readers
//! never observe stale power values. Rejected edits change nothing.

use tracing::{debug, warn};

use crate::inventory::types::candidate::{InventoryLink, OltCandidate, OnuCandidate};
use crate::power::{
    classify::{LinkQuality, classify},
    propagate::compute_power_map_with,
    report::{BudgetReport, budget_report},
    types::{loss::LossModel, power_map::PowerMap},
};
use crate::topology::types::{
    connection::{Connection, LinkRequest},
    node::{Node, NodeKind, Position},
    topology::Topology,
};
use crate::types::errors::TopologyError;
use crate::types::ids::{ConnectionId, NodeId};
use crate::types::settings::{DiagramSettings, parse_dbm};

/// Topology, settings and power map of the diagram being edited.
#[derive(Clone, Debug)]
pub struct Simulator {
    topology: Topology,
    settings: DiagramSettings,
    loss: LossModel,
    power: PowerMap,
}

impl Default for Simulator {
    fn default() -> Self {
        Simulator::new(DiagramSettings::default(), LossModel::default())
    }
}

impl Simulator {
    /// Empty diagram.
    pub fn new(settings: DiagramSettings, loss: LossModel) -> Self {
        Simulator::from_parts(Topology::new(), settings, loss)
    }

    /// Wraps an existing topology and computes its power map. The OLT node takes the power
    /// from `settings`.
    pub fn from_parts(mut topology: Topology, settings: DiagramSettings, loss: LossModel) -> Self {
        if let Err(err) = topology.set_olt_power(settings.olt_power) {
            warn!(error = %err, "OLT power setting not applied to the OLT node");
        }
        let mut simulator: Simulator = Simulator {
            topology,
            settings,
            loss,
            power: PowerMap::default(),
        };
        simulator.recompute();
        simulator
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn settings(&self) -> &DiagramSettings {
        &self.settings
    }

    pub fn loss(&self) -> &LossModel {
        &self.loss
    }

    pub fn power_map(&self) -> &PowerMap {
        &self.power
    }

    /// Per-ONU budget of the current diagram.
    pub fn report(&self) -> BudgetReport {
        budget_report(&self.topology, &self.settings, &self.power)
    }

    /// Link quality of one ONU. Anything that is not a reachable ONU is [`LinkQuality::Unknown`].
    pub fn quality_of(&self, node_id: NodeId) -> LinkQuality {
        match self.topology.get_node(node_id).map(|node| &node.kind) {
            Some(NodeKind::Onu(onu)) => classify(
                self.power.received_power(node_id),
                onu.effective_sensitivity(self.settings.onu_sensitivity),
            ),
            _ => LinkQuality::Unknown,
        }
    }

    /// Replaces the loss model and recomputes.
    pub fn set_loss_model(&mut self, loss: LossModel) {
        self.loss = loss;
        self.recompute();
    }

    pub fn recompute(&mut self) {
        self.power = compute_power_map_with(&self.topology, &self.settings, &self.loss);
    }

    // Runs one topology edit; recomputes only when it was accepted.
    fn mutate<T>(
        &mut self,
        edit: impl FnOnce(&mut Topology) -> Result<T, TopologyError>,
    ) -> Result<T, TopologyError> {
        match edit(&mut self.topology) {
            Ok(value) => {
                self.recompute();
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "edit rejected");
                Err(err)
            }
        }
    }

    // --------- Nodes --------
    /// Places a node. An OLT always transmits the diagram's `olt_power`, whatever `kind` says.
    pub fn add_node(
        &mut self,
        name: &str,
        position: Position,
        mut kind: NodeKind,
    ) -> Result<NodeId, TopologyError> {
        if let NodeKind::Olt(olt) = &mut kind {
            olt.power = self.settings.olt_power;
        }
        self.mutate(|topology| topology.add_node(name, position, kind))
    }

    /// Places the OLT described by an inventory candidate.
    pub fn add_olt_from_inventory(
        &mut self,
        candidate: &OltCandidate,
        position: Position,
    ) -> Result<NodeId, TopologyError> {
        let kind: NodeKind = candidate.to_node_kind(self.settings.olt_power);
        self.add_node(&candidate.name, position, kind)
    }

    /// Places an ONU pre-filled from an inventory candidate.
    pub fn add_onu_from_inventory(
        &mut self,
        candidate: &OnuCandidate,
        position: Position,
    ) -> Result<NodeId, TopologyError> {
        self.add_node(&candidate.display_name(), position, candidate.to_node_kind())
    }

    pub fn remove_node(&mut self, node_id: NodeId) -> Result<Node, TopologyError> {
        self.mutate(|topology| topology.remove_node(node_id))
    }

    pub fn rename_node(&mut self, node_id: NodeId, name: &str) -> Result<(), TopologyError> {
        self.mutate(|topology| topology.rename_node(node_id, name))
    }

    pub fn move_node(&mut self, node_id: NodeId, position: Position) -> Result<(), TopologyError> {
        self.mutate(|topology| topology.move_node(node_id, position))
    }

    pub fn set_olt_ports(&mut self, node_id: NodeId, pon_ports: usize) -> Result<(), TopologyError> {
        self.mutate(|topology| topology.set_olt_ports(node_id, pon_ports))
    }

    pub fn set_splitter_type(
        &mut self,
        node_id: NodeId,
        splitter_type: &str,
    ) -> Result<(), TopologyError> {
        self.mutate(|topology| topology.set_splitter_type(node_id, splitter_type))
    }

    pub fn set_onu_distance(&mut self, node_id: NodeId, meters: f64) -> Result<(), TopologyError> {
        self.mutate(|topology| topology.set_onu_distance(node_id, meters))
    }

    pub fn set_onu_sensitivity(
        &mut self,
        node_id: NodeId,
        sensitivity_dbm: Option<f64>,
    ) -> Result<(), TopologyError> {
        self.mutate(|topology| topology.set_onu_sensitivity(node_id, sensitivity_dbm))
    }

    pub fn link_onu_inventory(
        &mut self,
        node_id: NodeId,
        inventory: Option<InventoryLink>,
    ) -> Result<(), TopologyError> {
        self.mutate(|topology| topology.link_onu_inventory(node_id, inventory))
    }

    pub fn set_switch_ports(&mut self, node_id: NodeId, port_count: usize) -> Result<(), TopologyError> {
        self.mutate(|topology| topology.set_switch_ports(node_id, port_count))
    }

    pub fn set_building_floors(
        &mut self,
        node_id: NodeId,
        total_floors: usize,
    ) -> Result<(), TopologyError> {
        self.mutate(|topology| topology.set_building_floors(node_id, total_floors))
    }

    pub fn set_unit_occupant(
        &mut self,
        node_id: NodeId,
        floor: usize,
        unit: usize,
        occupant: Option<&str>,
    ) -> Result<(), TopologyError> {
        self.mutate(|topology| topology.set_unit_occupant(node_id, floor, unit, occupant))
    }

    // ------------- Connections ------------
    pub fn connect(&mut self, request: LinkRequest) -> Result<ConnectionId, TopologyError> {
        self.mutate(|topology| topology.connect(request))
    }

    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Result<Connection, TopologyError> {
        self.mutate(|topology| topology.disconnect(connection_id))
    }

    pub fn set_cable_length(
        &mut self,
        connection_id: ConnectionId,
        meters: f64,
    ) -> Result<(), TopologyError> {
        self.mutate(|topology| topology.set_cable_length(connection_id, meters))
    }

    pub fn set_connector_count(
        &mut self,
        connection_id: ConnectionId,
        connector_count: u32,
    ) -> Result<(), TopologyError> {
        self.mutate(|topology| topology.set_connector_count(connection_id, connector_count))
    }

    // ------------- Settings ------------
    /// Sets the diagram's OLT transmit power and mirrors it onto the OLT node.
    pub fn set_olt_power(&mut self, power: f64) -> Result<(), TopologyError> {
        self.topology.set_olt_power(power)?;
        self.settings.olt_power = power;
        self.recompute();
        Ok(())
    }

    /// Sets the OLT power from raw user text. Malformed input keeps the last valid value and
    /// returns `false`.
    pub fn set_olt_power_input(&mut self, input: &str) -> bool {
        match parse_dbm(input) {
            Some(power) => self.set_olt_power(power).is_ok(),
            None => {
                debug!(input, "ignoring malformed OLT power");
                false
            }
        }
    }

    /// Sets the sensitivity used by ONUs without their own threshold.
    pub fn set_onu_sensitivity_default(&mut self, sensitivity_dbm: f64) -> Result<(), TopologyError> {
        if !sensitivity_dbm.is_finite() {
            return Err(TopologyError::NotFinite);
        }
        self.settings.onu_sensitivity = sensitivity_dbm;
        self.recompute();
        Ok(())
    }

    /// Raw-text variant of [`set_onu_sensitivity_default`](Self::set_onu_sensitivity_default).
    pub fn set_onu_sensitivity_input(&mut self, input: &str) -> bool {
        if !self.settings.set_onu_sensitivity_input(input) {
            debug!(input, "ignoring malformed ONU sensitivity");
            return false;
        }
        self.recompute();
        true
    }

    /// Hands the topology and settings back, e.g. to store them in a diagram record.
    pub fn into_parts(self) -> (Topology, DiagramSettings) {
        (self.topology, self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::types::connection::Port;
    use crate::types::errors::LinkRejection;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual: f64 = actual.expect("power not recorded");
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    // OLT → 1:8 → ONU over 1000 m with 2 connectors
    fn worked_example() -> (Simulator, NodeId, NodeId, ConnectionId) {
        let mut sim: Simulator = Simulator::default();
        let olt: NodeId = sim
            .add_node("OLT", Position::new(0.0, 0.0), NodeKind::olt(1, 0.0))
            .unwrap();
        let splitter: NodeId = sim
            .add_node("SPL", Position::new(100.0, 0.0), NodeKind::splitter("1:8").unwrap())
            .unwrap();
        let onu: NodeId = sim
            .add_node("ONU", Position::new(200.0, 0.0), NodeKind::onu(1000.0))
            .unwrap();
        sim.connect(LinkRequest::new(olt, 0, splitter, 0)).unwrap();
        let drop_cable: ConnectionId = sim
            .connect(LinkRequest::new(splitter, 0, onu, 0).cable(1000.0, 2))
            .unwrap();
        (sim, olt, onu, drop_cable)
    }

    #[test]
    fn test_mutations_recompute_power() {
        let (mut sim, olt, onu, drop_cable) = worked_example();
        assert_close(sim.power_map().received_power(onu), -6.85);
        assert_eq!(sim.quality_of(onu), LinkQuality::Good);

        // OLT node mirrors the diagram setting, not the value passed at creation
        let NodeKind::Olt(props) = &sim.topology().get_node(olt).unwrap().kind else {
            panic!("expected an OLT");
        };
        assert_eq!(props.power, 5.0);

        sim.set_cable_length(drop_cable, 3000.0).unwrap();
        assert_close(sim.power_map().received_power(onu), -7.55);

        sim.set_connector_count(drop_cable, 0).unwrap();
        assert_close(sim.power_map().received_power(onu), -6.55);

        sim.disconnect(drop_cable).unwrap();
        assert_eq!(sim.power_map().received_power(onu), None);
        assert_eq!(sim.quality_of(onu), LinkQuality::Unknown);
    }

    #[test]
    fn test_settings_changes() {
        let (mut sim, olt, onu, _) = worked_example();

        sim.set_olt_power(-15.0).unwrap();
        assert_close(sim.power_map().port_power(olt, Port::output(0)), -15.0);
        assert_close(sim.power_map().received_power(onu), -26.85);
        assert_eq!(sim.quality_of(onu), LinkQuality::Marginal);
        let NodeKind::Olt(props) = &sim.topology().get_node(olt).unwrap().kind else {
            panic!("expected an OLT");
        };
        assert_eq!(props.power, -15.0);

        sim.set_onu_sensitivity_default(-25.0).unwrap();
        assert_eq!(sim.quality_of(onu), LinkQuality::Fail);

        sim.set_onu_sensitivity(onu, Some(-32.0)).unwrap();
        assert_eq!(sim.quality_of(onu), LinkQuality::Good);
        assert_eq!(sim.report().onus[0].sensitivity_dbm, -32.0);
    }

    #[test]
    fn test_malformed_input_keeps_last_valid_value() {
        let (mut sim, _, onu, _) = worked_example();

        assert!(!sim.set_olt_power_input("abc"));
        assert!(!sim.set_olt_power_input("NaN"));
        assert!(!sim.set_olt_power_input(""));
        assert_eq!(sim.settings().olt_power, 5.0);

        assert!(sim.set_olt_power_input(" 3.5 "));
        assert_eq!(sim.settings().olt_power, 3.5);
        assert!(!sim.set_olt_power_input("inf"));
        assert_eq!(sim.settings().olt_power, 3.5);
        assert_close(sim.power_map().received_power(onu), -8.35);

        assert!(!sim.set_onu_sensitivity_input("-28 dBm"));
        assert_eq!(sim.settings().onu_sensitivity, -28.0);
        assert!(sim.set_onu_sensitivity_input("-20"));
        assert_eq!(sim.quality_of(onu), LinkQuality::Good);
        assert!(sim.set_onu_sensitivity_input("-9"));
        assert_eq!(sim.quality_of(onu), LinkQuality::Marginal);

        assert_eq!(sim.set_olt_power(f64::NAN), Err(TopologyError::NotFinite));
    }

    #[test]
    fn test_rejected_edit_changes_nothing() {
        let (mut sim, olt, onu, _) = worked_example();
        let before: PowerMap = sim.power_map().clone();

        let result = sim.connect(LinkRequest::new(olt, 0, onu, 0));
        assert_eq!(
            result,
            Err(TopologyError::Link(LinkRejection::IllegalPair {
                from: crate::topology::types::node::NodeType::Olt,
                to: crate::topology::types::node::NodeType::Onu,
            }))
        );
        assert_eq!(sim.power_map(), &before);
        assert_eq!(sim.topology().connection_count(), 2);

        assert_eq!(
            sim.add_node("OLT-2", Position::default(), NodeKind::olt(8, 5.0)),
            Err(TopologyError::SecondOlt)
        );
    }

    #[test]
    fn test_remove_node_and_splitter_swap() {
        let (mut sim, _, onu, _) = worked_example();
        let splitter: NodeId = sim.topology().incoming(onu, 0).unwrap().from_node_id;

        sim.set_splitter_type(splitter, "20/80").unwrap();
        // the ONU sat on port 0, the 7 dB leg
        assert_close(sim.power_map().received_power(onu), -3.35);

        sim.remove_node(splitter).unwrap();
        assert_eq!(sim.topology().connection_count(), 0);
        assert_eq!(sim.quality_of(onu), LinkQuality::Unknown);
    }

    #[test]
    fn test_restored_olt_node_mirrors_power_setting() {
        let mut topo: Topology = Topology::new();
        let olt: NodeId = topo
            .add_node("OLT", Position::default(), NodeKind::olt(1, 9.0))
            .unwrap();
        let settings: DiagramSettings = DiagramSettings {
            olt_power: 2.5,
            ..Default::default()
        };

        let sim: Simulator = Simulator::from_parts(topo, settings, LossModel::default());
        let NodeKind::Olt(props) = &sim.topology().get_node(olt).unwrap().kind else {
            panic!("expected an OLT");
        };
        assert_eq!(props.power, 2.5);
        assert_close(sim.power_map().port_power(olt, Port::output(0)), 2.5);
    }

    #[test]
    fn test_inventory_placement() {
        use crate::inventory::types::candidate::InventorySnapshot;

        let snapshot: InventorySnapshot = InventorySnapshot::from_json(
            r#"{
                "olts": [{"id": "olt-1", "name": "Central", "ponPorts": 4}],
                "onus": [{"id": "onu-1", "oltId": "olt-1", "ponPort": 0, "onuNumber": 3,
                          "measuredDistanceMeters": 850.0, "measuredRxPowerDbm": -19.2}]
            }"#,
        )
        .unwrap();

        let mut sim: Simulator = Simulator::default();
        sim.set_olt_power(4.0).unwrap();
        let olt: NodeId = sim
            .add_olt_from_inventory(&snapshot.olts[0], Position::default())
            .unwrap();
        let onu: NodeId = sim
            .add_onu_from_inventory(&snapshot.onus[0], Position::default())
            .unwrap();

        let olt_node: &Node = sim.topology().get_node(olt).unwrap();
        assert_eq!(olt_node.name, "Central");
        assert_eq!(olt_node.kind.output_ports(), 4);
        let onu_node: &Node = sim.topology().get_node(onu).unwrap();
        assert_eq!(onu_node.name, "ONU 0/3");
        let NodeKind::Onu(props) = &onu_node.kind else {
            panic!("expected an ONU");
        };
        assert_eq!(props.distance_meters, 850.0);

        sim.link_onu_inventory(onu, None).unwrap();
        let NodeKind::Onu(props) = &sim.topology().get_node(onu).unwrap().kind else {
            panic!("expected an ONU");
        };
        assert!(props.inventory.is_none());
    }

    #[test]
    fn test_node_edits_pass_through() {
        let mut sim: Simulator = Simulator::default();
        let building: NodeId = sim
            .add_node("BLD", Position::default(), NodeKind::building(1))
            .unwrap();
        let switch: NodeId = sim
            .add_node("SW", Position::default(), NodeKind::switch(2))
            .unwrap();
        sim.rename_node(building, "Via Roma 3").unwrap();
        sim.move_node(building, Position::new(5.0, 6.0)).unwrap();
        sim.set_building_floors(building, 3).unwrap();
        sim.set_unit_occupant(building, 3, 1, Some("Rossi")).unwrap();
        assert!(sim.set_unit_occupant(building, 4, 0, Some("Verdi")).is_err());
        sim.set_switch_ports(switch, 16).unwrap();

        let node: &Node = sim.topology().get_node(building).unwrap();
        assert_eq!(node.name, "Via Roma 3");
        assert_eq!(node.position, Position::new(5.0, 6.0));
        let NodeKind::Building(props) = &node.kind else {
            panic!("expected a building");
        };
        assert_eq!(props.floors[2].units[1].occupant.as_deref(), Some("Rossi"));
        assert_eq!(sim.topology().get_node(switch).unwrap().kind.output_ports(), 16);
        assert!(sim.power_map().is_empty());
    }
}
