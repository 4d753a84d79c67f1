use serde::{Deserialize, Serialize};

use crate::topology::types::node::{NodeKind, OltProps, OnuProps};

/// OLT known to the device inventory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OltCandidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ip_address: String,
    pub pon_ports: usize,
}

impl OltCandidate {
    /// OLT node properties transmitting `power` dBm on every inventory port.
    pub fn to_node_kind(&self, power: f64) -> NodeKind {
        NodeKind::Olt(OltProps {
            pon_ports: self.pon_ports,
            power,
        })
    }
}

/// ONU known to the device inventory, with the values last measured by the poller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnuCandidate {
    pub id: String,
    pub olt_id: String,
    pub pon_port: usize,
    pub onu_number: u32,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub measured_distance_meters: Option<f64>,
    #[serde(default)]
    pub measured_rx_power_dbm: Option<f64>,
    #[serde(default)]
    pub is_online: bool,
}

impl OnuCandidate {
    /// Name shown when the candidate is placed: its description, or `ONU <port>/<number>`.
    pub fn display_name(&self) -> String {
        let description: &str = self.description.trim();
        if description.is_empty() {
            format!("ONU {}/{}", self.pon_port, self.onu_number)
        } else {
            description.to_string()
        }
    }

    pub fn inventory_link(&self) -> InventoryLink {
        InventoryLink {
            candidate_id: self.id.clone(),
            mac_address: self.mac_address.clone(),
            measured_distance_meters: self.measured_distance_meters,
            measured_rx_power_dbm: self.measured_rx_power_dbm,
            is_online: self.is_online,
        }
    }

    /// ONU node properties pre-filled from the inventory.
    ///
    /// The measured distance becomes the planned distance (0 when never measured); the
    /// measured power is attached for display only.
    pub fn to_node_kind(&self) -> NodeKind {
        NodeKind::Onu(OnuProps {
            distance_meters: self
                .measured_distance_meters
                .filter(|d| d.is_finite())
                .map_or(0.0, |d| d.max(0.0)),
            sensitivity_dbm: None,
            inventory: Some(self.inventory_link()),
        })
    }
}

/// Inventory device linked to an ONU node. Display only: the power model never reads it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLink {
    pub candidate_id: String,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_distance_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_rx_power_dbm: Option<f64>,
    #[serde(default)]
    pub is_online: bool,
}

/// Read-only snapshot of the inventory, used to pre-populate pickable nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySnapshot {
    pub olts: Vec<OltCandidate>,
    pub onus: Vec<OnuCandidate>,
}

impl InventorySnapshot {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn olt(&self, olt_id: &str) -> Option<&OltCandidate> {
        self.olts.iter().find(|olt| olt.id == olt_id)
    }

    /// ONUs registered on one PON port of one OLT, ordered by ONU number.
    pub fn onus_on_port(&self, olt_id: &str, pon_port: usize) -> Vec<&OnuCandidate> {
        let mut onus: Vec<&OnuCandidate> = self
            .onus
            .iter()
            .filter(|onu| onu.olt_id == olt_id && onu.pon_port == pon_port)
            .collect();
        onus.sort_by_key(|onu| onu.onu_number);
        onus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "olts": [
            {"id": "olt-1", "name": "Central", "ipAddress": "10.0.0.2", "ponPorts": 16}
        ],
        "onus": [
            {"id": "onu-7", "oltId": "olt-1", "ponPort": 3, "onuNumber": 7,
             "macAddress": "AA:BB:CC:00:00:07", "description": "",
             "measuredDistanceMeters": 1840.0, "measuredRxPowerDbm": -21.4, "isOnline": true},
            {"id": "onu-2", "oltId": "olt-1", "ponPort": 3, "onuNumber": 2,
             "macAddress": "AA:BB:CC:00:00:02", "description": "Bakery",
             "measuredDistanceMeters": null, "measuredRxPowerDbm": null, "isOnline": false},
            {"id": "onu-9", "oltId": "olt-1", "ponPort": 4, "onuNumber": 1}
        ]
    }"#;

    #[test]
    fn test_snapshot_parsing_and_port_filter() {
        let snapshot: InventorySnapshot = InventorySnapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snapshot.olt("olt-1").unwrap().pon_ports, 16);
        assert!(snapshot.olt("olt-2").is_none());

        let on_port: Vec<&str> = snapshot
            .onus_on_port("olt-1", 3)
            .iter()
            .map(|onu| onu.id.as_str())
            .collect();
        assert_eq!(on_port, vec!["onu-2", "onu-7"]);
        assert_eq!(snapshot.onus_on_port("olt-1", 5).len(), 0);
    }

    #[test]
    fn test_candidates_to_nodes() {
        let snapshot: InventorySnapshot = InventorySnapshot::from_json(SNAPSHOT).unwrap();

        let NodeKind::Olt(olt) = snapshot.olts[0].to_node_kind(4.0) else {
            panic!("expected an OLT");
        };
        assert_eq!(olt.pon_ports, 16);
        assert_eq!(olt.power, 4.0);

        let measured: &OnuCandidate = &snapshot.onus[0];
        assert_eq!(measured.display_name(), "ONU 3/7");
        let NodeKind::Onu(onu) = measured.to_node_kind() else {
            panic!("expected an ONU");
        };
        assert_eq!(onu.distance_meters, 1840.0);
        assert_eq!(onu.sensitivity_dbm, None);
        let link: InventoryLink = onu.inventory.unwrap();
        assert_eq!(link.mac_address, "AA:BB:CC:00:00:07");
        assert_eq!(link.measured_rx_power_dbm, Some(-21.4));
        assert!(link.is_online);

        let unmeasured: &OnuCandidate = &snapshot.onus[1];
        assert_eq!(unmeasured.display_name(), "Bakery");
        let NodeKind::Onu(onu) = unmeasured.to_node_kind() else {
            panic!("expected an ONU");
        };
        assert_eq!(onu.distance_meters, 0.0);
    }
}
