use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::inventory::types::candidate::InventoryLink;
use crate::splitter::types::splitter::SplitterProps;
use crate::types::errors::TopologyError;
use crate::types::ids::NodeId;

/// Number of apartment slots on every building floor.
pub const UNITS_PER_FLOOR: usize = 2;

/// Device category, without its properties.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "OLT")]
    Olt,
    Splitter,
    #[serde(rename = "ONU")]
    Onu,
    Switch,
    Building,
}

impl NodeType {
    pub fn to_str(&self) -> &'static str {
        match self {
            NodeType::Olt => "OLT",
            NodeType::Splitter => "Splitter",
            NodeType::Onu => "ONU",
            NodeType::Switch => "Switch",
            NodeType::Building => "Building",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Canvas position. Layout only, never used by the power model.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// Device placed in a diagram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Stable id.
    pub id: NodeId,
    /// Display name.
    pub name: String,
    /// Canvas position.
    #[serde(default)]
    pub position: Position,
    /// Type-specific properties. Serialized inline with a `type` discriminator.
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }
}

/// Type-specific node properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    #[serde(rename = "OLT")]
    Olt(OltProps),
    Splitter(SplitterProps),
    #[serde(rename = "ONU")]
    Onu(OnuProps),
    Switch(SwitchProps),
    Building(BuildingProps),
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Olt(_) => NodeType::Olt,
            NodeKind::Splitter(_) => NodeType::Splitter,
            NodeKind::Onu(_) => NodeType::Onu,
            NodeKind::Switch(_) => NodeType::Switch,
            NodeKind::Building(_) => NodeType::Building,
        }
    }

    /// Number of input ports a node of this kind exposes.
    pub fn input_ports(&self) -> usize {
        match self {
            NodeKind::Olt(_) => 0,
            NodeKind::Splitter(_)
            | NodeKind::Onu(_)
            | NodeKind::Switch(_)
            | NodeKind::Building(_) => 1,
        }
    }

    /// Number of output ports a node of this kind exposes.
    ///
    /// An ONU has a single Ethernet uplink towards a switch; a building is a sink.
    pub fn output_ports(&self) -> usize {
        match self {
            NodeKind::Olt(olt) => olt.pon_ports,
            NodeKind::Splitter(splitter) => splitter.output_ports(),
            NodeKind::Onu(_) => 1,
            NodeKind::Switch(switch) => switch.port_count,
            NodeKind::Building(_) => 0,
        }
    }

    /// OLT with `pon_ports` ports transmitting `power` dBm.
    pub fn olt(pon_ports: usize, power: f64) -> Self {
        NodeKind::Olt(OltProps { pon_ports, power })
    }

    /// Splitter of catalog type `splitter_type`.
    pub fn splitter(splitter_type: &str) -> Result<Self, TopologyError> {
        Ok(NodeKind::Splitter(SplitterProps::new(splitter_type)?))
    }

    /// ONU at `distance_meters` using the diagram's default sensitivity.
    pub fn onu(distance_meters: f64) -> Self {
        NodeKind::Onu(OnuProps {
            distance_meters,
            ..Default::default()
        })
    }

    pub fn switch(port_count: usize) -> Self {
        NodeKind::Switch(SwitchProps { port_count })
    }

    pub fn building(total_floors: usize) -> Self {
        NodeKind::Building(BuildingProps::new(total_floors))
    }
}

/// Optical Line Terminal properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OltProps {
    /// Independent PON output ports.
    pub pon_ports: usize,
    /// Transmit power on every port (dBm).
    pub power: f64,
}

/// Optical Network Unit properties.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnuProps {
    /// Distance from the OLT as recorded by the installer (meters).
    #[serde(default)]
    pub distance_meters: f64,
    /// Receiver sensitivity override (dBm). `None` uses the diagram default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity_dbm: Option<f64>,
    /// Linked inventory device. Display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<InventoryLink>,
}

impl OnuProps {
    /// Sensitivity to classify this ONU against.
    pub fn effective_sensitivity(&self, default_dbm: f64) -> f64 {
        self.sensitivity_dbm.unwrap_or(default_dbm)
    }
}

/// Ethernet switch properties. Switches carry no optical power.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchProps {
    pub port_count: usize,
}

/// Building properties. Organizational only, not part of the power model.
///
/// `floors` always holds exactly `total_floors` entries; on load the list is padded or
/// truncated to match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "BuildingRecord", into = "BuildingRecord")]
pub struct BuildingProps {
    pub total_floors: usize,
    /// One record per floor, ground floor first.
    pub floors: Vec<Floor>,
}

/// Serialized shape of a building.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingRecord {
    total_floors: usize,
    #[serde(default)]
    floors: Vec<Floor>,
}

impl From<BuildingRecord> for BuildingProps {
    fn from(record: BuildingRecord) -> Self {
        if record.floors.len() != record.total_floors {
            debug!(
                total_floors = record.total_floors,
                stored = record.floors.len(),
                "stored floor list resized to floor count"
            );
        }
        let mut building: BuildingProps = BuildingProps {
            total_floors: record.total_floors,
            floors: record.floors,
        };
        building.set_total_floors(record.total_floors);
        building
    }
}

impl From<BuildingProps> for BuildingRecord {
    fn from(building: BuildingProps) -> Self {
        BuildingRecord {
            total_floors: building.total_floors,
            floors: building.floors,
        }
    }
}

/// Occupancy of one building floor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    /// 1-based floor number.
    pub number: usize,
    pub units: [Unit; UNITS_PER_FLOOR],
}

/// One apartment slot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupant: Option<String>,
}

impl BuildingProps {
    pub fn new(total_floors: usize) -> Self {
        let mut building: BuildingProps = BuildingProps {
            total_floors: 0,
            floors: Vec::new(),
        };
        building.set_total_floors(total_floors);
        building
    }

    /// Grows or shrinks the floor list. Occupants of retained floors are kept.
    pub fn set_total_floors(&mut self, total_floors: usize) {
        self.floors.truncate(total_floors);
        while self.floors.len() < total_floors {
            let number: usize = self.floors.len() + 1;
            self.floors.push(Floor {
                number,
                ..Default::default()
            });
        }
        self.total_floors = total_floors;
    }

    /// Sets or clears the occupant label of `unit` (0-based) on floor `floor` (1-based).
    /// Blank labels clear the slot.
    pub fn set_occupant(
        &mut self,
        floor: usize,
        unit: usize,
        occupant: Option<&str>,
    ) -> Result<(), TopologyError> {
        let total_floors: usize = self.floors.len();
        let record: &mut Floor = floor
            .checked_sub(1)
            .and_then(|idx| self.floors.get_mut(idx))
            .ok_or(TopologyError::FloorOutOfRange {
                floor,
                total_floors,
            })?;
        let slot: &mut Unit = record
            .units
            .get_mut(unit)
            .ok_or(TopologyError::UnitOutOfRange {
                unit,
                units_per_floor: UNITS_PER_FLOOR,
            })?;
        slot.occupant = occupant
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string);
        Ok(())
    }

    /// Number of occupied unit slots.
    pub fn occupied_units(&self) -> usize {
        self.floors
            .iter()
            .flat_map(|floor| floor.units.iter())
            .filter(|unit| unit.occupant.is_some())
            .count()
    }
}
