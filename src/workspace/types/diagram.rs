use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::power::types::loss::LossModel;
use crate::simulator::Simulator;
use crate::topology::types::{connection::Connection, node::Node, topology::Topology};
use crate::types::errors::TopologyError;
use crate::types::ids::DiagramId;
use crate::types::settings::DiagramSettings;

/// Saved form of one diagram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub id: DiagramId,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub settings: DiagramSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved_at: Option<DateTime<Utc>>,
}

impl Diagram {
    /// Empty, never saved diagram.
    pub fn new(name: &str, settings: DiagramSettings) -> Self {
        Diagram {
            id: DiagramId::new(),
            name: name.to_string(),
            nodes: Vec::new(),
            connections: Vec::new(),
            settings,
            last_saved_at: None,
        }
    }

    /// Rebuilds the diagram's topology, dropping connections that break the wiring rules.
    pub fn to_topology(&self) -> Result<Topology, TopologyError> {
        Topology::from_parts(self.nodes.clone(), self.connections.clone())
    }

    /// Rewrites `nodes` and `connections` from a validated rebuild.
    pub fn normalize(&mut self) -> Result<(), TopologyError> {
        let (nodes, connections) = self.to_topology()?.to_parts();
        self.nodes = nodes;
        self.connections = connections;
        Ok(())
    }

    pub fn to_simulator(&self, loss: LossModel) -> Result<Simulator, TopologyError> {
        Ok(Simulator::from_parts(self.to_topology()?, self.settings, loss))
    }

    /// Copies the live state of `simulator` into this record.
    pub fn capture(&mut self, simulator: &Simulator) {
        let (nodes, connections) = simulator.topology().to_parts();
        self.nodes = nodes;
        self.connections = connections;
        self.settings = *simulator.settings();
    }

    pub fn summary(&self) -> DiagramSummary {
        DiagramSummary {
            id: self.id,
            name: self.name.clone(),
            last_saved_at: self.last_saved_at,
        }
    }
}

/// Listing entry for a diagram picker.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSummary {
    pub id: DiagramId,
    pub name: String,
    pub last_saved_at: Option<DateTime<Utc>>,
}
