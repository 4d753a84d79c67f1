//! Per-ONU budget summary.

use serde::Serialize;

use crate::power::classify::{LinkQuality, classify, margin};
use crate::power::types::power_map::PowerMap;
use crate::topology::types::{node::NodeKind, topology::Topology};
use crate::types::ids::NodeId;
use crate::types::settings::DiagramSettings;

/// Budget of one ONU.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnuBudget {
    pub node_id: NodeId,
    pub name: String,
    /// `None` when the ONU is not reached.
    pub received_dbm: Option<f64>,
    /// Threshold in effect: the ONU's own override or the diagram default.
    pub sensitivity_dbm: f64,
    pub margin_db: Option<f64>,
    pub quality: LinkQuality,
}

/// Budgets of every ONU in a diagram, in node insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BudgetReport {
    pub onus: Vec<OnuBudget>,
}

impl BudgetReport {
    /// Number of ONUs with the given quality.
    pub fn count(&self, quality: LinkQuality) -> usize {
        self.onus.iter().filter(|onu| onu.quality == quality).count()
    }

    /// Reached ONU with the smallest margin.
    pub fn worst(&self) -> Option<&OnuBudget> {
        self.onus
            .iter()
            .filter_map(|onu| onu.margin_db.map(|m| (onu, m)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(onu, _)| onu)
    }

    pub fn get(&self, node_id: NodeId) -> Option<&OnuBudget> {
        self.onus.iter().find(|onu| onu.node_id == node_id)
    }
}

/// Builds the budget report of `topology` from an already computed power map.
pub fn budget_report(
    topology: &Topology,
    settings: &DiagramSettings,
    power: &PowerMap,
) -> BudgetReport {
    let onus: Vec<OnuBudget> = topology
        .iter_nodes()
        .filter_map(|node| match &node.kind {
            NodeKind::Onu(onu) => {
                let received: Option<f64> = power.received_power(node.id);
                let sensitivity: f64 = onu.effective_sensitivity(settings.onu_sensitivity);
                Some(OnuBudget {
                    node_id: node.id,
                    name: node.name.clone(),
                    received_dbm: received,
                    sensitivity_dbm: sensitivity,
                    margin_db: received.map(|r| margin(r, sensitivity)),
                    quality: classify(received, sensitivity),
                })
            }
            _ => None,
        })
        .collect();

    BudgetReport { onus }
}
