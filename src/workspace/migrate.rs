//! Workspace loading and the one-time upgrade of single-diagram records.
//!
//! Older releases stored exactly one diagram under the legacy key. On load, such a record is
//! wrapped into a new diagram, the workspace is written under the workspace key and the legacy
//! record is removed. Nothing is ever written under the legacy key.

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::SimulatorConfig;
use crate::topology::types::{connection::Connection, node::Node};
use crate::types::errors::WorkspaceError;
use crate::types::settings::DiagramSettings;
use crate::workspace::storage::Storage;
use crate::workspace::types::{
    diagram::Diagram,
    workspace::{Workspace, WorkspaceRecord},
};

/// Name given to the diagram recovered from a legacy record.
pub const MIGRATED_DIAGRAM_NAME: &str = "Migrated diagram";

/// Single-diagram record of older releases. Read only.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyDiagram {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    connections: Vec<Connection>,
    settings: Option<DiagramSettings>,
}

/// Loads the workspace from `storage`.
///
/// - A workspace record is loaded as is; a leftover legacy record next to it is removed.
/// - Otherwise a legacy record is migrated: wrapped into a diagram named
///   [`MIGRATED_DIAGRAM_NAME`], persisted as a workspace, then removed.
/// - With neither record, a fresh workspace with one empty diagram is returned (not written).
///
/// # Errors
/// [`WorkspaceError`] when a record cannot be read, parsed or rebuilt, or the migrated
/// workspace cannot be written. The legacy record is only removed after the workspace write
/// succeeded.
pub fn load(
    storage: &mut impl Storage,
    config: &SimulatorConfig,
) -> Result<Workspace, WorkspaceError> {
    let workspace_key: &str = &config.storage.workspace;
    let legacy_key: &str = &config.storage.legacy_diagram;

    if let Some(text) = storage.read(workspace_key)? {
        let record: WorkspaceRecord = serde_json::from_str(&text)?;
        let workspace: Workspace = Workspace::from_record(record, config.clone())?;
        if storage.read(legacy_key)?.is_some() {
            warn!(key = legacy_key, "removing legacy diagram left next to a workspace");
            storage.remove(legacy_key)?;
        }
        info!(key = workspace_key, diagrams = workspace.len(), "workspace loaded");
        return Ok(workspace);
    }

    let Some(text) = storage.read(legacy_key)? else {
        info!("no saved workspace, starting a new one");
        return Ok(Workspace::new(config.clone()));
    };

    let legacy: LegacyDiagram = serde_json::from_str(&text)?;
    let mut diagram: Diagram = Diagram::new(
        MIGRATED_DIAGRAM_NAME,
        legacy.settings.unwrap_or(config.defaults),
    );
    diagram.nodes = legacy.nodes;
    diagram.connections = legacy.connections;
    diagram.normalize()?;

    let mut workspace: Workspace = Workspace::from_record(
        WorkspaceRecord {
            version: crate::workspace::types::workspace::WORKSPACE_VERSION,
            active_diagram_id: diagram.id,
            diagrams: vec![diagram],
        },
        config.clone(),
    )?;
    workspace.persist(storage)?;
    storage.remove(legacy_key)?;
    info!(
        from = legacy_key,
        to = workspace_key,
        nodes = workspace.active().topology().node_count(),
        "legacy diagram migrated"
    );
    Ok(workspace)
}

impl Workspace {
    /// See [`migrate::load`](crate::workspace::migrate::load).
    pub fn load(
        storage: &mut impl Storage,
        config: &SimulatorConfig,
    ) -> Result<Workspace, WorkspaceError> {
        load(storage, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::classify::LinkQuality;
    use crate::topology::types::node::NodeType;
    use crate::workspace::storage::MemoryStorage;

    // 1:8 splitter fed by the OLT, one ONU behind 1000 m / 2 connectors
    const LEGACY: &str = r#"{
        "nodes": [
            {"id": "6f1c1c5e-0000-4000-8000-000000000001", "name": "OLT", "type": "OLT",
             "position": {"x": 0, "y": 0}, "ponPorts": 2, "power": 5},
            {"id": "6f1c1c5e-0000-4000-8000-000000000002", "name": "SPL", "type": "Splitter",
             "position": {"x": 120, "y": 0}, "splitterType": "1:8", "outputPorts": 8,
             "category": "PLC", "lossDb": 10.5},
            {"id": "6f1c1c5e-0000-4000-8000-000000000003", "name": "ONU", "type": "ONU",
             "position": {"x": 240, "y": 0}, "distanceMeters": 1000}
        ],
        "connections": [
            {"id": "0a7e0000-0000-4000-8000-000000000001",
             "fromNodeId": "6f1c1c5e-0000-4000-8000-000000000001", "fromPort": {"type": "output", "index": 0},
             "toNodeId": "6f1c1c5e-0000-4000-8000-000000000002", "toPort": {"type": "input", "index": 0},
             "cableLengthMeters": 0, "connectorCount": 0},
            {"id": "0a7e0000-0000-4000-8000-000000000002",
             "fromNodeId": "6f1c1c5e-0000-4000-8000-000000000002", "fromPort": {"type": "output", "index": 4},
             "toNodeId": "6f1c1c5e-0000-4000-8000-000000000003", "toPort": {"type": "input", "index": 0},
             "cableLengthMeters": 1000, "connectorCount": 2}
        ],
        "settings": {"oltPower": 5, "onuSensitivity": -28}
    }"#;

    #[test]
    fn test_fresh_storage_gives_one_diagram() {
        let mut storage: MemoryStorage = MemoryStorage::new();
        let ws: Workspace = Workspace::load(&mut storage, &SimulatorConfig::default()).unwrap();
        assert_eq!(ws.len(), 1);
        assert_eq!(ws.diagrams()[0].name, "Diagram 1");
        assert!(storage.is_empty());
    }

    #[test]
    fn test_legacy_record_is_migrated_once() {
        let config: SimulatorConfig = SimulatorConfig::default();
        let mut storage: MemoryStorage = MemoryStorage::new();
        storage.write("pon-diagram", LEGACY).unwrap();

        let ws: Workspace = load(&mut storage, &config).unwrap();
        assert_eq!(ws.len(), 1);
        assert_eq!(ws.diagrams()[0].name, MIGRATED_DIAGRAM_NAME);
        assert!(ws.diagrams()[0].last_saved_at.is_some());
        assert_eq!(ws.active().topology().node_count(), 3);
        assert_eq!(ws.active().topology().connection_count(), 2);
        assert!(!storage.contains("pon-diagram"));
        assert!(storage.contains("pon-workspace"));

        let onu = ws
            .active()
            .topology()
            .nodes_of_type(NodeType::Onu)
            .next()
            .unwrap()
            .id;
        let received: f64 = ws.active().power_map().received_power(onu).unwrap();
        assert!((received + 6.85).abs() < 1e-9);
        assert_eq!(ws.active().quality_of(onu), LinkQuality::Good);

        // second load reads the workspace record
        let again: Workspace = load(&mut storage, &config).unwrap();
        assert_eq!(again.active_id(), ws.active_id());
        assert_eq!(again.diagrams(), ws.diagrams());
    }

    #[test]
    fn test_stale_legacy_record_is_removed() {
        let config: SimulatorConfig = SimulatorConfig::default();
        let mut storage: MemoryStorage = MemoryStorage::new();
        let mut ws: Workspace = Workspace::new(config.clone());
        ws.persist(&mut storage).unwrap();
        storage.write("pon-diagram", LEGACY).unwrap();

        let loaded: Workspace = load(&mut storage, &config).unwrap();
        assert_eq!(loaded.active_id(), ws.active_id());
        assert_eq!(loaded.active().topology().node_count(), 0);
        assert!(!storage.contains("pon-diagram"));
    }

    #[test]
    fn test_broken_legacy_record_is_kept() {
        let mut storage: MemoryStorage = MemoryStorage::new();
        storage.write("pon-diagram", "{\"nodes\": 3}").unwrap();
        assert!(matches!(
            load(&mut storage, &SimulatorConfig::default()),
            Err(WorkspaceError::Json(_))
        ));
        assert!(storage.contains("pon-diagram"));
        assert!(!storage.contains("pon-workspace"));
    }

    #[cfg(feature = "fs")]
    #[test]
    fn test_file_storage_round_trip() {
        use crate::workspace::storage::FileStorage;

        let dir = tempfile::tempdir().unwrap();
        let mut config: SimulatorConfig = SimulatorConfig::default();
        config.storage.workspace = "site-a".to_string();
        let mut storage: FileStorage = FileStorage::new(dir.path());
        storage.write("pon-diagram", LEGACY).unwrap();

        let mut ws: Workspace = load(&mut storage, &config).unwrap();
        assert!(dir.path().join("site-a.json").exists());
        assert!(!dir.path().join("pon-diagram.json").exists());

        let spare = ws.create_diagram("Spare");
        assert!(ws.switch_active(spare));
        ws.persist(&mut storage).unwrap();

        let reloaded: Workspace = load(&mut storage, &config).unwrap();
        assert_eq!(reloaded.active_id(), spare);
        assert_eq!(reloaded.len(), 2);
    }
}
