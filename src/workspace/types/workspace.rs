//! Multi-diagram workspace.
//!
//! A [`Workspace`] owns an ordered list of [`Diagram`] records and the live [`Simulator`] of the
//! active one. Edits go to the simulator; its state is copied back into the record on
//! [`Workspace::snapshot`], which runs automatically before switching, exporting and persisting.
//! A workspace always holds at least one diagram.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::config::SimulatorConfig;
use crate::simulator::Simulator;
use crate::types::errors::WorkspaceError;
use crate::types::ids::DiagramId;
use crate::workspace::storage::Storage;
use crate::workspace::types::diagram::{Diagram, DiagramSummary};

/// Format version written into every workspace record.
pub const WORKSPACE_VERSION: u32 = 1;
/// Name of the diagram created for an empty workspace.
pub const FIRST_DIAGRAM_NAME: &str = "Diagram 1";

/// Persisted layout of a workspace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRecord {
    pub version: u32,
    pub active_diagram_id: DiagramId,
    pub diagrams: Vec<Diagram>,
}

#[derive(Debug)]
pub struct Workspace {
    diagrams: Vec<Diagram>,
    active_id: DiagramId,
    live: Simulator,
    config: SimulatorConfig,
}

impl Workspace {
    /// Fresh workspace holding one empty diagram.
    pub fn new(config: SimulatorConfig) -> Self {
        let diagram: Diagram = Diagram::new(FIRST_DIAGRAM_NAME, config.defaults);
        Workspace {
            active_id: diagram.id,
            live: Simulator::new(diagram.settings, config.loss),
            diagrams: vec![diagram],
            config,
        }
    }

    /// Builds a workspace from a persisted record.
    ///
    /// Every diagram is rebuilt through the topology store, so invalid connections are dropped.
    /// A diagram repeating an earlier diagram's id gets a fresh id. An unknown active id falls
    /// back to the first diagram; an empty record yields a fresh workspace.
    pub fn from_record(
        record: WorkspaceRecord,
        config: SimulatorConfig,
    ) -> Result<Self, WorkspaceError> {
        if record.version > WORKSPACE_VERSION {
            return Err(WorkspaceError::UnsupportedVersion {
                version: record.version,
            });
        }

        let mut diagrams: Vec<Diagram> = record.diagrams;
        let mut seen: HashSet<DiagramId> = HashSet::new();
        for diagram in diagrams.iter_mut() {
            diagram.normalize()?;
            if !seen.insert(diagram.id) {
                let fresh: DiagramId = DiagramId::new();
                warn!(diagram = %diagram.id, new_id = %fresh, name = %diagram.name, "repeated diagram id, assigning a new one");
                diagram.id = fresh;
                seen.insert(fresh);
            }
        }

        let Some(first) = diagrams.first() else {
            warn!("workspace record holds no diagram, starting a new one");
            return Ok(Workspace::new(config));
        };
        let active_id: DiagramId = if diagrams.iter().any(|d| d.id == record.active_diagram_id) {
            record.active_diagram_id
        } else {
            warn!(diagram = %record.active_diagram_id, "active diagram not found, activating the first one");
            first.id
        };

        let mut workspace: Workspace = Workspace {
            diagrams,
            active_id,
            live: Simulator::new(config.defaults, config.loss),
            config,
        };
        workspace.live = workspace.load_live(active_id)?;
        Ok(workspace)
    }

    /// Serializable copy of the workspace, including unsaved edits of the active diagram.
    pub fn to_record(&mut self) -> WorkspaceRecord {
        self.snapshot();
        WorkspaceRecord {
            version: WORKSPACE_VERSION,
            active_diagram_id: self.active_id,
            diagrams: self.diagrams.clone(),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    // ------------- Access ------------
    pub fn active_id(&self) -> DiagramId {
        self.active_id
    }

    /// Live simulator of the active diagram.
    pub fn active(&self) -> &Simulator {
        &self.live
    }

    pub fn active_mut(&mut self) -> &mut Simulator {
        &mut self.live
    }

    /// Stored record of a diagram. The active diagram's record lags behind the live simulator
    /// until the next [`snapshot`](Self::snapshot).
    pub fn diagram(&self, diagram_id: DiagramId) -> Option<&Diagram> {
        self.diagrams.iter().find(|d| d.id == diagram_id)
    }

    /// Id, name and last save time of every diagram, in workspace order.
    pub fn diagrams(&self) -> Vec<DiagramSummary> {
        self.diagrams.iter().map(Diagram::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.diagrams.len()
    }

    /// Always false: a workspace keeps at least one diagram.
    pub fn is_empty(&self) -> bool {
        self.diagrams.is_empty()
    }

    // ------------- Diagram lifecycle ------------
    /// Appends a new empty diagram with the configured default settings. The active diagram
    /// does not change.
    pub fn create_diagram(&mut self, name: &str) -> DiagramId {
        let diagram: Diagram = Diagram::new(name, self.config.defaults);
        let id: DiagramId = diagram.id;
        self.diagrams.push(diagram);
        info!(diagram = %id, name, "diagram created");
        id
    }

    /// Renames a diagram. Blank names and unknown ids are refused.
    pub fn rename_diagram(&mut self, diagram_id: DiagramId, name: &str) -> bool {
        let name: &str = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.diagrams.iter_mut().find(|d| d.id == diagram_id) {
            Some(diagram) => {
                diagram.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Deletes a diagram. The last remaining diagram cannot be deleted.
    ///
    /// Deleting the active diagram activates the first remaining one.
    pub fn delete_diagram(&mut self, diagram_id: DiagramId) -> bool {
        if self.diagrams.len() <= 1 {
            return false;
        }
        let Some(index) = self.diagrams.iter().position(|d| d.id == diagram_id) else {
            return false;
        };

        if diagram_id == self.active_id {
            let next: DiagramId = if index == 0 {
                self.diagrams[1].id
            } else {
                self.diagrams[0].id
            };
            match self.load_live(next) {
                Ok(live) => {
                    self.live = live;
                    self.active_id = next;
                }
                Err(err) => {
                    warn!(diagram = %next, error = %err, "cannot activate diagram, delete refused");
                    return false;
                }
            }
        }

        let removed: Diagram = self.diagrams.remove(index);
        info!(diagram = %removed.id, name = %removed.name, "diagram deleted");
        true
    }

    /// Makes another diagram active, saving the live state of the current one into its record
    /// first.
    pub fn switch_active(&mut self, diagram_id: DiagramId) -> bool {
        if self.diagram(diagram_id).is_none() {
            return false;
        }
        self.snapshot();
        if diagram_id == self.active_id {
            return true;
        }
        match self.load_live(diagram_id) {
            Ok(live) => {
                self.live = live;
                self.active_id = diagram_id;
                info!(diagram = %diagram_id, "active diagram switched");
                true
            }
            Err(err) => {
                warn!(diagram = %diagram_id, error = %err, "cannot activate diagram");
                false
            }
        }
    }

    /// Copies the live simulator into the active diagram's record.
    pub fn snapshot(&mut self) {
        let live: &Simulator = &self.live;
        if let Some(record) = self.diagrams.iter_mut().find(|d| d.id == self.active_id) {
            record.capture(live);
        }
    }

    // ------------- Persistence ------------
    /// Writes the whole workspace under the configured key and stamps the active diagram's
    /// `last_saved_at`. On failure the stamp is left as it was.
    pub fn persist(&mut self, storage: &mut impl Storage) -> Result<(), WorkspaceError> {
        self.snapshot();

        let index: Option<usize> = self.diagrams.iter().position(|d| d.id == self.active_id);
        let previous = index.and_then(|i| self.diagrams[i].last_saved_at);
        if let Some(i) = index {
            self.diagrams[i].last_saved_at = Some(Utc::now());
        }

        let result: Result<(), WorkspaceError> = self.write_record(storage);
        if result.is_err() {
            if let Some(i) = index {
                self.diagrams[i].last_saved_at = previous;
            }
        }
        result
    }

    fn write_record(&self, storage: &mut impl Storage) -> Result<(), WorkspaceError> {
        let record: WorkspaceRecord = WorkspaceRecord {
            version: WORKSPACE_VERSION,
            active_diagram_id: self.active_id,
            diagrams: self.diagrams.clone(),
        };
        let text: String = serde_json::to_string_pretty(&record)?;
        storage.write(&self.config.storage.workspace, &text)?;
        info!(
            key = %self.config.storage.workspace,
            diagrams = self.diagrams.len(),
            "workspace saved"
        );
        Ok(())
    }

    /// JSON of one diagram, for sharing outside the workspace.
    pub fn export_diagram(&mut self, diagram_id: DiagramId) -> Result<String, WorkspaceError> {
        self.snapshot();
        let diagram: &Diagram = self
            .diagram(diagram_id)
            .ok_or(WorkspaceError::DiagramMissing { diagram_id })?;
        Ok(serde_json::to_string_pretty(diagram)?)
    }

    /// Adds a diagram from exported JSON under a fresh id. Contents are kept; invalid
    /// connections are dropped.
    pub fn import_diagram(&mut self, json: &str) -> Result<DiagramId, WorkspaceError> {
        let mut diagram: Diagram = serde_json::from_str(json)?;
        diagram.normalize()?;
        diagram.id = DiagramId::new();
        diagram.last_saved_at = None;
        let id: DiagramId = diagram.id;
        info!(diagram = %id, name = %diagram.name, "diagram imported");
        self.diagrams.push(diagram);
        Ok(id)
    }

    pub(crate) fn push_diagram(&mut self, diagram: Diagram) {
        self.diagrams.push(diagram);
    }

    fn load_live(&self, diagram_id: DiagramId) -> Result<Simulator, WorkspaceError> {
        let diagram: &Diagram = self
            .diagram(diagram_id)
            .ok_or(WorkspaceError::DiagramMissing { diagram_id })?;
        Ok(diagram.to_simulator(self.config.loss)?)
    }
}
