//! # workspace
//!
//! Named diagrams, the active one's live simulator, and their durable storage.
//!
//! ```no_run
//! use pon_tools::{SimulatorConfig, Workspace, workspace::storage::FileStorage};
//!
//! let config = SimulatorConfig::default();
//! let mut storage = FileStorage::new("./pon-data");
//! let mut ws = Workspace::load(&mut storage, &config).expect("Failed to load workspace");
//! let north = ws.create_diagram("North ring");
//! ws.switch_active(north);
//! ws.persist(&mut storage).expect("Failed to save workspace");
//! ```

pub mod migrate;
pub mod storage;
pub mod types;

#[cfg(feature = "fs")]
pub use storage::FileStorage;
pub use storage::{MemoryStorage, Storage};
pub use types::diagram::{Diagram, DiagramSummary};
pub use types::workspace::{FIRST_DIAGRAM_NAME, WORKSPACE_VERSION, Workspace, WorkspaceRecord};
