//! # config
//!
//! Engine configuration: loss model, settings given to new diagrams, and storage keys.
//! Every field has a default, so a config file only needs the values it changes.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};

use crate::power::types::loss::LossModel;
use crate::types::errors::ConfigError;
use crate::types::settings::DiagramSettings;

/// Storage key of the workspace record.
pub const WORKSPACE_KEY: &str = "pon-workspace";
/// Storage key of the single-diagram record written by older releases.
pub const LEGACY_DIAGRAM_KEY: &str = "pon-diagram";

/// Keys under which records are kept in a [`Storage`](crate::workspace::storage::Storage).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageKeys {
    pub workspace: String,
    pub legacy_diagram: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        StorageKeys {
            workspace: WORKSPACE_KEY.to_string(),
            legacy_diagram: LEGACY_DIAGRAM_KEY.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulatorConfig {
    /// Cable losses used by every diagram.
    pub loss: LossModel,
    /// Settings of newly created diagrams.
    pub defaults: DiagramSettings,
    pub storage: StorageKeys,
}

impl SimulatorConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Reads a [`SimulatorConfig`] from a `.json` file.
///
/// # Errors
/// - [`ConfigError::InvalidExtension`] when `path` does not end in `.json`.
/// - [`ConfigError::OpenFile`] / [`ConfigError::Read`] on I/O failures.
/// - [`ConfigError::Parse`] when the content is not a valid config.
///
/// # Example
/// ```no_run
/// use pon_tools::config;
///
/// let cfg = config::load_from_file("pon.json").expect("Failed to load config");
/// println!("fiber loss: {} dB/km", cfg.loss.fiber_loss_db_per_km);
/// ```
pub fn load_from_file(path: &str) -> Result<SimulatorConfig, ConfigError> {
    if !path.to_ascii_lowercase().ends_with(".json") {
        return Err(ConfigError::InvalidExtension {
            path: path.to_string(),
        });
    }

    let file: File = File::open(path).map_err(|source| ConfigError::OpenFile {
        path: path.to_string(),
        source,
    })?;
    let mut reader: BufReader<File> = BufReader::new(file);
    let mut text: String = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;

    SimulatorConfig::from_json(&text).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}
