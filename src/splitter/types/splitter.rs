use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::splitter::catalog::{self, CatalogEntry};
use crate::types::errors::CatalogError;

/// Splitter technology.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitterCategory {
    /// Planar Lightwave Circuit: even split, one loss for every port.
    #[serde(rename = "PLC")]
    Plc,
    /// Fused Biconic Taper: uneven split, one loss per port.
    #[serde(rename = "FBT")]
    Fbt,
}

impl SplitterCategory {
    pub fn to_str(&self) -> &'static str {
        match self {
            SplitterCategory::Plc => "PLC",
            SplitterCategory::Fbt => "FBT",
        }
    }
}

impl fmt::Display for SplitterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Insertion loss of a catalog entry.
#[derive(Debug, PartialEq)]
pub enum SplitterLoss {
    /// Same loss (dB) on every output port.
    Uniform(f64),
    /// Loss (dB) indexed by output port.
    PerPort(&'static [f64]),
}

/// Properties of a splitter node.
///
/// Only the catalog key is chosen by the user; port count, category and losses are always
/// read from the catalog, so a splitter can never carry a stale combination of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SplitterRecord", into = "SplitterRecord")]
pub struct SplitterProps {
    entry: &'static CatalogEntry,
}

impl SplitterProps {
    /// Builds the properties of a splitter of catalog type `splitter_type`.
    pub fn new(splitter_type: &str) -> Result<Self, CatalogError> {
        Ok(SplitterProps {
            entry: catalog::lookup(splitter_type)?,
        })
    }

    /// Catalog key.
    pub fn splitter_type(&self) -> &'static str {
        self.entry.name
    }

    pub fn output_ports(&self) -> usize {
        self.entry.ports
    }

    pub fn category(&self) -> SplitterCategory {
        self.entry.category
    }

    /// Uniform loss (PLC only).
    pub fn loss_db(&self) -> Option<f64> {
        self.entry.loss_db()
    }

    /// Per-port losses (FBT only, empty otherwise).
    pub fn port_losses_db(&self) -> &'static [f64] {
        self.entry.port_losses_db()
    }

    /// Insertion loss towards output `port`. See [`CatalogEntry::port_loss`].
    pub fn port_loss(&self, port: usize) -> f64 {
        self.entry.port_loss(port)
    }

    pub fn entry(&self) -> &'static CatalogEntry {
        self.entry
    }
}

/// Serialized shape of a splitter. Derived fields are written for readers of the saved file
/// and re-derived from `splitterType` on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitterRecord {
    splitter_type: String,
    #[serde(default)]
    output_ports: Option<usize>,
    #[serde(default)]
    category: Option<SplitterCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    loss_db: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    port_losses_db: Vec<f64>,
}

impl TryFrom<SplitterRecord> for SplitterProps {
    type Error = CatalogError;

    fn try_from(record: SplitterRecord) -> Result<Self, Self::Error> {
        let props: SplitterProps = SplitterProps::new(&record.splitter_type)?;
        let stale: bool = record.output_ports.is_some_and(|p| p != props.output_ports())
            || record.category.is_some_and(|c| c != props.category())
            || record.loss_db != props.loss_db()
            || (!record.port_losses_db.is_empty()
                && record.port_losses_db.as_slice() != props.port_losses_db());
        if stale {
            debug!(
                splitter = props.splitter_type(),
                "stored splitter fields differ from catalog, re-derived"
            );
        }
        Ok(props)
    }
}

impl From<SplitterProps> for SplitterRecord {
    fn from(props: SplitterProps) -> Self {
        SplitterRecord {
            splitter_type: props.splitter_type().to_string(),
            output_ports: Some(props.output_ports()),
            category: Some(props.category()),
            loss_db: props.loss_db(),
            port_losses_db: props.port_losses_db().to_vec(),
        }
    }
}
