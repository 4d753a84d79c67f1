//! Static splitter catalog.
//!
//! Every splitter placed in a diagram references one of these entries by name. PLC splitters
//! divide power evenly and carry a single insertion loss; FBT splitters are asymmetric and carry
//! one loss per output port.

use tracing::debug;

use crate::splitter::types::splitter::{SplitterCategory, SplitterLoss};
use crate::types::errors::CatalogError;

/// One row of the splitter catalog.
#[derive(Debug, PartialEq)]
pub struct CatalogEntry {
    /// Catalog key, e.g. `"1:8"` or `"30/70"`.
    pub name: &'static str,
    /// Number of output ports.
    pub ports: usize,
    /// Splitter technology.
    pub category: SplitterCategory,
    /// Insertion loss, uniform or per output port.
    pub loss: SplitterLoss,
}

impl CatalogEntry {
    /// Insertion loss (dB) between the input and output port `port`.
    ///
    /// Uniform entries return the same loss for every port. Per-port entries fall back to the
    /// loss of port 0 when `port` lies outside the table.
    pub fn port_loss(&self, port: usize) -> f64 {
        match &self.loss {
            SplitterLoss::Uniform(loss_db) => *loss_db,
            SplitterLoss::PerPort(losses) => match losses.get(port) {
                Some(loss_db) => *loss_db,
                None => {
                    debug!(
                        splitter = self.name,
                        port, "port outside loss table, using port 0 loss"
                    );
                    losses.first().copied().unwrap_or_default()
                }
            },
        }
    }

    /// Uniform loss, if this is a symmetric splitter.
    pub fn loss_db(&self) -> Option<f64> {
        match &self.loss {
            SplitterLoss::Uniform(loss_db) => Some(*loss_db),
            SplitterLoss::PerPort(_) => None,
        }
    }

    /// Per-port losses; empty for symmetric splitters.
    pub fn port_losses_db(&self) -> &'static [f64] {
        match &self.loss {
            SplitterLoss::Uniform(_) => &[],
            SplitterLoss::PerPort(losses) => losses,
        }
    }
}

static CATALOG: [CatalogEntry; 11] = [
    // --- PLC ---
    CatalogEntry {
        name: "1:2",
        ports: 2,
        category: SplitterCategory::Plc,
        loss: SplitterLoss::Uniform(3.8),
    },
    CatalogEntry {
        name: "1:4",
        ports: 4,
        category: SplitterCategory::Plc,
        loss: SplitterLoss::Uniform(7.2),
    },
    CatalogEntry {
        name: "1:8",
        ports: 8,
        category: SplitterCategory::Plc,
        loss: SplitterLoss::Uniform(10.5),
    },
    CatalogEntry {
        name: "1:16",
        ports: 16,
        category: SplitterCategory::Plc,
        loss: SplitterLoss::Uniform(14.0),
    },
    CatalogEntry {
        name: "1:32",
        ports: 32,
        category: SplitterCategory::Plc,
        loss: SplitterLoss::Uniform(17.5),
    },
    CatalogEntry {
        name: "1:64",
        ports: 64,
        category: SplitterCategory::Plc,
        loss: SplitterLoss::Uniform(21.0),
    },
    // --- FBT (port 0 is the tap side) ---
    CatalogEntry {
        name: "50/50",
        ports: 2,
        category: SplitterCategory::Fbt,
        loss: SplitterLoss::PerPort(&[3.5, 3.5]),
    },
    CatalogEntry {
        name: "40/60",
        ports: 2,
        category: SplitterCategory::Fbt,
        loss: SplitterLoss::PerPort(&[4.4, 2.5]),
    },
    CatalogEntry {
        name: "30/70",
        ports: 2,
        category: SplitterCategory::Fbt,
        loss: SplitterLoss::PerPort(&[5.2, 1.5]),
    },
    CatalogEntry {
        name: "20/80",
        ports: 2,
        category: SplitterCategory::Fbt,
        loss: SplitterLoss::PerPort(&[7.0, 1.0]),
    },
    CatalogEntry {
        name: "10/90",
        ports: 2,
        category: SplitterCategory::Fbt,
        loss: SplitterLoss::PerPort(&[10.0, 0.5]),
    },
];

/// Returns the catalog entry for `name`.
///
/// # Errors
/// [`CatalogError::UnknownSplitterType`] when `name` is not in the catalog.
pub fn lookup(name: &str) -> Result<&'static CatalogEntry, CatalogError> {
    let name: &str = name.trim();
    CATALOG
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| CatalogError::UnknownSplitterType {
            name: name.to_string(),
        })
}

/// All catalog entries, PLC first, in ascending split ratio.
pub fn entries() -> &'static [CatalogEntry] {
    &CATALOG
}

/// Catalog keys of one category, in catalog order.
pub fn names_by_category(category: SplitterCategory) -> Vec<&'static str> {
    CATALOG
        .iter()
        .filter(|entry| entry.category == category)
        .map(|entry| entry.name)
        .collect()
}
