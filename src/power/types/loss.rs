use serde::{Deserialize, Serialize};

use crate::topology::types::connection::Connection;

/// Fiber attenuation applied when no other value is configured (dB/km).
pub const DEFAULT_FIBER_LOSS_DB_PER_KM: f64 = 0.35;
/// Loss of one mated connector pair applied when no other value is configured (dB).
pub const DEFAULT_CONNECTOR_LOSS_DB: f64 = 0.5;

/// Passive losses along a cable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LossModel {
    /// Fiber attenuation coefficient (dB/km).
    pub fiber_loss_db_per_km: f64,
    /// Loss per connector (dB).
    pub connector_loss_db: f64,
}

impl Default for LossModel {
    fn default() -> Self {
        LossModel {
            fiber_loss_db_per_km: DEFAULT_FIBER_LOSS_DB_PER_KM,
            connector_loss_db: DEFAULT_CONNECTOR_LOSS_DB,
        }
    }
}

impl LossModel {
    pub fn fiber_loss(&self, length_meters: f64) -> f64 {
        (length_meters / 1000.0) * self.fiber_loss_db_per_km
    }

    pub fn connector_loss(&self, connector_count: u32) -> f64 {
        f64::from(connector_count) * self.connector_loss_db
    }

    /// Total loss (dB) of one connection.
    pub fn link_loss(&self, connection: &Connection) -> f64 {
        self.fiber_loss(connection.cable_length_meters)
            + self.connector_loss(connection.connector_count)
    }
}
