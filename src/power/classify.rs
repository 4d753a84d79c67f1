use serde::{Deserialize, Serialize};
use std::fmt;

/// Margin above sensitivity (dB) at or above which a link counts as healthy.
pub const GOOD_MARGIN_DB: f64 = 3.0;

/// Health of one ONU's optical link.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkQuality {
    /// Margin of at least [`GOOD_MARGIN_DB`].
    Good,
    /// Receivable, but with less than [`GOOD_MARGIN_DB`] to spare.
    Marginal,
    /// Below the receiver sensitivity.
    Fail,
    /// The ONU is not reached by the OLT.
    Unknown,
}

impl LinkQuality {
    pub fn label(&self) -> &'static str {
        match self {
            LinkQuality::Good => "GOOD",
            LinkQuality::Marginal => "MARGINAL",
            LinkQuality::Fail => "FAIL",
            LinkQuality::Unknown => "N/A",
        }
    }
}

impl fmt::Display for LinkQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Received power minus sensitivity (dB).
pub fn margin(received_dbm: f64, sensitivity_dbm: f64) -> f64 {
    received_dbm - sensitivity_dbm
}

/// Classifies a received power against a sensitivity threshold.
///
/// `None` (no power computed) is [`LinkQuality::Unknown`]. Both boundaries are inclusive:
/// a margin of exactly 3 dB is good, a margin of exactly 0 dB is marginal.
pub fn classify(received_dbm: Option<f64>, sensitivity_dbm: f64) -> LinkQuality {
    let Some(received) = received_dbm else {
        return LinkQuality::Unknown;
    };
    let margin: f64 = margin(received, sensitivity_dbm);
    if margin >= GOOD_MARGIN_DB {
        LinkQuality::Good
    } else if margin >= 0.0 {
        LinkQuality::Marginal
    } else {
        LinkQuality::Fail
    }
}
