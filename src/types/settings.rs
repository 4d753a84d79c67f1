//! Per-diagram optical settings.

use serde::{Deserialize, Serialize};

/// OLT transmit power applied when a diagram carries no explicit value (dBm).
pub const DEFAULT_OLT_POWER_DBM: f64 = 5.0;
/// Receiver sensitivity applied to ONUs without their own threshold (dBm).
pub const DEFAULT_ONU_SENSITIVITY_DBM: f64 = -28.0;

/// Settings stored alongside every diagram.
///
/// `olt_power` is transmitted on every PON port of the diagram's OLT.
/// `onu_sensitivity` is the receiver threshold used by ONUs that do not override it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagramSettings {
    /// OLT transmit power (dBm).
    pub olt_power: f64,
    /// Default ONU receiver sensitivity (dBm).
    pub onu_sensitivity: f64,
}

impl Default for DiagramSettings {
    fn default() -> Self {
        DiagramSettings {
            olt_power: DEFAULT_OLT_POWER_DBM,
            onu_sensitivity: DEFAULT_ONU_SENSITIVITY_DBM,
        }
    }
}

impl DiagramSettings {
    /// Updates `olt_power` from raw user text.
    ///
    /// Malformed or non-finite input keeps the last valid value and returns `false`.
    pub fn set_olt_power_input(&mut self, input: &str) -> bool {
        match parse_dbm(input) {
            Some(value) => {
                self.olt_power = value;
                true
            }
            None => false,
        }
    }

    /// Updates `onu_sensitivity` from raw user text, with the same fallback as
    /// [`set_olt_power_input`](Self::set_olt_power_input).
    pub fn set_onu_sensitivity_input(&mut self, input: &str) -> bool {
        match parse_dbm(input) {
            Some(value) => {
                self.onu_sensitivity = value;
                true
            }
            None => false,
        }
    }
}

/// Parses a dBm value typed by a user. Returns `None` for anything that is not a finite number.
pub fn parse_dbm(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings: DiagramSettings = DiagramSettings::default();
        assert_eq!(settings.olt_power, 5.0);
        assert_eq!(settings.onu_sensitivity, -28.0);
    }

    #[test]
    fn test_malformed_input_keeps_last_valid_value() {
        let mut settings: DiagramSettings = DiagramSettings::default();

        assert!(settings.set_olt_power_input(" 3.5 "));
        assert_eq!(settings.olt_power, 3.5);

        assert!(!settings.set_olt_power_input("abc"));
        assert!(!settings.set_olt_power_input(""));
        assert!(!settings.set_olt_power_input("NaN"));
        assert!(!settings.set_olt_power_input("inf"));
        assert_eq!(settings.olt_power, 3.5);

        assert!(!settings.set_onu_sensitivity_input("-2x"));
        assert_eq!(settings.onu_sensitivity, -28.0);
        assert!(settings.set_onu_sensitivity_input("-27"));
        assert_eq!(settings.onu_sensitivity, -27.0);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let settings: DiagramSettings = serde_json::from_str(r#"{"oltPower": 2.0}"#).unwrap();
        assert_eq!(settings.olt_power, 2.0);
        assert_eq!(settings.onu_sensitivity, DEFAULT_ONU_SENSITIVITY_DBM);
    }
}
