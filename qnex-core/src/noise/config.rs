//! User-facing noise profile: per-gate error percentages and timing

use super::types::NoiseChannelKind;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default gate duration in nanoseconds
pub const DEFAULT_GATE_TIME_NS: f64 = 50.0;
/// Default T1 relaxation time in nanoseconds
pub const DEFAULT_T1_NS: f64 = 19_000.0;
/// Default T2 dephasing time in nanoseconds
pub const DEFAULT_T2_NS: f64 = 20_000.0;

fn default_gate_time() -> f64 {
    DEFAULT_GATE_TIME_NS
}

fn default_t1() -> f64 {
    DEFAULT_T1_NS
}

fn default_t2() -> f64 {
    DEFAULT_T2_NS
}

/// Noise parameters for one gate kind
///
/// Probabilities are percentages in `[0, 100]`. Missing entries
/// deserialize to 0 and thermal relaxation defaults to disabled.
///
/// # Example
/// ```
/// use qnex_core::noise::{GateNoiseParams, NoiseChannelKind};
///
/// let params = GateNoiseParams::default()
///     .with_probability(NoiseChannelKind::BitFlip, 5.0)
///     .with_thermal_relaxation(true);
/// assert_eq!(params.probability(NoiseChannelKind::BitFlip), 5.0);
/// assert_eq!(params.t1, 19_000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateNoiseParams {
    pub bit_flip: f64,
    pub phase_flip: f64,
    pub amplitude_damping: f64,
    pub phase_damping: f64,
    pub depolarizing: f64,
    pub readout_error: f64,

    /// Enables the T1/T2 thermal relaxation channel
    pub thermal_relaxation: bool,

    /// Gate duration (ns)
    #[serde(default = "default_gate_time")]
    pub gate_time: f64,
    /// Energy relaxation time (ns)
    #[serde(default = "default_t1")]
    pub t1: f64,
    /// Dephasing time (ns)
    #[serde(default = "default_t2")]
    pub t2: f64,
}

impl Default for GateNoiseParams {
    fn default() -> Self {
        Self {
            bit_flip: 0.0,
            phase_flip: 0.0,
            amplitude_damping: 0.0,
            phase_damping: 0.0,
            depolarizing: 0.0,
            readout_error: 0.0,
            thermal_relaxation: false,
            gate_time: DEFAULT_GATE_TIME_NS,
            t1: DEFAULT_T1_NS,
            t2: DEFAULT_T2_NS,
        }
    }
}

impl GateNoiseParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage configured for `kind`
    ///
    /// Thermal relaxation reports 100 when enabled and 0 otherwise.
    pub fn probability(&self, kind: NoiseChannelKind) -> f64 {
        match kind {
            NoiseChannelKind::BitFlip => self.bit_flip,
            NoiseChannelKind::PhaseFlip => self.phase_flip,
            NoiseChannelKind::AmplitudeDamping => self.amplitude_damping,
            NoiseChannelKind::PhaseDamping => self.phase_damping,
            NoiseChannelKind::Depolarizing => self.depolarizing,
            NoiseChannelKind::ReadoutError => self.readout_error,
            NoiseChannelKind::ThermalRelaxation => {
                if self.thermal_relaxation {
                    100.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Set the percentage for `kind`; any positive value enables thermal relaxation
    pub fn set_probability(&mut self, kind: NoiseChannelKind, percent: f64) {
        match kind {
            NoiseChannelKind::BitFlip => self.bit_flip = percent,
            NoiseChannelKind::PhaseFlip => self.phase_flip = percent,
            NoiseChannelKind::AmplitudeDamping => self.amplitude_damping = percent,
            NoiseChannelKind::PhaseDamping => self.phase_damping = percent,
            NoiseChannelKind::Depolarizing => self.depolarizing = percent,
            NoiseChannelKind::ReadoutError => self.readout_error = percent,
            NoiseChannelKind::ThermalRelaxation => self.thermal_relaxation = percent > 0.0,
        }
    }

    pub fn with_probability(mut self, kind: NoiseChannelKind, percent: f64) -> Self {
        self.set_probability(kind, percent);
        self
    }

    pub fn with_thermal_relaxation(mut self, enabled: bool) -> Self {
        self.thermal_relaxation = enabled;
        self
    }

    /// Set gate duration, T1 and T2 (all in nanoseconds)
    pub fn with_timing(mut self, gate_time: f64, t1: f64, t2: f64) -> Self {
        self.gate_time = gate_time;
        self.t1 = t1;
        self.t2 = t2;
        self
    }

    /// Whether any mechanism is switched on
    pub fn is_noisy(&self) -> bool {
        NoiseChannelKind::ALL
            .iter()
            .any(|&kind| self.probability(kind) > 0.0)
    }
}

/// Noise profile for a whole run: gate identifier → [`GateNoiseParams`]
///
/// Gates without an entry are noiseless. Serializes as a plain JSON object
/// keyed by gate identifier.
///
/// # Example
/// ```
/// use qnex_core::noise::NoiseConfiguration;
///
/// let json = r#"{ "h": { "bit_flip": 10.0 }, "measure": { "readout_error": 2.0 } }"#;
/// let config = NoiseConfiguration::from_json(json).unwrap();
/// assert_eq!(config.get("h").unwrap().bit_flip, 10.0);
/// assert!(config.get("x").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoiseConfiguration {
    gates: BTreeMap<String, GateNoiseParams>,
}

impl NoiseConfiguration {
    /// Empty (noiseless) configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, gate_id: impl Into<String>, params: GateNoiseParams) {
        self.gates.insert(gate_id.into(), params);
    }

    pub fn with_gate(mut self, gate_id: impl Into<String>, params: GateNoiseParams) -> Self {
        self.set(gate_id, params);
        self
    }

    pub fn get(&self, gate_id: &str) -> Option<&GateNoiseParams> {
        self.gates.get(gate_id)
    }

    /// Gate entries in identifier order
    pub fn gates(&self) -> impl Iterator<Item = (&str, &GateNoiseParams)> {
        self.gates.iter().map(|(id, params)| (id.as_str(), params))
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Parse a profile from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON form of the profile
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuantumError;

    #[test]
    fn test_defaults() {
        let params = GateNoiseParams::default();
        assert_eq!(params.gate_time, 50.0);
        assert_eq!(params.t1, 19_000.0);
        assert_eq!(params.t2, 20_000.0);
        assert!(!params.is_noisy());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = NoiseConfiguration::from_json(r#"{"x": {"phase_flip": 3.5}}"#).unwrap();
        let x = config.get("x").unwrap();
        assert_eq!(x.phase_flip, 3.5);
        assert_eq!(x.bit_flip, 0.0);
        assert!(!x.thermal_relaxation);
        assert_eq!(x.t1, DEFAULT_T1_NS);
    }

    #[test]
    fn test_json_round_trip() {
        let config = NoiseConfiguration::new().with_gate(
            "cx",
            GateNoiseParams::new()
                .with_probability(NoiseChannelKind::Depolarizing, 1.5)
                .with_thermal_relaxation(true)
                .with_timing(300.0, 50_000.0, 70_000.0),
        );
        let json = config.to_json().unwrap();
        assert_eq!(NoiseConfiguration::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            NoiseConfiguration::from_json("{not json"),
            Err(QuantumError::Serialization(_))
        ));
    }

    #[test]
    fn test_thermal_switch() {
        let mut params = GateNoiseParams::new();
        params.set_probability(NoiseChannelKind::ThermalRelaxation, 1.0);
        assert!(params.thermal_relaxation);
        assert_eq!(params.probability(NoiseChannelKind::ThermalRelaxation), 100.0);
        assert!(params.is_noisy());
    }
}
