//! Catalog of supported gates and the noise mechanisms applicable to each
//!
//! The registry is immutable once built and is shared across the pipeline
//! behind an `Arc`.
//!
//! # Example
//!
//! ```rust
//! use qnex_core::registry::GateRegistry;
//! use qnex_core::noise::NoiseChannelKind;
//!
//! let registry = GateRegistry::standard();
//! let h = registry.lookup("h").unwrap();
//! assert_eq!(h.arity().qubits(), Some(1));
//! assert!(registry
//!     .applicable_channels("h")
//!     .unwrap()
//!     .contains(NoiseChannelKind::Depolarizing));
//! ```

use crate::gate::Gate;
use crate::noise::{ChannelSet, NoiseChannelKind};
use crate::{QuantumError, Result};
use std::collections::HashMap;

use NoiseChannelKind::*;

/// Lookup table from gate identifier to [`Gate`]
#[derive(Debug, Clone)]
pub struct GateRegistry {
    gates: HashMap<&'static str, Gate>,
    /// Registration order, used for stable listings
    order: Vec<&'static str>,
}

impl GateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            gates: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registry holding the standard gate catalog
    pub fn standard() -> Self {
        let pauli_like = [BitFlip, PhaseFlip, PhaseDamping, ThermalRelaxation];
        let clifford_t = [BitFlip, PhaseFlip, ThermalRelaxation];
        let phase_rot = [PhaseFlip, ThermalRelaxation];

        let mut registry = Self::new();
        let gates = [
            Gate::unitary("id", "Identity", "Leaves the qubit unchanged for one gate duration", 1, &pauli_like),
            Gate::unitary("x", "Pauli-X", "Bit flip: swaps |0⟩ and |1⟩", 1, &pauli_like),
            Gate::unitary("y", "Pauli-Y", "Bit and phase flip", 1, &clifford_t),
            Gate::unitary("z", "Pauli-Z", "Phase flip: negates the |1⟩ amplitude", 1, &clifford_t),
            Gate::unitary(
                "h",
                "Hadamard",
                "Creates an equal superposition of |0⟩ and |1⟩",
                1,
                &[BitFlip, PhaseFlip, PhaseDamping, AmplitudeDamping, Depolarizing, ThermalRelaxation],
            ),
            Gate::unitary("s", "S", "Quarter-turn phase gate (√Z)", 1, &clifford_t),
            Gate::unitary("sdg", "S†", "Inverse of S", 1, &clifford_t),
            Gate::unitary("t", "T", "Eighth-turn phase gate (√S)", 1, &clifford_t),
            Gate::unitary("tdg", "T†", "Inverse of T", 1, &clifford_t),
            Gate::unitary("rx", "RX", "Rotation about the X axis", 1, &[AmplitudeDamping, BitFlip])
                .with_params(1),
            Gate::unitary(
                "ry",
                "RY",
                "Rotation about the Y axis",
                1,
                &[AmplitudeDamping, BitFlip, ThermalRelaxation],
            )
            .with_params(1),
            Gate::unitary("rz", "RZ", "Rotation about the Z axis", 1, &phase_rot).with_params(1),
            Gate::unitary("u1", "U1", "Phase rotation", 1, &phase_rot).with_params(1),
            Gate::unitary("u2", "U2", "Single-pulse rotation", 1, &phase_rot).with_params(2),
            Gate::unitary(
                "u3",
                "U3",
                "Generic single-qubit rotation",
                1,
                &[AmplitudeDamping, PhaseFlip, ThermalRelaxation],
            )
            .with_params(3),
            Gate::unitary("cx", "CNOT", "Flips the target when the control is |1⟩", 2, &[Depolarizing]),
            Gate::unitary(
                "cz",
                "Controlled-Z",
                "Negates |11⟩",
                2,
                &[Depolarizing, PhaseFlip],
            ),
            Gate::unitary("swap", "SWAP", "Exchanges two qubits", 2, &[Depolarizing, BitFlip]),
            Gate::unitary(
                "ccx",
                "Toffoli",
                "Flips the target when both controls are |1⟩",
                3,
                &[Depolarizing, BitFlip, PhaseFlip],
            ),
            Gate::non_unitary(
                "measure",
                "Measure",
                "Projects the qubit onto the computational basis",
                1,
                &[ReadoutError],
            ),
            Gate::structural("barrier", "Barrier", "Scheduling fence with no effect on the state"),
        ];
        for gate in gates {
            registry.register(gate);
        }
        registry
    }

    /// Register a gate
    ///
    /// If a gate with the same identifier already exists, it will be replaced.
    pub fn register(&mut self, gate: Gate) {
        let id = gate.id();
        if self.gates.insert(id, gate).is_none() {
            self.order.push(id);
        }
    }

    /// Look up a gate by identifier
    ///
    /// # Errors
    /// Returns [`QuantumError::UnknownGate`] if the identifier is not registered
    pub fn lookup(&self, gate_id: &str) -> Result<&Gate> {
        self.gates
            .get(gate_id)
            .ok_or_else(|| QuantumError::UnknownGate(gate_id.to_string()))
    }

    /// Noise mechanisms applicable to a gate
    pub fn applicable_channels(&self, gate_id: &str) -> Result<ChannelSet> {
        self.lookup(gate_id).map(Gate::channels)
    }

    /// Check if a gate is registered
    pub fn contains(&self, gate_id: &str) -> bool {
        self.gates.contains_key(gate_id)
    }

    /// Gate identifiers in registration order
    pub fn gate_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    /// Gates in registration order
    pub fn gates(&self) -> impl Iterator<Item = &Gate> + '_ {
        self.order.iter().filter_map(|id| self.gates.get(id))
    }

    /// Get the number of registered gates
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

impl Default for GateRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateArity;

    #[test]
    fn test_standard_catalog() {
        let registry = GateRegistry::standard();
        assert_eq!(registry.len(), 21);
        for id in [
            "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "rx", "ry", "rz", "u1", "u2", "u3",
            "cx", "cz", "swap", "ccx", "measure", "barrier",
        ] {
            assert!(registry.contains(id), "missing {}", id);
        }
        assert_eq!(registry.gate_ids().next(), Some("id"));
        assert_eq!(registry.gate_ids().last(), Some("barrier"));
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = GateRegistry::standard();
        assert!(matches!(
            registry.lookup("foo"),
            Err(QuantumError::UnknownGate(id)) if id == "foo"
        ));
    }

    #[test]
    fn test_arities() {
        let registry = GateRegistry::standard();
        assert_eq!(registry.lookup("cx").unwrap().arity(), GateArity::Qubits(2));
        assert_eq!(registry.lookup("ccx").unwrap().arity(), GateArity::Qubits(3));
        assert_eq!(registry.lookup("barrier").unwrap().arity(), GateArity::Structural);
        assert!(!registry.lookup("measure").unwrap().is_unitary());
        assert_eq!(registry.lookup("u3").unwrap().num_params(), 3);
    }

    #[test]
    fn test_applicable_channels() {
        let registry = GateRegistry::standard();

        let rx = registry.applicable_channels("rx").unwrap();
        assert_eq!(rx.iter().collect::<Vec<_>>(), vec![BitFlip, AmplitudeDamping]);

        let cz = registry.applicable_channels("cz").unwrap();
        assert!(cz.contains(Depolarizing));
        assert!(cz.contains(PhaseFlip));
        assert!(!cz.contains(ThermalRelaxation));

        let measure = registry.applicable_channels("measure").unwrap();
        assert_eq!(measure.iter().collect::<Vec<_>>(), vec![ReadoutError]);

        assert!(registry.applicable_channels("barrier").unwrap().is_empty());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = GateRegistry::new();
        registry.register(Gate::unitary("x", "X", "", 1, &[]));
        registry.register(Gate::unitary("x", "X2", "", 1, &[BitFlip]));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.gate_ids().count(), 1);
        assert_eq!(registry.lookup("x").unwrap().display_name(), "X2");
    }
}
