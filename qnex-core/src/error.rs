//! Error types for qnex-core

use thiserror::Error;

/// Errors raised while describing circuits, gates and noise
#[derive(Debug, Error)]
pub enum QuantumError {
    /// Invalid qubit index used
    #[error("Invalid qubit index {0}: circuit has only {1} qubits")]
    InvalidQubit(usize, usize),

    /// Gate applied to wrong number of qubits
    #[error("Gate '{gate}' requires {expected} qubits, but {actual} were provided")]
    InvalidQubitCount {
        gate: String,
        expected: usize,
        actual: usize,
    },

    /// Gate given the wrong number of parameters
    #[error("Gate '{gate}' takes {expected} parameters, but {actual} were provided")]
    InvalidParameterCount {
        gate: String,
        expected: usize,
        actual: usize,
    },

    /// Circuit has no qubits
    #[error("Circuit must have at least one qubit")]
    EmptyCircuit,

    /// Duplicate qubit in gate operation
    #[error("Duplicate qubit {0} in gate operation")]
    DuplicateQubit(usize),

    /// Gate identifier missing from the registry
    #[error("Unknown gate '{0}'")]
    UnknownGate(String),

    /// T1/T2/gate time combination that cannot describe a physical qubit
    #[error("Invalid thermal relaxation parameters for gate '{gate}': {reason}")]
    InvalidRelaxationParams { gate: String, reason: String },

    /// Noise profile could not be read or written
    #[error("Noise configuration serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic validation error
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl QuantumError {
    /// Create an invalid qubit error
    pub fn invalid_qubit(qubit: usize, num_qubits: usize) -> Self {
        Self::InvalidQubit(qubit, num_qubits)
    }

    /// Create an invalid qubit count error
    pub fn invalid_qubit_count(gate: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::InvalidQubitCount {
            gate: gate.into(),
            expected,
            actual,
        }
    }

    pub fn invalid_relaxation(gate: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRelaxationParams {
            gate: gate.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_qubit_error() {
        let err = QuantumError::invalid_qubit(5, 3);
        let msg = format!("{}", err);
        assert!(msg.contains("5"));
        assert!(msg.contains("3"));
    }

    #[test]
    fn test_invalid_qubit_count_error() {
        let err = QuantumError::invalid_qubit_count("cx", 2, 1);
        let msg = err.to_string();
        assert!(msg.contains("'cx'"));
        assert!(msg.contains("requires 2"));
    }

    #[test]
    fn test_relaxation_error_names_gate() {
        let err = QuantumError::invalid_relaxation("h", "t2 must not exceed 2*t1");
        let msg = err.to_string();
        assert!(msg.contains("'h'"));
        assert!(msg.contains("2*t1"));
    }

    #[test]
    fn test_unknown_gate_error() {
        let msg = QuantumError::UnknownGate("foo".into()).to_string();
        assert_eq!(msg, "Unknown gate 'foo'");
    }
}
