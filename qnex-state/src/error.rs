//! Error types for state vector operations

use thiserror::Error;

/// Errors that can occur during state vector operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Invalid qubit index
    #[error("Invalid qubit index {index} for {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// Invalid state dimension
    #[error("Invalid state dimension {dimension}, expected power of 2")]
    InvalidDimension { dimension: usize },

    /// State not normalized
    #[error("State vector not normalized, norm = {norm}")]
    NotNormalized { norm: f64 },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Requested register is larger than a dense vector can hold
    #[error("{num_qubits} qubits exceeds the dense state limit of {max}")]
    TooManyQubits { num_qubits: usize, max: usize },

    /// No matrix is known for this gate
    #[error("Gate '{0}' has no unitary matrix")]
    UnsupportedGate(String),

    /// Gate was given the wrong number of angles
    #[error("Gate '{gate}' takes {expected} parameters, got {actual}")]
    InvalidParameters {
        gate: String,
        expected: usize,
        actual: usize,
    },

    /// Every Kraus branch had zero probability on this state
    #[error("Channel has no branch with non-zero probability")]
    ZeroProbabilityChannel,
}

/// Result type for state vector operations
pub type Result<T> = std::result::Result<T, StateError>;
