//! Error types for the simulator

use qnex_core::QuantumError;
use qnex_state::StateError;
use thiserror::Error;

/// Result type for simulator operations
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors that end a simulation run
///
/// A run either completes fully or fails with exactly one of these.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Gate not present in the registry (strict mode)
    #[error("Unknown gate '{0}'")]
    UnknownGate(String),

    /// Thermal relaxation enabled with unphysical timing
    #[error("Invalid thermal relaxation parameters for gate '{gate}': {reason}")]
    InvalidRelaxationParams { gate: String, reason: String },

    /// Circuit text could not be parsed
    #[error("Parse error on line {line}: {message}")]
    CircuitParse { line: usize, message: String },

    /// Circuit is structurally invalid
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Invalid configuration or run arguments
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The executor failed mid-run
    #[error("Execution failed: {0}")]
    Execution(#[from] StateError),

    /// The run was cancelled through its token
    #[error("Simulation cancelled")]
    Cancelled,
}

impl SimulationError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::CircuitParse {
            line,
            message: message.into(),
        }
    }
}

impl From<QuantumError> for SimulationError {
    fn from(err: QuantumError) -> Self {
        match err {
            QuantumError::UnknownGate(id) => SimulationError::UnknownGate(id),
            QuantumError::InvalidRelaxationParams { gate, reason } => {
                SimulationError::InvalidRelaxationParams { gate, reason }
            }
            other => SimulationError::InvalidCircuit(other.to_string()),
        }
    }
}
