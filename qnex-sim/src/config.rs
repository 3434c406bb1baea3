//! Simulator configuration

use crate::instrumentation::CheckpointStrategy;

/// Configuration for the dual ideal/noisy simulator
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Where statevector snapshots are taken
    ///
    /// Default: [`CheckpointStrategy::PerInstruction`]
    pub checkpoint_strategy: CheckpointStrategy,

    /// Treat noise entries for unknown gates as fatal
    ///
    /// When false, such entries are skipped with a warning. Circuit
    /// instructions naming unknown gates always fail the run.
    ///
    /// Default: false
    pub strict_gates: bool,

    /// Run shots of a track on the rayon pool
    ///
    /// Default: true
    pub parallel_shots: bool,

    /// Largest register accepted
    ///
    /// Memory grows with shots × checkpoints × 2^n amplitudes per track.
    ///
    /// Default: 16
    pub max_qubits: usize,

    /// Enable run statistics collection
    ///
    /// Default: false
    pub collect_statistics: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            checkpoint_strategy: CheckpointStrategy::PerInstruction,
            strict_gates: false,
            parallel_shots: true,
            max_qubits: 16,
            collect_statistics: false,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Fewer snapshots and no statistics
    ///
    /// - One checkpoint per layer
    /// - Parallel shots
    pub fn fast() -> Self {
        Self {
            checkpoint_strategy: CheckpointStrategy::PerLayer,
            collect_statistics: false,
            ..Default::default()
        }
    }

    /// Strict gate handling with statistics
    pub fn strict() -> Self {
        Self {
            strict_gates: true,
            collect_statistics: true,
            ..Default::default()
        }
    }

    /// Create a configuration for debugging
    ///
    /// - Strict gates
    /// - Shots run sequentially
    /// - Statistics collection
    pub fn debug() -> Self {
        Self {
            strict_gates: true,
            parallel_shots: false,
            collect_statistics: true,
            ..Default::default()
        }
    }

    pub fn with_checkpoint_strategy(mut self, strategy: CheckpointStrategy) -> Self {
        self.checkpoint_strategy = strategy;
        self
    }

    pub fn with_strict_gates(mut self, strict: bool) -> Self {
        self.strict_gates = strict;
        self
    }

    pub fn with_parallel_shots(mut self, enabled: bool) -> Self {
        self.parallel_shots = enabled;
        self
    }

    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Enable statistics collection
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.collect_statistics = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_qubits == 0 {
            return Err("max_qubits must be > 0".to_string());
        }
        if self.max_qubits > qnex_state::MAX_QUBITS {
            return Err(format!(
                "max_qubits must be at most {}, got {}",
                qnex_state::MAX_QUBITS,
                self.max_qubits
            ));
        }
        Ok(())
    }
}
