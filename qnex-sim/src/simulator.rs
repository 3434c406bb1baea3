//! Dual-track simulator

use std::sync::Arc;
use std::time::Instant;

use qnex_core::noise::{build_noise_model, NoiseConfiguration};
use qnex_core::{Circuit, GateRegistry};
use qnex_state::{basis_labels, QuantumExecutor, StatevectorExecutor};
use rand::Rng;
use tracing::{debug, info};

use crate::{
    aggregation::aggregate,
    cancel::CancellationToken,
    config::SimulatorConfig,
    coordinator::DualRunCoordinator,
    error::{Result, SimulationError},
    instrumentation::instrument,
    parser::{CircuitParser, QasmParser},
    result::SimulationResult,
    statistics::RunStatistics,
};

/// Runs a circuit twice, once ideal and once under a per-gate noise
/// configuration, and compares the two at every checkpoint
///
/// # Example
///
/// ```
/// use qnex_core::noise::{GateNoiseParams, NoiseChannelKind, NoiseConfiguration};
/// use qnex_sim::{Simulator, SimulatorConfig, Track};
///
/// let simulator = Simulator::new(SimulatorConfig::default());
/// let noise = NoiseConfiguration::new().with_gate(
///     "x",
///     GateNoiseParams::new().with_probability(NoiseChannelKind::BitFlip, 100.0),
/// );
///
/// let result = simulator
///     .run_text("qreg q[1]; x q[0];", 10, Some(7), &noise)
///     .unwrap();
///
/// assert_eq!(result.fidelity_trend(), &[1.0, 0.0]);
/// assert_eq!(result.final_layer(Track::Noisy).unwrap().counts, vec![10, 0]);
/// ```
pub struct Simulator<E: QuantumExecutor = StatevectorExecutor, P: CircuitParser = QasmParser> {
    config: SimulatorConfig,
    registry: Arc<GateRegistry>,
    executor: E,
    parser: P,
}

impl Simulator<StatevectorExecutor> {
    /// Statevector simulator over the standard gate catalog
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_executor(config, Arc::new(GateRegistry::standard()), StatevectorExecutor::new())
    }

    /// Statevector simulator over a caller-supplied registry
    pub fn with_registry(config: SimulatorConfig, registry: Arc<GateRegistry>) -> Self {
        Self::with_executor(config, registry, StatevectorExecutor::new())
    }
}

impl Default for Simulator<StatevectorExecutor> {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

impl<E: QuantumExecutor> Simulator<E> {
    pub fn with_executor(config: SimulatorConfig, registry: Arc<GateRegistry>, executor: E) -> Self {
        Self {
            config,
            registry,
            executor,
            parser: QasmParser::new(),
        }
    }
}

impl<E: QuantumExecutor, P: CircuitParser> Simulator<E, P> {
    /// Replace the parser used by [`Simulator::run_text`]
    pub fn with_parser<Q: CircuitParser>(self, parser: Q) -> Simulator<E, Q> {
        Simulator {
            config: self.config,
            registry: self.registry,
            executor: self.executor,
            parser,
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &GateRegistry {
        &self.registry
    }

    /// Parse source text and run it
    ///
    /// # Errors
    /// [`SimulationError::CircuitParse`] before any simulation work, otherwise
    /// as [`Simulator::run`]
    pub fn run_text(
        &self,
        source: &str,
        shots: usize,
        seed: Option<u64>,
        noise: &NoiseConfiguration,
    ) -> Result<SimulationResult> {
        let circuit = self.parser.parse(source)?;
        self.run(&circuit, shots, seed, noise)
    }

    /// Run a circuit with both tracks
    ///
    /// When `seed` is `None` a fresh one is drawn and stored in the result,
    /// so every run can be replayed.
    ///
    /// # Errors
    /// - [`SimulationError::InvalidConfig`] for zero shots, an oversized
    ///   register or an invalid [`SimulatorConfig`]
    /// - [`SimulationError::UnknownGate`] for an instruction naming a gate
    ///   outside the registry, or for such a noise entry in strict mode
    /// - [`SimulationError::InvalidRelaxationParams`] from the noise configuration
    /// - [`SimulationError::InvalidCircuit`] for operand mismatches
    pub fn run(
        &self,
        circuit: &Circuit,
        shots: usize,
        seed: Option<u64>,
        noise: &NoiseConfiguration,
    ) -> Result<SimulationResult> {
        self.run_with_cancel(circuit, shots, seed, noise, &CancellationToken::new())
    }

    /// [`Simulator::run`] that stops with [`SimulationError::Cancelled`]
    /// once `cancel` fires
    pub fn run_with_cancel(
        &self,
        circuit: &Circuit,
        shots: usize,
        seed: Option<u64>,
        noise: &NoiseConfiguration,
        cancel: &CancellationToken,
    ) -> Result<SimulationResult> {
        let total_start = Instant::now();

        self.config.validate().map_err(SimulationError::InvalidConfig)?;
        if shots == 0 {
            return Err(SimulationError::InvalidConfig(
                "shots must be at least 1".to_string(),
            ));
        }
        let num_qubits = circuit.num_qubits();
        if num_qubits > self.config.max_qubits {
            return Err(SimulationError::InvalidConfig(format!(
                "circuit has {} qubits, limit is {}",
                num_qubits, self.config.max_qubits
            )));
        }

        circuit.validate(&self.registry)?;

        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        let instrumented = instrument(circuit, &self.registry, self.config.checkpoint_strategy);
        debug!(
            checkpoints = instrumented.checkpoint_count(),
            strategy = ?self.config.checkpoint_strategy,
            "circuit instrumented"
        );

        let noise_start = Instant::now();
        let model = build_noise_model(&self.registry, noise, self.config.strict_gates)?;
        let noise_model_time = noise_start.elapsed();

        let coordinator = DualRunCoordinator::new(
            &self.executor,
            &self.registry,
            &model,
            cancel,
            self.config.parallel_shots,
        );
        let (ideal, noisy) = coordinator.run(&instrumented, shots, seed)?;

        let aggregation_start = Instant::now();
        let ideal_stats = ideal.stats.clone();
        let noisy_stats = noisy.stats.clone();
        let checkpoints: Vec<_> = instrumented.checkpoints().cloned().collect();
        let aggregated = aggregate(ideal, noisy, &checkpoints, num_qubits)?;
        let aggregation_time = aggregation_start.elapsed();

        let statistics = self.config.collect_statistics.then(|| RunStatistics {
            total_time: total_start.elapsed(),
            noise_model_time,
            aggregation_time,
            ideal: ideal_stats,
            noisy: noisy_stats,
            checkpoints: checkpoints.len(),
            shots,
        });

        info!(
            qubits = num_qubits,
            shots,
            seed,
            checkpoints = checkpoints.len(),
            final_fidelity = aggregated.fidelity.last().copied().unwrap_or(1.0),
            elapsed = ?total_start.elapsed(),
            "dual run complete"
        );

        Ok(SimulationResult {
            basis_states: basis_labels(num_qubits),
            seed,
            shots,
            num_qubits,
            ideal: aggregated.ideal,
            noisy: aggregated.noisy,
            fidelity: aggregated.fidelity,
            statistics,
        })
    }
}

/// Parse and run with the default configuration
pub fn simulate(
    source: &str,
    shots: usize,
    seed: Option<u64>,
    noise: &NoiseConfiguration,
) -> Result<SimulationResult> {
    Simulator::default().run_text(source, shots, seed, noise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::Track;
    use crate::instrumentation::CheckpointStrategy;
    use qnex_core::noise::{GateNoiseParams, NoiseChannelKind};

    #[test]
    fn test_noiseless_run_has_unit_fidelity() {
        let result = simulate("qreg q[2]; h q[0]; cx q[0], q[1];", 50, Some(3), &NoiseConfiguration::new())
            .unwrap();
        assert_eq!(result.num_checkpoints(), 3);
        assert!(result.fidelity_trend().iter().all(|&f| (f - 1.0).abs() < 1e-12));
        assert_eq!(result.basis_states, vec!["00", "01", "10", "11"]);
        assert_eq!(result.ideal, result.noisy);
    }

    #[test]
    fn test_zero_shots_rejected() {
        let err = simulate("qreg q[1]; h q[0];", 0, None, &NoiseConfiguration::new()).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidConfig(_)));
    }

    #[test]
    fn test_max_qubits_enforced() {
        let simulator = Simulator::new(SimulatorConfig::default().with_max_qubits(2));
        let err = simulator
            .run_text("qreg q[3]; h q[0];", 1, Some(0), &NoiseConfiguration::new())
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_circuit_gate_fails_in_every_mode() {
        let source = "qreg q[1]; h q[0]; frobnicate q[0];";
        let err = simulate(source, 5, Some(1), &NoiseConfiguration::new()).unwrap_err();
        assert!(matches!(err, SimulationError::UnknownGate(ref g) if g == "frobnicate"));

        let err = simulate("qreg q[1]; sx q[0];", 10, Some(1), &NoiseConfiguration::new())
            .unwrap_err();
        assert!(matches!(err, SimulationError::UnknownGate(ref g) if g == "sx"));

        let strict = Simulator::new(SimulatorConfig::strict());
        let err = strict.run_text(source, 5, Some(1), &NoiseConfiguration::new()).unwrap_err();
        assert!(matches!(err, SimulationError::UnknownGate(ref g) if g == "frobnicate"));
    }

    #[test]
    fn test_unknown_noise_entry_is_skipped_when_lenient() {
        let noise = NoiseConfiguration::new().with_gate(
            "frobnicate",
            GateNoiseParams::new().with_probability(NoiseChannelKind::BitFlip, 50.0),
        );
        let result = simulate("qreg q[1]; h q[0];", 5, Some(1), &noise).unwrap();
        assert_eq!(result.ideal, result.noisy);
    }

    /// Reads one `<gate> <qubit>` pair per line
    struct PlainParser;

    impl CircuitParser for PlainParser {
        fn parse(&self, source: &str) -> Result<Circuit> {
            let mut circuit = Circuit::new(2).map_err(SimulationError::from)?;
            for (index, line) in source.lines().enumerate() {
                let mut words = line.split_whitespace();
                let (Some(gate), Some(qubit)) = (words.next(), words.next()) else {
                    continue;
                };
                let qubit: usize = qubit
                    .parse()
                    .map_err(|_| SimulationError::parse(index + 1, "bad qubit"))?;
                circuit.push(qnex_core::Instruction::new(gate, &[qubit], &[]))?;
            }
            Ok(circuit)
        }
    }

    #[test]
    fn test_custom_parser_is_used_for_text() {
        let simulator = Simulator::default().with_parser(PlainParser);
        let result = simulator
            .run_text("x 0\nh 1\n", 4, Some(3), &NoiseConfiguration::new())
            .unwrap();
        assert_eq!(result.num_qubits, 2);
        assert_eq!(result.num_checkpoints(), 3);
        assert_eq!(result.probability_of(Track::Ideal, 1, 0, "01"), Some(100.0));

        let err = simulator
            .run_text("x zero\n", 4, Some(3), &NoiseConfiguration::new())
            .unwrap_err();
        assert!(matches!(err, SimulationError::CircuitParse { line: 1, .. }));
    }

    #[test]
    fn test_statistics_do_not_affect_equality() {
        let simulator = Simulator::new(SimulatorConfig::debug());
        let noise = NoiseConfiguration::new().with_gate(
            "h",
            GateNoiseParams::new().with_probability(NoiseChannelKind::PhaseFlip, 50.0),
        );
        let a = simulator.run_text("qreg q[1]; h q[0]; h q[0];", 16, Some(4), &noise).unwrap();
        let b = simulator.run_text("qreg q[1]; h q[0]; h q[0];", 16, Some(4), &noise).unwrap();
        assert!(a.statistics.is_some() && b.statistics.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_operand_mismatch_is_invalid_circuit() {
        let err = simulate("qreg q[2]; cx q[0], q[0];", 1, Some(0), &NoiseConfiguration::new())
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidCircuit(_)));
    }

    #[test]
    fn test_statistics_collected_when_enabled() {
        let simulator = Simulator::new(SimulatorConfig::debug());
        let noise = NoiseConfiguration::new().with_gate(
            "h",
            GateNoiseParams::new().with_probability(NoiseChannelKind::PhaseFlip, 50.0),
        );
        let result = simulator
            .run_text("qreg q[1]; h q[0]; h q[0];", 8, Some(11), &noise)
            .unwrap();
        let stats = result.statistics.unwrap();
        assert_eq!(stats.shots, 8);
        assert_eq!(stats.checkpoints, 3);
        assert_eq!(stats.ideal.gates_applied, 16);
        assert_eq!(stats.noisy.channel_applications, 16);
    }

    #[test]
    fn test_per_layer_checkpoints() {
        let simulator = Simulator::new(
            SimulatorConfig::default().with_checkpoint_strategy(CheckpointStrategy::PerLayer),
        );
        let result = simulator
            .run_text("qreg q[2]; h q[0]; h q[1]; cx q[0], q[1];", 4, Some(2), &NoiseConfiguration::new())
            .unwrap();
        assert_eq!(result.num_checkpoints(), 3);
        assert_eq!(result.layer(Track::Ideal, 1).unwrap().label, "layer 1");
    }
}
