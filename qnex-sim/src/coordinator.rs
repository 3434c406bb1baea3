//! Matched ideal/noisy execution
//!
//! Both tracks replay the same instrumented circuit. Every shot owns three
//! random streams derived from `(seed, shot, stream)`, so the measurement
//! draws of shot `k` are identical in the two tracks and a run is fully
//! reproducible from its seed.
//!
//! Readout error only touches the outcome reported at the final checkpoint,
//! and only for circuits that contain a measurement.

use crate::cancel::CancellationToken;
use crate::error::{Result, SimulationError};
use crate::instrumentation::{InstrumentedCircuit, Step};
use crate::statistics::TrackStatistics;
use num_complex::Complex64;
use qnex_core::noise::NoiseModel;
use qnex_core::{GateRegistry, Instruction};
use qnex_state::QuantumExecutor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Which execution of the circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    Ideal,
    Noisy,
}

/// Independent random streams of one shot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomStream {
    /// Kraus branch selection
    Channel,
    /// Qubit measurement and checkpoint sampling
    Measurement,
    /// Readout bit flips
    Readout,
}

impl RandomStream {
    fn salt(self) -> u64 {
        match self {
            RandomStream::Channel => 0x6a09_e667_f3bc_c908,
            RandomStream::Measurement => 0xbb67_ae85_84ca_a73b,
            RandomStream::Readout => 0x3c6e_f372_fe94_f82b,
        }
    }
}

#[inline]
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Generator for one `(seed, shot, stream)` triple
pub fn shot_rng(seed: u64, shot: usize, stream: RandomStream) -> StdRng {
    let base = splitmix64(seed ^ stream.salt());
    StdRng::seed_from_u64(splitmix64(base.wrapping_add(shot as u64)))
}

/// Everything one shot recorded
#[derive(Debug, Clone)]
pub struct ShotRecord {
    /// Amplitudes per checkpoint
    pub samples: Vec<Vec<Complex64>>,
    /// Sampled basis index per checkpoint
    pub outcomes: Vec<usize>,
    pub stats: TrackStatistics,
}

/// All shots of one track, in shot order
#[derive(Debug, Clone)]
pub struct TrackOutput {
    pub track: Track,
    pub shots: Vec<ShotRecord>,
    pub stats: TrackStatistics,
}

/// Drives an executor through both tracks
pub struct DualRunCoordinator<'a, E: QuantumExecutor> {
    executor: &'a E,
    registry: &'a GateRegistry,
    noise: &'a NoiseModel,
    cancel: &'a CancellationToken,
    parallel_shots: bool,
}

impl<'a, E: QuantumExecutor> DualRunCoordinator<'a, E> {
    pub fn new(
        executor: &'a E,
        registry: &'a GateRegistry,
        noise: &'a NoiseModel,
        cancel: &'a CancellationToken,
        parallel_shots: bool,
    ) -> Self {
        Self {
            executor,
            registry,
            noise,
            cancel,
            parallel_shots,
        }
    }

    /// Run the ideal and noisy tracks concurrently and join them
    ///
    /// The first failure in either track stops the other one at its next
    /// step. An execution error takes precedence over the cancellation it
    /// caused in the other track.
    pub fn run(
        &self,
        circuit: &InstrumentedCircuit,
        shots: usize,
        seed: u64,
    ) -> Result<(TrackOutput, TrackOutput)> {
        let measures = self.measures(circuit)?;
        let abort = CancellationToken::new();
        let (ideal, noisy) = rayon::join(
            || self.track(Track::Ideal, circuit, shots, seed, measures, &abort),
            || self.track(Track::Noisy, circuit, shots, seed, measures, &abort),
        );
        match (ideal, noisy) {
            (Ok(ideal), Ok(noisy)) => Ok((ideal, noisy)),
            (Err(SimulationError::Cancelled), Err(SimulationError::Cancelled))
            | (Err(SimulationError::Cancelled), Ok(_))
            | (Ok(_), Err(SimulationError::Cancelled)) => {
                info!("dual run cancelled");
                Err(SimulationError::Cancelled)
            }
            (Err(SimulationError::Cancelled), Err(err)) | (Err(err), _) | (_, Err(err)) => {
                info!(error = %err, "dual run failed");
                Err(err)
            }
        }
    }

    /// Whether any instruction is a measurement
    fn measures(&self, circuit: &InstrumentedCircuit) -> Result<bool> {
        for inst in circuit.instructions() {
            if self.is_measurement(inst)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn is_measurement(&self, inst: &Instruction) -> Result<bool> {
        let gate = self.registry.lookup(inst.gate_id())?;
        Ok(!gate.is_unitary() && !gate.is_structural())
    }

    /// Run every shot of one track
    fn track(
        &self,
        track: Track,
        circuit: &InstrumentedCircuit,
        shots: usize,
        seed: u64,
        measures: bool,
        abort: &CancellationToken,
    ) -> Result<TrackOutput> {
        let span = info_span!("track", ?track, shots);
        let _guard = span.enter();
        let start = Instant::now();
        debug!("track started");

        let run_one = |shot: usize| {
            self.run_shot(track, circuit, shot, seed, measures, abort)
                .map_err(|err| {
                    if !matches!(err, SimulationError::Cancelled) {
                        abort.cancel();
                    }
                    err
                })
        };
        let records: Vec<ShotRecord> = if self.parallel_shots {
            (0..shots).into_par_iter().map(run_one).collect::<Result<_>>()?
        } else {
            (0..shots).map(run_one).collect::<Result<_>>()?
        };

        let mut stats = TrackStatistics::default();
        for record in &records {
            stats.absorb(&record.stats);
        }
        stats.wall_time = start.elapsed();
        debug!(elapsed = ?stats.wall_time, "track finished");

        Ok(TrackOutput {
            track,
            shots: records,
            stats,
        })
    }

    fn run_shot(
        &self,
        track: Track,
        circuit: &InstrumentedCircuit,
        shot: usize,
        seed: u64,
        measures: bool,
        abort: &CancellationToken,
    ) -> Result<ShotRecord> {
        let noisy = track == Track::Noisy;
        let mut channel_rng = shot_rng(seed, shot, RandomStream::Channel);
        let mut measure_rng = shot_rng(seed, shot, RandomStream::Measurement);
        let mut readout_rng = shot_rng(seed, shot, RandomStream::Readout);
        let readout = if noisy && measures {
            self.noise.readout()
        } else {
            None
        };
        let final_checkpoint = circuit.checkpoint_count().saturating_sub(1);

        let mut state = self.executor.initial_state(circuit.num_qubits())?;
        let mut samples = Vec::with_capacity(circuit.checkpoint_count());
        let mut outcomes = Vec::with_capacity(circuit.checkpoint_count());
        let mut stats = TrackStatistics::default();

        for step in circuit.steps() {
            if self.cancel.is_cancelled() || abort.is_cancelled() {
                return Err(SimulationError::Cancelled);
            }

            match step {
                Step::Checkpoint(_) => {
                    let outcome = self.executor.sample_measurement(&state, &mut measure_rng)?;
                    let reported = match readout {
                        Some(readout) if samples.len() == final_checkpoint => readout
                            .apply_to_outcome(outcome, circuit.num_qubits(), || {
                                readout_rng.gen::<f64>()
                            }),
                        _ => outcome,
                    };
                    samples.push(self.executor.snapshot(&state));
                    outcomes.push(reported);
                }
                Step::Apply(inst) if self.is_measurement(inst)? => {
                    for &q in inst.qubits() {
                        self.executor.measure_qubit(&mut state, q, &mut measure_rng)?;
                        stats.measurements += 1;
                    }
                }
                Step::Apply(inst) => {
                    self.executor.apply_gate(&mut state, inst)?;
                    stats.gates_applied += 1;
                    if noisy {
                        if let Some(channel) = self.noise.gate_channel(inst.gate_id()) {
                            stats.channel_applications += self.executor.apply_channel(
                                &mut state,
                                channel,
                                inst.qubits(),
                                &mut channel_rng,
                            )?;
                        }
                    }
                }
            }
        }

        Ok(ShotRecord {
            samples,
            outcomes,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrumentation::{instrument, CheckpointStrategy};
    use qnex_core::noise::{
        build_noise_model, ErrorChannel, GateNoiseParams, NoiseChannelKind, NoiseConfiguration,
    };
    use qnex_core::{Circuit, Gate, GateRegistry};
    use qnex_state::{StateError, StateVector, StatevectorExecutor};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Statevector executor that counts gates and can misbehave on demand
    struct TallyExecutor {
        inner: StatevectorExecutor,
        gates: AtomicUsize,
        cancel_after: Option<(usize, CancellationToken)>,
        fail_channels: bool,
    }

    impl TallyExecutor {
        fn new() -> Self {
            Self {
                inner: StatevectorExecutor::new(),
                gates: AtomicUsize::new(0),
                cancel_after: None,
                fail_channels: false,
            }
        }

        fn gates(&self) -> usize {
            self.gates.load(Ordering::SeqCst)
        }
    }

    impl QuantumExecutor for TallyExecutor {
        type State = StateVector;

        fn initial_state(&self, num_qubits: usize) -> qnex_state::Result<StateVector> {
            self.inner.initial_state(num_qubits)
        }

        fn apply_gate(&self, state: &mut StateVector, instruction: &Instruction) -> qnex_state::Result<()> {
            self.inner.apply_gate(state, instruction)?;
            let applied = self.gates.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((limit, token)) = &self.cancel_after {
                if applied == *limit {
                    token.cancel();
                }
            }
            Ok(())
        }

        fn apply_channel<R: Rng + ?Sized>(
            &self,
            state: &mut StateVector,
            channel: &ErrorChannel,
            qubits: &[usize],
            rng: &mut R,
        ) -> qnex_state::Result<usize> {
            if self.fail_channels {
                return Err(StateError::ZeroProbabilityChannel);
            }
            self.inner.apply_channel(state, channel, qubits, rng)
        }

        fn measure_qubit<R: Rng + ?Sized>(
            &self,
            state: &mut StateVector,
            qubit: usize,
            rng: &mut R,
        ) -> qnex_state::Result<u8> {
            self.inner.measure_qubit(state, qubit, rng)
        }

        fn sample_measurement<R: Rng + ?Sized>(
            &self,
            state: &StateVector,
            rng: &mut R,
        ) -> qnex_state::Result<usize> {
            self.inner.sample_measurement(state, rng)
        }

        fn snapshot(&self, state: &StateVector) -> Vec<Complex64> {
            self.inner.snapshot(state)
        }
    }

    fn hadamard_chain(registry: &GateRegistry, length: usize) -> InstrumentedCircuit {
        let mut circuit = Circuit::new(1).unwrap();
        for _ in 0..length {
            circuit.add(registry, "h", &[0], &[]).unwrap();
        }
        instrument(&circuit, registry, CheckpointStrategy::PerInstruction)
    }

    fn hadamard_circuit(registry: &GateRegistry) -> InstrumentedCircuit {
        let mut circuit = Circuit::new(1).unwrap();
        circuit.add(registry, "h", &[0], &[]).unwrap();
        instrument(&circuit, registry, CheckpointStrategy::PerInstruction)
    }

    #[test]
    fn test_streams_are_distinct_and_stable() {
        let a = shot_rng(1, 0, RandomStream::Channel).gen::<u64>();
        let b = shot_rng(1, 0, RandomStream::Measurement).gen::<u64>();
        let c = shot_rng(1, 1, RandomStream::Channel).gen::<u64>();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, shot_rng(1, 0, RandomStream::Channel).gen::<u64>());
    }

    #[test]
    fn test_noiseless_tracks_match_exactly() {
        let registry = GateRegistry::standard();
        let circuit = hadamard_circuit(&registry);
        let noise = NoiseModel::new();
        let cancel = CancellationToken::new();
        let executor = StatevectorExecutor::new();
        let coordinator = DualRunCoordinator::new(&executor, &registry, &noise, &cancel, true);

        let (ideal, noisy) = coordinator.run(&circuit, 32, 9).unwrap();
        assert_eq!(ideal.shots.len(), 32);
        for (i, n) in ideal.shots.iter().zip(noisy.shots.iter()) {
            assert_eq!(i.samples, n.samples);
            assert_eq!(i.outcomes, n.outcomes);
            assert_eq!(i.samples.len(), 2);
        }
        assert_eq!(noisy.stats.channel_applications, 0);
    }

    #[test]
    fn test_noisy_track_applies_channels() {
        let registry = GateRegistry::standard();
        let circuit = hadamard_circuit(&registry);
        let config = NoiseConfiguration::new().with_gate(
            "h",
            GateNoiseParams::new().with_probability(NoiseChannelKind::BitFlip, 100.0),
        );
        let noise = build_noise_model(&registry, &config, true).unwrap();
        let cancel = CancellationToken::new();
        let executor = StatevectorExecutor::new();
        let coordinator = DualRunCoordinator::new(&executor, &registry, &noise, &cancel, false);

        let (ideal, noisy) = coordinator.run(&circuit, 4, 1).unwrap();
        assert_eq!(ideal.stats.channel_applications, 0);
        assert_eq!(noisy.stats.channel_applications, 4);
        assert_eq!(noisy.stats.gates_applied, 4);
    }

    #[test]
    fn test_cancelled_before_start() {
        let registry = GateRegistry::standard();
        let circuit = hadamard_circuit(&registry);
        let noise = NoiseModel::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let executor = StatevectorExecutor::new();
        let coordinator = DualRunCoordinator::new(&executor, &registry, &noise, &cancel, true);
        assert!(matches!(
            coordinator.run(&circuit, 8, 0),
            Err(SimulationError::Cancelled)
        ));
    }

    #[test]
    fn test_cancel_mid_run_stops_both_tracks() {
        let registry = GateRegistry::standard();
        let circuit = hadamard_chain(&registry, 20);
        let noise = NoiseModel::new();
        let cancel = CancellationToken::new();
        let executor = TallyExecutor {
            cancel_after: Some((30, cancel.clone())),
            ..TallyExecutor::new()
        };
        let coordinator = DualRunCoordinator::new(&executor, &registry, &noise, &cancel, false);

        let result = coordinator.run(&circuit, 50, 3);
        assert!(matches!(result, Err(SimulationError::Cancelled)));
        // a full run applies 2 * 50 * 20 gates
        assert!(executor.gates() < 100, "applied {} gates", executor.gates());
    }

    #[test]
    fn test_execution_error_wins_and_halts_ideal_track() {
        let registry = GateRegistry::standard();
        let circuit = hadamard_chain(&registry, 50);
        let config = NoiseConfiguration::new().with_gate(
            "h",
            GateNoiseParams::new().with_probability(NoiseChannelKind::BitFlip, 10.0),
        );
        let noise = build_noise_model(&registry, &config, true).unwrap();
        let cancel = CancellationToken::new();
        let executor = TallyExecutor {
            fail_channels: true,
            ..TallyExecutor::new()
        };
        let coordinator = DualRunCoordinator::new(&executor, &registry, &noise, &cancel, false);

        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let result = pool.install(|| coordinator.run(&circuit, 2000, 5));
        assert!(matches!(
            result,
            Err(SimulationError::Execution(StateError::ZeroProbabilityChannel))
        ));
        assert!(executor.gates() < 2000 * 50, "ideal track ran to completion");
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_measurement_is_dispatched_by_gate_kind() {
        let mut registry = GateRegistry::standard();
        registry.register(Gate::non_unitary("mz", "Z measurement", "Projects onto the Z basis", 1, &[]));
        let mut circuit = Circuit::new(1).unwrap();
        circuit.add(&registry, "h", &[0], &[]).unwrap();
        circuit.add(&registry, "mz", &[0], &[]).unwrap();
        let circuit = instrument(&circuit, &registry, CheckpointStrategy::PerInstruction);

        let noise = NoiseModel::new();
        let cancel = CancellationToken::new();
        let executor = StatevectorExecutor::new();
        let coordinator = DualRunCoordinator::new(&executor, &registry, &noise, &cancel, false);

        let (ideal, _) = coordinator.run(&circuit, 16, 8).unwrap();
        assert_eq!(ideal.stats.measurements, 16);
        assert_eq!(ideal.stats.gates_applied, 16);
        for shot in &ideal.shots {
            let last = &shot.samples[2];
            assert!(last[0].norm() < 1e-12 || last[1].norm() < 1e-12);
        }
    }

    #[test]
    fn test_readout_only_on_final_checkpoint_of_measuring_circuits() {
        let registry = GateRegistry::standard();
        let config = NoiseConfiguration::new().with_gate(
            "measure",
            GateNoiseParams::new().with_probability(NoiseChannelKind::ReadoutError, 100.0),
        );
        let noise = build_noise_model(&registry, &config, true).unwrap();
        let cancel = CancellationToken::new();
        let executor = StatevectorExecutor::new();
        let coordinator = DualRunCoordinator::new(&executor, &registry, &noise, &cancel, false);

        let mut circuit = Circuit::new(1).unwrap();
        circuit.add(&registry, "x", &[0], &[]).unwrap();
        let unmeasured = instrument(&circuit, &registry, CheckpointStrategy::PerInstruction);
        let (ideal, noisy) = coordinator.run(&unmeasured, 8, 2).unwrap();
        for (i, n) in ideal.shots.iter().zip(noisy.shots.iter()) {
            assert_eq!(i.outcomes, n.outcomes);
        }

        circuit.add(&registry, "measure", &[0], &[]).unwrap();
        let measured = instrument(&circuit, &registry, CheckpointStrategy::PerInstruction);
        let (ideal, noisy) = coordinator.run(&measured, 8, 2).unwrap();
        for (i, n) in ideal.shots.iter().zip(noisy.shots.iter()) {
            assert_eq!(i.outcomes[..2], n.outcomes[..2]);
            assert_eq!(i.outcomes[2], 1);
            assert_eq!(n.outcomes[2], 0);
        }
    }
}
