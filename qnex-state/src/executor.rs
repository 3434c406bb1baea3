//! State propagation seam used by the simulator

use crate::error::{Result, StateError};
use crate::kernels::{apply_kraus_trajectory, apply_matrix, apply_single_qubit};
use crate::matrices::{gate_matrix, GateMatrix};
use crate::measurement;
use crate::state_vector::StateVector;
use num_complex::Complex64;
use qnex_core::noise::{ChannelScope, ErrorChannel};
use qnex_core::Instruction;
use rand::Rng;

/// Propagates quantum states gate by gate
///
/// Implementations are shared across shots and threads, so all state lives
/// in [`QuantumExecutor::State`]. Randomness is always supplied by the caller.
pub trait QuantumExecutor: Send + Sync {
    type State: Clone + Send;

    /// The all-zero state |0...0⟩
    fn initial_state(&self, num_qubits: usize) -> Result<Self::State>;

    /// Apply the unitary of `instruction`
    fn apply_gate(&self, state: &mut Self::State, instruction: &Instruction) -> Result<()>;

    /// Stochastically apply a composite channel to `qubits`
    ///
    /// Returns the number of Kraus branch selections made.
    fn apply_channel<R: Rng + ?Sized>(
        &self,
        state: &mut Self::State,
        channel: &ErrorChannel,
        qubits: &[usize],
        rng: &mut R,
    ) -> Result<usize>;

    /// Projective measurement of one qubit, collapsing the state
    fn measure_qubit<R: Rng + ?Sized>(
        &self,
        state: &mut Self::State,
        qubit: usize,
        rng: &mut R,
    ) -> Result<u8>;

    /// Sample a basis index from the state without collapsing it
    fn sample_measurement<R: Rng + ?Sized>(&self, state: &Self::State, rng: &mut R)
        -> Result<usize>;

    /// Copy of the current amplitudes
    fn snapshot(&self, state: &Self::State) -> Vec<Complex64>;
}

/// Dense statevector executor for the standard gate catalog
///
/// # Example
///
/// ```
/// use qnex_core::Instruction;
/// use qnex_state::{QuantumExecutor, StatevectorExecutor};
///
/// let executor = StatevectorExecutor::new();
/// let mut state = executor.initial_state(1).unwrap();
/// executor.apply_gate(&mut state, &Instruction::new("x", &[0], &[])).unwrap();
/// assert_eq!(executor.snapshot(&state)[1].re, 1.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StatevectorExecutor;

impl StatevectorExecutor {
    pub fn new() -> Self {
        Self
    }

    fn check_qubits(state: &StateVector, qubits: &[usize]) -> Result<()> {
        match qubits.iter().find(|&&q| q >= state.num_qubits()) {
            Some(&index) => Err(StateError::InvalidQubitIndex {
                index,
                num_qubits: state.num_qubits(),
            }),
            None => Ok(()),
        }
    }
}

impl QuantumExecutor for StatevectorExecutor {
    type State = StateVector;

    fn initial_state(&self, num_qubits: usize) -> Result<StateVector> {
        StateVector::new(num_qubits)
    }

    fn apply_gate(&self, state: &mut StateVector, instruction: &Instruction) -> Result<()> {
        let qubits = instruction.qubits();
        Self::check_qubits(state, qubits)?;

        match gate_matrix(instruction.gate_id(), instruction.params())? {
            GateMatrix::Single(m) => {
                if qubits.len() != 1 {
                    return Err(StateError::DimensionMismatch {
                        expected: 1,
                        actual: qubits.len(),
                    });
                }
                apply_single_qubit(state.amplitudes_mut(), &m, qubits[0]);
            }
            GateMatrix::Multi { matrix, num_qubits } => {
                if qubits.len() != num_qubits {
                    return Err(StateError::DimensionMismatch {
                        expected: num_qubits,
                        actual: qubits.len(),
                    });
                }
                apply_matrix(state.amplitudes_mut(), &matrix, qubits);
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
    ) -> Result<usize> {
        Self::check_qubits(state, qubits)?;
        if qubits.len() != channel.num_qubits() {
            return Err(StateError::DimensionMismatch {
                expected: channel.num_qubits(),
                actual: qubits.len(),
            });
        }

        let mut selections = 0;
        for component in channel.components() {
            match component.scope {
                ChannelScope::EachQubit => {
                    for &q in qubits {
                        apply_kraus_trajectory(
                            state.amplitudes_mut(),
                            &component.operators,
                            &[q],
                            rng.gen::<f64>(),
                        )
                        .ok_or(StateError::ZeroProbabilityChannel)?;
                        selections += 1;
                    }
                }
                ChannelScope::AllQubits => {
                    apply_kraus_trajectory(
                        state.amplitudes_mut(),
                        &component.operators,
                        qubits,
                        rng.gen::<f64>(),
                    )
                    .ok_or(StateError::ZeroProbabilityChannel)?;
                    selections += 1;
                }
            }
        }
        Ok(selections)
    }

    fn measure_qubit<R: Rng + ?Sized>(
        &self,
        state: &mut StateVector,
        qubit: usize,
        rng: &mut R,
    ) -> Result<u8> {
        measurement::measure_qubit(state.amplitudes_mut(), qubit, rng.gen::<f64>())
    }

    fn sample_measurement<R: Rng + ?Sized>(&self, state: &StateVector, rng: &mut R) -> Result<usize> {
        measurement::sample_basis_state(state.amplitudes(), rng.gen::<f64>())
    }

    fn snapshot(&self, state: &StateVector) -> Vec<Complex64> {
        state.amplitudes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qnex_core::noise::{build_noise_model, GateNoiseParams, NoiseChannelKind, NoiseConfiguration};
    use qnex_core::GateRegistry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(executor: &StatevectorExecutor, n: usize, program: &[Instruction]) -> StateVector {
        let mut state = executor.initial_state(n).unwrap();
        for inst in program {
            executor.apply_gate(&mut state, inst).unwrap();
        }
        state
    }

    #[test]
    fn test_bell_state() {
        let executor = StatevectorExecutor::new();
        let state = run(
            &executor,
            2,
            &[Instruction::new("h", &[0], &[]), Instruction::new("cx", &[0, 1], &[])],
        );
        let probs = state.probabilities();
        assert_relative_eq!(probs[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(probs[3], 0.5, epsilon = 1e-12);
        assert_relative_eq!(probs[1] + probs[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cx_control_is_first_operand() {
        let executor = StatevectorExecutor::new();
        // x on qubit 1 then cx(1 -> 0): |11⟩
        let state = run(
            &executor,
            2,
            &[Instruction::new("x", &[1], &[]), Instruction::new("cx", &[1, 0], &[])],
        );
        assert_relative_eq!(state.probabilities()[3], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_toffoli_and_swap() {
        let executor = StatevectorExecutor::new();
        let state = run(
            &executor,
            3,
            &[
                Instruction::new("x", &[0], &[]),
                Instruction::new("x", &[2], &[]),
                Instruction::new("ccx", &[0, 2, 1], &[]),
            ],
        );
        assert_relative_eq!(state.probabilities()[0b111], 1.0, epsilon = 1e-12);

        let state = run(
            &executor,
            2,
            &[Instruction::new("x", &[0], &[]), Instruction::new("swap", &[0, 1], &[])],
        );
        assert_relative_eq!(state.probabilities()[0b10], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_operands() {
        let executor = StatevectorExecutor::new();
        let mut state = executor.initial_state(2).unwrap();
        assert!(matches!(
            executor.apply_gate(&mut state, &Instruction::new("x", &[2], &[])),
            Err(StateError::InvalidQubitIndex { index: 2, .. })
        ));
        assert!(executor
            .apply_gate(&mut state, &Instruction::new("cx", &[0], &[]))
            .is_err());
        assert!(executor
            .apply_gate(&mut state, &Instruction::new("measure", &[0], &[]))
            .is_err());
    }

    #[test]
    fn test_certain_bit_flip_channel() {
        let registry = GateRegistry::standard();
        let config = NoiseConfiguration::new().with_gate(
            "cx",
            GateNoiseParams::new().with_probability(NoiseChannelKind::Depolarizing, 0.0),
        );
        assert!(build_noise_model(&registry, &config, true)
            .unwrap()
            .gate_channel("cx")
            .is_none());

        let config = NoiseConfiguration::new().with_gate(
            "x",
            GateNoiseParams::new().with_probability(NoiseChannelKind::BitFlip, 100.0),
        );
        let model = build_noise_model(&registry, &config, true).unwrap();
        let channel = model.gate_channel("x").unwrap();

        let executor = StatevectorExecutor::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = executor.initial_state(1).unwrap();
        let selections = executor
            .apply_channel(&mut state, channel, &[0], &mut rng)
            .unwrap();
        assert_eq!(selections, 1);
        assert_relative_eq!(state.probabilities()[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_channel_width_mismatch() {
        let registry = GateRegistry::standard();
        let config = NoiseConfiguration::new().with_gate(
            "cx",
            GateNoiseParams::new().with_probability(NoiseChannelKind::Depolarizing, 10.0),
        );
        let model = build_noise_model(&registry, &config, true).unwrap();
        let executor = StatevectorExecutor::new();
        let mut state = executor.initial_state(2).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(executor
            .apply_channel(&mut state, model.gate_channel("cx").unwrap(), &[0], &mut rng)
            .is_err());
    }

    #[test]
    fn test_sampling_is_seeded() {
        let executor = StatevectorExecutor::new();
        let state = run(&executor, 3, &[
            Instruction::new("h", &[0], &[]),
            Instruction::new("h", &[1], &[]),
            Instruction::new("h", &[2], &[]),
        ]);
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..16)
                .map(|_| executor.sample_measurement(&state, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
        assert!(draw(42).iter().all(|&i| i < 8));
    }
}
