//! Implementations of the configurable quantum noise channels

use super::types::{KrausOperator, NoiseChannel, NoiseChannelKind};
use crate::{QuantumError, Result};
use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Operators with a squared Frobenius norm below this are dropped
const NEGLIGIBLE_WEIGHT: f64 = 1e-15;

fn check_probability(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(QuantumError::ValidationError(format!(
            "{} must be in [0,1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Single-qubit Pauli matrices, indexed I, X, Y, Z
pub(crate) fn pauli(index: usize) -> KrausOperator {
    let m = match index & 3 {
        0 => [[ONE, ZERO], [ZERO, ONE]],
        1 => [[ZERO, ONE], [ONE, ZERO]],
        2 => [[ZERO, Complex64::new(0.0, -1.0)], [Complex64::new(0.0, 1.0), ZERO]],
        _ => [[ONE, ZERO], [ZERO, -ONE]],
    };
    KrausOperator::from_2x2(m)
}

/// Bit flip channel
///
/// Applies X with probability p.
///
/// # Kraus Operators
/// ```text
/// K₀ = √(1-p) I
/// K₁ = √p X
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BitFlip {
    probability: f64,
}

impl BitFlip {
    /// # Errors
    /// Returns error if probability is not in [0, 1]
    pub fn new(probability: f64) -> Result<Self> {
        check_probability("Bit flip probability", probability)?;
        Ok(Self { probability })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl NoiseChannel for BitFlip {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        let p = self.probability;
        vec![pauli(0).scaled((1.0 - p).sqrt()), pauli(1).scaled(p.sqrt())]
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn kind(&self) -> NoiseChannelKind {
        NoiseChannelKind::BitFlip
    }
}

/// Phase flip channel
///
/// Applies Z with probability p.
///
/// # Kraus Operators
/// ```text
/// K₀ = √(1-p) I
/// K₁ = √p Z
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PhaseFlip {
    probability: f64,
}

impl PhaseFlip {
    /// # Errors
    /// Returns error if probability is not in [0, 1]
    pub fn new(probability: f64) -> Result<Self> {
        check_probability("Phase flip probability", probability)?;
        Ok(Self { probability })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl NoiseChannel for PhaseFlip {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        let p = self.probability;
        vec![pauli(0).scaled((1.0 - p).sqrt()), pauli(3).scaled(p.sqrt())]
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn kind(&self) -> NoiseChannelKind {
        NoiseChannelKind::PhaseFlip
    }
}

/// Amplitude damping channel
///
/// Models energy relaxation (T1 decay) where the qubit loses
/// energy to the environment: |1⟩ → |0⟩ with probability γ.
///
/// For a qubit with T1 relaxation time, after time t:
/// γ = 1 - exp(-t/T1)
///
/// # Kraus Operators
/// ```text
/// K₀ = [[1, 0], [0, √(1-γ)]]
/// K₁ = [[0, √γ], [0, 0]]
/// ```
///
/// # Example
/// ```
/// # use qnex_core::noise::{AmplitudeDamping, NoiseChannel};
/// let channel = AmplitudeDamping::new(0.02).unwrap();
/// assert!(channel.verify_completeness(1e-12));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AmplitudeDamping {
    /// Decay probability γ ∈ [0, 1]
    gamma: f64,
}

impl AmplitudeDamping {
    /// # Errors
    /// Returns error if gamma is not in [0, 1]
    pub fn new(gamma: f64) -> Result<Self> {
        check_probability("Gamma", gamma)?;
        Ok(Self { gamma })
    }

    /// Create from T1 relaxation time and gate duration
    ///
    /// Computes γ = 1 - exp(-gate_time/T1)
    pub fn from_t1(t1: f64, gate_time: f64) -> Result<Self> {
        if t1 <= 0.0 {
            return Err(QuantumError::ValidationError("T1 must be positive".to_string()));
        }
        if gate_time < 0.0 {
            return Err(QuantumError::ValidationError(
                "Gate time must be non-negative".to_string(),
            ));
        }
        Self::new(1.0 - (-gate_time / t1).exp())
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl NoiseChannel for AmplitudeDamping {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        let gamma = self.gamma;
        vec![
            KrausOperator::from_2x2([
                [ONE, ZERO],
                [ZERO, Complex64::new((1.0 - gamma).sqrt(), 0.0)],
            ]),
            KrausOperator::from_2x2([[ZERO, Complex64::new(gamma.sqrt(), 0.0)], [ZERO, ZERO]]),
        ]
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn kind(&self) -> NoiseChannelKind {
        NoiseChannelKind::AmplitudeDamping
    }
}

/// Phase damping channel
///
/// Models pure dephasing without energy loss. The off-diagonal elements of
/// the density matrix shrink by √(1-λ).
///
/// # Kraus Operators
/// ```text
/// K₀ = [[1, 0], [0, √(1-λ)]]
/// K₁ = [[0, 0], [0, √λ]]
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PhaseDamping {
    /// Damping parameter λ ∈ [0, 1]
    lambda: f64,
}

impl PhaseDamping {
    /// # Errors
    /// Returns error if lambda is not in [0, 1]
    pub fn new(lambda: f64) -> Result<Self> {
        check_probability("Lambda", lambda)?;
        Ok(Self { lambda })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl NoiseChannel for PhaseDamping {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        let lambda = self.lambda;
        vec![
            KrausOperator::from_2x2([
                [ONE, ZERO],
                [ZERO, Complex64::new((1.0 - lambda).sqrt(), 0.0)],
            ]),
            KrausOperator::from_2x2([[ZERO, ZERO], [ZERO, Complex64::new(lambda.sqrt(), 0.0)]]),
        ]
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn kind(&self) -> NoiseChannelKind {
        NoiseChannelKind::PhaseDamping
    }
}

/// Depolarizing channel on n qubits
///
/// ρ → (1-p) ρ + p I/2ⁿ, written as a mixture over all 4ⁿ Pauli strings:
/// the identity string has weight 1 - p + p/4ⁿ and every other string p/4ⁿ.
///
/// # Kraus Operators
/// ```text
/// K₀ = √(1 - p + p/4ⁿ) I⊗…⊗I
/// Kᵢ = √(p/4ⁿ) Pᵢ          (Pᵢ ≠ I⊗…⊗I)
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DepolarizingChannel {
    error_probability: f64,
    num_qubits: usize,
}

impl DepolarizingChannel {
    /// # Errors
    /// Returns error if probability is not in [0, 1] or `num_qubits` is 0
    pub fn new(error_probability: f64, num_qubits: usize) -> Result<Self> {
        check_probability("Error probability", error_probability)?;
        if num_qubits == 0 {
            return Err(QuantumError::ValidationError(
                "Depolarizing channel needs at least one qubit".to_string(),
            ));
        }
        Ok(Self {
            error_probability,
            num_qubits,
        })
    }

    pub fn error_probability(&self) -> f64 {
        self.error_probability
    }

    /// Pauli string for `index` in base 4; digit j acts on local qubit j
    fn pauli_string(&self, index: usize) -> KrausOperator {
        let mut op = pauli(index & 3);
        for j in 1..self.num_qubits {
            op = op.kron_above(&pauli((index >> (2 * j)) & 3));
        }
        op
    }
}

impl NoiseChannel for DepolarizingChannel {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        let p = self.error_probability;
        let strings = 1usize << (2 * self.num_qubits);
        let share = p / strings as f64;

        let mut ops = Vec::with_capacity(strings);
        ops.push(self.pauli_string(0).scaled((1.0 - p + share).sqrt()));
        if share > 0.0 {
            for index in 1..strings {
                ops.push(self.pauli_string(index).scaled(share.sqrt()));
            }
        }
        ops
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn kind(&self) -> NoiseChannelKind {
        NoiseChannelKind::Depolarizing
    }
}

/// Thermal relaxation over one gate duration
///
/// Population of |1⟩ decays with γ = 1 - exp(-t/T1) and the coherence
/// decays to exp(-t/T2). Built as amplitude damping(γ) composed with phase
/// damping(λ), where λ removes the coherence left over by amplitude damping:
///
/// ```text
/// √(1-λ) = exp(-t/T2) / exp(-t/(2·T1))
/// ```
///
/// Requires T1 > 0, T2 > 0, t ≥ 0 and T2 ≤ 2·T1.
#[derive(Debug, Clone, Copy)]
pub struct ThermalRelaxation {
    t1: f64,
    t2: f64,
    gate_time: f64,
}

impl ThermalRelaxation {
    /// # Errors
    /// Returns [`QuantumError::InvalidRelaxationParams`] for unphysical inputs
    pub fn new(t1: f64, t2: f64, gate_time: f64) -> Result<Self> {
        let reason = if !(t1 > 0.0) {
            Some(format!("t1 must be positive, got {}", t1))
        } else if !(t2 > 0.0) {
            Some(format!("t2 must be positive, got {}", t2))
        } else if !(gate_time >= 0.0) {
            Some(format!("gate_time must be non-negative, got {}", gate_time))
        } else if t2 > 2.0 * t1 {
            Some(format!("t2 ({}) must not exceed 2*t1 ({})", t2, 2.0 * t1))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(QuantumError::InvalidRelaxationParams {
                gate: String::new(),
                reason,
            }),
            None => Ok(Self { t1, t2, gate_time }),
        }
    }

    /// Population decay γ = 1 - exp(-t/T1)
    pub fn gamma(&self) -> f64 {
        1.0 - (-self.gate_time / self.t1).exp()
    }

    /// Extra pure dephasing applied on top of amplitude damping
    pub fn lambda(&self) -> f64 {
        let remaining = (-self.gate_time / self.t2).exp() / (-self.gate_time / (2.0 * self.t1)).exp();
        (1.0 - remaining * remaining).clamp(0.0, 1.0)
    }
}

impl NoiseChannel for ThermalRelaxation {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        let damping = AmplitudeDamping {
            gamma: self.gamma().clamp(0.0, 1.0),
        }
        .kraus_operators();
        let dephasing = PhaseDamping {
            lambda: self.lambda(),
        }
        .kraus_operators();

        let mut ops = Vec::with_capacity(4);
        for a in &damping {
            for p in &dephasing {
                let product = a.matmul(p);
                if product.weight() > NEGLIGIBLE_WEIGHT {
                    ops.push(product);
                }
            }
        }
        ops
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn kind(&self) -> NoiseChannelKind {
        NoiseChannelKind::ThermalRelaxation
    }
}
