//! Dense statevector storage

use crate::error::{Result, StateError};
use num_complex::Complex64;
use std::fmt;

/// Largest register a dense state is allowed to allocate
pub const MAX_QUBITS: usize = 30;

/// Dense quantum state: 2^n complex amplitudes
///
/// Basis index bit `q` is the value of qubit `q` (qubit 0 is the least
/// significant bit).
///
/// # Example
///
/// ```
/// use qnex_state::StateVector;
///
/// let state = StateVector::new(3).unwrap();
/// assert_eq!(state.dimension(), 8);
/// assert!(state.is_normalized(1e-12));
/// ```
#[derive(Clone, PartialEq)]
pub struct StateVector {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    /// Create a new state initialized to |0...0⟩
    ///
    /// # Errors
    /// Returns error if `num_qubits` is 0 or larger than [`MAX_QUBITS`]
    pub fn new(num_qubits: usize) -> Result<Self> {
        if num_qubits == 0 {
            return Err(StateError::InvalidDimension { dimension: 1 });
        }
        if num_qubits > MAX_QUBITS {
            return Err(StateError::TooManyQubits {
                num_qubits,
                max: MAX_QUBITS,
            });
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Create a state from amplitude data (length must be 2^num_qubits)
    pub fn from_amplitudes(num_qubits: usize, amplitudes: &[Complex64]) -> Result<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(StateError::TooManyQubits {
                num_qubits,
                max: MAX_QUBITS,
            });
        }
        let expected = 1usize << num_qubits;
        if amplitudes.len() != expected {
            return Err(StateError::DimensionMismatch {
                expected,
                actual: amplitudes.len(),
            });
        }
        Ok(Self {
            num_qubits,
            amplitudes: amplitudes.to_vec(),
        })
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    #[inline]
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    #[inline]
    pub fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.amplitudes
    }

    /// Consume the state and return its amplitudes
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Squared L2 norm
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    pub fn norm(&self) -> f64 {
        self.norm_sqr().sqrt()
    }

    pub fn is_normalized(&self, epsilon: f64) -> bool {
        (self.norm() - 1.0).abs() < epsilon
    }

    /// Rescale to unit norm
    ///
    /// # Errors
    /// Returns [`StateError::NotNormalized`] if the norm is zero
    pub fn normalize(&mut self) -> Result<()> {
        let norm = self.norm();
        if norm < 1e-300 {
            return Err(StateError::NotNormalized { norm });
        }
        let inv = 1.0 / norm;
        for amp in &mut self.amplitudes {
            *amp *= inv;
        }
        Ok(())
    }

    /// |amplitude|² for every basis state
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Compute the inner product ⟨self|other⟩
    pub fn inner_product(&self, other: &StateVector) -> Result<Complex64> {
        inner_product(&self.amplitudes, &other.amplitudes)
    }

    /// Fidelity |⟨self|other⟩|² after normalizing both states
    pub fn fidelity(&self, other: &StateVector) -> Result<f64> {
        fidelity(&self.amplitudes, &other.amplitudes)
    }
}

/// Compute ⟨a|b⟩
pub fn inner_product(a: &[Complex64], b: &[Complex64]) -> Result<Complex64> {
    if a.len() != b.len() {
        return Err(StateError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x.conj() * y).sum())
}

/// Squared overlap of two states, each normalized first
///
/// A zero-norm input gives 0. The result is clamped to [0, 1].
pub fn fidelity(a: &[Complex64], b: &[Complex64]) -> Result<f64> {
    let overlap = inner_product(a, b)?;
    let norm_a: f64 = a.iter().map(|x| x.norm_sqr()).sum();
    let norm_b: f64 = b.iter().map(|x| x.norm_sqr()).sum();
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return Ok(0.0);
    }
    Ok((overlap.norm_sqr() / (norm_a * norm_b)).clamp(0.0, 1.0))
}

impl fmt::Debug for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateVector")
            .field("num_qubits", &self.num_qubits)
            .field("norm", &self.norm())
            .finish()
    }
}
