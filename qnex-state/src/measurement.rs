//! Computational basis measurement and bitstring formatting

use crate::error::{Result, StateError};
use num_complex::Complex64;

/// Below this an outcome is treated as impossible
const IMPOSSIBLE: f64 = 1e-15;

/// Pick a basis index from unnormalized weights using `random_value` ∈ [0, 1)
///
/// Walks the cumulative sum; rounding past the end selects the last
/// index with non-zero weight.
pub fn sample_index(weights: &[f64], random_value: f64) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let threshold = random_value * total;

    let mut cumulative = 0.0;
    let mut last_nonzero = None;
    for (idx, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        if threshold < cumulative {
            return Some(idx);
        }
        last_nonzero = Some(idx);
    }
    last_nonzero
}

/// Sample a full-register outcome without disturbing the state
pub fn sample_basis_state(amplitudes: &[Complex64], random_value: f64) -> Result<usize> {
    let probabilities: Vec<f64> = amplitudes.iter().map(|a| a.norm_sqr()).collect();
    sample_index(&probabilities, random_value).ok_or(StateError::NotNormalized { norm: 0.0 })
}

/// Measure one qubit and collapse the state
///
/// # Returns
/// The measurement outcome (0 or 1)
///
/// # Errors
/// Returns error if qubit index is invalid or the state has zero norm
pub fn measure_qubit(amplitudes: &mut [Complex64], qubit: usize, random_value: f64) -> Result<u8> {
    let num_qubits = amplitudes.len().trailing_zeros() as usize;
    if qubit >= num_qubits {
        return Err(StateError::InvalidQubitIndex {
            index: qubit,
            num_qubits,
        });
    }

    let mask = 1 << qubit;
    let (mut prob_zero, mut prob_one) = (0.0, 0.0);
    for (idx, amp) in amplitudes.iter().enumerate() {
        if idx & mask == 0 {
            prob_zero += amp.norm_sqr();
        } else {
            prob_one += amp.norm_sqr();
        }
    }
    let total = prob_zero + prob_one;
    if total <= IMPOSSIBLE {
        return Err(StateError::NotNormalized { norm: total.sqrt() });
    }

    let mut outcome: u8 = if random_value * total < prob_zero { 0 } else { 1 };
    if outcome == 1 && prob_one <= IMPOSSIBLE {
        outcome = 0;
    } else if outcome == 0 && prob_zero <= IMPOSSIBLE {
        outcome = 1;
    }

    let kept = if outcome == 0 { prob_zero } else { prob_one };
    let inv_norm = 1.0 / kept.sqrt();

    for (idx, amp) in amplitudes.iter_mut().enumerate() {
        if ((idx >> qubit) & 1) as u8 != outcome {
            *amp = Complex64::new(0.0, 0.0);
        } else {
            *amp *= inv_norm;
        }
    }

    Ok(outcome)
}

/// Bitstring for a basis index, qubit 0 rightmost
///
/// # Example
/// ```
/// use qnex_state::measurement::format_basis_state;
///
/// assert_eq!(format_basis_state(1, 3), "001");
/// assert_eq!(format_basis_state(6, 3), "110");
/// ```
pub fn format_basis_state(index: usize, num_qubits: usize) -> String {
    format!("{:0width$b}", index, width = num_qubits)
}

/// Labels for all 2^n basis states in index order
pub fn basis_labels(num_qubits: usize) -> Vec<String> {
    (0..1usize << num_qubits)
        .map(|i| format_basis_state(i, num_qubits))
        .collect()
}
