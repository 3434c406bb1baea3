//! Matrix kernels over dense amplitude slices
//!
//! All kernels address qubits little-endian: local matrix index bit `j`
//! is the value of `qubits[j]`.

use num_complex::Complex64;
use qnex_core::noise::KrausOperator;

/// Apply a single-qubit gate
///
/// Groups amplitudes into pairs (i, j) that differ only in bit `qubit`
/// and applies the 2×2 matrix to each pair.
pub fn apply_single_qubit(state: &mut [Complex64], matrix: &[[Complex64; 2]; 2], qubit: usize) {
    let qubit_mask = 1 << qubit;

    let m00 = matrix[0][0];
    let m01 = matrix[0][1];
    let m10 = matrix[1][0];
    let m11 = matrix[1][1];

    for i in 0..state.len() {
        if i & qubit_mask != 0 {
            continue;
        }
        let j = i | qubit_mask;

        let amp0 = state[i];
        let amp1 = state[j];

        state[i] = m00 * amp0 + m01 * amp1;
        state[j] = m10 * amp0 + m11 * amp1;
    }
}

/// Apply a 2^k × 2^k row-major matrix to `qubits`
pub fn apply_matrix(state: &mut [Complex64], matrix: &[Complex64], qubits: &[usize]) {
    let k = qubits.len();
    let dim = 1usize << k;
    debug_assert_eq!(matrix.len(), dim * dim);

    if k == 1 {
        let m = [[matrix[0], matrix[1]], [matrix[2], matrix[3]]];
        apply_single_qubit(state, &m, qubits[0]);
        return;
    }

    let mask: usize = qubits.iter().map(|&q| 1usize << q).sum();
    let offsets: Vec<usize> = (0..dim)
        .map(|local| {
            qubits
                .iter()
                .enumerate()
                .filter(|(j, _)| local >> j & 1 == 1)
                .map(|(_, &q)| 1usize << q)
                .sum()
        })
        .collect();

    let mut gathered = vec![Complex64::new(0.0, 0.0); dim];
    for base in 0..state.len() {
        if base & mask != 0 {
            continue;
        }
        for (local, &offset) in offsets.iter().enumerate() {
            gathered[local] = state[base | offset];
        }
        for (row, &offset) in offsets.iter().enumerate() {
            let row_slice = &matrix[row * dim..(row + 1) * dim];
            state[base | offset] = row_slice
                .iter()
                .zip(gathered.iter())
                .map(|(m, a)| m * a)
                .sum();
        }
    }
}

/// Apply one Kraus operator in place
#[inline]
pub fn apply_kraus(state: &mut [Complex64], operator: &KrausOperator, qubits: &[usize]) {
    apply_matrix(state, &operator.matrix, qubits);
}

/// Stochastically apply a Kraus channel (quantum trajectory step)
///
/// Branch `i` is chosen with probability p_i = ||K_i ψ||² using
/// `random_value` ∈ [0, 1) against the cumulative sum, and the state is
/// replaced by K_i ψ / √p_i. Returns the chosen branch, or `None` if every
/// branch has zero weight.
pub fn apply_kraus_trajectory(
    state: &mut [Complex64],
    operators: &[KrausOperator],
    qubits: &[usize],
    random_value: f64,
) -> Option<usize> {
    let total: f64 = state.iter().map(|a| a.norm_sqr()).sum();
    let threshold = random_value * total;

    let mut cumulative = 0.0;
    let mut fallback: Option<(usize, Vec<Complex64>, f64)> = None;

    for (index, operator) in operators.iter().enumerate() {
        let mut candidate = state.to_vec();
        apply_kraus(&mut candidate, operator, qubits);
        let weight: f64 = candidate.iter().map(|a| a.norm_sqr()).sum();
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        if threshold < cumulative {
            commit(state, &candidate, weight);
            return Some(index);
        }
        fallback = Some((index, candidate, weight));
    }

    // Rounding left the threshold just past the last branch
    let (index, candidate, weight) = fallback?;
    commit(state, &candidate, weight);
    Some(index)
}

fn commit(state: &mut [Complex64], candidate: &[Complex64], weight: f64) {
    let inv = 1.0 / weight.sqrt();
    for (dst, src) in state.iter_mut().zip(candidate.iter()) {
        *dst = src * inv;
    }
}
