//! Unitary matrices for the standard gate catalog
//!
//! Multi-qubit matrices use local index bit `j` for the `j`-th operand:
//! for `cx` bit 0 is the control and bit 1 the target, for `ccx` bits 0
//! and 1 are the controls.

use crate::error::{Result, StateError};
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Matrix form of a gate
#[derive(Debug, Clone, PartialEq)]
pub enum GateMatrix {
    Single([[Complex64; 2]; 2]),
    /// Row-major 2^k × 2^k
    Multi { matrix: Vec<Complex64>, num_qubits: usize },
}

impl GateMatrix {
    pub fn num_qubits(&self) -> usize {
        match self {
            GateMatrix::Single(_) => 1,
            GateMatrix::Multi { num_qubits, .. } => *num_qubits,
        }
    }
}

#[inline]
fn phase(theta: f64) -> Complex64 {
    Complex64::from_polar(1.0, theta)
}

fn permutation(num_qubits: usize, swaps: &[(usize, usize)]) -> GateMatrix {
    let dim = 1 << num_qubits;
    let mut target: Vec<usize> = (0..dim).collect();
    for &(a, b) in swaps {
        target.swap(a, b);
    }
    let mut matrix = vec![ZERO; dim * dim];
    for (col, &row) in target.iter().enumerate() {
        matrix[row * dim + col] = ONE;
    }
    GateMatrix::Multi { matrix, num_qubits }
}

fn expect_params(gate_id: &str, params: &[f64], expected: usize) -> Result<()> {
    if params.len() != expected {
        return Err(StateError::InvalidParameters {
            gate: gate_id.to_string(),
            expected,
            actual: params.len(),
        });
    }
    Ok(())
}

/// General single-qubit rotation U3(θ, φ, λ)
pub fn u3(theta: f64, phi: f64, lambda: f64) -> [[Complex64; 2]; 2] {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(c, 0.0), -phase(lambda) * s],
        [phase(phi) * s, phase(phi + lambda) * c],
    ]
}

/// Matrix for `gate_id` with rotation angles `params`
///
/// # Errors
/// - [`StateError::UnsupportedGate`] for identifiers with no unitary form
/// - [`StateError::InvalidParameters`] on an angle count mismatch
pub fn gate_matrix(gate_id: &str, params: &[f64]) -> Result<GateMatrix> {
    let h = FRAC_1_SQRT_2;
    let fixed = match gate_id {
        "id" => Some([[ONE, ZERO], [ZERO, ONE]]),
        "x" => Some([[ZERO, ONE], [ONE, ZERO]]),
        "y" => Some([[ZERO, -I], [I, ZERO]]),
        "z" => Some([[ONE, ZERO], [ZERO, -ONE]]),
        "h" => Some([
            [Complex64::new(h, 0.0), Complex64::new(h, 0.0)],
            [Complex64::new(h, 0.0), Complex64::new(-h, 0.0)],
        ]),
        "s" => Some([[ONE, ZERO], [ZERO, I]]),
        "sdg" => Some([[ONE, ZERO], [ZERO, -I]]),
        "t" => Some([[ONE, ZERO], [ZERO, phase(FRAC_PI_4)]]),
        "tdg" => Some([[ONE, ZERO], [ZERO, phase(-FRAC_PI_4)]]),
        _ => None,
    };
    if let Some(matrix) = fixed {
        expect_params(gate_id, params, 0)?;
        return Ok(GateMatrix::Single(matrix));
    }

    let matrix = match gate_id {
        "rx" => {
            expect_params(gate_id, params, 1)?;
            let (s, c) = (params[0] / 2.0).sin_cos();
            GateMatrix::Single([
                [Complex64::new(c, 0.0), Complex64::new(0.0, -s)],
                [Complex64::new(0.0, -s), Complex64::new(c, 0.0)],
            ])
        }
        "ry" => {
            expect_params(gate_id, params, 1)?;
            let (s, c) = (params[0] / 2.0).sin_cos();
            GateMatrix::Single([
                [Complex64::new(c, 0.0), Complex64::new(-s, 0.0)],
                [Complex64::new(s, 0.0), Complex64::new(c, 0.0)],
            ])
        }
        "rz" => {
            expect_params(gate_id, params, 1)?;
            let half = params[0] / 2.0;
            GateMatrix::Single([[phase(-half), ZERO], [ZERO, phase(half)]])
        }
        "u1" => {
            expect_params(gate_id, params, 1)?;
            GateMatrix::Single([[ONE, ZERO], [ZERO, phase(params[0])]])
        }
        "u2" => {
            expect_params(gate_id, params, 2)?;
            GateMatrix::Single(u3(std::f64::consts::FRAC_PI_2, params[0], params[1]))
        }
        "u3" => {
            expect_params(gate_id, params, 3)?;
            GateMatrix::Single(u3(params[0], params[1], params[2]))
        }
        "cx" => {
            expect_params(gate_id, params, 0)?;
            permutation(2, &[(1, 3)])
        }
        "swap" => {
            expect_params(gate_id, params, 0)?;
            permutation(2, &[(1, 2)])
        }
        "ccx" => {
            expect_params(gate_id, params, 0)?;
            permutation(3, &[(3, 7)])
        }
        "cz" => {
            expect_params(gate_id, params, 0)?;
            let mut matrix = vec![ZERO; 16];
            for i in 0..4 {
                matrix[i * 4 + i] = if i == 3 { -ONE } else { ONE };
            }
            GateMatrix::Multi {
                matrix,
                num_qubits: 2,
            }
        }
        other => return Err(StateError::UnsupportedGate(other.to_string())),
    };
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn is_unitary(m: &GateMatrix) -> bool {
        let (data, dim) = match m {
            GateMatrix::Single(s) => (vec![s[0][0], s[0][1], s[1][0], s[1][1]], 2),
            GateMatrix::Multi { matrix, num_qubits } => (matrix.clone(), 1 << num_qubits),
        };
        (0..dim).all(|i| {
            (0..dim).all(|j| {
                let dot: Complex64 = (0..dim).map(|k| data[k * dim + i].conj() * data[k * dim + j]).sum();
                let expected = if i == j { ONE } else { ZERO };
                (dot - expected).norm() < 1e-12
            })
        })
    }

    #[test]
    fn test_catalog_is_unitary() {
        let cases: [(&str, &[f64]); 19] = [
            ("id", &[]),
            ("x", &[]),
            ("y", &[]),
            ("z", &[]),
            ("h", &[]),
            ("s", &[]),
            ("sdg", &[]),
            ("t", &[]),
            ("tdg", &[]),
            ("rx", &[0.3]),
            ("ry", &[1.1]),
            ("rz", &[-0.7]),
            ("u1", &[0.2]),
            ("u2", &[0.1, 0.4]),
            ("u3", &[0.5, 0.6, 0.7]),
            ("cx", &[]),
            ("cz", &[]),
            ("swap", &[]),
            ("ccx", &[]),
        ];
        for (id, params) in cases {
            let m = gate_matrix(id, params).unwrap();
            assert!(is_unitary(&m), "{} not unitary", id);
        }
    }

    #[test]
    fn test_rx_pi_is_x_up_to_phase() {
        let GateMatrix::Single(m) = gate_matrix("rx", &[PI]).unwrap() else {
            panic!("expected single-qubit matrix");
        };
        assert_relative_eq!(m[0][0].norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(m[1][0].norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_u3_reduces_to_u1_form() {
        let a = u3(0.0, 0.0, 0.9);
        assert_relative_eq!((a[1][1] - phase(0.9)).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bad_inputs() {
        assert!(matches!(gate_matrix("measure", &[]), Err(StateError::UnsupportedGate(_))));
        assert!(matches!(
            gate_matrix("rx", &[]),
            Err(StateError::InvalidParameters { expected: 1, actual: 0, .. })
        ));
        assert!(gate_matrix("h", &[1.0]).is_err());
    }

    #[test]
    fn test_cx_permutation() {
        let GateMatrix::Multi { matrix, .. } = gate_matrix("cx", &[]).unwrap() else {
            panic!("expected two-qubit matrix");
        };
        // column 1 (control set, target clear) maps to row 3
        assert_eq!(matrix[3 * 4 + 1], ONE);
        assert_eq!(matrix[1 * 4 + 3], ONE);
        assert_eq!(matrix[2 * 4 + 2], ONE);
    }
}
