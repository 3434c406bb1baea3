//! Classical readout error applied to measurement outcomes

use crate::{QuantumError, Result};

/// Readout (measurement) error model
///
/// The state is measured correctly but the reported bit is wrong.
/// Confusion matrix, rows indexed by the true bit:
///
/// ```text
/// [[1 - p01, p01],
///  [p10,     1 - p10]]
/// ```
///
/// # Example
/// ```
/// # use qnex_core::noise::ReadoutError;
/// let readout = ReadoutError::symmetric(0.02).unwrap();
/// assert_eq!(readout.confusion_matrix(), [[0.98, 0.02], [0.02, 0.98]]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadoutError {
    /// Probability of reporting 1 when the state is |0⟩
    p01: f64,
    /// Probability of reporting 0 when the state is |1⟩
    p10: f64,
}

impl ReadoutError {
    /// # Errors
    /// Returns error if probabilities are not in [0, 1]
    pub fn new(p01: f64, p10: f64) -> Result<Self> {
        for (name, value) in [("p01", p01), ("p10", p10)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(QuantumError::ValidationError(format!(
                    "{} must be in [0,1], got {}",
                    name, value
                )));
            }
        }
        Ok(Self { p01, p10 })
    }

    /// Sets p01 = p10 = error_rate
    pub fn symmetric(error_rate: f64) -> Result<Self> {
        Self::new(error_rate, error_rate)
    }

    pub fn p01(&self) -> f64 {
        self.p01
    }

    pub fn p10(&self) -> f64 {
        self.p10
    }

    pub fn confusion_matrix(&self) -> [[f64; 2]; 2] {
        [[1.0 - self.p01, self.p01], [self.p10, 1.0 - self.p10]]
    }

    /// Returns true if the measured bit should be reported flipped
    pub fn should_flip(&self, measured_bit: bool, random_value: f64) -> bool {
        if measured_bit {
            random_value < self.p10
        } else {
            random_value < self.p01
        }
    }

    /// Apply the error independently to each of the low `num_bits` bits
    ///
    /// `random_value` is called once per bit, in qubit order.
    pub fn apply_to_outcome<F>(&self, outcome: usize, num_bits: usize, mut random_value: F) -> usize
    where
        F: FnMut() -> f64,
    {
        let mut reported = outcome;
        for bit in 0..num_bits {
            let measured = (outcome >> bit) & 1 == 1;
            if self.should_flip(measured, random_value()) {
                reported ^= 1 << bit;
            }
        }
        reported
    }
}
