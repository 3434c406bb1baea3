//! Dense statevector execution for qnex
//!
//! This crate provides the default [`QuantumExecutor`]:
//!
//! - [`StateVector`]: 2^n complex amplitudes, qubit 0 as the least significant bit
//! - [`kernels`]: single-qubit, k-qubit and stochastic Kraus kernels
//! - [`matrices`]: unitaries for the standard gate catalog
//! - [`measurement`]: qubit collapse, basis sampling and bitstring labels
//!
//! # Example
//!
//! ```
//! use qnex_core::Instruction;
//! use qnex_state::{QuantumExecutor, StatevectorExecutor};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let executor = StatevectorExecutor::new();
//! let mut state = executor.initial_state(2).unwrap();
//! executor.apply_gate(&mut state, &Instruction::new("h", &[0], &[])).unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(3);
//! let outcome = executor.sample_measurement(&state, &mut rng).unwrap();
//! assert!(outcome == 0 || outcome == 1);
//! ```

pub mod error;
pub mod executor;
pub mod kernels;
pub mod matrices;
pub mod measurement;
pub mod state_vector;

pub use error::{Result, StateError};
pub use executor::{QuantumExecutor, StatevectorExecutor};
pub use matrices::{gate_matrix, GateMatrix};
pub use measurement::{basis_labels, format_basis_state};
pub use state_vector::{fidelity, StateVector, MAX_QUBITS};
