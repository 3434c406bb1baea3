//! Core types for the qnex noisy-simulation pipeline
//!
//! This crate provides the descriptive layer shared by the executor and
//! the simulator:
//! - [`Gate`] and [`GateRegistry`]: supported gates and applicable noise
//! - [`Circuit`] and [`Instruction`]: instruction sequences over qubits
//! - [`noise`]: noise profiles, Kraus channels and their composition
//!
//! # Example
//! ```
//! use qnex_core::{Circuit, GateRegistry};
//!
//! let registry = GateRegistry::standard();
//! let mut circuit = Circuit::new(1).unwrap();
//! circuit.add(&registry, "h", &[0], &[]).unwrap();
//! assert_eq!(circuit.used_operations(&registry), vec!["h"]);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod noise;
pub mod registry;

// Re-exports for convenience
pub use circuit::Circuit;
pub use error::QuantumError;
pub use gate::{Gate, GateArity, Instruction};
pub use num_complex::Complex64;
pub use registry::GateRegistry;

/// Type alias for results in qnex-core
pub type Result<T> = std::result::Result<T, QuantumError>;
