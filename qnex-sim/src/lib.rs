//! Ideal versus noisy circuit simulation
//!
//! Every run executes the circuit on two tracks that share their
//! measurement randomness: an ideal track that only applies gate unitaries
//! and a noisy track that additionally applies per-gate error channels built
//! from a [`NoiseConfiguration`](qnex_core::noise::NoiseConfiguration).
//! Statevector snapshots are taken at checkpoints, and the result reports
//! per-checkpoint probabilities, sampled counts and the ideal/noisy fidelity.
//!
//! # Features
//!
//! - **Matched tracks**: shot `k` of both tracks draws identical measurement randomness
//! - **Reproducible**: every run is replayable from the seed stored in its result
//! - **Checkpoint strategies**: per instruction or per ASAP layer
//! - **Parallel shots**: shots of a track run on the rayon pool
//! - **OpenQASM input**: 2.0 and 3.0 gate-level subset
//!
//! # Example
//!
//! ```
//! use qnex_core::noise::{GateNoiseParams, NoiseChannelKind, NoiseConfiguration};
//! use qnex_sim::{simulate, Track};
//!
//! let noise = NoiseConfiguration::new().with_gate(
//!     "h",
//!     GateNoiseParams::new().with_probability(NoiseChannelKind::Depolarizing, 10.0),
//! );
//!
//! let result = simulate("OPENQASM 2.0; qreg q[1]; h q[0];", 200, Some(42), &noise)?;
//! assert_eq!(result.num_checkpoints(), 2);
//! assert_eq!(result.final_layer(Track::Ideal).unwrap().total_counts(), 200);
//! # Ok::<(), qnex_sim::SimulationError>(())
//! ```

pub mod aggregation;
pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod instrumentation;
pub mod parser;
pub mod result;
pub mod simulator;
pub mod statistics;

pub use cancel::CancellationToken;
pub use config::SimulatorConfig;
pub use coordinator::Track;
pub use error::{Result, SimulationError};
pub use instrumentation::CheckpointStrategy;
pub use parser::{CircuitParser, QasmParser};
pub use result::{LayerResult, SimulationResult, StatevectorSample};
pub use simulator::{simulate, Simulator};
pub use statistics::RunStatistics;
