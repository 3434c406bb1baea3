//! Quantum noise models and error channels
//!
//! This module turns a user-tunable [`NoiseConfiguration`] into the
//! [`NoiseModel`] used during a noisy run:
//!
//! - **Bit flip / phase flip**: Pauli X or Z errors
//! - **Amplitude damping**: Energy relaxation
//! - **Phase damping**: Dephasing without energy loss
//! - **Depolarizing**: Uniform Pauli errors on all gate qubits jointly
//! - **Thermal relaxation**: T1/T2 decay over the gate duration
//! - **Readout errors**: Measurement bit-flip errors
//!
//! # Usage
//!
//! ```
//! use qnex_core::noise::{build_noise_model, GateNoiseParams, NoiseChannelKind, NoiseConfiguration};
//! use qnex_core::registry::GateRegistry;
//!
//! let registry = GateRegistry::standard();
//! let config = NoiseConfiguration::new().with_gate(
//!     "h",
//!     GateNoiseParams::new().with_probability(NoiseChannelKind::BitFlip, 1.0),
//! );
//! let model = build_noise_model(&registry, &config, true).unwrap();
//! assert!(model.gate_channel("h").is_some());
//! ```

pub mod channels;
pub mod config;
pub mod readout;
pub mod synthesizer;
pub mod types;

pub use channels::{
    AmplitudeDamping, BitFlip, DepolarizingChannel, PhaseDamping, PhaseFlip, ThermalRelaxation,
};
pub use config::{GateNoiseParams, NoiseConfiguration};
pub use readout::ReadoutError;
pub use synthesizer::{
    build_noise_model, channel_probability, percent_to_probability, readout_model, synthesize,
};
pub use types::{
    ChannelComponent, ChannelScope, ChannelSet, ErrorChannel, KrausOperator, NoiseChannel,
    NoiseChannelKind, NoiseModel,
};
