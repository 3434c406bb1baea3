//! Core types and traits for noise modeling

use crate::{QuantumError, Result};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::readout::ReadoutError;

/// Physical error mechanisms a gate can be subjected to.
///
/// Variants are declared in composition order: when several channels are
/// enabled for one gate they are chained in exactly this order.
/// `ReadoutError` is never part of a gate channel and is listed last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseChannelKind {
    BitFlip,
    PhaseFlip,
    AmplitudeDamping,
    PhaseDamping,
    Depolarizing,
    ThermalRelaxation,
    ReadoutError,
}

impl NoiseChannelKind {
    /// Every kind, in composition order.
    pub const ALL: [NoiseChannelKind; 7] = [
        NoiseChannelKind::BitFlip,
        NoiseChannelKind::PhaseFlip,
        NoiseChannelKind::AmplitudeDamping,
        NoiseChannelKind::PhaseDamping,
        NoiseChannelKind::Depolarizing,
        NoiseChannelKind::ThermalRelaxation,
        NoiseChannelKind::ReadoutError,
    ];

    /// Configuration key used in serialized noise profiles
    pub fn key(&self) -> &'static str {
        match self {
            NoiseChannelKind::BitFlip => "bit_flip",
            NoiseChannelKind::PhaseFlip => "phase_flip",
            NoiseChannelKind::AmplitudeDamping => "amplitude_damping",
            NoiseChannelKind::PhaseDamping => "phase_damping",
            NoiseChannelKind::Depolarizing => "depolarizing",
            NoiseChannelKind::ThermalRelaxation => "thermal_relaxation",
            NoiseChannelKind::ReadoutError => "readout_error",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            NoiseChannelKind::BitFlip => "Bit Flip",
            NoiseChannelKind::PhaseFlip => "Phase Flip",
            NoiseChannelKind::AmplitudeDamping => "Amplitude Damping",
            NoiseChannelKind::PhaseDamping => "Phase Damping",
            NoiseChannelKind::Depolarizing => "Depolarizing",
            NoiseChannelKind::ThermalRelaxation => "Thermal Relaxation",
            NoiseChannelKind::ReadoutError => "Readout Error",
        }
    }

    /// Short physical description of the mechanism
    pub fn description(&self) -> &'static str {
        match self {
            NoiseChannelKind::BitFlip => {
                "The qubit state unexpectedly flips from |0⟩ to |1⟩ or vice versa."
            }
            NoiseChannelKind::PhaseFlip => {
                "The relative phase of the |1⟩ component is inverted, disturbing interference."
            }
            NoiseChannelKind::AmplitudeDamping => {
                "Energy loss: the qubit relaxes from |1⟩ towards |0⟩."
            }
            NoiseChannelKind::PhaseDamping => {
                "Loss of phase coherence through interaction with the environment."
            }
            NoiseChannelKind::Depolarizing => {
                "The state is replaced by the maximally mixed state with some probability."
            }
            NoiseChannelKind::ThermalRelaxation => {
                "Combined T1 relaxation and T2 dephasing over the duration of the gate."
            }
            NoiseChannelKind::ReadoutError => {
                "The reported measurement outcome differs from the measured state."
            }
        }
    }

    /// Whether the kind is configured with an on/off flag rather than a probability
    pub fn is_switch(&self) -> bool {
        matches!(self, NoiseChannelKind::ThermalRelaxation)
    }

    #[inline]
    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for NoiseChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Compact set of [`NoiseChannelKind`]s.
///
/// Iteration always yields kinds in composition order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChannelSet(u8);

impl ChannelSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn from_kinds(kinds: &[NoiseChannelKind]) -> Self {
        kinds.iter().fold(Self::empty(), |set, kind| set.with(*kind))
    }

    pub fn with(mut self, kind: NoiseChannelKind) -> Self {
        self.insert(kind);
        self
    }

    pub fn insert(&mut self, kind: NoiseChannelKind) {
        self.0 |= kind.bit();
    }

    #[inline]
    pub fn contains(&self, kind: NoiseChannelKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = NoiseChannelKind> + '_ {
        NoiseChannelKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

/// A Kraus operator representing a quantum operation
///
/// Quantum channels are described by a set of Kraus operators {K_i}
/// that satisfy the completeness relation: Σ K_i† K_i = I
///
/// Local basis index bit `j` corresponds to the `j`-th qubit the operator
/// is applied to.
#[derive(Clone, Debug, PartialEq)]
pub struct KrausOperator {
    /// Row-major 2^n × 2^n matrix
    pub matrix: Vec<Complex64>,
    /// Dimension of the operator (2^n for n qubits)
    pub dimension: usize,
}

impl KrausOperator {
    /// Create a new Kraus operator from a row-major matrix
    ///
    /// # Errors
    /// Returns error if dimension is not a power of 2 or matrix size doesn't match
    pub fn new(matrix: Vec<Complex64>, dimension: usize) -> Result<Self> {
        if dimension == 0 || !dimension.is_power_of_two() {
            return Err(QuantumError::ValidationError(format!(
                "Kraus operator dimension must be power of 2, got {}",
                dimension
            )));
        }

        if matrix.len() != dimension * dimension {
            return Err(QuantumError::ValidationError(format!(
                "Matrix size {} doesn't match dimension {}×{}",
                matrix.len(),
                dimension,
                dimension
            )));
        }

        Ok(Self { matrix, dimension })
    }

    /// Single-qubit operator from a 2×2 array
    pub fn from_2x2(m: [[Complex64; 2]; 2]) -> Self {
        Self {
            matrix: vec![m[0][0], m[0][1], m[1][0], m[1][1]],
            dimension: 2,
        }
    }

    /// Identity on `num_qubits` qubits
    pub fn identity(num_qubits: usize) -> Self {
        let dimension = 1 << num_qubits;
        let mut matrix = vec![Complex64::new(0.0, 0.0); dimension * dimension];
        for i in 0..dimension {
            matrix[i * dimension + i] = Complex64::new(1.0, 0.0);
        }
        Self { matrix, dimension }
    }

    /// Number of qubits this operator acts on
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.dimension.trailing_zeros() as usize
    }

    /// Matrix element at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.matrix[row * self.dimension + col]
    }

    /// Multiply every element by a real factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            matrix: self.matrix.iter().map(|&x| x * factor).collect(),
            dimension: self.dimension,
        }
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> Self {
        let dim = self.dimension;
        let mut adj = vec![Complex64::new(0.0, 0.0); self.matrix.len()];
        for i in 0..dim {
            for j in 0..dim {
                adj[j * dim + i] = self.matrix[i * dim + j].conj();
            }
        }
        Self {
            matrix: adj,
            dimension: dim,
        }
    }

    /// Matrix product `self · other`
    pub fn matmul(&self, other: &KrausOperator) -> Self {
        debug_assert_eq!(self.dimension, other.dimension);
        let dim = self.dimension;
        let mut out = vec![Complex64::new(0.0, 0.0); dim * dim];
        for i in 0..dim {
            for k in 0..dim {
                let a = self.matrix[i * dim + k];
                if a == Complex64::new(0.0, 0.0) {
                    continue;
                }
                for j in 0..dim {
                    out[i * dim + j] += a * other.matrix[k * dim + j];
                }
            }
        }
        Self {
            matrix: out,
            dimension: dim,
        }
    }

    /// Kronecker product `high ⊗ self`: `self` keeps the low local bits.
    pub fn kron_above(&self, high: &KrausOperator) -> Self {
        let (dl, dh) = (self.dimension, high.dimension);
        let dim = dl * dh;
        let mut out = vec![Complex64::new(0.0, 0.0); dim * dim];
        for hr in 0..dh {
            for hc in 0..dh {
                let h = high.get(hr, hc);
                for lr in 0..dl {
                    for lc in 0..dl {
                        out[(hr * dl + lr) * dim + hc * dl + lc] = h * self.get(lr, lc);
                    }
                }
            }
        }
        Self {
            matrix: out,
            dimension: dim,
        }
    }

    /// Frobenius norm squared, Tr(K† K)
    pub fn weight(&self) -> f64 {
        self.matrix.iter().map(|x| x.norm_sqr()).sum()
    }
}

/// Trait for quantum noise channels
///
/// A noise channel describes how errors affect quantum states.
/// Channels are represented using the Kraus operator formalism.
pub trait NoiseChannel: Send + Sync + fmt::Debug {
    /// Kraus operators defining this channel
    ///
    /// The operators must satisfy Σ_i K_i† K_i = I
    fn kraus_operators(&self) -> Vec<KrausOperator>;

    /// Number of qubits this channel acts on
    fn num_qubits(&self) -> usize;

    /// Which configurable mechanism this channel models
    fn kind(&self) -> NoiseChannelKind;

    fn description(&self) -> String {
        format!("{}-qubit {} channel", self.num_qubits(), self.kind().key())
    }

    /// Verify the completeness relation Σ K_i† K_i = I within `tolerance`
    fn verify_completeness(&self, tolerance: f64) -> bool {
        completeness_holds(&self.kraus_operators(), tolerance)
    }
}

pub(crate) fn completeness_holds(operators: &[KrausOperator], tolerance: f64) -> bool {
    let Some(first) = operators.first() else {
        return false;
    };
    let dim = first.dimension;
    if operators.iter().any(|k| k.dimension != dim) {
        return false;
    }

    let mut sum = vec![Complex64::new(0.0, 0.0); dim * dim];
    for kraus in operators {
        let product = kraus.adjoint().matmul(kraus);
        for (acc, x) in sum.iter_mut().zip(product.matrix.iter()) {
            *acc += x;
        }
    }

    (0..dim).all(|i| {
        (0..dim).all(|j| {
            let expected = if i == j { 1.0 } else { 0.0 };
            (sum[i * dim + j] - Complex64::new(expected, 0.0)).norm() <= tolerance
        })
    })
}

/// How a channel component maps onto the qubits of the gate it follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelScope {
    /// A single-qubit channel applied independently to every gate qubit
    EachQubit,
    /// One channel acting jointly on all gate qubits
    AllQubits,
}

/// One stage of a composite error channel
#[derive(Debug, Clone)]
pub struct ChannelComponent {
    pub kind: NoiseChannelKind,
    pub scope: ChannelScope,
    pub operators: Vec<KrausOperator>,
}

impl ChannelComponent {
    pub fn from_channel(channel: &dyn NoiseChannel, scope: ChannelScope) -> Self {
        Self {
            kind: channel.kind(),
            scope,
            operators: channel.kraus_operators(),
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.operators.first().map(|k| k.num_qubits()).unwrap_or(0)
    }
}

/// Composite error channel fired after a gate.
///
/// Components apply in order; the first component acts first.
#[derive(Debug, Clone)]
pub struct ErrorChannel {
    num_qubits: usize,
    components: Vec<ChannelComponent>,
}

impl ErrorChannel {
    /// Empty channel for a gate of `num_qubits` qubits
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            components: Vec::new(),
        }
    }

    /// Append `component` so it runs after the existing ones
    ///
    /// # Errors
    /// Returns error if a joint component does not match the gate width
    pub fn compose(mut self, component: ChannelComponent) -> Result<Self> {
        let width = component.num_qubits();
        let expected = match component.scope {
            ChannelScope::EachQubit => 1,
            ChannelScope::AllQubits => self.num_qubits,
        };
        if width != expected {
            return Err(QuantumError::ValidationError(format!(
                "{} component acts on {} qubits, expected {}",
                component.kind, width, expected
            )));
        }
        self.components.push(component);
        Ok(self)
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn components(&self) -> &[ChannelComponent] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Kinds in the order they are applied
    pub fn kinds(&self) -> Vec<NoiseChannelKind> {
        self.components.iter().map(|c| c.kind).collect()
    }

    pub fn verify_completeness(&self, tolerance: f64) -> bool {
        !self.components.is_empty()
            && self
                .components
                .iter()
                .all(|c| completeness_holds(&c.operators, tolerance))
    }
}

/// Per-gate error channels plus the global readout model for one run.
#[derive(Debug, Clone, Default)]
pub struct NoiseModel {
    gate_channels: HashMap<String, Arc<ErrorChannel>>,
    readout: Option<ReadoutError>,
}

impl NoiseModel {
    /// Model with no errors at all
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_gate_channel(&mut self, gate_id: impl Into<String>, channel: ErrorChannel) {
        self.gate_channels.insert(gate_id.into(), Arc::new(channel));
    }

    pub fn set_readout(&mut self, readout: ReadoutError) {
        self.readout = Some(readout);
    }

    pub fn gate_channel(&self, gate_id: &str) -> Option<&Arc<ErrorChannel>> {
        self.gate_channels.get(gate_id)
    }

    pub fn readout(&self) -> Option<&ReadoutError> {
        self.readout.as_ref()
    }

    pub fn noisy_gates(&self) -> impl Iterator<Item = &str> {
        self.gate_channels.keys().map(|s| s.as_str())
    }

    pub fn has_noise(&self) -> bool {
        !self.gate_channels.is_empty() || self.readout.is_some()
    }
}
