//! Gate descriptors and instructions

use crate::noise::{ChannelSet, NoiseChannelKind};
use crate::{QuantumError, Result};
use smallvec::SmallVec;
use std::fmt;

/// How many qubits an operation acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateArity {
    /// Acts on exactly this many qubits
    Qubits(usize),
    /// Scheduling directive with no effect on the state (e.g. `barrier`).
    /// Accepts any number of qubits.
    Structural,
}

impl GateArity {
    /// Fixed qubit count, `None` for structural operations
    pub fn qubits(&self) -> Option<usize> {
        match self {
            GateArity::Qubits(n) => Some(*n),
            GateArity::Structural => None,
        }
    }
}

/// Static description of a supported gate kind
///
/// Gates are immutable and defined once when the
/// [`GateRegistry`](crate::registry::GateRegistry) is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    id: &'static str,
    display_name: &'static str,
    description: &'static str,
    arity: GateArity,
    num_params: usize,
    unitary: bool,
    channels: ChannelSet,
}

impl Gate {
    /// Unitary gate on `num_qubits` qubits
    pub fn unitary(
        id: &'static str,
        display_name: &'static str,
        description: &'static str,
        num_qubits: usize,
        channels: &[NoiseChannelKind],
    ) -> Self {
        Self {
            id,
            display_name,
            description,
            arity: GateArity::Qubits(num_qubits),
            num_params: 0,
            unitary: true,
            channels: ChannelSet::from_kinds(channels),
        }
    }

    /// Non-unitary operation such as measurement
    pub fn non_unitary(
        id: &'static str,
        display_name: &'static str,
        description: &'static str,
        num_qubits: usize,
        channels: &[NoiseChannelKind],
    ) -> Self {
        Self {
            unitary: false,
            ..Self::unitary(id, display_name, description, num_qubits, channels)
        }
    }

    /// Structural directive that never touches the state
    pub fn structural(
        id: &'static str,
        display_name: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            id,
            display_name,
            description,
            arity: GateArity::Structural,
            num_params: 0,
            unitary: false,
            channels: ChannelSet::empty(),
        }
    }

    /// Set the number of real parameters (rotation angles)
    pub fn with_params(mut self, num_params: usize) -> Self {
        self.num_params = num_params;
        self
    }

    #[inline]
    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    #[inline]
    pub fn arity(&self) -> GateArity {
        self.arity
    }

    #[inline]
    pub fn num_params(&self) -> usize {
        self.num_params
    }

    /// Whether this gate is a unitary operation
    ///
    /// Measurement and structural directives are not.
    #[inline]
    pub fn is_unitary(&self) -> bool {
        self.unitary
    }

    #[inline]
    pub fn is_structural(&self) -> bool {
        self.arity == GateArity::Structural
    }

    /// Noise mechanisms that can physically affect this gate
    #[inline]
    pub fn channels(&self) -> ChannelSet {
        self.channels
    }

    /// Check qubit count, parameter count and qubit uniqueness
    ///
    /// # Errors
    /// Returns error if:
    /// - Qubit count doesn't match the gate arity
    /// - Parameter count doesn't match
    /// - Duplicate qubits specified
    pub fn check_operands(&self, qubits: &[usize], params: &[f64]) -> Result<()> {
        if let GateArity::Qubits(expected) = self.arity {
            if qubits.len() != expected {
                return Err(QuantumError::invalid_qubit_count(
                    self.id,
                    expected,
                    qubits.len(),
                ));
            }
        }

        if params.len() != self.num_params {
            return Err(QuantumError::InvalidParameterCount {
                gate: self.id.to_string(),
                expected: self.num_params,
                actual: params.len(),
            });
        }

        for i in 0..qubits.len() {
            for j in (i + 1)..qubits.len() {
                if qubits[i] == qubits[j] {
                    return Err(QuantumError::DuplicateQubit(qubits[i]));
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}

/// One gate application inside a circuit
///
/// Qubit order is significant: for `cx` the first qubit is the control,
/// for `ccx` the first two are controls.
#[derive(Clone, PartialEq)]
pub struct Instruction {
    gate_id: String,
    qubits: SmallVec<[usize; 3]>,
    params: SmallVec<[f64; 3]>,
}

impl Instruction {
    pub fn new(gate_id: impl Into<String>, qubits: &[usize], params: &[f64]) -> Self {
        Self {
            gate_id: gate_id.into(),
            qubits: SmallVec::from_slice(qubits),
            params: SmallVec::from_slice(params),
        }
    }

    #[inline]
    pub fn gate_id(&self) -> &str {
        &self.gate_id
    }

    /// Get the qubits this instruction acts on
    #[inline]
    pub fn qubits(&self) -> &[usize] {
        &self.qubits
    }

    #[inline]
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate_id)?;
        if !self.params.is_empty() {
            write!(f, "(")?;
            for (i, p) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", p)?;
            }
            write!(f, ")")?;
        }
        for (i, q) in self.qubits.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}q{}", sep, q)?;
        }
        Ok(())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
