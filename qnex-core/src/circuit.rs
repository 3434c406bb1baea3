//! Quantum circuit representation

use crate::gate::Instruction;
use crate::registry::GateRegistry;
use crate::{QuantumError, Result};

/// A quantum circuit
///
/// An ordered sequence of [`Instruction`]s over a fixed number of qubits.
/// Qubit bounds are checked on insertion; gate identifiers are checked
/// against a [`GateRegistry`] by [`Circuit::add`] or [`Circuit::validate`].
///
/// # Example
/// ```
/// use qnex_core::Circuit;
/// use qnex_core::registry::GateRegistry;
///
/// let registry = GateRegistry::standard();
/// let mut circuit = Circuit::new(2).unwrap();
/// circuit.add(&registry, "h", &[0], &[]).unwrap();
/// circuit.add(&registry, "cx", &[0, 1], &[]).unwrap();
/// assert_eq!(circuit.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Circuit {
    num_qubits: usize,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new quantum circuit with the specified number of qubits
    ///
    /// # Errors
    /// Returns [`QuantumError::EmptyCircuit`] if `num_qubits` is 0
    pub fn new(num_qubits: usize) -> Result<Self> {
        Self::with_capacity(num_qubits, 0)
    }

    /// Create a circuit with pre-allocated capacity
    pub fn with_capacity(num_qubits: usize, capacity: usize) -> Result<Self> {
        if num_qubits == 0 {
            return Err(QuantumError::EmptyCircuit);
        }
        Ok(Self {
            num_qubits,
            instructions: Vec::with_capacity(capacity),
        })
    }

    /// Get the number of qubits in the circuit
    #[inline]
    pub const fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the number of instructions in the circuit
    #[inline]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Append an instruction after checking it against the registry
    ///
    /// # Errors
    /// Returns error if the gate is unknown, any qubit index is out of
    /// bounds, or the operand counts don't match the gate
    pub fn add(
        &mut self,
        registry: &GateRegistry,
        gate_id: &str,
        qubits: &[usize],
        params: &[f64],
    ) -> Result<()> {
        let gate = registry.lookup(gate_id)?;
        self.check_bounds(qubits)?;
        gate.check_operands(qubits, params)?;
        self.instructions
            .push(Instruction::new(gate.id(), qubits, params));
        Ok(())
    }

    /// Append an instruction without consulting a registry
    ///
    /// Only qubit bounds are checked. Used by parsers that defer gate
    /// resolution so unknown gates can be reported or skipped later.
    pub fn push(&mut self, instruction: Instruction) -> Result<()> {
        self.check_bounds(instruction.qubits())?;
        self.instructions.push(instruction);
        Ok(())
    }

    fn check_bounds(&self, qubits: &[usize]) -> Result<()> {
        match qubits.iter().find(|&&q| q >= self.num_qubits) {
            Some(&q) => Err(QuantumError::invalid_qubit(q, self.num_qubits)),
            None => Ok(()),
        }
    }

    /// Get an iterator over the instructions
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    /// Get a specific instruction by index
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Distinct registered gates used by the circuit, in first-use order
    ///
    /// Structural directives and unknown identifiers are left out.
    pub fn used_operations<'r>(&self, registry: &'r GateRegistry) -> Vec<&'r str> {
        let mut used: Vec<&'r str> = Vec::new();
        for inst in &self.instructions {
            if let Ok(gate) = registry.lookup(inst.gate_id()) {
                if !gate.is_structural() && !used.contains(&gate.id()) {
                    used.push(gate.id());
                }
            }
        }
        used
    }

    /// Instructions whose gate identifier is not in the registry
    pub fn unknown_gates(&self, registry: &GateRegistry) -> Vec<String> {
        let mut unknown: Vec<String> = Vec::new();
        for inst in &self.instructions {
            if !registry.contains(inst.gate_id())
                && !unknown.iter().any(|u| u == inst.gate_id())
            {
                unknown.push(inst.gate_id().to_string());
            }
        }
        unknown
    }

    /// Depth of the circuit with structural directives ignored
    ///
    /// Each instruction lands one layer after the latest layer that touches
    /// any of its qubits.
    pub fn depth(&self, registry: &GateRegistry) -> usize {
        let mut qubit_depth = vec![0usize; self.num_qubits];
        let mut depth = 0;
        for inst in &self.instructions {
            let structural = registry
                .lookup(inst.gate_id())
                .map(|g| g.is_structural())
                .unwrap_or(false);
            if structural {
                continue;
            }
            let layer = inst
                .qubits()
                .iter()
                .map(|&q| qubit_depth[q])
                .max()
                .unwrap_or(0)
                + 1;
            for &q in inst.qubits() {
                qubit_depth[q] = layer;
            }
            depth = depth.max(layer);
        }
        depth
    }

    /// Validate the circuit against a registry
    ///
    /// Checks that every instruction names a known gate with matching operands.
    pub fn validate(&self, registry: &GateRegistry) -> Result<()> {
        for (i, inst) in self.instructions.iter().enumerate() {
            let gate = registry.lookup(inst.gate_id())?;
            gate.check_operands(inst.qubits(), inst.params())
                .map_err(|e| {
                    QuantumError::ValidationError(format!("Instruction {} ({}): {}", i, inst, e))
                })?;
        }
        Ok(())
    }
}
