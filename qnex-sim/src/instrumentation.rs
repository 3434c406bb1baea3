//! Checkpoint placement
//!
//! Turns a circuit into a flat step list in which instructions are
//! interleaved with checkpoint markers. Checkpoint 0 is always the initial
//! all-zero state, and structural directives such as `barrier` are dropped.

use qnex_core::{Circuit, GateRegistry, Instruction};
use std::fmt;

/// Where statevector snapshots are captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckpointStrategy {
    /// After every non-structural instruction
    #[default]
    PerInstruction,
    /// After every layer of instructions on disjoint qubits
    PerLayer,
}

/// Marker for one snapshot position
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    /// Position in program order, 0 = initial state
    pub index: usize,
    /// Human readable description of what precedes the snapshot
    pub label: String,
}

/// One step of an instrumented circuit
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Apply(Instruction),
    Checkpoint(Checkpoint),
}

/// Group of instructions on pairwise disjoint qubits
#[derive(Debug, Clone, Default)]
pub struct ExecutionLayer {
    /// Instruction indices, in program order
    pub instructions: Vec<usize>,
    /// Qubits touched by the layer
    pub qubits: Vec<usize>,
}

impl ExecutionLayer {
    pub fn add(&mut self, index: usize, qubits: &[usize]) {
        self.instructions.push(index);
        self.qubits.extend_from_slice(qubits);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// A circuit with checkpoint markers inserted
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentedCircuit {
    num_qubits: usize,
    steps: Vec<Step>,
    checkpoint_count: usize,
}

impl InstrumentedCircuit {
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of snapshots a shot records, including the initial state
    #[inline]
    pub fn checkpoint_count(&self) -> usize {
        self.checkpoint_count
    }

    /// Checkpoint markers in order
    pub fn checkpoints(&self) -> impl Iterator<Item = &Checkpoint> {
        self.steps.iter().filter_map(|step| match step {
            Step::Checkpoint(c) => Some(c),
            Step::Apply(_) => None,
        })
    }

    /// Instructions in execution order
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.steps.iter().filter_map(|step| match step {
            Step::Apply(inst) => Some(inst),
            Step::Checkpoint(_) => None,
        })
    }
}

fn is_structural(registry: &GateRegistry, inst: &Instruction) -> bool {
    registry
        .lookup(inst.gate_id())
        .map(|gate| gate.is_structural())
        .unwrap_or(false)
}

fn initial_checkpoint() -> Step {
    Step::Checkpoint(Checkpoint {
        index: 0,
        label: "initial".to_string(),
    })
}

/// ASAP layering
///
/// Each instruction joins the layer right after the latest layer that
/// touches any of its qubits, which keeps per-qubit program order.
/// Structural directives are skipped.
pub fn layer_circuit(circuit: &Circuit, registry: &GateRegistry) -> Vec<ExecutionLayer> {
    let mut last_layer: Vec<Option<usize>> = vec![None; circuit.num_qubits()];
    let mut layers: Vec<ExecutionLayer> = Vec::new();

    for (index, inst) in circuit.instructions().enumerate() {
        if is_structural(registry, inst) {
            continue;
        }
        let layer = inst
            .qubits()
            .iter()
            .filter_map(|&q| last_layer[q])
            .max()
            .map_or(0, |l| l + 1);

        if layer == layers.len() {
            layers.push(ExecutionLayer::default());
        }
        layers[layer].add(index, inst.qubits());
        for &q in inst.qubits() {
            last_layer[q] = Some(layer);
        }
    }
    layers
}

/// Insert checkpoint markers according to `strategy`
pub fn instrument(
    circuit: &Circuit,
    registry: &GateRegistry,
    strategy: CheckpointStrategy,
) -> InstrumentedCircuit {
    let mut steps = vec![initial_checkpoint()];
    let mut checkpoint_count = 1;

    match strategy {
        CheckpointStrategy::PerInstruction => {
            for inst in circuit.instructions() {
                if is_structural(registry, inst) {
                    continue;
                }
                steps.push(Step::Apply(inst.clone()));
                steps.push(Step::Checkpoint(Checkpoint {
                    index: checkpoint_count,
                    label: inst.to_string(),
                }));
                checkpoint_count += 1;
            }
        }
        CheckpointStrategy::PerLayer => {
            for (layer_index, layer) in layer_circuit(circuit, registry).iter().enumerate() {
                for &index in &layer.instructions {
                    if let Some(inst) = circuit.get(index) {
                        steps.push(Step::Apply(inst.clone()));
                    }
                }
                steps.push(Step::Checkpoint(Checkpoint {
                    index: checkpoint_count,
                    label: format!("layer {}", layer_index + 1),
                }));
                checkpoint_count += 1;
            }
        }
    }

    InstrumentedCircuit {
        num_qubits: circuit.num_qubits(),
        steps,
        checkpoint_count,
    }
}

impl fmt::Display for InstrumentedCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            match step {
                Step::Apply(inst) => writeln!(f, "  {}", inst)?,
                Step::Checkpoint(c) => writeln!(f, "[{}] {}", c.index, c.label)?,
            }
        }
        Ok(())
    }
}
