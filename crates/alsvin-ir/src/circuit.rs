//! Fixed-width circuit container.

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::operator::BoxOperator;
use crate::parameter::ParameterExpression;
use crate::qubit::QubitId;

/// A quantum circuit of fixed width.
///
/// The container is a flat instruction list; box instructions are lowered
/// in place by [`decompose_boxes_recursively`](Self::decompose_boxes_recursively).
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// Number of qubits.
    n_qubits: u32,
    /// Instructions in program order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create an empty circuit of the given width.
    pub fn new(n_qubits: u32) -> Self {
        Self {
            n_qubits,
            instructions: vec![],
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.n_qubits
    }

    /// All qubits in index order.
    pub fn all_qubits(&self) -> Vec<QubitId> {
        (0..self.n_qubits).map(QubitId).collect()
    }

    /// Number of instructions.
    pub fn num_ops(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the circuit contains no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Validate operands and push an instruction.
    pub fn apply(&mut self, inst: Instruction) -> IrResult<&mut Self> {
        let expected = inst.arity();
        if inst.qubits.len() != expected {
            return Err(IrError::ArityMismatch {
                name: inst.name().to_string(),
                expected,
                got: inst.qubits.len(),
            });
        }
        for (i, &q) in inst.qubits.iter().enumerate() {
            if q.0 >= self.n_qubits {
                return Err(IrError::QubitNotFound {
                    qubit: q,
                    width: self.n_qubits,
                });
            }
            if inst.qubits[..i].contains(&q) {
                return Err(IrError::DuplicateQubit {
                    qubit: q,
                    name: inst.name().to_string(),
                });
            }
        }
        self.instructions.push(inst);
        Ok(self)
    }

    // =========================================================================
    // Gate helpers
    // =========================================================================

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Y, qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Z, qubit))
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::S, qubit))
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Sdg, qubit))
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::SX, qubit))
    }

    /// Apply sqrt(X)-dagger gate.
    pub fn sxdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::SXdg, qubit))
    }

    /// Apply Rx rotation gate (half-turns).
    pub fn rx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(
            StandardGate::Rx(theta.into()),
            qubit,
        ))
    }

    /// Apply Rz rotation gate (half-turns).
    pub fn rz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(
            StandardGate::Rz(theta.into()),
            qubit,
        ))
    }

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::CX, control, target))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::CZ, q1, q2))
    }

    /// Apply RZZ (ZZ interaction) gate (half-turns).
    pub fn rzz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        q1: QubitId,
        q2: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(
            StandardGate::RZZ(theta.into()),
            q1,
            q2,
        ))
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Schedule a box over the listed qubits.
    pub fn add_box(
        &mut self,
        op: Arc<dyn BoxOperator>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::boxed(op, qubits))
    }

    /// Sequential composition at matching qubit indices.
    pub fn append(&mut self, other: Circuit) -> IrResult<&mut Self> {
        if other.n_qubits != self.n_qubits {
            return Err(IrError::WidthMismatch {
                expected: self.n_qubits,
                got: other.n_qubits,
            });
        }
        self.instructions.extend(other.instructions);
        Ok(self)
    }

    /// Flatten box instructions in place until only gates remain.
    ///
    /// Each box is replaced by its lowered circuit with the box-local qubits
    /// remapped onto the instruction's operands. Lowered circuits may
    /// themselves contain boxes; flattening repeats until none are left.
    pub fn decompose_boxes_recursively(&mut self) -> IrResult<()> {
        while self.instructions.iter().any(Instruction::is_box) {
            let mut flattened = Vec::with_capacity(self.instructions.len());
            for inst in std::mem::take(&mut self.instructions) {
                let Instruction { kind, qubits } = inst;
                match kind {
                    InstructionKind::Gate(g) => {
                        flattened.push(Instruction { kind: InstructionKind::Gate(g), qubits });
                    }
                    InstructionKind::Box(op) => {
                        let inner = op.to_circuit()?;
                        for inner_inst in inner.instructions {
                            let mapped = inner_inst
                                .qubits
                                .iter()
                                .map(|q| qubits[q.index()])
                                .collect();
                            flattened.push(Instruction {
                                kind: inner_inst.kind,
                                qubits: mapped,
                            });
                        }
                    }
                }
            }
            self.instructions = flattened;
        }
        Ok(())
    }

    /// The adjoint circuit: instructions reversed, each operation daggered.
    pub fn dagger(&self) -> IrResult<Circuit> {
        let mut out = Circuit::new(self.n_qubits);
        for inst in self.instructions.iter().rev() {
            let kind = match &inst.kind {
                InstructionKind::Gate(g) => InstructionKind::Gate(g.dagger()),
                InstructionKind::Box(op) => InstructionKind::Box(op.dagger()?),
            };
            out.instructions.push(Instruction {
                kind,
                qubits: inst.qubits.clone(),
            });
        }
        Ok(out)
    }

    /// Replace free symbols throughout the circuit.
    pub fn symbol_substitution(
        &self,
        map: &FxHashMap<String, ParameterExpression>,
    ) -> IrResult<Circuit> {
        let mut out = Circuit::new(self.n_qubits);
        for inst in &self.instructions {
            let kind = match &inst.kind {
                InstructionKind::Gate(g) => InstructionKind::Gate(g.substitute(map)),
                InstructionKind::Box(op) => InstructionKind::Box(op.symbol_substitution(map)?),
            };
            out.instructions.push(Instruction {
                kind,
                qubits: inst.qubits.clone(),
            });
        }
        Ok(out)
    }

    /// Free symbols of all instruction parameters.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for inst in &self.instructions {
            match &inst.kind {
                InstructionKind::Gate(g) => {
                    for p in g.parameters() {
                        out.extend(p.symbols());
                    }
                }
                InstructionKind::Box(op) => {
                    out.extend(op.free_symbols());
                }
            }
        }
        out
    }
}
