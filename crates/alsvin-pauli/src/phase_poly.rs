//! Phase-polynomial synthesis.
//!
//! A circuit over the {CX, Rz} fragment computes a diagonal unitary
//! described by a phase polynomial: a map from parity vectors (linear
//! combinations of input wires) to rotation angles. [`PhasePolyBox`]
//! extracts that polynomial by forward simulation of the linear layer and
//! re-synthesises one CX chain per term on lowering.

use rustc_hash::FxHashMap;
use std::any::Any;
use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use alsvin_ir::{
    BoxOperator, Circuit, InstructionKind, IrResult, ParameterExpression, QubitId, StandardGate,
};

use crate::error::{BoxError, BoxResult};

/// A diagonal circuit captured as a phase polynomial.
///
/// Construction requires the circuit's linear layer to reduce to the
/// identity; the gadget circuits produced after mutual diagonalisation
/// satisfy this by unwinding their own ladders.
#[derive(Debug, Clone)]
pub struct PhasePolyBox {
    id: Uuid,
    n_qubits: u32,
    /// Parity vector → accumulated angle, in first-seen order.
    terms: Vec<(Vec<bool>, ParameterExpression)>,
    circuit_cache: OnceCell<Circuit>,
}

impl PhasePolyBox {
    /// Extract the phase polynomial of a {CX, Rz} circuit.
    pub fn new(circuit: &Circuit) -> BoxResult<Self> {
        let n = circuit.num_qubits() as usize;
        let mut parity: Vec<Vec<bool>> = (0..n)
            .map(|i| (0..n).map(|j| i == j).collect())
            .collect();
        let mut terms: Vec<(Vec<bool>, ParameterExpression)> = vec![];

        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Gate(StandardGate::CX) => {
                    let c = inst.qubits[0].index();
                    let t = inst.qubits[1].index();
                    let source = parity[c].clone();
                    for (bit, s) in parity[t].iter_mut().zip(source) {
                        *bit ^= s;
                    }
                }
                InstructionKind::Gate(StandardGate::Rz(theta)) => {
                    let q = inst.qubits[0].index();
                    let term = parity[q].clone();
                    match terms.iter_mut().find(|(p, _)| *p == term) {
                        Some((_, angle)) => {
                            *angle = (angle.clone() + theta.clone()).simplify();
                        }
                        None => terms.push((term, theta.clone())),
                    }
                }
                _ => {
                    return Err(BoxError::UnsupportedGate {
                        gate: inst.name().to_string(),
                    });
                }
            }
        }

        for (i, row) in parity.iter().enumerate() {
            let is_unit = row.iter().enumerate().all(|(j, &b)| b == (i == j));
            if !is_unit {
                return Err(BoxError::InvalidPhasePolynomial(
                    "linear layer does not reduce to the identity".to_string(),
                ));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            n_qubits: circuit.num_qubits(),
            terms,
            circuit_cache: OnceCell::new(),
        })
    }

    fn from_terms(n_qubits: u32, terms: Vec<(Vec<bool>, ParameterExpression)>) -> Self {
        Self {
            id: Uuid::new_v4(),
            n_qubits,
            terms,
            circuit_cache: OnceCell::new(),
        }
    }

    /// The extracted terms, in first-seen order.
    pub fn terms(&self) -> &[(Vec<bool>, ParameterExpression)] {
        &self.terms
    }

    fn generate_circuit(&self) -> IrResult<Circuit> {
        let mut circ = Circuit::new(self.n_qubits);
        for (term, theta) in &self.terms {
            let support: Vec<QubitId> = term
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b)
                .map(|(i, _)| QubitId::from(i))
                .collect();
            if support.is_empty() {
                continue;
            }
            for w in support.windows(2) {
                circ.cx(w[0], w[1])?;
            }
            circ.rz(theta.clone(), support[support.len() - 1])?;
            for w in support.windows(2).rev() {
                circ.cx(w[0], w[1])?;
            }
        }
        Ok(circ)
    }
}

impl BoxOperator for PhasePolyBox {
    fn box_type(&self) -> &'static str {
        "PhasePolyBox"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn n_qubits(&self) -> usize {
        self.n_qubits as usize
    }

    fn is_clifford(&self) -> bool {
        self.terms.iter().all(|(_, theta)| theta.equiv_0(0.5))
    }

    fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for (_, theta) in &self.terms {
            out.extend(theta.symbols());
        }
        out
    }

    fn dagger(&self) -> IrResult<Arc<dyn BoxOperator>> {
        let terms = self
            .terms
            .iter()
            .map(|(p, theta)| (p.clone(), (-theta.clone()).simplify()))
            .collect();
        Ok(Arc::new(Self::from_terms(self.n_qubits, terms)))
    }

    fn transpose(&self) -> IrResult<Arc<dyn BoxOperator>> {
        // Diagonal operators are symmetric.
        Ok(Arc::new(Self::from_terms(self.n_qubits, self.terms.clone())))
    }

    fn symbol_substitution(
        &self,
        map: &FxHashMap<String, ParameterExpression>,
    ) -> IrResult<Arc<dyn BoxOperator>> {
        let terms = self
            .terms
            .iter()
            .map(|(p, theta)| (p.clone(), theta.substitute(map)))
            .collect();
        Ok(Arc::new(Self::from_terms(self.n_qubits, terms)))
    }

    fn is_equal(&self, other: &dyn BoxOperator) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        if self.id == other.id {
            return true;
        }
        self.n_qubits == other.n_qubits
            && self.terms.len() == other.terms.len()
            && self
                .terms
                .iter()
                .zip(&other.terms)
                .all(|((pa, ta), (pb, tb))| pa == pb && ta.equiv_mod(tb, 4.0))
    }

    fn to_circuit(&self) -> IrResult<Circuit> {
        if let Some(c) = self.circuit_cache.get() {
            return Ok(c.clone());
        }
        let c = self.generate_circuit()?;
        Ok(self.circuit_cache.get_or_init(|| c).clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
