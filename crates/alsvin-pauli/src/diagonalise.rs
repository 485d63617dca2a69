//! Mutual diagonalisation of commuting Pauli tensors.
//!
//! Produces a Clifford circuit `C` such that conjugating every input tensor
//! by `C` yields a string over {Z, I} only. The input tensors are rewritten
//! in place; conjugation signs are folded into the coefficients.
//!
//! The implementation works on a symplectic tableau: one x/z bit row per
//! gadget, columns indexed by qubit, with the standard conjugation updates
//! for H, S, CX and CZ. Because the tensors pairwise commute, reducing one
//! gadget to a single X letter forces every other gadget to hold I or X on
//! that column, so a final H clears the column for good; each round
//! therefore retires at least one column and the loop terminates.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::debug;

use alsvin_ir::{Circuit, IrError, IrResult, QubitId};

use crate::gadget::CXConfig;
use crate::pauli::Pauli;
use crate::tensor::SparsePauliTensor;

/// Per-gadget x/z rows over a fixed qubit column order, accumulating the
/// applied Clifford gates as a circuit.
struct Tableau {
    cols: Vec<QubitId>,
    x: Vec<Vec<bool>>,
    z: Vec<Vec<bool>>,
    sign: Vec<bool>,
    circ: Circuit,
}

impl Tableau {
    fn new(gadgets: &[SparsePauliTensor], qubits: &[QubitId]) -> IrResult<Self> {
        let cols = qubits.to_vec();
        let index: FxHashMap<QubitId, usize> =
            cols.iter().enumerate().map(|(i, &q)| (q, i)).collect();
        let width = cols.iter().map(|q| q.0 + 1).max().unwrap_or(0);

        let mut x = vec![vec![false; cols.len()]; gadgets.len()];
        let mut z = vec![vec![false; cols.len()]; gadgets.len()];
        for (r, gadget) in gadgets.iter().enumerate() {
            for (q, &p) in &gadget.string {
                let j = *index.get(q).ok_or(IrError::QubitNotFound {
                    qubit: *q,
                    width,
                })?;
                match p {
                    Pauli::X => x[r][j] = true,
                    Pauli::Z => z[r][j] = true,
                    Pauli::Y => {
                        x[r][j] = true;
                        z[r][j] = true;
                    }
                    Pauli::I => {}
                }
            }
        }
        Ok(Self {
            cols,
            x,
            z,
            sign: vec![false; gadgets.len()],
            circ: Circuit::new(width),
        })
    }

    fn rows(&self) -> usize {
        self.x.len()
    }

    /// Columns where row `r` has an X component, ascending.
    fn x_support(&self, r: usize) -> Vec<usize> {
        (0..self.cols.len()).filter(|&j| self.x[r][j]).collect()
    }

    fn h(&mut self, j: usize) -> IrResult<()> {
        for r in 0..self.rows() {
            self.sign[r] ^= self.x[r][j] && self.z[r][j];
            let tmp = self.x[r][j];
            self.x[r][j] = self.z[r][j];
            self.z[r][j] = tmp;
        }
        self.circ.h(self.cols[j])?;
        Ok(())
    }

    fn s(&mut self, j: usize) -> IrResult<()> {
        for r in 0..self.rows() {
            self.sign[r] ^= self.x[r][j] && self.z[r][j];
            self.z[r][j] ^= self.x[r][j];
        }
        self.circ.s(self.cols[j])?;
        Ok(())
    }

    fn cx(&mut self, c: usize, t: usize) -> IrResult<()> {
        for r in 0..self.rows() {
            self.sign[r] ^=
                self.x[r][c] && self.z[r][t] && (self.x[r][t] == self.z[r][c]);
            self.x[r][t] ^= self.x[r][c];
            self.z[r][c] ^= self.z[r][t];
        }
        self.circ.cx(self.cols[c], self.cols[t])?;
        Ok(())
    }

    fn cz(&mut self, a: usize, b: usize) -> IrResult<()> {
        for r in 0..self.rows() {
            self.sign[r] ^= self.x[r][a] && self.x[r][b] && !(self.z[r][a] && self.z[r][b]);
            self.z[r][a] ^= self.x[r][b];
            self.z[r][b] ^= self.x[r][a];
        }
        self.circ.cz(self.cols[a], self.cols[b])?;
        Ok(())
    }
}

/// CX pairs folding `support` down to its first column, shaped by `config`.
/// Each pair `(c, t)` clears the X component at `t`.
fn fold_shape(support: &[usize], config: CXConfig) -> Vec<(usize, usize)> {
    match config {
        CXConfig::Snake => (0..support.len() - 1)
            .rev()
            .map(|i| (support[i], support[i + 1]))
            .collect(),
        CXConfig::Star => support[1..]
            .iter()
            .map(|&j| (support[0], j))
            .collect(),
        CXConfig::Tree | CXConfig::MultiQGate => {
            let mut pairs = vec![];
            let mut layer = support.to_vec();
            while layer.len() > 1 {
                let mut next = Vec::with_capacity(layer.len().div_ceil(2));
                for chunk in layer.chunks(2) {
                    if let [a, b] = *chunk {
                        pairs.push((a, b));
                    }
                    next.push(chunk[0]);
                }
                layer = next;
            }
            pairs
        }
    }
}

/// Conjugate the commuting set to Z/I form.
///
/// Returns the Clifford circuit applied; `gadgets` is mutated in place to
/// the conjugated strings, with signs folded into the coefficients. Errors
/// if a gadget acts on a qubit outside `qubits`.
pub fn mutual_diagonalise(
    gadgets: &mut [SparsePauliTensor],
    qubits: &[QubitId],
    config: CXConfig,
) -> IrResult<Circuit> {
    let mut tab = Tableau::new(gadgets, qubits)?;
    debug!(
        gadgets = gadgets.len(),
        qubits = qubits.len(),
        "mutual diagonalisation"
    );

    // Single-qubit sweep: columns whose non-identity letters agree can be
    // rotated to Z without entanglement.
    for j in 0..tab.cols.len() {
        let mut any = false;
        let mut all_x = true;
        let mut all_y = true;
        for r in 0..tab.rows() {
            if !tab.x[r][j] && !tab.z[r][j] {
                continue;
            }
            any = true;
            all_x &= tab.x[r][j] && !tab.z[r][j];
            all_y &= tab.x[r][j] && tab.z[r][j];
        }
        if !any {
            continue;
        }
        if all_x {
            tab.h(j)?;
        } else if all_y {
            tab.s(j)?;
            tab.h(j)?;
        }
    }

    // Main loop: retire one column per round, so the column count bounds
    // the rounds. Only non-commuting input (rejected upstream) could fail
    // to converge.
    for _ in 0..tab.cols.len() {
        let Some(pivot_row) = (0..tab.rows())
            .filter(|&r| tab.x[r].iter().any(|&b| b))
            .min_by_key(|&r| tab.x_support(r).len())
        else {
            break;
        };

        // Normalise Y letters on the pivot row's X support to X.
        for j in tab.x_support(pivot_row) {
            if tab.z[pivot_row][j] {
                tab.s(j)?;
            }
        }

        // Fold the X support into the pivot column.
        let support = tab.x_support(pivot_row);
        let pivot = support[0];
        if support.len() > 1 {
            for (c, t) in fold_shape(&support, config) {
                tab.cx(c, t)?;
            }
        }

        // The fold may have re-introduced a Z component on the pivot.
        if tab.z[pivot_row][pivot] {
            tab.s(pivot)?;
        }

        // Clear residual Z letters of the pivot row, then rotate X to Z.
        for j in 0..tab.cols.len() {
            if j != pivot && tab.z[pivot_row][j] {
                tab.cz(pivot, j)?;
            }
        }
        tab.h(pivot)?;

        debug_assert!((0..tab.rows()).all(|r| !tab.x[r][pivot]));
    }

    if (0..tab.rows()).any(|r| tab.x[r].iter().any(|&b| b)) {
        return Err(IrError::UnsupportedOperation(
            "mutual diagonalisation requires pairwise-commuting tensors".to_string(),
        ));
    }

    // Write the diagonal strings back.
    for (r, gadget) in gadgets.iter_mut().enumerate() {
        let mut string = BTreeMap::new();
        for j in 0..tab.cols.len() {
            if tab.z[r][j] {
                string.insert(tab.cols[j], Pauli::Z);
            }
        }
        gadget.string = string;
        if tab.sign[r] {
            gadget.coeff = (-gadget.coeff.clone()).simplify();
        }
    }

    Ok(tab.circ)
}
