//! Gate-level synthesis of single Pauli exponentials.
//!
//! A gadget rotates every non-identity letter onto the Z axis, folds the
//! support parity into a carrier qubit with a CX ladder, applies the
//! rotation core, and unwinds. The ladder shape is configurable and does
//! not affect the implemented unitary.

use serde::{Deserialize, Serialize};

use alsvin_ir::{Circuit, IrResult, ParameterExpression, QubitId};

use crate::pauli::Pauli;
use crate::tensor::SparsePauliTensor;

/// Entanglement pattern for the parity ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CXConfig {
    /// Linear CX chain along the support.
    Snake,
    /// Balanced pairwise fold.
    #[default]
    Tree,
    /// Fan-in of every support qubit onto the carrier.
    Star,
    /// Pairwise fold down to two carriers, finished with the native ZZ
    /// interaction.
    MultiQGate,
}

/// Synthesise the circuit implementing `exp(−i·π·t/2 · P)` for a sparse
/// tensor `P` over a circuit of width `n`. Gates touch only the support;
/// an empty support yields the empty circuit (global phase is not
/// modelled).
pub fn pauli_gadget(n: u32, tensor: &SparsePauliTensor, config: CXConfig) -> IrResult<Circuit> {
    let mut circ = Circuit::new(n);
    let support: Vec<QubitId> = tensor.string.keys().copied().collect();
    if support.is_empty() {
        return Ok(circ);
    }
    basis_change(&mut circ, tensor, false)?;
    synth_core(
        &mut circ,
        &support,
        std::slice::from_ref(&tensor.coeff),
        config,
    )?;
    basis_change(&mut circ, tensor, true)?;
    Ok(circ)
}

/// Synthesise the circuit implementing `U₁·U₀` for an ordered pair of
/// sparse tensors. When the strings coincide the basis changes and ladder
/// are shared and both rotations sit inside a single ladder; otherwise the
/// gadgets are emitted sequentially.
pub fn pauli_gadget_pair(
    n: u32,
    tensor0: &SparsePauliTensor,
    tensor1: &SparsePauliTensor,
    config: CXConfig,
) -> IrResult<Circuit> {
    let mut circ = Circuit::new(n);
    if tensor0.string == tensor1.string && !tensor0.string.is_empty() {
        let support: Vec<QubitId> = tensor0.string.keys().copied().collect();
        let rotations = [tensor0.coeff.clone(), tensor1.coeff.clone()];
        basis_change(&mut circ, tensor0, false)?;
        synth_core(&mut circ, &support, &rotations, config)?;
        basis_change(&mut circ, tensor0, true)?;
    } else {
        circ.append(pauli_gadget(n, tensor0, config)?)?;
        circ.append(pauli_gadget(n, tensor1, config)?)?;
    }
    Ok(circ)
}

/// Rotate X/Y letters onto the Z axis (or back, for the unwind).
fn basis_change(circ: &mut Circuit, tensor: &SparsePauliTensor, undo: bool) -> IrResult<()> {
    for (&q, &p) in &tensor.string {
        match p {
            Pauli::X => {
                circ.h(q)?;
            }
            Pauli::Y if !undo => {
                circ.sx(q)?;
            }
            Pauli::Y => {
                circ.sxdg(q)?;
            }
            Pauli::Z | Pauli::I => {}
        }
    }
    Ok(())
}

/// Apply the parity ladder, the rotation core (one Rz or RZZ per entry of
/// `rotations`), and the mirror-image unwind.
fn synth_core(
    circ: &mut Circuit,
    support: &[QubitId],
    rotations: &[ParameterExpression],
    config: CXConfig,
) -> IrResult<()> {
    if support.len() == 1 {
        for theta in rotations {
            circ.rz(theta.clone(), support[0])?;
        }
        return Ok(());
    }

    let ladder = match config {
        CXConfig::Snake => support
            .windows(2)
            .map(|w| (w[0], w[1]))
            .collect::<Vec<_>>(),
        CXConfig::Star => {
            let carrier = support[support.len() - 1];
            support[..support.len() - 1]
                .iter()
                .map(|&q| (q, carrier))
                .collect()
        }
        CXConfig::Tree => fold_pairs(support, 1),
        CXConfig::MultiQGate => fold_pairs(support, 2),
    };

    for &(c, t) in &ladder {
        circ.cx(c, t)?;
    }

    match config {
        CXConfig::MultiQGate => {
            // Two carriers remain; the ZZ interaction closes the parity.
            let (a, b) = remaining_pair(support, &ladder);
            for theta in rotations {
                circ.rzz(theta.clone(), a, b)?;
            }
        }
        _ => {
            let carrier = ladder.last().map_or(support[0], |&(_, t)| t);
            for theta in rotations {
                circ.rz(theta.clone(), carrier)?;
            }
        }
    }

    for &(c, t) in ladder.iter().rev() {
        circ.cx(c, t)?;
    }
    Ok(())
}

/// Pairwise fold of `layer` down to `stop` carriers; returns the CX pairs
/// in application order. Each pair `(a, b)` folds `a`'s parity into `b`.
fn fold_pairs(layer: &[QubitId], stop: usize) -> Vec<(QubitId, QubitId)> {
    let mut pairs = vec![];
    let mut layer = layer.to_vec();
    while layer.len() > stop {
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        for chunk in layer.chunks(2) {
            if let [a, b] = *chunk {
                pairs.push((a, b));
                next.push(b);
            } else {
                next.push(chunk[0]);
            }
        }
        layer = next;
    }
    pairs
}

/// The two carriers left over after a fold to `stop = 2`.
fn remaining_pair(support: &[QubitId], ladder: &[(QubitId, QubitId)]) -> (QubitId, QubitId) {
    let folded: Vec<QubitId> = support
        .iter()
        .copied()
        .filter(|q| !ladder.iter().any(|&(a, _)| a == *q))
        .collect();
    debug_assert_eq!(folded.len(), 2);
    (folded[0], folded[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvin_ir::ParameterExpression;

    fn sparse(entries: &[(u32, Pauli)], coeff: f64) -> SparsePauliTensor {
        SparsePauliTensor::new(
            entries.iter().map(|&(q, p)| (QubitId(q), p)),
            ParameterExpression::constant(coeff),
        )
    }

    fn names(circ: &Circuit) -> Vec<&'static str> {
        circ.instructions().iter().map(|i| i.name()).collect()
    }

    #[test]
    fn test_empty_gadget() {
        let t = sparse(&[], 0.5);
        let circ = pauli_gadget(3, &t, CXConfig::Snake).unwrap();
        assert!(circ.is_empty());
        assert_eq!(circ.num_qubits(), 3);
    }

    #[test]
    fn test_single_qubit_gadget() {
        let t = sparse(&[(1, Pauli::X)], 0.25);
        let circ = pauli_gadget(3, &t, CXConfig::Tree).unwrap();
        assert_eq!(names(&circ), vec!["h", "rz", "h"]);
    }

    #[test]
    fn test_snake_gadget_shape() {
        let t = sparse(&[(0, Pauli::X), (1, Pauli::Y), (2, Pauli::Z)], 0.25);
        let circ = pauli_gadget(3, &t, CXConfig::Snake).unwrap();
        assert_eq!(
            names(&circ),
            vec!["h", "sx", "cx", "cx", "rz", "cx", "cx", "sxdg", "h"]
        );
    }

    #[test]
    fn test_star_gadget_shape() {
        let t = sparse(&[(0, Pauli::Z), (1, Pauli::Z), (2, Pauli::Z)], 0.25);
        let circ = pauli_gadget(3, &t, CXConfig::Star).unwrap();
        // No basis changes; two fan-in CXs either side of the rotation.
        assert_eq!(names(&circ), vec!["cx", "cx", "rz", "cx", "cx"]);
        assert_eq!(circ.instructions()[2].qubits, vec![QubitId(2)]);
    }

    #[test]
    fn test_tree_gadget_shape() {
        let t = sparse(
            &[(0, Pauli::Z), (1, Pauli::Z), (2, Pauli::Z), (3, Pauli::Z)],
            0.5,
        );
        let circ = pauli_gadget(4, &t, CXConfig::Tree).unwrap();
        // Fold: (0,1) (2,3) then (1,3); rotation on q3.
        assert_eq!(names(&circ), vec!["cx", "cx", "cx", "rz", "cx", "cx", "cx"]);
        assert_eq!(circ.instructions()[3].qubits, vec![QubitId(3)]);
    }

    #[test]
    fn test_multiqgate_uses_zz_interaction() {
        let t = sparse(&[(0, Pauli::Z), (1, Pauli::Z), (2, Pauli::Z)], 0.25);
        let circ = pauli_gadget(3, &t, CXConfig::MultiQGate).unwrap();
        assert_eq!(names(&circ), vec!["cx", "rzz", "cx"]);
    }

    #[test]
    fn test_pair_shares_ladder_for_identical_strings() {
        let t0 = sparse(&[(0, Pauli::Z), (1, Pauli::Z)], 0.25);
        let t1 = sparse(&[(0, Pauli::Z), (1, Pauli::Z)], 0.5);
        let circ = pauli_gadget_pair(2, &t0, &t1, CXConfig::Snake).unwrap();
        assert_eq!(names(&circ), vec!["cx", "rz", "rz", "cx"]);
    }

    #[test]
    fn test_pair_sequential_for_distinct_strings() {
        let t0 = sparse(&[(0, Pauli::X)], 0.25);
        let t1 = sparse(&[(0, Pauli::Z)], 0.5);
        let circ = pauli_gadget_pair(1, &t0, &t1, CXConfig::Snake).unwrap();
        assert_eq!(names(&circ), vec!["h", "rz", "h", "rz"]);
    }
}
