//! Pauli-exponential box operators.
//!
//! Three variants: a single exponential, an ordered pair, and a mutually
//! commuting set. Each is a [`BoxOperator`] with lazy lowering through the
//! gadget synthesiser; the commuting set additionally routes through mutual
//! diagonalisation and phase-polynomial synthesis.
//!
//! Equality between boxes is taken modulo 4 on the coefficients:
//! `exp(−i·π·t/2 · P)` is 4-periodic in `t` for any Pauli string `P`.

use rustc_hash::FxHashMap;
use std::any::Any;
use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use alsvin_ir::{BoxOperator, Circuit, IrResult, ParameterExpression, QubitId};

use crate::conjugation::ConjugationBox;
use crate::diagonalise::mutual_diagonalise;
use crate::error::{BoxError, BoxResult};
use crate::gadget::{pauli_gadget, pauli_gadget_pair, CXConfig};
use crate::pauli::Pauli;
use crate::phase_poly::PhasePolyBox;
use crate::tensor::{PauliTensor, SparsePauliTensor};

/// A Pauli exponential is Clifford iff its angle is a multiple of one half
/// turn, or its string is trivial.
fn tensor_is_clifford(tensor: &PauliTensor) -> bool {
    tensor.coeff.equiv_0(0.5) || tensor.is_trivial()
}

// =============================================================================
// PauliExpBox
// =============================================================================

/// The unitary `exp(−i·π·t/2 · σ₀⊗σ₁⊗…)` for Paulis `σᵢ` and angle `t` in
/// half-turns.
#[derive(Debug, Clone)]
pub struct PauliExpBox {
    id: Uuid,
    paulis: PauliTensor,
    cx_config: CXConfig,
    circuit_cache: OnceCell<Circuit>,
}

impl PauliExpBox {
    /// Create a box over the given tensor.
    pub fn new(paulis: PauliTensor, cx_config: CXConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            paulis,
            cx_config,
            circuit_cache: OnceCell::new(),
        }
    }

    pub(crate) fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    /// The Pauli string.
    pub fn paulis(&self) -> &[Pauli] {
        &self.paulis.string
    }

    /// The phase parameter in half-turns.
    pub fn phase(&self) -> &ParameterExpression {
        &self.paulis.coeff
    }

    /// The entanglement pattern used on lowering.
    pub fn cx_config(&self) -> CXConfig {
        self.cx_config
    }

    fn generate_circuit(&self) -> IrResult<Circuit> {
        // The gadget only touches the support; appending it to a blank
        // circuit of full width fixes the lowered size.
        let n = self.paulis.size() as u32;
        let mut circ = Circuit::new(n);
        circ.append(pauli_gadget(n, &self.paulis.to_sparse(), self.cx_config)?)?;
        Ok(circ)
    }
}

impl Default for PauliExpBox {
    fn default() -> Self {
        Self::new(PauliTensor::new(vec![], 0.0), CXConfig::default())
    }
}

impl BoxOperator for PauliExpBox {
    fn box_type(&self) -> &'static str {
        "PauliExpBox"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn n_qubits(&self) -> usize {
        self.paulis.size()
    }

    fn is_clifford(&self) -> bool {
        tensor_is_clifford(&self.paulis)
    }

    fn free_symbols(&self) -> BTreeSet<String> {
        self.paulis.free_symbols()
    }

    fn dagger(&self) -> IrResult<Arc<dyn BoxOperator>> {
        Ok(Arc::new(Self::new(self.paulis.dagger(), self.cx_config)))
    }

    fn transpose(&self) -> IrResult<Arc<dyn BoxOperator>> {
        let mut tr = self.paulis.clone();
        tr.transpose();
        Ok(Arc::new(Self::new(tr, self.cx_config)))
    }

    fn symbol_substitution(
        &self,
        map: &FxHashMap<String, ParameterExpression>,
    ) -> IrResult<Arc<dyn BoxOperator>> {
        Ok(Arc::new(Self::new(
            self.paulis.symbol_substitution(map),
            self.cx_config,
        )))
    }

    fn is_equal(&self, other: &dyn BoxOperator) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        if self.id == other.id {
            return true;
        }
        self.cx_config == other.cx_config && self.paulis.equiv_mod(&other.paulis, 4)
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

// =============================================================================
// PauliExpPairBox
// =============================================================================

/// The ordered product `U₁·U₀` of two Pauli exponentials. The exponentials
/// need not commute, so the order is semantic.
#[derive(Debug, Clone)]
pub struct PauliExpPairBox {
    id: Uuid,
    paulis0: PauliTensor,
    paulis1: PauliTensor,
    cx_config: CXConfig,
    circuit_cache: OnceCell<Circuit>,
}

impl PauliExpPairBox {
    /// Create a pair box. The strings must have the same length.
    pub fn new(
        paulis0: PauliTensor,
        paulis1: PauliTensor,
        cx_config: CXConfig,
    ) -> BoxResult<Self> {
        if paulis0.size() != paulis1.size() {
            return Err(BoxError::InvalidPauliExp(
                "Pauli strings within a pair must be of the same length (pad with identities \
                 if necessary)"
                    .to_string(),
            ));
        }
        Ok(Self::unchecked(paulis0, paulis1, cx_config, Uuid::new_v4()))
    }

    pub(crate) fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    pub(crate) fn unchecked(
        paulis0: PauliTensor,
        paulis1: PauliTensor,
        cx_config: CXConfig,
        id: Uuid,
    ) -> Self {
        Self {
            id,
            paulis0,
            paulis1,
            cx_config,
            circuit_cache: OnceCell::new(),
        }
    }

    /// The two Pauli strings, in application order.
    pub fn paulis_pair(&self) -> (&[Pauli], &[Pauli]) {
        (&self.paulis0.string, &self.paulis1.string)
    }

    /// The two phase parameters, in application order.
    pub fn phase_pair(&self) -> (&ParameterExpression, &ParameterExpression) {
        (&self.paulis0.coeff, &self.paulis1.coeff)
    }

    /// The entanglement pattern used on lowering.
    pub fn cx_config(&self) -> CXConfig {
        self.cx_config
    }

    fn generate_circuit(&self) -> IrResult<Circuit> {
        let n = self.paulis0.size() as u32;
        let mut circ = Circuit::new(n);
        circ.append(pauli_gadget_pair(
            n,
            &self.paulis0.to_sparse(),
            &self.paulis1.to_sparse(),
            self.cx_config,
        )?)?;
        Ok(circ)
    }
}

impl Default for PauliExpPairBox {
    fn default() -> Self {
        Self::unchecked(
            PauliTensor::new(vec![], 0.0),
            PauliTensor::new(vec![], 0.0),
            CXConfig::default(),
            Uuid::new_v4(),
        )
    }
}

impl BoxOperator for PauliExpPairBox {
    fn box_type(&self) -> &'static str {
        "PauliExpPairBox"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn n_qubits(&self) -> usize {
        self.paulis0.size()
    }

    fn is_clifford(&self) -> bool {
        tensor_is_clifford(&self.paulis0) && tensor_is_clifford(&self.paulis1)
    }

    fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = self.paulis0.free_symbols();
        out.extend(self.paulis1.free_symbols());
        out
    }

    fn dagger(&self) -> IrResult<Arc<dyn BoxOperator>> {
        // The adjoint of a product reverses the order.
        Ok(Arc::new(Self::unchecked(
            self.paulis1.dagger(),
            self.paulis0.dagger(),
            self.cx_config,
            Uuid::new_v4(),
        )))
    }

    fn transpose(&self) -> IrResult<Arc<dyn BoxOperator>> {
        let mut tr0 = self.paulis0.clone();
        tr0.transpose();
        let mut tr1 = self.paulis1.clone();
        tr1.transpose();
        Ok(Arc::new(Self::unchecked(
            tr1,
            tr0,
            self.cx_config,
            Uuid::new_v4(),
        )))
    }

    fn symbol_substitution(
        &self,
        map: &FxHashMap<String, ParameterExpression>,
    ) -> IrResult<Arc<dyn BoxOperator>> {
        Ok(Arc::new(Self::unchecked(
            self.paulis0.symbol_substitution(map),
            self.paulis1.symbol_substitution(map),
            self.cx_config,
            Uuid::new_v4(),
        )))
    }

    fn is_equal(&self, other: &dyn BoxOperator) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        if self.id == other.id {
            return true;
        }
        self.cx_config == other.cx_config
            && self.paulis0.equiv_mod(&other.paulis0, 4)
            && self.paulis1.equiv_mod(&other.paulis1, 4)
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

// =============================================================================
// PauliExpCommutingSetBox
// =============================================================================

/// The product of `m` pairwise-commuting Pauli exponentials. The product
/// order does not affect the unitary but does affect the synthesised
/// circuit.
#[derive(Debug, Clone)]
pub struct PauliExpCommutingSetBox {
    id: Uuid,
    pauli_gadgets: Vec<PauliTensor>,
    cx_config: CXConfig,
    circuit_cache: OnceCell<Circuit>,
}

impl PauliExpCommutingSetBox {
    /// Create a commuting-set box. Rejects an empty list, ragged string
    /// lengths, and non-commuting tensors.
    pub fn new(pauli_gadgets: Vec<PauliTensor>, cx_config: CXConfig) -> BoxResult<Self> {
        let Some(first) = pauli_gadgets.first() else {
            return Err(BoxError::InvalidPauliExp(
                "a commuting set requires at least one Pauli string".to_string(),
            ));
        };
        let n_qubits = first.size();
        if pauli_gadgets.iter().any(|g| g.size() != n_qubits) {
            return Err(BoxError::InvalidPauliExp(
                "Pauli strings within a commuting set must all be the same length".to_string(),
            ));
        }
        if !paulis_commute(&pauli_gadgets) {
            return Err(BoxError::InvalidPauliExp(
                "Pauli strings within a commuting set must all commute".to_string(),
            ));
        }
        Ok(Self::unchecked(pauli_gadgets, cx_config, Uuid::new_v4()))
    }

    pub(crate) fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    pub(crate) fn unchecked(
        pauli_gadgets: Vec<PauliTensor>,
        cx_config: CXConfig,
        id: Uuid,
    ) -> Self {
        Self {
            id,
            pauli_gadgets,
            cx_config,
            circuit_cache: OnceCell::new(),
        }
    }

    /// The stored gadgets, in product order.
    pub fn pauli_gadgets(&self) -> &[PauliTensor] {
        &self.pauli_gadgets
    }

    /// The entanglement pattern used on lowering.
    pub fn cx_config(&self) -> CXConfig {
        self.cx_config
    }

    fn generate_circuit(&self) -> IrResult<Circuit> {
        let n = self.pauli_gadgets[0].size() as u32;
        let mut circ = Circuit::new(n);
        let qubits: Vec<QubitId> = (0..n).map(QubitId).collect();
        debug!(
            gadgets = self.pauli_gadgets.len(),
            qubits = n,
            "lowering commuting-set box"
        );

        let mut gadgets: Vec<SparsePauliTensor> = self
            .pauli_gadgets
            .iter()
            .map(PauliTensor::to_sparse)
            .collect();
        let cliff_circ = mutual_diagonalise(&mut gadgets, &qubits, self.cx_config)?;

        // The conjugated gadgets are Z/I-only; their Snake gadgets land in
        // the {CX, Rz} fragment the phase-polynomial synthesiser accepts.
        let mut phase_poly_circ = Circuit::new(n);
        for gadget in &gadgets {
            phase_poly_circ.append(pauli_gadget(n, gadget, CXConfig::Snake)?)?;
        }
        phase_poly_circ.decompose_boxes_recursively()?;
        let ppbox = PhasePolyBox::new(&phase_poly_circ).map_err(alsvin_ir::IrError::from)?;
        let body = ppbox.to_circuit()?;

        let conj = ConjugationBox::new(cliff_circ, body)?;
        let all = circ.all_qubits();
        circ.add_box(Arc::new(conj), all)?;
        Ok(circ)
    }
}

impl Default for PauliExpCommutingSetBox {
    fn default() -> Self {
        Self::unchecked(
            vec![PauliTensor::new(vec![], 0.0)],
            CXConfig::default(),
            Uuid::new_v4(),
        )
    }
}

/// Pairwise commutation over a gadget list.
fn paulis_commute(gadgets: &[PauliTensor]) -> bool {
    gadgets.iter().enumerate().all(|(i, a)| {
        gadgets[i + 1..].iter().all(|b| a.commutes_with(b))
    })
}

impl BoxOperator for PauliExpCommutingSetBox {
    fn box_type(&self) -> &'static str {
        "PauliExpCommutingSetBox"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn n_qubits(&self) -> usize {
        self.pauli_gadgets[0].size()
    }

    fn is_clifford(&self) -> bool {
        self.pauli_gadgets.iter().all(tensor_is_clifford)
    }

    fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for gadget in &self.pauli_gadgets {
            out.extend(gadget.free_symbols());
        }
        out
    }

    fn dagger(&self) -> IrResult<Arc<dyn BoxOperator>> {
        // Order is preserved: the exponentials commute.
        let daggered = self.pauli_gadgets.iter().map(PauliTensor::dagger).collect();
        Ok(Arc::new(Self::unchecked(
            daggered,
            self.cx_config,
            Uuid::new_v4(),
        )))
    }

    fn transpose(&self) -> IrResult<Arc<dyn BoxOperator>> {
        let transposed = self
            .pauli_gadgets
            .iter()
            .map(|g| {
                let mut tr = g.clone();
                tr.transpose();
                tr
            })
            .collect();
        Ok(Arc::new(Self::unchecked(
            transposed,
            self.cx_config,
            Uuid::new_v4(),
        )))
    }

    fn symbol_substitution(
        &self,
        map: &FxHashMap<String, ParameterExpression>,
    ) -> IrResult<Arc<dyn BoxOperator>> {
        let substituted = self
            .pauli_gadgets
            .iter()
            .map(|g| g.symbol_substitution(map))
            .collect();
        Ok(Arc::new(Self::unchecked(
            substituted,
            self.cx_config,
            Uuid::new_v4(),
        )))
    }

    fn is_equal(&self, other: &dyn BoxOperator) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        if self.id == other.id {
            return true;
        }
        self.cx_config == other.cx_config
            && self.pauli_gadgets.len() == other.pauli_gadgets.len()
            && self
                .pauli_gadgets
                .iter()
                .zip(&other.pauli_gadgets)
                .all(|(a, b)| a.equiv_mod(b, 4))
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

// =============================================================================
// Sparse append helpers
// =============================================================================

/// Wrap a sparse gadget as a [`PauliExpBox`] over its support and append it.
pub fn append_single_pauli_gadget_as_box(
    circ: &mut Circuit,
    pauli: &SparsePauliTensor,
    cx_config: CXConfig,
) -> BoxResult<()> {
    let mut string = vec![];
    let mut mapping = vec![];
    for (&q, &p) in &pauli.string {
        mapping.push(q);
        string.push(p);
    }
    let boxed = PauliExpBox::new(PauliTensor::new(string, pauli.coeff.clone()), cx_config);
    circ.add_box(Arc::new(boxed), mapping)?;
    Ok(())
}

/// Wrap two sparse gadgets as a [`PauliExpPairBox`] over the union of their
/// supports and append it. Qubits of `pauli0` come first, then the
/// remainder of `pauli1`, in qubit order.
pub fn append_pauli_gadget_pair_as_box(
    circ: &mut Circuit,
    pauli0: &SparsePauliTensor,
    pauli1: &SparsePauliTensor,
    cx_config: CXConfig,
) -> BoxResult<()> {
    let mut mapping = vec![];
    let mut letters0 = vec![];
    let mut letters1 = vec![];
    let mut p1map: BTreeMap<QubitId, Pauli> = pauli1.string.clone();
    for (&q, &p) in &pauli0.string {
        mapping.push(q);
        letters0.push(p);
        letters1.push(p1map.remove(&q).unwrap_or(Pauli::I));
    }
    for (q, p) in p1map {
        mapping.push(q);
        letters1.push(p);
        letters0.push(Pauli::I);
    }
    let boxed = PauliExpPairBox::new(
        PauliTensor::new(letters0, pauli0.coeff.clone()),
        PauliTensor::new(letters1, pauli1.coeff.clone()),
        cx_config,
    )?;
    circ.add_box(Arc::new(boxed), mapping)?;
    Ok(())
}

/// Wrap a commuting set of sparse gadgets as a [`PauliExpCommutingSetBox`]
/// over the sorted union of their supports and append it.
pub fn append_commuting_pauli_gadget_set_as_box(
    circ: &mut Circuit,
    gadgets: &[SparsePauliTensor],
    cx_config: CXConfig,
) -> BoxResult<()> {
    let mut all_qubits = BTreeSet::new();
    for gadget in gadgets {
        all_qubits.extend(gadget.string.keys().copied());
    }
    let mapping: Vec<QubitId> = all_qubits.into_iter().collect();

    let dense: Vec<PauliTensor> = gadgets
        .iter()
        .map(|g| {
            PauliTensor::new(
                mapping.iter().map(|&q| g.get(q)).collect(),
                g.coeff.clone(),
            )
        })
        .collect();

    let boxed = PauliExpCommutingSetBox::new(dense, cx_config)?;
    circ.add_box(Arc::new(boxed), mapping)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor(letters: &[Pauli], coeff: f64) -> PauliTensor {
        PauliTensor::new(letters.to_vec(), coeff)
    }

    // Scenario S1: a half-turn ZZ exponential is Clifford, and stays
    // Clifford under dagger.
    #[test]
    fn test_trivial_clifford() {
        let boxed = PauliExpBox::new(tensor(&[Pauli::Z, Pauli::Z], 0.5), CXConfig::Tree);
        assert!(boxed.is_clifford());

        let dag = boxed.dagger().unwrap();
        let dag = dag.as_any().downcast_ref::<PauliExpBox>().unwrap();
        assert_eq!(dag.phase().clone().simplify().as_f64(), Some(-0.5));
        assert!(dag.is_clifford());
    }

    #[test]
    fn test_quarter_turn_is_not_clifford() {
        let boxed = PauliExpBox::new(tensor(&[Pauli::Z], 0.25), CXConfig::Tree);
        assert!(!boxed.is_clifford());
    }

    #[test]
    fn test_empty_string_is_clifford() {
        let boxed = PauliExpBox::new(tensor(&[], 0.3), CXConfig::Tree);
        assert!(boxed.is_clifford());
        assert!(PauliExpBox::default().is_clifford());
    }

    #[test]
    fn test_dagger_involution() {
        let boxed = PauliExpBox::new(
            PauliTensor::new(
                vec![Pauli::X, Pauli::Y],
                ParameterExpression::symbol("t"),
            ),
            CXConfig::Star,
        );
        let twice = boxed.dagger().unwrap().dagger().unwrap();
        assert!(twice.is_equal(&boxed));
        assert!(boxed.is_equal(twice.as_ref()));
    }

    #[test]
    fn test_transpose_involution() {
        let boxed = PauliExpBox::new(tensor(&[Pauli::Y, Pauli::Z], 0.3), CXConfig::Tree);
        let twice = boxed.transpose().unwrap().transpose().unwrap();
        assert!(twice.is_equal(&boxed));
    }

    #[test]
    fn test_is_equal_mod_4() {
        let a = PauliExpBox::new(tensor(&[Pauli::X], 0.25), CXConfig::Tree);
        let b = PauliExpBox::new(tensor(&[Pauli::X], 4.25), CXConfig::Tree);
        let c = PauliExpBox::new(tensor(&[Pauli::X], 2.25), CXConfig::Tree);
        let d = PauliExpBox::new(tensor(&[Pauli::X], 0.25), CXConfig::Snake);
        assert!(a.is_equal(&b));
        assert!(!a.is_equal(&c));
        assert!(!a.is_equal(&d));
    }

    #[test]
    fn test_symbol_substitution() {
        let boxed = PauliExpBox::new(
            PauliTensor::new(vec![Pauli::Z], ParameterExpression::symbol("t")),
            CXConfig::Tree,
        );
        let mut map = FxHashMap::default();
        map.insert("t".to_string(), ParameterExpression::constant(0.5));
        let bound = boxed.symbol_substitution(&map).unwrap();
        assert!(bound.free_symbols().is_empty());
        assert!(bound.is_clifford());
    }

    #[test]
    fn test_lowering_is_cached() {
        let boxed = PauliExpBox::new(tensor(&[Pauli::X, Pauli::Z], 0.25), CXConfig::Snake);
        let first = boxed.to_circuit().unwrap();
        let second = boxed.to_circuit().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.num_qubits(), 2);
        assert!(!first.is_empty());
    }

    // Scenario S2: pair dagger reverses the pair and negates both angles.
    #[test]
    fn test_pair_dagger_reverses() {
        let p0 = tensor(&[Pauli::X, Pauli::Y, Pauli::I], 0.25);
        let p1 = tensor(&[Pauli::Y, Pauli::Y, Pauli::I], 0.5);
        let pair = PauliExpPairBox::new(p0, p1, CXConfig::Tree).unwrap();

        let dag = pair.dagger().unwrap();
        let dag = dag.as_any().downcast_ref::<PauliExpPairBox>().unwrap();
        let (s0, s1) = dag.paulis_pair();
        assert_eq!(s0, &[Pauli::Y, Pauli::Y, Pauli::I]);
        assert_eq!(s1, &[Pauli::X, Pauli::Y, Pauli::I]);
        let (t0, t1) = dag.phase_pair();
        assert_eq!(t0.clone().simplify().as_f64(), Some(-0.5));
        assert_eq!(t1.clone().simplify().as_f64(), Some(-0.25));
    }

    #[test]
    fn test_pair_dagger_involution() {
        let pair = PauliExpPairBox::new(
            tensor(&[Pauli::X, Pauli::I], 0.25),
            tensor(&[Pauli::Z, Pauli::Z], 0.5),
            CXConfig::Tree,
        )
        .unwrap();
        let twice = pair.dagger().unwrap().dagger().unwrap();
        assert!(twice.is_equal(&pair));
    }

    #[test]
    fn test_pair_transpose_involution() {
        let pair = PauliExpPairBox::new(
            tensor(&[Pauli::Y, Pauli::I], 0.25),
            tensor(&[Pauli::Y, Pauli::Y], 0.5),
            CXConfig::Tree,
        )
        .unwrap();
        let twice = pair.transpose().unwrap().transpose().unwrap();
        assert!(twice.is_equal(&pair));
    }

    #[test]
    fn test_pair_length_mismatch() {
        let result = PauliExpPairBox::new(
            tensor(&[Pauli::X], 0.25),
            tensor(&[Pauli::X, Pauli::Z], 0.5),
            CXConfig::Tree,
        );
        assert!(matches!(result, Err(BoxError::InvalidPauliExp(_))));
    }

    // Scenario S3: a single-qubit X and Z anticommute and must be rejected.
    #[test]
    fn test_commuting_set_rejects_anticommuting_pair() {
        let result = PauliExpCommutingSetBox::new(
            vec![tensor(&[Pauli::X], 0.1), tensor(&[Pauli::Z], 0.1)],
            CXConfig::Tree,
        );
        assert!(matches!(result, Err(BoxError::InvalidPauliExp(_))));
    }

    #[test]
    fn test_commuting_set_accepts_even_parity() {
        // [X, Z] and [Z, X] differ in both positions: even parity, commute.
        let result = PauliExpCommutingSetBox::new(
            vec![
                tensor(&[Pauli::X, Pauli::Z], 0.1),
                tensor(&[Pauli::Z, Pauli::X], 0.1),
            ],
            CXConfig::Tree,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_commuting_set_rejects_empty() {
        let result = PauliExpCommutingSetBox::new(vec![], CXConfig::Tree);
        assert!(matches!(result, Err(BoxError::InvalidPauliExp(_))));
    }

    #[test]
    fn test_commuting_set_rejects_ragged_lengths() {
        let result = PauliExpCommutingSetBox::new(
            vec![tensor(&[Pauli::Z], 0.1), tensor(&[Pauli::Z, Pauli::Z], 0.1)],
            CXConfig::Tree,
        );
        assert!(matches!(result, Err(BoxError::InvalidPauliExp(_))));
    }

    #[test]
    fn test_commuting_set_dagger_preserves_order() {
        let set = PauliExpCommutingSetBox::new(
            vec![
                tensor(&[Pauli::Z, Pauli::I], 0.25),
                tensor(&[Pauli::I, Pauli::Z], 0.5),
            ],
            CXConfig::Tree,
        )
        .unwrap();
        let dag = set.dagger().unwrap();
        let dag = dag
            .as_any()
            .downcast_ref::<PauliExpCommutingSetBox>()
            .unwrap();
        assert_eq!(dag.pauli_gadgets()[0].string, vec![Pauli::Z, Pauli::I]);
        assert_eq!(
            dag.pauli_gadgets()[0].coeff.clone().simplify().as_f64(),
            Some(-0.25)
        );
        assert!(dag.dagger().unwrap().is_equal(&set));
    }

    #[test]
    fn test_commuting_set_lowering_wraps_conjugation() {
        let set = PauliExpCommutingSetBox::new(
            vec![
                tensor(&[Pauli::X, Pauli::X], 0.25),
                tensor(&[Pauli::Y, Pauli::Y], 0.5),
            ],
            CXConfig::Tree,
        )
        .unwrap();
        let circ = set.to_circuit().unwrap();
        assert_eq!(circ.num_qubits(), 2);
        assert_eq!(circ.num_ops(), 1);
        assert_eq!(circ.instructions()[0].name(), "ConjugationBox");

        // Fully flattened, only plain gates remain.
        let mut flat = circ.clone();
        flat.decompose_boxes_recursively().unwrap();
        assert!(flat.instructions().iter().all(|i| !i.is_box()));
        assert!(!flat.is_empty());
    }

    #[test]
    fn test_append_single_gadget_as_box() {
        let mut circ = Circuit::new(4);
        let sparse = SparsePauliTensor::new(
            [(QubitId(1), Pauli::X), (QubitId(3), Pauli::Z)],
            ParameterExpression::constant(0.25),
        );
        append_single_pauli_gadget_as_box(&mut circ, &sparse, CXConfig::Tree).unwrap();
        assert_eq!(circ.num_ops(), 1);
        assert_eq!(circ.instructions()[0].qubits, vec![QubitId(1), QubitId(3)]);
    }

    #[test]
    fn test_append_pair_as_box_union_support() {
        let mut circ = Circuit::new(4);
        let p0 = SparsePauliTensor::new([(QubitId(0), Pauli::X)], 0.25);
        let p1 = SparsePauliTensor::new(
            [(QubitId(0), Pauli::Y), (QubitId(2), Pauli::Z)],
            0.5,
        );
        append_pauli_gadget_pair_as_box(&mut circ, &p0, &p1, CXConfig::Tree).unwrap();
        assert_eq!(circ.instructions()[0].qubits, vec![QubitId(0), QubitId(2)]);
    }

    #[test]
    fn test_append_commuting_set_as_box() {
        let mut circ = Circuit::new(3);
        let gadgets = vec![
            SparsePauliTensor::new([(QubitId(0), Pauli::Z)], 0.25),
            SparsePauliTensor::new([(QubitId(2), Pauli::Z)], 0.5),
        ];
        append_commuting_pauli_gadget_set_as_box(&mut circ, &gadgets, CXConfig::Snake).unwrap();
        assert_eq!(circ.instructions()[0].qubits, vec![QubitId(0), QubitId(2)]);
        assert_eq!(circ.instructions()[0].arity(), 2);
    }
}
