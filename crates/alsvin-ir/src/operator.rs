//! The box-operator capability.
//!
//! High-level circuit operators ("boxes") carry their own lowering logic:
//! a box knows how to produce an equivalent gate-level circuit on demand.
//! Boxes are logically immutable after construction; the lowered circuit is
//! cached on first request. Boxes are not thread-safe for shared mutation —
//! embedders must serialize access or clone per thread.

use rustc_hash::FxHashMap;
use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::circuit::Circuit;
use crate::error::IrResult;
use crate::parameter::ParameterExpression;

/// A circuit operator with lazy gate-level lowering.
///
/// Implementers register a JSON codec under [`box_type`](Self::box_type) in
/// the operator factory so that boxes survive serialization round-trips.
pub trait BoxOperator: fmt::Debug {
    /// Type tag used for dynamic dispatch and JSON encoding.
    fn box_type(&self) -> &'static str;

    /// Stable identity assigned at construction and preserved by
    /// serialization.
    fn id(&self) -> Uuid;

    /// Number of qubits the box acts on.
    fn n_qubits(&self) -> usize;

    /// Whether the operator is a Clifford unitary.
    fn is_clifford(&self) -> bool;

    /// Free symbols of all symbolic parameters held by the box.
    fn free_symbols(&self) -> BTreeSet<String>;

    /// The adjoint operator.
    fn dagger(&self) -> IrResult<Arc<dyn BoxOperator>>;

    /// The transpose operator.
    fn transpose(&self) -> IrResult<Arc<dyn BoxOperator>>;

    /// Replace free symbols by expressions, producing a new box.
    fn symbol_substitution(
        &self,
        map: &FxHashMap<String, ParameterExpression>,
    ) -> IrResult<Arc<dyn BoxOperator>>;

    /// Semantic equality. Implementations short-circuit on identical ids and
    /// otherwise compare structural content.
    fn is_equal(&self, other: &dyn BoxOperator) -> bool;

    /// Lower the box to a gate-level circuit. The result is generated once
    /// and cached; later calls return the cached circuit.
    fn to_circuit(&self) -> IrResult<Circuit>;

    /// Downcast support for [`is_equal`](Self::is_equal) implementations.
    fn as_any(&self) -> &dyn Any;
}
