//! Conjugation box: `compute · action · compute†`.

use rustc_hash::FxHashMap;
use std::any::Any;
use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use alsvin_ir::{BoxOperator, Circuit, IrError, IrResult, ParameterExpression};

/// A circuit operator representing `C · A · C†` for a compute stage `C` and
/// an action stage `A`. Lowering emits the compute circuit, the action
/// circuit, then the daggered compute circuit.
#[derive(Debug, Clone)]
pub struct ConjugationBox {
    id: Uuid,
    compute: Circuit,
    action: Circuit,
    circuit_cache: OnceCell<Circuit>,
}

impl ConjugationBox {
    /// Create a conjugation box. The stages must have equal width.
    pub fn new(compute: Circuit, action: Circuit) -> IrResult<Self> {
        if compute.num_qubits() != action.num_qubits() {
            return Err(IrError::WidthMismatch {
                expected: compute.num_qubits(),
                got: action.num_qubits(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            compute,
            action,
            circuit_cache: OnceCell::new(),
        })
    }

    /// The compute stage.
    pub fn compute(&self) -> &Circuit {
        &self.compute
    }

    /// The action stage.
    pub fn action(&self) -> &Circuit {
        &self.action
    }

    fn generate_circuit(&self) -> IrResult<Circuit> {
        let mut circ = Circuit::new(self.compute.num_qubits());
        circ.append(self.compute.clone())?;
        circ.append(self.action.clone())?;
        circ.append(self.compute.dagger()?)?;
        Ok(circ)
    }
}

impl BoxOperator for ConjugationBox {
    fn box_type(&self) -> &'static str {
        "ConjugationBox"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn n_qubits(&self) -> usize {
        self.compute.num_qubits() as usize
    }

    fn is_clifford(&self) -> bool {
        // Would require inspecting both stages; callers treat the wrapper
        // as opaque.
        false
    }

    fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = self.compute.free_symbols();
        out.extend(self.action.free_symbols());
        out
    }

    fn dagger(&self) -> IrResult<Arc<dyn BoxOperator>> {
        // (C · A · C†)† = C · A† · C†.
        Ok(Arc::new(Self::new(
            self.compute.clone(),
            self.action.dagger()?,
        )?))
    }

    fn transpose(&self) -> IrResult<Arc<dyn BoxOperator>> {
        Err(IrError::UnsupportedOperation(
            "transpose of ConjugationBox".to_string(),
        ))
    }

    fn symbol_substitution(
        &self,
        map: &FxHashMap<String, ParameterExpression>,
    ) -> IrResult<Arc<dyn BoxOperator>> {
        Ok(Arc::new(Self::new(
            self.compute.symbol_substitution(map)?,
            self.action.symbol_substitution(map)?,
        )?))
    }

    fn is_equal(&self, other: &dyn BoxOperator) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        self.id == other.id
            || (self.compute == other.compute && self.action == other.action)
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

#[cfg(test)]
mod tests {
    use super::*;
    use alsvin_ir::QubitId;

    fn stage_pair() -> (Circuit, Circuit) {
        let mut compute = Circuit::new(2);
        compute.h(QubitId(0)).unwrap();
        compute.cx(QubitId(0), QubitId(1)).unwrap();
        let mut action = Circuit::new(2);
        action.rz(0.25, QubitId(1)).unwrap();
        (compute, action)
    }

    #[test]
    fn test_lowering_shape() {
        let (compute, action) = stage_pair();
        let conj = ConjugationBox::new(compute, action).unwrap();
        let circ = conj.to_circuit().unwrap();
        let names: Vec<_> = circ.instructions().iter().map(|i| i.name()).collect();
        // compute ; action ; compute† (reversed, daggered).
        assert_eq!(names, vec!["h", "cx", "rz", "cx", "h"]);
    }

    #[test]
    fn test_width_mismatch() {
        let result = ConjugationBox::new(Circuit::new(2), Circuit::new(3));
        assert!(matches!(result, Err(IrError::WidthMismatch { .. })));
    }

    #[test]
    fn test_dagger_keeps_compute() {
        let (compute, action) = stage_pair();
        let conj = ConjugationBox::new(compute.clone(), action).unwrap();
        let dag = conj.dagger().unwrap();
        let dag = dag.as_any().downcast_ref::<ConjugationBox>().unwrap();
        assert_eq!(dag.compute(), &compute);
        assert_eq!(dag.action().instructions()[0].name(), "rz");
    }

    #[test]
    fn test_transpose_unsupported() {
        let (compute, action) = stage_pair();
        let conj = ConjugationBox::new(compute, action).unwrap();
        assert!(matches!(
            conj.transpose(),
            Err(IrError::UnsupportedOperation(_))
        ));
    }
}
