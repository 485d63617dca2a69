//! Property-based tests for Pauli-exponential boxes.
//!
//! Covers the universal invariants: dagger and transpose are involutions,
//! JSON round-trips preserve equality and identity, and lowering produces
//! gate-level circuits of the box's arity.

use alsvin_ir::BoxOperator;
use alsvin_pauli::{
    CXConfig, Pauli, PauliExpBox, PauliExpCommutingSetBox, PauliExpPairBox, PauliTensor,
    box_from_json, box_to_json,
};
use proptest::prelude::*;

fn arb_pauli() -> impl Strategy<Value = Pauli> {
    prop_oneof![
        Just(Pauli::I),
        Just(Pauli::X),
        Just(Pauli::Y),
        Just(Pauli::Z),
    ]
}

fn arb_config() -> impl Strategy<Value = CXConfig> {
    prop_oneof![
        Just(CXConfig::Snake),
        Just(CXConfig::Tree),
        Just(CXConfig::Star),
        Just(CXConfig::MultiQGate),
    ]
}

fn arb_tensor(len: usize) -> impl Strategy<Value = PauliTensor> {
    (prop::collection::vec(arb_pauli(), len), -4.0f64..4.0)
        .prop_map(|(string, coeff)| PauliTensor::new(string, coeff))
}

proptest! {
    #[test]
    fn prop_dagger_involution(tensor in arb_tensor(4), config in arb_config()) {
        let boxed = PauliExpBox::new(tensor, config);
        let twice = boxed.dagger().unwrap().dagger().unwrap();
        prop_assert!(twice.is_equal(&boxed));
        prop_assert!(boxed.is_equal(twice.as_ref()));
    }

    #[test]
    fn prop_transpose_involution(tensor in arb_tensor(4), config in arb_config()) {
        let boxed = PauliExpBox::new(tensor, config);
        let twice = boxed.transpose().unwrap().transpose().unwrap();
        prop_assert!(twice.is_equal(&boxed));
    }

    #[test]
    fn prop_json_roundtrip(tensor in arb_tensor(3), config in arb_config()) {
        let boxed = PauliExpBox::new(tensor, config);
        let restored = box_from_json(&box_to_json(&boxed).unwrap()).unwrap();
        prop_assert!(restored.is_equal(&boxed));
        prop_assert_eq!(restored.id(), boxed.id());
    }

    #[test]
    fn prop_pair_roundtrip(
        t0 in arb_tensor(3),
        t1 in arb_tensor(3),
        config in arb_config(),
    ) {
        let boxed = PauliExpPairBox::new(t0, t1, config).unwrap();
        let restored = box_from_json(&box_to_json(&boxed).unwrap()).unwrap();
        prop_assert!(restored.is_equal(&boxed));
        prop_assert_eq!(restored.id(), boxed.id());
    }

    #[test]
    fn prop_pair_dagger_involution(
        t0 in arb_tensor(3),
        t1 in arb_tensor(3),
        config in arb_config(),
    ) {
        let boxed = PauliExpPairBox::new(t0, t1, config).unwrap();
        let twice = boxed.dagger().unwrap().dagger().unwrap();
        prop_assert!(twice.is_equal(&boxed));
    }

    #[test]
    fn prop_commuting_set_roundtrip(tensor in arb_tensor(3), config in arb_config()) {
        // A string always commutes with itself.
        let boxed =
            PauliExpCommutingSetBox::new(vec![tensor.clone(), tensor], config).unwrap();
        let restored = box_from_json(&box_to_json(&boxed).unwrap()).unwrap();
        prop_assert!(restored.is_equal(&boxed));
        prop_assert_eq!(restored.id(), boxed.id());
    }

    #[test]
    fn prop_lowering_matches_arity(tensor in arb_tensor(4), config in arb_config()) {
        let boxed = PauliExpBox::new(tensor, config);
        let circ = boxed.to_circuit().unwrap();
        prop_assert_eq!(circ.num_qubits() as usize, boxed.n_qubits());
        prop_assert!(circ.instructions().iter().all(|i| !i.is_box()));
    }
}
