//! JSON codecs and the operator factory registry.
//!
//! Each Pauli-exponential variant registers a `(to_json, from_json)` pair
//! under its type tag. The registry is the only process-wide state in the
//! crate; it is populated once, before the first lookup, and read-only
//! thereafter. Serialization is deterministic and preserves box identity:
//! the UUID embedded in the JSON is set on the reconstructed box.

use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use std::sync::{Arc, LazyLock};
use uuid::Uuid;

use alsvin_ir::{BoxOperator, ParameterExpression};

use crate::boxes::{PauliExpBox, PauliExpCommutingSetBox, PauliExpPairBox};
use crate::error::{BoxError, BoxResult};
use crate::gadget::CXConfig;
use crate::pauli::Pauli;
use crate::tensor::PauliTensor;

/// Serialization hooks for one operator type.
pub struct OpJsonCodec {
    /// Encode a box into its JSON form.
    pub to_json: fn(&dyn BoxOperator) -> BoxResult<Value>,
    /// Decode a box from its JSON form.
    pub from_json: fn(&Value) -> BoxResult<Arc<dyn BoxOperator>>,
}

static REGISTRY: LazyLock<FxHashMap<&'static str, OpJsonCodec>> = LazyLock::new(|| {
    let mut map = FxHashMap::default();
    map.insert(
        "PauliExpBox",
        OpJsonCodec {
            to_json: pauli_exp_to_json,
            from_json: pauli_exp_from_json,
        },
    );
    map.insert(
        "PauliExpPairBox",
        OpJsonCodec {
            to_json: pauli_exp_pair_to_json,
            from_json: pauli_exp_pair_from_json,
        },
    );
    map.insert(
        "PauliExpCommutingSetBox",
        OpJsonCodec {
            to_json: pauli_exp_commuting_set_to_json,
            from_json: pauli_exp_commuting_set_from_json,
        },
    );
    map
});

/// Encode a box through its registered codec.
pub fn box_to_json(op: &dyn BoxOperator) -> BoxResult<Value> {
    let codec = REGISTRY
        .get(op.box_type())
        .ok_or_else(|| BoxError::UnknownOperator(op.box_type().to_string()))?;
    (codec.to_json)(op)
}

/// Decode a box by dispatching on the `type` tag.
pub fn box_from_json(value: &Value) -> BoxResult<Arc<dyn BoxOperator>> {
    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| BoxError::MalformedJson("missing 'type' field".to_string()))?;
    let codec = REGISTRY
        .get(tag)
        .ok_or_else(|| BoxError::UnknownOperator(tag.to_string()))?;
    (codec.from_json)(value)
}

fn require<'a>(value: &'a Value, field: &str) -> BoxResult<&'a Value> {
    value
        .get(field)
        .ok_or_else(|| BoxError::MalformedJson(format!("missing field '{field}'")))
}

fn decode<T: serde::de::DeserializeOwned>(value: &Value, field: &str) -> BoxResult<T> {
    serde_json::from_value(require(value, field)?.clone())
        .map_err(|e| BoxError::MalformedJson(format!("field '{field}': {e}")))
}

fn encode<T: serde::Serialize>(value: &T) -> BoxResult<Value> {
    serde_json::to_value(value).map_err(|e| BoxError::MalformedJson(e.to_string()))
}

fn decode_id(value: &Value) -> BoxResult<Uuid> {
    let s: String = decode(value, "id")?;
    Uuid::parse_str(&s).map_err(|e| BoxError::MalformedJson(format!("field 'id': {e}")))
}

fn downcast<T: 'static>(op: &dyn BoxOperator) -> BoxResult<&T> {
    op.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| BoxError::UnknownOperator(op.box_type().to_string()))
}

fn pauli_exp_to_json(op: &dyn BoxOperator) -> BoxResult<Value> {
    let boxed: &PauliExpBox = downcast(op)?;
    Ok(json!({
        "id": boxed.id().to_string(),
        "type": "PauliExpBox",
        "paulis": encode(&boxed.paulis())?,
        "phase": encode(boxed.phase())?,
        "cx_config": encode(&boxed.cx_config())?,
    }))
}

fn pauli_exp_from_json(value: &Value) -> BoxResult<Arc<dyn BoxOperator>> {
    let paulis: Vec<Pauli> = decode(value, "paulis")?;
    let phase: ParameterExpression = decode(value, "phase")?;
    let cx_config: CXConfig = decode(value, "cx_config")?;
    let mut boxed = PauliExpBox::new(PauliTensor::new(paulis, phase), cx_config);
    boxed.set_id(decode_id(value)?);
    Ok(Arc::new(boxed))
}

fn pauli_exp_pair_to_json(op: &dyn BoxOperator) -> BoxResult<Value> {
    let boxed: &PauliExpPairBox = downcast(op)?;
    let (paulis0, paulis1) = boxed.paulis_pair();
    let (phase0, phase1) = boxed.phase_pair();
    Ok(json!({
        "id": boxed.id().to_string(),
        "type": "PauliExpPairBox",
        "paulis_pair": [encode(&paulis0)?, encode(&paulis1)?],
        "phase_pair": [encode(phase0)?, encode(phase1)?],
        "cx_config": encode(&boxed.cx_config())?,
    }))
}

fn pauli_exp_pair_from_json(value: &Value) -> BoxResult<Arc<dyn BoxOperator>> {
    let (paulis0, paulis1): (Vec<Pauli>, Vec<Pauli>) = decode(value, "paulis_pair")?;
    let (phase0, phase1): (ParameterExpression, ParameterExpression) =
        decode(value, "phase_pair")?;
    let cx_config: CXConfig = decode(value, "cx_config")?;
    let mut boxed = PauliExpPairBox::new(
        PauliTensor::new(paulis0, phase0),
        PauliTensor::new(paulis1, phase1),
        cx_config,
    )?;
    boxed.set_id(decode_id(value)?);
    Ok(Arc::new(boxed))
}

fn pauli_exp_commuting_set_to_json(op: &dyn BoxOperator) -> BoxResult<Value> {
    let boxed: &PauliExpCommutingSetBox = downcast(op)?;
    let gadgets: Vec<(&[Pauli], &ParameterExpression)> = boxed
        .pauli_gadgets()
        .iter()
        .map(|g| (g.string.as_slice(), &g.coeff))
        .collect();
    Ok(json!({
        "id": boxed.id().to_string(),
        "type": "PauliExpCommutingSetBox",
        "pauli_gadgets": encode(&gadgets)?,
        "cx_config": encode(&boxed.cx_config())?,
    }))
}

fn pauli_exp_commuting_set_from_json(value: &Value) -> BoxResult<Arc<dyn BoxOperator>> {
    let gadgets: Vec<(Vec<Pauli>, ParameterExpression)> = decode(value, "pauli_gadgets")?;
    let cx_config: CXConfig = decode(value, "cx_config")?;
    let tensors = gadgets
        .into_iter()
        .map(|(string, phase)| PauliTensor::new(string, phase))
        .collect();
    let mut boxed = PauliExpCommutingSetBox::new(tensors, cx_config)?;
    boxed.set_id(decode_id(value)?);
    Ok(Arc::new(boxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor(letters: &[Pauli], coeff: f64) -> PauliTensor {
        PauliTensor::new(letters.to_vec(), coeff)
    }

    #[test]
    fn test_pauli_exp_roundtrip() {
        let boxed = PauliExpBox::new(
            PauliTensor::new(
                vec![Pauli::X, Pauli::I, Pauli::Y],
                ParameterExpression::symbol("alpha"),
            ),
            CXConfig::Star,
        );
        let j = box_to_json(&boxed).unwrap();
        assert_eq!(j["type"], "PauliExpBox");
        assert_eq!(j["paulis"], json!(["X", "I", "Y"]));
        assert_eq!(j["cx_config"], json!("Star"));

        let restored = box_from_json(&j).unwrap();
        assert!(restored.is_equal(&boxed));
        assert_eq!(restored.id(), boxed.id());
    }

    #[test]
    fn test_pair_roundtrip() {
        let boxed = PauliExpPairBox::new(
            tensor(&[Pauli::X, Pauli::Y, Pauli::I], 0.25),
            tensor(&[Pauli::Y, Pauli::Y, Pauli::I], 0.5),
            CXConfig::Tree,
        )
        .unwrap();
        let j = box_to_json(&boxed).unwrap();
        assert_eq!(j["paulis_pair"][0], json!(["X", "Y", "I"]));
        assert_eq!(j["phase_pair"].as_array().unwrap().len(), 2);

        let restored = box_from_json(&j).unwrap();
        assert!(restored.is_equal(&boxed));
        assert_eq!(restored.id(), boxed.id());
    }

    #[test]
    fn test_commuting_set_roundtrip() {
        let boxed = PauliExpCommutingSetBox::new(
            vec![
                tensor(&[Pauli::Z, Pauli::I], 0.25),
                tensor(&[Pauli::I, Pauli::Z], 0.5),
            ],
            CXConfig::Snake,
        )
        .unwrap();
        let j = box_to_json(&boxed).unwrap();
        assert_eq!(j["pauli_gadgets"][0][0], json!(["Z", "I"]));

        let restored = box_from_json(&j).unwrap();
        assert!(restored.is_equal(&boxed));
        assert_eq!(restored.id(), boxed.id());
    }

    #[test]
    fn test_unknown_operator() {
        let j = json!({"type": "MysteryBox"});
        assert!(matches!(
            box_from_json(&j),
            Err(BoxError::UnknownOperator(tag)) if tag == "MysteryBox"
        ));
    }

    #[test]
    fn test_missing_type_field() {
        let j = json!({"paulis": ["X"]});
        assert!(matches!(box_from_json(&j), Err(BoxError::MalformedJson(_))));
    }

    #[test]
    fn test_missing_field() {
        let boxed = PauliExpBox::new(tensor(&[Pauli::X], 0.25), CXConfig::Tree);
        let mut j = box_to_json(&boxed).unwrap();
        j.as_object_mut().unwrap().remove("phase");
        assert!(matches!(box_from_json(&j), Err(BoxError::MalformedJson(_))));
    }

    #[test]
    fn test_bad_uuid() {
        let boxed = PauliExpBox::new(tensor(&[Pauli::X], 0.25), CXConfig::Tree);
        let mut j = box_to_json(&boxed).unwrap();
        j["id"] = json!("not-a-uuid");
        assert!(matches!(box_from_json(&j), Err(BoxError::MalformedJson(_))));
    }

    #[test]
    fn test_decode_revalidates() {
        // A hand-written payload with non-commuting strings is rejected.
        let j = json!({
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "type": "PauliExpCommutingSetBox",
            "pauli_gadgets": [[["X"], {"Constant": 0.1}], [["Z"], {"Constant": 0.1}]],
            "cx_config": "Tree",
        });
        assert!(matches!(
            box_from_json(&j),
            Err(BoxError::InvalidPauliExp(_))
        ));
    }
}
