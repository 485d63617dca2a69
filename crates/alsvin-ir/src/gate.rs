//! Quantum gate types.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::parameter::ParameterExpression;

/// Standard gates with known semantics.
///
/// The set is restricted to what Pauli-exponential synthesis emits: the
/// Pauli gates, the Clifford basis changes used to rotate X/Y letters onto
/// the Z axis, the parity-ladder entanglers and the rotation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,
    /// Rotation around X axis (half-turns).
    Rx(ParameterExpression),
    /// Rotation around Z axis (half-turns).
    Rz(ParameterExpression),
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// ZZ interaction gate (half-turns).
    RZZ(ParameterExpression),
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Rz(_) => "rz",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::RZZ(_) => "rzz",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::SX
            | StandardGate::SXdg
            | StandardGate::Rx(_)
            | StandardGate::Rz(_) => 1,

            StandardGate::CX | StandardGate::CZ | StandardGate::RZZ(_) => 2,
        }
    }

    /// The adjoint of this gate.
    pub fn dagger(&self) -> Self {
        match self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::SX => StandardGate::SXdg,
            StandardGate::SXdg => StandardGate::SX,
            StandardGate::Rx(t) => StandardGate::Rx(-t.clone()),
            StandardGate::Rz(t) => StandardGate::Rz(-t.clone()),
            StandardGate::RZZ(t) => StandardGate::RZZ(-t.clone()),
            // Self-adjoint gates.
            StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::CX
            | StandardGate::CZ => self.clone(),
        }
    }

    /// Check if this gate carries an unbound symbolic parameter.
    pub fn is_parameterized(&self) -> bool {
        match self {
            StandardGate::Rx(p) | StandardGate::Rz(p) | StandardGate::RZZ(p) => p.is_symbolic(),
            _ => false,
        }
    }

    /// Get parameters of this gate.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            StandardGate::Rx(p) | StandardGate::Rz(p) | StandardGate::RZZ(p) => vec![p],
            _ => vec![],
        }
    }

    /// Replace free symbols in gate parameters.
    pub fn substitute(&self, map: &FxHashMap<String, ParameterExpression>) -> Self {
        match self {
            StandardGate::Rx(p) => StandardGate::Rx(p.substitute(map)),
            StandardGate::Rz(p) => StandardGate::Rz(p.substitute(map)),
            StandardGate::RZZ(p) => StandardGate::RZZ(p.substitute(map)),
            _ => self.clone(),
        }
    }
}
