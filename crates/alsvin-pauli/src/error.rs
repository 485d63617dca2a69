//! Error types for the Pauli-exponential crate.

use alsvin_ir::IrError;
use thiserror::Error;

/// Errors raised by box construction, synthesis and serialization.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BoxError {
    /// Invalid Pauli-exponential construction: mismatched string lengths,
    /// an empty commuting set, or non-commuting tensors.
    #[error("Invalid Pauli exponential: {0}")]
    InvalidPauliExp(String),

    /// The operator factory has no codec for the given type tag.
    #[error("Unknown operator type '{0}'")]
    UnknownOperator(String),

    /// Missing field, wrong JSON shape, or unparseable UUID.
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    /// A gate outside the phase-polynomial fragment (CX, Rz).
    #[error("Gate '{gate}' is not part of the phase-polynomial fragment")]
    UnsupportedGate {
        /// Name of the offending gate.
        gate: String,
    },

    /// The circuit's linear layer does not reduce to the identity.
    #[error("Invalid phase polynomial: {0}")]
    InvalidPhasePolynomial(String),

    /// Underlying IR failure.
    #[error(transparent)]
    Ir(#[from] IrError),
}

impl From<BoxError> for IrError {
    fn from(err: BoxError) -> Self {
        match err {
            BoxError::Ir(e) => e,
            other => IrError::UnsupportedOperation(other.to_string()),
        }
    }
}

/// Result type for box operations.
pub type BoxResult<T> = Result<T, BoxError>;
