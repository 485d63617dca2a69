//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit} not found in circuit of width {width}")]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// The circuit width.
        width: u32,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation '{name}'")]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Name of the operation.
        name: String,
    },

    /// Gate requires a different number of qubits.
    #[error("Operation '{name}' requires {expected} qubits, got {got}")]
    ArityMismatch {
        /// Name of the operation.
        name: String,
        /// Expected number of qubits.
        expected: usize,
        /// Actual number of qubits provided.
        got: usize,
    },

    /// Circuit widths do not match for sequential composition.
    #[error("Cannot append circuit of width {got} to circuit of width {expected}")]
    WidthMismatch {
        /// Width of the receiving circuit.
        expected: u32,
        /// Width of the appended circuit.
        got: u32,
    },

    /// Operation is not defined for this operator.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
