//! Alsvin Circuit Intermediate Representation
//!
//! This crate provides the core data structures for representing quantum
//! circuits in Alsvin. It forms the foundation of the Pauli-exponential
//! synthesis stack.
//!
//! # Overview
//!
//! The container is deliberately small: a fixed-width instruction list with
//! a builder API, plus the [`BoxOperator`] capability through which
//! high-level operators (Pauli exponentials, conjugation wrappers) carry
//! their own lowering logic. Compilation passes flatten boxes on demand via
//! [`Circuit::decompose_boxes_recursively`].
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] for addressing circuit wires
//! - **Gates**: [`StandardGate`] for the synthesis gate set (H, S, SX, Rz,
//!   CX, CZ, RZZ, …)
//! - **Parameters**: [`ParameterExpression`] for symbolic rotation angles in
//!   half-turns
//! - **Instructions**: [`Instruction`] combining operations with operands
//! - **Boxes**: [`BoxOperator`] for operators with lazy, cached lowering
//! - **Circuit**: [`Circuit`] fixed-width builder API
//!
//! # Example
//!
//! ```rust
//! use alsvin_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::new(2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.num_ops(), 2);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod operator;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use operator::BoxOperator;
pub use parameter::ParameterExpression;
pub use qubit::QubitId;
