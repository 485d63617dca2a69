//! Pauli-Exponential Boxes and Synthesis
//!
//! This crate implements the Pauli-exponential layer of the Alsvin
//! compilation stack: exponentials of Pauli-string tensors represented as
//! high-level circuit operators, together with the synthesis machinery that
//! lowers them to gate-level circuits.
//!
//! # Overview
//!
//! A *Pauli gadget* is the unitary `exp(−i·π·t/2 · P)` for a Pauli string
//! `P` and an angle `t` in half-turns. Three box variants cover the shapes
//! optimisation passes produce:
//!
//! - [`PauliExpBox`] — a single exponential
//! - [`PauliExpPairBox`] — an ordered product of two exponentials
//! - [`PauliExpCommutingSetBox`] — a product of pairwise-commuting
//!   exponentials
//!
//! Boxes lower lazily through the configurable gadget synthesiser
//! ([`pauli_gadget`], [`CXConfig`]). The commuting-set variant additionally
//! conjugates its gadgets to Z-only form ([`mutual_diagonalise`]), feeds
//! the diagonal body through phase-polynomial synthesis ([`PhasePolyBox`])
//! and wraps the result in a [`ConjugationBox`].
//!
//! # Example
//!
//! ```rust
//! use alsvin_pauli::{CXConfig, Pauli, PauliExpBox, PauliTensor};
//! use alsvin_ir::BoxOperator;
//!
//! let gadget = PauliExpBox::new(
//!     PauliTensor::new(vec![Pauli::Z, Pauli::Z], 0.5),
//!     CXConfig::Tree,
//! );
//! assert!(gadget.is_clifford());
//!
//! let circuit = gadget.to_circuit().unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//! ```
//!
//! # Serialization
//!
//! Every box variant registers a JSON codec in the operator factory;
//! [`box_to_json`] and [`box_from_json`] round-trip boxes bit-exactly,
//! preserving box identity.

pub mod boxes;
pub mod codec;
pub mod conjugation;
pub mod diagonalise;
pub mod error;
pub mod gadget;
pub mod pauli;
pub mod phase_poly;
pub mod tensor;

pub use boxes::{
    PauliExpBox, PauliExpCommutingSetBox, PauliExpPairBox, append_commuting_pauli_gadget_set_as_box,
    append_pauli_gadget_pair_as_box, append_single_pauli_gadget_as_box,
};
pub use codec::{OpJsonCodec, box_from_json, box_to_json};
pub use conjugation::ConjugationBox;
pub use diagonalise::mutual_diagonalise;
pub use error::{BoxError, BoxResult};
pub use gadget::{CXConfig, pauli_gadget, pauli_gadget_pair};
pub use pauli::Pauli;
pub use phase_poly::PhasePolyBox;
pub use tensor::{PauliTensor, SparsePauliTensor};
