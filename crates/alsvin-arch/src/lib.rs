//! Device Connectivity Architecture
//!
//! This crate models the qubit-coupling graph of a target device and the
//! graph analyses placement passes run over it.
//!
//! # Overview
//!
//! An [`Architecture`] is an undirected simple graph of [`Node`]s (register
//! name + index tuple) with weighted edges and observable insertion order.
//! On top of the storage sit the analyses used by placement:
//!
//! - shortest-path distances, diameter and the boolean connectivity matrix
//! - articulation points (DFS low-link)
//! - induced sub-architectures
//! - node-disjoint line extraction for routing onto near-linear devices
//! - iterative worst-node pruning that never disconnects the graph
//!
//! Canonical topologies ([`Architecture::fully_connected`],
//! [`Architecture::ring`], [`Architecture::square_grid`]) cover the common
//! benchmarking devices.
//!
//! # Example
//!
//! ```rust
//! use alsvin_arch::Architecture;
//!
//! let ring = Architecture::ring(6);
//! assert_eq!(ring.get_diameter().unwrap(), 3);
//!
//! let lines = ring.get_lines(vec![4]).unwrap();
//! assert_eq!(lines[0].len(), 4);
//! ```
//!
//! # Serialization
//!
//! Architectures serialize to a deterministic `{"nodes": …, "links": …}`
//! shape that preserves node and edge insertion order.

pub mod architecture;
pub mod error;
pub mod node;
pub mod topology;

pub use architecture::Architecture;
pub use error::{ArchError, ArchResult};
pub use node::Node;
