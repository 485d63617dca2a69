//! Error types for the architecture crate.

use crate::node::Node;
use thiserror::Error;

/// Errors raised by architecture queries and construction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArchError {
    /// Operation requires a non-empty graph, or a line-extraction request
    /// exceeds the node count.
    #[error("Invalid architecture: {0}")]
    InvalidArchitecture(String),

    /// No path between two nodes.
    #[error("No path between {from} and {to}")]
    Disconnected {
        /// Source node.
        from: Node,
        /// Target node.
        to: Node,
    },

    /// Node is not part of the architecture.
    #[error("Node {0} not found in architecture")]
    UnknownNode(Node),

    /// Missing field or wrong JSON shape.
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),
}

/// Result type for architecture operations.
pub type ArchResult<T> = Result<T, ArchError>;
