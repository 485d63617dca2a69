//! Device node identifiers.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A device qubit: a register name plus an index tuple.
///
/// Register names begin with a lowercase letter so that converted circuits
/// satisfy assembly-format register naming rules. Nodes order by name, then
/// index tuple; placement passes depend on this ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Node {
    name: String,
    index: Vec<u32>,
}

impl Node {
    /// A node with a single index, e.g. `ringNode[3]`.
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index: vec![index],
        }
    }

    /// A node with a multi-dimensional index, e.g. `gridNode[1][2][0]`.
    pub fn with_index(name: impl Into<String>, index: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    /// The register name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The index tuple.
    pub fn index(&self) -> &[u32] {
        &self.index
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for i in &self.index {
            write!(f, "[{i}]")?;
        }
        Ok(())
    }
}

// Serialised as the 2-tuple `[name, [indices…]]`.
impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.name, &self.index).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (name, index) = <(String, Vec<u32>)>::deserialize(deserializer)?;
        Ok(Node { name, index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Node::new("fcNode", 2)), "fcNode[2]");
        assert_eq!(
            format!("{}", Node::with_index("gridNode", vec![1, 2, 0])),
            "gridNode[1][2][0]"
        );
    }

    #[test]
    fn test_ordering() {
        assert!(Node::new("a", 5) < Node::new("b", 0));
        assert!(Node::new("a", 1) < Node::new("a", 2));
        assert!(Node::with_index("a", vec![1, 0]) < Node::with_index("a", vec![1, 1]));
    }

    #[test]
    fn test_json_tuple_form() {
        let node = Node::with_index("gridNode", vec![0, 1, 0]);
        let j = serde_json::to_value(&node).unwrap();
        assert_eq!(j, serde_json::json!(["gridNode", [0, 1, 0]]));
        let back: Node = serde_json::from_value(j).unwrap();
        assert_eq!(back, node);
    }
}
