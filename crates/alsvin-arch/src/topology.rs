//! Canonical device topologies.
//!
//! Register names begin with a lowercase letter to satisfy assembly-format
//! naming rules when circuits are converted onto these devices.

use crate::architecture::Architecture;
use crate::node::Node;

impl Architecture {
    /// The complete graph on `n` nodes, named `fcNode[i]`.
    ///
    /// Edges are inserted for every ordered pair `(i, j)`, `i ≠ j`; the
    /// reversed duplicates collapse onto the undirected edge set.
    pub fn fully_connected(n: u32) -> Architecture {
        let mut arch = Architecture::new();
        for i in 0..n {
            arch.add_node(Node::new("fcNode", i));
        }
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let _ = arch.add_connection(Node::new("fcNode", i), Node::new("fcNode", j));
                }
            }
        }
        arch
    }

    /// The cycle on `n` nodes, named `ringNode[i]`.
    pub fn ring(n: u32) -> Architecture {
        let mut arch = Architecture::new();
        for i in 0..n {
            arch.add_node(Node::new("ringNode", i));
        }
        if n < 2 {
            return arch;
        }
        for i in 0..n {
            let _ = arch.add_connection(
                Node::new("ringNode", i),
                Node::new("ringNode", (i + 1) % n),
            );
        }
        arch
    }

    /// A stack of `layers` square grids of `rows × cols` nodes, named
    /// `gridNode[row][col][layer]`. Each node connects to its right
    /// neighbour, its down neighbour, and the node above it in the next
    /// layer. Iteration order is layer-outermost, then row, then column.
    pub fn square_grid(rows: u32, cols: u32, layers: u32) -> Architecture {
        let grid_node = |r: u32, c: u32, l: u32| Node::with_index("gridNode", vec![r, c, l]);

        let mut arch = Architecture::new();
        for l in 0..layers {
            for r in 0..rows {
                for c in 0..cols {
                    arch.add_node(grid_node(r, c, l));
                }
            }
        }
        for l in 0..layers {
            for r in 0..rows {
                for c in 0..cols {
                    if c + 1 < cols {
                        let _ = arch.add_connection(grid_node(r, c, l), grid_node(r, c + 1, l));
                    }
                    if r + 1 < rows {
                        let _ = arch.add_connection(grid_node(r, c, l), grid_node(r + 1, c, l));
                    }
                    if l + 1 < layers {
                        let _ = arch.add_connection(grid_node(r, c, l), grid_node(r, c, l + 1));
                    }
                }
            }
        }
        arch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fully_connected() {
        let arch = Architecture::fully_connected(4);
        assert_eq!(arch.n_uids(), 4);
        // Complete graph: n(n−1)/2 undirected edges.
        assert_eq!(arch.get_connections_vec().len(), 6);
        assert_eq!(arch.get_diameter().unwrap(), 1);
    }

    // Scenario S4: a 6-ring has diameter 3.
    #[test]
    fn test_ring_diameter() {
        let arch = Architecture::ring(6);
        assert_eq!(arch.n_uids(), 6);
        assert_eq!(arch.get_connections_vec().len(), 6);
        assert_eq!(arch.get_diameter().unwrap(), 3);
    }

    #[test]
    fn test_ring_degenerate() {
        assert_eq!(Architecture::ring(1).get_connections_vec().len(), 0);
        let two = Architecture::ring(2);
        assert_eq!(two.get_connections_vec().len(), 1);
    }

    #[test]
    fn test_square_grid_shape() {
        let arch = Architecture::square_grid(2, 3, 1);
        assert_eq!(arch.n_uids(), 6);
        // 2x3 grid: 2 rows of 2 horizontal edges, 3 vertical edges.
        assert_eq!(arch.get_connections_vec().len(), 7);
        let first: Vec<_> = arch.get_all_uids().take(3).cloned().collect();
        assert_eq!(
            first,
            vec![
                Node::with_index("gridNode", vec![0, 0, 0]),
                Node::with_index("gridNode", vec![0, 1, 0]),
                Node::with_index("gridNode", vec![0, 2, 0]),
            ]
        );
    }

    #[test]
    fn test_square_grid_layers() {
        let arch = Architecture::square_grid(2, 2, 2);
        assert_eq!(arch.n_uids(), 8);
        assert!(arch.connection_exists(
            &Node::with_index("gridNode", vec![0, 0, 0]),
            &Node::with_index("gridNode", vec![0, 0, 1]),
        ));
    }

    // Scenario S5: a 2×3 grid splits into two disjoint 3-lines covering all
    // six vertices.
    #[test]
    fn test_grid_lines() {
        let arch = Architecture::square_grid(2, 3, 1);
        let lines = arch.get_lines(vec![3, 3]).unwrap();
        assert_eq!(lines.len(), 2);
        let mut covered = std::collections::BTreeSet::new();
        for line in &lines {
            assert_eq!(line.len(), 3);
            for pair in line.windows(2) {
                assert!(arch.connection_exists(&pair[0], &pair[1]));
            }
            for n in line {
                assert!(covered.insert(n.clone()));
            }
        }
        assert_eq!(covered.len(), 6);
    }
}
