//! Undirected device-coupling graph.
//!
//! Nodes are device qubits, edges are two-qubit interactions with a
//! positive weight (default 1.0). Distance queries treat every edge as unit
//! cost. Node and edge insertion order is observable: serialisation
//! preserves it and placement passes depend on it.

use ndarray::Array2;
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use rustc_hash::FxHashMap;
use serde::de::Deserializer;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

use crate::error::{ArchError, ArchResult};
use crate::node::Node;

/// An undirected device graph with observable insertion order.
#[derive(Debug, Clone, Default)]
pub struct Architecture {
    graph: StableUnGraph<Node, f64>,
    indices: FxHashMap<Node, NodeIndex>,
    /// Nodes in insertion order.
    order: Vec<Node>,
    /// Edges in insertion order.
    links: Vec<(Node, Node)>,
}

impl Architecture {
    /// Create an empty architecture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; a no-op when it already exists.
    pub fn add_node(&mut self, node: Node) {
        if self.indices.contains_key(&node) {
            return;
        }
        let ix = self.graph.add_node(node.clone());
        self.indices.insert(node.clone(), ix);
        self.order.push(node);
    }

    /// Add an undirected connection with unit weight. Missing endpoints are
    /// added implicitly.
    pub fn add_connection(&mut self, u: Node, v: Node) -> ArchResult<()> {
        self.add_connection_weighted(u, v, 1.0)
    }

    /// Add an undirected connection with an explicit weight. Duplicate
    /// connections (in either direction) are ignored; self-loops are
    /// rejected.
    pub fn add_connection_weighted(&mut self, u: Node, v: Node, weight: f64) -> ArchResult<()> {
        if u == v {
            return Err(ArchError::InvalidArchitecture(format!(
                "self-loop on node {u}"
            )));
        }
        self.add_node(u.clone());
        self.add_node(v.clone());
        if self.connection_exists(&u, &v) {
            return Ok(());
        }
        self.graph.add_edge(self.indices[&u], self.indices[&v], weight);
        self.links.push((u, v));
        Ok(())
    }

    /// Remove a node and its incident connections; a no-op when absent.
    pub fn remove_uid(&mut self, node: &Node) {
        let Some(ix) = self.indices.remove(node) else {
            return;
        };
        self.graph.remove_node(ix);
        self.order.retain(|n| n != node);
        self.links.retain(|(a, b)| a != node && b != node);
    }

    /// Whether the node is present.
    pub fn uid_exists(&self, node: &Node) -> bool {
        self.indices.contains_key(node)
    }

    /// Number of nodes.
    pub fn n_uids(&self) -> usize {
        self.order.len()
    }

    /// Nodes in insertion order.
    pub fn get_all_uids(&self) -> impl Iterator<Item = &Node> {
        self.order.iter()
    }

    /// Edges in insertion order.
    pub fn get_connections_vec(&self) -> &[(Node, Node)] {
        &self.links
    }

    /// Whether an edge joins the two nodes (in either direction).
    pub fn connection_exists(&self, u: &Node, v: &Node) -> bool {
        match (self.indices.get(u), self.indices.get(v)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// The weight of the edge joining two nodes, if any.
    pub fn get_connection_weight(&self, u: &Node, v: &Node) -> Option<f64> {
        let (&a, &b) = (self.indices.get(u)?, self.indices.get(v)?);
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Number of connections incident to a node.
    pub fn node_degree(&self, node: &Node) -> usize {
        self.indices
            .get(node)
            .map_or(0, |&ix| self.graph.neighbors(ix).count())
    }

    // =========================================================================
    // Distance queries
    // =========================================================================

    /// Per-source BFS over unit-cost edges.
    fn bfs(&self, root: NodeIndex) -> FxHashMap<NodeIndex, usize> {
        let mut dist = FxHashMap::default();
        dist.insert(root, 0);
        let mut queue = VecDeque::from([root]);
        while let Some(v) = queue.pop_front() {
            let d = dist[&v];
            for w in self.graph.neighbors(v) {
                if !dist.contains_key(&w) {
                    dist.insert(w, d + 1);
                    queue.push_back(w);
                }
            }
        }
        dist
    }

    /// Unweighted shortest-path distance. Fails when either node is absent
    /// or the nodes are disconnected.
    pub fn get_distance(&self, u: &Node, v: &Node) -> ArchResult<usize> {
        let &a = self
            .indices
            .get(u)
            .ok_or_else(|| ArchError::UnknownNode(u.clone()))?;
        let &b = self
            .indices
            .get(v)
            .ok_or_else(|| ArchError::UnknownNode(v.clone()))?;
        self.bfs(a)
            .get(&b)
            .copied()
            .ok_or_else(|| ArchError::Disconnected {
                from: u.clone(),
                to: v.clone(),
            })
    }

    /// Distances from `root` to every node, indexed by insertion-order
    /// position. Unreachable nodes hold `usize::MAX`.
    pub fn get_distances(&self, root: &Node) -> ArchResult<Vec<usize>> {
        let &ix = self
            .indices
            .get(root)
            .ok_or_else(|| ArchError::UnknownNode(root.clone()))?;
        let dist = self.bfs(ix);
        Ok(self
            .order
            .iter()
            .map(|n| dist.get(&self.indices[n]).copied().unwrap_or(usize::MAX))
            .collect())
    }

    /// Maximum shortest-path distance over all node pairs. Fails on an
    /// empty or disconnected architecture.
    pub fn get_diameter(&self) -> ArchResult<usize> {
        if self.order.is_empty() {
            return Err(ArchError::InvalidArchitecture(
                "no nodes in architecture".to_string(),
            ));
        }
        let mut max = 0;
        for (i, u) in self.order.iter().enumerate() {
            for v in &self.order[i + 1..] {
                max = max.max(self.get_distance(u, v)?);
            }
        }
        Ok(max)
    }

    /// Symmetric boolean adjacency matrix in insertion order.
    pub fn get_connectivity(&self) -> Array2<bool> {
        let n = self.order.len();
        Array2::from_shape_fn((n, n), |(i, j)| {
            self.connection_exists(&self.order[i], &self.order[j])
        })
    }

    // =========================================================================
    // Derived graphs
    // =========================================================================

    /// The sub-architecture induced by `nodes`: the given nodes plus every
    /// connection of `self` joining two of them, preserving edge order and
    /// weights.
    pub fn create_subarch(&self, nodes: &[Node]) -> ArchResult<Architecture> {
        let mut subarc = Architecture::new();
        for node in nodes {
            subarc.add_node(node.clone());
        }
        for (u, v) in &self.links {
            if subarc.uid_exists(u) && subarc.uid_exists(v) {
                let weight = self.get_connection_weight(u, v).unwrap_or(1.0);
                subarc.add_connection_weighted(u.clone(), v.clone(), weight)?;
            }
        }
        Ok(subarc)
    }

    /// Vertices whose removal disconnects the graph (DFS low-link).
    pub fn get_articulation_points(&self) -> BTreeSet<Node> {
        let mut dfs = ApDfs {
            graph: &self.graph,
            disc: FxHashMap::default(),
            low: FxHashMap::default(),
            time: 0,
            aps: BTreeSet::new(),
        };
        for node in &self.order {
            let ix = self.indices[node];
            if !dfs.disc.contains_key(&ix) {
                dfs.visit(ix, None);
            }
        }
        dfs.aps
    }

    /// Articulation points of the given sub-architecture, restricted to
    /// nodes present in `self`.
    pub fn get_articulation_points_of(&self, subarc: &Architecture) -> BTreeSet<Node> {
        subarc
            .get_articulation_points()
            .into_iter()
            .filter(|n| self.uid_exists(n))
            .collect()
    }

    // =========================================================================
    // Line extraction
    // =========================================================================

    /// Extract node-disjoint simple paths of the requested lengths.
    ///
    /// Lengths are processed longest-first on a working copy of the
    /// connectivity; each found line is truncated to its requested length
    /// and its vertices retired. Lines are returned in request order;
    /// requests that cannot be satisfied produce no line.
    pub fn get_lines(&self, required_lengths: Vec<usize>) -> ArchResult<Vec<Vec<Node>>> {
        let total: usize = required_lengths.iter().sum();
        if total > self.n_uids() {
            return Err(ArchError::InvalidArchitecture(
                "not enough nodes to satisfy the requested line lengths".to_string(),
            ));
        }

        let mut by_length: Vec<usize> = (0..required_lengths.len()).collect();
        by_length.sort_by(|&a, &b| required_lengths[b].cmp(&required_lengths[a]));

        // Working adjacency over insertion positions.
        let n = self.order.len();
        let pos: FxHashMap<&Node, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(i, node)| (node, i))
            .collect();
        let mut adj: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
        for (a, b) in &self.links {
            let (i, j) = (pos[a], pos[b]);
            adj[i].insert(j);
            adj[j].insert(i);
        }
        let mut alive = vec![true; n];

        let mut found: Vec<(usize, Vec<Node>)> = vec![];
        for &req in &by_length {
            let length = required_lengths[req];
            if length == 0 {
                continue;
            }
            let path = longest_simple_path(&adj, &alive, length);
            if path.len() < length {
                debug!(length, "no line of requested length");
                continue;
            }
            let line: Vec<Node> = path[..length]
                .iter()
                .map(|&i| self.order[i].clone())
                .collect();
            for &i in &path[..length] {
                alive[i] = false;
                for nb in std::mem::take(&mut adj[i]) {
                    adj[nb].remove(&i);
                }
            }
            found.push((req, line));
        }
        found.sort_by_key(|&(req, _)| req);
        Ok(found.into_iter().map(|(_, line)| line).collect())
    }

    // =========================================================================
    // Worst-node pruning
    // =========================================================================

    /// Iteratively remove up to `num` worst nodes, never removing an
    /// articulation point. Returns the removed set.
    pub fn remove_worst_nodes(&mut self, num: usize) -> BTreeSet<Node> {
        let original = self.clone();
        let mut out = BTreeSet::new();
        for _ in 0..num {
            match self.find_worst_node(&original) {
                Some(node) => {
                    debug!(node = %node, "pruning worst node");
                    self.remove_uid(&node);
                    out.insert(node);
                }
                None => break,
            }
        }
        out
    }

    /// Minimum-degree nodes, in node order.
    fn min_degree_uids(&self) -> BTreeSet<Node> {
        let Some(min) = self.order.iter().map(|n| self.node_degree(n)).min() else {
            return BTreeSet::new();
        };
        self.order
            .iter()
            .filter(|n| self.node_degree(n) == min)
            .cloned()
            .collect()
    }

    /// Ascending distance vector used by the worst-node comparison.
    fn sorted_distances(&self, node: &Node) -> Vec<usize> {
        let mut dists = self.get_distances(node).unwrap_or_default();
        dists.sort_unstable();
        dists
    }

    /// The candidate whose removal hurts least: minimum degree, not an
    /// articulation point, with the lexicographically smallest ascending
    /// distance vector; ties fall back to distances in the pre-pruning
    /// graph.
    fn find_worst_node(&self, original: &Architecture) -> Option<Node> {
        let aps = self.get_articulation_points();
        // BTreeSet iteration gives candidates in node order.
        let mut candidates = self
            .min_degree_uids()
            .into_iter()
            .filter(|n| !aps.contains(n));

        let mut worst = candidates.next()?;
        let mut worst_dists = self.sorted_distances(&worst);
        for node in candidates {
            let dists = self.sorted_distances(&node);
            match dists.cmp(&worst_dists) {
                std::cmp::Ordering::Less => {
                    worst = node;
                    worst_dists = dists;
                }
                std::cmp::Ordering::Equal => {
                    let tie_break = original.sorted_distances(&node);
                    let worst_tie = original.sorted_distances(&worst);
                    if tie_break < worst_tie {
                        worst = node;
                        worst_dists = dists;
                    }
                }
                std::cmp::Ordering::Greater => {}
            }
        }
        Some(worst)
    }
}

/// DFS state for articulation-point discovery.
struct ApDfs<'a> {
    graph: &'a StableUnGraph<Node, f64>,
    disc: FxHashMap<NodeIndex, usize>,
    low: FxHashMap<NodeIndex, usize>,
    time: usize,
    aps: BTreeSet<Node>,
}

impl ApDfs<'_> {
    fn visit(&mut self, v: NodeIndex, parent: Option<NodeIndex>) {
        self.time += 1;
        self.disc.insert(v, self.time);
        self.low.insert(v, self.time);
        let mut children = 0;

        let neighbors: Vec<NodeIndex> = self.graph.neighbors(v).collect();
        for w in neighbors {
            if !self.disc.contains_key(&w) {
                children += 1;
                self.visit(w, Some(v));
                let low_w = self.low[&w];
                if low_w < self.low[&v] {
                    self.low.insert(v, low_w);
                }
                if parent.is_some() && low_w >= self.disc[&v] {
                    self.aps.insert(self.graph[v].clone());
                }
            } else if Some(w) != parent {
                let disc_w = self.disc[&w];
                if disc_w < self.low[&v] {
                    self.low.insert(v, disc_w);
                }
            }
        }
        if parent.is_none() && children > 1 {
            self.aps.insert(self.graph[v].clone());
        }
    }
}

/// Longest simple path in the working graph, cut off once `limit` vertices
/// are reached. Start vertices and neighbours are scanned in insertion
/// order, which makes extraction deterministic.
fn longest_simple_path(adj: &[BTreeSet<usize>], alive: &[bool], limit: usize) -> Vec<usize> {
    fn dfs(
        v: usize,
        adj: &[BTreeSet<usize>],
        visited: &mut [bool],
        path: &mut Vec<usize>,
        best: &mut Vec<usize>,
        limit: usize,
    ) {
        if path.len() > best.len() {
            best.clone_from(path);
        }
        if best.len() >= limit {
            return;
        }
        for &w in &adj[v] {
            if !visited[w] {
                visited[w] = true;
                path.push(w);
                dfs(w, adj, visited, path, best, limit);
                path.pop();
                visited[w] = false;
            }
        }
    }

    let mut best = vec![];
    for start in 0..adj.len() {
        if !alive[start] {
            continue;
        }
        let mut visited = vec![false; adj.len()];
        visited[start] = true;
        let mut path = vec![start];
        dfs(start, adj, &mut visited, &mut path, &mut best, limit);
        if best.len() >= limit {
            break;
        }
    }
    best
}

// =============================================================================
// JSON codec
// =============================================================================

#[derive(Serialize, Deserialize)]
struct LinkEntry {
    link: (Node, Node),
    weight: f64,
}

impl Serialize for Architecture {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let links: Vec<LinkEntry> = self
            .links
            .iter()
            .map(|(a, b)| LinkEntry {
                link: (a.clone(), b.clone()),
                weight: self.get_connection_weight(a, b).unwrap_or(1.0),
            })
            .collect();
        let mut state = serializer.serialize_struct("Architecture", 2)?;
        state.serialize_field("nodes", &self.order)?;
        state.serialize_field("links", &links)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Architecture {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            nodes: Vec<Node>,
            links: Vec<LinkEntry>,
        }
        let raw = Raw::deserialize(deserializer)?;
        let mut arch = Architecture::new();
        for node in raw.nodes {
            arch.add_node(node);
        }
        for entry in raw.links {
            let (u, v) = entry.link;
            arch.add_connection_weighted(u, v, entry.weight)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(arch)
    }
}

impl Architecture {
    /// Encode to the canonical JSON shape.
    pub fn to_json(&self) -> ArchResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| ArchError::MalformedJson(e.to_string()))
    }

    /// Decode from the canonical JSON shape.
    pub fn from_json(value: &serde_json::Value) -> ArchResult<Architecture> {
        serde_json::from_value(value.clone()).map_err(|e| ArchError::MalformedJson(e.to_string()))
    }
}
