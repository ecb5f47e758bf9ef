//! Adjacency snapshots of seed graphs in CSR format.
//!
//! A [`GraphTopology`] freezes a graph's neighbor lists and per-node
//! knowledge at construction time. Evolution reads every neighbor's
//! knowledge through this snapshot, so one evolution pass never observes a
//! value written earlier in the same pass.
//!
//! Neighbor lists are copied as-is: a pair joined by two connections
//! contributes twice to the neighbor iteration of each endpoint.

use std::collections::VecDeque;

use crate::node::NodeId;
use crate::seed::SeedGraph;

/// Read-only CSR view of a seed graph's adjacency and knowledge.
#[derive(Debug, Clone)]
pub struct GraphTopology {
    /// Number of nodes in the snapshot.
    node_count: usize,
    /// Maps NodeId to dense index, sorted by NodeId for binary search.
    node_to_idx: Vec<(NodeId, usize)>,
    /// Maps dense index back to NodeId (arena order).
    idx_to_node: Vec<NodeId>,
    /// CSR offsets. Length = node_count + 1.
    offsets: Vec<usize>,
    /// CSR neighbor indices. `targets[offsets[i]..offsets[i+1]]` are the neighbors of node i.
    targets: Vec<usize>,
    /// Knowledge of each node at snapshot time.
    knowledge: Vec<f32>,
}

impl GraphTopology {
    /// Snapshot a graph's adjacency and knowledge.
    ///
    /// Neighbor entries that do not resolve to a live node are skipped.
    #[must_use]
    pub fn from_seed(graph: &SeedGraph) -> Self {
        let idx_to_node: Vec<NodeId> = graph.nodes.keys().collect();
        let node_count = idx_to_node.len();

        let mut node_to_idx: Vec<(NodeId, usize)> = idx_to_node
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();
        node_to_idx.sort_by_key(|(id, _)| *id);

        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::new();
        let mut knowledge = Vec::with_capacity(node_count);
        offsets.push(0);

        for &id in &idx_to_node {
            let node = &graph.nodes[id];
            knowledge.push(node.knowledge);
            targets.extend(
                node.neighbors
                    .iter()
                    .filter_map(|&n| lookup_idx(&node_to_idx, n)),
            );
            offsets.push(targets.len());
        }

        Self {
            node_count,
            node_to_idx,
            idx_to_node,
            offsets,
            targets,
            knowledge,
        }
    }

    /// Get the dense index for a NodeId.
    #[inline]
    pub fn node_index(&self, id: NodeId) -> Option<usize> {
        lookup_idx(&self.node_to_idx, id)
    }

    /// Get the NodeId for a dense index.
    #[inline]
    pub fn node_id(&self, idx: usize) -> Option<NodeId> {
        self.idx_to_node.get(idx).copied()
    }

    /// Number of nodes in the topology.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Iterate over the neighbors of a node, duplicates included.
    #[inline]
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        self.targets[start..end].iter().copied()
    }

    /// Number of neighbor entries of a node.
    #[inline]
    #[must_use]
    pub fn degree(&self, idx: usize) -> usize {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    /// Knowledge of a node when the snapshot was taken.
    #[inline]
    #[must_use]
    pub fn knowledge(&self, idx: usize) -> f32 {
        self.knowledge[idx]
    }

    /// Knowledge flowing into a node from its neighbors: `Σ neighbor.knowledge × rate`.
    #[must_use]
    pub fn influx(&self, idx: usize, rate: f32) -> f32 {
        self.neighbors(idx).map(|n| self.knowledge[n] * rate).sum()
    }

    /// Breadth-first reachability from a start node.
    ///
    /// Returns a vector indexed by dense node index.
    #[must_use]
    pub fn reachable_from(&self, start: usize) -> Vec<bool> {
        let mut visited = vec![false; self.node_count];
        if start >= self.node_count {
            return visited;
        }

        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited[start] = true;

        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        visited
    }
}

#[inline]
fn lookup_idx(node_to_idx: &[(NodeId, usize)], id: NodeId) -> Option<usize> {
    node_to_idx
        .binary_search_by_key(&id, |(k, _)| *k)
        .ok()
        .map(|pos| node_to_idx[pos].1)
}
