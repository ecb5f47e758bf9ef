//! Node and connection types for seed graphs.
//!
//! This module defines the building blocks of a [`SeedGraph`](crate::SeedGraph):
//! - [`SeedNode`]: A labeled point carrying knowledge, size and adjacency
//! - [`Connection`]: A weighted, undirected link between two nodes

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// Label of the root node every seed grows from.
pub const CORE_LABEL: &str = "core";

new_key_type! {
    /// Arena key for a node within a seed graph.
    ///
    /// Keys are internal handles; the stable public identifier of a node
    /// is its [`SeedNode::label`].
    pub struct NodeId;
}

/// A node in the seed graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedNode {
    /// Unique label (`"core"` or `"node-N"`). Never reused within a graph.
    pub label: String,
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
    /// Adjacent nodes. Both endpoints of every connection list each other;
    /// a pair joined twice appears twice.
    pub neighbors: Vec<NodeId>,
    /// Accumulated knowledge in `[0, 1]`.
    pub knowledge: f32,
    /// Whether this node is the currently activated one.
    pub active: bool,
    /// Display size.
    pub size: f32,
    /// Creation time.
    pub created_at: Millis,
}

impl SeedNode {
    /// Create the core node at the origin with full knowledge.
    #[must_use]
    pub fn core(size: f32, created_at: Millis) -> Self {
        Self {
            label: CORE_LABEL.to_string(),
            x: 0.0,
            y: 0.0,
            neighbors: Vec::new(),
            knowledge: 1.0,
            active: true,
            size,
            created_at,
        }
    }

    /// Create an inactive node with no neighbors yet.
    #[must_use]
    pub fn new(
        label: String,
        (x, y): (f32, f32),
        knowledge: f32,
        size: f32,
        created_at: Millis,
    ) -> Self {
        Self {
            label,
            x,
            y,
            neighbors: Vec::new(),
            knowledge: knowledge.clamp(0.0, 1.0),
            active: false,
            size,
            created_at,
        }
    }

    /// Whether this is the core node.
    #[inline]
    #[must_use]
    pub fn is_core(&self) -> bool {
        self.label == CORE_LABEL
    }

    /// Number of neighbor entries, counting duplicates.
    #[inline]
    #[must_use]
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    /// Whether the node was created less than `window` milliseconds before `now`.
    #[must_use]
    pub fn is_new(&self, now: Millis, window: Millis) -> bool {
        self.created_at > now - window
    }
}

/// A link between two nodes.
///
/// Connections are undirected for propagation purposes; `source` records
/// which endpoint already existed when the link was made.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Endpoint that existed before the link was made.
    pub source: NodeId,
    /// Endpoint the link was made for.
    pub target: NodeId,
    /// Link strength in `[0, 1]`.
    pub strength: f32,
}

impl Connection {
    /// Create a new connection.
    #[must_use]
    pub fn new(source: NodeId, target: NodeId, strength: f32) -> Self {
        Self {
            source,
            target,
            strength: strength.clamp(0.0, 1.0),
        }
    }

    /// Whether `id` is one of the two endpoints.
    #[inline]
    #[must_use]
    pub fn touches(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_node_creation() {
        let core = SeedNode::core(20.0, 1_000);
        assert!(core.is_core());
        assert!(core.active);
        assert!((core.knowledge - 1.0).abs() < 1e-6);
        assert_eq!((core.x, core.y), (0.0, 0.0));
        assert_eq!(core.degree(), 0);
    }

    #[test]
    fn test_node_knowledge_is_clamped() {
        let high = SeedNode::new("node-1".into(), (1.0, 2.0), 1.7, 5.0, 0);
        assert!((high.knowledge - 1.0).abs() < 1e-6);

        let low = SeedNode::new("node-2".into(), (1.0, 2.0), -0.3, 5.0, 0);
        assert!(low.knowledge.abs() < 1e-6);
        assert!(!low.active);
        assert!(!low.is_core());
    }

    #[test]
    fn test_is_new_window() {
        let node = SeedNode::new("node-1".into(), (0.0, 0.0), 0.5, 5.0, 10_000);
        assert!(node.is_new(12_000, 5_000));
        assert!(!node.is_new(15_000, 5_000));
        assert!(!node.is_new(20_000, 5_000));
    }

    #[test]
    fn test_connection_creation() {
        use slotmap::SlotMap;

        let mut nodes: SlotMap<NodeId, SeedNode> = SlotMap::with_key();
        let a = nodes.insert(SeedNode::core(20.0, 0));
        let b = nodes.insert(SeedNode::new("node-1".into(), (1.0, 0.0), 0.3, 6.0, 0));
        let c = nodes.insert(SeedNode::new("node-2".into(), (2.0, 0.0), 0.3, 6.0, 0));

        let conn = Connection::new(a, b, 0.5);
        assert_eq!(conn.source, a);
        assert_eq!(conn.target, b);
        assert!((conn.strength - 0.5).abs() < 1e-6);
        assert!(conn.touches(a));
        assert!(conn.touches(b));
        assert!(!conn.touches(c));
    }
}
