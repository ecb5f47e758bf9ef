//! Ranking of nodes as attachment points for new growth.
//!
//! A node's [`GrowthScore`] combines three factors:
//! - **knowledge**: `knowledge × 2`, the dominant term
//! - **connection**: `1 − |ideal_degree − degree| / degree_falloff`, favoring
//!   moderately connected nodes (can go negative for hubs)
//! - **age**: `max(0, 1 − age / age_window)`, a bonus that fades as the node ages

use serde::{Deserialize, Serialize};

use crate::node::{Millis, NodeId, SeedNode};
use crate::seed::{GrowthConfig, SeedGraph};

/// Weights applied to the factors of a [`GrowthScore`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the knowledge factor.
    pub knowledge: f32,
    /// Weight of the connection factor.
    pub connection: f32,
    /// Weight of the age factor.
    pub age: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            knowledge: 0.5,
            connection: 0.3,
            age: 0.2,
        }
    }
}

/// Unweighted factors of a node's growth score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthScore {
    /// `knowledge × 2`.
    pub knowledge: f32,
    /// Closeness of the node's degree to the ideal degree.
    pub connection: f32,
    /// Recency bonus in `[0, 1]`.
    pub age: f32,
}

impl GrowthScore {
    /// Score a node at time `now`.
    #[allow(clippy::cast_precision_loss)] // Degrees and ages are small
    #[must_use]
    pub fn of(node: &SeedNode, now: Millis, config: &GrowthConfig) -> Self {
        let degree = node.degree() as f32;
        let age = (now - node.created_at) as f32;
        Self {
            knowledge: node.knowledge * 2.0,
            connection: 1.0 - (config.ideal_degree - degree).abs() / config.degree_falloff,
            age: (1.0 - age / config.age_window_ms as f32).max(0.0),
        }
    }

    /// Weighted sum of the factors.
    #[inline]
    #[must_use]
    pub fn total(&self, weights: &ScoreWeights) -> f32 {
        self.knowledge * weights.knowledge
            + self.connection * weights.connection
            + self.age * weights.age
    }
}

/// Rank the nodes eligible for growth, best first.
///
/// Only nodes with knowledge strictly above `config.candidate_threshold`
/// qualify. Equal scores keep arena order. At most `config.max_candidates`
/// entries are returned.
#[must_use]
pub fn rank_candidates(graph: &SeedGraph, now: Millis) -> Vec<(NodeId, f32)> {
    let config = &graph.config;
    let mut scored: Vec<(NodeId, f32)> = graph
        .nodes
        .iter()
        .filter(|(_, n)| n.knowledge > config.candidate_threshold)
        .map(|(id, n)| (id, GrowthScore::of(n, now, config).total(&config.score_weights)))
        .collect();

    // Stable sort: ties stay in arena order.
    scored.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    scored.truncate(config.max_candidates);
    scored
}
