//! Seed graph implementation with arena-allocated nodes.
//!
//! A [`SeedGraph`] starts as a core node ringed by satellites and changes
//! through four operations:
//! - [`grow`](SeedGraph::grow): attach a new node to an existing one
//! - [`evolve`](SeedGraph::evolve): advance the generation and propagate knowledge
//! - [`activate`](SeedGraph::activate): move the single active flag
//! - [`growth_candidates`](SeedGraph::growth_candidates): rank attachment points
//!
//! Every operation takes `&self` and returns a new graph; the input is
//! never modified. Randomness comes from the caller's RNG and time from the
//! caller's `now`, so a seeded RNG and fixed timestamps reproduce a run
//! exactly.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::candidates::{rank_candidates, ScoreWeights};
use crate::error::{check_positive, check_range, check_unit, ConfigError};
use crate::node::{Connection, Millis, NodeId, SeedNode};
use crate::topology::GraphTopology;

/// Configuration for seed creation, growth and evolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Display size of the core node.
    pub core_size: f32,
    /// Number of satellites placed around the core at creation.
    pub satellite_count: usize,
    /// Distance of the satellites from the core.
    pub satellite_radius: f32,
    /// Range of initial satellite knowledge: `[min, max)`.
    pub satellite_knowledge: (f32, f32),
    /// Range of initial satellite size: `[min, max)`.
    pub satellite_size: (f32, f32),
    /// Strength of the core-satellite connections.
    pub satellite_strength: f32,
    /// Range of distances between a grown node and its source.
    pub grow_distance: (f32, f32),
    /// Range of the fraction of source knowledge a grown node inherits.
    pub transfer_factor: (f32, f32),
    /// Upper bound on a grown node's initial knowledge.
    pub transfer_cap: f32,
    /// Range of grown node sizes.
    pub grown_size: (f32, f32),
    /// Strength of the connection between a grown node and its source.
    pub primary_strength: f32,
    /// Strength of the optional extra connection made during growth.
    pub secondary_strength: f32,
    /// Probability of the extra connection once complexity allows it.
    pub secondary_edge_prob: f32,
    /// Complexity above which extra connections may be made.
    pub secondary_min_complexity: f32,
    /// Multiplier applied to core knowledge each evolution.
    pub core_learning_rate: f32,
    /// Fraction of each neighbor's knowledge flowing in per evolution.
    pub influx_rate: f32,
    /// Relative size growth per unit of knowledge per evolution.
    pub size_growth_rate: f32,
    /// Size cap for non-core nodes under evolution.
    pub max_node_size: f32,
    /// Nodes need knowledge strictly above this to be growth candidates.
    pub candidate_threshold: f32,
    /// Maximum number of growth candidates returned.
    pub max_candidates: usize,
    /// Weights of the growth score factors.
    pub score_weights: ScoreWeights,
    /// Degree scoring highest on the connection factor.
    pub ideal_degree: f32,
    /// Degree distance at which the connection factor reaches zero.
    pub degree_falloff: f32,
    /// Age after which the recency bonus is gone.
    pub age_window_ms: Millis,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            core_size: 20.0,
            satellite_count: 5,
            satellite_radius: 60.0,
            satellite_knowledge: (0.2, 0.5),
            satellite_size: (6.0, 10.0),
            satellite_strength: 0.5,
            grow_distance: (30.0, 80.0),
            transfer_factor: (0.4, 0.7),
            transfer_cap: 0.9,
            grown_size: (4.0, 12.0),
            primary_strength: 0.7,
            secondary_strength: 0.3,
            secondary_edge_prob: 0.3,
            secondary_min_complexity: 3.0,
            core_learning_rate: 1.05,
            influx_rate: 0.1,
            size_growth_rate: 0.05,
            max_node_size: 15.0,
            candidate_threshold: 0.3,
            max_candidates: 3,
            score_weights: ScoreWeights::default(),
            ideal_degree: 3.0,
            degree_falloff: 5.0,
            age_window_ms: 60_000,
        }
    }
}

impl GrowthConfig {
    /// Check every field for values the engine cannot sample from.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.satellite_count == 0 {
            return Err(ConfigError::NoSatellites);
        }
        check_range("satellite_knowledge", self.satellite_knowledge)?;
        check_range("satellite_size", self.satellite_size)?;
        check_range("grow_distance", self.grow_distance)?;
        check_range("transfer_factor", self.transfer_factor)?;
        check_range("grown_size", self.grown_size)?;

        check_unit("satellite_strength", self.satellite_strength)?;
        check_unit("primary_strength", self.primary_strength)?;
        check_unit("secondary_strength", self.secondary_strength)?;
        check_unit("secondary_edge_prob", self.secondary_edge_prob)?;
        check_unit("transfer_cap", self.transfer_cap)?;
        check_unit("influx_rate", self.influx_rate)?;
        check_unit("candidate_threshold", self.candidate_threshold)?;

        check_positive("core_size", self.core_size)?;
        check_positive("satellite_radius", self.satellite_radius)?;
        check_positive("core_learning_rate", self.core_learning_rate)?;
        check_positive("max_node_size", self.max_node_size)?;
        check_positive("degree_falloff", self.degree_falloff)?;
        if self.age_window_ms <= 0 {
            return Err(ConfigError::ZeroInterval {
                field: "age_window_ms",
            });
        }
        Ok(())
    }
}

/// Summary figures of a seed graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedStats {
    /// Evolution generation.
    pub generation: u64,
    /// Complexity as of the last evolution.
    pub complexity: f32,
    /// Number of nodes.
    pub node_count: usize,
    /// Number of connections, duplicates included.
    pub connection_count: usize,
    /// Mean knowledge over all nodes.
    pub average_knowledge: f32,
}

/// A growing graph of knowledge-carrying nodes.
///
/// Uses arena-allocated storage; nodes are addressed publicly by label and
/// internally by [`NodeId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedGraph {
    /// Arena storage for nodes. Nodes are never removed.
    pub nodes: SlotMap<NodeId, SeedNode>,
    /// Connections in creation order.
    pub connections: Vec<Connection>,
    /// ID of the core node.
    pub core_id: NodeId,
    /// Evolution generation, starting at 1.
    pub generation: u64,
    /// Complexity recorded by the last evolution.
    pub complexity: f32,
    /// Time of the last evolution (or creation).
    pub last_evolution: Millis,
    /// Configuration used for this graph.
    #[serde(default)]
    pub config: GrowthConfig,
}

impl SeedGraph {
    /// Create a graph holding only the core node.
    #[must_use]
    pub fn core_only(config: GrowthConfig, now: Millis) -> Self {
        let mut nodes: SlotMap<NodeId, SeedNode> = SlotMap::with_key();
        let core_id = nodes.insert(SeedNode::core(config.core_size, now));

        Self {
            nodes,
            connections: Vec::new(),
            core_id,
            generation: 1,
            complexity: 1.0,
            last_evolution: now,
            config,
        }
    }

    /// Create the initial seed: the core plus satellites evenly spaced on a circle.
    ///
    /// Satellites are labeled `node-1` through `node-N`, each linked only to the core.
    #[allow(clippy::cast_precision_loss)] // Satellite counts are small
    #[must_use]
    pub fn initialize<R: Rng>(config: GrowthConfig, rng: &mut R, now: Millis) -> Self {
        let mut graph = Self::core_only(config, now);
        let count = graph.config.satellite_count;

        for i in 0..count {
            let angle = TAU * i as f32 / count as f32;
            let radius = graph.config.satellite_radius;
            let knowledge = sample(rng, graph.config.satellite_knowledge);
            let size = sample(rng, graph.config.satellite_size);

            let node = SeedNode::new(
                format!("node-{}", i + 1),
                (angle.cos() * radius, angle.sin() * radius),
                knowledge,
                size,
                now,
            );
            let id = graph.nodes.insert(node);
            graph.link(graph.core_id, id, graph.config.satellite_strength);
        }

        tracing::debug!(nodes = graph.nodes.len(), "seed initialized");
        graph
    }

    /// Grow a new node from `source`.
    ///
    /// The new node is placed at a random offset from the source, inherits a
    /// capped fraction of its knowledge and is linked to it. When `complexity`
    /// exceeds [`GrowthConfig::secondary_min_complexity`], a second link to a
    /// random other node is made with probability
    /// [`GrowthConfig::secondary_edge_prob`]. That link is not deduplicated
    /// against existing ones.
    ///
    /// Returns an unchanged copy if `source` does not exist.
    #[must_use]
    pub fn grow<R: Rng>(&self, source: &str, complexity: f32, rng: &mut R, now: Millis) -> Self {
        let mut next = self.clone();
        let Some(source_id) = next.node_id(source) else {
            tracing::trace!(source, "grow skipped: unknown source");
            return next;
        };

        let config = &next.config;
        let parent = &next.nodes[source_id];

        let angle = rng.random::<f32>() * TAU;
        let distance = sample(rng, config.grow_distance);
        let transfer = parent.knowledge * sample(rng, config.transfer_factor);
        let size = sample(rng, config.grown_size);

        let label = format!("node-{}", next.nodes.len());
        let node = SeedNode::new(
            label,
            (
                parent.x + angle.cos() * distance,
                parent.y + angle.sin() * distance,
            ),
            transfer.min(config.transfer_cap),
            size,
            now,
        );

        // Picked before the new node exists, so it can never be chosen.
        let secondary = if complexity > config.secondary_min_complexity
            && rng.random::<f32>() < config.secondary_edge_prob
        {
            let others: Vec<NodeId> = next.nodes.keys().filter(|&id| id != source_id).collect();
            (!others.is_empty()).then(|| others[rng.random_range(0..others.len())])
        } else {
            None
        };

        let (primary_strength, secondary_strength) =
            (config.primary_strength, config.secondary_strength);
        let new_id = next.nodes.insert(node);
        next.link(source_id, new_id, primary_strength);
        if let Some(other) = secondary {
            next.link(other, new_id, secondary_strength);
        }

        tracing::debug!(
            source,
            node = %next.nodes[new_id].label,
            secondary = ?secondary.map(|id| next.nodes[id].label.as_str()),
            "grew node"
        );
        next
    }

    /// Advance one generation.
    ///
    /// Bumps the generation, records the current complexity and propagates
    /// knowledge: the core learns by [`GrowthConfig::core_learning_rate`],
    /// every other node absorbs [`GrowthConfig::influx_rate`] of each
    /// neighbor's knowledge and grows in size. All neighbor reads see the
    /// knowledge from before this call.
    #[must_use]
    pub fn evolve(&self, now: Millis) -> Self {
        let snapshot = GraphTopology::from_seed(self);
        let mut next = self.clone();

        next.generation += 1;
        next.last_evolution = now;
        next.complexity = next.compute_complexity();

        let config = &next.config;
        let core_id = next.core_id;
        for (id, node) in &mut next.nodes {
            if id == core_id {
                node.knowledge = (node.knowledge * config.core_learning_rate).clamp(0.0, 1.0);
                continue;
            }

            let influx = snapshot
                .node_index(id)
                .map_or(0.0, |idx| snapshot.influx(idx, config.influx_rate));
            node.knowledge = (node.knowledge + influx).clamp(0.0, 1.0);
            node.size = (node.size * (1.0 + node.knowledge * config.size_growth_rate))
                .min(config.max_node_size);
        }

        tracing::debug!(
            generation = next.generation,
            complexity = next.complexity,
            "seed evolved"
        );
        next
    }

    /// Measure complexity: `sqrt(nodes × connections) × (1 + average knowledge)`.
    ///
    /// NaN for a graph without nodes.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn compute_complexity(&self) -> f32 {
        let nodes = self.nodes.len() as f32;
        let connections = self.connections.len() as f32;
        (nodes * connections).sqrt() * (1.0 + self.average_knowledge())
    }

    /// Make `label` the single active node.
    ///
    /// All other nodes are deactivated. An unknown label leaves no node active.
    #[must_use]
    pub fn activate(&self, label: &str) -> Self {
        let mut next = self.clone();
        for node in next.nodes.values_mut() {
            node.active = false;
        }
        match next.node_id(label) {
            Some(id) => next.nodes[id].active = true,
            None => tracing::trace!(label, "activate: unknown node, all cleared"),
        }
        next
    }

    /// Labels of the best nodes to grow from, best first.
    ///
    /// See [`rank_candidates`] for scoring and tie handling.
    #[must_use]
    pub fn growth_candidates(&self, now: Millis) -> Vec<String> {
        rank_candidates(self, now)
            .into_iter()
            .map(|(id, _)| self.nodes[id].label.clone())
            .collect()
    }

    /// Find a node by its label.
    #[must_use]
    pub fn node_id(&self, label: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.label == label)
            .map(|(id, _)| id)
    }

    /// Look up a node by its label.
    #[must_use]
    pub fn node(&self, label: &str) -> Option<&SeedNode> {
        self.node_id(label).map(|id| &self.nodes[id])
    }

    /// The core node.
    #[must_use]
    pub fn core(&self) -> &SeedNode {
        &self.nodes[self.core_id]
    }

    /// Labels of a node's neighbors, duplicates included.
    ///
    /// Empty for an unknown label.
    #[must_use]
    pub fn neighbor_labels(&self, label: &str) -> Vec<&str> {
        self.node(label)
            .map(|n| {
                n.neighbors
                    .iter()
                    .filter_map(|&id| self.nodes.get(id))
                    .map(|n| n.label.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Label of the active node, if any.
    #[must_use]
    pub fn active_label(&self) -> Option<&str> {
        self.nodes
            .values()
            .find(|n| n.active)
            .map(|n| n.label.as_str())
    }

    /// Number of nodes.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of connections, duplicates included.
    #[inline]
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Mean knowledge over all nodes; NaN when there are none.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn average_knowledge(&self) -> f32 {
        let total: f32 = self.nodes.values().map(|n| n.knowledge).sum();
        total / self.nodes.len() as f32
    }

    /// Whether every node can be reached from the core.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let topo = GraphTopology::from_seed(self);
        topo.node_index(self.core_id)
            .is_some_and(|core| topo.reachable_from(core).into_iter().all(|r| r))
    }

    /// Summary figures for display.
    #[must_use]
    pub fn stats(&self) -> SeedStats {
        SeedStats {
            generation: self.generation,
            complexity: self.complexity,
            node_count: self.node_count(),
            connection_count: self.connection_count(),
            average_knowledge: self.average_knowledge(),
        }
    }

    /// Record a connection and add each endpoint to the other's neighbor list.
    fn link(&mut self, source: NodeId, target: NodeId, strength: f32) {
        self.nodes[source].neighbors.push(target);
        self.nodes[target].neighbors.push(source);
        self.connections
            .push(Connection::new(source, target, strength));
    }
}

/// Draw uniformly from `[min, max)`.
#[inline]
fn sample<R: Rng>(rng: &mut R, (min, max): (f32, f32)) -> f32 {
    if min.is_nan() || max.is_nan() || min >= max {
        return min;
    }
    // Float ranges in rand may round onto the upper bound.
    let value = rng.random_range(min..max);
    if value < max {
        value
    } else {
        next_below(max).max(min)
    }
}

/// Largest `f32` strictly below a finite `x`.
fn next_below(x: f32) -> f32 {
    if x == 0.0 {
        -f32::from_bits(1)
    } else if x > 0.0 {
        f32::from_bits(x.to_bits() - 1)
    } else {
        f32::from_bits(x.to_bits() + 1)
    }
}
