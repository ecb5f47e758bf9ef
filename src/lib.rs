//! # Symbios Seed
//!
//! A growth engine for small knowledge-carrying graphs: a core node ringed by
//! satellites sprouts new nodes, links them into the network and propagates
//! knowledge along the links generation by generation.
//!
//! ## Features
//!
//! - **Value semantics**: every operation takes `&self` and returns a new
//!   [`SeedGraph`]; inputs are never mutated
//! - **Injectable randomness and time**: operations take any `rand::Rng` and
//!   an explicit timestamp, so seeded runs are reproducible
//! - **Arena-Graph Model**: `SlotMap` node storage with stable string labels
//! - **Snapshot propagation**: evolution reads neighbor knowledge from a CSR
//!   snapshot taken before the pass
//! - **Tick driver**: [`GrowthDriver`] replaces interval timers with explicit
//!   ticks, speed control, a code-level timer and a bounded event journal
//!
//! ## Quick Start
//!
//! ```rust
//! use symbios_seed::{GrowthConfig, SeedGraph};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let seed = SeedGraph::initialize(GrowthConfig::default(), &mut rng, 0);
//!
//! let grown = seed.grow("core", seed.complexity, &mut rng, 1_000);
//! let evolved = grown.evolve(2_000);
//!
//! assert_eq!(evolved.node_count(), 7);
//! assert_eq!(evolved.generation, 2);
//! println!("best growth points: {:?}", evolved.growth_candidates(2_000));
//! ```
//!
//! ## Driving on ticks
//!
//! ```rust
//! use symbios_seed::{DriverConfig, GrowthConfig, GrowthDriver, ManualClock};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut driver = GrowthDriver::new(
//!     GrowthConfig::default(),
//!     DriverConfig::with_speed(2.0),
//!     ChaCha8Rng::seed_from_u64(7),
//!     ManualClock::starting_at(0),
//! )?;
//!
//! for _ in 0..20 {
//!     driver.clock_mut().advance(1_000);
//!     for event in driver.tick() {
//!         println!("{event}");
//!     }
//! }
//! assert!(driver.graph().node_count() > 6);
//! # Ok::<(), symbios_seed::ConfigError>(())
//! ```
//!
//! ## Growth rules
//!
//! - **Grow**: the new node `node-N` (N = current node count) lands 30-80
//!   units from its source, inherits 40-70% of the source's knowledge
//!   (capped at 0.9) and links to it. Above complexity 3, a 30% chance adds
//!   a second link to a random other node. Duplicate links are allowed.
//! - **Evolve**: generation + 1; complexity becomes
//!   `sqrt(nodes × connections) × (1 + average knowledge)`; the core gains 5%
//!   knowledge, every other node gains 10% of each neighbor's knowledge and
//!   grows in size up to 15.
//! - **Candidates**: nodes above 0.3 knowledge, ranked by knowledge, closeness
//!   to three neighbors and recency; top three.

pub mod candidates;
pub mod clock;
pub mod code;
pub mod driver;
pub mod error;
pub mod flavor;
pub mod knowledge;
pub mod node;
pub mod seed;
pub mod topology;

// Re-exports for convenience
pub use candidates::{rank_candidates, GrowthScore, ScoreWeights};
pub use clock::{Clock, ManualClock, SystemClock};
pub use code::{CodeEvolution, CodeLevel};
pub use driver::{DriverConfig, DriverEvent, GrowthDriver};
pub use error::ConfigError;
pub use knowledge::KnowledgeLevel;
pub use node::{Connection, Millis, NodeId, SeedNode, CORE_LABEL};
pub use seed::{GrowthConfig, SeedGraph, SeedStats};
pub use topology::GraphTopology;

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_operations_do_not_mutate_input() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let seed = SeedGraph::initialize(GrowthConfig::default(), &mut rng, 0);
        let before = serde_json::to_value(&seed).unwrap();

        let _ = seed.grow(CORE_LABEL, 10.0, &mut rng, 10);
        let _ = seed.evolve(20);
        let _ = seed.activate("node-2");
        let _ = seed.growth_candidates(30);

        assert_eq!(serde_json::to_value(&seed).unwrap(), before);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut rng = ChaCha8Rng::seed_from_u64(123);
        let mut seed = SeedGraph::initialize(GrowthConfig::default(), &mut rng, 0);
        for _ in 0..5 {
            seed = seed.grow(CORE_LABEL, 10.0, &mut rng, 0).evolve(0);
        }

        let json = serde_json::to_string(&seed).expect("Serialization failed");
        let restored: SeedGraph = serde_json::from_str(&json).expect("Deserialization failed");

        assert_eq!(seed.node_count(), restored.node_count());
        assert_eq!(seed.connections, restored.connections);
        assert_eq!(seed.generation, restored.generation);
        assert_eq!(seed.core_id, restored.core_id);
        assert_eq!(seed.config, restored.config);
        assert_eq!(seed.growth_candidates(0), restored.growth_candidates(0));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = |seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut graph = SeedGraph::initialize(GrowthConfig::default(), &mut rng, 0);
            for step in 0..10 {
                let source = graph.growth_candidates(step)[0].clone();
                graph = graph.grow(&source, graph.compute_complexity(), &mut rng, step);
            }
            serde_json::to_value(&graph).unwrap()
        };

        assert_eq!(run(9), run(9));
        assert_ne!(run(9), run(10));
    }
}
