//! Tick-driven orchestration of a seed graph.
//!
//! [`GrowthDriver`] owns the current [`SeedGraph`] and advances it from
//! explicit [`tick`](GrowthDriver::tick) calls instead of background timers.
//!
//! ## Tick protocol
//!
//! 1. **Gate**: a paused driver does nothing.
//! 2. **Evolve timer**: when due, re-arm it; evolve only if the measured
//!    complexity exceeds `evolve_min_complexity` and the last evolution is
//!    older than the (speed-scaled) cooldown.
//! 3. **Grow timer**: when due, re-arm it; pick one of the growth candidates
//!    uniformly and grow from it with the measured complexity.
//! 4. **Code timer**: when due, re-arm it and count one code iteration;
//!    report the code level when it changes.
//! 5. **Journal**: record what happened, newest first, bounded.
//!
//! Each timer fires at most once per tick, so a clock that jumps far ahead
//! does not trigger a burst of catch-up steps. Deadlines saturate at
//! `Millis::MAX`, so a very slow speed parks a timer instead of overflowing.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::code::{CodeEvolution, CodeLevel};
use crate::error::{check_positive, ConfigError};
use crate::flavor::{EVOLUTION_STRATEGIES, LEARNING_CONCEPTS};
use crate::knowledge::KnowledgeLevel;
use crate::node::Millis;
use crate::seed::{GrowthConfig, SeedGraph};

/// Timer configuration for a [`GrowthDriver`].
///
/// All intervals are divided by `speed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Speed multiplier; 2.0 runs every timer twice as often.
    pub speed: f32,
    /// Whether the driver starts running.
    pub auto_evolve: bool,
    /// Period of the evolve timer.
    pub evolve_interval_ms: Millis,
    /// Period of the grow timer.
    pub grow_interval_ms: Millis,
    /// Period of the code timer.
    pub code_interval_ms: Millis,
    /// Minimum time between two evolutions.
    pub evolve_cooldown_ms: Millis,
    /// Complexity the graph must exceed before it evolves.
    pub evolve_min_complexity: f32,
    /// Number of journal entries kept.
    pub journal_capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            auto_evolve: true,
            evolve_interval_ms: 3_000,
            grow_interval_ms: 5_000,
            code_interval_ms: 8_000,
            evolve_cooldown_ms: 15_000,
            evolve_min_complexity: 2.0,
            journal_capacity: 10,
        }
    }
}

impl DriverConfig {
    /// Default timers at the given speed.
    #[must_use]
    pub fn with_speed(speed: f32) -> Self {
        Self {
            speed,
            ..Default::default()
        }
    }

    /// Validate speed and intervals.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotPositive`] for a bad speed and
    /// [`ConfigError::ZeroInterval`] for a non-positive timer period.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("speed", self.speed)?;
        for (field, value) in [
            ("evolve_interval_ms", self.evolve_interval_ms),
            ("grow_interval_ms", self.grow_interval_ms),
            ("code_interval_ms", self.code_interval_ms),
            ("evolve_cooldown_ms", self.evolve_cooldown_ms),
        ] {
            if value <= 0 {
                return Err(ConfigError::ZeroInterval { field });
            }
        }
        Ok(())
    }

    /// Scale an interval by the speed, never below 1 ms.
    ///
    /// Speeds so small that the result does not fit saturate to `Millis::MAX`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn scaled(&self, ms: Millis) -> Millis {
        ((ms as f64 / f64::from(self.speed)).round() as Millis).max(1)
    }
}

/// Something the driver did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DriverEvent {
    /// The driver started running on construction.
    Started,
    /// The graph advanced to a new generation using a named strategy.
    Evolved { generation: u64, strategy: String },
    /// A node was grown while learning a concept.
    Grew {
        source: String,
        node: String,
        concept: String,
        /// Whole percent, 0 to 99.
        proficiency: u8,
    },
    /// The code timer moved to a new level.
    CodeLevelChanged { level: CodeLevel },
    /// A node was activated; `level` is `None` for an unknown label.
    Activated {
        node: String,
        level: Option<KnowledgeLevel>,
    },
    /// Timers were stopped.
    Paused,
    /// Timers were restarted.
    Resumed,
    /// The speed multiplier changed.
    SpeedChanged { speed: f32 },
}

impl std::fmt::Display for DriverEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started => f.write_str("seed initialized - beginning growth"),
            Self::Evolved {
                generation,
                strategy,
            } => write!(f, "evolved to generation {generation} using {strategy}"),
            Self::Grew {
                source,
                node,
                concept,
                proficiency,
            } => write!(
                f,
                "grew {node} from {source} - learning: {concept} ({proficiency}% proficiency)"
            ),
            Self::CodeLevelChanged { level } => {
                write!(f, "code evolved to {level} level - implementing new algorithms")
            }
            Self::Activated { node, level } => match level {
                Some(level) => write!(f, "node {node} activated - {level} knowledge level"),
                None => write!(f, "node {node} activated - unknown knowledge level"),
            },
            Self::Paused => f.write_str("growth paused"),
            Self::Resumed => f.write_str("growth resumed"),
            Self::SpeedChanged { speed } => write!(f, "speed set to {speed}x"),
        }
    }
}

/// Owner of a seed graph that grows and evolves it on ticks.
#[derive(Debug)]
pub struct GrowthDriver<R, C = SystemClock> {
    graph: SeedGraph,
    rng: R,
    clock: C,
    config: DriverConfig,
    running: bool,
    next_evolve_at: Millis,
    next_grow_at: Millis,
    next_code_at: Millis,
    code: CodeEvolution,
    /// Source label of every growth, oldest first.
    history: Vec<String>,
    /// Newest first.
    journal: VecDeque<DriverEvent>,
}

impl<R: Rng, C: Clock> GrowthDriver<R, C> {
    /// Create a fresh seed and a driver for it.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if either configuration is invalid.
    pub fn new(
        growth: GrowthConfig,
        config: DriverConfig,
        mut rng: R,
        clock: C,
    ) -> Result<Self, ConfigError> {
        growth.validate()?;
        let graph = SeedGraph::initialize(growth, &mut rng, clock.now_ms());
        Self::with_graph(graph, config, rng, clock)
    }

    /// Drive an existing graph.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` or the graph's own growth
    /// configuration is invalid.
    pub fn with_graph(
        graph: SeedGraph,
        config: DriverConfig,
        rng: R,
        clock: C,
    ) -> Result<Self, ConfigError> {
        graph.config.validate()?;
        config.validate()?;
        let mut driver = Self {
            graph,
            rng,
            clock,
            running: config.auto_evolve,
            config,
            next_evolve_at: 0,
            next_grow_at: 0,
            next_code_at: 0,
            code: CodeEvolution::default(),
            history: Vec::new(),
            journal: VecDeque::new(),
        };
        driver.arm();
        if driver.running {
            driver.record(DriverEvent::Started);
        }
        Ok(driver)
    }

    /// Run every due timer once and return what happened.
    pub fn tick(&mut self) -> Vec<DriverEvent> {
        if !self.running {
            return Vec::new();
        }

        let now = self.clock.now_ms();
        let mut events = Vec::new();

        if now >= self.next_evolve_at {
            self.next_evolve_at = self.deadline(now, self.config.evolve_interval_ms);
            events.extend(self.evolve_step(now));
        }
        if now >= self.next_grow_at {
            self.next_grow_at = self.deadline(now, self.config.grow_interval_ms);
            events.extend(self.grow_step(now));
        }
        if now >= self.next_code_at {
            self.next_code_at = self.deadline(now, self.config.code_interval_ms);
            events.extend(self.code_step());
        }

        for event in &events {
            self.record(event.clone());
        }
        events
    }

    fn evolve_step(&mut self, now: Millis) -> Option<DriverEvent> {
        let complexity = self.graph.compute_complexity();
        let cooldown = self.config.scaled(self.config.evolve_cooldown_ms);
        if complexity <= self.config.evolve_min_complexity
            || now.saturating_sub(self.graph.last_evolution) <= cooldown
        {
            tracing::trace!(complexity, "evolve step skipped");
            return None;
        }

        self.graph = self.graph.evolve(now);
        let strategy =
            EVOLUTION_STRATEGIES[self.rng.random_range(0..EVOLUTION_STRATEGIES.len())];
        tracing::debug!(generation = self.graph.generation, strategy, "driver evolved seed");
        Some(DriverEvent::Evolved {
            generation: self.graph.generation,
            strategy: strategy.to_string(),
        })
    }

    fn grow_step(&mut self, now: Millis) -> Option<DriverEvent> {
        let candidates = self.graph.growth_candidates(now);
        if candidates.is_empty() {
            tracing::trace!("grow step skipped: no candidates");
            return None;
        }

        let source = candidates[self.rng.random_range(0..candidates.len())].clone();
        let complexity = self.graph.compute_complexity();
        self.graph = self.graph.grow(&source, complexity, &mut self.rng, now);

        // Every connection made by a growth targets the new node.
        let node = self
            .graph
            .connections
            .last()
            .map(|c| self.graph.nodes[c.target].label.clone())?;
        let concept = LEARNING_CONCEPTS[self.rng.random_range(0..LEARNING_CONCEPTS.len())];
        let proficiency = self.rng.random_range(0..100u8);
        tracing::debug!(source = %source, node = %node, concept, "driver grew node");

        self.history.push(source.clone());
        Some(DriverEvent::Grew {
            source,
            node,
            concept: concept.to_string(),
            proficiency,
        })
    }

    fn code_step(&mut self) -> Option<DriverEvent> {
        let level = self.code.step(&mut self.rng)?;
        tracing::debug!(level = %level, iterations = self.code.iterations, "code level changed");
        Some(DriverEvent::CodeLevelChanged { level })
    }

    /// Activate a node and journal its knowledge level.
    pub fn activate(&mut self, label: &str) -> DriverEvent {
        let level = self
            .graph
            .node(label)
            .map(|n| KnowledgeLevel::classify(n.knowledge));
        self.graph = self.graph.activate(label);

        let event = DriverEvent::Activated {
            node: label.to_string(),
            level,
        };
        self.record(event.clone());
        event
    }

    /// Stop the timers. No-op when already paused.
    pub fn pause(&mut self) {
        if self.running {
            self.running = false;
            tracing::info!("growth driver paused");
            self.record(DriverEvent::Paused);
        }
    }

    /// Restart the timers from the current time. No-op when already running.
    pub fn resume(&mut self) {
        if !self.running {
            self.running = true;
            self.arm();
            tracing::info!("growth driver resumed");
            self.record(DriverEvent::Resumed);
        }
    }

    /// Flip between running and paused. Returns whether the driver now runs.
    pub fn toggle(&mut self) -> bool {
        if self.running {
            self.pause();
        } else {
            self.resume();
        }
        self.running
    }

    /// Change the speed multiplier; running timers are re-armed at the new speed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotPositive`] for a zero, negative or non-finite speed.
    pub fn set_speed(&mut self, speed: f32) -> Result<(), ConfigError> {
        check_positive("speed", speed)?;
        self.config.speed = speed;
        if self.running {
            self.arm();
        }
        tracing::info!(speed, "growth driver speed changed");
        self.record(DriverEvent::SpeedChanged { speed });
        Ok(())
    }

    fn arm(&mut self) {
        let now = self.clock.now_ms();
        self.next_evolve_at = self.deadline(now, self.config.evolve_interval_ms);
        self.next_grow_at = self.deadline(now, self.config.grow_interval_ms);
        self.next_code_at = self.deadline(now, self.config.code_interval_ms);
    }

    fn deadline(&self, now: Millis, interval_ms: Millis) -> Millis {
        now.saturating_add(self.config.scaled(interval_ms))
    }

    fn record(&mut self, event: DriverEvent) {
        self.journal.push_front(event);
        self.journal.truncate(self.config.journal_capacity);
    }
}

impl<R, C> GrowthDriver<R, C> {
    /// The current graph.
    #[must_use]
    pub fn graph(&self) -> &SeedGraph {
        &self.graph
    }

    /// Take the current graph, dropping the driver.
    #[must_use]
    pub fn into_graph(self) -> SeedGraph {
        self.graph
    }

    /// Whether the timers are running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current speed multiplier.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.config.speed
    }

    /// Timer configuration.
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Code iterations, level and current snippet.
    #[must_use]
    pub fn code_evolution(&self) -> &CodeEvolution {
        &self.code
    }

    /// Source labels of all growths so far, oldest first.
    #[must_use]
    pub fn growth_history(&self) -> &[String] {
        &self.history
    }

    /// Recent events, newest first.
    pub fn journal(&self) -> impl Iterator<Item = &DriverEvent> + '_ {
        self.journal.iter()
    }

    /// Recent events rendered as messages, newest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.journal.iter().map(ToString::to_string).collect()
    }

    /// The driver's clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the clock, for manual clocks in simulations and tests.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    type TestDriver = GrowthDriver<ChaCha8Rng, ManualClock>;

    fn driver(config: DriverConfig) -> TestDriver {
        GrowthDriver::new(
            GrowthConfig::default(),
            config,
            ChaCha8Rng::seed_from_u64(42),
            ManualClock::starting_at(0),
        )
        .unwrap()
    }

    fn advance_and_tick(driver: &mut TestDriver, ms: Millis) -> Vec<DriverEvent> {
        driver.clock_mut().advance(ms);
        driver.tick()
    }

    #[test]
    fn test_starts_running() {
        let d = driver(DriverConfig::default());
        assert!(d.is_running());
        assert_eq!(d.journal().next(), Some(&DriverEvent::Started));
        assert_eq!(d.graph().node_count(), 6);
    }

    #[test]
    fn test_nothing_due_before_first_interval() {
        let mut d = driver(DriverConfig::default());
        assert!(advance_and_tick(&mut d, 2_999).is_empty());
        assert_eq!(d.graph().node_count(), 6);
    }

    #[test]
    fn test_grow_timer() {
        let mut d = driver(DriverConfig::default());
        advance_and_tick(&mut d, 3_000);
        let events = advance_and_tick(&mut d, 2_000);

        assert_eq!(events.len(), 1);
        let DriverEvent::Grew {
            source,
            node,
            concept,
            proficiency,
        } = &events[0]
        else {
            panic!("expected growth, got {events:?}");
        };
        assert_eq!(node, "node-6");
        assert_eq!(d.growth_history(), &[source.clone()]);
        assert_eq!(d.graph().node_count(), 7);
        assert!(d.graph().neighbor_labels("node-6").contains(&source.as_str()));
        assert!(LEARNING_CONCEPTS.contains(&concept.as_str()));
        assert!(*proficiency < 100);
    }

    #[test]
    fn test_evolution_waits_for_cooldown() {
        let mut d = driver(DriverConfig::default());
        let mut evolutions = Vec::new();
        for _ in 0..20 {
            for event in advance_and_tick(&mut d, 1_000) {
                if let DriverEvent::Evolved {
                    generation,
                    strategy,
                } = event
                {
                    assert!(EVOLUTION_STRATEGIES.contains(&strategy.as_str()));
                    evolutions.push((d.clock().now_ms(), generation));
                }
            }
        }

        // Evolve timer fires every 3 s but the cooldown holds it until > 15 s.
        assert_eq!(evolutions, vec![(18_000, 2)]);
        assert_eq!(d.graph().generation, 2);
        assert_eq!(d.graph().last_evolution, 18_000);
    }

    #[test]
    fn test_low_complexity_blocks_evolution() {
        let config = DriverConfig {
            evolve_min_complexity: 1_000.0,
            ..DriverConfig::default()
        };
        let mut d = driver(config);
        for _ in 0..20 {
            advance_and_tick(&mut d, 3_000);
        }
        assert_eq!(d.graph().generation, 1);
        assert!(d.graph().node_count() > 6);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut d = driver(DriverConfig::default());
        d.pause();
        assert!(!d.is_running());
        assert!(advance_and_tick(&mut d, 60_000).is_empty());
        assert_eq!(d.graph().node_count(), 6);

        d.resume();
        assert_eq!(d.journal().next(), Some(&DriverEvent::Resumed));
        // Timers re-armed from the resume time.
        assert!(advance_and_tick(&mut d, 4_000)
            .iter()
            .all(|e| !matches!(e, DriverEvent::Grew { .. })));
        let events = advance_and_tick(&mut d, 1_000);
        assert!(events.iter().any(|e| matches!(e, DriverEvent::Grew { .. })));

        assert!(!d.toggle());
        assert!(d.toggle());
    }

    #[test]
    fn test_not_running_without_auto_evolve() {
        let config = DriverConfig {
            auto_evolve: false,
            ..DriverConfig::default()
        };
        let mut d = driver(config);
        assert!(!d.is_running());
        assert_eq!(d.journal().count(), 0);
        assert!(advance_and_tick(&mut d, 10_000).is_empty());
    }

    #[test]
    fn test_speed_scales_intervals() {
        let mut d = driver(DriverConfig::with_speed(2.0));
        assert!(advance_and_tick(&mut d, 1_499).is_empty());
        advance_and_tick(&mut d, 1);
        let events = advance_and_tick(&mut d, 1_000);
        assert!(events.iter().any(|e| matches!(e, DriverEvent::Grew { .. })));

        d.set_speed(0.5).unwrap();
        assert!((d.speed() - 0.5).abs() < 1e-6);
        assert!(advance_and_tick(&mut d, 9_999)
            .iter()
            .all(|e| !matches!(e, DriverEvent::Grew { .. })));

        assert!(matches!(
            d.set_speed(0.0),
            Err(ConfigError::NotPositive { field: "speed", .. })
        ));
        assert!(d.set_speed(f32::NAN).is_err());
    }

    #[test]
    fn test_journal_is_bounded_and_newest_first() {
        let mut d = driver(DriverConfig::default());
        let mut last = None;
        for _ in 0..40 {
            let events = advance_and_tick(&mut d, 5_000);
            if let Some(event) = events.last() {
                last = Some(event.clone());
            }
        }

        assert_eq!(d.journal().count(), 10);
        assert_eq!(d.journal().next(), last.as_ref());
        assert_eq!(d.messages().len(), 10);
        assert_eq!(d.growth_history().len(), 40);
    }

    #[test]
    fn test_activate_reports_level() {
        let mut d = driver(DriverConfig::default());

        let event = d.activate("core");
        assert_eq!(
            event,
            DriverEvent::Activated {
                node: "core".into(),
                level: Some(KnowledgeLevel::High)
            }
        );
        assert_eq!(d.graph().active_label(), Some("core"));

        let event = d.activate("missing");
        assert_eq!(event.to_string(), "node missing activated - unknown knowledge level");
        assert_eq!(d.graph().active_label(), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = GrowthDriver::new(
            GrowthConfig::default(),
            DriverConfig {
                grow_interval_ms: 0,
                ..DriverConfig::default()
            },
            ChaCha8Rng::seed_from_u64(1),
            ManualClock::default(),
        );
        assert!(matches!(
            result,
            Err(ConfigError::ZeroInterval {
                field: "grow_interval_ms"
            })
        ));

        let result = GrowthDriver::new(
            GrowthConfig {
                satellite_count: 0,
                ..GrowthConfig::default()
            },
            DriverConfig::default(),
            ChaCha8Rng::seed_from_u64(1),
            ManualClock::default(),
        );
        assert!(matches!(result, Err(ConfigError::NoSatellites)));
    }

    #[test]
    fn test_invalid_graph_config_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut graph = SeedGraph::initialize(GrowthConfig::default(), &mut rng, 0);
        graph.config.transfer_cap = 1.5;

        let result = GrowthDriver::with_graph(
            graph,
            DriverConfig::default(),
            rng,
            ManualClock::default(),
        );
        assert!(matches!(
            result,
            Err(ConfigError::OutOfUnitRange {
                field: "transfer_cap",
                ..
            })
        ));
    }

    #[test]
    fn test_tiny_speed_parks_timers() {
        let start = 1_700_000_000_000;
        let config = DriverConfig::with_speed(1e-20);
        assert!(config.validate().is_ok());

        let mut d = GrowthDriver::new(
            GrowthConfig::default(),
            config,
            ChaCha8Rng::seed_from_u64(1),
            ManualClock::starting_at(start),
        )
        .unwrap();
        assert!(advance_and_tick(&mut d, 1_000_000_000).is_empty());

        d.set_speed(f32::MIN_POSITIVE).unwrap();
        d.pause();
        d.resume();
        assert!(advance_and_tick(&mut d, 1_000_000_000).is_empty());
        assert_eq!(d.graph().node_count(), 6);

        // Back at a normal speed the timers run again.
        d.set_speed(1.0).unwrap();
        let events = advance_and_tick(&mut d, 5_000);
        assert!(events.iter().any(|e| matches!(e, DriverEvent::Grew { .. })));
    }

    #[test]
    fn test_code_level_changes_after_thresholds() {
        let mut d = driver(DriverConfig::default());
        let mut changes = Vec::new();
        for _ in 0..20 {
            for event in advance_and_tick(&mut d, 8_000) {
                if let DriverEvent::CodeLevelChanged { level } = event {
                    changes.push((d.code_evolution().iterations, level));
                }
            }
        }

        assert_eq!(
            changes,
            vec![(6, CodeLevel::Intermediate), (16, CodeLevel::Advanced)]
        );
        assert_eq!(d.code_evolution().iterations, 20);
        assert!(CodeLevel::Advanced
            .patterns()
            .contains(&d.code_evolution().code_base().as_str()));
    }

    #[test]
    fn test_code_timer_waits_for_interval() {
        let mut d = driver(DriverConfig::with_speed(2.0));
        advance_and_tick(&mut d, 3_999);
        assert_eq!(d.code_evolution().iterations, 0);
        advance_and_tick(&mut d, 1);
        assert_eq!(d.code_evolution().iterations, 1);
        assert_eq!(d.code_evolution().level, CodeLevel::Basic);
    }

    #[test]
    fn test_event_messages() {
        assert_eq!(
            DriverEvent::Evolved {
                generation: 4,
                strategy: "Weight optimization".into()
            }
            .to_string(),
            "evolved to generation 4 using Weight optimization"
        );
        assert_eq!(
            DriverEvent::Grew {
                source: "core".into(),
                node: "node-6".into(),
                concept: "Knowledge embedding".into(),
                proficiency: 37,
            }
            .to_string(),
            "grew node-6 from core - learning: Knowledge embedding (37% proficiency)"
        );
        assert_eq!(
            DriverEvent::CodeLevelChanged {
                level: CodeLevel::Advanced
            }
            .to_string(),
            "code evolved to advanced level - implementing new algorithms"
        );
        assert_eq!(
            DriverEvent::SpeedChanged { speed: 2.0 }.to_string(),
            "speed set to 2x"
        );
    }
}
