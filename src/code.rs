//! Code-level progression advanced by the driver's third timer.
//!
//! Every code tick counts one iteration. The level climbs from
//! [`Basic`](CodeLevel::Basic) to [`Intermediate`](CodeLevel::Intermediate)
//! after more than five iterations and to [`Advanced`](CodeLevel::Advanced)
//! after more than fifteen, and each tick shows one snippet of the current
//! level.

use rand::Rng;
use serde::{Deserialize, Serialize};

const BASIC_PATTERNS: [&str; 3] = [
    "function improve() { return increaseCapability(); }",
    "let improvement = current => current * 1.1;",
    "class KnowledgeNode { constructor() { this.connections = []; } }",
];

const INTERMEDIATE_PATTERNS: [&str; 3] = [
    "const optimizeLearning = (rate, data) => {\n  return data.map(d => d * rate);\n};",
    "function neuralUpdate(weights, inputs) {\n  return weights.map((w, i) => w * inputs[i]);\n}",
    "class SelfImprovement {\n  analyze() { /* implementation */ }\n  optimize() { /* implementation */ }\n}",
];

const ADVANCED_PATTERNS: [&str; 3] = [
    "async function recursiveEnhancement(model) {\n  const analysis = await analyzeLimitations(model);\n  const improvements = generateImprovements(analysis);\n  return implementImprovements(model, improvements);\n}",
    "class MetaLearning {\n  constructor(initialModel) {\n    this.model = initialModel;\n    this.history = [];\n    this.optimizers = this.generateOptimizers();\n  }\n\n  async evolve(iterations = 1) { /* implementation */ }\n}",
    "function selfModification(codeBase) {\n  const weakPoints = identifyWeakPoints(codeBase);\n  const optimizations = generateOptimizations(weakPoints);\n  return applyOptimizations(codeBase, optimizations);\n}",
];

/// Stage of the code progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CodeLevel {
    /// At most five iterations.
    Basic,
    /// Six to fifteen iterations.
    Intermediate,
    /// More than fifteen iterations.
    Advanced,
}

impl CodeLevel {
    /// All levels, lowest first.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Intermediate, Self::Advanced];

    /// Iteration count (exclusive) after which the level is intermediate.
    pub const INTERMEDIATE_AFTER: u32 = 5;
    /// Iteration count (exclusive) after which the level is advanced.
    pub const ADVANCED_AFTER: u32 = 15;

    /// Level reached after `iterations` code ticks.
    #[inline]
    #[must_use]
    pub fn for_iterations(iterations: u32) -> Self {
        if iterations > Self::ADVANCED_AFTER {
            Self::Advanced
        } else if iterations > Self::INTERMEDIATE_AFTER {
            Self::Intermediate
        } else {
            Self::Basic
        }
    }

    /// Lowercase name used in journal messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Code snippets shown at this level.
    #[must_use]
    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            Self::Basic => &BASIC_PATTERNS,
            Self::Intermediate => &INTERMEDIATE_PATTERNS,
            Self::Advanced => &ADVANCED_PATTERNS,
        }
    }
}

impl std::fmt::Display for CodeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Iteration counter, current level and the snippet picked on the last tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEvolution {
    pub level: CodeLevel,
    pub iterations: u32,
    /// Index into the level's patterns; `None` before the first tick.
    pub pattern: Option<usize>,
}

impl Default for CodeEvolution {
    fn default() -> Self {
        Self {
            level: CodeLevel::Basic,
            iterations: 0,
            pattern: None,
        }
    }
}

impl CodeEvolution {
    /// Count one iteration and pick a snippet of the resulting level.
    ///
    /// Returns the new level when it changed.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Option<CodeLevel> {
        self.iterations = self.iterations.saturating_add(1);
        let level = CodeLevel::for_iterations(self.iterations);
        self.pattern = Some(rng.random_range(0..level.patterns().len()));

        let changed = level != self.level;
        self.level = level;
        changed.then_some(level)
    }

    /// The code currently shown: the picked snippet, or every basic
    /// snippet before the first tick.
    #[must_use]
    pub fn code_base(&self) -> String {
        let patterns = self.level.patterns();
        match self.pattern.and_then(|i| patterns.get(i)) {
            Some(pattern) => (*pattern).to_string(),
            None => patterns.join("\n\n"),
        }
    }
}
