//! Coarse classification of node knowledge.

use serde::{Deserialize, Serialize};

/// Knowledge band a node falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KnowledgeLevel {
    /// Knowledge at or below 0.4.
    Developing,
    /// Knowledge above 0.4 and at or below 0.7.
    Moderate,
    /// Knowledge above 0.7.
    High,
}

impl KnowledgeLevel {
    /// All levels, lowest first.
    pub const ALL: [Self; 3] = [Self::Developing, Self::Moderate, Self::High];

    /// Lower bound (exclusive) for [`Moderate`](Self::Moderate).
    pub const MODERATE_ABOVE: f32 = 0.4;
    /// Lower bound (exclusive) for [`High`](Self::High).
    pub const HIGH_ABOVE: f32 = 0.7;

    /// Classify a knowledge value.
    #[inline]
    #[must_use]
    pub fn classify(knowledge: f32) -> Self {
        if knowledge > Self::HIGH_ABOVE {
            Self::High
        } else if knowledge > Self::MODERATE_ABOVE {
            Self::Moderate
        } else {
            Self::Developing
        }
    }

    /// Lowercase name used in journal messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Developing => "developing",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for KnowledgeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
