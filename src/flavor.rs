//! Phrases the driver draws from when journaling growth and evolution.

/// Named evolution strategies, one picked per evolution.
pub const EVOLUTION_STRATEGIES: [&str; 15] = [
    "Neural architecture search",
    "Weight optimization",
    "Hyperparameter tuning",
    "Topology adaptation",
    "Connection pruning",
    "Bias correction",
    "Gradient flow enhancement",
    "Activation function optimization",
    "Resource allocation optimization",
    "Error backpropagation refinement",
    "Knowledge transfer protocols",
    "Memory indexing improvement",
    "Self-analysis routines",
    "Redundancy elimination",
    "Cross-domain knowledge integration",
];

/// Concepts a growth is said to be learning, one picked per growth.
pub const LEARNING_CONCEPTS: [&str; 30] = [
    "Natural language understanding",
    "Visual pattern recognition",
    "Logical reasoning frameworks",
    "Contextual data analysis",
    "Response optimization",
    "Decision tree refinement",
    "Neural pathway formation",
    "Semantic network expansion",
    "Knowledge embedding",
    "Feedback integration",
    "Pattern abstraction",
    "Cognitive framework adaptation",
    "Memory optimization",
    "Inference capability",
    "Conceptual mapping",
    "Prompt interpretation",
    "User interaction models",
    "Response synthesis",
    "Ethical consideration framework",
    "Uncertainty handling",
    "Attention mechanism tuning",
    "Transformative learning",
    "Self-reference mechanism",
    "Abstraction hierarchy mapping",
    "Generative modeling",
    "Multi-modal integration",
    "Recursive improvement optimization",
    "Causal reasoning improvement",
    "Transfer learning capabilities",
    "Meta-learning strategies",
];
