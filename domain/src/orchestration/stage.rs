//! Pipeline stages

use serde::{Deserialize, Serialize};

/// One sequential step of answering a question.
///
/// Every stage is a single panel run; stages never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Independent answers from the panel
    Panel,
    /// Contemplate round 2: every model sees every round-1 answer
    Roundtable,
    /// Tribunal phase 1
    Research,
    /// Tribunal phase 2
    Critique,
    /// Tribunal phase 3
    Revision,
    /// Synthesizer pass (also Tribunal phase 4)
    Synthesis,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Panel => "panel",
            Stage::Roundtable => "roundtable",
            Stage::Research => "research",
            Stage::Critique => "critique",
            Stage::Revision => "revision",
            Stage::Synthesis => "synthesis",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Stage::Panel => "Panel",
            Stage::Roundtable => "Roundtable",
            Stage::Research => "Independent Research",
            Stage::Critique => "Cross-Critique",
            Stage::Revision => "Revision",
            Stage::Synthesis => "Synthesis",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
