//! Compute modes and their panel policy.
//!
//! A [`Mode`] is the single user-facing knob: it decides how many models
//! answer, how many rounds they go through, and how their outputs are
//! combined ([`SynthesisStrategy`]). Panel sizes live in a
//! [`ModePolicyTable`] so deployments can tune them from configuration.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One model, answer passed through
    #[default]
    Quick,
    /// Small panel, weighted combine
    Thoughtful,
    /// Panel then roundtable, deep combine
    Contemplate,
    /// Visible panel with disagreements surfaced
    Council,
    /// Research, critique, revise, synthesize
    Tribunal,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Quick,
        Mode::Thoughtful,
        Mode::Contemplate,
        Mode::Council,
        Mode::Tribunal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Quick => "quick",
            Mode::Thoughtful => "thoughtful",
            Mode::Contemplate => "contemplate",
            Mode::Council => "council",
            Mode::Tribunal => "tribunal",
        }
    }

    /// Modes that show every panelist's output side by side.
    pub fn requires_display(&self) -> bool {
        matches!(self, Mode::Council | Mode::Tribunal)
    }

    pub fn strategy(&self) -> SynthesisStrategy {
        match self {
            Mode::Quick => SynthesisStrategy::PassThrough,
            Mode::Thoughtful => SynthesisStrategy::WeightedCombine,
            Mode::Contemplate => SynthesisStrategy::DeepWeightedCombine,
            Mode::Council => SynthesisStrategy::CombineWithDisagreement,
            Mode::Tribunal => SynthesisStrategy::ConsensusDissent,
        }
    }

    /// Number of panel rounds (Tribunal counts its four phases).
    pub fn rounds(&self) -> u8 {
        match self {
            Mode::Quick | Mode::Thoughtful | Mode::Council => 1,
            Mode::Contemplate => 2,
            Mode::Tribunal => 4,
        }
    }

    /// How many times each panel member is invoked, excluding synthesis.
    pub fn calls_per_model(&self) -> u64 {
        match self {
            Mode::Quick | Mode::Thoughtful | Mode::Council => 1,
            Mode::Contemplate => 2,
            // research, critique, revision
            Mode::Tribunal => 3,
        }
    }

    /// Sequential stages sharing the request deadline, synthesis included.
    pub fn stage_count(&self) -> u32 {
        match self {
            Mode::Quick => 1,
            Mode::Thoughtful | Mode::Council => 2,
            Mode::Contemplate => 3,
            Mode::Tribunal => 4,
        }
    }

    pub fn default_policy(&self) -> ModePolicy {
        match self {
            Mode::Quick => ModePolicy::new(1, 1),
            Mode::Thoughtful => ModePolicy::new(2, 3),
            Mode::Contemplate => ModePolicy::new(3, 4),
            Mode::Council => ModePolicy::new(2, 6),
            Mode::Tribunal => ModePolicy::new(3, 3),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quick" | "q" => Ok(Mode::Quick),
            "thoughtful" | "t" => Ok(Mode::Thoughtful),
            "contemplate" => Ok(Mode::Contemplate),
            "council" => Ok(Mode::Council),
            "tribunal" => Ok(Mode::Tribunal),
            other => Err(DomainError::InvalidMode(other.to_string())),
        }
    }
}

/// How a panel's outputs are turned into one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SynthesisStrategy {
    PassThrough,
    WeightedCombine,
    DeepWeightedCombine,
    CombineWithDisagreement,
    ConsensusDissent,
}

impl SynthesisStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisStrategy::PassThrough => "pass-through",
            SynthesisStrategy::WeightedCombine => "weighted-combine",
            SynthesisStrategy::DeepWeightedCombine => "deep-weighted-combine",
            SynthesisStrategy::CombineWithDisagreement => "combine-with-disagreement",
            SynthesisStrategy::ConsensusDissent => "consensus-dissent",
        }
    }

    /// Whether a synthesizer pass runs when more than one output exists.
    pub fn needs_synthesizer(&self) -> bool {
        !matches!(self, SynthesisStrategy::PassThrough)
    }

    /// Whether contributions keep the full model output rather than an
    /// excerpt.
    pub fn shows_full_outputs(&self) -> bool {
        matches!(
            self,
            SynthesisStrategy::PassThrough
                | SynthesisStrategy::CombineWithDisagreement
                | SynthesisStrategy::ConsensusDissent
        )
    }
}

impl fmt::Display for SynthesisStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Panel size bounds for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModePolicy {
    pub enabled: bool,
    pub min_panel: usize,
    pub max_panel: usize,
}

impl ModePolicy {
    pub fn new(min_panel: usize, max_panel: usize) -> Self {
        Self {
            enabled: true,
            min_panel: min_panel.max(1),
            max_panel: max_panel.max(min_panel).max(1),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Per-mode policy, defaulting to [`Mode::default_policy`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModePolicyTable {
    overrides: BTreeMap<Mode, ModePolicy>,
}

impl ModePolicyTable {
    pub fn with(mut self, mode: Mode, policy: ModePolicy) -> Self {
        self.overrides.insert(mode, policy);
        self
    }

    pub fn get(&self, mode: Mode) -> ModePolicy {
        self.overrides
            .get(&mode)
            .copied()
            .unwrap_or_else(|| mode.default_policy())
    }
}
