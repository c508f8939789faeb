//! Capability weight policy table.
//!
//! Maps a [`QuestionSignal`] to relative weights over the five capability
//! dimensions. The numbers are tuning knobs, not invariants; the only
//! contract is that the dimension matching the signal carries the largest
//! weight.

use super::definition::{Capability, CapabilityScores};
use crate::core::question::QuestionSignal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilityWeights {
    pub reasoning: f64,
    pub creativity: f64,
    pub coding: f64,
    pub speed: f64,
    pub accuracy: f64,
}

impl CapabilityWeights {
    pub fn for_signal(signal: QuestionSignal) -> Self {
        match signal {
            QuestionSignal::General => Self {
                reasoning: 0.25,
                creativity: 0.15,
                coding: 0.10,
                speed: 0.10,
                accuracy: 0.40,
            },
            QuestionSignal::Coding => Self {
                reasoning: 0.20,
                creativity: 0.0,
                coding: 0.50,
                speed: 0.05,
                accuracy: 0.25,
            },
            QuestionSignal::Reasoning => Self {
                reasoning: 0.50,
                creativity: 0.05,
                coding: 0.05,
                speed: 0.05,
                accuracy: 0.35,
            },
            QuestionSignal::Creative => Self {
                reasoning: 0.15,
                creativity: 0.55,
                coding: 0.0,
                speed: 0.15,
                accuracy: 0.15,
            },
            QuestionSignal::Factual => Self {
                reasoning: 0.25,
                creativity: 0.0,
                coding: 0.0,
                speed: 0.15,
                accuracy: 0.60,
            },
        }
    }

    fn weight(&self, capability: Capability) -> f64 {
        match capability {
            Capability::Reasoning => self.reasoning,
            Capability::Creativity => self.creativity,
            Capability::Coding => self.coding,
            Capability::Speed => self.speed,
            Capability::Accuracy => self.accuracy,
        }
    }

    /// Weighted mean of `scores`, on the same 0-10 scale as the scores.
    pub fn score(&self, scores: &CapabilityScores) -> f64 {
        const ALL: [Capability; 5] = [
            Capability::Reasoning,
            Capability::Creativity,
            Capability::Coding,
            Capability::Speed,
            Capability::Accuracy,
        ];
        let total: f64 = ALL.iter().map(|c| self.weight(*c)).sum();
        if total <= 0.0 {
            return 0.0;
        }
        ALL.iter()
            .map(|c| self.weight(*c) * scores.get(*c))
            .sum::<f64>()
            / total
    }
}

impl Default for CapabilityWeights {
    fn default() -> Self {
        Self::for_signal(QuestionSignal::General)
    }
}
