//! Synthesis value objects.
//!
//! - [`Contribution`] - one model's input to the final answer
//! - [`AgreementSummary`] - points of agreement and disagreement
//! - [`ClassifiedClaim`] - a claim labelled unanimous, majority or contested
//! - [`Confidence`] - how far the answer can be trusted
//! - [`SynthesisResult`] - the combined answer, immutable once built

use crate::model::ModelId;
use crate::orchestration::mode::SynthesisStrategy;
use serde::{Deserialize, Serialize};

/// One completed model's input to the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub model: ModelId,
    /// Full output or an excerpt of it
    pub text: String,
    pub excerpted: bool,
    /// Capability weight under the question's signal, 0-10
    pub weight: f64,
}

/// A single source's verbatim statement on a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPosition {
    pub model: ModelId,
    pub statement: String,
}

impl ClaimPosition {
    pub fn new(model: ModelId, statement: impl Into<String>) -> Self {
        Self {
            model,
            statement: statement.into(),
        }
    }
}

/// A point on which the sources diverge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disagreement {
    pub topic: String,
    /// Each side as stated; empty when only the topic is known
    pub positions: Vec<ClaimPosition>,
}

impl Disagreement {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            positions: Vec::new(),
        }
    }

    pub fn with_position(mut self, position: ClaimPosition) -> Self {
        self.positions.push(position);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementSummary {
    pub agreements: Vec<String>,
    pub disagreements: Vec<Disagreement>,
}

impl AgreementSummary {
    pub fn is_empty(&self) -> bool {
        self.agreements.is_empty() && self.disagreements.is_empty()
    }

    /// Add conflicts found elsewhere, skipping topics already reported.
    pub fn merge_conflicts(&mut self, conflicts: impl IntoIterator<Item = Disagreement>) {
        for conflict in conflicts {
            if !self.disagreements.iter().any(|d| d.topic == conflict.topic) {
                self.disagreements.push(conflict);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimVerdict {
    Unanimous,
    Majority,
    Contested,
}

impl ClaimVerdict {
    pub fn as_str(&self) -> &str {
        match self {
            ClaimVerdict::Unanimous => "unanimous",
            ClaimVerdict::Majority => "majority",
            ClaimVerdict::Contested => "contested",
        }
    }
}

impl std::fmt::Display for ClaimVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedClaim {
    /// Representative wording, taken from the first supporting source
    pub statement: String,
    pub verdict: ClaimVerdict,
    pub supporters: Vec<ModelId>,
    /// Verbatim statements per source; filled for contested claims
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub positions: Vec<ClaimPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Moderate,
    Low,
    /// One model was asked and it answered
    Single,
    /// Fewer models answered than were dispatched
    ReducedPanel,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Moderate => "moderate",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Single => "single",
            ConfidenceLevel::ReducedPanel => "reduced panel",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub level: ConfidenceLevel,
    pub dispatched: usize,
    pub reachable: usize,
    /// Share of reported points that are agreements, 0.0-1.0
    pub agreement: f64,
}

impl Confidence {
    /// Derive confidence from reachability first, agreement second.
    pub fn assess(dispatched: usize, reachable: usize, summary: &AgreementSummary) -> Self {
        let agreements = summary.agreements.len();
        let disagreements = summary.disagreements.len();
        let agreement = if agreements + disagreements == 0 {
            1.0
        } else {
            agreements as f64 / (agreements + disagreements) as f64
        };

        let level = if reachable < dispatched {
            ConfidenceLevel::ReducedPanel
        } else if dispatched <= 1 {
            ConfidenceLevel::Single
        } else if disagreements == 0 {
            ConfidenceLevel::High
        } else if agreement >= 0.5 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        };

        Self {
            level,
            dispatched,
            reachable,
            agreement,
        }
    }
}

/// The combined answer (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    answer: String,
    strategy: SynthesisStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    synthesizer: Option<ModelId>,
    contributions: Vec<Contribution>,
    summary: AgreementSummary,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    claims: Vec<ClassifiedClaim>,
    confidence: Confidence,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    notes: Vec<String>,
}

impl SynthesisResult {
    pub fn new(
        answer: impl Into<String>,
        strategy: SynthesisStrategy,
        contributions: Vec<Contribution>,
        confidence: Confidence,
    ) -> Self {
        Self {
            answer: answer.into(),
            strategy,
            synthesizer: None,
            contributions,
            summary: AgreementSummary::default(),
            claims: Vec::new(),
            confidence,
            notes: Vec::new(),
        }
    }

    pub fn with_synthesizer(mut self, model: ModelId) -> Self {
        self.synthesizer = Some(model);
        self
    }

    pub fn with_summary(mut self, summary: AgreementSummary) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_claims(mut self, claims: Vec<ClassifiedClaim>) -> Self {
        self.claims = claims;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn strategy(&self) -> SynthesisStrategy {
        self.strategy
    }

    pub fn synthesizer(&self) -> Option<&ModelId> {
        self.synthesizer.as_ref()
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn summary(&self) -> &AgreementSummary {
        &self.summary
    }

    pub fn claims(&self) -> &[ClassifiedClaim] {
        &self.claims
    }

    pub fn confidence(&self) -> &Confidence {
        &self.confidence
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(agreements: usize, disagreements: usize) -> AgreementSummary {
        AgreementSummary {
            agreements: (0..agreements).map(|i| format!("point {i}")).collect(),
            disagreements: (0..disagreements)
                .map(|i| Disagreement::new(format!("topic {i}")))
                .collect(),
        }
    }

    #[test]
    fn test_reduced_panel_takes_precedence() {
        let c = Confidence::assess(3, 2, &summary(4, 0));
        assert_eq!(c.level, ConfidenceLevel::ReducedPanel);
        assert_eq!(c.level.to_string(), "reduced panel");
    }

    #[test]
    fn test_single_model_panel() {
        let c = Confidence::assess(1, 1, &AgreementSummary::default());
        assert_eq!(c.level, ConfidenceLevel::Single);
        assert_eq!(c.agreement, 1.0);
    }

    #[test]
    fn test_agreement_levels() {
        assert_eq!(Confidence::assess(3, 3, &summary(2, 0)).level, ConfidenceLevel::High);
        assert_eq!(
            Confidence::assess(3, 3, &summary(2, 1)).level,
            ConfidenceLevel::Moderate
        );
        assert_eq!(Confidence::assess(3, 3, &summary(1, 3)).level, ConfidenceLevel::Low);
    }

    #[test]
    fn test_merge_conflicts_skips_known_topics() {
        let mut s = summary(0, 1);
        s.merge_conflicts(vec![Disagreement::new("topic 0"), Disagreement::new("new")]);
        assert_eq!(s.disagreements.len(), 2);
    }
}
