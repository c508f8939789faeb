//! Model definition value objects

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cost accounting unit shared by estimates, budgets and provider bills.
pub type CostUnits = u64;

/// Globally unique model identifier (e.g. "claude-sonnet-4.5").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Provider family a model is served by.
///
/// This is a closed set: adding a provider means adding a variant here and
/// an adapter for it, never string matching at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    Anthropic,
    OpenAi,
    Google,
    /// Deterministic in-process provider used for offline runs
    Local,
}

impl ProviderFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderFamily::Anthropic => "anthropic",
            ProviderFamily::OpenAi => "openai",
            ProviderFamily::Google => "google",
            ProviderFamily::Local => "local",
        }
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderFamily {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(ProviderFamily::Anthropic),
            "openai" => Ok(ProviderFamily::OpenAi),
            "google" | "gemini" => Ok(ProviderFamily::Google),
            "local" => Ok(ProviderFamily::Local),
            other => Err(DomainError::UnknownProviderFamily(other.to_string())),
        }
    }
}

/// Ordinal cost class. Declaration order is cheapest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CostClass {
    Cheap,
    #[default]
    Medium,
    Expensive,
}

impl CostClass {
    /// Estimated cost of a single call, also the rate per 1k tokens.
    pub fn units(&self) -> CostUnits {
        match self {
            CostClass::Cheap => 1,
            CostClass::Medium => 3,
            CostClass::Expensive => 9,
        }
    }

    /// Cost of a call that consumed `tokens` tokens (minimum one block).
    pub fn cost_for_tokens(&self, tokens: u64) -> CostUnits {
        self.units() * tokens.div_ceil(1000).max(1)
    }
}

/// A capability dimension on which models are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Reasoning,
    Creativity,
    Coding,
    Speed,
    Accuracy,
}

/// Lowest and highest permitted capability score.
pub const SCORE_RANGE: (f64, f64) = (0.0, 10.0);

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        SCORE_RANGE.0
    } else {
        value.clamp(SCORE_RANGE.0, SCORE_RANGE.1)
    }
}

/// Capability scores, each clamped to [`SCORE_RANGE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilityScores {
    reasoning: f64,
    creativity: f64,
    coding: f64,
    speed: f64,
    accuracy: f64,
}

impl CapabilityScores {
    pub fn new(reasoning: f64, creativity: f64, coding: f64, speed: f64, accuracy: f64) -> Self {
        Self {
            reasoning: clamp_score(reasoning),
            creativity: clamp_score(creativity),
            coding: clamp_score(coding),
            speed: clamp_score(speed),
            accuracy: clamp_score(accuracy),
        }
    }

    pub fn get(&self, capability: Capability) -> f64 {
        match capability {
            Capability::Reasoning => self.reasoning,
            Capability::Creativity => self.creativity,
            Capability::Coding => self.coding,
            Capability::Speed => self.speed,
            Capability::Accuracy => self.accuracy,
        }
    }
}

/// Immutable description of one model in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub id: ModelId,
    pub family: ProviderFamily,
    pub scores: CapabilityScores,
    pub cost_class: CostClass,
    /// Maximum context size in tokens
    pub max_context: u32,
    pub enabled: bool,
    /// May be shown side by side in visible multi-model modes
    pub display_eligible: bool,
}

impl ModelDefinition {
    pub fn new(
        id: impl Into<ModelId>,
        family: ProviderFamily,
        scores: CapabilityScores,
        cost_class: CostClass,
    ) -> Self {
        Self {
            id: id.into(),
            family,
            scores,
            cost_class,
            max_context: 128_000,
            enabled: true,
            display_eligible: true,
        }
    }

    pub fn with_max_context(mut self, tokens: u32) -> Self {
        self.max_context = tokens;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.display_eligible = false;
        self
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_are_clamped() {
        let scores = CapabilityScores::new(12.0, -3.0, 5.0, f64::NAN, 10.0);
        assert_eq!(scores.get(Capability::Reasoning), 10.0);
        assert_eq!(scores.get(Capability::Creativity), 0.0);
        assert_eq!(scores.get(Capability::Coding), 5.0);
        assert_eq!(scores.get(Capability::Speed), 0.0);
        assert_eq!(scores.get(Capability::Accuracy), 10.0);
    }

    #[test]
    fn test_cost_class_ordering() {
        assert!(CostClass::Cheap < CostClass::Medium);
        assert!(CostClass::Medium < CostClass::Expensive);
        assert!(CostClass::Cheap.units() < CostClass::Expensive.units());
    }

    #[test]
    fn test_cost_for_tokens_rounds_up() {
        assert_eq!(CostClass::Medium.cost_for_tokens(0), 3);
        assert_eq!(CostClass::Medium.cost_for_tokens(1000), 3);
        assert_eq!(CostClass::Medium.cost_for_tokens(1001), 6);
        assert_eq!(CostClass::Expensive.cost_for_tokens(2500), 27);
    }

    #[test]
    fn test_provider_family_parse() {
        assert_eq!(
            "OpenAI".parse::<ProviderFamily>().ok(),
            Some(ProviderFamily::OpenAi)
        );
        assert_eq!(
            "gemini".parse::<ProviderFamily>().ok(),
            Some(ProviderFamily::Google)
        );
        assert!("carrier-pigeon".parse::<ProviderFamily>().is_err());
    }

    #[test]
    fn test_model_id_ordering_is_lexicographic() {
        let mut ids = vec![ModelId::new("gpt-5"), ModelId::new("claude-opus-4.5")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "claude-opus-4.5");
    }
}
