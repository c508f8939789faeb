//! Model registry: the read-only catalog of models available to panels.
//!
//! Built once at startup and shared behind an `Arc`. Nothing mutates a
//! registry after construction; a configuration change means building a new
//! snapshot, so concurrent requests never observe a half-updated catalog.

use super::definition::{ModelDefinition, ModelId};
use super::weights::CapabilityWeights;
use crate::core::error::DomainError;
use crate::orchestration::mode::Mode;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Minimum weighted capability a model needs to be eligible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapabilityFloor {
    pub weights: CapabilityWeights,
    pub minimum: f64,
}

impl CapabilityFloor {
    pub fn new(weights: CapabilityWeights, minimum: f64) -> Self {
        Self { weights, minimum }
    }
}

impl Default for CapabilityFloor {
    fn default() -> Self {
        Self::new(CapabilityWeights::default(), 0.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<ModelId, ModelDefinition>,
}

impl ModelRegistry {
    /// Build a registry, rejecting duplicate identifiers.
    pub fn new(definitions: impl IntoIterator<Item = ModelDefinition>) -> Result<Self, DomainError> {
        let mut models = BTreeMap::new();
        for definition in definitions {
            let id = definition.id.clone();
            if models.insert(id.clone(), definition).is_some() {
                return Err(DomainError::DuplicateModel(id.to_string()));
            }
        }
        Ok(Self { models })
    }

    pub fn get(&self, id: &ModelId) -> Option<&ModelDefinition> {
        self.models.get(id)
    }

    pub fn contains(&self, id: &ModelId) -> bool {
        self.models.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// All definitions in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelDefinition> {
        self.models.values()
    }

    /// Models usable for `mode`, best first.
    ///
    /// Filters out disabled models, models below the floor, and (for modes
    /// that show every panelist side by side) models not eligible for
    /// display. Ordering is weighted score descending, then cost class
    /// ascending, then identifier.
    pub fn list_eligible(&self, mode: Mode, floor: &CapabilityFloor) -> Vec<&ModelDefinition> {
        let mut ranked: Vec<(&ModelDefinition, f64)> = self
            .models
            .values()
            .filter(|m| m.enabled)
            .filter(|m| !mode.requires_display() || m.display_eligible)
            .map(|m| (m, floor.weights.score(&m.scores)))
            .filter(|(_, score)| *score >= floor.minimum)
            .collect();

        ranked.sort_by(|a, b| compare_ranked(a, b));
        ranked.into_iter().map(|(m, _)| m).collect()
    }

    /// The model that runs synthesis passes: highest accuracy among enabled
    /// models, cheaper first among equals, then by identifier.
    pub fn synthesizer(&self) -> Option<&ModelDefinition> {
        use super::definition::Capability;

        let mut candidates: Vec<(&ModelDefinition, f64)> = self
            .models
            .values()
            .filter(|m| m.enabled)
            .map(|m| (m, m.scores.get(Capability::Accuracy)))
            .collect();
        candidates.sort_by(|a, b| compare_ranked(a, b));
        candidates.first().map(|(m, _)| *m)
    }
}

fn compare_ranked(a: &(&ModelDefinition, f64), b: &(&ModelDefinition, f64)) -> Ordering {
    b.1.total_cmp(&a.1)
        .then_with(|| a.0.cost_class.cmp(&b.0.cost_class))
        .then_with(|| a.0.id.cmp(&b.0.id))
}
