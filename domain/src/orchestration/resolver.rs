//! Mode resolution: from (mode, question signal, budget) to a concrete panel.

use super::mode::{Mode, ModePolicyTable, SynthesisStrategy};
use crate::budget::BudgetCeiling;
use crate::core::error::DomainError;
use crate::core::question::QuestionSignal;
use crate::model::{
    CapabilityFloor, CapabilityWeights, CostUnits, ModelDefinition, ModelId, ModelRegistry,
};
use serde::{Deserialize, Serialize};

/// The resolved panel for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelPlan {
    pub mode: Mode,
    pub signal: QuestionSignal,
    /// Panel members, highest priority first
    pub models: Vec<ModelId>,
    pub strategy: SynthesisStrategy,
    pub rounds: u8,
    /// Model for the synthesizer pass, if one will run
    pub synthesizer: Option<ModelId>,
    pub estimated_cost: CostUnits,
    /// True when models were dropped to fit the budget
    pub downgraded: bool,
    /// Models removed by the downgrade, in drop order
    pub dropped: Vec<ModelId>,
    /// Fewer models were eligible than the mode's minimum panel
    #[serde(default)]
    pub undersized: bool,
}

impl PanelPlan {
    pub fn panel_size(&self) -> usize {
        self.models.len()
    }
}

pub struct ModeResolver<'a> {
    registry: &'a ModelRegistry,
    policies: &'a ModePolicyTable,
    minimum_score: f64,
}

impl<'a> ModeResolver<'a> {
    pub fn new(registry: &'a ModelRegistry, policies: &'a ModePolicyTable) -> Self {
        Self {
            registry,
            policies,
            minimum_score: 0.0,
        }
    }

    /// Weighted capability score a model needs to be considered.
    pub fn with_minimum_score(mut self, minimum: f64) -> Self {
        self.minimum_score = minimum;
        self
    }

    pub fn resolve(
        &self,
        mode: Mode,
        signal: QuestionSignal,
        ceiling: &BudgetCeiling,
    ) -> Result<PanelPlan, DomainError> {
        let policy = self.policies.get(mode);
        if !policy.enabled {
            return Err(DomainError::InvalidMode(format!("{} is disabled", mode)));
        }

        let floor =
            CapabilityFloor::new(CapabilityWeights::for_signal(signal), self.minimum_score);
        let mut panel: Vec<&ModelDefinition> = self
            .registry
            .list_eligible(mode, &floor)
            .into_iter()
            .take(policy.max_panel)
            .collect();
        if panel.is_empty() {
            return Err(DomainError::NoEligibleModels(mode.to_string()));
        }
        let undersized = panel.len() < policy.min_panel;

        let strategy = mode.strategy();
        let synthesizer = self.registry.synthesizer();
        let mut dropped = Vec::new();
        let mut estimate = estimate_cost(mode, &panel, synthesizer);

        while !ceiling.allows(estimate) && panel.len() > 1 {
            let victim = most_expensive(&panel);
            dropped.push(panel.remove(victim).id.clone());
            estimate = estimate_cost(mode, &panel, synthesizer);
        }

        let synthesizer = synthesizer
            .filter(|_| strategy.needs_synthesizer() && panel.len() > 1)
            .map(|m| m.id.clone());

        Ok(PanelPlan {
            mode,
            signal,
            models: panel.iter().map(|m| m.id.clone()).collect(),
            strategy,
            rounds: mode.rounds(),
            synthesizer,
            estimated_cost: estimate,
            downgraded: !dropped.is_empty(),
            dropped,
            undersized,
        })
    }
}

/// Panel calls plus one synthesizer pass when more than one output will
/// need combining.
pub fn estimate_cost(
    mode: Mode,
    panel: &[&ModelDefinition],
    synthesizer: Option<&ModelDefinition>,
) -> CostUnits {
    // A lone tribunal member has nobody to critique, so it only researches.
    let calls = if mode == Mode::Tribunal && panel.len() < 2 {
        1
    } else {
        mode.calls_per_model()
    };
    let panel_cost: CostUnits = panel
        .iter()
        .map(|m| m.cost_class.units() * calls)
        .sum();
    let synthesis_cost = match synthesizer {
        Some(s) if mode.strategy().needs_synthesizer() && panel.len() > 1 => s.cost_class.units(),
        _ => 0,
    };
    panel_cost + synthesis_cost
}

/// Index of the most expensive model; among equals the lowest priority one.
fn most_expensive(panel: &[&ModelDefinition]) -> usize {
    let mut victim = 0;
    for (i, model) in panel.iter().enumerate() {
        if model.cost_class >= panel[victim].cost_class {
            victim = i;
        }
    }
    victim
}
