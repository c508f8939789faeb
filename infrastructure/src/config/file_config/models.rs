//! Model catalog from TOML (`[[models]]` entries)

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use synod_domain::model::catalog::builtin_models;
use synod_domain::{
    CapabilityScores, ConfigIssue, ConfigIssueCode, CostClass, ModelDefinition, ProviderFamily,
};

/// One catalog entry.
///
/// # Example
///
/// ```toml
/// [[models]]
/// id = "claude-sonnet-4.5"
/// family = "anthropic"
/// cost_class = "medium"
/// reasoning = 8.5
/// creativity = 8.0
/// coding = 9.0
/// speed = 7.0
/// accuracy = 8.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileModelEntry {
    pub id: String,
    pub family: String,
    #[serde(default)]
    pub cost_class: CostClass,
    #[serde(default = "default_score")]
    pub reasoning: f64,
    #[serde(default = "default_score")]
    pub creativity: f64,
    #[serde(default = "default_score")]
    pub coding: f64,
    #[serde(default = "default_score")]
    pub speed: f64,
    #[serde(default = "default_score")]
    pub accuracy: f64,
    #[serde(default)]
    pub max_context: Option<u32>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// May be shown side by side in Council and Tribunal
    #[serde(default = "default_true")]
    pub display: bool,
}

fn default_score() -> f64 {
    5.0
}

fn default_true() -> bool {
    true
}

/// Turn the `[[models]]` list into definitions.
///
/// An empty list means the built-in catalog. Entries with an unknown family
/// or a repeated id are skipped and reported.
pub fn to_definitions(entries: &[FileModelEntry]) -> (Vec<ModelDefinition>, Vec<ConfigIssue>) {
    if entries.is_empty() {
        return (builtin_models(), Vec::new());
    }

    let mut issues = Vec::new();
    let mut seen = BTreeSet::new();
    let mut definitions = Vec::new();
    for entry in entries {
        let family = match entry.family.parse::<ProviderFamily>() {
            Ok(family) => family,
            Err(_) => {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownProviderFamily,
                    format!("models.{}: unknown provider family '{}'", entry.id, entry.family),
                ));
                continue;
            }
        };
        if !seen.insert(entry.id.clone()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DuplicateModel,
                format!("models.{}: declared more than once", entry.id),
            ));
            continue;
        }

        let mut definition = ModelDefinition::new(
            entry.id.clone(),
            family,
            CapabilityScores::new(
                entry.reasoning,
                entry.creativity,
                entry.coding,
                entry.speed,
                entry.accuracy,
            ),
            entry.cost_class,
        );
        if let Some(tokens) = entry.max_context {
            definition = definition.with_max_context(tokens);
        }
        if !entry.enabled {
            definition = definition.disabled();
        }
        if !entry.display {
            definition = definition.hidden();
        }
        definitions.push(definition);
    }

    if !definitions.iter().any(|d| d.enabled) {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::NoEnabledModels,
            "no enabled models in [[models]]",
        ));
    }
    (definitions, issues)
}
