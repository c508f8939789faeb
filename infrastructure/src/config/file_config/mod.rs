//! Raw TOML configuration data types
//!
//! These structs mirror the config file. Conversions into engine types
//! collect [`ConfigIssue`]s instead of failing, so `validate()` can report
//! everything at once.

mod budget;
mod engine;
mod models;
mod modes;
mod output;
mod providers;

pub use budget::FileBudgetConfig;
pub use engine::FileEngineConfig;
pub use models::{FileModelEntry, to_definitions};
pub use modes::{FileModePolicy, FileModesConfig, to_policy_table};
pub use output::FileOutputConfig;
pub use providers::{
    FileAnthropicConfig, FileGoogleConfig, FileOpenAiConfig, FileProvidersConfig,
    resolve_api_key,
};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use synod_application::budget::BudgetGuard;
use synod_application::config::EngineConfig;
use synod_application::ports::collaborators::StaticBilling;
use synod_domain::{ConfigIssue, DomainError, ModelRegistry, RequesterId};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub engine: FileEngineConfig,
    pub budget: FileBudgetConfig,
    pub modes: FileModesConfig,
    /// Replaces the built-in catalog when non-empty
    pub models: Vec<FileModelEntry>,
    pub providers: FileProvidersConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.engine.validate());
        issues.extend(to_policy_table(&self.modes).1);

        let (definitions, model_issues) = to_definitions(&self.models);
        issues.extend(model_issues);
        let cheapest = definitions
            .iter()
            .filter(|d| d.enabled)
            .map(|d| d.cost_class.units())
            .min();
        issues.extend(self.budget.validate(cheapest));
        issues
    }

    pub fn engine_config(&self) -> EngineConfig {
        self.engine
            .to_engine_config(to_policy_table(&self.modes).0)
    }

    pub fn registry(&self) -> Result<ModelRegistry, DomainError> {
        ModelRegistry::new(to_definitions(&self.models).0)
    }

    /// The config-driven static billing tier.
    pub fn billing(&self) -> StaticBilling {
        let billing = self.budget.requesters.iter().fold(
            StaticBilling::new(self.budget.ceiling),
            |billing, (id, ceiling)| {
                billing.with_requester_ceiling(RequesterId::new(id.clone()), *ceiling)
            },
        );
        match self.budget.parse_permitted_modes().0 {
            Some(modes) => billing.with_permitted_modes(modes),
            None => billing,
        }
    }

    pub fn budget_guard(&self) -> BudgetGuard {
        BudgetGuard::new(Arc::new(self.billing()))
            .with_window(Duration::from_secs(self.budget.window_secs))
            .with_max_concurrent(self.budget.max_concurrent)
    }
}
