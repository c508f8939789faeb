//! Mode policy overrides from TOML (`[modes.<name>]` sections)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use synod_domain::{ConfigIssue, ConfigIssueCode, Mode, ModePolicy, ModePolicyTable};

/// # Example
///
/// ```toml
/// [modes.council]
/// max_panel = 4
///
/// [modes.tribunal]
/// enabled = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModePolicy {
    pub enabled: Option<bool>,
    pub min_panel: Option<usize>,
    pub max_panel: Option<usize>,
}

pub type FileModesConfig = BTreeMap<String, FileModePolicy>;

/// Build the policy table, collecting issues for unknown modes and bad
/// bounds. Entries with issues are left at their defaults.
pub fn to_policy_table(modes: &FileModesConfig) -> (ModePolicyTable, Vec<ConfigIssue>) {
    let mut table = ModePolicyTable::default();
    let mut issues = Vec::new();

    for (name, entry) in modes {
        let Ok(mode) = name.parse::<Mode>() else {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownMode,
                format!("modes.{}: unknown mode", name),
            ));
            continue;
        };
        let defaults = mode.default_policy();
        let min = entry.min_panel.unwrap_or(defaults.min_panel);
        let max = entry.max_panel.unwrap_or(defaults.max_panel);
        if min == 0 || min > max {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidPanelBounds,
                format!("modes.{}: min_panel {} / max_panel {} is not a valid range", name, min, max),
            ));
            continue;
        }
        let mut policy = ModePolicy::new(min, max);
        if entry.enabled == Some(false) {
            policy = policy.disabled();
        }
        table = table.with(mode, policy);
    }

    if Mode::ALL.iter().all(|mode| !table.get(*mode).enabled) {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::AllModesDisabled,
            "every mode is disabled",
        ));
    }
    (table, issues)
}
