//! Budget configuration from TOML (`[budget]` section)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use synod_domain::{BudgetCeiling, ConfigIssue, ConfigIssueCode, CostUnits, Mode};

/// # Example
///
/// ```toml
/// [budget]
/// window_secs = 3600
/// ceiling = 500                 # units per requester per window
/// max_concurrent = 4
/// permitted_modes = ["quick", "thoughtful", "council"]
/// request_max_cost = 100        # default per-request ceiling
///
/// [budget.requesters]
/// alice = 2000                  # per-requester window ceiling
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBudgetConfig {
    pub window_secs: u64,
    /// Units each requester may spend per window
    pub ceiling: CostUnits,
    /// Concurrent requests per requester
    pub max_concurrent: usize,
    /// Modes the static tier permits; all when absent
    pub permitted_modes: Option<Vec<String>>,
    /// Per-request cost ceiling used when the caller sets none
    pub request_max_cost: CostUnits,
    /// Per-request wall-clock limit used when the caller sets none
    pub request_max_secs: u64,
    /// Window ceilings for specific requesters
    pub requesters: BTreeMap<String, CostUnits>,
}

impl Default for FileBudgetConfig {
    fn default() -> Self {
        let ceiling = BudgetCeiling::default();
        Self {
            window_secs: 3600,
            ceiling: 1_000,
            max_concurrent: 4,
            permitted_modes: None,
            request_max_cost: ceiling.max_cost,
            request_max_secs: ceiling.max_duration.as_secs(),
            requesters: BTreeMap::new(),
        }
    }
}

impl FileBudgetConfig {
    pub fn request_ceiling(&self) -> BudgetCeiling {
        BudgetCeiling::new(
            self.request_max_cost,
            Duration::from_secs(self.request_max_secs),
        )
    }

    /// Parse `permitted_modes`, collecting issues for unknown names.
    pub fn parse_permitted_modes(&self) -> (Option<Vec<Mode>>, Vec<ConfigIssue>) {
        let Some(names) = &self.permitted_modes else {
            return (None, Vec::new());
        };
        let mut issues = Vec::new();
        let mut modes = Vec::new();
        for name in names {
            match name.parse::<Mode>() {
                Ok(mode) => modes.push(mode),
                Err(_) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownMode,
                    format!("budget.permitted_modes: unknown mode '{}'", name),
                )),
            }
        }
        (Some(modes), issues)
    }

    pub fn validate(&self, cheapest_call: Option<CostUnits>) -> Vec<ConfigIssue> {
        let mut issues = self.parse_permitted_modes().1;
        if self.max_concurrent == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroConcurrency,
                "budget.max_concurrent must be greater than 0",
            ));
        }
        if let Some(cheapest) = cheapest_call
            && self.ceiling.min(self.request_max_cost) < cheapest
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::CeilingBelowCheapestCall,
                format!(
                    "budget ceiling is below the cheapest model call ({} units); every request will be denied",
                    cheapest
                ),
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permitted_modes_parse() {
        let config: FileBudgetConfig =
            toml::from_str(r#"permitted_modes = ["quick", "council", "turbo"]"#).unwrap();
        let (modes, issues) = config.parse_permitted_modes();
        assert_eq!(modes, Some(vec![Mode::Quick, Mode::Council]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::UnknownMode);
    }

    #[test]
    fn test_ceiling_below_cheapest_call_warns() {
        let config = FileBudgetConfig {
            request_max_cost: 0,
            ..Default::default()
        };
        let issues = config.validate(Some(1));
        assert_eq!(issues[0].code, ConfigIssueCode::CeilingBelowCheapestCall);
        assert!(FileBudgetConfig::default().validate(Some(1)).is_empty());
    }

    #[test]
    fn test_request_ceiling_defaults() {
        assert_eq!(
            FileBudgetConfig::default().request_ceiling(),
            BudgetCeiling::default()
        );
    }
}
