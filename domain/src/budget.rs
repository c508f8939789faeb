//! Budget value objects shared by the resolver and the budget guard.

use crate::model::CostUnits;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Per-request spending limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCeiling {
    /// Maximum total cost units for the request
    pub max_cost: CostUnits,
    /// Maximum wall-clock time for the request
    pub max_duration: Duration,
}

impl BudgetCeiling {
    pub fn new(max_cost: CostUnits, max_duration: Duration) -> Self {
        Self {
            max_cost,
            max_duration,
        }
    }

    /// Whether `estimate` fits under the cost limit.
    pub fn allows(&self, estimate: CostUnits) -> bool {
        estimate <= self.max_cost
    }
}

impl Default for BudgetCeiling {
    fn default() -> Self {
        Self::new(200, Duration::from_secs(120))
    }
}

/// Why a request was refused admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    OverBudget,
    /// Too many concurrent requests for this requester
    RateLimited,
    /// The requester's tier does not include the mode
    ModeNotPermitted,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::OverBudget => "over_budget",
            DenialReason::RateLimited => "rate_limited",
            DenialReason::ModeNotPermitted => "mode_not_permitted",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial_reason_wire_names() {
        assert_eq!(DenialReason::OverBudget.to_string(), "over_budget");
        assert_eq!(
            serde_json::to_string(&DenialReason::ModeNotPermitted).unwrap(),
            "\"mode_not_permitted\""
        );
    }

    #[test]
    fn test_ceiling_allows_equal_estimate() {
        let ceiling = BudgetCeiling::new(10, Duration::from_secs(5));
        assert!(ceiling.allows(10));
        assert!(!ceiling.allows(11));
    }
}
