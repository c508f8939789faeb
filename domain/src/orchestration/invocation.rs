//! Per-model invocation records
//!
//! A [`ModelInvocation`] is produced for every model a panel run dispatched,
//! whatever happened to it. Records live only as long as the request.

use crate::model::{CostUnits, ModelId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationOutcome {
    Success,
    /// Still running when the deadline elapsed
    Timeout,
    Error,
    Cancelled,
}

impl InvocationOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            InvocationOutcome::Success => "success",
            InvocationOutcome::Timeout => "timeout",
            InvocationOutcome::Error => "error",
            InvocationOutcome::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInvocation {
    pub model: ModelId,
    pub started_at: DateTime<Utc>,
    /// Completion, failure or cancellation time
    pub ended_at: DateTime<Utc>,
    pub outcome: InvocationOutcome,
    /// Raw output text, empty unless successful
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub cost_units: CostUnits,
    /// False when `cost_units` is an estimate rather than the provider's bill
    pub cost_reported: bool,
    pub attempts: u32,
}

impl ModelInvocation {
    pub fn success(
        model: ModelId,
        started_at: DateTime<Utc>,
        output: impl Into<String>,
        cost_units: CostUnits,
    ) -> Self {
        Self {
            model,
            started_at,
            ended_at: Utc::now(),
            outcome: InvocationOutcome::Success,
            output: output.into(),
            error: None,
            cost_units,
            cost_reported: true,
            attempts: 1,
        }
    }

    pub fn failure(
        model: ModelId,
        started_at: DateTime<Utc>,
        outcome: InvocationOutcome,
        error: impl Into<String>,
    ) -> Self {
        Self {
            model,
            started_at,
            ended_at: Utc::now(),
            outcome,
            output: String::new(),
            error: Some(error.into()),
            cost_units: 0,
            cost_reported: true,
            attempts: 1,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Record a charge. `reported` is false for estimated charges.
    pub fn with_cost(mut self, units: CostUnits, reported: bool) -> Self {
        self.cost_units = units;
        self.cost_reported = reported;
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome == InvocationOutcome::Success
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.ended_at - self.started_at).num_milliseconds()
    }
}
