//! Engine parameters: deadlines, sampling and retry.
//!
//! [`EngineConfig`] groups the static parameters the
//! [`PanelEngine`](crate::use_cases::ask::PanelEngine) runs with. These are
//! application-layer concerns, not domain policy; the infrastructure config
//! loader builds one from the `[engine]` and `[modes]` sections.

use std::time::Duration;
use synod_domain::ModePolicyTable;

/// Retry behaviour for transient provider errors.
///
/// Retries happen inside one invocation and never extend its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first call
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_millis(250),
        }
    }
}

/// Token limit and temperature for one kind of call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Sampling {
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Used when a request carries no wall-clock limit
    pub default_deadline: Duration,
    pub panel: Sampling,
    pub synthesis: Sampling,
    pub retry: RetryPolicy,
    /// Contribution excerpt length for combine strategies
    pub excerpt_chars: usize,
    /// Minimum weighted capability score for panel eligibility
    pub minimum_score: f64,
    pub modes: ModePolicyTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_deadline: Duration::from_secs(120),
            panel: Sampling::new(2048, 0.7),
            synthesis: Sampling::new(4096, 0.3),
            retry: RetryPolicy::default(),
            excerpt_chars: 600,
            minimum_score: 0.0,
            modes: ModePolicyTable::default(),
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_default_deadline(mut self, deadline: Duration) -> Self {
        self.default_deadline = deadline;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_modes(mut self, modes: ModePolicyTable) -> Self {
        self.modes = modes;
        self
    }

    pub fn with_excerpt_chars(mut self, chars: usize) -> Self {
        self.excerpt_chars = chars;
        self
    }
}
