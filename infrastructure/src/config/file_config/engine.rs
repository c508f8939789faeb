//! Engine configuration from TOML (`[engine]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use synod_application::config::{EngineConfig, RetryPolicy, Sampling};
use synod_domain::{ConfigIssue, ConfigIssueCode, ModePolicyTable};

/// # Example
///
/// ```toml
/// [engine]
/// deadline_secs = 90
/// max_tokens = 2048
/// temperature = 0.7
/// synthesis_max_tokens = 4096
/// retry_attempts = 2
/// retry_backoff_ms = 250
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Wall-clock limit for requests that set none
    pub deadline_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    pub synthesis_max_tokens: u32,
    pub synthesis_temperature: f32,
    /// Total attempts per invocation, including the first
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    /// Contribution excerpt length in characters
    pub excerpt_chars: usize,
    /// Minimum weighted capability score for panel eligibility
    pub minimum_score: f64,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            deadline_secs: 120,
            max_tokens: 2048,
            temperature: 0.7,
            synthesis_max_tokens: 4096,
            synthesis_temperature: 0.3,
            retry_attempts: 2,
            retry_backoff_ms: 250,
            excerpt_chars: 600,
            minimum_score: 0.0,
        }
    }
}

impl FileEngineConfig {
    pub fn to_engine_config(&self, modes: ModePolicyTable) -> EngineConfig {
        EngineConfig {
            default_deadline: Duration::from_secs(self.deadline_secs),
            panel: Sampling::new(self.max_tokens, self.temperature),
            synthesis: Sampling::new(self.synthesis_max_tokens, self.synthesis_temperature),
            retry: RetryPolicy {
                max_attempts: self.retry_attempts.max(1),
                backoff: Duration::from_millis(self.retry_backoff_ms),
            },
            excerpt_chars: self.excerpt_chars,
            minimum_score: self.minimum_score,
            modes,
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.deadline_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroDeadline,
                "engine.deadline_secs must be greater than 0",
            ));
        }
        if self.retry_attempts == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroRetryAttempts,
                "engine.retry_attempts is 0; every model is still called once",
            ));
        }
        issues
    }
}
