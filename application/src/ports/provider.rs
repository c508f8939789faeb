//! Provider adapter port
//!
//! Defines the single call contract every model provider implements.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use synod_domain::{CostClass, CostUnits, ModelId, Prompt, ProviderFamily};
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rate limit, timeout, 5xx: worth retrying
    Transient,
    /// Invalid model, auth failure, content policy: retrying will not help
    Permanent,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transient => write!(f, "transient"),
            ErrorKind::Permanent => write!(f, "permanent"),
        }
    }
}

/// Errors returned by a provider call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} provider error: {message}")]
pub struct ProviderError {
    pub kind: ErrorKind,
    pub message: String,
    /// Units the provider billed for the failed call, if any
    pub billed_units: CostUnits,
}

impl ProviderError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transient,
            message: message.into(),
            billed_units: 0,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Permanent,
            message: message.into(),
            billed_units: 0,
        }
    }

    pub fn with_billed(mut self, units: CostUnits) -> Self {
        self.billed_units = units;
        self
    }

    pub fn is_transient(&self) -> bool {
        self.kind == ErrorKind::Transient
    }
}

/// One call to one model.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    pub model: ModelId,
    pub family: ProviderFamily,
    pub cost_class: CostClass,
    pub prompt: Prompt,
    pub max_tokens: u32,
    pub temperature: f32,
    pub deadline: Instant,
    /// Cancelled when the panel's deadline elapses
    pub cancel: CancellationToken,
}

impl InvokeRequest {
    /// Time left before the deadline (zero once it has passed).
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeOutput {
    pub text: String,
    pub cost_units: CostUnits,
}

impl InvokeOutput {
    pub fn new(text: impl Into<String>, cost_units: CostUnits) -> Self {
        Self {
            text: text.into(),
            cost_units,
        }
    }
}

/// Uniform call contract over heterogeneous model APIs
///
/// Implementations live in the infrastructure layer. An adapter keeps no
/// state between calls and should stop work when `request.cancel` fires.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    async fn invoke(&self, request: &InvokeRequest) -> Result<InvokeOutput, ProviderError>;
}
