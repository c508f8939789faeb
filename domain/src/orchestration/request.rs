//! Inbound panel request

use super::mode::Mode;
use crate::budget::BudgetCeiling;
use crate::core::question::Question;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque requester identity, used only for budget accounting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequesterId(String);

impl RequesterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequesterId {
    fn default() -> Self {
        Self::new("anonymous")
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user question with its mode and limits (Value Object)
///
/// Immutable once built; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelRequest {
    question: Question,
    context: Option<String>,
    mode: Mode,
    ceiling: BudgetCeiling,
    requester: RequesterId,
}

impl PanelRequest {
    pub fn new(question: Question, mode: Mode, requester: RequesterId) -> Self {
        Self {
            question,
            context: None,
            mode,
            ceiling: BudgetCeiling::default(),
            requester,
        }
    }

    /// Attach retrieved context. Blank context is treated as absent.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = (!context.trim().is_empty()).then_some(context);
        self
    }

    pub fn with_ceiling(mut self, ceiling: BudgetCeiling) -> Self {
        self.ceiling = ceiling;
        self
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn ceiling(&self) -> &BudgetCeiling {
        &self.ceiling
    }

    pub fn requester(&self) -> &RequesterId {
        &self.requester
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_context_is_dropped() {
        let request = PanelRequest::new(
            Question::new("What is Rust?"),
            Mode::Quick,
            RequesterId::default(),
        )
        .with_context("   ");
        assert_eq!(request.context(), None);
    }

    #[test]
    fn test_builder_keeps_fields() {
        let request = PanelRequest::new(
            Question::new("Why?"),
            Mode::Council,
            RequesterId::new("alice"),
        )
        .with_context("notes");
        assert_eq!(request.mode(), Mode::Council);
        assert_eq!(request.context(), Some("notes"));
        assert_eq!(request.requester().as_str(), "alice");
    }
}
