//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    #[error("No eligible models for mode {0}")]
    NoEligibleModels(String),

    #[error("Duplicate model identifier: {0}")]
    DuplicateModel(String),

    #[error("Unknown provider family: {0}")]
    UnknownProviderFamily(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid tribunal transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl DomainError {
    /// Check if this error was caused by the requested mode itself
    pub fn is_mode_error(&self) -> bool {
        matches!(self, DomainError::InvalidMode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_mode_display() {
        let error = DomainError::InvalidMode("turbo".to_string());
        assert_eq!(error.to_string(), "Invalid mode: turbo");
    }

    #[test]
    fn test_is_mode_error() {
        assert!(DomainError::InvalidMode("x".to_string()).is_mode_error());
        assert!(!DomainError::NoEligibleModels("council".to_string()).is_mode_error());
        assert!(!DomainError::DuplicateModel("gpt-5".to_string()).is_mode_error());
    }

    #[test]
    fn test_transition_display() {
        let error = DomainError::InvalidTransition {
            from: "complete".to_string(),
            to: "revising".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid tribunal transition: complete -> revising"
        );
    }
}
