//! Configuration issues reported by validation.
//!
//! Validation never fails outright; it returns every problem it finds with a
//! severity so the caller decides whether to abort or just log.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The configuration cannot work.
    Error,
    /// Works, but probably not as intended.
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    UnknownMode,
    InvalidPanelBounds,
    AllModesDisabled,
    DuplicateModel,
    UnknownProviderFamily,
    NoEnabledModels,
    ZeroDeadline,
    ZeroRetryAttempts,
    ZeroConcurrency,
    CeilingBelowCheapestCall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_errors_true_for_errors() {
        let issues = vec![
            ConfigIssue::warning(ConfigIssueCode::ZeroRetryAttempts, "no retries"),
            ConfigIssue::error(ConfigIssueCode::UnknownMode, "bad mode"),
        ];
        assert!(has_errors(&issues));
    }

    #[test]
    fn has_errors_false_for_warnings_only() {
        let issues = vec![ConfigIssue::warning(ConfigIssueCode::ZeroRetryAttempts, "x")];
        assert!(!has_errors(&issues));
        assert!(!has_errors(&[]));
    }

    #[test]
    fn display_includes_severity() {
        let issue = ConfigIssue::error(ConfigIssueCode::ZeroDeadline, "deadline is zero");
        assert_eq!(issue.to_string(), "error: deadline is zero");
    }
}
