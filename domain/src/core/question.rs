//! Question value object and question-signal detection

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A question to be answered by the panel (Value Object)
///
/// Represents the input query that will be sent to multiple models
/// for parallel answering and synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    content: String,
}

impl Question {
    /// Create a new question
    ///
    /// # Panics
    /// Panics if the content is empty or only whitespace
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        assert!(!content.trim().is_empty(), "Question cannot be empty");
        Self { content }
    }

    /// Try to create a new question, returning an error if it is blank
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            Err(DomainError::InvalidQuestion(
                "question cannot be empty".to_string(),
            ))
        } else {
            Ok(Self { content })
        }
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Classify what kind of question this is.
    pub fn signal(&self) -> QuestionSignal {
        QuestionSignal::detect(&self.content)
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&str> for Question {
    fn from(s: &str) -> Self {
        Question::new(s)
    }
}

impl From<String> for Question {
    fn from(s: String) -> Self {
        Question::new(s)
    }
}

/// The dominant kind of a question.
///
/// Used to pick which capability dimension matters most when ranking
/// panel members and weighting their answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSignal {
    #[default]
    General,
    Coding,
    Reasoning,
    Creative,
    Factual,
}

const CODING_HINTS: &[&str] = &[
    "```", "code", "function", "compile", "compiler", "bug", "stack trace", "exception",
    "refactor", "api", "regex", "sql", "rust", "python", "javascript", "typescript",
    "golang", "borrow checker", "segfault", "unit test",
];

const CREATIVE_HINTS: &[&str] = &[
    "poem", "story", "imagine", "brainstorm", "slogan", "lyrics", "creative", "tagline",
    "fiction", "metaphor",
];

const REASONING_HINTS: &[&str] = &[
    "why", "prove", "explain", "compare", "trade-off", "tradeoff", "should i", "analyze",
    "analyse", "pros and cons", "reason", "implication",
];

const FACTUAL_HINTS: &[&str] = &[
    "what is", "who is", "who was", "when did", "when was", "how many", "how much",
    "capital of", "population", "year", "date of",
];

impl QuestionSignal {
    /// Detect the signal from raw question text.
    ///
    /// Counts keyword hits per category; the category with the most hits
    /// wins. Ties resolve in the order Coding, Creative, Reasoning, Factual.
    /// No hits at all yields [`QuestionSignal::General`].
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();
        let hits = |hints: &[&str]| hints.iter().filter(|h| lower.contains(*h)).count();

        let ranked = [
            (QuestionSignal::Coding, hits(CODING_HINTS)),
            (QuestionSignal::Creative, hits(CREATIVE_HINTS)),
            (QuestionSignal::Reasoning, hits(REASONING_HINTS)),
            (QuestionSignal::Factual, hits(FACTUAL_HINTS)),
        ];

        let mut best = (QuestionSignal::General, 0);
        for (signal, count) in ranked {
            if count > best.1 {
                best = (signal, count);
            }
        }
        best.0
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionSignal::General => "general",
            QuestionSignal::Coding => "coding",
            QuestionSignal::Reasoning => "reasoning",
            QuestionSignal::Creative => "creative",
            QuestionSignal::Factual => "factual",
        }
    }
}

impl std::fmt::Display for QuestionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_creation() {
        let q = Question::new("What is Rust?");
        assert_eq!(q.content(), "What is Rust?");
    }

    #[test]
    #[should_panic]
    fn test_empty_question_panics() {
        Question::new("");
    }

    #[test]
    fn test_try_new_blank_is_error() {
        assert!(Question::try_new("").is_err());
        assert!(matches!(
            Question::try_new("   "),
            Err(DomainError::InvalidQuestion(_))
        ));
        assert!(Question::try_new("Why?").is_ok());
    }

    #[test]
    fn test_detect_coding() {
        let signal = QuestionSignal::detect("Why does this Rust function fail to compile?");
        assert_eq!(signal, QuestionSignal::Coding);
    }

    #[test]
    fn test_detect_creative() {
        assert_eq!(
            QuestionSignal::detect("Write a short poem about autumn"),
            QuestionSignal::Creative
        );
    }

    #[test]
    fn test_detect_factual() {
        assert_eq!(
            QuestionSignal::detect("What is the capital of Australia?"),
            QuestionSignal::Factual
        );
    }

    #[test]
    fn test_detect_general_without_hints() {
        assert_eq!(QuestionSignal::detect("Hello there"), QuestionSignal::General);
    }

    #[test]
    fn test_question_signal_shortcut() {
        let q = Question::new("Compare the trade-off between latency and throughput");
        assert_eq!(q.signal(), QuestionSignal::Reasoning);
    }
}
