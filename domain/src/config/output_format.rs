//! Output format value object

use serde::{Deserialize, Serialize};

/// How an answer is rendered for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Answer plus contributions, agreement summary and confidence
    #[default]
    Full,
    /// Only the answer text
    Answer,
    /// JSON document of the whole response
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &str {
        match self {
            OutputFormat::Full => "full",
            OutputFormat::Answer => "answer",
            OutputFormat::Json => "json",
        }
    }
}
