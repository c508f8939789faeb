//! Built-in model catalog used when the configuration declares no models.

use super::definition::{CapabilityScores, CostClass, ModelDefinition, ProviderFamily};

/// Default catalog, scores on the 0-10 scale.
pub fn builtin_models() -> Vec<ModelDefinition> {
    use CostClass::*;
    use ProviderFamily::*;

    vec![
        ModelDefinition::new(
            "claude-opus-4.5",
            Anthropic,
            CapabilityScores::new(9.5, 8.5, 9.0, 4.0, 9.5),
            Expensive,
        )
        .with_max_context(200_000),
        ModelDefinition::new(
            "claude-sonnet-4.5",
            Anthropic,
            CapabilityScores::new(8.5, 8.0, 9.0, 7.0, 8.5),
            Medium,
        )
        .with_max_context(200_000),
        ModelDefinition::new(
            "claude-haiku-4.5",
            Anthropic,
            CapabilityScores::new(6.5, 6.5, 7.0, 9.5, 7.0),
            Cheap,
        )
        .with_max_context(200_000),
        ModelDefinition::new(
            "gpt-5.2",
            OpenAi,
            CapabilityScores::new(9.5, 8.0, 8.5, 5.0, 9.0),
            Expensive,
        ),
        ModelDefinition::new(
            "gpt-5.2-codex",
            OpenAi,
            CapabilityScores::new(8.5, 6.0, 9.5, 6.0, 8.5),
            Medium,
        ),
        ModelDefinition::new(
            "gpt-5-mini",
            OpenAi,
            CapabilityScores::new(6.5, 6.0, 7.0, 9.0, 6.5),
            Cheap,
        )
        .hidden(),
        ModelDefinition::new(
            "gemini-3-pro-preview",
            Google,
            CapabilityScores::new(9.0, 8.5, 8.5, 6.0, 8.5),
            Medium,
        )
        .with_max_context(1_000_000),
        ModelDefinition::new(
            "gemini-2.5-flash",
            Google,
            CapabilityScores::new(7.0, 7.0, 7.0, 9.5, 7.0),
            Cheap,
        )
        .with_max_context(1_000_000),
    ]
}
