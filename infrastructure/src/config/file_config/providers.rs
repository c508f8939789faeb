//! Provider configuration from TOML (`[providers]` section)

use serde::{Deserialize, Serialize};

/// Anthropic API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Direct API key (prefer the env var)
    pub api_key: Option<String>,
    pub base_url: String,
    /// `anthropic-version` header
    pub api_version: String,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            api_version: "2023-06-01".to_string(),
        }
    }
}

/// OpenAI-compatible endpoint configuration, used for OpenAI and Google.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    pub api_key_env: String,
    pub api_key: Option<String>,
    /// Can point at Azure OpenAI or any compatible gateway
    pub base_url: String,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGoogleConfig {
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for FileGoogleConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub anthropic: FileAnthropicConfig,
    pub openai: FileOpenAiConfig,
    pub google: FileGoogleConfig,
}

/// The direct key if set, else the named environment variable.
pub fn resolve_api_key(direct: Option<&str>, env_name: &str) -> Option<String> {
    direct
        .map(str::to_string)
        .or_else(|| std::env::var(env_name).ok())
        .filter(|key| !key.trim().is_empty())
}

impl FileAnthropicConfig {
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key.as_deref(), &self.api_key_env)
    }
}

impl FileOpenAiConfig {
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key.as_deref(), &self.api_key_env)
    }
}

impl FileGoogleConfig {
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key.as_deref(), &self.api_key_env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_provider_section_keeps_defaults() {
        let config: FileProvidersConfig = toml::from_str(
            r#"
[openai]
base_url = "http://localhost:8080/v1"
"#,
        )
        .unwrap();
        assert_eq!(config.openai.base_url, "http://localhost:8080/v1");
        assert_eq!(config.openai.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.google.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.anthropic.api_version, "2023-06-01");
    }

    #[test]
    fn test_direct_key_wins() {
        assert_eq!(
            resolve_api_key(Some("sk-direct"), "SYNOD_TEST_UNSET_KEY"),
            Some("sk-direct".to_string())
        );
        assert_eq!(resolve_api_key(Some("  "), "SYNOD_TEST_UNSET_KEY"), None);
        assert_eq!(resolve_api_key(None, "SYNOD_TEST_UNSET_KEY"), None);
    }
}
