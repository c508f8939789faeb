//! Infrastructure layer for synod
//!
//! Adapters that implement the ports defined in the application layer:
//! configuration file loading and model provider clients.

pub mod config;
pub mod providers;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, ConfigSource, FileConfig, FileOutputConfig};
pub use providers::{AnthropicAdapter, LocalAdapter, OpenAiCompatibleAdapter, RoutingProvider};
