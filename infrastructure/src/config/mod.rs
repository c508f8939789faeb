//! Configuration file loading for synod
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. `SYNOD_` environment variables (`SYNOD_ENGINE__DEADLINE_SECS=60`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./synod.toml` or `./.synod.toml`
//! 4. Global: `$XDG_CONFIG_HOME/synod/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileAnthropicConfig, FileBudgetConfig, FileConfig, FileEngineConfig, FileGoogleConfig,
    FileModePolicy, FileModelEntry, FileModesConfig, FileOpenAiConfig, FileOutputConfig,
    FileProvidersConfig,
};
pub use loader::{ConfigError, ConfigLoader, ConfigSource};
