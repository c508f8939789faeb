//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const PROJECT_FILES: [&str; 2] = ["synod.toml", ".synod.toml"];
const ENV_PREFIX: &str = "SYNOD_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("explicit config file not found: {}", .0.display())]
    MissingFile(PathBuf),
}

/// One place configuration may come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub path: PathBuf,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `SYNOD_` environment variables, `__` separating sections
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./synod.toml` or `./.synod.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/synod/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        Self::load_from(
            Self::global_config_path().as_deref(),
            Path::new("."),
            config_path,
        )
    }

    pub(crate) fn load_from(
        global: Option<&Path>,
        project_dir: &Path,
        explicit: Option<&Path>,
    ) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global) = global
            && global.exists()
        {
            debug!(path = %global.display(), "merging global config");
            figment = figment.merge(Toml::file(global));
        }

        if let Some(project) = Self::project_config_in(project_dir) {
            debug!(path = %project.display(), "merging project config");
            figment = figment.merge(Toml::file(project));
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            debug!(path = %path.display(), "merging explicit config");
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        figment.extract().map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("synod").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Every file source, highest priority first.
    pub fn sources(config_path: Option<&Path>) -> Vec<ConfigSource> {
        let mut sources = Vec::new();
        if let Some(path) = config_path {
            sources.push(ConfigSource {
                label: "Explicit",
                path: path.to_path_buf(),
                found: path.exists(),
            });
        }
        sources.push(match Self::project_config_path() {
            Some(path) => ConfigSource {
                label: "Project",
                path,
                found: true,
            },
            None => ConfigSource {
                label: "Project",
                path: PathBuf::from(PROJECT_FILES[0]),
                found: false,
            },
        });
        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource {
                label: "Global",
                found: path.exists(),
                path,
            });
        }
        sources
    }
}
