//! Configuration file support for Ion.
//!
//! Ion reads two optional configuration files:
//! - Global: `~/.ion/config.toml` - User-wide defaults
//! - Project: `.ion/config.toml` in the current directory - Local overrides
//!
//! Project config takes precedence over global config, and command line flags
//! take precedence over both.
//!
//! ```toml
//! [build]
//! output = "target/ion"
//! bitcode = false
//! jobs = 4
//!
//! [tools]
//! path = "C:/ion/tools"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable pointing at an alternative global config file.
pub const CONFIG_ENV: &str = "ION_CONFIG";

/// Ion configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IonConfig {
    /// Build settings
    pub build: BuildConfig,

    /// Toolchain settings
    pub tools: ToolsConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default output directory
    pub output: Option<PathBuf>,

    /// Emit bitcode instead of textual IR
    pub bitcode: bool,

    /// Default number of parallel compile jobs (None = one per core)
    pub jobs: Option<usize>,
}

/// Toolchain configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Directory holding the bundled tool binaries
    pub path: Option<PathBuf>,
}

impl IonConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist
    /// or can't be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: IonConfig) {
        if other.build.output.is_some() {
            self.build.output = other.build.output;
        }
        if other.build.bitcode {
            self.build.bitcode = true;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.tools.path.is_some() {
            self.tools.path = other.tools.path;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.ion/config.toml)
/// 2. Global config (~/.ion/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> IonConfig {
    let mut config = IonConfig::default();

    if let Some(global) = global_path.filter(|p| p.exists()) {
        config.merge(IonConfig::load_or_default(global));
    }

    if project_path.exists() {
        config.merge(IonConfig::load_or_default(project_path));
    }

    config
}

/// Get the global ion config directory (~/.ion).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".ion"))
}

/// Get the global config path, honoring `ION_CONFIG`.
pub fn global_config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .or_else(|| global_config_dir().map(|dir| dir.join("config.toml")))
}

/// Get the project config path (.ion/config.toml).
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(".ion").join("config.toml")
}
