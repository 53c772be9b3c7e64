//! Configuration module
//!
//! TOML file under the platform config dir, every field optional. The
//! database location can be overridden with `PMEM_DATABASE` (used by the
//! integration tests and by MCP host configs).

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub core: CoreConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub mirror: MirrorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Default owner recorded on newly registered projects
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CoreConfig {
    /// Database file; defaults to the platform data dir
    #[serde(default)]
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Hits returned when the caller does not pass a limit
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MirrorConfig {
    /// Mirror root; defaults to `docs/` next to the database
    #[serde(default)]
    pub docs_dir: Option<PathBuf>,
}

impl Config {
    /// Load from the config file, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {:?}", path))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config at {:?}", path))
    }

    /// Config file location (`PMEM_CONFIG` overrides)
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("PMEM_CONFIG") {
            return PathBuf::from(path);
        }
        Self::project_dirs()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".pmem/config.toml"))
    }

    /// Database file location (`PMEM_DATABASE` overrides)
    pub fn db_path(&self) -> PathBuf {
        if let Ok(path) = std::env::var("PMEM_DATABASE") {
            return PathBuf::from(path);
        }
        if let Some(path) = &self.core.database {
            return path.clone();
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join("memory.db"))
            .unwrap_or_else(|| PathBuf::from(".pmem/memory.db"))
    }

    /// Root directory for mirrored document files
    pub fn docs_dir(&self) -> PathBuf {
        if let Some(dir) = &self.mirror.docs_dir {
            return dir.clone();
        }
        self.db_path()
            .parent()
            .map(|p| p.join("docs"))
            .unwrap_or_else(|| PathBuf::from("docs"))
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("", "", "project-memory")
    }
}
