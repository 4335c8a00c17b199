use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod env_vars;
pub mod validation;

use crate::error::{ConfigError, Result};
use env_vars::{EnvParser, EnvVars};
use validation::ConfigValidator;

fn default_pool_size() -> usize {
    4
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_operation_timeout_seconds() -> u64 {
    30
}

fn default_page_limit() -> u32 {
    crate::core::models::DEFAULT_PAGE_LIMIT
}

fn default_verse_count() -> usize {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Database file path
    pub database_path: PathBuf,

    /// Number of pooled SQLite connections
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// How long a connection waits on a locked database (milliseconds)
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Deadline for a single store operation (seconds)
    #[serde(default = "default_operation_timeout_seconds")]
    pub operation_timeout_seconds: u64,

    /// Rows returned by `list` when no limit is given
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,

    /// Verses returned by `text` when no count is given
    #[serde(default = "default_verse_count")]
    pub default_verse_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        // Use /data only when explicitly running under Docker (DOCKER env var)
        let default_data_path = if env::var(EnvVars::DOCKER).is_ok() {
            PathBuf::from("/data")
        } else {
            match ProjectDirs::from("org", "songbook", "songbook") {
                Some(project_dirs) => project_dirs.data_dir().to_path_buf(),
                None => {
                    warn!("ProjectDirs unavailable; falling back to current directory for data path");
                    PathBuf::from(".")
                }
            }
        };

        Self {
            database_path: default_data_path.join("songbook.db"),
            pool_size: default_pool_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
            operation_timeout_seconds: default_operation_timeout_seconds(),
            default_page_limit: default_page_limit(),
            default_verse_count: default_verse_count(),
        }
    }
}

impl Config {
    /// Layered load: defaults, then the config file, then `.env`, then
    /// `SONGBOOK_*` environment variables.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config_file = Self::resolve_path(config_path)?;
        Self::load_from(&config_file)
    }

    /// The file `load` reads: the given path, or the default location.
    pub fn resolve_path(config_path: Option<&str>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_config_path(),
        }
    }

    pub fn load_from(config_file: &Path) -> Result<Self> {
        let mut config = Self::from_file_or_default(config_file)?;

        // Try to load .env file if it exists (for Docker and development)
        dotenvy::dotenv().ok();
        config.load_from_env()?;
        config.validate()?;

        // Save config file if it doesn't exist
        if !config_file.exists() {
            if let Some(parent) = config_file.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(ConfigError::Io)?;
                }
            }
            config.save(config_file)?;
            debug!("Wrote default config to {}", config_file.display());
        }

        Ok(config)
    }

    fn from_file_or_default(config_file: &Path) -> Result<Self> {
        if !config_file.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_file).map_err(ConfigError::Io)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::InvalidFormat)?;
        Ok(config)
    }

    /// Override fields from environment variables (highest priority)
    fn load_from_env(&mut self) -> Result<()> {
        if let Some(path) = EnvParser::parse_path(EnvVars::DATABASE_PATH, false)? {
            self.database_path = path;
        }

        if let Some(size) = EnvParser::parse_in_range::<usize>(EnvVars::POOL_SIZE, 1, 64)? {
            self.pool_size = size;
        }

        if let Some(ms) = EnvParser::parse_in_range::<u64>(EnvVars::BUSY_TIMEOUT_MS, 0, 600_000)? {
            self.busy_timeout_ms = ms;
        }

        if let Some(seconds) = EnvParser::parse_in_range::<u64>(EnvVars::OPERATION_TIMEOUT_SECONDS, 1, 3600)? {
            self.operation_timeout_seconds = seconds;
        }

        if let Some(limit) = EnvParser::parse_in_range::<u32>(EnvVars::DEFAULT_PAGE_LIMIT, 0, u32::MAX)? {
            self.default_page_limit = limit;
        }

        if let Some(count) = EnvParser::parse_in_range::<usize>(EnvVars::DEFAULT_VERSE_COUNT, 0, usize::MAX)? {
            self.default_verse_count = count;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate_db_path(&self.database_path)?;
        ConfigValidator::validate_range(self.pool_size, 1, 64, "pool_size")?;
        ConfigValidator::validate_range(self.operation_timeout_seconds, 1, 3600, "operation_timeout_seconds")?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    fn default_config_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("org", "songbook", "songbook").ok_or(ConfigError::ProjectDirs)?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
