//! Persistent CLI defaults.
//!
//! Resolution order, last wins:
//! - built-in defaults
//! - `config.json` in the platform config directory (or `--config`)
//! - `CAPCTL_*` environment variables
//! - command-line flags

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use capalloc_validate::{ValidatorConfig, DEFAULT_ISOLATION_CEILING};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

const ENV_ISOLATION_CEILING: &str = "CAPCTL_ISOLATION_CEILING";
const ENV_DOMAIN_SHARE_CEILING: &str = "CAPCTL_DOMAIN_SHARE_CEILING";
const ENV_LOG_LEVEL: &str = "CAPCTL_LOG_LEVEL";

/// Get the default config file path.
fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "capalloc", "capctl").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Isolation ceiling for private pools.
    #[serde(default = "default_isolation_ceiling")]
    pub isolation_ceiling: f64,

    /// Per-entry shared CPU ceiling; disabled when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_share_ceiling: Option<f64>,

    /// Default tracing filter.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_isolation_ceiling() -> f64 {
    DEFAULT_ISOLATION_CEILING
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            isolation_ceiling: default_isolation_ceiling(),
            domain_share_ceiling: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load config from `path` (or the default location) and apply
    /// environment overrides. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        config.with_env(|key| std::env::var(key).ok())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Apply `CAPCTL_*` overrides read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_ISOLATION_CEILING) {
            self.isolation_ceiling = parse_ceiling(ENV_ISOLATION_CEILING, &value)?;
        }
        if let Some(value) = lookup(ENV_DOMAIN_SHARE_CEILING) {
            self.domain_share_ceiling = match value.trim() {
                "" | "none" | "off" => None,
                v => Some(parse_ceiling(ENV_DOMAIN_SHARE_CEILING, v)?),
            };
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        self.validate()?;
        Ok(self)
    }

    /// Override ceilings from flags.
    pub fn with_overrides(
        mut self,
        isolation_ceiling: Option<f64>,
        domain_share_ceiling: Option<f64>,
    ) -> Result<Self> {
        if let Some(ceiling) = isolation_ceiling {
            self.isolation_ceiling = ceiling;
        }
        if domain_share_ceiling.is_some() {
            self.domain_share_ceiling = domain_share_ceiling;
        }
        self.validate()?;
        Ok(self)
    }

    /// Ceilings must lie in `(0, 1]`.
    pub fn validate(&self) -> Result<(), CliError> {
        check_ceiling("isolation_ceiling", self.isolation_ceiling)?;
        if let Some(ceiling) = self.domain_share_ceiling {
            check_ceiling("domain_share_ceiling", ceiling)?;
        }
        Ok(())
    }

    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig::default()
            .with_isolation_ceiling(self.isolation_ceiling)
            .with_domain_share_ceiling(self.domain_share_ceiling)
    }
}

fn parse_ceiling(name: &str, value: &str) -> Result<f64, CliError> {
    let ceiling = value
        .trim()
        .parse::<f64>()
        .map_err(|_| CliError::InvalidArgument(format!("{name} is not a number: {value}")))?;
    check_ceiling(name, ceiling)?;
    Ok(ceiling)
}

fn check_ceiling(name: &str, ceiling: f64) -> Result<(), CliError> {
    if ceiling > 0.0 && ceiling <= 1.0 {
        Ok(())
    } else {
        Err(CliError::InvalidArgument(format!(
            "{name} must be in (0, 1], got {ceiling}"
        )))
    }
}
