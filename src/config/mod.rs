//! Configuration management for smartsearch
//!
//! Loads `config.toml`, applies `SMARTSEARCH_*` environment overrides and
//! validates the result before anything is built from it.

use crate::error::{Result, SmartSearchError};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub session: SessionConfig,
    pub dates: DatesConfig,
    pub ranking: RankingConfig,
    pub patterns: PatternsConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Search session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of recent searches kept
    pub history_capacity: usize,
    /// Where recent searches persist; `None` keeps history session-local
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
}

/// Date phrase interpretation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatesConfig {
    /// First day of the week, e.g. "sunday" or "monday"
    pub week_start: String,
}

impl DatesConfig {
    pub fn week_start(&self) -> Result<Weekday> {
        self.week_start
            .parse::<Weekday>()
            .map_err(|_| SmartSearchError::InvalidConfigValue {
                path: "dates.week_start".to_string(),
                message: format!("Unknown weekday '{}'", self.week_start),
            })
    }
}

/// Relevance scoring and highlight markup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub exact_match_weight: f32,
    pub token_match_weight: f32,
    pub highlight_open: String,
    pub highlight_close: String,
}

/// Pattern configuration - path to the keyword vocabulary file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsConfig {
    /// Built-in vocabulary is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SmartSearchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SmartSearchError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| SmartSearchError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: SMARTSEARCH_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    fn apply_overrides(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix("SMARTSEARCH_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "SESSION__HISTORY_CAPACITY" => {
                self.session.history_capacity = parse_value(path, value)?;
            }
            "SESSION__HISTORY_FILE" => {
                self.session.history_file = Some(PathBuf::from(value));
            }
            "DATES__WEEK_START" => {
                self.dates.week_start = value.to_string();
            }
            "RANKING__EXACT_MATCH_WEIGHT" => {
                self.ranking.exact_match_weight = parse_value(path, value)?;
            }
            "RANKING__TOKEN_MATCH_WEIGHT" => {
                self.ranking.token_match_weight = parse_value(path, value)?;
            }
            "PATTERNS__KEYWORDS_FILE" => {
                self.patterns.keywords_file = Some(PathBuf::from(value));
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            SmartSearchError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("smartsearch").join("config.toml"))
    }
}

fn parse_value<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| SmartSearchError::InvalidConfigValue {
            path: path.to_string(),
            message: format!("Cannot parse '{}'", value),
        })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            session: SessionConfig {
                history_capacity: crate::session::DEFAULT_HISTORY_CAPACITY,
                history_file: Some(PathBuf::from("~/.smartsearch/history.json")),
            },
            dates: DatesConfig {
                week_start: "sunday".to_string(),
            },
            ranking: RankingConfig {
                exact_match_weight: 0.6,
                token_match_weight: 0.4,
                highlight_open: "<mark>".to_string(),
                highlight_close: "</mark>".to_string(),
            },
            patterns: PatternsConfig {
                keywords_file: None,
            },
        }
    }
}
