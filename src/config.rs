//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration management for the decision search library,
//! supporting TOML files and environment variable overrides with validation
//! and type-safe access to all settings.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Weight totals, query length bounds, window sizes
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration files
//! 3. Default values (lowest priority)

use crate::errors::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Relevance scoring configuration
    pub scoring: ScoringConfig,
    /// Match highlighting configuration
    pub highlighting: HighlightConfig,
    /// Feedback storage settings
    pub storage: StorageConfig,
    /// Search behavior
    pub search: SearchConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Relevance scoring configuration.
///
/// Field weights must sum to 100 so the total score lands on a 0-100 scale
/// without further normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight of title matches
    pub title_weight: u32,
    /// Weight of keyword matches
    pub keyword_weight: u32,
    /// Weight of summary matches
    pub summary_weight: u32,
    /// Weight of full-text matches
    pub full_text_weight: u32,
    /// Number of leading full-text characters considered for scoring.
    /// Bounds the cost of scoring long decisions.
    pub full_text_window: usize,
    /// Minimum token length, in characters
    pub min_token_length: usize,
    /// Maximum number of top contributing terms reported per breakdown
    pub top_terms_limit: usize,
}

/// Match highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Maximum number of term highlights per text, to bound rendering cost
    pub max_highlights: usize,
}

/// Feedback storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file path for the sled-backed feedback store
    pub db_path: PathBuf,
}

/// Search behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of results to return
    pub max_results: usize,
    /// Minimum query length, in characters
    pub min_query_length: usize,
    /// Maximum query length, in characters
    pub max_query_length: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| SearchError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| SearchError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(db_path) = std::env::var("DECRETUM_DB_PATH") {
            self.storage.db_path = PathBuf::from(db_path);
        }
        if let Ok(level) = std::env::var("DECRETUM_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(max_results) = std::env::var("DECRETUM_MAX_RESULTS") {
            self.search.max_results = max_results.parse().map_err(|_| SearchError::Config {
                message: "Invalid number in DECRETUM_MAX_RESULTS".to_string(),
            })?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let weight_sum = self.scoring.title_weight
            + self.scoring.keyword_weight
            + self.scoring.summary_weight
            + self.scoring.full_text_weight;
        if weight_sum != 100 {
            return Err(SearchError::ValidationFailed {
                field: "scoring".to_string(),
                reason: format!("Field weights must sum to 100, got {}", weight_sum),
            });
        }

        if self.scoring.full_text_window == 0 {
            return Err(SearchError::ValidationFailed {
                field: "scoring.full_text_window".to_string(),
                reason: "Full-text window must be greater than zero".to_string(),
            });
        }

        if self.scoring.min_token_length == 0 {
            return Err(SearchError::ValidationFailed {
                field: "scoring.min_token_length".to_string(),
                reason: "Minimum token length must be greater than zero".to_string(),
            });
        }

        if self.search.min_query_length > self.search.max_query_length {
            return Err(SearchError::ValidationFailed {
                field: "search.min_query_length".to_string(),
                reason: "Minimum query length cannot be greater than maximum".to_string(),
            });
        }

        Ok(())
    }

    /// Get configuration as TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SearchError::Config {
            message: format!("Failed to serialize config to TOML: {}", e),
        })
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig {
                title_weight: 40,
                keyword_weight: 35,
                summary_weight: 20,
                full_text_weight: 5,
                full_text_window: 1000,
                min_token_length: 3,
                top_terms_limit: 5,
            },
            highlighting: HighlightConfig { max_highlights: 20 },
            storage: StorageConfig {
                db_path: PathBuf::from("./data/decretum.db"),
            },
            search: SearchConfig {
                max_results: 50,
                min_query_length: 1,
                max_query_length: 1000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}
