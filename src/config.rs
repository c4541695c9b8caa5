//! Configuration management for the hotel toolkit
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::ToolkitError;
use crate::models::Amenity;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the hotel toolkit
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HotelKitConfig {
    /// Search limits and vocabulary
    pub search: SearchConfig,
    /// Ranking tie-break settings
    pub ranking: RankingConfig,
    /// Hotel data source configuration
    pub data_source: DataSourceConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Search behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of hotels returned by a search
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Maximum number of candidates a data source hands to ranking
    #[serde(default = "default_candidate_cap")]
    pub candidate_cap: usize,
    /// Radius around the query point in kilometers
    #[serde(default = "default_search_radius")]
    pub search_radius_km: f64,
    /// Amenity tags callers may filter on
    #[serde(default = "default_amenity_vocabulary")]
    pub amenity_vocabulary: Vec<Amenity>,
}

/// Ranking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Distances are compared after rounding to this many meters
    #[serde(default = "default_distance_granularity")]
    pub distance_granularity_meters: f64,
}

/// Hotel data source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    /// Base URL of the hotel REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key sent as a bearer token
    pub api_key: Option<String>,
    /// Deadline for a single data source call in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Shortest wait before a retry in milliseconds; later retries back off exponentially
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// Static JSON dataset used instead of the REST API when set
    pub dataset_path: Option<PathBuf>,
    /// User agent for outgoing requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_max_results() -> usize {
    10
}

fn default_candidate_cap() -> usize {
    50
}

fn default_search_radius() -> f64 {
    20.0
}

fn default_amenity_vocabulary() -> Vec<Amenity> {
    Amenity::ALL.to_vec()
}

fn default_distance_granularity() -> f64 {
    1.0
}

fn default_base_url() -> String {
    "http://localhost:8080/api/v1".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    250
}

fn default_user_agent() -> String {
    format!("HotelKit/{}", crate::VERSION)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            candidate_cap: default_candidate_cap(),
            search_radius_km: default_search_radius(),
            amenity_vocabulary: default_amenity_vocabulary(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            distance_granularity_meters: default_distance_granularity(),
        }
    }
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
            dataset_path: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl DataSourceConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Deadline for one HTTP attempt, so every retry fits inside `timeout()`
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        self.timeout() / (self.max_retries + 1)
    }

    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl HotelKitConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. HOTELKIT_DATA_SOURCE__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("HOTELKIT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: HotelKitConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hotelkit").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.search.max_results == 0 {
            self.search.max_results = default_max_results();
        }
        if self.search.candidate_cap == 0 {
            self.search.candidate_cap = default_candidate_cap();
        }
        if self.search.search_radius_km <= 0.0 {
            self.search.search_radius_km = default_search_radius();
        }
        if self.search.amenity_vocabulary.is_empty() {
            self.search.amenity_vocabulary = default_amenity_vocabulary();
        }
        if self.data_source.base_url.is_empty() {
            self.data_source.base_url = default_base_url();
        }
        if self.data_source.timeout_seconds == 0 {
            self.data_source.timeout_seconds = default_timeout();
        }
        if self.data_source.user_agent.is_empty() {
            self.data_source.user_agent = default_user_agent();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API key if one is configured
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = &self.data_source.api_key {
            if api_key.trim().is_empty() {
                return Err(ToolkitError::config(
                    "Data source API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() > 256 {
                return Err(ToolkitError::config(
                    "Data source API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.search.max_results > 100 {
            return Err(ToolkitError::config("Maximum results cannot exceed 100").into());
        }

        if self.search.candidate_cap < self.search.max_results {
            return Err(ToolkitError::config(
                "Candidate cap cannot be smaller than maximum results",
            )
            .into());
        }

        if self.search.candidate_cap > 500 {
            return Err(ToolkitError::config("Candidate cap cannot exceed 500").into());
        }

        if !(self.search.search_radius_km > 0.0 && self.search.search_radius_km <= 200.0) {
            return Err(
                ToolkitError::config("Search radius must be between 0 and 200 km").into(),
            );
        }

        if !(self.ranking.distance_granularity_meters >= 0.0
            && self.ranking.distance_granularity_meters <= 5_000.0)
        {
            return Err(ToolkitError::config(
                "Distance granularity must be between 0 and 5000 meters",
            )
            .into());
        }

        if self.data_source.timeout_seconds > 120 {
            return Err(
                ToolkitError::config("Data source timeout cannot exceed 120 seconds").into(),
            );
        }

        if self.data_source.max_retries > 5 {
            return Err(ToolkitError::config("Data source max retries cannot exceed 5").into());
        }

        if self.data_source.retry_backoff_ms > 10_000 {
            return Err(
                ToolkitError::config("Data source retry backoff cannot exceed 10000 ms").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ToolkitError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ToolkitError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.data_source.base_url.starts_with("http://")
            && !self.data_source.base_url.starts_with("https://")
        {
            return Err(ToolkitError::config(
                "Data source base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}
