//! Engine configuration file support.
//!
//! Settings are read from `campusflow.toml`. Every field has a default, so an
//! empty file (or no file at all) yields the stock campus configuration.
//!
//! ```toml
//! [recommend]
//! max_distance_km = 1.5
//! occupancy_threshold_pct = 50.0
//!
//! [trends]
//! window_minutes = 30
//! count_threshold = 5
//!
//! [server]
//! port = 8080
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::algorithms::recommend::RecommendPolicy;
use crate::algorithms::slots::{default_forward_keywords, default_slot_table, SlotMatcher, SlotWindow};
use crate::algorithms::trends::TrendPolicy;

/// Name of the configuration file searched by [`EngineConfig::from_default_location`].
pub const CONFIG_FILE: &str = "campusflow.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No {0} found in standard locations")]
    NotFound(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub recommend: RecommendSettings,
    #[serde(default)]
    pub trends: TrendSettings,
    #[serde(default)]
    pub predictions: PredictionSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendSettings {
    /// Search radius when the user names a crowded building.
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
    /// Search radius of the campus-wide busy overview.
    #[serde(default = "default_overview_max_distance_km")]
    pub overview_max_distance_km: f64,
    #[serde(default = "default_occupancy_threshold_pct")]
    pub occupancy_threshold_pct: f64,
    #[serde(default = "default_recommend_limit")]
    pub limit: usize,
    #[serde(default = "default_occupancy_threshold_pct")]
    pub quiet_max_occupancy_pct: f64,
    #[serde(default = "default_quiet_limit")]
    pub quiet_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSettings {
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u32,
    #[serde(default = "default_count_threshold")]
    pub count_threshold: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSettings {
    #[serde(default = "default_entry_limit")]
    pub entry_limit: usize,
    #[serde(default = "default_slot_table")]
    pub slots: Vec<SlotWindow>,
    #[serde(default = "default_forward_keywords")]
    pub forward_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-responder time budget for chat answers.
    #[serde(default = "default_responder_timeout_ms")]
    pub responder_timeout_ms: u64,
}

fn default_max_distance_km() -> f64 {
    1.5
}

fn default_overview_max_distance_km() -> f64 {
    1.0
}

fn default_occupancy_threshold_pct() -> f64 {
    50.0
}

fn default_recommend_limit() -> usize {
    3
}

fn default_quiet_limit() -> usize {
    5
}

fn default_window_minutes() -> u32 {
    30
}

fn default_count_threshold() -> usize {
    5
}

fn default_entry_limit() -> usize {
    crate::algorithms::slots::DEFAULT_ENTRY_LIMIT
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_responder_timeout_ms() -> u64 {
    5_000
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            max_distance_km: default_max_distance_km(),
            overview_max_distance_km: default_overview_max_distance_km(),
            occupancy_threshold_pct: default_occupancy_threshold_pct(),
            limit: default_recommend_limit(),
            quiet_max_occupancy_pct: default_occupancy_threshold_pct(),
            quiet_limit: default_quiet_limit(),
        }
    }
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            window_minutes: default_window_minutes(),
            count_threshold: default_count_threshold(),
        }
    }
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            entry_limit: default_entry_limit(),
            slots: default_slot_table(),
            forward_keywords: default_forward_keywords(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            responder_timeout_ms: default_responder_timeout_ms(),
        }
    }
}

impl RecommendSettings {
    /// Policy for alternatives to a named crowded building.
    pub fn chat_policy(&self) -> RecommendPolicy {
        RecommendPolicy {
            max_distance_km: self.max_distance_km,
            occupancy_threshold_pct: self.occupancy_threshold_pct,
            limit: self.limit,
        }
    }

    pub fn overview_policy(&self) -> RecommendPolicy {
        RecommendPolicy {
            max_distance_km: self.overview_max_distance_km,
            ..self.chat_policy()
        }
    }
}

impl TrendSettings {
    pub fn policy(&self) -> TrendPolicy {
        TrendPolicy {
            window_minutes: self.window_minutes,
            count_threshold: self.count_threshold,
        }
    }
}

impl PredictionSettings {
    pub fn matcher(&self) -> Result<SlotMatcher, ConfigError> {
        SlotMatcher::new(self.slots.clone(), &self.forward_keywords).map_err(|e| {
            ConfigError::InvalidValue {
                key: "predictions.slots".to_string(),
                value: e.to_string(),
            }
        })
    }
}

impl ServerSettings {
    pub fn responder_timeout(&self) -> Duration {
        Duration::from_millis(self.responder_timeout_ms)
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `campusflow.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE),
            PathBuf::from("backend").join(CONFIG_FILE),
            PathBuf::from("..").join(CONFIG_FILE),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound(CONFIG_FILE.to_string()))
    }

    /// Apply `HOST`, `PORT`, `CAMPUSFLOW_WINDOW_MINUTES` and
    /// `CAMPUSFLOW_COUNT_THRESHOLD` from the environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| invalid("PORT", &port))?;
        }
        if let Some(window) = lookup("CAMPUSFLOW_WINDOW_MINUTES") {
            self.trends.window_minutes = window
                .trim()
                .parse()
                .map_err(|_| invalid("CAMPUSFLOW_WINDOW_MINUTES", &window))?;
        }
        if let Some(threshold) = lookup("CAMPUSFLOW_COUNT_THRESHOLD") {
            self.trends.count_threshold = threshold
                .trim()
                .parse()
                .map_err(|_| invalid("CAMPUSFLOW_COUNT_THRESHOLD", &threshold))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.recommend;
        if !(r.max_distance_km.is_finite() && r.max_distance_km >= 0.0) {
            return Err(invalid("recommend.max_distance_km", r.max_distance_km));
        }
        if !(r.overview_max_distance_km.is_finite() && r.overview_max_distance_km >= 0.0) {
            return Err(invalid("recommend.overview_max_distance_km", r.overview_max_distance_km));
        }
        if !r.occupancy_threshold_pct.is_finite() {
            return Err(invalid("recommend.occupancy_threshold_pct", r.occupancy_threshold_pct));
        }
        if self.trends.window_minutes == 0 {
            return Err(invalid("trends.window_minutes", 0));
        }
        if self.trends.count_threshold == 0 {
            return Err(invalid("trends.count_threshold", 0));
        }
        for slot in &self.predictions.slots {
            if slot.start_hour > slot.end_hour || slot.end_hour > 23 {
                return Err(invalid(
                    "predictions.slots",
                    format!("{} {}-{}", slot.label, slot.start_hour, slot.end_hour),
                ));
            }
        }
        Ok(())
    }
}
