//! Configuration management for Geocast
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (GEOCAST_* prefix, highest precedence)
//! 2. geocast.local.toml (gitignored, local overrides)
//! 3. geocast.toml (git-tracked, project config)
//! 4. ~/.config/geocast/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Geocast configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocastConfig {
    pub cluster: ClusterConfig,
    pub query: QueryConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// Tuning for the event-clustering kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Great-circle distance at or under which two streams are co-located.
    pub join_radius_m: f64,
    /// Radius of the coarse bounding-box pre-filter. Must be at least
    /// `join_radius_m` to absorb the flat-earth approximation error.
    pub prefilter_radius_m: f64,
    /// Only streams started within this many seconds are neighbor candidates.
    pub window_secs: u64,
    /// Nominal radius stamped on new events.
    pub event_radius_m: u32,
    /// Maximum candidates read by one neighbor query.
    pub candidate_limit: usize,
    /// Maximum live members read when recomputing an event aggregate.
    pub member_scan_limit: usize,
    /// Serialize clustering of nearby streams through spatial-cell locks.
    pub cell_locking: bool,
    /// Edge length of a lock cell in degrees.
    pub cell_size_deg: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            join_radius_m: 50.0,
            prefilter_radius_m: 60.0,
            window_secs: 600,
            event_radius_m: 50,
            candidate_limit: 100,
            member_scan_limit: 1000,
            cell_locking: true,
            cell_size_deg: 0.001,
        }
    }
}

impl ClusterConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Checks the clustering settings on their own, for engines built
    /// without the loader.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.join_radius_m.is_finite() && self.join_radius_m > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "cluster.join_radius_m must be positive, got {}",
                self.join_radius_m
            )));
        }
        if !self.prefilter_radius_m.is_finite() || self.prefilter_radius_m < self.join_radius_m {
            return Err(ConfigError::ValidationError(format!(
                "cluster.prefilter_radius_m ({}) must be >= cluster.join_radius_m ({})",
                self.prefilter_radius_m, self.join_radius_m
            )));
        }
        if !(self.cell_size_deg.is_finite() && self.cell_size_deg > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "cluster.cell_size_deg must be positive, got {}",
                self.cell_size_deg
            )));
        }
        reject_zero(&[
            ("cluster.candidate_limit", self.candidate_limit),
            ("cluster.member_scan_limit", self.member_scan_limit),
        ])
    }
}

fn reject_zero(limits: &[(&str, usize)]) -> Result<(), ConfigError> {
    match limits.iter().find(|(_, value)| *value == 0) {
        Some((name, _)) => Err(ConfigError::ValidationError(format!(
            "{name} must be greater than zero"
        ))),
        None => Ok(()),
    }
}

/// Page sizes and defaults for the read side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub live_streams_limit: usize,
    pub live_events_limit: usize,
    pub event_streams_limit: usize,
    pub range_events_limit: usize,
    /// Look-back used by range queries when no lower bound is given.
    pub default_range_secs: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            live_streams_limit: 1000,
            live_events_limit: 500,
            event_streams_limit: 200,
            range_events_limit: 500,
            default_range_secs: 3600,
        }
    }
}

impl QueryConfig {
    pub fn default_range(&self) -> Duration {
        Duration::from_secs(self.default_range_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl GeocastConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cluster.validate()?;
        let limits = [
            ("query.live_streams_limit", self.query.live_streams_limit),
            ("query.live_events_limit", self.query.live_events_limit),
            ("query.event_streams_limit", self.query.event_streams_limit),
            ("query.range_events_limit", self.query.range_events_limit),
        ];
        reject_zero(&limits)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
