//! CLI command implementations.

pub mod config;
pub mod replay;
pub mod version;

use std::path::Path;

use anyhow::{Context, Result};
use geocast_config::{ConfigLoader, GeocastConfig};

/// Loads and validates the layered configuration for `project_dir`.
pub fn load_config(project_dir: &Path) -> Result<GeocastConfig> {
    ConfigLoader::new()
        .with_project_dir(project_dir)
        .load()
        .with_context(|| format!("failed to load configuration from {}", project_dir.display()))
}
