//! Configuration inspection.

use anyhow::{Context, Result};
use geocast_config::GeocastConfig;

/// Prints the effective configuration as TOML.
pub fn show(config: &GeocastConfig) -> Result<()> {
    let rendered = config
        .to_toml_string()
        .context("failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}
