pub mod align;
pub mod config;
pub mod info;
pub mod register;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Read a TOML run config.
pub(crate) fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = toml::from_str(&contents)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    debug!(path = %path.display(), "Loaded run config");
    Ok(config)
}
