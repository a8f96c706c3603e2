use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ChromaDriftError, Result};

/// Columns every channel map must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["fov", "timepoint", "channel", "filepath"];

/// One row of a channel map: a single-channel image file and where it belongs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMapEntry {
    pub fov: String,
    pub timepoint: String,
    pub channel: String,
    pub filepath: PathBuf,
}

impl ChannelMapEntry {
    pub fn new(
        fov: impl Into<String>,
        timepoint: impl Into<String>,
        channel: impl Into<String>,
        filepath: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fov: fov.into(),
            timepoint: timepoint.into(),
            channel: channel.into(),
            filepath: filepath.into(),
        }
    }
}

/// Parse a channel map CSV. Extra columns are ignored.
pub fn read_channel_map(path: &Path) -> Result<Vec<ChannelMapEntry>> {
    if !path.exists() {
        return Err(ChromaDriftError::MissingFile(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(ChromaDriftError::ChannelMap(format!(
            "{} is missing required column(s): {}",
            path.display(),
            missing.join(", ")
        )));
    }

    reader
        .deserialize::<ChannelMapEntry>()
        .map(|row| row.map_err(ChromaDriftError::from))
        .collect()
}
