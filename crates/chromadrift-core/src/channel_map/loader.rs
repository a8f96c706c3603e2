use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ChromaDriftError, Result};
use crate::io::naming::group_name;
use crate::io::VolumeSource;
use crate::volume::{MultichannelVolume, Volume};

use super::entry::{read_channel_map, ChannelMapEntry};

/// Grouping key ordering: by field, then numeric timepoints (numerically)
/// ahead of textual ones (lexically).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    fov: String,
    timepoint: TimepointKey,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum TimepointKey {
    Numeric(u64),
    Text(String),
}

impl TimepointKey {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse() {
                return Self::Numeric(n);
            }
        }
        Self::Text(raw.to_string())
    }
}

/// One (field, timepoint) group stacked into a multichannel volume.
#[derive(Clone, Debug)]
pub struct ChannelGroup {
    /// `{fov}_t{timepoint}` with numeric timepoints padded to three digits.
    pub name: String,
    pub fov: String,
    pub timepoint: String,
    pub volume: MultichannelVolume,
    /// Channel labels in stacking order (lexical).
    pub channels: Vec<String>,
}

/// Groups scattered single-channel files into per-(field, timepoint) volumes.
#[derive(Clone, Debug)]
pub struct ChannelMapLoader {
    entries: Vec<ChannelMapEntry>,
}

impl ChannelMapLoader {
    pub fn new(entries: Vec<ChannelMapEntry>) -> Self {
        Self { entries }
    }

    /// Read and validate a channel map CSV.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(read_channel_map(path)?))
    }

    pub fn entries(&self) -> &[ChannelMapEntry] {
        &self.entries
    }

    /// Load every group.
    ///
    /// A referenced file that does not exist is fatal here, unlike the
    /// per-file split-channel runner which skips it.
    pub fn group(&self, source: &dyn VolumeSource) -> Result<Vec<ChannelGroup>> {
        let mut partitions: BTreeMap<GroupKey, Vec<&ChannelMapEntry>> = BTreeMap::new();
        for entry in &self.entries {
            let key = GroupKey {
                fov: entry.fov.clone(),
                timepoint: TimepointKey::parse(&entry.timepoint),
            };
            partitions.entry(key).or_default().push(entry);
        }

        let mut groups = Vec::with_capacity(partitions.len());
        for (_, mut members) in partitions {
            members.sort_by(|a, b| a.channel.cmp(&b.channel));
            groups.push(load_group(&members, source)?);
        }

        info!(groups = groups.len(), "Grouped channel map");
        Ok(groups)
    }
}

fn load_group(members: &[&ChannelMapEntry], source: &dyn VolumeSource) -> Result<ChannelGroup> {
    let first = members[0];
    let name = group_name(&first.fov, &first.timepoint);

    let mut seen = BTreeSet::new();
    for entry in members {
        if !seen.insert(entry.channel.as_str()) {
            return Err(ChromaDriftError::ChannelMap(format!(
                "channel '{}' appears more than once in {}",
                entry.channel, name
            )));
        }
    }

    let mut volumes = Vec::with_capacity(members.len());
    for entry in members {
        if !source.exists(&entry.filepath) {
            return Err(ChromaDriftError::MissingFile(entry.filepath.clone()));
        }
        let (array, dtype) = source.load(&entry.filepath)?;
        let volume = Volume::from_dyn(array, dtype).map_err(|e| match e {
            ChromaDriftError::Shape(msg) => {
                ChromaDriftError::Shape(format!("{}: {}", entry.filepath.display(), msg))
            }
            other => other,
        })?;
        debug!(file = %entry.filepath.display(), shape = ?volume.data.dim(), "Loaded channel");
        volumes.push(volume);
    }

    let shape = volumes[0].data.dim();
    if volumes.iter().any(|v| v.data.dim() != shape) {
        let shapes: Vec<_> = volumes.iter().map(|v| v.data.dim()).collect();
        return Err(ChromaDriftError::Shape(format!(
            "inconsistent shapes for {}: {:?}",
            name, shapes
        )));
    }

    Ok(ChannelGroup {
        name,
        fov: first.fov.clone(),
        timepoint: first.timepoint.clone(),
        volume: MultichannelVolume::stack(&volumes)?,
        channels: members.iter().map(|e| e.channel.clone()).collect(),
    })
}
