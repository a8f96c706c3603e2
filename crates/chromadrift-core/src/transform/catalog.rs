use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChromaDriftError, Result};

use super::affine::Affine2;

/// Raw transform store: microscope name -> channel label -> 3x3 matrix rows.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformStore {
    pub microscopes: BTreeMap<String, BTreeMap<String, Vec<Vec<f64>>>>,
}

impl TransformStore {
    /// Read a JSON transform store.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ChromaDriftError::MissingFile(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Parsed affine transforms of one microscope, keyed by channel label.
#[derive(Clone, Debug)]
pub struct TransformCatalog {
    microscope: String,
    transforms: BTreeMap<String, Affine2>,
}

impl TransformCatalog {
    /// Select one microscope from the store and parse all of its matrices.
    pub fn load(store: &TransformStore, microscope: &str) -> Result<Self> {
        let channels = store.microscopes.get(microscope).ok_or_else(|| {
            ChromaDriftError::Configuration {
                microscope: microscope.to_string(),
                known: store
                    .microscopes
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })?;

        let transforms = channels
            .iter()
            .map(|(channel, rows)| {
                Affine2::from_rows(rows)
                    .map(|t| (channel.clone(), t))
                    .map_err(|reason| ChromaDriftError::InvalidTransform {
                        channel: channel.clone(),
                        reason,
                    })
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        debug!(
            microscope,
            channels = transforms.len(),
            "Loaded transform catalog"
        );

        Ok(Self {
            microscope: microscope.to_string(),
            transforms,
        })
    }

    /// Read the store at `path` and select `microscope`.
    pub fn from_path(path: &Path, microscope: &str) -> Result<Self> {
        Self::load(&TransformStore::from_path(path)?, microscope)
    }

    /// Build a catalog directly from parsed transforms.
    pub fn from_transforms(
        microscope: impl Into<String>,
        transforms: impl IntoIterator<Item = (String, Affine2)>,
    ) -> Self {
        Self {
            microscope: microscope.into(),
            transforms: transforms.into_iter().collect(),
        }
    }

    pub fn microscope(&self) -> &str {
        &self.microscope
    }

    pub fn get(&self, channel: &str) -> Result<&Affine2> {
        self.transforms
            .get(channel)
            .ok_or_else(|| ChromaDriftError::MissingTransform(channel.to_string()))
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.transforms.contains_key(channel)
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}
