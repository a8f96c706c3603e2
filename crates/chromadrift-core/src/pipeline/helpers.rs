use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{ChromaDriftError, Result};
use crate::io::image_io::is_tiff;

/// TIFF files directly inside `folder`, sorted by name.
pub(super) fn list_tiffs(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(ChromaDriftError::MissingFile(folder.to_path_buf()));
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_tiff(p))
        .collect();
    files.sort();
    Ok(files)
}

/// Fail if two work items would write the same output file.
pub(super) fn ensure_unique_outputs<'a>(outputs: impl IntoIterator<Item = &'a PathBuf>) -> Result<()> {
    let mut seen = HashSet::new();
    for path in outputs {
        if !seen.insert(path) {
            return Err(ChromaDriftError::ChannelMap(format!(
                "more than one input would be written to {}",
                path.display()
            )));
        }
    }
    Ok(())
}
