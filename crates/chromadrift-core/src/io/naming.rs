use std::path::{Path, PathBuf};

/// Insert `suffix` between the file stem and its extension, keeping only the
/// base name: `/a/b/cell.tif` + `_aligned` -> `cell_aligned.tif`.
pub fn suffixed_name(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => PathBuf::from(format!("{}{}.{}", stem, suffix, ext.to_string_lossy())),
        None => PathBuf::from(format!("{}{}", stem, suffix)),
    }
}

/// Output path for `input` inside `output_folder`.
pub fn output_path(output_folder: &Path, input: &Path, suffix: &str) -> PathBuf {
    output_folder.join(suffixed_name(input, suffix))
}

/// Name of a grouped (field, timepoint) volume: `{fov}_t{tp}` where a purely
/// numeric timepoint is zero-padded to three digits.
pub fn group_name(fov: &str, timepoint: &str) -> String {
    let tp = timepoint.trim();
    if !tp.is_empty() && tp.chars().all(|c| c.is_ascii_digit()) {
        match tp.parse::<u64>() {
            Ok(n) => format!("{}_t{:03}", fov, n),
            Err(_) => format!("{}_t{}", fov, tp),
        }
    } else {
        format!("{}_t{}", fov, timepoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_before_extension() {
        assert_eq!(
            suffixed_name(Path::new("/data/run1/cell.tif"), "_aligned"),
            PathBuf::from("cell_aligned.tif")
        );
        assert_eq!(
            suffixed_name(Path::new("cell.tiff"), "_aligned"),
            PathBuf::from("cell_aligned.tiff")
        );
        assert_eq!(
            suffixed_name(Path::new("img.v2.tif"), "_x"),
            PathBuf::from("img.v2_x.tif")
        );
    }

    #[test]
    fn test_group_name_padding() {
        assert_eq!(group_name("A", "0"), "A_t000");
        assert_eq!(group_name("field01", "12"), "field01_t012");
        assert_eq!(group_name("A", "1234"), "A_t1234");
        assert_eq!(group_name("A", "late"), "A_tlate");
    }
}
