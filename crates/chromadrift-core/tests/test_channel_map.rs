#[allow(dead_code)]
mod common;

use ndarray::{Array2, ArrayD, IxDyn};
use tempfile::TempDir;

use chromadrift_core::channel_map::{read_channel_map, ChannelMapEntry, ChannelMapLoader};
use chromadrift_core::error::ChromaDriftError;
use chromadrift_core::volume::PixelType;

use common::MemorySource;

fn plane(rows: usize, cols: usize, value: f64) -> ArrayD<f64> {
    Array2::from_elem((rows, cols), value).into_dyn()
}

#[test]
fn test_groups_two_channels_into_one_volume() {
    let mut source = MemorySource::default();
    source.insert("/data/a_ch2.tif", plane(6, 5, 2.0), PixelType::U16);
    source.insert("/data/a_ch1.tif", plane(6, 5, 1.0), PixelType::U16);

    let loader = ChannelMapLoader::new(vec![
        ChannelMapEntry::new("A", "0", "ch2", "/data/a_ch2.tif"),
        ChannelMapEntry::new("A", "0", "ch1", "/data/a_ch1.tif"),
    ]);
    let groups = loader.group(&source).unwrap();

    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.name, "A_t000");
    assert_eq!(group.channels, vec!["ch1", "ch2"]);
    assert_eq!(group.volume.data.dim(), (2, 1, 6, 5));
    assert_eq!(group.volume.dtype, PixelType::U16);
    assert_eq!(group.volume.data[[0, 0, 0, 0]], 1.0);
    assert_eq!(group.volume.data[[1, 0, 0, 0]], 2.0);
}

#[test]
fn test_groups_are_ordered_by_fov_then_timepoint() {
    let mut source = MemorySource::default();
    let mut entries = Vec::new();
    for (fov, tp) in [("B", "0"), ("A", "10"), ("A", "2"), ("A", "late")] {
        let path = format!("/data/{fov}_{tp}.tif");
        source.insert(path.as_str(), plane(3, 3, 0.0), PixelType::U8);
        entries.push(ChannelMapEntry::new(fov, tp, "ch1", path));
    }

    let groups = ChannelMapLoader::new(entries).group(&source).unwrap();
    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["A_t002", "A_t010", "A_tlate", "B_t000"]);
}

#[test]
fn test_volume_inputs_keep_depth() {
    let mut source = MemorySource::default();
    source.insert("/v1.tif", ArrayD::zeros(IxDyn(&[4, 3, 3])), PixelType::U16);
    source.insert("/v2.tif", ArrayD::zeros(IxDyn(&[4, 3, 3])), PixelType::U16);
    let loader = ChannelMapLoader::new(vec![
        ChannelMapEntry::new("A", "1", "c1", "/v1.tif"),
        ChannelMapEntry::new("A", "1", "c2", "/v2.tif"),
    ]);
    let groups = loader.group(&source).unwrap();
    assert_eq!(groups[0].volume.data.dim(), (2, 4, 3, 3));
}

#[test]
fn test_missing_file_is_fatal() {
    let mut source = MemorySource::default();
    source.insert("/data/a_ch1.tif", plane(4, 4, 1.0), PixelType::U16);
    let loader = ChannelMapLoader::new(vec![
        ChannelMapEntry::new("A", "0", "ch1", "/data/a_ch1.tif"),
        ChannelMapEntry::new("A", "0", "ch2", "/data/gone.tif"),
    ]);
    assert!(matches!(
        loader.group(&source),
        Err(ChromaDriftError::MissingFile(ref p)) if p.ends_with("gone.tif")
    ));
}

#[test]
fn test_mismatched_shapes_are_rejected() {
    let mut source = MemorySource::default();
    source.insert("/a.tif", plane(4, 4, 0.0), PixelType::U16);
    source.insert("/b.tif", plane(4, 5, 0.0), PixelType::U16);
    let loader = ChannelMapLoader::new(vec![
        ChannelMapEntry::new("A", "0", "ch1", "/a.tif"),
        ChannelMapEntry::new("A", "0", "ch2", "/b.tif"),
    ]);
    assert!(matches!(loader.group(&source), Err(ChromaDriftError::Shape(_))));
}

#[test]
fn test_duplicate_channel_is_rejected() {
    let mut source = MemorySource::default();
    source.insert("/a.tif", plane(4, 4, 0.0), PixelType::U16);
    source.insert("/b.tif", plane(4, 4, 0.0), PixelType::U16);
    let loader = ChannelMapLoader::new(vec![
        ChannelMapEntry::new("A", "0", "ch1", "/a.tif"),
        ChannelMapEntry::new("A", "0", "ch1", "/b.tif"),
    ]);
    assert!(matches!(loader.group(&source), Err(ChromaDriftError::ChannelMap(_))));
}

#[test]
fn test_read_channel_map_csv() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("map.csv");
    std::fs::write(
        &path,
        "fov, timepoint, channel, filepath, notes\nA, 0, 488, /x/a.tif, first\nA, 0, 561, /x/b.tif,\n",
    )
    .unwrap();

    let entries = read_channel_map(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], ChannelMapEntry::new("A", "0", "488", "/x/a.tif"));
    assert_eq!(entries[1].channel, "561");
}

#[test]
fn test_read_channel_map_missing_column() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("map.csv");
    std::fs::write(&path, "fov,channel,filepath\nA,488,/x/a.tif\n").unwrap();

    match read_channel_map(&path) {
        Err(ChromaDriftError::ChannelMap(msg)) => assert!(msg.contains("timepoint")),
        other => panic!("expected channel map error, got {:?}", other),
    }
}
