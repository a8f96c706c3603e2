use std::path::{Path, PathBuf};

use ndarray::Axis;
use tracing::{info, warn};

use crate::channel_map::{read_channel_map, ChannelMapLoader};
use crate::consts::DEFAULT_OUTPUT_SUFFIX;
use crate::error::Result;
use crate::io::naming::{output_path, suffixed_name};
use crate::io::{tiff_stack, FileVolumeSource, VolumeSource};
use crate::transform::TransformCatalog;
use crate::volume::Volume;
use crate::warp::{align_channels, align_channels_dyn, warp_volume};

use super::config::{ChromaticConfig, InputMode};
use super::helpers::{ensure_unique_outputs, list_tiffs};
use super::types::{PipelineStage, ProgressReporter, RunReport, SkipReason, SkippedInput};

/// Run chromatic correction as described by `config`.
pub fn run_chromatic(config: &ChromaticConfig, reporter: &dyn ProgressReporter) -> Result<RunReport> {
    reporter.begin_stage(PipelineStage::LoadingTransforms, None);
    let catalog = TransformCatalog::from_path(&config.transform_file, &config.microscope)?;
    reporter.finish_stage();
    info!(
        microscope = catalog.microscope(),
        channels = catalog.len(),
        mode = %config.mode,
        "Chromatic correction"
    );

    std::fs::create_dir_all(&config.output_folder)?;

    match &config.mode {
        InputMode::Multichannel {
            input_folder,
            channel_order,
        } => run_multichannel(input_folder, channel_order, &config.output_folder, &catalog, reporter),
        InputMode::SplitChannels {
            channel_map,
            suffix,
        } => run_split_channels(channel_map, suffix, &config.output_folder, &catalog, reporter),
        InputMode::GroupedChannels {
            channel_map,
            suffix,
        } => run_grouped_channels(channel_map, suffix, &config.output_folder, &catalog, reporter),
    }
}

/// Correct every (C, Z, Y, X) TIFF in `input_folder`. The first failing
/// file aborts the run.
fn run_multichannel(
    input_folder: &Path,
    channel_order: &[String],
    output_folder: &Path,
    catalog: &TransformCatalog,
    reporter: &dyn ProgressReporter,
) -> Result<RunReport> {
    let inputs = list_tiffs(input_folder)?;
    let outputs: Vec<PathBuf> = inputs
        .iter()
        .map(|p| output_path(output_folder, p, DEFAULT_OUTPUT_SUFFIX))
        .collect();

    let mut report = RunReport::default();
    reporter.begin_stage(PipelineStage::Warping, Some(inputs.len()));
    for (i, (input, output)) in inputs.iter().zip(outputs).enumerate() {
        info!(file = %input.display(), "Processing");
        let (array, dtype) = tiff_stack::read_array(input)?;
        let aligned = align_channels_dyn(array, dtype, catalog, channel_order)?;
        tiff_stack::write_array(&output, &aligned.data.view().into_dyn(), aligned.dtype)?;
        info!(file = %output.display(), "Saved aligned multichannel stack");
        report.outputs.push(output);
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    Ok(report)
}

/// Correct each channel-map row as its own file, keeping the base name.
///
/// Rows whose file is missing or whose channel has no transform are logged
/// and skipped rather than failing the run.
fn run_split_channels(
    channel_map: &Path,
    suffix: &str,
    output_folder: &Path,
    catalog: &TransformCatalog,
    reporter: &dyn ProgressReporter,
) -> Result<RunReport> {
    let entries = read_channel_map(channel_map)?;
    let source = FileVolumeSource;

    let outputs: Vec<PathBuf> = entries
        .iter()
        .map(|e| output_folder.join(suffixed_name(&e.filepath, suffix)))
        .collect();
    ensure_unique_outputs(&outputs)?;

    let mut report = RunReport::default();
    reporter.begin_stage(PipelineStage::Warping, Some(entries.len()));
    for (i, (entry, output)) in entries.iter().zip(outputs).enumerate() {
        if !source.exists(&entry.filepath) {
            warn!(file = %entry.filepath.display(), "Skipping missing file");
            report.skipped.push(SkippedInput {
                path: entry.filepath.clone(),
                reason: SkipReason::MissingFile,
            });
            reporter.advance(i + 1);
            continue;
        }
        let transform = match catalog.get(&entry.channel) {
            Ok(t) => t,
            Err(_) => {
                warn!(
                    file = %entry.filepath.display(),
                    channel = %entry.channel,
                    "Skipping file (no transformation)"
                );
                report.skipped.push(SkippedInput {
                    path: entry.filepath.clone(),
                    reason: SkipReason::NoTransform(entry.channel.clone()),
                });
                reporter.advance(i + 1);
                continue;
            }
        };

        let (array, dtype) = source.load(&entry.filepath)?;
        let is_plane = array.ndim() == 2;
        let warped = warp_volume(&Volume::from_dyn(array, dtype)?, transform);

        let data = if is_plane {
            warped.data.index_axis(Axis(0), 0).to_owned().into_dyn()
        } else {
            warped.data.into_dyn()
        };
        tiff_stack::write_array(&output, &data.view(), dtype)?;
        info!(file = %output.display(), "Saved aligned");
        report.outputs.push(output);
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    Ok(report)
}

/// Group channel-map rows per (field, timepoint) and correct each group as
/// one multichannel volume.
fn run_grouped_channels(
    channel_map: &Path,
    suffix: &str,
    output_folder: &Path,
    catalog: &TransformCatalog,
    reporter: &dyn ProgressReporter,
) -> Result<RunReport> {
    reporter.begin_stage(PipelineStage::Grouping, None);
    let groups = ChannelMapLoader::open(channel_map)?.group(&FileVolumeSource)?;
    reporter.finish_stage();

    let mut report = RunReport::default();
    reporter.begin_stage(PipelineStage::Warping, Some(groups.len()));
    for (i, group) in groups.iter().enumerate() {
        let aligned = align_channels(&group.volume, catalog, &group.channels)?;
        let output = output_folder.join(format!("{}{}.tif", group.name, suffix));
        tiff_stack::write_array(&output, &aligned.data.view().into_dyn(), aligned.dtype)?;
        info!(
            group = %group.name,
            channels = ?group.channels,
            file = %output.display(),
            "Saved aligned group"
        );
        report.outputs.push(output);
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    Ok(report)
}
