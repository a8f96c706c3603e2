use std::path::Path;

use ndarray::{ArrayD, ArrayView3, Axis, IxDyn};
use tracing::info;

use crate::error::{ChromaDriftError, Result};
use crate::io::tiff_stack;
use crate::register::{align_time_series, PairwiseRegistrationEngine};
use crate::volume::{PixelType, Volume};

use super::config::DriftConfig;
use super::helpers::list_tiffs;
use super::types::{PipelineStage, ProgressReporter, RunReport};

/// Register every time-series stack in the input folder to its first frame.
///
/// Output files keep their input names and are written with
/// `config.output_dtype`. A series that fails to register fails the run.
pub fn run_drift_correction(
    config: &DriftConfig,
    reporter: &dyn ProgressReporter,
) -> Result<RunReport> {
    let inputs = list_tiffs(&config.input_folder)?;
    std::fs::create_dir_all(&config.output_folder)?;
    let engine = PairwiseRegistrationEngine::new(config.registration.clone());

    let mut report = RunReport::default();
    for input in &inputs {
        info!(file = %input.display(), "Processing time series");
        let (array, dtype) = tiff_stack::read_array(input)?;
        let shape = array.shape().to_vec();
        let frames = split_frames(&array, dtype)?;

        reporter.begin_stage(PipelineStage::Registering, Some(frames.len()));
        let aligned = align_time_series(&frames, &engine, |done| reporter.advance(done))?;
        reporter.finish_stage();

        let output = config.output_folder.join(file_name(input));
        let stacked = restack(&aligned, &shape)?;
        tiff_stack::write_array(&output, &stacked.view(), config.output_dtype)?;
        info!(file = %output.display(), frames = aligned.len(), "Saved registered series");
        report.outputs.push(output);
    }

    Ok(report)
}

/// Split a series along its first axis: (T, Y, X) yields planar frames,
/// (T, Z, Y, X) yields volumes, and a lone (Y, X) plane is one frame.
pub fn split_frames(array: &ArrayD<f64>, dtype: PixelType) -> Result<Vec<Volume>> {
    match array.ndim() {
        2 => Ok(vec![Volume::from_dyn(array.clone(), dtype)?]),
        3 | 4 => array
            .axis_iter(Axis(0))
            .map(|frame| Volume::from_dyn(frame.to_owned(), dtype))
            .collect(),
        _ => Err(ChromaDriftError::Shape(format!(
            "expected a (T, Y, X) or (T, Z, Y, X) series, got shape {:?}",
            array.shape()
        ))),
    }
}

fn restack(frames: &[Volume], shape: &[usize]) -> Result<ArrayD<f64>> {
    let views: Vec<ArrayView3<f64>> = frames.iter().map(|f| f.data.view()).collect();
    let stacked = ndarray::stack(Axis(0), &views)
        .map_err(|e| ChromaDriftError::Shape(e.to_string()))?;
    stacked
        .into_dyn()
        .into_shape_with_order(IxDyn(shape))
        .map_err(|e| ChromaDriftError::Shape(e.to_string()))
}

fn file_name(path: &Path) -> &Path {
    path.file_name().map(Path::new).unwrap_or(path)
}
