use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chromadrift_core::pipeline::config::{DriftConfig, RegistrationConfig};
use chromadrift_core::pipeline::run_drift_correction;
use chromadrift_core::volume::PixelType;
use clap::{Args, ValueEnum};

use crate::progress::BarReporter;
use crate::summary::{print_drift_summary, print_run_report};

#[derive(Clone, ValueEnum)]
pub enum DtypeArg {
    Uint8,
    Uint16,
    Uint32,
    Int8,
    Int16,
    Int32,
    Float32,
    Float64,
}

impl From<&DtypeArg> for PixelType {
    fn from(arg: &DtypeArg) -> Self {
        match arg {
            DtypeArg::Uint8 => PixelType::U8,
            DtypeArg::Uint16 => PixelType::U16,
            DtypeArg::Uint32 => PixelType::U32,
            DtypeArg::Int8 => PixelType::I8,
            DtypeArg::Int16 => PixelType::I16,
            DtypeArg::Int32 => PixelType::I32,
            DtypeArg::Float32 => PixelType::F32,
            DtypeArg::Float64 => PixelType::F64,
        }
    }
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Run config file (TOML); overrides every other option
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Folder of (T, Y, X) or (T, Z, Y, X) stacks
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output folder
    #[arg(short, long, default_value = "registered")]
    pub output: PathBuf,

    /// Pixel type of the written series
    #[arg(long, value_enum, default_value = "uint16")]
    pub dtype: DtypeArg,

    /// Joint-histogram bins of the mutual information metric
    #[arg(long)]
    pub bins: Option<usize>,

    /// Initial optimizer step in pixels
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Optimizer stops once the step shrinks below this
    #[arg(long)]
    pub min_step: Option<f64>,

    /// Iteration budget per frame
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

pub fn run(args: &RegisterArgs) -> Result<()> {
    let config = match args.config {
        Some(ref path) => super::load_toml(path)?,
        None => build_config_from_args(args)?,
    };

    print_drift_summary(&config);

    let reporter = BarReporter::new();
    let report = run_drift_correction(&config, &reporter).context("Drift correction failed")?;
    print_run_report(&report);

    Ok(())
}

fn build_config_from_args(args: &RegisterArgs) -> Result<DriftConfig> {
    let Some(ref input_folder) = args.input else {
        bail!("--input is required without --config");
    };

    let mut registration = RegistrationConfig::default();
    if let Some(bins) = args.bins {
        registration.histogram_bins = bins;
    }
    if let Some(rate) = args.learning_rate {
        registration.learning_rate = rate;
    }
    if let Some(step) = args.min_step {
        registration.min_step = step;
    }
    if let Some(iterations) = args.max_iterations {
        registration.max_iterations = iterations;
    }

    Ok(DriftConfig {
        input_folder: input_folder.clone(),
        output_folder: args.output.clone(),
        output_dtype: PixelType::from(&args.dtype),
        registration,
    })
}
