use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chromadrift_core::consts::DEFAULT_OUTPUT_SUFFIX;
use chromadrift_core::pipeline::config::{ChromaticConfig, InputMode};
use chromadrift_core::pipeline::run_chromatic;
use clap::{Args, ValueEnum};

use crate::progress::BarReporter;
use crate::summary::{print_chromatic_summary, print_run_report};

#[derive(Clone, ValueEnum)]
pub enum ModeArg {
    Multichannel,
    Split,
    Grouped,
}

#[derive(Args)]
pub struct AlignArgs {
    /// Run config file (TOML); overrides every other option
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON transform store
    #[arg(short, long)]
    pub transforms: Option<PathBuf>,

    /// Microscope whose transforms are applied
    #[arg(short, long)]
    pub microscope: Option<String>,

    /// How inputs are laid out
    #[arg(long, value_enum, default_value = "multichannel")]
    pub mode: ModeArg,

    /// Folder of (C, Z, Y, X) stacks (multichannel mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Comma-separated channel labels in stack order (multichannel mode)
    #[arg(long)]
    pub channels: Option<String>,

    /// Channel map CSV (split and grouped modes)
    #[arg(long)]
    pub channel_map: Option<PathBuf>,

    /// Suffix appended to output file names (split and grouped modes)
    #[arg(long, default_value = DEFAULT_OUTPUT_SUFFIX)]
    pub suffix: String,

    /// Output folder
    #[arg(short, long, default_value = "aligned")]
    pub output: PathBuf,
}

pub fn run(args: &AlignArgs) -> Result<()> {
    let config = match args.config {
        Some(ref path) => super::load_toml(path)?,
        None => build_config_from_args(args)?,
    };

    print_chromatic_summary(&config);

    let reporter = BarReporter::new();
    let report = run_chromatic(&config, &reporter).context("Chromatic correction failed")?;
    print_run_report(&report);

    Ok(())
}

fn build_config_from_args(args: &AlignArgs) -> Result<ChromaticConfig> {
    let Some(ref transform_file) = args.transforms else {
        bail!("--transforms is required without --config");
    };
    let Some(ref microscope) = args.microscope else {
        bail!("--microscope is required without --config");
    };

    let mode = match args.mode {
        ModeArg::Multichannel => {
            let Some(ref input_folder) = args.input else {
                bail!("--input is required in multichannel mode");
            };
            let Some(ref channels) = args.channels else {
                bail!("--channels is required in multichannel mode");
            };
            InputMode::Multichannel {
                input_folder: input_folder.clone(),
                channel_order: parse_channels(channels),
            }
        }
        ModeArg::Split | ModeArg::Grouped => {
            let Some(ref channel_map) = args.channel_map else {
                bail!("--channel-map is required in split and grouped modes");
            };
            let channel_map = channel_map.clone();
            let suffix = args.suffix.clone();
            if matches!(args.mode, ModeArg::Split) {
                InputMode::SplitChannels { channel_map, suffix }
            } else {
                InputMode::GroupedChannels { channel_map, suffix }
            }
        }
    };

    Ok(ChromaticConfig {
        output_folder: args.output.clone(),
        transform_file: transform_file.clone(),
        microscope: microscope.clone(),
        mode,
    })
}

fn parse_channels(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
