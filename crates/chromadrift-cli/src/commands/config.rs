use std::path::PathBuf;

use anyhow::{Context, Result};
use chromadrift_core::consts::DEFAULT_OUTPUT_SUFFIX;
use chromadrift_core::pipeline::config::{
    ChromaticConfig, DriftConfig, InputMode, RegistrationConfig,
};
use chromadrift_core::volume::PixelType;
use clap::Args;

#[derive(Args)]
pub struct ConfigArgs {
    /// Emit a drift correction config instead of a chromatic one
    #[arg(long)]
    pub drift: bool,

    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a default run config as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let toml_str = if args.drift {
        toml::to_string_pretty(&DriftConfig {
            input_folder: PathBuf::from("series"),
            output_folder: PathBuf::from("registered"),
            output_dtype: PixelType::U16,
            registration: RegistrationConfig::default(),
        })?
    } else {
        toml::to_string_pretty(&ChromaticConfig {
            output_folder: PathBuf::from("aligned"),
            transform_file: PathBuf::from("transforms.json"),
            microscope: "microscope".to_string(),
            mode: InputMode::SplitChannels {
                channel_map: PathBuf::from("channel_map.csv"),
                suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            },
        })?
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
