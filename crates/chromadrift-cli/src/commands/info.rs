use std::path::PathBuf;

use anyhow::{Context, Result};
use chromadrift_core::io::tiff_stack::read_info;
use chromadrift_core::transform::TransformCatalog;
use clap::Args;

#[derive(Args)]
pub struct InfoArgs {
    /// Input TIFF stack
    pub file: PathBuf,

    /// Also list the channels a microscope has transforms for
    #[arg(long, requires = "microscope")]
    pub transforms: Option<PathBuf>,

    /// Microscope name in the transform store
    #[arg(short, long)]
    pub microscope: Option<String>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let info = read_info(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    println!("File:        {}", args.file.display());
    println!("Pages:       {}", info.pages);
    println!("Dimensions:  {}x{}", info.width, info.height);
    println!("Pixel type:  {}", info.color_type);
    match info.shape {
        Some(ref shape) => println!("Shape:       {:?}", shape),
        None => println!("Shape:       (not recorded)"),
    }

    if let (Some(store), Some(microscope)) = (&args.transforms, &args.microscope) {
        let catalog = TransformCatalog::from_path(store, microscope)?;
        println!();
        println!("Microscope:  {}", catalog.microscope());
        for channel in catalog.channels() {
            let m = catalog.get(channel)?.matrix();
            println!(
                "  {:<10} [{:.4} {:.4} {:.3}; {:.4} {:.4} {:.3}]",
                channel,
                m[(0, 0)],
                m[(0, 1)],
                m[(0, 2)],
                m[(1, 0)],
                m[(1, 1)],
                m[(1, 2)]
            );
        }
    }

    Ok(())
}
