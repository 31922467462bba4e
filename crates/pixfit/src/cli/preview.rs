//! The `pixfit preview` command: print a small JPEG preview as a data URL.

use clap::Args;
use pixfit_core::{Config, ImageEncoder};
use std::path::PathBuf;

/// Arguments for the `preview` command.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Image to preview
    pub image: PathBuf,
}

/// Execute the preview command.
pub async fn execute(args: PreviewArgs, config: &Config) -> anyhow::Result<()> {
    if !args.image.is_file() {
        anyhow::bail!("Image not found: {:?}", args.image);
    }
    let encoder = ImageEncoder::new(config.limits.clone());
    let url = encoder.preview_data_url(&args.image).await?;
    println!("{url}");
    Ok(())
}
