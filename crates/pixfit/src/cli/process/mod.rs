//! The `pixfit process` command for encoding images to a target size.

mod batch;
mod setup;
pub mod types;

pub use types::{FormatArg, ReportFormat};

use clap::Args;
use pixfit_core::{BatchProcessor, Config};
use std::path::PathBuf;
use std::time::Instant;

use batch::{print_summary, run_batch, write_report};
use setup::{apply_overrides, build_job};

/// Arguments for the `process` command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Image files or directories to process
    #[arg(required = true)]
    pub input: Vec<PathBuf>,

    /// Output folder (defaults to `[output].folder`, then ./pixfit-out)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output image format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Longest output edge in pixels
    #[arg(long)]
    pub max_dimension: Option<u32>,

    /// Target output size in bytes
    #[arg(long)]
    pub target_size: Option<u64>,

    /// Accepted deviation from the target size in bytes
    #[arg(long)]
    pub tolerance: Option<u64>,

    /// Output filename template, e.g. "{project_name}_{counter}"
    #[arg(short, long)]
    pub template: Option<String>,

    /// Template field value (repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = crate::cli::parse_field)]
    pub fields: Vec<(String, String)>,

    /// Write a report of every result and failure to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "json")]
    pub report_format: ReportFormat,
}

/// Manual Default impl for constructing ProcessArgs outside of clap.
///
/// Values match the clap annotations above.
impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            input: Vec::new(),
            output: None,
            format: None,
            max_dimension: None,
            target_size: None,
            tolerance: None,
            template: None,
            fields: Vec::new(),
            report: None,
            report_format: ReportFormat::Json,
        }
    }
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, config: Config) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args)?;
    let job = build_job(&config, &args)?;
    if job.is_empty() {
        tracing::warn!("No supported image files found in {:?}", args.input);
        return Ok(());
    }

    let processor = BatchProcessor::new(&config);
    let start = Instant::now();
    let report = run_batch(&processor, &job).await?;

    if let Some(path) = &args.report {
        write_report(&report, path, args.report_format)?;
    }
    print_summary(&report, job.len(), start.elapsed());

    if !report.errors.is_empty() && report.results.is_empty() {
        anyhow::bail!("All {} image(s) failed", report.errors.len());
    }
    Ok(())
}
