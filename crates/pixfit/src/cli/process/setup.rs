//! Job setup: config overrides from CLI flags, input discovery.

use std::path::PathBuf;

use pixfit_core::{BatchJob, Config, FileDiscovery};

use super::ProcessArgs;

/// Apply CLI overrides to the loaded config and re-validate it.
pub fn apply_overrides(mut config: Config, args: &ProcessArgs) -> anyhow::Result<Config> {
    if let Some(output) = &args.output {
        let expanded = shellexpand::tilde(&output.to_string_lossy()).into_owned();
        config.output.folder = PathBuf::from(expanded);
    }
    if let Some(format) = args.format {
        config.output.format = format.into();
    }
    if let Some(max_dimension) = args.max_dimension {
        config.output.max_dimension = max_dimension;
    }
    if let Some(target) = args.target_size {
        config.output.target_file_size = target;
    }
    if let Some(tolerance) = args.tolerance {
        config.output.size_tolerance = tolerance;
    }
    if let Some(template) = &args.template {
        config.output.filename_template = template.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Expand inputs and build the batch job.
pub fn build_job(config: &Config, args: &ProcessArgs) -> anyhow::Result<BatchJob> {
    for input in &args.input {
        if !input.exists() {
            anyhow::bail!(
                "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
                input
            );
        }
    }

    let discovery = FileDiscovery::new(config.processing.clone());
    let files = discovery.discover_all(&args.input);
    tracing::info!(
        "Found {} image(s) ({:.1} MB)",
        files.len(),
        FileDiscovery::total_size(&files) as f64 / 1_000_000.0
    );

    Ok(BatchJob::from_config(
        config,
        files.into_iter().map(|f| f.path).collect(),
        crate::cli::field_values(&args.fields),
    ))
}
