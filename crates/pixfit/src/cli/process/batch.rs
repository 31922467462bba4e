//! Batch run with a live progress bar, Ctrl-C cancellation, and a summary.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use pixfit_core::{
    progress_channel, BatchJob, BatchProcessor, BatchReport, CancellationToken, OutputWriter,
    Phase, ProgressEvent,
};
use tokio::sync::mpsc::UnboundedReceiver;

use super::types::ReportFormat;

/// Run the job, rendering progress until the batch finishes or is cancelled.
pub async fn run_batch(processor: &BatchProcessor, job: &BatchJob) -> anyhow::Result<BatchReport> {
    let progress = create_progress_bar(job.len() as u64);
    let (tx, rx) = progress_channel();
    let render = tokio::spawn(render_progress(progress.clone(), rx));

    let token = CancellationToken::new();
    let interrupt = {
        let token = token.clone();
        let progress = progress.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                progress.println("Cancelling after the current image...");
                tracing::warn!("Interrupt received, stopping after the current image");
                token.cancel();
            }
        })
    };

    let result = processor.run(job, &token, &tx).await;

    interrupt.abort();
    drop(tx);
    if let Err(e) = render.await {
        tracing::warn!("Progress renderer stopped: {e}");
    }
    progress.finish_and_clear();

    Ok(result?)
}

/// Drain progress events into the bar. Ends when every sender is dropped.
async fn render_progress(progress: ProgressBar, mut rx: UnboundedReceiver<ProgressEvent>) {
    while let Some(event) = rx.recv().await {
        match event.phase {
            Phase::Complete => progress.inc(1),
            Phase::Error => {
                progress.inc(1);
                progress.println(format!(
                    "  failed: {} ({})",
                    event.source_filename,
                    event.error_message.as_deref().unwrap_or("unknown error")
                ));
            }
            phase => progress.set_message(format!("{} {}", phase, event.source_filename)),
        }
    }
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Write the report to `path` in the chosen format.
pub fn write_report(report: &BatchReport, path: &Path, format: ReportFormat) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = OutputWriter::new(BufWriter::new(file), format.into(), true);
    writer.write_report(report)?;
    writer.flush()?;
    tracing::info!("Report written to {:?}", path);
    Ok(())
}

/// Human-readable byte count (decimal units).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Fraction of input bytes saved, as a percentage. Negative when outputs grew.
pub fn saved_percent(bytes_in: u64, bytes_out: u64) -> f64 {
    if bytes_in == 0 {
        return 0.0;
    }
    (1.0 - bytes_out as f64 / bytes_in as f64) * 100.0
}

pub fn print_summary(report: &BatchReport, total: usize, elapsed: Duration) {
    let succeeded = report.results.len();
    let failed = report.errors.len();
    let skipped = total.saturating_sub(succeeded + failed);
    let bytes_in = report.bytes_in();
    let bytes_out = report.bytes_out();

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", succeeded);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    if skipped > 0 {
        eprintln!("    Skipped:      {:>8}", skipped);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Input:        {:>10}", format_bytes(bytes_in));
    eprintln!("    Output:       {:>10}", format_bytes(bytes_out));
    eprintln!("    Saved:        {:>7.1}%", saved_percent(bytes_in, bytes_out));
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    if report.cancelled {
        eprintln!("    (cancelled)");
    }
    eprintln!("  ====================================");
}
