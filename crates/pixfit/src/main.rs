//! pixfit CLI - Resize images and re-encode them to a target file size.
//!
//! # Usage
//!
//! ```bash
//! # Encode a folder of photos to ~1 MB JPEGs
//! pixfit process ./photos -o ./web
//!
//! # WebP at 300 KB with a naming template
//! pixfit process ./photos -f webp --target-size 300000 \
//!     --template "{project_name}_{counter}" --field project_name=alps
//!
//! # Try a template without touching any files
//! pixfit template "{user_initials}_{date}_{filename}"
//!
//! # View configuration
//! pixfit config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// pixfit - Resize images and re-encode them to a target file size.
#[derive(Parser, Debug)]
#[command(name = "pixfit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resize and encode images to a target file size
    Process(cli::process::ProcessArgs),

    /// Preview a filename template
    Template(cli::template::TemplateArgs),

    /// Print a small JPEG preview of an image as a data URL
    Preview(cli::preview::PreviewArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match pixfit_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `pixfit config path`."
            );
            pixfit_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("pixfit v{}", pixfit_core::VERSION);

    match cli.command {
        Commands::Process(args) => cli::process::execute(args, config).await,
        Commands::Template(args) => cli::template::execute(args, &config),
        Commands::Preview(args) => cli::preview::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
