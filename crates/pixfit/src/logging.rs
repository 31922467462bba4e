//! Logging initialization and configuration.
//!
//! Log output goes to stderr; stdout is reserved for data (reports, data
//! URLs, template previews).

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter level for the given settings.
fn default_level(verbose: bool, configured: &str) -> &str {
    if verbose {
        "debug"
    } else if configured.trim().is_empty() {
        "info"
    } else {
        configured
    }
}

/// Initialize the logging subsystem.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section, with CLI overrides.
pub fn init_from_config(
    config: &pixfit_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let level = default_level(verbose_override, &config.logging.level);
    let json_format = json_logs_override || config.logging.format == "json";
    init(level, json_format);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true, "warn"), "debug");
        assert_eq!(default_level(false, "warn"), "warn");
        assert_eq!(default_level(false, ""), "info");
    }
}
