//! Subcommand implementations.

pub mod config;
pub mod preview;
pub mod process;
pub mod template;

use pixfit_core::FieldValues;

/// Parse a `key=value` template field. The value may be empty or contain `=`.
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Collect parsed `--field` pairs; later pairs win.
pub fn field_values(pairs: &[(String, String)]) -> FieldValues {
    pairs.iter().cloned().collect()
}
