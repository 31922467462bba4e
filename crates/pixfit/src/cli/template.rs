//! The `pixfit template` command: preview a filename template.

use clap::Args;
use pixfit_core::naming::{extract_token_keys, lookup, unknown_tokens, TokenCategory};
use pixfit_core::{preview_filename, Config, FieldValues, ImageFormat};
use std::fmt::Write as _;

use super::process::FormatArg;

/// Arguments for the `template` command.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Template to preview, e.g. "{project_name}_{date}_{counter}"
    pub template: String,

    /// Output format used for the extension (defaults to `[output].format`)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Template field value (repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = super::parse_field)]
    pub fields: Vec<(String, String)>,
}

fn category_label(category: TokenCategory) -> &'static str {
    match category {
        TokenCategory::UserInput => "user input",
        TokenCategory::SettingsDerived => "settings",
        TokenCategory::DateAuto => "date",
        TokenCategory::Counter => "counter",
        TokenCategory::PerFile => "per file",
    }
}

/// Preview line plus a breakdown of the tokens the template uses.
fn describe(template: &str, format: ImageFormat, values: &FieldValues) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", preview_filename(template, format, values));

    let keys = extract_token_keys(template);
    if !keys.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Tokens:");
        for def in keys.into_iter().filter_map(lookup) {
            let source = if values.contains_key(def.key) {
                "set"
            } else {
                category_label(def.category)
            };
            let _ = writeln!(out, "  {{{}}}  {} ({})", def.key, def.label, source);
        }
    }

    let unknown = unknown_tokens(template);
    if !unknown.is_empty() {
        let _ = writeln!(out);
        let listed: Vec<String> = unknown.iter().map(|t| format!("{{{t}}}")).collect();
        let _ = writeln!(
            out,
            "Not recognised (kept literally unless given with --field): {}",
            listed.join(", ")
        );
    }
    out
}

/// Execute the template command.
pub fn execute(args: TemplateArgs, config: &Config) -> anyhow::Result<()> {
    if args.template.trim().is_empty() {
        anyhow::bail!("Template must not be empty");
    }
    let format = args.format.map(Into::into).unwrap_or(config.output.format);
    let mut values = config.field_values();
    values.extend(super::field_values(&args.fields));

    print!("{}", describe(&args.template, format, &values));
    Ok(())
}
