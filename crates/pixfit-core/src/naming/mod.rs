//! Output filename rendering.
//!
//! A template such as `{project_name}_{filename}_{width}x{height}` is
//! expanded against a [`TemplateContext`], sanitized for use on any common
//! filesystem, and suffixed with the output format's extension.
//!
//! Token resolution:
//! - `filename`, `width`, `height`, `format`, `ext` always come from the image
//! - `date`, `month`, `year` default to today's UTC date, a non-empty field
//!   value wins
//! - `counter` is `(start - 1) + counter`, zero padded to 3 digits, where the
//!   start offset is the `counter` field value (default 1)
//! - any other field value key is substituted verbatim
//! - anything else stays literal
//!
//! Substitution is a single pass, values are never re-scanned for tokens.

pub mod tokens;

pub use tokens::{
    extract_token_keys, lookup, unknown_tokens, TokenCategory, TokenDefinition,
    TOKEN_DEFINITIONS,
};

use chrono::{NaiveDate, Utc};
use std::path::Path;

use crate::types::{FieldValues, ImageFormat};
use tokens::Segment;

/// Characters replaced with `_` during sanitization.
const ILLEGAL_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Per-image values plus run-scoped field values for one render.
#[derive(Debug, Clone)]
pub struct TemplateContext<'a> {
    /// Source filename without directory or extension
    pub stem: String,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// One-based position in the batch
    pub counter: usize,
    pub field_values: &'a FieldValues,
    /// Date used for `{date}`, `{month}`, `{year}` defaults
    pub today: NaiveDate,
}

impl<'a> TemplateContext<'a> {
    pub fn new(
        source: &Path,
        width: u32,
        height: u32,
        format: ImageFormat,
        counter: usize,
        field_values: &'a FieldValues,
    ) -> Self {
        Self {
            stem: source_stem(source),
            width,
            height,
            format,
            counter,
            field_values,
            today: Utc::now().date_naive(),
        }
    }

    /// Pin the date used for date tokens.
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn field(&self, key: &str) -> Option<&str> {
        self.field_values.get(key).map(String::as_str)
    }

    fn date_token(&self, key: &str, pattern: &str) -> String {
        match self.field(key).filter(|v| !v.is_empty()) {
            Some(value) => value.to_string(),
            None => self.today.format(pattern).to_string(),
        }
    }

    fn counter_token(&self) -> String {
        let start = counter_start(self.field("counter"));
        let value = (start - 1).saturating_add(self.counter as u64);
        format!("{value:03}")
    }

    fn resolve(&self, name: &str) -> Option<String> {
        let value = match name {
            "filename" => self.stem.clone(),
            "width" => self.width.to_string(),
            "height" => self.height.to_string(),
            "format" => self.format.as_str().to_string(),
            "ext" => self.format.extension().to_string(),
            "date" => self.date_token(name, "%Y%m%d"),
            "month" => self.date_token(name, "%m"),
            "year" => self.date_token(name, "%Y"),
            "counter" => self.counter_token(),
            "project_name" | "user_initials" => self.field(name).unwrap_or_default().to_string(),
            other => return self.field(other).map(str::to_string),
        };
        Some(value)
    }
}

/// Filename stem of a source path; both `/` and `\` count as separators.
fn source_stem(source: &Path) -> String {
    let full = source.to_string_lossy();
    let base = full.rsplit(['/', '\\']).next().unwrap_or_default();
    match base.rfind('.') {
        Some(dot) if dot > 0 => base[..dot].to_string(),
        _ => base.to_string(),
    }
}

/// Parse the counter start offset: leading integer, 1 when absent or not positive.
/// A negative start such as `-4` is clamped to 1 rather than counting up from it.
fn counter_start(raw: Option<&str>) -> u64 {
    raw.map(str::trim)
        .map(|s| s.strip_prefix('+').unwrap_or(s))
        .and_then(|s| {
            let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<u64>().ok()
        })
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

fn collapse_runs(input: &str, ch: char) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_was_ch = false;
    for c in input.chars() {
        if c == ch {
            if !previous_was_ch {
                out.push(c);
            }
            previous_was_ch = true;
        } else {
            out.push(c);
            previous_was_ch = false;
        }
    }
    out
}

/// Make a substituted template safe to use as a filename stem.
pub fn sanitize(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let collapsed = collapse_runs(&collapse_runs(&replaced, '_'), '-');
    collapsed.trim_matches(['_', '-']).to_string()
}

/// Render `template` for one image. Never fails.
pub fn render_filename(template: &str, context: &TemplateContext<'_>) -> String {
    let mut substituted = String::with_capacity(template.len() + 16);
    for segment in tokens::segments(template) {
        match segment {
            Segment::Literal(text) => substituted.push_str(text),
            Segment::Token(name) => match context.resolve(name) {
                Some(value) => substituted.push_str(&value),
                None => {
                    substituted.push('{');
                    substituted.push_str(name);
                    substituted.push('}');
                }
            },
        }
    }

    let mut filename = sanitize(&substituted);
    filename.push('.');
    filename.push_str(context.format.extension());
    filename
}

/// Render a template against sample data, for showing the user what a
/// template will produce before a run.
///
/// User and settings tokens missing from `field_values` use their mock
/// values so the preview isn't full of gaps.
pub fn preview_filename(template: &str, format: ImageFormat, field_values: &FieldValues) -> String {
    let today = Utc::now().date_naive();
    let mut values = field_values.clone();
    for def in TOKEN_DEFINITIONS.iter().filter(|d| {
        matches!(
            d.category,
            TokenCategory::UserInput | TokenCategory::SettingsDerived
        )
    }) {
        values
            .entry(def.key.to_string())
            .or_insert_with(|| def.mock_value(today));
    }

    let context = TemplateContext::new(Path::new("photo.jpg"), 1920, 1080, format, 1, &values);
    render_filename(template, &context)
}
