//! Token registry and template scanning.
//!
//! The registry describes the tokens a UI can offer. Rendering does not
//! consult it for validation: unknown tokens simply stay literal.

use chrono::NaiveDate;

/// Where a token's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    /// Typed in per run (e.g. project name)
    UserInput,
    /// Pulled from persisted settings (e.g. initials)
    SettingsDerived,
    /// Defaults to today's date, overridable
    DateAuto,
    /// Run-scoped sequence number
    Counter,
    /// Computed from the image being written
    PerFile,
}

/// A token a template may reference as `{key}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub category: TokenCategory,
    pub placeholder: &'static str,
}

pub const TOKEN_DEFINITIONS: &[TokenDefinition] = &[
    TokenDefinition {
        key: "project_name",
        label: "Project Name",
        category: TokenCategory::UserInput,
        placeholder: "e.g. hero-banners",
    },
    TokenDefinition {
        key: "user_initials",
        label: "User Initials",
        category: TokenCategory::SettingsDerived,
        placeholder: "e.g. JL",
    },
    TokenDefinition {
        key: "month",
        label: "Month",
        category: TokenCategory::DateAuto,
        placeholder: "MM",
    },
    TokenDefinition {
        key: "year",
        label: "Year",
        category: TokenCategory::DateAuto,
        placeholder: "YYYY",
    },
    TokenDefinition {
        key: "date",
        label: "Date",
        category: TokenCategory::DateAuto,
        placeholder: "YYYYMMDD",
    },
    TokenDefinition {
        key: "counter",
        label: "Counter Start",
        category: TokenCategory::Counter,
        placeholder: "1",
    },
    TokenDefinition {
        key: "filename",
        label: "Original Name",
        category: TokenCategory::PerFile,
        placeholder: "filename",
    },
    TokenDefinition {
        key: "width",
        label: "Width",
        category: TokenCategory::PerFile,
        placeholder: "px",
    },
    TokenDefinition {
        key: "height",
        label: "Height",
        category: TokenCategory::PerFile,
        placeholder: "px",
    },
    TokenDefinition {
        key: "format",
        label: "Format",
        category: TokenCategory::PerFile,
        placeholder: "jpeg",
    },
    TokenDefinition {
        key: "ext",
        label: "Extension",
        category: TokenCategory::PerFile,
        placeholder: "jpg",
    },
];

impl TokenDefinition {
    /// Sample value shown in previews.
    pub fn mock_value(&self, today: NaiveDate) -> String {
        match self.key {
            "project_name" => "my-project".to_string(),
            "user_initials" => "JL".to_string(),
            "month" => today.format("%m").to_string(),
            "year" => today.format("%Y").to_string(),
            "date" => today.format("%Y%m%d").to_string(),
            "counter" => "001".to_string(),
            "filename" => "photo".to_string(),
            "width" => "1920".to_string(),
            "height" => "1080".to_string(),
            "format" => "jpeg".to_string(),
            "ext" => "jpg".to_string(),
            _ => String::new(),
        }
    }
}

/// Look up a registered token by key.
pub fn lookup(key: &str) -> Option<&'static TokenDefinition> {
    TOKEN_DEFINITIONS.iter().find(|t| t.key == key)
}

/// Piece of a scanned template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Literal(&'a str),
    /// Name between braces, braces excluded
    Token(&'a str),
}

fn is_token_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split a template into literal runs and `{word}` tokens.
///
/// A brace that does not open a well-formed token is kept as a literal.
pub(crate) fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        if open > 0 {
            out.push(Segment::Literal(&rest[..open]));
        }
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_token_name(&after[..close]) => {
                out.push(Segment::Token(&after[..close]));
                rest = &after[close + 1..];
            }
            _ => {
                out.push(Segment::Literal("{"));
                rest = after;
            }
        }
    }
    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    out
}

/// Registered token keys referenced by a template, first occurrence order.
pub fn extract_token_keys(template: &str) -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = Vec::new();
    for segment in segments(template) {
        if let Segment::Token(name) = segment {
            if let Some(def) = lookup(name) {
                if !keys.contains(&def.key) {
                    keys.push(def.key);
                }
            }
        }
    }
    keys
}

/// `{word}` tokens that are not in the registry.
///
/// Only useful for flagging typos in a UI; free-form field keys render fine.
pub fn unknown_tokens(template: &str) -> Vec<String> {
    let mut unknown: Vec<String> = Vec::new();
    for segment in segments(template) {
        if let Segment::Token(name) = segment {
            if lookup(name).is_none() && !unknown.iter().any(|u| u == name) {
                unknown.push(name.to_string());
            }
        }
    }
    unknown
}
