//! Batch report output as JSON or JSON Lines.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::{BatchReport, EncodeResult, ImageError};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The whole report as one JSON object
    Json,
    /// One record per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// One line of a JSON Lines report.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportRecord<'a> {
    Result(&'a EncodeResult),
    Error(&'a ImageError),
}

/// A writer that serializes reports to JSON or JSONL format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single item as one JSON value followed by a newline.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            // JSONL is never pretty-printed (one object per line)
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write a batch report.
    ///
    /// JSON writes the report object. JSONL writes one `result` record per
    /// encoded image followed by one `error` record per failure.
    pub fn write_report(&mut self, report: &BatchReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.write(report),
            OutputFormat::JsonLines => {
                for result in &report.results {
                    self.write(&ReportRecord::Result(result))?;
                }
                for error in &report.errors {
                    self.write(&ReportRecord::Error(error))?;
                }
                Ok(())
            }
        }
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageFormat;
    use std::path::PathBuf;

    fn report() -> BatchReport {
        BatchReport {
            results: vec![EncodeResult {
                input_path: PathBuf::from("in/a.png"),
                output_path: PathBuf::from("out/a_800x600.jpg"),
                original_size: 2_000_000,
                output_size: 990_000,
                original_width: 4000,
                original_height: 3000,
                output_width: 800,
                output_height: 600,
                quality_used: Some(72),
                format: ImageFormat::Jpeg,
                rendered_filename: "a_800x600.jpg".to_string(),
            }],
            errors: vec![ImageError {
                path: PathBuf::from("in/b.png"),
                message: "Codec error".to_string(),
            }],
            cancelled: false,
        }
    }

    #[test]
    fn test_write_report_json() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write_report(&report()).unwrap();
        assert_eq!(writer.items_written(), 1);

        let output = String::from_utf8(buffer).unwrap();
        let parsed: BatchReport = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed.results, report().results);
        assert_eq!(parsed.errors, report().errors);
    }

    #[test]
    fn test_write_report_jsonl() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer.write_report(&report()).unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "result");
        assert_eq!(first["quality_used"], 72);
        assert_eq!(first["format"], "jpeg");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "error");
        assert_eq!(second["message"], "Codec error");
    }

    #[test]
    fn test_pretty_json_spans_lines() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, true);
        writer.write_report(&BatchReport::default()).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.lines().count() > 1);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("jsonl"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("NDJSON"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("invalid"), None);
    }
}
