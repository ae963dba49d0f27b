//! Report generation.
//!
//! Report files are chosen by extension: `.json` or `.xml`. Anything else is
//! rejected with [`ReportError::UnsupportedFormat`], which callers check
//! before starting a scan so that no scan work is wasted on a bad file name.

mod cli;
mod json;
mod xml;

pub use cli::{print_cli_table, render_cli_table};
pub use json::{parse_json_report, JsonPlugin, JsonReport, JsonWordPress};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ReportError;
use crate::model::ScanResult;

/// Timestamp format used in report files.
///
/// Hour appears twice and month sits where the day would be. Consumers
/// already parse this exact layout, so it is kept as is.
pub const REPORT_TIME_FORMAT: &str = "%H-%m-%Y %H:%M:%S";

/// Report file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Xml,
}

impl ReportFormat {
    /// Selects a format from a file name's extension.
    pub fn from_path(path: &Path) -> Result<Self, ReportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        extension.parse()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Xml => "xml",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "xml" => Ok(ReportFormat::Xml),
            _ => Err(ReportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Something that can turn a finished scan into a report.
pub trait Reporter {
    fn generate(&self, result: &ScanResult) -> Result<(), ReportError>;
}

/// Writes a report to a file in the format implied by its extension.
#[derive(Debug, Clone)]
pub struct FileReporter {
    format: ReportFormat,
    path: PathBuf,
}

impl FileReporter {
    pub fn for_path(path: &Path) -> Result<Self, ReportError> {
        Ok(Self {
            format: ReportFormat::from_path(path)?,
            path: path.to_path_buf(),
        })
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Reporter for FileReporter {
    fn generate(&self, result: &ScanResult) -> Result<(), ReportError> {
        let content = format_report_to_string(result, self.format)?;
        fs::write(&self.path, content)?;
        info!(path = %self.path.display(), format = self.format.extension(), "report written");
        Ok(())
    }
}

/// Renders a report without writing it anywhere.
pub fn format_report_to_string(
    result: &ScanResult,
    format: ReportFormat,
) -> Result<String, ReportError> {
    match format {
        ReportFormat::Json => json::generate_json_string(result),
        ReportFormat::Xml => xml::generate_xml_string(result),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
