//! One complete run: report selection, scan, report generation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::{DetectionEngine, RetryPolicy, ScanOptions};
use crate::error::RunError;
use crate::fetcher::Fetcher;
use crate::index::VulnerabilityIndex;
use crate::model::{ScanResult, Target};
use crate::output::{FileReporter, Reporter};

/// Everything a caller supplies for one run.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub target: Target,
    pub plugin_candidates: Vec<String>,
    pub timeout: Duration,
    pub concurrency: usize,
    pub retry: RetryPolicy,
    /// Report file; the extension selects the format.
    pub report_path: Option<PathBuf>,
}

impl ScanRequest {
    pub fn new(target: Target, plugin_candidates: Vec<String>) -> Self {
        let defaults = ScanOptions::default();
        Self {
            target,
            plugin_candidates,
            timeout: defaults.timeout,
            concurrency: defaults.concurrency,
            retry: defaults.retry,
            report_path: None,
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.timeout = options.timeout;
        self.concurrency = options.concurrency;
        self.retry = options.retry;
        self
    }

    pub fn with_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    fn options(&self) -> ScanOptions {
        ScanOptions {
            timeout: self.timeout,
            concurrency: self.concurrency,
            retry: self.retry.clone(),
        }
    }
}

/// Scans the target and writes the requested report.
///
/// The report format is checked first, so an unsupported file name fails
/// before any request is sent. If writing the report fails the finished
/// result is returned inside the error.
pub async fn run(
    request: &ScanRequest,
    fetcher: Arc<dyn Fetcher>,
    index: Arc<VulnerabilityIndex>,
) -> Result<ScanResult, RunError> {
    let reporter = request
        .report_path
        .as_deref()
        .map(FileReporter::for_path)
        .transpose()?;

    let engine = DetectionEngine::new(fetcher, index).with_options(request.options());
    let result = engine
        .scan(&request.target, &request.plugin_candidates)
        .await?;

    if let Some(reporter) = reporter {
        if let Err(source) = reporter.generate(&result) {
            return Err(RunError::ReportWrite {
                source,
                result: Box::new(result),
            });
        }
    }

    Ok(result)
}
