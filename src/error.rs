//! Error types shared across the crate.
//!
//! Only [`ScanError`] and the report-format variant of [`ReportError`] are
//! fatal for a run. Everything a single plugin probe can hit is absorbed by
//! the engine and shows up as an unknown version in the result.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::ScanResult;

/// Failure of a single HTTP fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection refused")]
    ConnectionRefused,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl FetchError {
    /// Only timeouts are treated as transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Timeout)
    }
}

/// Fatal outcomes of a scan. Both abort before any plugin is probed.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("target {target} is not available: {reason}")]
    TargetUnavailable { target: String, reason: FetchError },

    #[error("target {0} does not appear to run WordPress")]
    NotRecognizedPlatform(String),
}

/// A plugin probe that gave up. Never leaves the engine.
#[derive(Error, Debug, Clone)]
#[error("probe for plugin '{plugin}' failed: {reason}")]
pub struct ProbeFailed {
    pub plugin: String,
    pub reason: FetchError,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report format '{0}' not found. Use a .json or .xml file name")]
    UnsupportedFormat(String),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to build XML report: {0}")]
    Xml(String),
}

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("failed to read vulnerability data {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid vulnerability data: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
#[error("invalid target '{input}': {reason}")]
pub struct TargetError {
    pub input: String,
    pub reason: String,
}

/// Errors surfaced by [`crate::runner::run`].
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Report selection failed before any network work happened.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The scan finished but the report could not be written. The result is
    /// handed back so it can still be shown or written elsewhere.
    #[error("{source}")]
    ReportWrite {
        #[source]
        source: ReportError,
        result: Box<ScanResult>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeouts_are_retryable() {
        assert!(FetchError::Timeout.is_retryable());
        assert!(!FetchError::ConnectionRefused.is_retryable());
        assert!(!FetchError::HttpStatus(503).is_retryable());
        assert!(!FetchError::Tls("bad certificate".to_string()).is_retryable());
        assert!(!FetchError::Transport("dns error".to_string()).is_retryable());
    }

    #[test]
    fn test_unsupported_format_message() {
        let err = ReportError::UnsupportedFormat("html".to_string());
        assert!(err.to_string().starts_with("Report format 'html' not found"));
    }
}
