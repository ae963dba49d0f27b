//! The detection engine.
//!
//! A scan moves through fixed phases:
//!
//! ```text
//! INIT -> CORE_PROBE -> PLUGIN_PROBE_FANOUT -> AGGREGATE -> DONE
//!   \________\_____________ ABORTED
//! ```
//!
//! Only INIT (target unreachable) and CORE_PROBE (not WordPress) can abort.
//! Once the fan-out starts every candidate produces a finding: a plugin that
//! cannot be probed is reported with an unknown version rather than failing
//! the scan.
//!
//! # Example
//!
//! ```no_run
//! use plecost::engine::DetectionEngine;
//! use plecost::fetcher::HttpFetcher;
//! use plecost::index::VulnerabilityIndex;
//! use plecost::model::Target;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = DetectionEngine::new(
//!         Arc::new(HttpFetcher::new()),
//!         Arc::new(VulnerabilityIndex::empty()),
//!     );
//!     let target = Target::parse("https://example.com")?;
//!     let result = engine.scan(&target, &["akismet".to_string()]).await?;
//!     println!("WordPress {:?}", result.wordpress_info.current_version);
//!     Ok(())
//! }
//! ```

mod probes;
mod retry;

pub use probes::{core_probes, plugin_readme_path, CoreProbe, PLUGIN_README_FILES};
pub use retry::{fetch_with_retry, RetryPolicy};

use chrono::Local;
use futures::future::join_all;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{FetchError, ProbeFailed, ScanError};
use crate::extractor::{extract, has_wordpress_signature, plugin_readme_patterns};
use crate::fetcher::Fetcher;
use crate::index::VulnerabilityIndex;
use crate::model::{ComponentVersion, PluginFinding, ScanResult, Target, WORDPRESS};

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum plugin probes in flight. Values below 1 act as 1.
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }
}

/// Drives a scan against one target. Cheap to clone; clones share the
/// fetcher and the index.
#[derive(Clone)]
pub struct DetectionEngine {
    fetcher: Arc<dyn Fetcher>,
    index: Arc<VulnerabilityIndex>,
    options: ScanOptions,
}

impl DetectionEngine {
    pub fn new(fetcher: Arc<dyn Fetcher>, index: Arc<VulnerabilityIndex>) -> Self {
        Self {
            fetcher,
            index,
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Runs a full scan. Findings come back in the order of `candidates`.
    pub async fn scan(
        &self,
        target: &Target,
        candidates: &[String],
    ) -> Result<ScanResult, ScanError> {
        let start_time = Local::now();

        info!(target = %target, "checking target is reachable");
        let home_page = self.check_reachable(target).await?;

        info!(target = %target, "probing WordPress core");
        let wordpress_info = self.probe_core(target, home_page).await?;
        info!(
            version = wordpress_info.current_version.as_deref().unwrap_or("unknown"),
            "WordPress detected"
        );

        info!(candidates = candidates.len(), "probing plugins");
        let plugins = self.probe_plugins(target, candidates).await;

        let end_time = Local::now();
        info!(
            outdated = plugins.iter().filter(|p| p.is_outdated).count(),
            "scan complete"
        );

        Ok(ScanResult::new(
            target.clone(),
            start_time,
            end_time,
            wordpress_info,
            plugins,
        ))
    }

    /// Returns the home page body when it was served. An error status still
    /// proves the host is up.
    async fn check_reachable(&self, target: &Target) -> Result<Option<Vec<u8>>, ScanError> {
        match self.fetch(target.url()).await {
            Ok(body) => Ok(Some(body)),
            Err(FetchError::HttpStatus(status)) => {
                debug!(status, "home page returned an error status");
                Ok(None)
            }
            Err(reason) => {
                warn!(target = %target, error = %reason, "target unavailable");
                Err(ScanError::TargetUnavailable {
                    target: target.to_string(),
                    reason,
                })
            }
        }
    }

    async fn probe_core(
        &self,
        target: &Target,
        mut home_page: Option<Vec<u8>>,
    ) -> Result<ComponentVersion, ScanError> {
        let mut recognized = false;
        let mut current_version = None;

        for probe in core_probes() {
            let body = if probe.path.is_empty() {
                match home_page.take() {
                    Some(body) => body,
                    None => continue,
                }
            } else {
                let Some(url) = target.resolve(probe.path) else {
                    continue;
                };
                match self.fetch(&url).await {
                    Ok(body) => body,
                    Err(err) => {
                        debug!(path = probe.path, error = %err, "core probe failed");
                        continue;
                    }
                }
            };

            recognized |= has_wordpress_signature(&body);
            if let Some(version) = extract(&body, probe.patterns) {
                debug!(path = probe.path, version = %version, "core version found");
                recognized = true;
                current_version = Some(version);
                break;
            }
        }

        if !recognized {
            warn!(target = %target, "no WordPress signature found");
            return Err(ScanError::NotRecognizedPlatform(target.to_string()));
        }

        Ok(ComponentVersion::new(
            WORDPRESS,
            current_version,
            self.index.latest_version(WORDPRESS).map(str::to_owned),
        ))
    }

    async fn probe_plugins(&self, target: &Target, candidates: &[String]) -> Vec<PluginFinding> {
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));

        let handles: Vec<_> = candidates
            .iter()
            .enumerate()
            .map(|(slot, name)| {
                let engine = self.clone();
                let semaphore = semaphore.clone();
                let target = target.clone();
                let name = name.clone();
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    (slot, engine.probe_plugin(&target, &name).await)
                })
            })
            .collect();

        // One slot per candidate; each task fills only its own.
        let mut slots: Vec<Option<PluginFinding>> = vec![None; candidates.len()];
        for joined in join_all(handles).await {
            match joined {
                Ok((slot, finding)) => slots[slot] = Some(finding),
                Err(err) => warn!(error = %err, "plugin probe task failed"),
            }
        }

        slots
            .into_iter()
            .zip(candidates)
            .map(|(finding, name)| {
                finding.unwrap_or_else(|| PluginFinding::unknown(name.as_str(), self.latest(name)))
            })
            .collect()
    }

    async fn probe_plugin(&self, target: &Target, name: &str) -> PluginFinding {
        let latest_version = self.latest(name);

        match self.fetch_plugin_readme(target, name).await {
            Ok((url, body)) => {
                let current_version = extract(&body, plugin_readme_patterns());
                let vulnerabilities = current_version
                    .as_deref()
                    .map(|version| self.index.lookup(name, version))
                    .unwrap_or_default();
                debug!(
                    plugin = name,
                    version = current_version.as_deref().unwrap_or("unknown"),
                    "plugin found"
                );
                PluginFinding::new(name, current_version, latest_version)
                    .with_uri(url.as_str())
                    .with_vulnerabilities(vulnerabilities)
            }
            Err(err) => {
                debug!(error = %err, "plugin not detected");
                PluginFinding::unknown(name, latest_version)
            }
        }
    }

    async fn fetch_plugin_readme(
        &self,
        target: &Target,
        name: &str,
    ) -> Result<(Url, Vec<u8>), ProbeFailed> {
        let failed = |reason: FetchError| ProbeFailed {
            plugin: name.to_string(),
            reason,
        };

        for file in PLUGIN_README_FILES {
            let url = plugin_readme_path(name, file)
                .and_then(|path| target.resolve(&path))
                .ok_or_else(|| failed(FetchError::Transport("invalid plugin name".to_string())))?;

            match self.fetch(&url).await {
                Ok(body) => return Ok((url, body)),
                Err(FetchError::HttpStatus(404)) => continue,
                Err(err) => return Err(failed(err)),
            }
        }
        Err(failed(FetchError::HttpStatus(404)))
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        fetch_with_retry(
            self.fetcher.as_ref(),
            url,
            self.options.timeout,
            &self.options.retry,
        )
        .await
    }

    fn latest(&self, name: &str) -> Option<String> {
        self.index.latest_version(name).map(str::to_owned)
    }
}
