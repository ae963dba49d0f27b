//! In-memory site used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use plecost::index::VulnerabilityIndex;
use plecost::{FetchError, Fetcher, RetryPolicy, ScanOptions};
use reqwest::Url;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Clone)]
struct Route {
    outcome: Result<Vec<u8>, FetchError>,
    delay: Duration,
}

/// Serves canned responses keyed by URL path. Unknown paths are 404.
#[derive(Default)]
pub struct MockSite {
    routes: HashMap<String, Route>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, path: &str, body: &str) -> Self {
        self.route(path, Ok(body.as_bytes().to_vec()), Duration::ZERO)
    }

    pub fn slow_page(self, path: &str, body: &str, delay: Duration) -> Self {
        self.route(path, Ok(body.as_bytes().to_vec()), delay)
    }

    pub fn fail(self, path: &str, error: FetchError) -> Self {
        self.route(path, Err(error), Duration::ZERO)
    }

    fn route(mut self, path: &str, outcome: Result<Vec<u8>, FetchError>, delay: Duration) -> Self {
        self.routes.insert(path.to_string(), Route { outcome, delay });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|p| p.as_str() == path).count()
    }

    pub fn plugin_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|p| p.starts_with("/wp-content/plugins/"))
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockSite {
    async fn fetch(&self, url: &Url, _timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let path = url.path().to_string();
        self.calls.lock().unwrap().push(path.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let route = self.routes.get(&path).cloned();
        let delay = route.as_ref().map(|r| r.delay).unwrap_or_default();
        // Keep every request in flight briefly so overlap is observable.
        tokio::time::sleep(delay + Duration::from_millis(5)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match route {
            Some(route) => route.outcome,
            None => Err(FetchError::HttpStatus(404)),
        }
    }
}

pub const HOME_4_7: &str = r#"<!DOCTYPE html>
<html><head>
<meta name="generator" content="WordPress 4.7" />
<link rel='stylesheet' href='http://example.com/wp-content/themes/twentyseventeen/style.css' />
</head><body>Just another WordPress site</body></html>"#;

pub const AKISMET_README: &str = "=== Akismet ===\nContributors: matt\nTested up to: 4.7\nStable tag: 3.1\nLicense: GPLv2 or later\n\n== Changelog ==\n= 3.1 =\n* Fixes\n";

pub fn fixture_index() -> VulnerabilityIndex {
    VulnerabilityIndex::builder()
        .latest("wordpress", "4.9")
        .latest("akismet", "3.3")
        .vulnerability("akismet", &["3.1"], &["CVE-2017-0001"], &[])
        .latest("jetpack", "5.0")
        .build()
}

pub fn fast_options() -> ScanOptions {
    ScanOptions {
        timeout: Duration::from_secs(1),
        concurrency: 4,
        retry: RetryPolicy::new(2, Duration::ZERO),
    }
}

pub fn readme(plugin: &str) -> String {
    format!("/wp-content/plugins/{}/readme.txt", plugin)
}
