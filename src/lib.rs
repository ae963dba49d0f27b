pub mod config;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod index;
pub mod model;
pub mod output;
pub mod runner;
pub mod wordlist;

pub use config::Config;
pub use engine::{DetectionEngine, RetryPolicy, ScanOptions};
pub use error::{FetchError, ReportError, RunError, ScanError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use index::VulnerabilityIndex;
pub use model::{ComponentVersion, PluginFinding, ScanResult, Target};
pub use runner::{run, ScanRequest};
