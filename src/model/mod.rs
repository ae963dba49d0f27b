//! Core data types for targets, findings, and scan results.
//!
//! - [`Target`] - The site under scan
//! - [`ComponentVersion`] - Detected and latest version of the WordPress core
//! - [`PluginFinding`] - Per-plugin version and vulnerability verdict
//! - [`ScanResult`] - Complete, immutable scan output
//!
//! # Example
//!
//! ```
//! use plecost::model::{PluginFinding, Vulnerabilities};
//!
//! let finding = PluginFinding::new("akismet", Some("3.1".into()), Some("3.3".into()))
//!     .with_vulnerabilities(Vulnerabilities {
//!         cves: vec!["CVE-2017-0001".into()],
//!         exploits: vec![],
//!     });
//!
//! assert!(finding.is_outdated);
//! ```

mod finding;
mod target;

pub use finding::*;
pub use target::Target;

/// Component name the core platform is stored under in the vulnerability index.
pub const WORDPRESS: &str = "wordpress";
