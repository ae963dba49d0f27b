//! Read-only vulnerability reference data.
//!
//! The index is loaded once at startup and shared between probe tasks behind
//! an `Arc`. Nothing mutates it after construction.
//!
//! # Dataset format
//!
//! ```json
//! {
//!   "components": {
//!     "wordpress": { "latest_version": "4.9" },
//!     "akismet": {
//!       "latest_version": "3.3",
//!       "vulnerabilities": [
//!         { "versions": ["3.1", "3.2"], "cves": ["CVE-2017-0001"], "exploits": ["EDB-41234"] }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use plecost::index::VulnerabilityIndex;
//!
//! let index = VulnerabilityIndex::builder()
//!     .latest("akismet", "3.3")
//!     .vulnerability("akismet", &["3.1"], &["CVE-2017-0001"], &[])
//!     .build();
//!
//! assert_eq!(index.latest_version("Akismet"), Some("3.3"));
//! assert_eq!(index.lookup("akismet", "v3.1").cves, vec!["CVE-2017-0001"]);
//! ```

mod version;

pub use version::{is_outdated, normalize_version, versions_match};

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::IndexError;
use crate::model::Vulnerabilities;

#[derive(Debug, Default, Deserialize)]
struct Dataset {
    #[serde(default)]
    components: BTreeMap<String, ComponentRecord>,
}

/// Reference data for one component.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentRecord {
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub vulnerabilities: Vec<VulnerabilityRecord>,
}

/// One advisory: the versions it affects and what is known about it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VulnerabilityRecord {
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub cves: Vec<String>,
    #[serde(default)]
    pub exploits: Vec<String>,
}

impl VulnerabilityRecord {
    fn affects(&self, version: &str) -> bool {
        self.versions.iter().any(|v| versions_match(v, version))
    }
}

#[derive(Debug, Clone, Default)]
pub struct VulnerabilityIndex {
    components: HashMap<String, ComponentRecord>,
}

impl VulnerabilityIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> IndexBuilder {
        IndexBuilder::default()
    }

    /// Loads the dataset from a JSON file.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let content = fs::read_to_string(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, IndexError> {
        let dataset: Dataset = serde_json::from_str(content)?;
        let mut builder = IndexBuilder::default();
        for (name, record) in dataset.components {
            builder = builder.component(&name, record);
        }
        Ok(builder.build())
    }

    /// Latest known release of a component. Names are case-insensitive.
    pub fn latest_version(&self, name: &str) -> Option<&str> {
        self.record(name)?.latest_version.as_deref()
    }

    /// CVEs and exploits affecting `version` of `name`, in dataset order.
    /// An identifier listed by several advisories is reported once.
    pub fn lookup(&self, name: &str, version: &str) -> Vulnerabilities {
        let mut found = Vulnerabilities::default();
        let Some(record) = self.record(name) else {
            return found;
        };

        for advisory in record.vulnerabilities.iter().filter(|a| a.affects(version)) {
            push_unique(&mut found.cves, &advisory.cves);
            push_unique(&mut found.exploits, &advisory.exploits);
        }
        found
    }

    pub fn contains(&self, name: &str) -> bool {
        self.record(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn record(&self, name: &str) -> Option<&ComponentRecord> {
        self.components.get(&name.trim().to_lowercase())
    }
}

fn push_unique(into: &mut Vec<String>, ids: &[String]) {
    for id in ids {
        if !into.contains(id) {
            into.push(id.clone());
        }
    }
}

/// Assembles an index in code, mainly for fixtures.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    components: HashMap<String, ComponentRecord>,
}

impl IndexBuilder {
    /// Adds a full record. Names differing only in case are merged; the first
    /// latest version seen wins.
    pub fn component(mut self, name: &str, record: ComponentRecord) -> Self {
        let entry = self
            .components
            .entry(name.trim().to_lowercase())
            .or_default();
        if entry.latest_version.is_none() {
            entry.latest_version = record.latest_version;
        }
        entry.vulnerabilities.extend(record.vulnerabilities);
        self
    }

    pub fn latest(mut self, name: &str, version: &str) -> Self {
        self.components
            .entry(name.trim().to_lowercase())
            .or_default()
            .latest_version = Some(version.to_string());
        self
    }

    pub fn vulnerability(
        mut self,
        name: &str,
        versions: &[&str],
        cves: &[&str],
        exploits: &[&str],
    ) -> Self {
        let owned =
            |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        self.components
            .entry(name.trim().to_lowercase())
            .or_default()
            .vulnerabilities
            .push(VulnerabilityRecord {
                versions: owned(versions),
                cves: owned(cves),
                exploits: owned(exploits),
            });
        self
    }

    pub fn build(self) -> VulnerabilityIndex {
        VulnerabilityIndex {
            components: self.components,
        }
    }
}
