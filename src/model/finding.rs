use chrono::{DateTime, Local};

use super::Target;
use crate::index::is_outdated;

/// CVE identifiers and exploit references known for one component version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vulnerabilities {
    pub cves: Vec<String>,
    pub exploits: Vec<String>,
}

impl Vulnerabilities {
    pub fn is_empty(&self) -> bool {
        self.cves.is_empty() && self.exploits.is_empty()
    }
}

/// Version information for a probed component.
///
/// `current_version = None` means the component was probed but its version
/// could not be determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentVersion {
    pub name: String,
    pub current_version: Option<String>,
    pub latest_version: Option<String>,
}

impl ComponentVersion {
    pub fn new(
        name: impl Into<String>,
        current_version: Option<String>,
        latest_version: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            current_version,
            latest_version,
        }
    }

    pub fn is_outdated(&self) -> bool {
        is_outdated(self.current_version.as_deref(), self.latest_version.as_deref())
    }
}

/// Outcome of probing one plugin candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginFinding {
    pub plugin_name: String,
    pub current_version: Option<String>,
    pub latest_version: Option<String>,
    pub plugin_uri: Option<String>,
    /// Derived from the two versions; an unknown version is never outdated.
    pub is_outdated: bool,
    pub cves: Vec<String>,
    pub exploits: Vec<String>,
}

impl PluginFinding {
    pub fn new(
        plugin_name: impl Into<String>,
        current_version: Option<String>,
        latest_version: Option<String>,
    ) -> Self {
        let is_outdated = is_outdated(current_version.as_deref(), latest_version.as_deref());
        Self {
            plugin_name: plugin_name.into(),
            current_version,
            latest_version,
            plugin_uri: None,
            is_outdated,
            cves: Vec::new(),
            exploits: Vec::new(),
        }
    }

    /// Finding for a plugin whose version could not be detected.
    pub fn unknown(plugin_name: impl Into<String>, latest_version: Option<String>) -> Self {
        Self::new(plugin_name, None, latest_version)
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.plugin_uri = Some(uri.into());
        self
    }

    pub fn with_vulnerabilities(mut self, vulnerabilities: Vulnerabilities) -> Self {
        self.cves = vulnerabilities.cves;
        self.exploits = vulnerabilities.exploits;
        self
    }

    pub fn is_vulnerable(&self) -> bool {
        !self.cves.is_empty() || !self.exploits.is_empty()
    }
}

/// Complete output of one scan. Built once by the engine and only read after.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub target: Target,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub wordpress_info: ComponentVersion,
    /// In the order the candidates were supplied.
    pub plugins: Vec<PluginFinding>,
}

impl ScanResult {
    pub fn new(
        target: Target,
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
        wordpress_info: ComponentVersion,
        plugins: Vec<PluginFinding>,
    ) -> Self {
        Self {
            target,
            start_time,
            // Wall clock can step backwards during a scan.
            end_time: end_time.max(start_time),
            wordpress_info,
            plugins,
        }
    }

    pub fn outdated_plugins(&self) -> impl Iterator<Item = &PluginFinding> {
        self.plugins.iter().filter(|p| p.is_outdated)
    }

    pub fn vulnerable_plugins(&self) -> impl Iterator<Item = &PluginFinding> {
        self.plugins.iter().filter(|p| p.is_vulnerable())
    }

    /// Plugins whose readme was served, with or without a readable version.
    pub fn installed_plugins(&self) -> impl Iterator<Item = &PluginFinding> {
        self.plugins.iter().filter(|p| p.plugin_uri.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_outdated_requires_both_versions() {
        assert!(PluginFinding::new("a", Some("1.0".into()), Some("1.1".into())).is_outdated);
        assert!(!PluginFinding::new("a", None, Some("1.1".into())).is_outdated);
        assert!(!PluginFinding::new("a", Some("1.0".into()), None).is_outdated);
        assert!(!PluginFinding::unknown("a", None).is_outdated);
    }

    #[test]
    fn test_outdated_uses_normalized_comparison() {
        assert!(!PluginFinding::new("a", Some("V1.2 ".into()), Some("1.2".into())).is_outdated);
    }

    #[test]
    fn test_component_version_outdated() {
        let core = ComponentVersion::new("wordpress", Some("4.7".into()), Some("4.9".into()));
        assert!(core.is_outdated());
        let core = ComponentVersion::new("wordpress", None, Some("4.9".into()));
        assert!(!core.is_outdated());
    }

    #[test]
    fn test_scan_result_clamps_end_time() {
        let start = Local::now();
        let result = ScanResult::new(
            Target::parse("example.com").unwrap(),
            start,
            start - Duration::seconds(5),
            ComponentVersion::new("wordpress", None, None),
            Vec::new(),
        );
        assert!(result.end_time >= result.start_time);
    }

    #[test]
    fn test_scan_result_filters() {
        let start = Local::now();
        let plugins = vec![
            PluginFinding::new("old", Some("1.0".into()), Some("2.0".into()))
                .with_uri("http://example.com/wp-content/plugins/old/readme.txt")
                .with_vulnerabilities(Vulnerabilities {
                    cves: vec!["CVE-2020-1".into()],
                    exploits: vec![],
                }),
            PluginFinding::new("current", Some("2.0".into()), Some("2.0".into()))
                .with_uri("http://example.com/wp-content/plugins/current/readme.txt"),
            PluginFinding::unknown("missing", Some("1.0".into())),
        ];
        let result = ScanResult::new(
            Target::parse("example.com").unwrap(),
            start,
            start,
            ComponentVersion::new("wordpress", Some("4.9".into()), Some("4.9".into())),
            plugins,
        );

        assert_eq!(result.outdated_plugins().count(), 1);
        assert_eq!(result.vulnerable_plugins().count(), 1);
        assert_eq!(result.installed_plugins().count(), 2);
    }
}
