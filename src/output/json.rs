use serde::{Deserialize, Serialize};

use super::{yes_no, REPORT_TIME_FORMAT};
use crate::error::ReportError;
use crate::model::ScanResult;

/// On-disk JSON report layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonReport {
    pub target: String,
    pub start_time: String,
    pub end_time: String,
    pub wordpress: JsonWordPress,
    pub plugins: Vec<JsonPlugin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonWordPress {
    pub current_version: Option<String>,
    pub last_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonPlugin {
    pub plugin_name: String,
    pub current_version: Option<String>,
    pub last_version: Option<String>,
    pub url: Option<String>,
    /// `"Yes"` or `"No"`.
    pub outdated: String,
    pub cves: Vec<String>,
    pub exploits: Vec<String>,
}

impl JsonPlugin {
    pub fn is_outdated(&self) -> bool {
        self.outdated.eq_ignore_ascii_case("yes")
    }
}

impl From<&ScanResult> for JsonReport {
    fn from(result: &ScanResult) -> Self {
        Self {
            target: result.target.to_string(),
            start_time: result.start_time.format(REPORT_TIME_FORMAT).to_string(),
            end_time: result.end_time.format(REPORT_TIME_FORMAT).to_string(),
            wordpress: JsonWordPress {
                current_version: result.wordpress_info.current_version.clone(),
                last_version: result.wordpress_info.latest_version.clone(),
            },
            plugins: result
                .plugins
                .iter()
                .map(|plugin| JsonPlugin {
                    plugin_name: plugin.plugin_name.clone(),
                    current_version: plugin.current_version.clone(),
                    last_version: plugin.latest_version.clone(),
                    url: plugin.plugin_uri.clone(),
                    outdated: yes_no(plugin.is_outdated).to_string(),
                    cves: plugin.cves.clone(),
                    exploits: plugin.exploits.clone(),
                })
                .collect(),
        }
    }
}

pub(super) fn generate_json_string(result: &ScanResult) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(&JsonReport::from(result))?)
}

/// Reads back a report produced by the JSON reporter.
pub fn parse_json_report(content: &str) -> Result<JsonReport, ReportError> {
    Ok(serde_json::from_str(content)?)
}
