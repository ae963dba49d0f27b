use std::fmt::Write as _;
use tabled::{settings::Style, Table, Tabled};

use crate::model::ScanResult;

#[derive(Tabled)]
struct PluginRow {
    #[tabled(rename = "Plugin")]
    name: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Latest")]
    latest: String,
    #[tabled(rename = "Outdated")]
    outdated: String,
    #[tabled(rename = "CVEs")]
    cves: String,
    #[tabled(rename = "Exploits")]
    exploits: String,
}

pub fn print_cli_table(result: &ScanResult) {
    println!("{}", render_cli_table(result));
}

/// Human-readable summary of a scan.
pub fn render_cli_table(result: &ScanResult) -> String {
    let mut out = String::new();
    let elapsed = result.end_time - result.start_time;

    let _ = writeln!(out);
    let _ = writeln!(out, "Target: {}", result.target);
    let _ = writeln!(
        out,
        "Scan finished at {} ({}s)",
        result.end_time.format("%Y-%m-%d %H:%M:%S"),
        elapsed.num_seconds()
    );
    let _ = writeln!(out);

    let wp = &result.wordpress_info;
    let _ = writeln!(
        out,
        "WordPress version: {} (latest: {}){}",
        format_version(&wp.current_version),
        format_version(&wp.latest_version),
        if wp.is_outdated() { " [outdated]" } else { "" }
    );
    let _ = writeln!(out);

    let found: Vec<_> = result.installed_plugins().collect();
    if found.is_empty() {
        let _ = writeln!(
            out,
            "No plugins found ({} candidates probed).",
            result.plugins.len()
        );
        return out;
    }

    let _ = writeln!(
        out,
        "Found {} of {} plugins ({} outdated, {} with known vulnerabilities):",
        found.len(),
        result.plugins.len(),
        result.outdated_plugins().count(),
        result.vulnerable_plugins().count()
    );
    let _ = writeln!(out);

    let rows: Vec<PluginRow> = found
        .iter()
        .map(|p| PluginRow {
            name: truncate(&p.plugin_name, 40),
            current: format_version(&p.current_version),
            latest: format_version(&p.latest_version),
            outdated: if p.is_outdated { "yes" } else { "no" }.to_string(),
            cves: join_or_dash(&p.cves),
            exploits: join_or_dash(&p.exploits),
        })
        .collect();

    let _ = write!(out, "{}", Table::new(rows).with(Style::rounded()));
    out
}

fn format_version(version: &Option<String>) -> String {
    version.clone().unwrap_or_else(|| "unknown".to_string())
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
