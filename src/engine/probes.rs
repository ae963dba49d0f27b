use crate::extractor::{
    feed_patterns, generator_meta_patterns, links_opml_patterns, readme_html_patterns,
    VersionPattern,
};

/// A path known to reveal the core version, with the patterns that read it.
#[derive(Debug, Clone, Copy)]
pub struct CoreProbe {
    /// Relative to the target root; empty for the home page.
    pub path: &'static str,
    pub patterns: &'static [VersionPattern],
}

/// Core probes in the order they are tried. The home page comes first since
/// the reachability check has already fetched it.
pub fn core_probes() -> [CoreProbe; 4] {
    [
        CoreProbe {
            path: "",
            patterns: generator_meta_patterns(),
        },
        CoreProbe {
            path: "readme.html",
            patterns: readme_html_patterns(),
        },
        CoreProbe {
            path: "wp-links-opml.php",
            patterns: links_opml_patterns(),
        },
        CoreProbe {
            path: "feed/",
            patterns: feed_patterns(),
        },
    ]
}

/// Readme file names tried for each plugin, in order. Later names are only
/// tried when the earlier one is missing (404).
pub const PLUGIN_README_FILES: [&str; 2] = ["readme.txt", "README.txt"];

/// Path of a plugin's readme below the target root. `None` unless the name is
/// a plain slug, so a candidate can never point outside `wp-content/plugins/`.
pub fn plugin_readme_path(plugin: &str, file: &str) -> Option<String> {
    let slug = plugin.trim();
    is_plugin_slug(slug).then(|| format!("wp-content/plugins/{}/{}", slug, file))
}

/// ASCII letters, digits, `-`, `_` and `.`, and not only dots.
fn is_plugin_slug(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !name.chars().all(|c| c == '.')
}
