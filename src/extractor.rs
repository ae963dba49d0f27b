//! Version signal extraction from raw HTTP bodies.
//!
//! Responses come from sites we do not control, so extraction never fails:
//! patterns are tried in priority order and the first usable capture wins.
//! When nothing matches the version is simply unknown.
//!
//! # Pattern sets
//!
//! | Source | Pattern |
//! |--------|---------|
//! | `/` | `<meta name="generator" content="WordPress X">` |
//! | `readme.html` | `<br /> Version X` |
//! | `wp-links-opml.php` | `<!-- generator="WordPress/X" -->` |
//! | `feed/` | `<generator>https://wordpress.org/?v=X</generator>` |
//! | plugin `readme.txt` | `Stable tag: X`, then `Version: X`, then the first `== Changelog ==` entry |
//!
//! Plugin patterns only accept captures starting with a digit, so the common
//! `Stable tag: trunk` falls through to the changelog.

use regex::Regex;
use std::sync::LazyLock;

/// A named regex whose first capture group holds the version.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    name: &'static str,
    regex: Regex,
}

impl VersionPattern {
    pub fn new(name: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            regex: Regex::new(pattern)?,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Returns the cleaned capture of the first pattern that yields one.
pub fn extract(body: &[u8], patterns: &[VersionPattern]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    patterns.iter().find_map(|pattern| {
        pattern
            .regex
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| clean_capture(m.as_str()))
    })
}

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static markup pattern"));

/// Structural markers only. The bare word "WordPress" shows up in plenty of
/// pages that merely link to wordpress.org.
static SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)wp-(?:content|includes)/|wordpress\.org/\?v=|content\s*=\s*["']WordPress\s+[0-9]|generator\s*=\s*["']WordPress/"#,
    )
    .expect("static signature pattern")
});

/// Strips embedded tags and surrounding whitespace, quotes, and markup
/// punctuation. `None` when nothing is left.
fn clean_capture(raw: &str) -> Option<String> {
    let stripped = MARKUP.replace_all(raw, "");
    let cleaned = stripped
        .trim_matches(|c: char| c.is_whitespace() || "\"'<>/;,()[]".contains(c))
        .trim_end_matches('.');

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Whether a body carries any sign of a WordPress install.
pub fn has_wordpress_signature(body: &[u8]) -> bool {
    SIGNATURE.is_match(&String::from_utf8_lossy(body))
}

fn compile(specs: &[(&'static str, &str)]) -> Vec<VersionPattern> {
    specs
        .iter()
        .map(|&(name, pattern)| VersionPattern::new(name, pattern).expect("static version pattern"))
        .collect()
}

static GENERATOR_META: LazyLock<Vec<VersionPattern>> = LazyLock::new(|| {
    compile(&[
        (
            "meta generator",
            r#"(?i)<meta[^>]*name\s*=\s*["']generator["'][^>]*content\s*=\s*["']WordPress\s+([0-9][^"']*)["']"#,
        ),
        (
            "meta generator (content first)",
            r#"(?i)<meta[^>]*content\s*=\s*["']WordPress\s+([0-9][^"']*)["'][^>]*name\s*=\s*["']generator["']"#,
        ),
    ])
});

static README_HTML: LazyLock<Vec<VersionPattern>> = LazyLock::new(|| {
    compile(&[(
        "readme version",
        r"(?i)<br\s*/?>\s*version\s+([0-9][0-9a-z.\-]*)",
    )])
});

static LINKS_OPML: LazyLock<Vec<VersionPattern>> = LazyLock::new(|| {
    compile(&[(
        "opml generator",
        r#"(?i)<!--\s*generator\s*=\s*["']WordPress/([0-9][^"']*)["']"#,
    )])
});

static FEED: LazyLock<Vec<VersionPattern>> = LazyLock::new(|| {
    compile(&[(
        "feed generator",
        r"(?i)<generator>\s*https?://wordpress\.org/\?v=([0-9][^<\s]*)\s*</generator>",
    )])
});

static PLUGIN_README: LazyLock<Vec<VersionPattern>> = LazyLock::new(|| {
    compile(&[
        (
            "stable tag",
            r"(?im)^[ \t]*stable tag:[ \t]*v?([0-9][0-9A-Za-z.\-_]*)",
        ),
        (
            "version header",
            r"(?im)^[ \t]*version:[ \t]*v?([0-9][0-9A-Za-z.\-_]*)",
        ),
        (
            "changelog entry",
            r"(?is)==\s*changelog\s*==.*?=\s*(?:version\s+)?v?([0-9][0-9A-Za-z.\-_]*)[^=\n]*=",
        ),
    ])
});

/// Patterns for the generator meta tag on the home page.
pub fn generator_meta_patterns() -> &'static [VersionPattern] {
    &GENERATOR_META
}

pub fn readme_html_patterns() -> &'static [VersionPattern] {
    &README_HTML
}

pub fn links_opml_patterns() -> &'static [VersionPattern] {
    &LINKS_OPML
}

pub fn feed_patterns() -> &'static [VersionPattern] {
    &FEED
}

/// Patterns for a plugin's `readme.txt`, most specific first.
pub fn plugin_readme_patterns() -> &'static [VersionPattern] {
    &PLUGIN_README
}
