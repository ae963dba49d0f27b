//! Version comparison for the outdated verdict.
//!
//! Vendor version strings are not reliably monotonic or semver shaped
//! ("4.7", "1.0-beta2", "20170101"), so a version counts as current only when
//! it matches the latest known string after normalization. No ordering is
//! attempted.

/// Trims, lowercases, and strips a leading `v`.
pub fn normalize_version(version: &str) -> String {
    let lowered = version.trim().to_lowercase();
    match lowered.strip_prefix('v') {
        Some(rest) => rest.trim_start().to_string(),
        None => lowered,
    }
}

/// Whether two version strings name the same release.
pub fn versions_match(a: &str, b: &str) -> bool {
    normalize_version(a) == normalize_version(b)
}

/// True only when both versions are known and differ.
pub fn is_outdated(current: Option<&str>, latest: Option<&str>) -> bool {
    match (current, latest) {
        (Some(current), Some(latest)) => !versions_match(current, latest),
        _ => false,
    }
}
