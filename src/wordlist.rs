//! Plugin candidate lists.
//!
//! One plugin per line. Blank lines and `#` comments are skipped, and for
//! `name,latest` style lines only the first field is used. Order is kept and
//! duplicates are not removed.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn load_candidates(path: &Path, limit: Option<usize>) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read plugin wordlist {}", path.display()))?;
    Ok(parse_candidates(&content, limit))
}

pub fn parse_candidates(content: &str, limit: Option<usize>) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let name = line.split(',').next().unwrap_or_default().trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let content = "# popular plugins\nakismet\n\n  jetpack  \n#disabled\n";
        assert_eq!(parse_candidates(content, None), vec!["akismet", "jetpack"]);
    }

    #[test]
    fn test_parse_takes_first_csv_field() {
        let content = "akismet,3.3\ncontact-form-7, 4.9\n,orphan\n";
        assert_eq!(parse_candidates(content, None), vec!["akismet", "contact-form-7"]);
    }

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        let content = "b\na\nb\n";
        assert_eq!(parse_candidates(content, None), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_parse_limit() {
        let content = "a\nb\nc\n";
        assert_eq!(parse_candidates(content, Some(2)), vec!["a", "b"]);
        assert!(parse_candidates(content, Some(0)).is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_candidates(Path::new("/nonexistent/plugins.txt"), None).is_err());
    }
}
