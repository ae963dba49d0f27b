use reqwest::Url;
use std::fmt;

use crate::error::TargetError;

/// Base URL of the site under scan.
///
/// The path always ends in `/` so that probe paths resolve beneath it:
/// `http://example.com/blog` probes `http://example.com/blog/readme.html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
}

impl Target {
    /// Parses a user supplied target. A missing scheme defaults to `http://`.
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let trimmed = input.trim();
        let invalid = |reason: String| TargetError {
            input: input.to_string(),
            reason,
        };

        if trimmed.is_empty() {
            return Err(invalid("empty URL".to_string()));
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };

        let mut url = Url::parse(&with_scheme).map_err(|e| invalid(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        url.set_query(None);
        url.set_fragment(None);
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Resolves a path relative to the target root.
    pub fn resolve(&self, path: &str) -> Option<Url> {
        self.url.join(path.trim_start_matches('/')).ok()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
