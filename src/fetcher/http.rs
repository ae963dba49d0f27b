use async_trait::async_trait;
use reqwest::{redirect, Url};
use std::error::Error as StdError;
use std::time::Duration;
use tracing::debug;

use super::Fetcher;
use crate::error::FetchError;

const MAX_REDIRECTS: usize = 10;

/// Bodies are cut off here. Version signals sit near the top of the pages
/// and readmes that are probed.
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_user_agent(user_agent: &str) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self {
            client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "fetched");
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            let room = self.max_body_bytes - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                debug!(url = %url, limit = self.max_body_bytes, "body truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

/// Maps a reqwest failure onto the fetch taxonomy.
///
/// reqwest does not expose refused connections or TLS failures directly, so
/// the source chain is inspected.
fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout;
    }
    if let Some(status) = err.status() {
        return FetchError::HttpStatus(status.as_u16());
    }

    let mut messages = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::ConnectionRefused => return FetchError::ConnectionRefused,
                std::io::ErrorKind::TimedOut => return FetchError::Timeout,
                _ => {}
            }
        }
        messages.push(cause.to_string());
        source = cause.source();
    }

    let detail = messages.join(": ");
    let lowered = detail.to_lowercase();
    if lowered.contains("connection refused") {
        FetchError::ConnectionRefused
    } else if ["certificate", "tls", "ssl", "handshake"]
        .iter()
        .any(|needle| lowered.contains(needle))
    {
        FetchError::Tls(detail)
    } else {
        FetchError::Transport(detail)
    }
}
