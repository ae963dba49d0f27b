//! HTTP fetching.
//!
//! The engine only depends on the [`Fetcher`] trait. [`HttpFetcher`] is the
//! reqwest-backed implementation used by the binary; tests plug in their own.

mod http;

pub use http::{HttpFetcher, DEFAULT_MAX_BODY_BYTES};

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

use crate::error::FetchError;

/// Issues a single GET.
///
/// One call is one network attempt: implementations must not retry or cache.
/// Any non-2xx status is reported as [`FetchError::HttpStatus`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}
