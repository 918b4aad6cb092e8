//! Page fetching
//!
//! The engine never talks to the network directly; it depends on the
//! `PageFetcher` capability. `HttpFetcher` is the reqwest-backed default:
//! desktop browser user agent, bounded redirects, per-request timeout,
//! and a streamed, capped body read.

use anyhow::Result;
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// User agent presented to fetched origins; some sites refuse
/// non-browser agents outright
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Cap on a single response body; pages past this are truncated
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const MAX_REDIRECTS: usize = 5;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("could not connect")]
    Connection,

    #[error("{0}")]
    Other(String),
}

/// A fetched page: status code plus decoded body text
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status_code: u16,
    pub body: String,
}

/// Capability for retrieving a page over the network
pub trait PageFetcher {
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Default reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(DESKTOP_USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError> {
        debug!("Fetching {} (timeout {:?})", url, timeout);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status_code = response.status().as_u16();
        let body = read_body_capped(response, url).await?;

        Ok(FetchedPage { status_code, body })
    }
}

fn map_reqwest_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Connection
    } else {
        FetchError::Other(error.to_string())
    }
}

/// Stream the body into memory, stopping at `MAX_BODY_BYTES`
async fn read_body_capped(response: reqwest::Response, url: &str) -> Result<String, FetchError> {
    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        if buffer.len() + chunk.len() > MAX_BODY_BYTES {
            let remaining = MAX_BODY_BYTES - buffer.len();
            buffer.extend_from_slice(&chunk[..remaining]);
            warn!("Response body for {} exceeded {} bytes, truncating", url, MAX_BODY_BYTES);
            break;
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(FetchError::Timeout.to_string(), "request timed out");
        assert_eq!(FetchError::Connection.to_string(), "could not connect");
        assert_eq!(FetchError::Other("boom".to_string()).to_string(), "boom");
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new().is_ok());
    }
}
