//! Page fetching capability
//!
//! This module defines what the crawl loop needs from a vendor:
//! - The [`PageFetcher`] trait, one page of raw records per call
//! - Transport error classification
//! - The shared HTTP client and request pacing used by the vendor fetchers

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Transport failures for a single page request
///
/// Every variant ends pagination for the location that produced it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("HTTP status {code}")]
    Status { code: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Vendor API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Network("Connection refused".to_string())
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Source of raw inventory pages for one brand
///
/// An empty page means the location has no more results. Implementations are
/// responsible for their own pacing between calls.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, location_code: &str, page_index: u32) -> FetchResult<Vec<Value>>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Box<T> {
    async fn fetch_page(&self, location_code: &str, page_index: u32) -> FetchResult<Vec<Value>> {
        (**self).fetch_page(location_code, page_index).await
    }
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch_page(&self, location_code: &str, page_index: u32) -> FetchResult<Vec<Value>> {
        (**self).fetch_page(location_code, page_index).await
    }
}

/// Builds the HTTP client shared by all vendor fetchers
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("dealer-inventory/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .build()
}

/// Reads a successful response body as JSON
///
/// Non-2xx statuses and bodies that are not JSON are transport failures.
pub async fn read_json(response: Response) -> FetchResult<Value> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            code: status.as_u16(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Moves the array found at `pointer` out of `body`
///
/// Returns `None` when the pointer is absent or not an array.
pub fn take_array(body: &mut Value, pointer: &str) -> Option<Vec<Value>> {
    match body.pointer_mut(pointer).map(Value::take) {
        Some(Value::Array(records)) => Some(records),
        _ => None,
    }
}

/// Politeness delay between requests to one vendor
///
/// Consecutive pages are spaced by `page_delay`; the first page of a location
/// (index 0) waits `location_delay` instead. The very first request is not
/// delayed.
#[derive(Debug)]
pub struct Pacer {
    page_delay: Duration,
    location_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(page_delay: Duration, location_delay: Duration) -> Self {
        Self {
            page_delay,
            location_delay,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until the next request for `page_index` may be sent
    pub async fn wait(&self, page_index: u32) {
        let delay = if page_index == 0 {
            self.location_delay
        } else {
            self.page_delay
        };

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < delay {
                tokio::time::sleep(delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client().is_ok());
    }

    #[test]
    fn test_take_array() {
        let mut body = json!({"result": {"records": [{"vin": "A"}, {"vin": "B"}]}, "other": 1});
        let records = take_array(&mut body, "/result/records").unwrap();
        assert_eq!(records.len(), 2);
        assert!(take_array(&mut body, "/other").is_none());
        assert!(take_array(&mut body, "/missing").is_none());
    }

    #[tokio::test]
    async fn test_pacer_spaces_requests() {
        let pacer = Pacer::new(Duration::from_millis(40), Duration::from_millis(80));

        let start = Instant::now();
        pacer.wait(0).await;
        assert!(start.elapsed() < Duration::from_millis(40));

        pacer.wait(1).await;
        assert!(start.elapsed() >= Duration::from_millis(40));

        let before_location = Instant::now();
        pacer.wait(0).await;
        assert!(before_location.elapsed() >= Duration::from_millis(70));
    }
}
