//! Crawler module for vendor inventory retrieval
//!
//! This module contains the core crawling logic, including:
//! - The page fetching capability and transport error classification
//! - Vendor HTTP fetchers with request pacing
//! - The per-brand fetch/transform/dedup session
//! - Overall multi-brand coordination

mod coordinator;
mod fetcher;
mod session;
pub mod vendors;

pub use coordinator::{run_brand, run_crawl, Coordinator};
pub use fetcher::{build_http_client, read_json, take_array, FetchError, FetchResult, Pacer, PageFetcher};
pub use session::{CrawlSession, SessionOptions, SessionOutput, SessionStats};

use crate::config::Config;
use crate::model::Brand;
use crate::report::Report;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the inventory database
/// 2. Build the HTTP client and one vendor fetcher per brand
/// 3. Sweep every location code for each brand concurrently
/// 4. Upsert each brand's vehicles and compute price changes
/// 5. Return one report per brand, in request order
pub async fn crawl(config: Config, brands: &[Brand]) -> Result<Vec<Report>> {
    run_crawl(config, brands).await
}
