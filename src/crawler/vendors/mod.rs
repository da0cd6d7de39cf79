//! HTTP fetchers for each supported inventory vendor

mod bmw;
mod mercedes;

pub use bmw::BmwFetcher;
pub use mercedes::MercedesFetcher;

use crate::config::{BrandConfig, CrawlerConfig};
use crate::crawler::fetcher::{Pacer, PageFetcher};
use crate::model::Brand;
use reqwest::Client;

/// Builds the vendor fetcher for a configured brand
pub fn build_fetcher(
    client: Client,
    brand: &BrandConfig,
    crawler: &CrawlerConfig,
) -> Box<dyn PageFetcher> {
    let pacer = Pacer::new(crawler.page_delay(), crawler.location_delay());
    match brand.name {
        Brand::Bmw => Box::new(BmwFetcher::new(client, brand, pacer)),
        Brand::Mercedes => Box::new(MercedesFetcher::new(client, brand, pacer)),
    }
}
