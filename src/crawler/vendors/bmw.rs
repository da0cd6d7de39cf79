//! BMW dealer-program inventory service

use crate::config::BrandConfig;
use crate::crawler::fetcher::{read_json, take_array, FetchResult, Pacer, PageFetcher};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub const DEFAULT_ENDPOINT: &str = "https://inventoryservices.bmwdealerprograms.com/vehicle";
const PAGE_SIZE: u32 = 100;
const DEFAULT_SERIES: &str = "3 Series";

/// Fetches certified pre-owned inventory pages with a POSTed search body
pub struct BmwFetcher {
    client: Client,
    endpoint: String,
    auth_token: String,
    series: String,
    radius: u32,
    pacer: Pacer,
}

impl BmwFetcher {
    pub fn new(client: Client, config: &BrandConfig, pacer: Pacer) -> Self {
        Self {
            client,
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            auth_token: config.auth_token.clone().unwrap_or_default(),
            series: config
                .series
                .clone()
                .unwrap_or_else(|| DEFAULT_SERIES.to_string()),
            radius: config.radius,
            pacer,
        }
    }

    fn search_body(&self, location_code: &str, page_index: u32) -> Value {
        json!({
            "pageIndex": page_index,
            "PageSize": PAGE_SIZE,
            "postalCode": location_code,
            "radius": self.radius,
            "sortBy": "price",
            "sortDirection": "asc",
            "formatResponse": false,
            "includeFacets": true,
            "includeDealers": true,
            "includeVehicles": true,
            "filters": [
                {"name": "Series", "values": [self.series]},
                {"name": "Type", "values": ["CPO"]},
                {"name": "Odometer", "values": ["30,000 or less"]},
                {"name": "Price", "values": ["$20,000 - $29,999", "$30,000 - $39,999"]},
                {"name": "Drivetrain", "values": ["AWD"]}
            ]
        })
    }
}

#[async_trait]
impl PageFetcher for BmwFetcher {
    async fn fetch_page(&self, location_code: &str, page_index: u32) -> FetchResult<Vec<Value>> {
        self.pacer.wait(page_index).await;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.auth_token)
            .header("Accept", "application/json")
            .json(&self.search_body(location_code, page_index))
            .send()
            .await?;

        let mut body = read_json(response).await?;
        Ok(take_array(&mut body, "/vehicles").unwrap_or_default())
    }
}
