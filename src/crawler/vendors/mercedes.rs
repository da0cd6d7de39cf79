//! Mercedes-Benz USA used-vehicle search

use crate::config::BrandConfig;
use crate::crawler::fetcher::{read_json, take_array, FetchError, FetchResult, Pacer, PageFetcher};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

pub const DEFAULT_ENDPOINT: &str =
    "https://nafta-service.mbusa.com/api/inv/en_us/used/vehicles/search";
const PAGE_SIZE: u32 = 100;

/// Model codes included in the certified pre-owned search
const MODEL_CODES: &str = "A220W,A220W4,A35W4,GT63C4,GT63C4S,GT53C4,GT43C4,GT63C4SE,B250E,\
C230WZ,C300W,C300W4,C350W,C250W,C400W4,C63P,C450W4,C350WE,C63WS,C43W4,C63W,C63W4SE,\
E320W,E350W,E350W4,E550W,E63,E550W4,E400H,E350BTC,E250BTC,E63P,E400W,E400W4,E63W4S,\
E43W4,E300W4,E300W,E450W4,E53W4,E53EW4,EQE500V4,AMGEQEV4,EQE350V,EQE350V4,EQE350X,\
AMGEQEX4,EQE350X4,EQS580V4,AMGEQSV4,EQS450V,EQS450V4,S430V4,S550V,S550V4,S350BTC4,\
S63,S65V,S63V4,S600V,S600X,S550VE,S550X4,S560V,S450V,S650X,S560V4,S450V4,S560X4,\
S500V4,S580Z4,S580V4,S680Z4,S580EV4,S63EV4";

/// Fetches inventory pages with an offset-based GET query
pub struct MercedesFetcher {
    client: Client,
    endpoint: String,
    radius: u32,
    pacer: Pacer,
}

impl MercedesFetcher {
    pub fn new(client: Client, config: &BrandConfig, pacer: Pacer) -> Self {
        Self {
            client,
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            radius: config.radius,
            pacer,
        }
    }

    fn query(&self, location_code: &str, page_index: u32) -> Vec<(&'static str, String)> {
        vec![
            ("count", PAGE_SIZE.to_string()),
            ("distance", self.radius.to_string()),
            ("invType", "cpo".to_string()),
            ("model", MODEL_CODES.to_string()),
            ("resvOnly", "false".to_string()),
            ("sortBy", "price".to_string()),
            ("start", (page_index * PAGE_SIZE).to_string()),
            ("withFilters", "true".to_string()),
            ("zip", location_code.to_string()),
            ("maxPrice", "35000".to_string()),
            ("minPrice", "0".to_string()),
            ("year", "2021,2022,2023,2024".to_string()),
            ("maxMileage", "30000".to_string()),
        ]
    }
}

#[async_trait]
impl PageFetcher for MercedesFetcher {
    async fn fetch_page(&self, location_code: &str, page_index: u32) -> FetchResult<Vec<Value>> {
        self.pacer.wait(page_index).await;

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(location_code, page_index))
            .send()
            .await?;

        let mut body = read_json(response).await?;

        // The envelope carries its own status next to the HTTP one
        let api_status = body.pointer("/status/code").and_then(Value::as_i64);
        if api_status != Some(200) {
            return Err(FetchError::Api(format!(
                "status code {:?} for location {}",
                api_status, location_code
            )));
        }

        take_array(&mut body, "/result/pagedVehicles/records")
            .ok_or_else(|| FetchError::Decode("missing result.pagedVehicles.records".to_string()))
    }
}
