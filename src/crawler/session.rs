//! One brand's sweep over its location codes
//!
//! A session pages through every location code in order, transforms each raw
//! record, and folds the results into a single VIN-keyed map. Bad records and
//! failed pages are logged and skipped; nothing here aborts the sweep.

use crate::crawler::fetcher::{FetchError, FetchResult, PageFetcher};
use crate::model::{Brand, VehicleRecord};
use crate::transform::VehicleTransformer;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Tunables applied around every fetch
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Deadline for a single page fetch; an expired call ends its location
    pub fetch_timeout: Option<Duration>,
}

/// Counters collected during a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub fetch_calls: u32,
    pub pages: u32,
    pub records_seen: u32,
    pub records_skipped: u32,
    /// Location codes whose pagination ended on a transport failure
    pub failed_locations: Vec<String>,
}

/// Deduplicated vehicles plus session counters
#[derive(Debug, Clone, Default)]
pub struct SessionOutput {
    /// VIN -> most recently seen record
    pub vehicles: HashMap<String, VehicleRecord>,
    pub stats: SessionStats,
}

/// Fetch -> transform -> dedup loop for one brand
pub struct CrawlSession<F> {
    fetcher: F,
    transformer: VehicleTransformer,
    options: SessionOptions,
}

impl<F: PageFetcher> CrawlSession<F> {
    pub fn new(fetcher: F, transformer: VehicleTransformer) -> Self {
        Self {
            fetcher,
            transformer,
            options: SessionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn brand(&self) -> Brand {
        self.transformer.brand()
    }

    /// Crawls every location code and returns the deduplicated vehicles
    ///
    /// Pages of one location are fetched strictly in index order starting at
    /// 0, until an empty page or a transport failure. A VIN seen again (on a
    /// later page or at a later location) replaces the earlier record.
    pub async fn run<S: AsRef<str>>(&self, location_codes: &[S]) -> SessionOutput {
        let brand = self.brand();
        let mut output = SessionOutput::default();

        for (index, code) in location_codes.iter().enumerate() {
            let code = code.as_ref();
            tracing::info!("[{}] Fetching inventory for location {}", brand, code);

            let mut page_index = 0u32;
            loop {
                output.stats.fetch_calls += 1;
                let raw_records = match self.fetch(code, page_index).await {
                    Ok(records) => records,
                    Err(e) => {
                        tracing::warn!(
                            "[{}] Location {} page {} failed, moving on: {}",
                            brand,
                            code,
                            page_index,
                            e
                        );
                        output.stats.failed_locations.push(code.to_string());
                        break;
                    }
                };

                if raw_records.is_empty() {
                    break;
                }

                output.stats.pages += 1;
                let count = raw_records.len();
                self.fold_page(raw_records, &mut output);

                tracing::debug!(
                    "[{}] Retrieved {} vehicles on page {} for {}",
                    brand,
                    count,
                    page_index,
                    code
                );
                page_index += 1;
            }

            tracing::info!(
                "[{}] Location {}/{} done ({} unique vehicles so far)",
                brand,
                index + 1,
                location_codes.len(),
                output.vehicles.len()
            );
        }

        output
    }

    async fn fetch(&self, code: &str, page_index: u32) -> FetchResult<Vec<Value>> {
        let request = self.fetcher.fetch_page(code, page_index);
        match self.options.fetch_timeout {
            Some(deadline) => tokio::time::timeout(deadline, request)
                .await
                .unwrap_or(Err(FetchError::Timeout)),
            None => request.await,
        }
    }

    fn fold_page(&self, raw_records: Vec<Value>, output: &mut SessionOutput) {
        for raw in raw_records {
            output.stats.records_seen += 1;
            match self.transformer.transform(raw) {
                Ok(vehicle) => {
                    output.vehicles.insert(vehicle.vin.clone(), vehicle);
                }
                Err(e) => {
                    output.stats.records_skipped += 1;
                    tracing::warn!("[{}] Skipping record: {}", self.brand(), e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Serves pre-recorded pages per location; anything unscripted is empty
    #[derive(Default)]
    struct ScriptedFetcher {
        pages: HashMap<String, Vec<FetchResult<Vec<Value>>>>,
        calls: Mutex<Vec<(String, u32)>>,
        delay: Option<Duration>,
    }

    impl ScriptedFetcher {
        fn with_location(mut self, code: &str, pages: Vec<FetchResult<Vec<Value>>>) -> Self {
            self.pages.insert(code.to_string(), pages);
            self
        }

        fn calls(&self) -> Vec<(String, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch_page(&self, code: &str, page_index: u32) -> FetchResult<Vec<Value>> {
            self.calls
                .lock()
                .unwrap()
                .push((code.to_string(), page_index));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.pages
                .get(code)
                .and_then(|pages| pages.get(page_index as usize))
                .cloned()
                .unwrap_or(Ok(Vec::new()))
        }
    }

    fn bmw(vin: &str, price: u32) -> Value {
        json!({
            "vin": vin,
            "model": "330i xDrive",
            "internetPrice": price,
            "odometer": 12000,
            "drivetrain": "AWD",
            "vdpUrl": format!("https://dealer.example/{}", vin)
        })
    }

    fn session(fetcher: &Arc<ScriptedFetcher>) -> CrawlSession<Arc<ScriptedFetcher>> {
        CrawlSession::new(Arc::clone(fetcher), VehicleTransformer::Bmw)
    }

    #[tokio::test]
    async fn test_single_location_single_page() {
        let fetcher = Arc::new(
            ScriptedFetcher::default().with_location("60601", vec![Ok(vec![bmw("V1", 25_000)])]),
        );

        let output = session(&fetcher).run(&["60601"]).await;

        assert_eq!(output.vehicles.len(), 1);
        assert_eq!(output.vehicles["V1"].price, 25_000.0);
        assert_eq!(fetcher.calls(), vec![("60601".to_string(), 0), ("60601".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_duplicate_vin_keeps_last_occurrence() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .with_location(
                    "60601",
                    vec![
                        Ok(vec![bmw("V1", 25_000), bmw("V2", 26_000)]),
                        Ok(vec![bmw("V1", 24_500)]),
                    ],
                )
                .with_location("60611", vec![Ok(vec![bmw("V2", 25_900)])]),
        );

        let output = session(&fetcher).run(&["60601", "60611"]).await;

        assert_eq!(output.vehicles.len(), 2);
        assert_eq!(output.vehicles["V1"].price, 24_500.0);
        assert_eq!(output.vehicles["V2"].price, 25_900.0);
        assert_eq!(output.stats.records_seen, 4);
    }

    #[tokio::test]
    async fn test_malformed_record_is_skipped() {
        let broken = json!({"vin": "BAD", "internetPrice": "call us"});
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .with_location("60601", vec![Ok(vec![broken, bmw("V1", 25_000)])]),
        );

        let output = session(&fetcher).run(&["60601"]).await;

        assert_eq!(output.vehicles.len(), 1);
        assert!(output.vehicles.contains_key("V1"));
        assert_eq!(output.stats.records_skipped, 1);
    }

    #[tokio::test]
    async fn test_pagination_stops_after_first_empty_page() {
        let pages = (0..4).map(|i| Ok(vec![bmw(&format!("V{}", i), 20_000)])).collect();
        let fetcher = Arc::new(ScriptedFetcher::default().with_location("60601", pages));

        let output = session(&fetcher).run(&["60601"]).await;

        let indexes: Vec<u32> = fetcher.calls().into_iter().map(|(_, i)| i).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
        assert_eq!(output.stats.fetch_calls, 5);
        assert_eq!(output.stats.pages, 4);
    }

    #[tokio::test]
    async fn test_transport_failure_ends_only_that_location() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .with_location(
                    "60601",
                    vec![
                        Ok(vec![bmw("V1", 25_000)]),
                        Err(FetchError::Status { code: 503 }),
                        Ok(vec![bmw("NEVER", 1)]),
                    ],
                )
                .with_location("60611", vec![Ok(vec![bmw("V2", 26_000)])]),
        );

        let output = session(&fetcher).run(&["60601", "60611"]).await;

        assert_eq!(output.vehicles.len(), 2);
        assert!(!output.vehicles.contains_key("NEVER"));
        assert_eq!(output.stats.failed_locations, vec!["60601".to_string()]);
        assert!(fetcher.calls().contains(&("60611".to_string(), 0)));
    }

    #[tokio::test]
    async fn test_fetch_deadline_is_treated_as_transport_failure() {
        let mut fetcher = ScriptedFetcher::default()
            .with_location("60601", vec![Ok(vec![bmw("V1", 25_000)])]);
        fetcher.delay = Some(Duration::from_millis(200));
        let fetcher = Arc::new(fetcher);

        let output = session(&fetcher)
            .with_options(SessionOptions {
                fetch_timeout: Some(Duration::from_millis(20)),
            })
            .run(&["60601", "60611"])
            .await;

        assert!(output.vehicles.is_empty());
        assert_eq!(
            output.stats.failed_locations,
            vec!["60601".to_string(), "60611".to_string()]
        );
    }

    #[tokio::test]
    async fn test_no_locations_yields_nothing() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let output = session(&fetcher).run::<&str>(&[]).await;
        assert!(output.vehicles.is_empty());
        assert!(fetcher.calls().is_empty());
    }
}
