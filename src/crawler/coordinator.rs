//! Crawl coordinator - multi-brand orchestration
//!
//! This module runs one worker per requested brand. Each worker:
//! - Sweeps the configured location codes through its vendor session
//! - Upserts the deduplicated batch into the shared store on a blocking thread
//! - Builds the brand's report from the annotated rows
//!
//! Workers share nothing but the store, whose per-brand locking keeps
//! concurrent batches of different brands independent.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, PageFetcher};
use crate::crawler::session::{CrawlSession, SessionOptions};
use crate::crawler::vendors::build_fetcher;
use crate::model::{Brand, VehicleRecord};
use crate::report::{format_duration, Report, ReportBuilder};
use crate::storage::{open_store, InventoryStore, SqliteInventoryStore};
use crate::transform::VehicleTransformer;
use crate::{ConfigError, InventoryError, Result};
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Runs one brand's crawl and persists the result
///
/// A brand that yields no vehicles is reported empty and nothing is written.
/// Store failures propagate; fetch and transform problems were already
/// absorbed by the session.
pub async fn run_brand<F: PageFetcher>(
    session: CrawlSession<F>,
    store: Arc<dyn InventoryStore>,
    location_codes: &[String],
) -> Result<Report> {
    let start = Instant::now();
    let brand = session.brand();

    tracing::info!(
        "[{}] Starting crawl of {} location(s)",
        brand,
        location_codes.len()
    );
    let output = session.run(location_codes).await;

    if output.vehicles.is_empty() {
        tracing::warn!("[{}] No vehicles found; skipping store update", brand);
        return Ok(ReportBuilder::build(
            Vec::new(),
            brand,
            format_duration(start.elapsed()),
        ));
    }

    let mut batch: Vec<VehicleRecord> = output.vehicles.into_values().collect();
    batch.sort_by(|a, b| a.vin.cmp(&b.vin));
    let batch_len = batch.len();

    let rows = tokio::task::spawn_blocking(move || store.upsert(&batch))
        .await
        .map_err(|e| InventoryError::Task(e.to_string()))??;

    let report = ReportBuilder::build(rows, brand, format_duration(start.elapsed()));
    tracing::info!(
        "[{}] Stored {} vehicles ({} price changes, {} records skipped, {} failed locations) in {}",
        brand,
        batch_len,
        report.changed_count,
        output.stats.records_skipped,
        output.stats.failed_locations.len(),
        report.duration_label
    );

    Ok(report)
}

/// Main coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    store: Arc<SqliteInventoryStore>,
    client: Client,
}

impl Coordinator {
    /// Opens the configured database and builds the shared HTTP client
    pub fn new(config: Config) -> Result<Self> {
        let store = open_store(Path::new(&config.output.database_path))?;
        Self::with_store(config, store)
    }

    /// Creates a coordinator over an already opened store
    pub fn with_store(config: Config, store: SqliteInventoryStore) -> Result<Self> {
        let client = build_http_client()?;
        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
            client,
        })
    }

    pub fn store(&self) -> &Arc<SqliteInventoryStore> {
        &self.store
    }

    /// Crawls the requested brands concurrently
    ///
    /// Reports come back in request order (repeated brands run once). Every
    /// worker is awaited before the first failure, if any, is returned.
    pub async fn run(&self, brands: &[Brand]) -> Result<Vec<Report>> {
        let mut requested: Vec<Brand> = Vec::with_capacity(brands.len());
        for &brand in brands {
            if !requested.contains(&brand) {
                requested.push(brand);
            }
        }
        if requested.is_empty() {
            return Err(InventoryError::NoBrands);
        }

        let mut sessions = Vec::with_capacity(requested.len());
        let options = SessionOptions {
            fetch_timeout: self.config.crawler.fetch_timeout(),
        };
        for &brand in &requested {
            let brand_config = self.config.brand(brand).ok_or_else(|| {
                ConfigError::Validation(format!("Brand {} is not configured", brand))
            })?;
            let fetcher = build_fetcher(self.client.clone(), brand_config, &self.config.crawler);
            let session = CrawlSession::new(fetcher, VehicleTransformer::for_brand(brand))
                .with_options(options.clone());
            sessions.push(session);
        }

        let location_codes = Arc::new(self.config.location_codes());
        tracing::info!(
            "Crawling {} brand(s) across {} location code(s)",
            requested.len(),
            location_codes.len()
        );

        let mut tasks = JoinSet::new();
        for (position, session) in sessions.into_iter().enumerate() {
            let store: Arc<dyn InventoryStore> = self.store.clone();
            let location_codes = Arc::clone(&location_codes);
            tasks.spawn(async move {
                let brand = session.brand();
                let result = run_brand(session, store, &location_codes).await;
                (position, brand, result)
            });
        }

        let mut reports: Vec<Option<Report>> = vec![None; requested.len()];
        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, _, Ok(report))) => reports[position] = Some(report),
                Ok((_, brand, Err(e))) => {
                    tracing::error!("[{}] Crawl failed: {}", brand, e);
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    tracing::error!("Brand worker did not finish: {}", e);
                    first_error.get_or_insert(InventoryError::Task(e.to_string()));
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        Ok(reports.into_iter().flatten().collect())
    }
}

/// Runs a complete crawl for the requested brands
///
/// # Example
///
/// ```no_run
/// use dealer_inventory::config::load_config;
/// use dealer_inventory::crawler::crawl;
/// use dealer_inventory::Brand;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("inventory.toml"))?;
/// let reports = crawl(config, &[Brand::Bmw, Brand::Mercedes]).await?;
/// for report in &reports {
///     println!("{}", report.summary());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, brands: &[Brand]) -> Result<Vec<Report>> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run(brands).await
}
