use crate::model::Brand;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(rename = "brand", default)]
    pub brands: Vec<BrandConfig>,
    /// Region name -> location codes searched in that region
    #[serde(default)]
    pub locations: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// Flattens the configured regions into the ordered list of location codes to crawl
    ///
    /// Regions are visited in name order and codes in listed order. Repeated
    /// codes keep their first position, and `max-locations` truncates the list.
    pub fn location_codes(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut codes: Vec<String> = self
            .locations
            .values()
            .flatten()
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty() && seen.insert(code.clone()))
            .collect();

        if let Some(max) = self.crawler.max_locations {
            codes.truncate(max);
        }
        codes
    }

    /// Looks up the configuration block for a brand
    pub fn brand(&self, brand: Brand) -> Option<&BrandConfig> {
        self.brands.iter().find(|b| b.name == brand)
    }
}

/// Crawler pacing and limits
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Pause between consecutive pages of one location (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay")]
    pub page_delay_ms: u64,

    /// Pause before the first page of each new location (milliseconds)
    #[serde(rename = "location-delay-ms", default = "default_location_delay")]
    pub location_delay_ms: u64,

    /// Deadline for a single page fetch; 0 disables it
    #[serde(rename = "fetch-timeout-secs", default)]
    pub fetch_timeout_secs: u64,

    /// Only crawl the first N location codes
    #[serde(rename = "max-locations", default)]
    pub max_locations: Option<usize>,
}

impl CrawlerConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn location_delay(&self) -> Duration {
        Duration::from_millis(self.location_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_secs > 0).then(|| Duration::from_secs(self.fetch_timeout_secs))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: default_page_delay(),
            location_delay_ms: default_location_delay(),
            fetch_timeout_secs: 0,
            max_locations: None,
        }
    }
}

fn default_page_delay() -> u64 {
    1000
}

fn default_location_delay() -> u64 {
    2000
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown report file
    #[serde(rename = "report-path")]
    pub report_path: String,
}

/// Report distribution settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub recipients: Vec<String>,
}

/// Per-brand vendor settings
#[derive(Debug, Clone, Deserialize)]
pub struct BrandConfig {
    pub name: Brand,

    /// Bearer token for vendors that require one
    #[serde(rename = "auth-token", default)]
    pub auth_token: Option<String>,

    /// Model series filter (BMW)
    #[serde(default)]
    pub series: Option<String>,

    /// Search radius around each location code (miles)
    #[serde(default = "default_radius")]
    pub radius: u32,

    /// Overrides the vendor's inventory endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_radius() -> u32 {
    50
}
