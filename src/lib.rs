//! Dealer inventory tracker
//!
//! This crate polls dealer-inventory APIs for several vehicle brands, normalizes
//! the vendor payloads into a common vehicle record, keeps a VIN-keyed history in
//! SQLite, and reports price changes between crawls.

pub mod config;
pub mod crawler;
pub mod model;
pub mod report;
pub mod storage;
pub mod transform;

use thiserror::Error;

/// Main error type for inventory operations
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Brand worker failed: {0}")]
    Task(String),

    #[error("No brands requested")]
    NoBrands,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Brand, VehicleRecord};
pub use report::{Report, ReportBuilder};
pub use storage::{InventoryRow, InventoryStore, SqliteInventoryStore};
pub use transform::VehicleTransformer;
