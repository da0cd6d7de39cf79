//! Storage module for persisting inventory history
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - The (vin, brand) keyed inventory table with full-row upserts
//! - Price deltas computed against the previously stored row

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteInventoryStore;
pub use traits::{InventoryStore, StorageError, StorageResult};

use crate::model::Brand;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Initializes or opens an inventory database
pub fn open_store(path: &Path) -> StorageResult<SqliteInventoryStore> {
    SqliteInventoryStore::new(path)
}

/// A persisted inventory row, optionally annotated with its price delta
///
/// Rows returned by [`InventoryStore::upsert`] always carry `Some` deltas; rows
/// read back from storage carry `None` because deltas are never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub vin: String,
    pub model: String,
    pub price: f64,
    pub odometer_miles: f64,
    pub drivetrain: String,
    pub detail_url: String,
    pub brand: Brand,
    pub series: Option<String>,
    pub certification: Option<String>,
    pub price_change: Option<f64>,
    pub price_change_pct: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

impl InventoryRow {
    /// Price delta, treating an unannotated row as unchanged
    pub fn change(&self) -> f64 {
        self.price_change.unwrap_or(0.0)
    }

    /// Percentage delta, treating an unannotated row as unchanged
    pub fn change_pct(&self) -> f64 {
        self.price_change_pct.unwrap_or(0.0)
    }
}
