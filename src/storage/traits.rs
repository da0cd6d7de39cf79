//! Storage traits and error types

use crate::model::{Brand, VehicleRecord};
use crate::storage::InventoryRow;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Batch mixes brands: expected {expected}, found {found}")]
    MixedBrandBatch { expected: Brand, found: Brand },

    #[error("Invalid stored row: {0}")]
    InvalidRow(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent (vin, brand) keyed inventory table
///
/// Implementations must serialize the read-then-write of [`upsert`] per brand
/// so two concurrent upserts for the same brand never lose an update.
///
/// [`upsert`]: InventoryStore::upsert
pub trait InventoryStore: Send + Sync {
    /// Writes the current batch and returns it annotated with price deltas
    ///
    /// Each record is diffed against the row currently stored for its VIN
    /// under the batch's brand, then every row is overwritten in full. An
    /// empty batch is a no-op that returns an empty result.
    fn upsert(&self, batch: &[VehicleRecord]) -> StorageResult<Vec<InventoryRow>>;

    /// Gets every stored row for a brand
    fn brand_inventory(&self, brand: Brand) -> StorageResult<Vec<InventoryRow>>;

    /// Gets every stored row across all brands
    fn all_inventory(&self) -> StorageResult<Vec<InventoryRow>>;

    /// Counts stored rows per brand
    fn count_by_brand(&self) -> StorageResult<HashMap<Brand, u64>>;
}
