//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the InventoryStore trait.

use crate::model::{Brand, VehicleRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{InventoryStore, StorageError, StorageResult};
use crate::storage::InventoryRow;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, TransactionBehavior};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SELECT_COLUMNS: &str = "SELECT vin, model, price, odometer, drivetrain, url, brand, series, cpo_status, last_updated FROM inventory";

/// SQLite storage backend
///
/// One connection is shared by every brand worker. Each brand also has its own
/// write lock, held from the read of the previous prices until the new rows are
/// committed, so same-brand upserts run one at a time while other brands
/// proceed.
pub struct SqliteInventoryStore {
    conn: Mutex<Connection>,
    brand_locks: HashMap<Brand, Mutex<()>>,
}

impl SqliteInventoryStore {
    /// Opens (or creates) the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        Self::with_connection(conn)
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        initialize_schema(&conn)?;

        let brand_locks = Brand::ALL
            .iter()
            .map(|brand| (*brand, Mutex::new(())))
            .collect();

        Ok(Self {
            conn: Mutex::new(conn),
            brand_locks,
        })
    }

    fn connection(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn lock_brand(&self, brand: Brand) -> StorageResult<MutexGuard<'_, ()>> {
        self.brand_locks
            .get(&brand)
            .ok_or_else(|| StorageError::Database(format!("no write lock for brand {}", brand)))?
            .lock()
            .map_err(|_| StorageError::Poisoned)
    }

    /// Loads the stored price of every VIN for a brand
    fn previous_prices(&self, brand: Brand) -> StorageResult<HashMap<String, f64>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT vin, price FROM inventory WHERE brand = ?1")?;

        let prices = stmt
            .query_map(params![brand.to_db_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(prices)
    }

    /// Writes all rows in one transaction, overwriting every column on conflict
    fn write_rows(&self, rows: &[InventoryRow]) -> StorageResult<()> {
        let mut conn = self.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO inventory (
                    vin, model, price, odometer, drivetrain, url, brand, series, cpo_status, last_updated
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(vin, brand) DO UPDATE SET
                    model = excluded.model,
                    price = excluded.price,
                    odometer = excluded.odometer,
                    drivetrain = excluded.drivetrain,
                    url = excluded.url,
                    series = excluded.series,
                    cpo_status = excluded.cpo_status,
                    last_updated = excluded.last_updated",
            )?;

            for row in rows {
                stmt.execute(params![
                    row.vin,
                    row.model,
                    row.price,
                    row.odometer_miles,
                    row.drivetrain,
                    row.detail_url,
                    row.brand.to_db_string(),
                    row.series,
                    row.certification,
                    row.last_updated.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn query_rows(&self, sql: &str, brand: Option<Brand>) -> StorageResult<Vec<InventoryRow>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(sql)?;

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<StoredRow> {
            Ok(StoredRow {
                vin: row.get(0)?,
                model: row.get(1)?,
                price: row.get(2)?,
                odometer: row.get(3)?,
                drivetrain: row.get(4)?,
                url: row.get(5)?,
                brand: row.get(6)?,
                series: row.get(7)?,
                cpo_status: row.get(8)?,
                last_updated: row.get(9)?,
            })
        };

        let stored = match brand {
            Some(brand) => stmt
                .query_map(params![brand.to_db_string()], map_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt.query_map([], map_row)?.collect::<Result<Vec<_>, _>>()?,
        };

        stored.into_iter().map(StoredRow::into_row).collect()
    }
}

/// Builds the annotated row for a current record
///
/// A VIN with no stored row is reported as unchanged, as is a percentage
/// against a stored price of zero.
fn annotate(record: &VehicleRecord, previous: Option<f64>, now: DateTime<Utc>) -> InventoryRow {
    let (change, change_pct) = match previous {
        Some(prev) => {
            let change = record.price - prev;
            let pct = if prev != 0.0 { change / prev * 100.0 } else { 0.0 };
            (change, pct)
        }
        None => (0.0, 0.0),
    };

    InventoryRow {
        vin: record.vin.clone(),
        model: record.model.clone(),
        price: record.price,
        odometer_miles: record.odometer_miles,
        drivetrain: record.drivetrain.clone(),
        detail_url: record.detail_url.clone(),
        brand: record.brand,
        series: record.extras.series.clone(),
        certification: record.extras.certification.clone(),
        price_change: Some(change),
        price_change_pct: Some(change_pct),
        last_updated: now,
    }
}

/// Raw column values as read from the inventory table
struct StoredRow {
    vin: String,
    model: String,
    price: f64,
    odometer: f64,
    drivetrain: String,
    url: String,
    brand: String,
    series: Option<String>,
    cpo_status: Option<String>,
    last_updated: String,
}

impl StoredRow {
    fn into_row(self) -> StorageResult<InventoryRow> {
        let brand = Brand::from_db_string(&self.brand).ok_or_else(|| {
            StorageError::InvalidRow(format!("unknown brand '{}' for {}", self.brand, self.vin))
        })?;
        let last_updated = DateTime::parse_from_rfc3339(&self.last_updated)
            .map_err(|e| {
                StorageError::InvalidRow(format!("bad timestamp for {}: {}", self.vin, e))
            })?
            .with_timezone(&Utc);

        Ok(InventoryRow {
            vin: self.vin,
            model: self.model,
            price: self.price,
            odometer_miles: self.odometer,
            drivetrain: self.drivetrain,
            detail_url: self.url,
            brand,
            series: self.series,
            certification: self.cpo_status,
            price_change: None,
            price_change_pct: None,
            last_updated,
        })
    }
}

impl InventoryStore for SqliteInventoryStore {
    fn upsert(&self, batch: &[VehicleRecord]) -> StorageResult<Vec<InventoryRow>> {
        let Some(first) = batch.first() else {
            return Ok(Vec::new());
        };
        let brand = first.brand;

        if let Some(other) = batch.iter().find(|r| r.brand != brand) {
            return Err(StorageError::MixedBrandBatch {
                expected: brand,
                found: other.brand,
            });
        }

        let _guard = self.lock_brand(brand)?;

        let previous = self.previous_prices(brand)?;
        let now = Utc::now();
        let rows: Vec<InventoryRow> = batch
            .iter()
            .map(|record| annotate(record, previous.get(&record.vin).copied(), now))
            .collect();

        self.write_rows(&rows)?;

        tracing::debug!(
            "Upserted {} {} rows ({} previously stored)",
            rows.len(),
            brand,
            previous.len()
        );

        Ok(rows)
    }

    fn brand_inventory(&self, brand: Brand) -> StorageResult<Vec<InventoryRow>> {
        self.query_rows(
            &format!("{} WHERE brand = ?1 ORDER BY price ASC, vin ASC", SELECT_COLUMNS),
            Some(brand),
        )
    }

    fn all_inventory(&self) -> StorageResult<Vec<InventoryRow>> {
        self.query_rows(
            &format!("{} ORDER BY brand ASC, price ASC, vin ASC", SELECT_COLUMNS),
            None,
        )
    }

    fn count_by_brand(&self) -> StorageResult<HashMap<Brand, u64>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT brand, COUNT(*) FROM inventory GROUP BY brand")?;

        let mut counts = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (brand_str, count) = row?;
            match Brand::from_db_string(&brand_str) {
                Some(brand) => {
                    counts.insert(brand, count as u64);
                }
                None => tracing::warn!("Ignoring rows for unknown brand '{}'", brand_str),
            }
        }

        Ok(counts)
    }
}
