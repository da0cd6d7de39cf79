//! Database schema definitions

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per (vin, brand); rows are overwritten on every sighting
CREATE TABLE IF NOT EXISTS inventory (
    vin TEXT NOT NULL,
    model TEXT NOT NULL,
    price REAL NOT NULL,
    odometer REAL NOT NULL,
    drivetrain TEXT NOT NULL,
    url TEXT NOT NULL,
    brand TEXT NOT NULL,
    series TEXT,
    cpo_status TEXT,
    last_updated TEXT NOT NULL,
    PRIMARY KEY (vin, brand)
);

CREATE INDEX IF NOT EXISTS idx_inventory_brand ON inventory(brand);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
