use crate::model::Brand;
use serde_json::Value;
use std::sync::Arc;

/// Brand-specific attributes persisted in nullable columns
///
/// The crawl pipeline carries these through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleExtras {
    pub series: Option<String>,
    pub certification: Option<String>,
}

/// A single vehicle as seen during one crawl session
///
/// Equality ignores `vendor_raw`; the payload is shared behind an `Arc` so
/// cloning a record never copies it.
#[derive(Debug, Clone)]
pub struct VehicleRecord {
    /// Vendor-issued VIN, the dedup and diff key
    pub vin: String,
    pub model: String,
    pub price: f64,
    pub odometer_miles: f64,
    pub drivetrain: String,
    pub detail_url: String,
    pub brand: Brand,
    pub extras: VehicleExtras,
    /// Original vendor payload, kept for traceability only
    pub vendor_raw: Arc<Value>,
}

impl PartialEq for VehicleRecord {
    fn eq(&self, other: &Self) -> bool {
        self.vin == other.vin
            && self.model == other.model
            && self.price == other.price
            && self.odometer_miles == other.odometer_miles
            && self.drivetrain == other.drivetrain
            && self.detail_url == other.detail_url
            && self.brand == other.brand
            && self.extras == other.extras
    }
}
