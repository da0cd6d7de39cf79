//! Vendor payload transformation
//!
//! Each supported vendor has one [`VehicleTransformer`] variant that owns its
//! field mapping. A transformer is chosen once per crawl session from the brand
//! and turns raw JSON records into [`VehicleRecord`]s without any I/O.

mod bmw;
mod fields;
mod mercedes;

use crate::model::{Brand, VehicleRecord};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while transforming a single raw record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("Malformed record: field '{field}' {reason}")]
    MalformedRecord { field: &'static str, reason: String },
}

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;

/// Closed set of vendor-specific field mappings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleTransformer {
    Bmw,
    Mercedes,
}

impl VehicleTransformer {
    /// Selects the transformer for a brand's vendor
    pub fn for_brand(brand: Brand) -> Self {
        match brand {
            Brand::Bmw => Self::Bmw,
            Brand::Mercedes => Self::Mercedes,
        }
    }

    /// The brand every record produced by this transformer is tagged with
    pub fn brand(&self) -> Brand {
        match self {
            Self::Bmw => Brand::Bmw,
            Self::Mercedes => Brand::Mercedes,
        }
    }

    /// Transforms one raw vendor record
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MalformedRecord`] when the VIN, price, mileage or
    /// detail URL is missing or cannot be coerced to its target type. Callers
    /// skip the record and carry on with the rest of the page.
    pub fn transform(&self, raw: Value) -> TransformResult<VehicleRecord> {
        match self {
            Self::Bmw => bmw::transform(raw),
            Self::Mercedes => mercedes::transform(raw),
        }
    }
}
