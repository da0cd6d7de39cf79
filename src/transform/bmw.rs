//! BMW dealer-program inventory mapping

use crate::model::{Brand, VehicleExtras, VehicleRecord};
use crate::transform::fields::{optional_str, required_number, required_str};
use crate::transform::TransformResult;
use serde_json::Value;
use std::sync::Arc;

pub fn transform(raw: Value) -> TransformResult<VehicleRecord> {
    let vin = required_str(&raw, "vin")?;
    let price = required_number(&raw, "internetPrice")?;
    let odometer_miles = required_number(&raw, "odometer")?;
    let detail_url = required_str(&raw, "vdpUrl")?;
    let model = required_str(&raw, "model")?;

    let drivetrain = optional_str(&raw, "drivetrain").unwrap_or_else(|| "Unknown".to_string());
    let extras = VehicleExtras {
        series: optional_str(&raw, "series"),
        certification: optional_str(&raw, "cpoStatus"),
    };

    Ok(VehicleRecord {
        vin,
        model,
        price,
        odometer_miles,
        drivetrain,
        detail_url,
        brand: Brand::Bmw,
        extras,
        vendor_raw: Arc::new(raw),
    })
}
