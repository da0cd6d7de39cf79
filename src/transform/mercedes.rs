//! Mercedes-Benz USA used-vehicle search mapping

use crate::model::{Brand, VehicleExtras, VehicleRecord};
use crate::transform::fields::{coerce_number, optional_str, required_number, required_str};
use crate::transform::{TransformError, TransformResult};
use serde_json::Value;
use std::sync::Arc;

/// Name of the property entry carrying the drivetrain description
const DRIVETRAIN_PROPERTY: &str = "AUTOMATIC_TRANSMISSION";

pub fn transform(raw: Value) -> TransformResult<VehicleRecord> {
    let vin = required_str(&raw, "vin")?;
    let price = required_number(&raw, "dsrp")?;
    let odometer_miles = match raw.pointer("/usedVehicleAttributes/mileage") {
        Some(Value::Null) | None => {
            return Err(TransformError::MalformedRecord {
                field: "usedVehicleAttributes.mileage",
                reason: "is missing".to_string(),
            })
        }
        Some(mileage) => coerce_number(mileage, "usedVehicleAttributes.mileage")?,
    };
    let detail_url = required_str(&raw, "eLink")?;
    let model = required_str(&raw, "modelName")?;

    let drivetrain = find_property(&raw, DRIVETRAIN_PROPERTY).unwrap_or_else(|| "Unknown".to_string());
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
        brand: Brand::Mercedes,
        extras,
        vendor_raw: Arc::new(raw),
    })
}

/// Finds the value of the first `properties[]` entry with the given name
fn find_property(raw: &Value, name: &str) -> Option<String> {
    raw.get("properties")?
        .as_array()?
        .iter()
        .find(|prop| prop.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|prop| optional_str(prop, "value"))
}
