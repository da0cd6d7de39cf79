//! Vendor-agnostic vehicle model
//!
//! Every vendor payload is normalized into a [`VehicleRecord`] tagged with the
//! [`Brand`] it was crawled for.

mod brand;
mod vehicle;

pub use brand::Brand;
pub use vehicle::{VehicleExtras, VehicleRecord};
