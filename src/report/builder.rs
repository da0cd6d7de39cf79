use crate::model::Brand;
use crate::report::format::{format_currency, format_signed, format_signed_pct, format_thousands};
use crate::storage::InventoryRow;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Outcome of one brand's crawl, ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub brand: Brand,
    pub timestamp: DateTime<Utc>,
    pub duration_label: String,
    pub total_vehicles: usize,
    pub changed_count: usize,
    pub average_price: f64,
    /// Annotated rows, ascending by price
    pub rows: Vec<InventoryRow>,
}

/// One line of the tabular view shown to readers
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub brand: Brand,
    pub model: String,
    pub price: f64,
    pub price_change: f64,
    pub price_change_pct: f64,
    pub odometer_miles: f64,
    pub drivetrain: String,
    pub url: String,
}

impl ReportLine {
    pub fn price_display(&self) -> String {
        format_currency(self.price)
    }

    pub fn change_display(&self) -> String {
        format_signed(self.price_change)
    }

    pub fn change_pct_display(&self) -> String {
        format_signed_pct(self.price_change_pct)
    }

    pub fn odometer_display(&self) -> String {
        format_thousands(self.odometer_miles, 0)
    }
}

/// Builds reports from upsert results
pub struct ReportBuilder;

impl ReportBuilder {
    /// Builds a report stamped with the current time
    pub fn build(rows: Vec<InventoryRow>, brand: Brand, duration_label: impl Into<String>) -> Report {
        Self::build_at(rows, brand, duration_label, Utc::now())
    }

    /// Builds a report with an explicit timestamp
    ///
    /// The average of an empty row set is 0.
    pub fn build_at(
        mut rows: Vec<InventoryRow>,
        brand: Brand,
        duration_label: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Report {
        rows.sort_by(by_price);

        let total_vehicles = rows.len();
        let changed_count = rows.iter().filter(|r| r.change() != 0.0).count();
        let average_price = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|r| r.price).sum::<f64>() / rows.len() as f64
        };

        Report {
            brand,
            timestamp,
            duration_label: duration_label.into(),
            total_vehicles,
            changed_count,
            average_price,
            rows,
        }
    }
}

fn by_price(a: &InventoryRow, b: &InventoryRow) -> Ordering {
    a.price.total_cmp(&b.price).then_with(|| a.vin.cmp(&b.vin))
}

impl Report {
    /// Human-readable summary block
    pub fn summary(&self) -> String {
        format!(
            "{} Inventory Report Summary:\n\
             - Total Vehicles: {}\n\
             - Vehicles with Price Changes: {}\n\
             - Average Price: ${}\n\
             - Report Duration: {}\n",
            self.brand,
            self.total_vehicles,
            self.changed_count,
            format_thousands(self.average_price, 2),
            self.duration_label
        )
    }

    /// Tabular view of this report, ascending by price
    pub fn table(&self) -> Vec<ReportLine> {
        Self::combined_table(std::slice::from_ref(self))
    }

    /// Merges several reports into one view
    ///
    /// Rows are deduplicated on (vin, brand), keeping the first occurrence,
    /// and sorted ascending by price.
    pub fn combined_table(reports: &[Report]) -> Vec<ReportLine> {
        let mut seen = HashSet::new();
        let mut rows: Vec<&InventoryRow> = reports
            .iter()
            .flat_map(|r| r.rows.iter())
            .filter(|row| seen.insert((row.vin.as_str(), row.brand)))
            .collect();
        rows.sort_by(|a, b| by_price(a, b));

        rows.into_iter()
            .map(|row| ReportLine {
                brand: row.brand,
                model: row.model.clone(),
                price: row.price,
                price_change: row.change(),
                price_change_pct: row.change_pct(),
                odometer_miles: row.odometer_miles,
                drivetrain: row.drivetrain.clone(),
                url: row.detail_url.clone(),
            })
            .collect()
    }
}
