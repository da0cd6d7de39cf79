//! Markdown rendering of a run's reports
//!
//! One document covers every brand crawled in a run: a per-brand summary
//! table followed by a single inventory table sorted by price.

use crate::report::format::{format_duration, format_thousands};
use crate::report::{OutputResult, Report};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Writes the combined markdown report for a run
///
/// # Arguments
///
/// * `reports` - One report per brand crawled
/// * `duration` - Total runtime of the run
/// * `recipients` - Addresses the report is meant for
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_report(
    reports: &[Report],
    duration: Duration,
    recipients: &[String],
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_report(reports, duration, recipients);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote report for {} brand(s) to {}", reports.len(), output_path.display());
    Ok(())
}

/// Subject line naming every brand in the run, sorted
pub fn report_subject(reports: &[Report]) -> String {
    let mut brands: Vec<String> = reports.iter().map(|r| r.brand.to_string()).collect();
    brands.sort();
    brands.dedup();
    format!("Vehicle Inventory Report - {}", brands.join(", "))
}

/// Formats the combined markdown report
pub fn format_markdown_report(reports: &[Report], duration: Duration, recipients: &[String]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", report_subject(reports)));

    md.push_str("## Run Information\n\n");
    if let Some(generated) = reports.iter().map(|r| r.timestamp).max() {
        md.push_str(&format!(
            "- **Generated**: {}\n",
            generated.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    md.push_str(&format!("- **Runtime**: {}\n", format_duration(duration)));
    if !recipients.is_empty() {
        md.push_str(&format!("- **Recipients**: {}\n", recipients.join(", ")));
    }
    md.push('\n');

    md.push_str("## Summary\n\n");
    md.push_str("| Brand | Vehicles | Price Changes | Average Price | Duration |\n");
    md.push_str("|-------|----------|---------------|---------------|----------|\n");
    for report in reports {
        md.push_str(&format!(
            "| {} | {} | {} | ${} | {} |\n",
            report.brand,
            report.total_vehicles,
            report.changed_count,
            format_thousands(report.average_price, 2),
            escape_cell(&report.duration_label)
        ));
    }
    md.push('\n');

    let lines = Report::combined_table(reports);
    md.push_str("## Inventory\n\n");
    if lines.is_empty() {
        md.push_str("No vehicles found.\n");
        return md;
    }

    md.push_str("| Brand | Model | Price | Change | Change % | Mileage | Drivetrain | Link |\n");
    md.push_str("|-------|-------|-------|--------|----------|---------|------------|------|\n");
    for line in &lines {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | [View]({}) |\n",
            line.brand,
            escape_cell(&line.model),
            line.price_display(),
            line.change_display(),
            line.change_pct_display(),
            line.odometer_display(),
            escape_cell(&line.drivetrain),
            line.url.replace(' ', "%20").replace(')', "%29")
        ));
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
