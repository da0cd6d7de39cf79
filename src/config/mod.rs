//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use dealer_inventory::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("inventory.toml")).unwrap();
//! println!("Crawling {} location codes", config.location_codes().len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrandConfig, Config, CrawlerConfig, OutputConfig, ReportConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
