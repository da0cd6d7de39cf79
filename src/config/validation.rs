use crate::config::types::{BrandConfig, Config, OutputConfig, ReportConfig};
use crate::model::Brand;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_output_config(&config.output)?;
    validate_report_config(&config.report)?;
    validate_brands(&config.brands)?;
    validate_locations(config)?;
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.report_path.is_empty() {
        return Err(ConfigError::Validation(
            "report_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_report_config(config: &ReportConfig) -> Result<(), ConfigError> {
    for recipient in &config.recipients {
        validate_email(recipient)?;
    }
    Ok(())
}

fn validate_brands(brands: &[BrandConfig]) -> Result<(), ConfigError> {
    if brands.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[brand]] must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in brands {
        if !seen.insert(entry.name) {
            return Err(ConfigError::Validation(format!(
                "brand '{}' is configured more than once",
                entry.name
            )));
        }

        if entry.radius < 1 {
            return Err(ConfigError::Validation(format!(
                "radius for brand '{}' must be >= 1",
                entry.name
            )));
        }

        if entry.name == Brand::Bmw
            && entry.auth_token.as_deref().map_or(true, |t| t.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "brand 'BMW' requires a non-empty auth-token".to_string(),
            ));
        }

        if let Some(endpoint) = &entry.endpoint {
            let url = Url::parse(endpoint).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid endpoint '{}': {}", endpoint, e))
            })?;
            if url.scheme() != "https" && url.scheme() != "http" {
                return Err(ConfigError::InvalidUrl(format!(
                    "Endpoint '{}' must use http or https",
                    endpoint
                )));
            }
        }
    }

    Ok(())
}

fn validate_locations(config: &Config) -> Result<(), ConfigError> {
    for (region, codes) in &config.locations {
        if let Some(bad) = codes
            .iter()
            .find(|c| !c.trim().chars().all(|ch| ch.is_ascii_alphanumeric()))
        {
            return Err(ConfigError::Validation(format!(
                "location code '{}' in region '{}' must be alphanumeric",
                bad, region
            )));
        }
    }

    if config.crawler.max_locations == Some(0) {
        return Err(ConfigError::Validation(
            "max_locations must be >= 1 when set".to_string(),
        ));
    }

    if config.location_codes().is_empty() {
        return Err(ConfigError::Validation(
            "at least one location code must be configured".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "recipient email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
