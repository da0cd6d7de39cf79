use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Vehicle brands with a supported inventory vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    Bmw,
    Mercedes,
}

impl Brand {
    /// All supported brands, in their default crawl order
    pub const ALL: [Brand; 2] = [Brand::Bmw, Brand::Mercedes];

    /// Value stored in the `brand` column
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Bmw => "BMW",
            Self::Mercedes => "Mercedes",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "BMW" => Some(Self::Bmw),
            "Mercedes" => Some(Self::Mercedes),
            _ => None,
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

impl FromStr for Brand {
    type Err = String;

    /// Parses a brand name as typed on the command line or in config (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bmw" => Ok(Self::Bmw),
            "mercedes" | "mercedes-benz" => Ok(Self::Mercedes),
            other => Err(format!("Unsupported brand: {}", other)),
        }
    }
}
