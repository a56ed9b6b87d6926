// ==========================================
// Fleet Import - Config Manager
// ==========================================
// Storage: flat JSON object of string values (key → value)
// Overrides: FLEET_IMPORT_<KEY> environment variables
// Missing keys and malformed values fall back to defaults
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "FLEET_IMPORT_";

// ==========================================
// ConfigManager
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
    use_env: bool,
}

impl ConfigManager {
    /// Defaults only, environment ignored
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an in-memory key/value map (environment ignored)
    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self {
            values,
            use_env: false,
        }
    }

    /// Load a flat JSON config file; a missing file yields defaults
    ///
    /// Non-string JSON scalars are stored in their textual form, so
    /// `{"fuel_total_tolerance": 0.1}` and `{"fuel_total_tolerance": "0.1"}`
    /// are equivalent.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self {
                values: HashMap::new(),
                use_env: true,
            });
        }

        let raw = std::fs::read_to_string(path)?;
        let parsed: HashMap<String, Value> = serde_json::from_str(&raw)?;
        let values = parsed
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    Value::Null => return None,
                    other => other.to_string(),
                };
                Some((key, text))
            })
            .collect();

        tracing::info!(path = %path.display(), "config loaded");
        Ok(Self {
            values,
            use_env: true,
        })
    }

    /// Load from the default location (`<config_dir>/fleet-import/config.json`)
    pub fn load_default() -> Result<Self, Box<dyn Error + Send + Sync>> {
        match default_config_path() {
            Some(path) => Self::from_file(path),
            None => Ok(Self {
                values: HashMap::new(),
                use_env: true,
            }),
        }
    }

    /// Read one value: environment override first, then stored map
    fn get_config_value(&self, key: &str) -> Option<String> {
        if self.use_env {
            let env_key = format!("{}{}", ENV_PREFIX, key.to_uppercase());
            if let Ok(value) = std::env::var(&env_key) {
                return Some(value);
            }
        }
        self.values.get(key).cloned()
    }

    pub fn get_global_config_value(&self, key: &str) -> Option<String> {
        self.get_config_value(key)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_config_value(key)
            .unwrap_or_else(|| default.to_string())
    }

    fn parse_or_default<T>(&self, key: &str, default: T) -> T
    where
        T: std::str::FromStr + Copy + std::fmt::Display,
    {
        let value = self.get_config_or_default(key, &default.to_string());
        match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %value,
                    "malformed config value, using default"
                );
                default
            }
        }
    }

    /// Snapshot of stored values as JSON (environment overrides excluded)
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        Ok(serde_json::to_string(&self.values)?)
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fleet-import").join("config.json"))
}

// ==========================================
// ImportConfigReader implementation
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_date_year_range(&self) -> Result<(i32, i32), Box<dyn Error + Send + Sync>> {
        let min = self.parse_or_default(config_keys::DATE_MIN_YEAR, 1900);
        let max = self.parse_or_default(config_keys::DATE_MAX_YEAR, 2100);
        if min > max {
            tracing::warn!(min, max, "inverted date year range, using defaults");
            return Ok((1900, 2100));
        }
        Ok((min, max))
    }

    async fn get_two_digit_year_pivot(&self) -> Result<i32, Box<dyn Error + Send + Sync>> {
        let pivot: i32 = self.parse_or_default(config_keys::TWO_DIGIT_YEAR_PIVOT, 50);
        Ok(pivot.clamp(0, 99))
    }

    async fn get_excel_serial_range(&self) -> Result<(f64, f64), Box<dyn Error + Send + Sync>> {
        let min = self.parse_or_default(config_keys::EXCEL_SERIAL_MIN, 1.0);
        let max = self.parse_or_default(config_keys::EXCEL_SERIAL_MAX, 100000.0);
        if min >= max {
            tracing::warn!(min, max, "inverted excel serial range, using defaults");
            return Ok((1.0, 100000.0));
        }
        Ok((min, max))
    }

    async fn get_fuel_total_tolerance(&self) -> Result<f64, Box<dyn Error + Send + Sync>> {
        let tolerance: f64 = self.parse_or_default(config_keys::FUEL_TOTAL_TOLERANCE, 0.05);
        Ok(tolerance.abs())
    }

    async fn get_min_vehicle_year(&self) -> Result<i32, Box<dyn Error + Send + Sync>> {
        Ok(self.parse_or_default(config_keys::MIN_VEHICLE_YEAR, 1950))
    }

    async fn get_allow_vehicle_auto_create(&self) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let value = self.get_config_or_default(config_keys::ALLOW_VEHICLE_AUTO_CREATE, "false");
        Ok(matches!(
            value.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "sim"
        ))
    }

    async fn get_max_assembler_columns(&self) -> Result<usize, Box<dyn Error + Send + Sync>> {
        Ok(self.parse_or_default(config_keys::MAX_ASSEMBLER_COLUMNS, 7usize))
    }

    async fn get_max_file_size_bytes(&self) -> Result<u64, Box<dyn Error + Send + Sync>> {
        Ok(self.parse_or_default(config_keys::MAX_FILE_SIZE_BYTES, 20 * 1024 * 1024u64))
    }
}

// ==========================================
// Config key constants
// ==========================================
pub mod config_keys {
    // Date parsing
    pub const DATE_MIN_YEAR: &str = "date_min_year";
    pub const DATE_MAX_YEAR: &str = "date_max_year";
    pub const TWO_DIGIT_YEAR_PIVOT: &str = "two_digit_year_pivot";
    pub const EXCEL_SERIAL_MIN: &str = "excel_serial_min";
    pub const EXCEL_SERIAL_MAX: &str = "excel_serial_max";

    // Validation
    pub const FUEL_TOTAL_TOLERANCE: &str = "fuel_total_tolerance";
    pub const MIN_VEHICLE_YEAR: &str = "min_vehicle_year";
    pub const ALLOW_VEHICLE_AUTO_CREATE: &str = "allow_vehicle_auto_create";

    // Structure
    pub const MAX_ASSEMBLER_COLUMNS: &str = "max_assembler_columns";
    pub const MAX_FILE_SIZE_BYTES: &str = "max_file_size_bytes";
}
