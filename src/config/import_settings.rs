// ==========================================
// Fleet Import - Import Settings Snapshot
// ==========================================
// Resolved once per run from an ImportConfigReader; the synchronous
// pipeline stages only ever see this plain struct.
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub date_min_year: i32,
    pub date_max_year: i32,
    pub two_digit_year_pivot: i32,
    pub excel_serial_min: f64,
    pub excel_serial_max: f64,
    pub fuel_total_tolerance: f64,
    pub min_vehicle_year: i32,
    pub allow_vehicle_auto_create: bool,
    pub max_assembler_columns: usize,
    pub max_file_size_bytes: u64,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            date_min_year: 1900,
            date_max_year: 2100,
            two_digit_year_pivot: 50,
            excel_serial_min: 1.0,
            excel_serial_max: 100000.0,
            fuel_total_tolerance: 0.05,
            min_vehicle_year: 1950,
            allow_vehicle_auto_create: false,
            max_assembler_columns: 7,
            max_file_size_bytes: 20 * 1024 * 1024,
        }
    }
}

fn config_error(key: &str, err: Box<dyn std::error::Error + Send + Sync>) -> ImportError {
    ImportError::ConfigReadError {
        key: key.to_string(),
        message: err.to_string(),
    }
}

impl ImportSettings {
    /// Resolve every setting from the reader
    pub async fn load<C: ImportConfigReader + ?Sized>(config: &C) -> ImportResult<Self> {
        let (date_min_year, date_max_year) = config
            .get_date_year_range()
            .await
            .map_err(|e| config_error("date_year_range", e))?;
        let two_digit_year_pivot = config
            .get_two_digit_year_pivot()
            .await
            .map_err(|e| config_error("two_digit_year_pivot", e))?;
        let (excel_serial_min, excel_serial_max) = config
            .get_excel_serial_range()
            .await
            .map_err(|e| config_error("excel_serial_range", e))?;
        let fuel_total_tolerance = config
            .get_fuel_total_tolerance()
            .await
            .map_err(|e| config_error("fuel_total_tolerance", e))?;
        let min_vehicle_year = config
            .get_min_vehicle_year()
            .await
            .map_err(|e| config_error("min_vehicle_year", e))?;
        let allow_vehicle_auto_create = config
            .get_allow_vehicle_auto_create()
            .await
            .map_err(|e| config_error("allow_vehicle_auto_create", e))?;
        let max_assembler_columns = config
            .get_max_assembler_columns()
            .await
            .map_err(|e| config_error("max_assembler_columns", e))?;
        let max_file_size_bytes = config
            .get_max_file_size_bytes()
            .await
            .map_err(|e| config_error("max_file_size_bytes", e))?;

        Ok(Self {
            date_min_year,
            date_max_year,
            two_digit_year_pivot,
            excel_serial_min,
            excel_serial_max,
            fuel_total_tolerance,
            min_vehicle_year,
            allow_vehicle_auto_create,
            max_assembler_columns,
            max_file_size_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_load_matches_default() {
        let settings = ImportSettings::load(&ConfigManager::new()).await.unwrap();
        assert_eq!(settings, ImportSettings::default());
    }

    #[tokio::test]
    async fn test_load_overrides() {
        let mut values = HashMap::new();
        values.insert("allow_vehicle_auto_create".to_string(), "sim".to_string());
        values.insert("max_assembler_columns".to_string(), "5".to_string());

        let settings = ImportSettings::load(&ConfigManager::from_map(values))
            .await
            .unwrap();
        assert!(settings.allow_vehicle_auto_create);
        assert_eq!(settings.max_assembler_columns, 5);
    }
}
