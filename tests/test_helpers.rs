// ==========================================
// Test helpers
// ==========================================
// Fixture files on disk and pre-filled existence caches
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use fleet_import::{ConfigManager, ExistenceCache, FleetImporterImpl};
use std::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

/// Fixed "today" shared by the integration tests
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 10).unwrap()
}

/// Importer with default settings and a pinned reference date
pub fn create_test_importer() -> FleetImporterImpl<ConfigManager> {
    FleetImporterImpl::new(ConfigManager::new()).with_reference_date(reference_date())
}

/// Write `content` to a temporary file with the given suffix (e.g. ".csv")
///
/// The returned handle must stay alive while the file is used.
pub fn write_temp_file(suffix: &str, content: &[u8]) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = tempfile::Builder::new()
        .prefix("fleet_import_")
        .suffix(suffix)
        .tempfile()?;
    file.write_all(content)?;
    file.flush()?;
    Ok(file)
}

pub fn write_temp_csv(content: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    write_temp_file(".csv", content.as_bytes())
}

/// Three known vehicles (one Volvo, two Scania), two drivers, one assembler
pub fn fleet_cache() -> ExistenceCache {
    ExistenceCache::new()
        .with_vehicle_of("ABC1234", "veh-1", "Volvo")
        .with_vehicle_of("BRA2E19", "veh-2", "Scania")
        .with_vehicle_of("XYZ9876", "veh-3", "Scania")
        .with_driver("João da Silva", "drv-1")
        .with_driver("Maria Souza", "drv-2")
        .with_assembler("Carlos", "asm-1")
}
