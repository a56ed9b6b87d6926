// ==========================================
// ConfigManager integration tests
// ==========================================
// Config file loading, environment overrides, fallbacks
// ==========================================

mod test_helpers;

use fleet_import::config::{config_keys, ConfigManager, ImportConfigReader, ImportSettings};
use test_helpers::write_temp_file;

#[tokio::test]
async fn test_missing_file_yields_defaults() {
    let config = ConfigManager::from_file("/nonexistent/fleet-import/config.json")
        .expect("Missing file should not be an error");

    let settings = ImportSettings::load(&config).await.expect("Failed to load settings");
    let defaults = ImportSettings::default();
    assert_eq!(settings.date_min_year, defaults.date_min_year);
    assert_eq!(settings.date_max_year, defaults.date_max_year);
    assert_eq!(settings.fuel_total_tolerance, defaults.fuel_total_tolerance);
    assert_eq!(settings.min_vehicle_year, defaults.min_vehicle_year);
    assert_eq!(settings.max_assembler_columns, defaults.max_assembler_columns);
    assert!(!settings.allow_vehicle_auto_create);
}

#[tokio::test]
async fn test_values_read_from_file() {
    let json = r#"{
        "fuel_total_tolerance": 0.5,
        "min_vehicle_year": "1990",
        "allow_vehicle_auto_create": "sim",
        "date_min_year": 2000,
        "date_max_year": 2030
    }"#;
    let file = write_temp_file(".json", json.as_bytes()).expect("Failed to write config");

    let config = ConfigManager::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.get_fuel_total_tolerance().await.unwrap(), 0.5);
    assert_eq!(config.get_min_vehicle_year().await.unwrap(), 1990);
    assert!(config.get_allow_vehicle_auto_create().await.unwrap());
    assert_eq!(config.get_date_year_range().await.unwrap(), (2000, 2030));

    // untouched keys keep their defaults
    assert_eq!(config.get_max_assembler_columns().await.unwrap(), 7);
}

#[tokio::test]
async fn test_malformed_file_is_an_error() {
    let file = write_temp_file(".json", b"{ not json").expect("Failed to write config");
    assert!(ConfigManager::from_file(file.path()).is_err());
}

#[tokio::test]
async fn test_malformed_value_uses_default() {
    let file = write_temp_file(".json", br#"{"excel_serial_max": "lots"}"#)
        .expect("Failed to write config");

    let config = ConfigManager::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.get_excel_serial_range().await.unwrap(), (1.0, 100000.0));
}

#[tokio::test]
async fn test_environment_overrides_file() {
    // only this test touches this key
    std::env::set_var("FLEET_IMPORT_MAX_FILE_SIZE_BYTES", "1024");

    let file = write_temp_file(".json", br#"{"max_file_size_bytes": "4096"}"#)
        .expect("Failed to write config");
    let config = ConfigManager::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.get_max_file_size_bytes().await.unwrap(), 1024);

    // in-memory configs ignore the environment
    let detached = ConfigManager::new();
    assert_eq!(
        detached.get_max_file_size_bytes().await.unwrap(),
        20 * 1024 * 1024
    );

    std::env::remove_var("FLEET_IMPORT_MAX_FILE_SIZE_BYTES");
}

#[tokio::test]
async fn test_snapshot_contains_stored_values() {
    let file = write_temp_file(".json", br#"{"two_digit_year_pivot": 30}"#)
        .expect("Failed to write config");
    let config = ConfigManager::from_file(file.path()).expect("Failed to load config");

    assert_eq!(
        config.get_global_config_value(config_keys::TWO_DIGIT_YEAR_PIVOT).as_deref(),
        Some("30")
    );
    let snapshot = config.get_config_snapshot().expect("Failed to snapshot");
    assert!(snapshot.contains("two_digit_year_pivot"));
}
