// ==========================================
// Fleet Import - Config Layer
// ==========================================
// Thresholds and switches for parsing and validation
// Storage: JSON file + environment overrides
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod import_settings;

pub use config_manager::{config_keys, default_config_path, ConfigManager};
pub use import_config_trait::ImportConfigReader;
pub use import_settings::ImportSettings;
