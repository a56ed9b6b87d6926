// ==========================================
// Fleet Import - Core Library
// ==========================================
// Spreadsheet import pipeline for the fleet back office:
// parse -> normalize -> validate -> preview
// Nothing here writes to a data store; callers persist the preview.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - records, rows, warnings, previews
pub mod domain;

// Import layer - parsing, mapping, validation
pub mod importer;

// Config layer - thresholds and limits
pub mod config;

// Logging
pub mod logging;

// ==========================================
// Re-exports
// ==========================================

pub use domain::{
    CellValue, ExistenceCache, ImportPreview, ImportType, ImportWarning, NormalizedRecord,
    NormalizedRow, PredictedAction, PreviewSummary, Severity, ValidationResult,
};

pub use importer::{
    generate_template, template_file_name, FleetImporter, FleetImporterImpl, ImportError,
    ImportResult,
};

pub use config::{ConfigManager, ImportConfigReader, ImportSettings};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Fleet Import";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
