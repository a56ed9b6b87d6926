// ==========================================
// Fleet Import - Domain Layer
// ==========================================
// Import selectors, typed records and per-run artefacts
// No I/O, no parsing logic
// ==========================================

pub mod import;
pub mod records;
pub mod types;

pub use import::{
    ExistenceCache, ImportPreview, ImportSummary, ImportWarning, ParsedSheet, PredictedAction,
    PreviewSummary, RawRow, ValidationResult,
};
pub use records::{
    AssemblerRecord, DeliveryRecord, DriverRecord, FuelingRecord, MaintenanceRecord,
    NormalizedRecord, NormalizedRow, VehicleRecord,
};
pub use types::{CellValue, ImportType, Severity, TextCase};
