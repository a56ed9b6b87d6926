// ==========================================
// Fleet Import - Pipeline Traits
// ==========================================
// Interfaces only; implementations live in their stage modules
// ==========================================

use crate::domain::import::{
    ExistenceCache, ImportPreview, ImportWarning, ParsedSheet, RawRow, ValidationResult,
};
use crate::domain::records::NormalizedRow;
use crate::domain::types::{CellValue, ImportType, TextCase};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::SheetContext;
use crate::importer::dq_validator::ValidationContext;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;

// ==========================================
// FleetImporter Trait
// ==========================================
// Entry point used by the CLI and by callers embedding the library
// Implementor: FleetImporterImpl
#[async_trait]
pub trait FleetImporter: Send + Sync {
    /// Read a file from disk and build the preview.
    ///
    /// # Returns
    /// - Ok(ImportPreview): one normalized row and one validation result per data row
    /// - Err: only file-level failures (missing file, bad format, empty workbook)
    async fn preview_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        import_type: ImportType,
        cache: &ExistenceCache,
    ) -> ImportResult<ImportPreview>;

    /// Same pipeline over an in-memory upload.
    async fn preview_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        import_type: ImportType,
        cache: &ExistenceCache,
    ) -> ImportResult<ImportPreview>;

    /// Preview several files concurrently.
    ///
    /// A fatal error in one file is reported in its slot and never
    /// affects the other files.
    async fn batch_preview<P: AsRef<Path> + Send + Sync>(
        &self,
        files: Vec<(P, ImportType)>,
        cache: &ExistenceCache,
    ) -> Vec<Result<ImportPreview, String>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// Stage 0: bytes -> canonical headers + raw rows
// Implementors: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// Parse an uploaded file.
    ///
    /// # Returns
    /// - Ok(ParsedSheet): headers already canonical for `import_type`,
    ///   blank rows removed, line numbers from the original sheet
    /// - Err: unsupported format, unreadable or empty workbook
    fn parse(
        &self,
        file_name: &str,
        bytes: &[u8],
        import_type: ImportType,
    ) -> ImportResult<ParsedSheet>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// Stage 1: raw row -> typed record + parse warnings
// Implementor: FieldMapper
pub trait FieldMapper: Send + Sync {
    /// Map one raw row. Never fails: unparseable cells become None and
    /// produce a warning instead.
    fn map_row(
        &self,
        row: &RawRow,
        sheet: &SheetContext,
    ) -> (NormalizedRow, Vec<ImportWarning>);
}

// ==========================================
// DataCleaner Trait
// ==========================================
// Cell-level normalizers used by the mapper
// Implementor: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// Finite number, Brazilian or American notation, currency stripped
    fn normalize_number(&self, value: &CellValue) -> Option<f64>;

    /// Calendar date from an enumerated set of formats or an Excel serial
    fn normalize_date(&self, value: &CellValue) -> Option<NaiveDate>;

    /// Excel serial (days since 1899-12-30), None outside the configured window
    fn excel_serial_to_date(&self, serial: f64) -> Option<NaiveDate>;

    /// None when the value is neither in the true-set nor in the false-set
    fn normalize_boolean(&self, value: &CellValue) -> Option<bool>;

    fn normalize_text(&self, value: &CellValue, case: TextCase) -> Option<String>;

    /// Upper case, whitespace and hyphens removed. No pattern check.
    fn normalize_placa(&self, value: &CellValue) -> Option<String>;

    fn normalize_uf(&self, value: &CellValue) -> Option<String>;

    fn normalize_status(&self, value: &CellValue) -> Option<String>;

    fn normalize_produto(&self, value: &CellValue) -> Option<String>;

    /// Digits only (CPF, RENAVAM, phone)
    fn normalize_digits(&self, value: &CellValue) -> Option<String>;
}

// ==========================================
// RecordValidator Trait
// ==========================================
// Stage 2: advisory rules, one result per row
// Implementor: DqValidator
pub trait RecordValidator: Send + Sync {
    /// Validate every row.
    ///
    /// # Guarantees
    /// - result count == rows.len(), in the same order
    /// - no row is removed, however many critical warnings it carries
    fn validate_all(
        &self,
        rows: &[NormalizedRow],
        import_type: ImportType,
        cache: &ExistenceCache,
        context: &ValidationContext,
    ) -> Vec<ValidationResult>;
}

// ==========================================
// ConflictHandler Trait
// ==========================================
// In-file duplicate keys
// Implementor: ConflictHandler
pub trait ConflictHandler: Send + Sync {
    /// One moderate warning per repeated occurrence; the first
    /// occurrence of a key is not flagged.
    fn detect_duplicates(&self, rows: &[NormalizedRow]) -> Vec<ImportWarning>;
}
