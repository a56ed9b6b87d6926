// ==========================================
// Fleet Import - Importer Layer
// ==========================================
// Pipeline: parse -> map -> validate -> in-file conflicts -> preview
// Supports: Excel (.xlsx/.xls), CSV
// ==========================================

pub mod conflict_handler;
pub mod data_cleaner;
pub mod delivery_processor;
pub mod dq_validator;
pub mod error;
pub mod field_lookup;
pub mod field_mapper;
pub mod file_parser;
pub mod fleet_importer_impl;
pub mod header_normalizer;
pub mod importer_trait;
pub mod template;

// Implementations
pub use conflict_handler::ConflictHandler as ConflictHandlerImpl;
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use dq_validator::{DqValidator, ValidationContext};
pub use error::{ImportError, ImportResult};
pub use field_lookup::{FieldLookup, FieldMatch};
pub use field_mapper::{FieldMapper as FieldMapperImpl, SheetContext};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use fleet_importer_impl::FleetImporterImpl;
pub use header_normalizer::{canonical_header, normalize_header};
pub use template::{generate_template, template_file_name};

// Trait seams
pub use importer_trait::{
    ConflictHandler, DataCleaner, FieldMapper, FileParser, FleetImporter, RecordValidator,
};
