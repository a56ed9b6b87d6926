// ==========================================
// Fleet Import - Preview Orchestration
// ==========================================
// Flow: read -> parse -> map -> validate -> in-file conflicts -> preview
// The file read is the only async step; everything after it is a
// synchronous pass over independent rows.
// ==========================================

use crate::config::{ImportConfigReader, ImportSettings};
use crate::domain::import::{
    ExistenceCache, ImportPreview, ImportWarning, PredictedAction, PreviewSummary,
    ValidationResult,
};
use crate::domain::records::NormalizedRow;
use crate::domain::types::ImportType;
use crate::importer::conflict_handler::ConflictHandler as DefaultConflictHandler;
use crate::importer::dq_validator::{DqValidator, ValidationContext};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{FieldMapper as DefaultFieldMapper, SheetContext};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{
    ConflictHandler, FieldMapper, FileParser, FleetImporter, RecordValidator,
};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use futures::future::join_all;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

// ==========================================
// FleetImporterImpl
// ==========================================
pub struct FleetImporterImpl<C>
where
    C: ImportConfigReader,
{
    // settings source, read once per run
    config: C,

    validator: Box<dyn RecordValidator>,
    conflict_handler: Box<dyn ConflictHandler>,

    // fixed "today" for expiry checks; None = local date at run time
    reference_date: Option<NaiveDate>,
}

impl<C> FleetImporterImpl<C>
where
    C: ImportConfigReader,
{
    /// Importer with the default validator and conflict handler
    pub fn new(config: C) -> Self {
        Self::with_components(
            config,
            Box::new(DqValidator::new()),
            Box::new(DefaultConflictHandler::new()),
        )
    }

    pub fn with_components(
        config: C,
        validator: Box<dyn RecordValidator>,
        conflict_handler: Box<dyn ConflictHandler>,
    ) -> Self {
        Self {
            config,
            validator,
            conflict_handler,
            reference_date: None,
        }
    }

    /// Pin the date used for CNH expiry and vehicle year checks.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    async fn load_settings(&self) -> ImportResult<ImportSettings> {
        let settings = ImportSettings::load(&self.config).await?;
        debug!(?settings, "Import settings resolved");
        Ok(settings)
    }

    /// Synchronous pipeline over bytes already in memory.
    #[instrument(skip(self, settings, bytes, cache), fields(run_id))]
    fn build_preview(
        &self,
        settings: &ImportSettings,
        file_name: &str,
        bytes: &[u8],
        import_type: ImportType,
        cache: &ExistenceCache,
    ) -> ImportResult<ImportPreview> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        info!(file = file_name, import_type = %import_type, "Preview started");

        // === Step 1: parse ===
        debug!("Step 1: parse file");
        let parser = UniversalFileParser::new(settings);
        let sheet = parser.parse(file_name, bytes, import_type).map_err(|e| {
            error!(error = %e, "File could not be parsed");
            e
        })?;
        info!(
            rows = sheet.rows.len(),
            skipped_blank_rows = sheet.skipped_blank_rows,
            "File parsed"
        );

        // === Step 2: map rows ===
        debug!("Step 2: map rows");
        let context = SheetContext::from_sheet(&sheet, import_type, settings.max_assembler_columns);
        if let Some(column) = &context.aglutinated_column {
            info!(column = %column, "PV and NF share the first column; splitting per row");
        }
        let mapper = DefaultFieldMapper::new(settings);
        let (rows, mapper_warnings): (Vec<NormalizedRow>, Vec<Vec<ImportWarning>>) = sheet
            .rows
            .iter()
            .map(|raw| mapper.map_row(raw, &context))
            .unzip();
        debug!(
            parse_warnings = mapper_warnings.iter().map(Vec::len).sum::<usize>(),
            "Rows mapped"
        );

        // === Step 3: validate ===
        debug!("Step 3: validate rows");
        let reference_date = self
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());
        let validation_context = ValidationContext::from_settings(settings, reference_date);
        let rule_results = self
            .validator
            .validate_all(&rows, import_type, cache, &validation_context);
        if rule_results.len() != rows.len() {
            return Err(ImportError::InternalError(format!(
                "validator returned {} results for {} rows",
                rule_results.len(),
                rows.len()
            )));
        }

        // === Step 4: in-file conflicts ===
        debug!("Step 4: detect duplicates");
        let conflicts = self.conflict_handler.detect_duplicates(&rows);

        let validations = merge_warnings(&rows, mapper_warnings, rule_results, conflicts);
        let summary = PreviewSummary::from_results(&validations, sheet.skipped_blank_rows);
        let elapsed_ms = start_time.elapsed().as_millis();

        info!(
            total_rows = summary.total_rows,
            critical_rows = summary.critical_rows,
            moderate_rows = summary.moderate_rows,
            will_update = summary.will_update,
            will_create = summary.will_create,
            will_skip = summary.will_skip,
            elapsed_ms = elapsed_ms as u64,
            "Preview finished"
        );

        Ok(ImportPreview {
            run_id,
            import_type,
            file_name: file_name.to_string(),
            headers: sheet.headers,
            rows,
            validations,
            summary,
            elapsed_ms,
        })
    }
}

/// Per row: mapper warnings, then rule warnings, then duplicate warnings.
fn merge_warnings(
    rows: &[NormalizedRow],
    mapper_warnings: Vec<Vec<ImportWarning>>,
    rule_results: Vec<ValidationResult>,
    conflicts: Vec<ImportWarning>,
) -> Vec<ValidationResult> {
    let index_by_line: HashMap<usize, usize> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| (row.line_number, idx))
        .collect();

    let mut conflicts_by_row: Vec<Vec<ImportWarning>> = vec![Vec::new(); rows.len()];
    for warning in conflicts {
        if let Some(idx) = index_by_line.get(&warning.line_number) {
            conflicts_by_row[*idx].push(warning);
        }
    }

    rule_results
        .into_iter()
        .zip(mapper_warnings)
        .zip(conflicts_by_row)
        .map(|((rule, mut warnings), duplicates)| {
            warnings.extend(rule.warnings);
            warnings.extend(duplicates);
            let mut result = ValidationResult {
                line_number: rule.line_number,
                warnings,
                predicted_action: rule.predicted_action,
            };
            if result.has_critical() {
                result.predicted_action = PredictedAction::Skip;
            }
            result
        })
        .collect()
}

#[async_trait]
impl<C> FleetImporter for FleetImporterImpl<C>
where
    C: ImportConfigReader + Send + Sync,
{
    async fn preview_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        import_type: ImportType,
        cache: &ExistenceCache,
    ) -> ImportResult<ImportPreview> {
        let path = file_path.as_ref().to_path_buf();
        if !path.exists() {
            error!(path = %path.display(), "File not found");
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        if !UniversalFileParser::supports(&file_name) {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let settings = self.load_settings().await?;
        let size = tokio::fs::metadata(&path).await?.len();
        if size > settings.max_file_size_bytes {
            return Err(ImportError::FileTooLarge {
                size,
                limit: settings.max_file_size_bytes,
            });
        }

        let bytes = tokio::fs::read(&path).await?;
        self.build_preview(&settings, &file_name, &bytes, import_type, cache)
    }

    async fn preview_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        import_type: ImportType,
        cache: &ExistenceCache,
    ) -> ImportResult<ImportPreview> {
        let settings = self.load_settings().await?;
        self.build_preview(&settings, file_name, &bytes, import_type, cache)
    }

    async fn batch_preview<P: AsRef<Path> + Send + Sync>(
        &self,
        files: Vec<(P, ImportType)>,
        cache: &ExistenceCache,
    ) -> Vec<Result<ImportPreview, String>> {
        info!(files = files.len(), "Batch preview started");

        let tasks = files.into_iter().map(|(path, import_type)| async move {
            let label = path.as_ref().display().to_string();
            self.preview_file(path, import_type, cache)
                .await
                .map_err(|e| format!("{}: {}", label, e))
        });
        let results = join_all(tasks).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            succeeded = results.len() - failed,
            failed, "Batch preview finished"
        );
        results
    }
}
