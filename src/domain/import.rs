// ==========================================
// Fleet Import - Run Artefacts
// ==========================================
// Transient, per-run structures: raw rows, warnings, validation results,
// the caller-supplied existence cache and the preview handed to the UI
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::records::NormalizedRow;
use crate::domain::types::{CellValue, ImportType, Severity};

// ==========================================
// RawRow - one spreadsheet row keyed by canonical header
// ==========================================
// Never mutated after the parser builds it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub line_number: usize, // 1-based, header is line 1
    pub cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new(line_number: usize) -> Self {
        Self {
            line_number,
            cells: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.get(key)
    }

    /// Cell value that is present and not blank.
    pub fn non_blank(&self, key: &str) -> Option<&CellValue> {
        self.cells.get(key).filter(|v| !v.is_blank())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }
}

// ==========================================
// ParsedSheet - parser output
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSheet {
    pub file_name: String,
    pub raw_headers: Vec<String>, // as written in the file
    pub headers: Vec<String>,     // canonical, same order and length
    pub rows: Vec<RawRow>,
    pub total_rows: usize,
    pub skipped_blank_rows: usize,
}

// ==========================================
// ImportWarning - parse or validation finding
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportWarning {
    pub line_number: usize,
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ImportWarning {
    pub fn new<F: Into<String>, M: Into<String>>(
        line_number: usize,
        field: F,
        message: M,
        severity: Severity,
    ) -> Self {
        Self {
            line_number,
            field: field.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn critical<F: Into<String>, M: Into<String>>(line: usize, field: F, message: M) -> Self {
        Self::new(line, field, message, Severity::Critical)
    }

    pub fn moderate<F: Into<String>, M: Into<String>>(line: usize, field: F, message: M) -> Self {
        Self::new(line, field, message, Severity::Moderate)
    }

    pub fn info<F: Into<String>, M: Into<String>>(line: usize, field: F, message: M) -> Self {
        Self::new(line, field, message, Severity::Info)
    }
}

// ==========================================
// PredictedAction - what persistence will likely do with a row
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictedAction {
    Update,
    Create,
    Skip,
}

// ==========================================
// ValidationResult - one per input row
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub line_number: usize,
    pub warnings: Vec<ImportWarning>,
    pub predicted_action: PredictedAction,
}

impl ValidationResult {
    pub fn has_critical(&self) -> bool {
        self.warnings.iter().any(|w| w.severity == Severity::Critical)
    }

    pub fn max_severity(&self) -> Option<Severity> {
        self.warnings.iter().map(|w| w.severity).max()
    }
}

// ==========================================
// ExistenceCache - read-only lookups supplied by the caller
// ==========================================
// Keys: plates uppercased without spaces/hyphens, names trimmed and lowercased
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExistenceCache {
    #[serde(default)]
    pub vehicles: HashMap<String, String>,
    #[serde(default)]
    pub drivers: HashMap<String, String>,
    #[serde(default)]
    pub vehicle_manufacturers: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub assemblers: HashMap<String, String>,
}

pub fn plate_key(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

pub fn name_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl ExistenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vehicle(mut self, plate: &str, id: &str) -> Self {
        self.vehicles.insert(plate_key(plate), id.to_string());
        self
    }

    /// Registers a vehicle together with its manufacturer.
    pub fn with_vehicle_of(mut self, plate: &str, id: &str, manufacturer: &str) -> Self {
        let key = plate_key(plate);
        self.vehicles.insert(key.clone(), id.to_string());
        self.vehicle_manufacturers
            .entry(name_key(manufacturer))
            .or_default()
            .push(key);
        self
    }

    pub fn with_driver(mut self, name: &str, id: &str) -> Self {
        self.drivers.insert(name_key(name), id.to_string());
        self
    }

    pub fn with_assembler(mut self, name: &str, id: &str) -> Self {
        self.assemblers.insert(name_key(name), id.to_string());
        self
    }

    /// Re-keys every map; used after loading a cache written by hand.
    pub fn normalized(self) -> Self {
        Self {
            vehicles: self
                .vehicles
                .into_iter()
                .map(|(k, v)| (plate_key(&k), v))
                .collect(),
            drivers: self
                .drivers
                .into_iter()
                .map(|(k, v)| (name_key(&k), v))
                .collect(),
            vehicle_manufacturers: self
                .vehicle_manufacturers
                .into_iter()
                .map(|(k, plates)| (name_key(&k), plates.iter().map(|p| plate_key(p)).collect()))
                .collect(),
            assemblers: self
                .assemblers
                .into_iter()
                .map(|(k, v)| (name_key(&k), v))
                .collect(),
        }
    }

    pub fn vehicle_id(&self, plate: &str) -> Option<&String> {
        self.vehicles.get(&plate_key(plate))
    }

    pub fn driver_id(&self, name: &str) -> Option<&String> {
        self.drivers.get(&name_key(name))
    }

    pub fn assembler_id(&self, name: &str) -> Option<&String> {
        self.assemblers.get(&name_key(name))
    }

    /// Plates registered under a manufacturer, in insertion order.
    pub fn plates_by_manufacturer(&self, manufacturer: &str) -> &[String] {
        self.vehicle_manufacturers
            .get(&name_key(manufacturer))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

// ==========================================
// PreviewSummary - counts shown above the preview table
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewSummary {
    pub total_rows: usize,
    pub skipped_blank_rows: usize,
    pub critical_rows: usize,
    pub moderate_rows: usize,
    pub info_rows: usize,
    pub will_update: usize,
    pub will_create: usize,
    pub will_skip: usize,
    pub total_warnings: usize,
}

impl PreviewSummary {
    pub fn from_results(results: &[ValidationResult], skipped_blank_rows: usize) -> Self {
        let mut summary = PreviewSummary {
            total_rows: results.len(),
            skipped_blank_rows,
            ..Default::default()
        };

        for result in results {
            summary.total_warnings += result.warnings.len();
            match result.max_severity() {
                Some(Severity::Critical) => summary.critical_rows += 1,
                Some(Severity::Moderate) => summary.moderate_rows += 1,
                Some(Severity::Info) => summary.info_rows += 1,
                None => {}
            }
            match result.predicted_action {
                PredictedAction::Update => summary.will_update += 1,
                PredictedAction::Create => summary.will_create += 1,
                PredictedAction::Skip => summary.will_skip += 1,
            }
        }

        summary
    }
}

// ==========================================
// ImportPreview - everything the UI needs before commit
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreview {
    pub run_id: Uuid,
    pub import_type: ImportType,
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<NormalizedRow>,
    pub validations: Vec<ValidationResult>, // validations[i] belongs to rows[i]
    pub summary: PreviewSummary,
    pub elapsed_ms: u128,
}

impl ImportPreview {
    pub fn warnings(&self) -> impl Iterator<Item = &ImportWarning> {
        self.validations.iter().flat_map(|v| v.warnings.iter())
    }
}

// ==========================================
// ImportSummary - outcome reported by the persistence layer
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub auto_created: usize,
    pub skipped: usize,
    pub warnings: Vec<ImportWarning>,
}

impl ImportSummary {
    /// Outcome expected if every row is committed as predicted.
    ///
    /// The persistence layer starts from this and adjusts the counts
    /// as writes succeed or fail.
    pub fn projected(preview: &ImportPreview) -> Self {
        Self {
            created: preview.summary.will_create,
            updated: preview.summary.will_update,
            auto_created: 0,
            skipped: preview.summary.will_skip,
            warnings: preview.warnings().cloned().collect(),
        }
    }
}
