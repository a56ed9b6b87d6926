// ==========================================
// Fleet Import - In-File Conflict Detection
// ==========================================
// Same key twice in one file: every repeat gets a moderate warning
// pointing back at the first occurrence. Rows are never dropped.
// ==========================================

use crate::domain::import::{name_key, plate_key, ImportWarning};
use crate::domain::records::{NormalizedRecord, NormalizedRow};
use crate::importer::importer_trait::ConflictHandler as ConflictHandlerTrait;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ConflictHandler;

impl ConflictHandler {
    pub fn new() -> Self {
        Self
    }
}

/// (field, key) pairs that identify a row inside one file
fn identity_keys(record: &NormalizedRecord) -> Vec<(&'static str, String)> {
    match record {
        NormalizedRecord::Vehicle(r) => r
            .placa
            .iter()
            .map(|p| ("placa", plate_key(p)))
            .collect(),
        NormalizedRecord::Driver(r) => {
            let mut keys = Vec::new();
            if let Some(nome) = &r.nome {
                keys.push(("nome", name_key(nome)));
            }
            if let Some(cpf) = &r.cpf {
                keys.push(("cpf", cpf.clone()));
            }
            keys
        }
        NormalizedRecord::Delivery(r) => {
            if r.pv_foco.is_none() && r.nf.is_none() {
                return Vec::new();
            }
            let key = format!(
                "{}|{}",
                r.pv_foco.as_deref().unwrap_or(""),
                r.nf.as_deref().map(str::to_uppercase).unwrap_or_default()
            );
            vec![("pv_foco", key)]
        }
        NormalizedRecord::Assembler(r) => r
            .nome
            .iter()
            .map(|n| ("nome", name_key(n)))
            .collect(),
        // events may legitimately repeat
        NormalizedRecord::Fueling(_) | NormalizedRecord::Maintenance(_) => Vec::new(),
    }
}

impl ConflictHandlerTrait for ConflictHandler {
    fn detect_duplicates(&self, rows: &[NormalizedRow]) -> Vec<ImportWarning> {
        let mut first_seen: HashMap<(&'static str, String), usize> = HashMap::new();
        let mut warnings = Vec::new();

        for row in rows {
            for (field, key) in identity_keys(&row.record) {
                match first_seen.get(&(field, key.clone())) {
                    Some(first_line) => warnings.push(ImportWarning::moderate(
                        row.line_number,
                        field,
                        format!(
                            "Duplicate {} in this file (first seen on line {})",
                            field, first_line
                        ),
                    )),
                    None => {
                        first_seen.insert((field, key), row.line_number);
                    }
                }
            }
        }

        warnings
    }
}
