// ==========================================
// Fleet Import - Record Validator
// ==========================================
// Stage 2: advisory rules per import type
// critical: essential field missing / row will be skipped
// moderate: implausible value or inconsistent fields
// info:     predicted persistence outcome, unknown enum values
// Never removes a row.
// ==========================================

use crate::config::ImportSettings;
use crate::domain::import::{
    ExistenceCache, ImportWarning, PredictedAction, ValidationResult,
};
use crate::domain::records::{
    AssemblerRecord, DeliveryRecord, DriverRecord, FuelingRecord, MaintenanceRecord,
    NormalizedRecord, NormalizedRow, VehicleRecord,
};
use crate::domain::types::ImportType;
use crate::importer::data_cleaner::{is_known_product, is_known_status, is_valid_uf};
use crate::importer::importer_trait::RecordValidator;
use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static LEGACY_PLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}[0-9]{4}$").expect("valid plate regex"));
static MERCOSUL_PLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}[0-9][A-Z][0-9]{2}$").expect("valid plate regex"));

const CPF_DIGITS: usize = 11;

/// Legacy (ABC1234) or Mercosul (ABC1D23) plate, already normalized.
pub fn is_valid_plate(plate: &str) -> bool {
    LEGACY_PLATE.is_match(plate) || MERCOSUL_PLATE.is_match(plate)
}

// ==========================================
// ValidationContext - per-run parameters
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationContext {
    /// "Today" for expiry checks and the upper bound of vehicle years
    pub reference_date: NaiveDate,
    pub fuel_total_tolerance: f64,
    pub min_vehicle_year: i32,
    pub allow_vehicle_auto_create: bool,
}

impl ValidationContext {
    pub fn from_settings(settings: &ImportSettings, reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            fuel_total_tolerance: settings.fuel_total_tolerance,
            min_vehicle_year: settings.min_vehicle_year,
            allow_vehicle_auto_create: settings.allow_vehicle_auto_create,
        }
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::from_settings(&ImportSettings::default(), Local::now().date_naive())
    }
}

// ==========================================
// DqValidator
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DqValidator;

impl DqValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate one row on its own; rows never influence each other.
    pub fn validate_row(
        &self,
        row: &NormalizedRow,
        import_type: ImportType,
        cache: &ExistenceCache,
        ctx: &ValidationContext,
    ) -> ValidationResult {
        let line = row.line_number;
        let mut warnings = Vec::new();

        if row.record.import_type() != import_type {
            warnings.push(ImportWarning::critical(
                line,
                "record",
                format!(
                    "Record is a {} row but the import type is {}",
                    row.record.import_type(),
                    import_type
                ),
            ));
        }

        let exists = match &row.record {
            NormalizedRecord::Vehicle(r) => Some(self.check_vehicle(line, r, cache, ctx, &mut warnings)),
            NormalizedRecord::Driver(r) => Some(self.check_driver(line, r, cache, ctx, &mut warnings)),
            NormalizedRecord::Assembler(r) => Some(self.check_assembler(line, r, cache, &mut warnings)),
            NormalizedRecord::Fueling(r) => {
                self.check_fueling(line, r, cache, ctx, &mut warnings);
                None
            }
            NormalizedRecord::Maintenance(r) => {
                self.check_maintenance(line, r, cache, &mut warnings);
                None
            }
            NormalizedRecord::Delivery(r) => {
                self.check_delivery(line, r, cache, ctx, &mut warnings);
                None
            }
        };

        let mut result = ValidationResult {
            line_number: line,
            warnings,
            predicted_action: PredictedAction::Create,
        };
        result.predicted_action = if result.has_critical() {
            PredictedAction::Skip
        } else if exists == Some(true) {
            PredictedAction::Update
        } else {
            PredictedAction::Create
        };
        result
    }

    // ===== shared checks =====

    fn check_uf(&self, line: usize, uf: Option<&String>, out: &mut Vec<ImportWarning>) {
        if let Some(uf) = uf {
            if !is_valid_uf(uf) {
                out.push(ImportWarning::moderate(
                    line,
                    "uf",
                    format!("\"{}\" is not a Brazilian state code", uf),
                ));
            }
        }
    }

    fn check_status(&self, line: usize, status: Option<&String>, out: &mut Vec<ImportWarning>) {
        if let Some(status) = status {
            if !is_known_status(status) {
                out.push(ImportWarning::info(
                    line,
                    "status",
                    format!("Unknown status \"{}\" kept as written", status),
                ));
            }
        }
    }

    fn check_cpf(&self, line: usize, cpf: Option<&String>, out: &mut Vec<ImportWarning>) {
        if let Some(cpf) = cpf {
            if cpf.len() != CPF_DIGITS {
                out.push(ImportWarning::moderate(
                    line,
                    "cpf",
                    format!("CPF \"{}\" should have {} digits", cpf, CPF_DIGITS),
                ));
            }
        }
    }

    fn check_positive(
        &self,
        line: usize,
        field: &str,
        value: Option<f64>,
        out: &mut Vec<ImportWarning>,
    ) {
        if let Some(v) = value {
            if v <= 0.0 {
                out.push(ImportWarning::moderate(
                    line,
                    field,
                    format!("{} should be greater than zero (got {})", field, v),
                ));
            }
        }
    }

    /// Referenced vehicle must exist; fuelings and maintenances cannot
    /// create one.
    fn check_known_plate(
        &self,
        line: usize,
        placa: Option<&String>,
        cache: &ExistenceCache,
        out: &mut Vec<ImportWarning>,
    ) {
        match placa {
            None => out.push(ImportWarning::critical(line, "placa", "Plate is required")),
            Some(p) if cache.vehicle_id(p).is_none() => out.push(ImportWarning::critical(
                line,
                "placa",
                format!("Vehicle {} not found; record will be skipped", p),
            )),
            Some(_) => {}
        }
    }

    fn check_referenced_driver(
        &self,
        line: usize,
        motorista: Option<&String>,
        cache: &ExistenceCache,
        out: &mut Vec<ImportWarning>,
    ) {
        if let Some(name) = motorista {
            if cache.driver_id(name).is_none() {
                out.push(ImportWarning::info(
                    line,
                    "motorista",
                    format!("Driver \"{}\" not found; will be auto-created", name),
                ));
            }
        }
    }

    fn push_upsert(
        &self,
        line: usize,
        field: &str,
        label: &str,
        key: &str,
        exists: bool,
        out: &mut Vec<ImportWarning>,
    ) {
        let message = if exists {
            format!("{} {} already exists and will be updated", label, key)
        } else {
            format!("{} {} will be created", label, key)
        };
        out.push(ImportWarning::info(line, field, message));
    }

    // ===== per type =====

    fn check_vehicle(
        &self,
        line: usize,
        r: &VehicleRecord,
        cache: &ExistenceCache,
        ctx: &ValidationContext,
        out: &mut Vec<ImportWarning>,
    ) -> bool {
        let placa = match &r.placa {
            Some(p) => p,
            None => {
                out.push(ImportWarning::critical(line, "placa", "Plate is required"));
                return false;
            }
        };

        if !is_valid_plate(placa) {
            out.push(ImportWarning::moderate(
                line,
                "placa",
                format!("Plate {} matches neither ABC1234 nor ABC1D23", placa),
            ));
        }

        if let Some(ano) = r.ano {
            let max_year = ctx.reference_date.year() + 1;
            if ano < ctx.min_vehicle_year || ano > max_year {
                out.push(ImportWarning::moderate(
                    line,
                    "ano",
                    format!(
                        "Year {} outside the expected range {}-{}",
                        ano, ctx.min_vehicle_year, max_year
                    ),
                ));
            }
        }

        if let Some(km) = r.km_atual {
            if km < 0.0 {
                out.push(ImportWarning::moderate(
                    line,
                    "km_atual",
                    format!("Odometer cannot be negative (got {})", km),
                ));
            }
        }
        self.check_positive(line, "capacidade_kg", r.capacidade_kg, out);
        self.check_status(line, r.status.as_ref(), out);

        let exists = cache.vehicle_id(placa).is_some();
        self.push_upsert(line, "placa", "Vehicle", placa, exists, out);
        exists
    }

    fn check_driver(
        &self,
        line: usize,
        r: &DriverRecord,
        cache: &ExistenceCache,
        ctx: &ValidationContext,
        out: &mut Vec<ImportWarning>,
    ) -> bool {
        let nome = match &r.nome {
            Some(n) => n,
            None => {
                out.push(ImportWarning::critical(line, "nome", "Driver name is required"));
                return false;
            }
        };

        self.check_cpf(line, r.cpf.as_ref(), out);

        if let Some(validade) = r.validade_cnh {
            if validade < ctx.reference_date {
                out.push(ImportWarning::moderate(
                    line,
                    "validade_cnh",
                    format!("CNH expired on {}", validade.format("%d/%m/%Y")),
                ));
            }
        }

        let exists = cache.driver_id(nome).is_some();
        self.push_upsert(line, "nome", "Driver", nome, exists, out);
        exists
    }

    fn check_assembler(
        &self,
        line: usize,
        r: &AssemblerRecord,
        cache: &ExistenceCache,
        out: &mut Vec<ImportWarning>,
    ) -> bool {
        let nome = match &r.nome {
            Some(n) => n,
            None => {
                out.push(ImportWarning::critical(line, "nome", "Assembler name is required"));
                return false;
            }
        };

        self.check_cpf(line, r.cpf.as_ref(), out);

        let exists = cache.assembler_id(nome).is_some();
        self.push_upsert(line, "nome", "Assembler", nome, exists, out);
        exists
    }

    fn check_fueling(
        &self,
        line: usize,
        r: &FuelingRecord,
        cache: &ExistenceCache,
        ctx: &ValidationContext,
        out: &mut Vec<ImportWarning>,
    ) {
        self.check_known_plate(line, r.placa.as_ref(), cache, out);

        if r.data.is_none() {
            out.push(ImportWarning::critical(line, "data", "Fueling date is required"));
        }

        self.check_positive(line, "litros", r.litros, out);
        self.check_positive(line, "valor_unitario", r.valor_unitario, out);

        if let (Some(litros), Some(unitario), Some(total)) =
            (r.litros, r.valor_unitario, r.valor_total)
        {
            let expected = litros * unitario;
            if (total - expected).abs() > ctx.fuel_total_tolerance {
                out.push(ImportWarning::moderate(
                    line,
                    "valor_total",
                    format!(
                        "Total {:.2} differs from liters x unit price ({:.2})",
                        total, expected
                    ),
                ));
            }
        }

        if let Some(produto) = &r.produto {
            if !is_known_product(produto) {
                out.push(ImportWarning::info(
                    line,
                    "produto",
                    format!("Unknown product \"{}\" kept as written", produto),
                ));
            }
        }

        self.check_referenced_driver(line, r.motorista.as_ref(), cache, out);
        self.check_uf(line, r.uf.as_ref(), out);
    }

    fn check_maintenance(
        &self,
        line: usize,
        r: &MaintenanceRecord,
        cache: &ExistenceCache,
        out: &mut Vec<ImportWarning>,
    ) {
        self.check_known_plate(line, r.placa.as_ref(), cache, out);

        if r.data.is_none() {
            out.push(ImportWarning::moderate(line, "data", "Maintenance date is missing"));
        }

        self.check_positive(line, "valor", r.valor, out);
        self.check_status(line, r.status.as_ref(), out);
    }

    fn check_delivery(
        &self,
        line: usize,
        r: &DeliveryRecord,
        cache: &ExistenceCache,
        ctx: &ValidationContext,
        out: &mut Vec<ImportWarning>,
    ) {
        if r.pv_foco.is_none() && r.nf.is_none() {
            out.push(ImportWarning::critical(
                line,
                "pv_foco",
                "Neither PV nor invoice number present",
            ));
        }

        if r.data_saida.is_none() {
            out.push(ImportWarning::moderate(line, "data_saida", "Departure date is missing"));
        }

        self.check_positive(line, "valor", r.valor, out);

        if let Some(pct) = r.percentual_gastos {
            if pct > 100.0 {
                out.push(ImportWarning::moderate(
                    line,
                    "percentual_gastos",
                    format!("Expenses are {:.1}% of the value", pct),
                ));
            }
        }

        self.check_uf(line, r.uf.as_ref(), out);
        self.check_referenced_driver(line, r.motorista.as_ref(), cache, out);

        if let Some(veiculo) = &r.veiculo {
            self.check_delivery_vehicle(line, veiculo, cache, ctx, out);
        }

        for (field, name) in [("assembler_1", &r.assembler_1), ("assembler_2", &r.assembler_2)] {
            if let Some(name) = name {
                if cache.assembler_id(name).is_none() {
                    out.push(ImportWarning::info(
                        line,
                        field,
                        format!("Assembler \"{}\" not found; will be auto-created", name),
                    ));
                }
            }
        }

        self.check_status(line, r.status.as_ref(), out);
    }

    /// The vehicle column holds a plate or a manufacturer name.
    fn check_delivery_vehicle(
        &self,
        line: usize,
        veiculo: &str,
        cache: &ExistenceCache,
        ctx: &ValidationContext,
        out: &mut Vec<ImportWarning>,
    ) {
        if cache.vehicle_id(veiculo).is_some() {
            out.push(ImportWarning::info(
                line,
                "veiculo",
                format!("Vehicle matched by plate {}", veiculo),
            ));
            return;
        }

        let candidates = cache.plates_by_manufacturer(veiculo);
        match candidates {
            [] if ctx.allow_vehicle_auto_create => out.push(ImportWarning::info(
                line,
                "veiculo",
                format!("Vehicle \"{}\" not found; will be auto-created", veiculo),
            )),
            [] => out.push(ImportWarning::moderate(
                line,
                "veiculo",
                format!("Vehicle \"{}\" not found; delivery left unassigned", veiculo),
            )),
            [only] => out.push(ImportWarning::info(
                line,
                "veiculo",
                format!("Vehicle matched by manufacturer \"{}\": {}", veiculo, only),
            )),
            [first, rest @ ..] => {
                out.push(ImportWarning::info(
                    line,
                    "veiculo",
                    format!("Vehicle matched by manufacturer \"{}\": {}", veiculo, first),
                ));
                out.push(ImportWarning::moderate(
                    line,
                    "veiculo",
                    format!(
                        "{} vehicles share manufacturer \"{}\"; picked {}, check the assignment",
                        rest.len() + 1,
                        veiculo,
                        first
                    ),
                ));
            }
        }
    }
}

impl RecordValidator for DqValidator {
    fn validate_all(
        &self,
        rows: &[NormalizedRow],
        import_type: ImportType,
        cache: &ExistenceCache,
        context: &ValidationContext,
    ) -> Vec<ValidationResult> {
        let results: Vec<ValidationResult> = rows
            .iter()
            .map(|row| self.validate_row(row, import_type, cache, context))
            .collect();

        debug!(
            import_type = %import_type,
            rows = results.len(),
            skipped = results.iter().filter(|r| r.predicted_action == PredictedAction::Skip).count(),
            "Validation finished"
        );
        results
    }
}
