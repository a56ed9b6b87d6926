// ==========================================
// Fleet Import - Field Mapper
// ==========================================
// Stage 1: RawRow (canonical headers) -> typed record
// A cell that is present but cannot be parsed becomes None plus a
// warning on that row; the row itself is always kept.
// ==========================================

use crate::config::ImportSettings;
use crate::domain::import::{ImportWarning, ParsedSheet, RawRow};
use crate::domain::records::{
    AssemblerRecord, DeliveryRecord, DriverRecord, FuelingRecord, MaintenanceRecord,
    NormalizedRecord, NormalizedRow, VehicleRecord,
};
use crate::domain::types::{CellValue, ImportType, TextCase};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::delivery_processor::{
    self as delivery, assembler_columns, derive_percentage, detect_aglutinated, fold_assemblers,
    parse_aglutinated_column,
};
use crate::importer::field_lookup::FieldLookup;
use crate::importer::importer_trait::{DataCleaner as DataCleanerTrait, FieldMapper as FieldMapperTrait};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{4})\b").expect("valid year regex"));

const CPF_DIGITS: usize = 11;

// ==========================================
// SheetContext - computed once per sheet
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct SheetContext {
    pub import_type: ImportType,
    pub headers: Vec<String>,
    /// Set when the first column holds PV and invoice number together
    pub aglutinated_column: Option<String>,
    pub assembler_columns: Vec<String>,
}

impl SheetContext {
    pub fn new(import_type: ImportType, headers: &[String], max_assembler_columns: usize) -> Self {
        let (aglutinated_column, assembler_columns) = if import_type == ImportType::Deliveries {
            (
                detect_aglutinated(headers).map(str::to_string),
                assembler_columns(headers, max_assembler_columns),
            )
        } else {
            (None, Vec::new())
        };

        Self {
            import_type,
            headers: headers.to_vec(),
            aglutinated_column,
            assembler_columns,
        }
    }

    pub fn from_sheet(sheet: &ParsedSheet, import_type: ImportType, max_assembler_columns: usize) -> Self {
        Self::new(import_type, &sheet.headers, max_assembler_columns)
    }
}

// ==========================================
// RowReader - typed access to one row, collecting warnings
// ==========================================
struct RowReader<'a> {
    row: &'a RawRow,
    headers: &'a [String],
    cleaner: &'a DataCleaner,
    warnings: Vec<ImportWarning>,
}

impl<'a> RowReader<'a> {
    fn new(row: &'a RawRow, headers: &'a [String], cleaner: &'a DataCleaner) -> Self {
        Self {
            row,
            headers,
            cleaner,
            warnings: Vec::new(),
        }
    }

    fn cell(&self, field: &str) -> Option<&'a CellValue> {
        self.row.non_blank(field)
    }

    fn warn_unparsed(&mut self, field: &str, kind: &str, raw: &CellValue) {
        self.warnings.push(ImportWarning::moderate(
            self.row.line_number,
            field,
            format!("Could not read {} from \"{}\"; field left empty", kind, raw),
        ));
    }

    fn text_of(&self, value: Option<&CellValue>, case: TextCase) -> Option<String> {
        value.and_then(|v| self.cleaner.normalize_text(v, case))
    }

    fn number_of(&mut self, field: &str, value: Option<&CellValue>) -> Option<f64> {
        let raw = value?;
        let parsed = self.cleaner.normalize_number(raw);
        if parsed.is_none() {
            self.warn_unparsed(field, "a number", raw);
        }
        parsed
    }

    fn date_of(&mut self, field: &str, value: Option<&CellValue>) -> Option<NaiveDate> {
        let raw = value?;
        let parsed = self.cleaner.normalize_date(raw);
        if parsed.is_none() {
            self.warn_unparsed(field, "a date", raw);
        }
        parsed
    }

    // ===== fixed canonical fields =====

    fn text(&self, field: &str, case: TextCase) -> Option<String> {
        self.text_of(self.cell(field), case)
    }

    fn number(&mut self, field: &str) -> Option<f64> {
        let value = self.cell(field);
        self.number_of(field, value)
    }

    fn date(&mut self, field: &str) -> Option<NaiveDate> {
        let value = self.cell(field);
        self.date_of(field, value)
    }

    /// An empty cell in a present column reads as "no".
    fn boolean(&mut self, field: &str) -> Option<bool> {
        let raw = self.row.get(field)?;
        let parsed = self.cleaner.normalize_boolean(raw);
        if parsed.is_none() {
            self.warnings.push(ImportWarning::info(
                self.row.line_number,
                field,
                format!("Unrecognized yes/no value \"{}\"; field left empty", raw),
            ));
        }
        parsed
    }

    fn placa(&self, field: &str) -> Option<String> {
        self.cell(field).and_then(|v| self.cleaner.normalize_placa(v))
    }

    fn uf(&self, value: Option<&CellValue>) -> Option<String> {
        value.and_then(|v| self.cleaner.normalize_uf(v))
    }

    fn status(&self, value: Option<&CellValue>) -> Option<String> {
        value.and_then(|v| self.cleaner.normalize_status(v))
    }

    fn digits(&self, field: &str) -> Option<String> {
        self.cell(field).and_then(|v| self.cleaner.normalize_digits(v))
    }

    /// CPF typed into a numeric cell loses its leading zeros
    fn cpf(&self, field: &str) -> Option<String> {
        let raw = self.cell(field)?;
        let digits = self.cleaner.normalize_digits(raw)?;
        match raw {
            CellValue::Number(_) if digits.len() < CPF_DIGITS => {
                Some(format!("{:0>width$}", digits, width = CPF_DIGITS))
            }
            _ => Some(digits),
        }
    }

    /// Year column; tolerates "2020/2021" (manufacture/model) notation.
    fn year(&mut self, field: &str) -> Option<i32> {
        let raw = self.cell(field)?;
        if let CellValue::Text(s) = raw {
            if let Some(caps) = LEADING_YEAR.captures(s) {
                return caps[1].parse().ok();
            }
        }
        match self.cleaner.normalize_number(raw) {
            Some(n) if n.fract() == 0.0 && n >= i32::MIN as f64 && n <= i32::MAX as f64 => {
                Some(n as i32)
            }
            _ => {
                self.warn_unparsed(field, "a year", raw);
                None
            }
        }
    }

    // ===== flexible lookups =====

    fn find(&self, lookup: &FieldLookup) -> Option<&'a CellValue> {
        lookup.value(self.row, self.headers)
    }

    fn lookup_text(&self, lookup: &FieldLookup, case: TextCase) -> Option<String> {
        self.text_of(self.find(lookup), case)
    }

    fn lookup_number(&mut self, lookup: &FieldLookup) -> Option<f64> {
        let value = self.find(lookup);
        self.number_of(lookup.field, value)
    }

    fn lookup_date(&mut self, lookup: &FieldLookup) -> Option<NaiveDate> {
        let value = self.find(lookup);
        self.date_of(lookup.field, value)
    }
}

// ==========================================
// FieldMapper
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct FieldMapper {
    cleaner: DataCleaner,
}

impl FieldMapper {
    pub fn new(settings: &ImportSettings) -> Self {
        Self {
            cleaner: DataCleaner::new(settings),
        }
    }

    fn map_vehicle(&self, r: &mut RowReader) -> VehicleRecord {
        VehicleRecord {
            placa: r.placa("placa"),
            marca: r.text("marca", TextCase::Title),
            modelo: r.text("modelo", TextCase::Keep),
            ano: r.year("ano"),
            tipo: r.text("tipo", TextCase::Keep),
            combustivel: r.text("combustivel", TextCase::Title),
            renavam: r.digits("renavam"),
            capacidade_kg: r.number("capacidade_kg"),
            km_atual: r.number("km_atual"),
            status: r.status(r.cell("status")),
            ativo: r.boolean("ativo"),
        }
    }

    fn map_driver(&self, r: &mut RowReader) -> DriverRecord {
        DriverRecord {
            nome: r.text("nome", TextCase::Title),
            cpf: r.cpf("cpf"),
            cnh: r.digits("cnh"),
            categoria_cnh: r.text("categoria_cnh", TextCase::Upper),
            validade_cnh: r.date("validade_cnh"),
            telefone: r.digits("telefone"),
            ativo: r.boolean("ativo"),
        }
    }

    fn map_fueling(&self, r: &mut RowReader) -> FuelingRecord {
        FuelingRecord {
            data: r.date("data"),
            placa: r.placa("placa"),
            motorista: r.text("motorista", TextCase::Title),
            posto: r.text("posto", TextCase::Keep),
            produto: r
                .cell("produto")
                .and_then(|v| self.cleaner.normalize_produto(v)),
            litros: r.number("litros"),
            valor_unitario: r.number("valor_unitario"),
            valor_total: r.number("valor_total"),
            km: r.number("km"),
            cidade: r.text("cidade", TextCase::Title),
            uf: r.uf(r.cell("uf")),
        }
    }

    fn map_maintenance(&self, r: &mut RowReader) -> MaintenanceRecord {
        MaintenanceRecord {
            data: r.date("data"),
            placa: r.placa("placa"),
            tipo: r.text("tipo", TextCase::Keep),
            descricao: r.text("descricao", TextCase::Keep),
            oficina: r.text("oficina", TextCase::Keep),
            valor: r.number("valor"),
            km: r.number("km"),
            status: r.status(r.cell("status")),
        }
    }

    fn map_assembler(&self, r: &mut RowReader) -> AssemblerRecord {
        AssemblerRecord {
            nome: r.text("nome", TextCase::Title),
            cpf: r.cpf("cpf"),
            telefone: r.digits("telefone"),
            ativo: r.boolean("ativo"),
        }
    }

    fn map_delivery(&self, r: &mut RowReader, sheet: &SheetContext) -> DeliveryRecord {
        // PV + NF, from the glued first column or from their own columns
        let (pv_foco, nf) = match &sheet.aglutinated_column {
            Some(column) => {
                let raw = r.cell(column).and_then(CellValue::as_text).unwrap_or_default();
                let split = parse_aglutinated_column(&raw);
                if let Some(error) = split.error {
                    r.warnings
                        .push(ImportWarning::moderate(r.row.line_number, "pv_foco", error));
                }
                (split.pv_foco, split.nf)
            }
            None => (
                r.lookup_text(&delivery::PV_FOCO_LOOKUP, TextCase::Keep),
                r.lookup_text(&delivery::NF_LOOKUP, TextCase::Keep),
            ),
        };

        let valor = r.lookup_number(&delivery::VALOR_LOOKUP);
        let gasto_entrega = r.lookup_number(&delivery::GASTO_ENTREGA_LOOKUP);
        let gasto_montagem = r.lookup_number(&delivery::GASTO_MONTAGEM_LOOKUP);
        let explicit_percentage = r.lookup_number(&delivery::PERCENTUAL_LOOKUP);

        let fold = fold_assemblers(
            sheet
                .assembler_columns
                .iter()
                .map(|column| r.text(column, TextCase::Title)),
        );
        let erros = fold.append_note_to(r.lookup_text(&delivery::ERROS_LOOKUP, TextCase::Keep));

        DeliveryRecord {
            pv_foco,
            nf,
            cliente: r.lookup_text(&delivery::CLIENTE_LOOKUP, TextCase::Keep),
            cidade: r.lookup_text(&delivery::CIDADE_LOOKUP, TextCase::Title),
            uf: r.uf(r.find(&delivery::UF_LOOKUP)),
            data_saida: r.lookup_date(&delivery::DATA_SAIDA_LOOKUP),
            data_montagem: r.lookup_date(&delivery::DATA_MONTAGEM_LOOKUP),
            motorista: r.lookup_text(&delivery::MOTORISTA_LOOKUP, TextCase::Title),
            veiculo: r.lookup_text(&delivery::VEICULO_LOOKUP, TextCase::Keep),
            tipo_transporte: r.lookup_text(&delivery::TIPO_TRANSPORTE_LOOKUP, TextCase::Keep),
            valor,
            gasto_entrega,
            gasto_montagem,
            percentual_gastos: derive_percentage(
                explicit_percentage,
                valor,
                gasto_entrega,
                gasto_montagem,
            ),
            assembler_1: fold.assembler_1,
            assembler_2: fold.assembler_2,
            status: r.status(r.find(&delivery::STATUS_LOOKUP)),
            erros,
        }
    }
}

impl FieldMapperTrait for FieldMapper {
    fn map_row(&self, row: &RawRow, sheet: &SheetContext) -> (NormalizedRow, Vec<ImportWarning>) {
        let mut reader = RowReader::new(row, &sheet.headers, &self.cleaner);

        let record = match sheet.import_type {
            ImportType::Vehicles => NormalizedRecord::Vehicle(self.map_vehicle(&mut reader)),
            ImportType::Drivers => NormalizedRecord::Driver(self.map_driver(&mut reader)),
            ImportType::Fuelings => NormalizedRecord::Fueling(self.map_fueling(&mut reader)),
            ImportType::Maintenances => {
                NormalizedRecord::Maintenance(self.map_maintenance(&mut reader))
            }
            ImportType::Assemblers => NormalizedRecord::Assembler(self.map_assembler(&mut reader)),
            ImportType::Deliveries => {
                NormalizedRecord::Delivery(self.map_delivery(&mut reader, sheet))
            }
        };

        (
            NormalizedRow {
                line_number: row.line_number,
                record,
            },
            reader.warnings,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Severity;

    fn sheet_row(
        import_type: ImportType,
        cells: &[(&str, CellValue)],
    ) -> (RawRow, SheetContext) {
        let mut row = RawRow::new(2);
        let mut headers = Vec::new();
        for (k, v) in cells {
            row.cells.insert(k.to_string(), v.clone());
            headers.push(k.to_string());
        }
        let sheet = SheetContext::new(import_type, &headers, 7);
        (row, sheet)
    }

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    #[test]
    fn test_map_vehicle() {
        let (row, sheet) = sheet_row(
            ImportType::Vehicles,
            &[
                ("placa", t("abc-1d23")),
                ("marca", t("VOLVO")),
                ("ano", t("2019/2020")),
                ("km_atual", t("120.500,5")),
                ("ativo", t("Sim")),
            ],
        );
        let (mapped, warnings) = FieldMapper::default().map_row(&row, &sheet);
        let vehicle = mapped.record.as_vehicle().unwrap();

        assert_eq!(vehicle.placa.as_deref(), Some("ABC1D23"));
        assert_eq!(vehicle.marca.as_deref(), Some("Volvo"));
        assert_eq!(vehicle.ano, Some(2019));
        assert_eq!(vehicle.km_atual, Some(120500.5));
        assert_eq!(vehicle.ativo, Some(true));
        assert_eq!(vehicle.modelo, None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_empty_boolean_cell_is_false() {
        let (row, sheet) = sheet_row(
            ImportType::Vehicles,
            &[("placa", t("ABC1234")), ("ativo", CellValue::Empty)],
        );
        let (mapped, warnings) = FieldMapper::default().map_row(&row, &sheet);
        assert_eq!(mapped.record.as_vehicle().unwrap().ativo, Some(false));
        assert!(warnings.is_empty());

        let (row, sheet) = sheet_row(ImportType::Vehicles, &[("placa", t("ABC1234"))]);
        let (mapped, _) = FieldMapper::default().map_row(&row, &sheet);
        assert_eq!(mapped.record.as_vehicle().unwrap().ativo, None);
    }

    #[test]
    fn test_unparseable_cells_warn_and_empty() {
        let (row, sheet) = sheet_row(
            ImportType::Fuelings,
            &[
                ("data", t("ontem")),
                ("placa", t("ABC1234")),
                ("litros", t("muito")),
            ],
        );
        let (mapped, warnings) = FieldMapper::default().map_row(&row, &sheet);
        let fueling = mapped.record.as_fueling().unwrap();

        assert_eq!(fueling.data, None);
        assert_eq!(fueling.litros, None);
        assert_eq!(fueling.placa.as_deref(), Some("ABC1234"));
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.severity == Severity::Moderate));
        assert!(warnings.iter().all(|w| w.line_number == 2));
        assert!(warnings[0].message.contains("ontem"));
    }

    #[test]
    fn test_driver_cpf_padding() {
        let (row, sheet) = sheet_row(
            ImportType::Drivers,
            &[
                ("nome", t(" maria  souza ")),
                ("cpf", CellValue::Number(1234567890.0)),
                ("categoria_cnh", t("ae")),
            ],
        );
        let (mapped, _) = FieldMapper::default().map_row(&row, &sheet);
        let driver = mapped.record.as_driver().unwrap();
        assert_eq!(driver.nome.as_deref(), Some("Maria Souza"));
        assert_eq!(driver.cpf.as_deref(), Some("01234567890"));
        assert_eq!(driver.categoria_cnh.as_deref(), Some("AE"));
    }

    #[test]
    fn test_delivery_aglutinated_sheet() {
        let (row, sheet) = sheet_row(
            ImportType::Deliveries,
            &[
                ("pv_foco", t("5134 DECLARAÇÃO")),
                ("cliente", t("Loja Centro")),
                ("valor", t("1.000,00")),
                ("gasto_entrega", t("100")),
                ("gasto_montagem", t("50")),
            ],
        );
        assert_eq!(sheet.aglutinated_column.as_deref(), Some("pv_foco"));

        let (mapped, warnings) = FieldMapper::default().map_row(&row, &sheet);
        let delivery = mapped.record.as_delivery().unwrap();
        assert_eq!(delivery.pv_foco.as_deref(), Some("5134"));
        assert_eq!(delivery.nf.as_deref(), Some("DECLARAÇÃO"));
        assert_eq!(delivery.percentual_gastos, Some(15.0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_delivery_split_failure_only_touches_two_fields() {
        let (row, sheet) = sheet_row(
            ImportType::Deliveries,
            &[("pv_foco", t("DECLARAÇÃO")), ("cliente", t("Loja Centro"))],
        );
        let (mapped, warnings) = FieldMapper::default().map_row(&row, &sheet);
        let delivery = mapped.record.as_delivery().unwrap();
        assert_eq!(delivery.pv_foco, None);
        assert_eq!(delivery.nf, None);
        assert_eq!(delivery.cliente.as_deref(), Some("Loja Centro"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("DECLARAÇÃO"));
    }

    #[test]
    fn test_delivery_separate_columns_and_assemblers() {
        let (row, sheet) = sheet_row(
            ImportType::Deliveries,
            &[
                ("pv_foco", t("77")),
                ("nf", t("NF-9")),
                ("montador_1", t("ana")),
                ("montador_2", t("")),
                ("montador_3", t("bia")),
                ("montador_4", t("caio")),
                ("observacoes", t("Cliente ausente")),
                ("estado_destino", t("São Paulo")),
                ("data_de_montagem_final", t("05/12/2024")),
            ],
        );
        assert_eq!(sheet.aglutinated_column, None);

        let (mapped, warnings) = FieldMapper::default().map_row(&row, &sheet);
        let delivery = mapped.record.as_delivery().unwrap();
        assert_eq!(delivery.pv_foco.as_deref(), Some("77"));
        assert_eq!(delivery.nf.as_deref(), Some("NF-9"));
        assert_eq!(delivery.assembler_1.as_deref(), Some("Ana"));
        assert_eq!(delivery.assembler_2.as_deref(), Some("Bia"));
        assert_eq!(
            delivery.erros.as_deref(),
            Some("Cliente ausente; Additional assemblers: Caio")
        );
        assert_eq!(delivery.uf.as_deref(), Some("SP"));
        assert_eq!(delivery.data_montagem, NaiveDate::from_ymd_opt(2024, 12, 5));
        assert_eq!(delivery.percentual_gastos, None);
        assert!(warnings.is_empty());
    }
}
