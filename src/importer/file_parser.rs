// ==========================================
// Fleet Import - File Parser
// ==========================================
// Stage 0: uploaded bytes -> ParsedSheet
// Supports: Excel (.xlsx/.xls, first sheet only) / CSV (.csv)
// Headers come out canonical for the selected import type; blank rows
// are dropped without shifting the line numbers of later rows.
// ==========================================

use crate::config::ImportSettings;
use crate::domain::import::{ParsedSheet, RawRow};
use crate::domain::types::{CellValue, ImportType};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_normalizer::canonical_header;
use crate::importer::importer_trait::{DataCleaner as DataCleanerTrait, FileParser};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Grid read from a file before header canonicalization
struct RawTable {
    headers: Vec<String>,
    rows: Vec<(usize, Vec<CellValue>)>, // (line number, cells in column order)
}

// ==========================================
// Shared sheet assembly
// ==========================================

/// Canonical headers; unnamed columns get a positional name and
/// repeated names get a numeric suffix so no column is lost.
fn canonical_headers(import_type: ImportType, raw_headers: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw_headers
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let mut name = canonical_header(import_type, raw);
            if name.is_empty() {
                name = format!("coluna_{}", idx + 1);
            }
            let count = seen.entry(name.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                format!("{}_{}", name, count)
            } else {
                name
            }
        })
        .collect()
}

/// Reinterpret plain numbers in date columns as Excel serials.
///
/// Other columns are left alone so amounts and odometer readings never
/// turn into dates.
fn preconvert_date_cell(cleaner: &DataCleaner, value: CellValue) -> CellValue {
    match value {
        CellValue::Number(n) => match cleaner.excel_serial_to_date(n) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Number(n),
        },
        other => other,
    }
}

fn build_sheet(
    file_name: &str,
    table: RawTable,
    import_type: ImportType,
    cleaner: &DataCleaner,
) -> ImportResult<ParsedSheet> {
    if table.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ImportError::MissingHeaderRow(file_name.to_string()));
    }

    let headers = canonical_headers(import_type, &table.headers);
    let date_fields = import_type.date_fields();
    let is_date_column: Vec<bool> = headers
        .iter()
        .map(|h| date_fields.contains(&h.as_str()))
        .collect();

    let mut rows = Vec::with_capacity(table.rows.len());
    let mut skipped_blank_rows = 0;

    for (line_number, cells) in table.rows {
        let mut row = RawRow::new(line_number);
        let mut cells = cells.into_iter();
        for (idx, header) in headers.iter().enumerate() {
            let value = cells.next().unwrap_or(CellValue::Empty);
            let value = if is_date_column[idx] {
                preconvert_date_cell(cleaner, value)
            } else {
                value
            };
            row.cells.insert(header.clone(), value);
        }

        if row.is_blank() {
            skipped_blank_rows += 1;
            continue;
        }
        rows.push(row);
    }

    debug!(
        file = file_name,
        rows = rows.len(),
        skipped_blank_rows,
        "Sheet assembled"
    );

    Ok(ParsedSheet {
        file_name: file_name.to_string(),
        raw_headers: table.headers.iter().map(|h| h.trim().to_string()).collect(),
        headers,
        total_rows: rows.len(),
        rows,
        skipped_blank_rows,
    })
}

// ==========================================
// CSV Parser
// ==========================================

/// Decode as UTF-8, falling back to Windows-1252 for legacy exports.
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

/// Pick `;`, `,` or tab by counting occurrences in the header line.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let mut best = (b',', 0usize);
    for delimiter in [b';', b',', b'\t'] {
        let count = header.bytes().filter(|b| *b == delimiter).count();
        if count > best.1 {
            best = (delimiter, count);
        }
    }
    best.0
}

pub struct CsvParser {
    cleaner: DataCleaner,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new(&ImportSettings::default())
    }
}

impl CsvParser {
    pub fn new(settings: &ImportSettings) -> Self {
        Self {
            cleaner: DataCleaner::new(settings),
        }
    }

    fn read_table(&self, bytes: &[u8]) -> ImportResult<RawTable> {
        let text = decode_text(bytes);
        let delimiter = sniff_delimiter(&text);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // rows may be shorter or longer than the header
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let line_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            let cells = record
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::text(v)
                    }
                })
                .collect();
            rows.push((line_number, cells));
        }

        Ok(RawTable { headers, rows })
    }
}

impl FileParser for CsvParser {
    fn parse(
        &self,
        file_name: &str,
        bytes: &[u8],
        import_type: ImportType,
    ) -> ImportResult<ParsedSheet> {
        let table = self.read_table(bytes)?;
        build_sheet(file_name, table, import_type, &self.cleaner)
    }
}

// ==========================================
// Excel Parser
// ==========================================

/// Convert a calamine cell into a CellValue.
///
/// Native date cells become calendar dates when their serial falls in
/// the configured window; error cells count as empty.
pub fn data_to_cell(cleaner: &DataCleaner, cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => {
            if s.is_empty() {
                CellValue::Empty
            } else {
                CellValue::text(s.as_str())
            }
        }
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            if !dt.is_datetime() {
                return CellValue::Number(serial);
            }
            match cleaner.excel_serial_to_date(serial) {
                Some(date) => CellValue::Date(date),
                None => CellValue::Number(serial),
            }
        }
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::text(s.as_str())),
        Data::DurationIso(s) => CellValue::text(s.as_str()),
    }
}

pub struct ExcelParser {
    cleaner: DataCleaner,
}

impl Default for ExcelParser {
    fn default() -> Self {
        Self::new(&ImportSettings::default())
    }
}

impl ExcelParser {
    pub fn new(settings: &ImportSettings) -> Self {
        Self {
            cleaner: DataCleaner::new(settings),
        }
    }

    fn read_table(&self, file_name: &str, bytes: &[u8]) -> ImportResult<RawTable> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // first sheet only
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::EmptyWorkbook(file_name.to_string()))?
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        if range.is_empty() {
            return Err(ImportError::EmptyWorkbook(file_name.to_string()));
        }

        // range starts at the first used row, which may not be sheet row 1
        let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
        let mut sheet_rows = range.rows();

        let header_row = sheet_rows
            .next()
            .ok_or_else(|| ImportError::MissingHeaderRow(file_name.to_string()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| data_to_cell(&self.cleaner, cell).as_text().unwrap_or_default())
            .collect();

        let rows = sheet_rows
            .enumerate()
            .map(|(idx, cells)| {
                let line_number = first_row + idx + 2;
                let values = cells
                    .iter()
                    .map(|cell| data_to_cell(&self.cleaner, cell))
                    .collect();
                (line_number, values)
            })
            .collect();

        Ok(RawTable { headers, rows })
    }
}

impl FileParser for ExcelParser {
    fn parse(
        &self,
        file_name: &str,
        bytes: &[u8],
        import_type: ImportType,
    ) -> ImportResult<ParsedSheet> {
        let table = self.read_table(file_name, bytes)?;
        build_sheet(file_name, table, import_type, &self.cleaner)
    }
}

// ==========================================
// Universal parser (dispatch by extension)
// ==========================================
pub struct UniversalFileParser {
    csv: CsvParser,
    excel: ExcelParser,
    max_file_size_bytes: u64,
}

impl Default for UniversalFileParser {
    fn default() -> Self {
        Self::new(&ImportSettings::default())
    }
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

impl UniversalFileParser {
    pub fn new(settings: &ImportSettings) -> Self {
        Self {
            csv: CsvParser::new(settings),
            excel: ExcelParser::new(settings),
            max_file_size_bytes: settings.max_file_size_bytes,
        }
    }

    /// True when the file name carries an extension this parser accepts.
    pub fn supports(file_name: &str) -> bool {
        matches!(extension_of(file_name).as_str(), "csv" | "xlsx" | "xls")
    }

    fn check_size(&self, size: u64) -> ImportResult<()> {
        if size > self.max_file_size_bytes {
            return Err(ImportError::FileTooLarge {
                size,
                limit: self.max_file_size_bytes,
            });
        }
        Ok(())
    }

    /// Read and parse a file from disk (blocking).
    pub fn parse_path<P: AsRef<Path>>(
        &self,
        file_path: P,
        import_type: ImportType,
    ) -> ImportResult<ParsedSheet> {
        let path = file_path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        if !Self::supports(&file_name) {
            return Err(ImportError::UnsupportedFormat(extension_of(&file_name)));
        }

        self.check_size(std::fs::metadata(path)?.len())?;
        let bytes = std::fs::read(path)?;
        self.parse(&file_name, &bytes, import_type)
    }
}

impl FileParser for UniversalFileParser {
    fn parse(
        &self,
        file_name: &str,
        bytes: &[u8],
        import_type: ImportType,
    ) -> ImportResult<ParsedSheet> {
        self.check_size(bytes.len() as u64)?;

        let ext = extension_of(file_name);
        let result = match ext.as_str() {
            "csv" => self.csv.parse(file_name, bytes, import_type),
            "xlsx" | "xls" => self.excel.parse(file_name, bytes, import_type),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        };

        if let Err(e) = &result {
            warn!(file = file_name, error = %e, "File rejected");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse_csv(content: &[u8], import_type: ImportType) -> ImportResult<ParsedSheet> {
        UniversalFileParser::default().parse("dados.csv", content, import_type)
    }

    #[test]
    fn test_csv_semicolon_with_bom() {
        let content = "\u{feff}Placa;Marca;Ano\nABC-1234;Volvo;2020\n";
        let sheet = parse_csv(content.as_bytes(), ImportType::Vehicles).unwrap();

        assert_eq!(sheet.headers, vec!["placa", "marca", "ano"]);
        assert_eq!(sheet.raw_headers, vec!["Placa", "Marca", "Ano"]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].line_number, 2);
        assert_eq!(sheet.rows[0].get("marca"), Some(&CellValue::text("Volvo")));
    }

    #[test]
    fn test_csv_blank_rows_keep_numbering() {
        let content = "placa,marca\nAAA1111,Volvo\n,\n\nBBB2222,Scania\n";
        let sheet = parse_csv(content.as_bytes(), ImportType::Vehicles).unwrap();

        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].line_number, 2);
        assert_eq!(sheet.rows[1].line_number, 5);
        assert_eq!(sheet.skipped_blank_rows, 1);
        assert_eq!(sheet.total_rows, 2);
    }

    #[test]
    fn test_csv_windows_1252_fallback() {
        // "Descrição" and "Revisão" in Windows-1252
        let mut content = b"placa;descri".to_vec();
        content.extend_from_slice(&[0xE7, 0xE3]);
        content.extend_from_slice(b"o\nABC1234;Revis");
        content.push(0xE3);
        content.extend_from_slice(b"o\n");

        let sheet = parse_csv(&content, ImportType::Maintenances).unwrap();
        assert_eq!(sheet.headers, vec!["placa", "descricao"]);
        assert_eq!(
            sheet.rows[0].get("descricao"),
            Some(&CellValue::text("Revisão"))
        );
    }

    #[test]
    fn test_duplicate_and_unnamed_headers() {
        let content = "placa,placa,\nAAA1111,BBB2222,x\n";
        let sheet = parse_csv(content.as_bytes(), ImportType::Vehicles).unwrap();
        assert_eq!(sheet.headers, vec!["placa", "placa_2", "coluna_3"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let content = "placa;marca;modelo\nAAA1111;Volvo\n";
        let sheet = parse_csv(content.as_bytes(), ImportType::Vehicles).unwrap();
        assert_eq!(sheet.rows[0].get("modelo"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = UniversalFileParser::default().parse("dados.pdf", b"x", ImportType::Vehicles);
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "pdf"));
    }

    #[test]
    fn test_file_too_large() {
        let settings = ImportSettings {
            max_file_size_bytes: 4,
            ..ImportSettings::default()
        };
        let parser = UniversalFileParser::new(&settings);
        let result = parser.parse("dados.csv", b"placa\nAAA1111\n", ImportType::Vehicles);
        assert!(matches!(result, Err(ImportError::FileTooLarge { limit: 4, .. })));
    }

    #[test]
    fn test_invalid_workbook_is_fatal() {
        let result =
            UniversalFileParser::default().parse("dados.xlsx", b"not a zip", ImportType::Vehicles);
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }

    #[test]
    fn test_empty_csv_is_missing_header() {
        let result = parse_csv(b"", ImportType::Vehicles);
        assert!(matches!(result, Err(ImportError::MissingHeaderRow(_))));
    }

    #[test]
    fn test_serial_only_in_date_columns() {
        let cleaner = DataCleaner::default();
        let table = RawTable {
            headers: vec!["Data".to_string(), "Litros".to_string()],
            rows: vec![(2, vec![CellValue::Number(45627.0), CellValue::Number(45627.0)])],
        };
        let sheet = build_sheet("x.xlsx", table, ImportType::Fuelings, &cleaner).unwrap();

        assert_eq!(
            sheet.rows[0].get("data"),
            Some(&CellValue::Date(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()))
        );
        assert_eq!(sheet.rows[0].get("litros"), Some(&CellValue::Number(45627.0)));
    }

    #[test]
    fn test_data_to_cell() {
        let cleaner = DataCleaner::default();
        assert_eq!(data_to_cell(&cleaner, &Data::Empty), CellValue::Empty);
        assert_eq!(data_to_cell(&cleaner, &Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(
            data_to_cell(&cleaner, &Data::String("abc".to_string())),
            CellValue::text("abc")
        );
        assert_eq!(
            data_to_cell(&cleaner, &Data::DateTimeIso("2024-12-01T00:00:00".to_string())),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap())
        );
    }

    #[test]
    fn test_native_date_and_duration_cells() {
        use calamine::{ExcelDateTime, ExcelDateTimeType};

        let cleaner = DataCleaner::default();
        let date = ExcelDateTime::new(45627.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(
            data_to_cell(&cleaner, &Data::DateTime(date)),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap())
        );

        // [hh]:mm durations stay numeric even inside the serial window
        let duration = ExcelDateTime::new(45627.0, ExcelDateTimeType::TimeDelta, false);
        assert_eq!(
            data_to_cell(&cleaner, &Data::DateTime(duration)),
            CellValue::Number(45627.0)
        );
    }

    #[test]
    fn test_parse_path() {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "nome;cpf").unwrap();
        writeln!(temp_file, "Carlos;123.456.789-09").unwrap();

        let sheet = UniversalFileParser::default()
            .parse_path(temp_file.path(), ImportType::Assemblers)
            .unwrap();
        assert_eq!(sheet.rows.len(), 1);
    }

    #[test]
    fn test_parse_path_not_found() {
        let result =
            UniversalFileParser::default().parse_path("nao_existe.csv", ImportType::Vehicles);
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }
}
