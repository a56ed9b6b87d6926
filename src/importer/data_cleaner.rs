// ==========================================
// Fleet Import - Cell Value Normalizers
// ==========================================
// Every normalizer is total: a typed value or None ("could not
// confidently parse, treat as absent"). Nothing here panics or errors.
// ==========================================

use crate::config::ImportSettings;
use crate::domain::import::plate_key;
use crate::domain::types::{CellValue, TextCase};
use crate::importer::header_normalizer::fold_accents;
use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;
use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

// ==========================================
// Patterns
// ==========================================
static THOUSANDS_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d{1,3}(,\d{3}){2,}$").expect("valid regex"));
// `1.500` and `120.500` are Brazilian thousands, never three decimals
static THOUSANDS_DOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d{1,3}(\.\d{3})+$").expect("valid regex"));

static ISO_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T\s].*)?$").expect("valid regex"));
static DMY_FOUR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4})(?:[T\s].*)?$").expect("valid regex")
});
static DMY_TWO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{2})(?:\s.*)?$").expect("valid regex")
});
static YMD_SLASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})(?:[T\s].*)?$").expect("valid regex")
});
static YMD_COMPACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").expect("valid regex"));
static SERIAL_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,6}(?:[.,]\d+)?$").expect("valid regex"));

// ==========================================
// Lookup tables
// ==========================================
const TRUE_VALUES: &[&str] = &["sim", "s", "true", "1", "x", "yes", "y", "verdadeiro", "v"];
const FALSE_VALUES: &[&str] = &["nao", "n", "false", "0", "no", "falso", "f", ""];

pub const UF_CODES: &[&str] = &[
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

const UF_NAMES: &[(&str, &str)] = &[
    ("acre", "AC"),
    ("alagoas", "AL"),
    ("amapa", "AP"),
    ("amazonas", "AM"),
    ("bahia", "BA"),
    ("ceara", "CE"),
    ("distrito federal", "DF"),
    ("espirito santo", "ES"),
    ("goias", "GO"),
    ("maranhao", "MA"),
    ("mato grosso", "MT"),
    ("mato grosso do sul", "MS"),
    ("minas gerais", "MG"),
    ("minas", "MG"),
    ("para", "PA"),
    ("paraiba", "PB"),
    ("parana", "PR"),
    ("pernambuco", "PE"),
    ("piaui", "PI"),
    ("rio de janeiro", "RJ"),
    ("rio grande do norte", "RN"),
    ("rio grande do sul", "RS"),
    ("rondonia", "RO"),
    ("roraima", "RR"),
    ("santa catarina", "SC"),
    ("sao paulo", "SP"),
    ("sergipe", "SE"),
    ("tocantins", "TO"),
];

pub const KNOWN_STATUSES: &[&str] = &[
    "pendente",
    "em_andamento",
    "concluido",
    "cancelado",
    "ativo",
    "inativo",
    "em_manutencao",
];

const STATUS_SYNONYMS: &[(&str, &str)] = &[
    ("concluido", "concluido"),
    ("concluida", "concluido"),
    ("conclusao", "concluido"),
    ("finalizado", "concluido"),
    ("finalizada", "concluido"),
    ("entregue", "concluido"),
    ("realizado", "concluido"),
    ("realizada", "concluido"),
    ("feito", "concluido"),
    ("ok", "concluido"),
    ("pendente", "pendente"),
    ("aguardando", "pendente"),
    ("a_fazer", "pendente"),
    ("aberto", "pendente"),
    ("aberta", "pendente"),
    ("agendado", "pendente"),
    ("agendada", "pendente"),
    ("em_andamento", "em_andamento"),
    ("andamento", "em_andamento"),
    ("em_transito", "em_andamento"),
    ("transito", "em_andamento"),
    ("em_rota", "em_andamento"),
    ("em_execucao", "em_andamento"),
    ("cancelado", "cancelado"),
    ("cancelada", "cancelado"),
    ("devolvido", "cancelado"),
    ("devolvida", "cancelado"),
    ("ativo", "ativo"),
    ("ativa", "ativo"),
    ("disponivel", "ativo"),
    ("em_uso", "ativo"),
    ("inativo", "inativo"),
    ("inativa", "inativo"),
    ("vendido", "inativo"),
    ("baixado", "inativo"),
    ("em_manutencao", "em_manutencao"),
    ("manutencao", "em_manutencao"),
    ("oficina", "em_manutencao"),
];

pub const KNOWN_PRODUCTS: &[&str] = &[
    "Diesel S10",
    "Diesel S500",
    "Diesel Comum",
    "Gasolina",
    "Gasolina Aditivada",
    "Etanol",
    "Arla 32",
    "GNV",
];

// Keys are folded, lowercased and stripped of spaces, hyphens, underscores and dots
const PRODUCT_SYNONYMS: &[(&str, &str)] = &[
    ("diesels10", "Diesel S10"),
    ("s10", "Diesel S10"),
    ("oleodiesels10", "Diesel S10"),
    ("diesels500", "Diesel S500"),
    ("s500", "Diesel S500"),
    ("oleodiesels500", "Diesel S500"),
    ("diesel", "Diesel Comum"),
    ("dieselcomum", "Diesel Comum"),
    ("oleodiesel", "Diesel Comum"),
    ("gasolina", "Gasolina"),
    ("gasolinacomum", "Gasolina"),
    ("gasolinaaditivada", "Gasolina Aditivada"),
    ("aditivada", "Gasolina Aditivada"),
    ("etanol", "Etanol"),
    ("alcool", "Etanol"),
    ("arla", "Arla 32"),
    ("arla32", "Arla 32"),
    ("gnv", "GNV"),
    ("gasnatural", "GNV"),
];

// ==========================================
// DataCleaner
// ==========================================
#[derive(Debug, Clone)]
pub struct DataCleaner {
    min_year: i32,
    max_year: i32,
    two_digit_pivot: i32,
    serial_min: f64,
    serial_max: f64,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(&ImportSettings::default())
    }
}

impl DataCleaner {
    pub fn new(settings: &ImportSettings) -> Self {
        Self {
            min_year: settings.date_min_year,
            max_year: settings.date_max_year,
            two_digit_pivot: settings.two_digit_year_pivot,
            serial_min: settings.excel_serial_min,
            serial_max: settings.excel_serial_max,
        }
    }

    fn build_date(&self, year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return None;
        }
        if year < self.min_year || year > self.max_year {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn parse_date_text(&self, raw: &str) -> Option<NaiveDate> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        if let Some(c) = ISO_PREFIX.captures(s) {
            return self.build_date(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?);
        }

        if let Some(c) = DMY_FOUR.captures(s) {
            return self.build_date(c[3].parse().ok()?, c[2].parse().ok()?, c[1].parse().ok()?);
        }

        if let Some(c) = DMY_TWO.captures(s) {
            let short: i32 = c[3].parse().ok()?;
            let year = if short < self.two_digit_pivot {
                2000 + short
            } else {
                1900 + short
            };
            return self.build_date(year, c[2].parse().ok()?, c[1].parse().ok()?);
        }

        if let Some(c) = YMD_SLASH.captures(s) {
            return self.build_date(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?);
        }

        if let Some(c) = YMD_COMPACT.captures(s) {
            return self.build_date(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?);
        }

        if SERIAL_TEXT.is_match(s) {
            let serial: f64 = s.replace(',', ".").parse().ok()?;
            return self.excel_serial_to_date(serial);
        }

        None
    }
}

/// Parse a number written in Brazilian or American convention.
fn parse_localized_number(raw: &str) -> Option<f64> {
    let mut s = raw.trim().replace("R$", "").replace("r$", "").replace('$', "");
    s.retain(|c| !c.is_whitespace());
    if s.is_empty() {
        return None;
    }

    let parenthesized = s.starts_with('(') && s.ends_with(')');
    if parenthesized {
        s = s.trim_start_matches('(').trim_end_matches(')').to_string();
    }

    if THOUSANDS_DOT.is_match(&s) {
        s = s.replace('.', "");
    }

    // already a plain numeral
    if let Ok(value) = s.parse::<f64>() {
        if value.is_finite() {
            return Some(if parenthesized { -value.abs() } else { value });
        }
    }

    let has_dot = s.contains('.');
    let has_comma = s.contains(',');
    let normalized = if has_dot && has_comma {
        let last_dot = s.rfind('.').unwrap_or(0);
        let last_comma = s.rfind(',').unwrap_or(0);
        if last_comma > last_dot {
            // 1.234,56
            s.replace('.', "").replace(',', ".")
        } else {
            // 1,234.56
            s.replace(',', "")
        }
    } else if has_comma {
        if THOUSANDS_COMMA.is_match(&s) {
            s.replace(',', "")
        } else {
            s.replace(',', ".")
        }
    } else {
        s
    };

    let negative = parenthesized || normalized.starts_with('-');
    let numeral: String = normalized
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !numeral.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let value: f64 = numeral.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn status_key(s: &str) -> String {
    fold_accents(&s.trim().to_lowercase())
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn product_key(s: &str) -> String {
    fold_accents(&s.trim().to_lowercase())
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '_' | '.'))
        .collect()
}

pub fn is_valid_uf(code: &str) -> bool {
    UF_CODES.contains(&code)
}

pub fn is_known_status(status: &str) -> bool {
    KNOWN_STATUSES.contains(&status)
}

pub fn is_known_product(product: &str) -> bool {
    KNOWN_PRODUCTS.contains(&product)
}

impl DataCleanerTrait for DataCleaner {
    fn normalize_number(&self, value: &CellValue) -> Option<f64> {
        match value {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => parse_localized_number(s),
            _ => None,
        }
    }

    fn normalize_date(&self, value: &CellValue) -> Option<NaiveDate> {
        match value {
            CellValue::Date(d) => {
                (self.min_year..=self.max_year).contains(&d.year()).then_some(*d)
            }
            CellValue::Number(n) => self.excel_serial_to_date(*n),
            CellValue::Text(s) => self.parse_date_text(s),
            _ => None,
        }
    }

    fn excel_serial_to_date(&self, serial: f64) -> Option<NaiveDate> {
        if !serial.is_finite() || serial <= self.serial_min || serial >= self.serial_max {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        let date = epoch.checked_add_signed(Duration::try_days(serial.floor() as i64)?)?;
        (self.min_year..=self.max_year)
            .contains(&date.year())
            .then_some(date)
    }

    fn normalize_boolean(&self, value: &CellValue) -> Option<bool> {
        match value {
            CellValue::Bool(b) => Some(*b),
            CellValue::Number(n) if *n == 1.0 => Some(true),
            CellValue::Number(n) if *n == 0.0 => Some(false),
            CellValue::Empty => Some(false),
            CellValue::Text(s) => {
                let key = fold_accents(&s.trim().to_lowercase());
                if TRUE_VALUES.contains(&key.as_str()) {
                    Some(true)
                } else if FALSE_VALUES.contains(&key.as_str()) {
                    Some(false)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn normalize_text(&self, value: &CellValue, case: TextCase) -> Option<String> {
        let text = value.as_text()?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match case {
            TextCase::Keep => trimmed.to_string(),
            TextCase::Upper => trimmed.to_uppercase(),
            TextCase::Title => title_case(trimmed),
        })
    }

    fn normalize_placa(&self, value: &CellValue) -> Option<String> {
        let key = plate_key(&value.as_text()?);
        (!key.is_empty()).then_some(key)
    }

    fn normalize_uf(&self, value: &CellValue) -> Option<String> {
        let text = value.as_text()?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let upper = trimmed.to_uppercase();
        if is_valid_uf(&upper) {
            return Some(upper);
        }
        let key = fold_accents(&trimmed.to_lowercase())
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        UF_NAMES
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, code)| code.to_string())
            .or(Some(upper))
    }

    fn normalize_status(&self, value: &CellValue) -> Option<String> {
        let text = value.as_text()?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let key = status_key(trimmed);
        STATUS_SYNONYMS
            .iter()
            .find(|(from, _)| *from == key)
            .map(|(_, to)| to.to_string())
            .or_else(|| Some(trimmed.to_lowercase()))
    }

    fn normalize_produto(&self, value: &CellValue) -> Option<String> {
        let text = value.as_text()?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let key = product_key(trimmed);
        PRODUCT_SYNONYMS
            .iter()
            .find(|(from, _)| *from == key)
            .map(|(_, to)| to.to_string())
            .or_else(|| Some(trimmed.to_string()))
    }

    fn normalize_digits(&self, value: &CellValue) -> Option<String> {
        let digits: String = value
            .as_text()?
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        (!digits.is_empty()).then_some(digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> DataCleaner {
        DataCleaner::default()
    }

    fn text(s: &str) -> CellValue {
        CellValue::text(s)
    }

    // ===== numbers =====

    #[test]
    fn test_number_brazilian_and_american() {
        let c = cleaner();
        assert_eq!(c.normalize_number(&text("1.234,56")), Some(1234.56));
        assert_eq!(c.normalize_number(&text("1,234.56")), Some(1234.56));
        assert_eq!(c.normalize_number(&text("R$ 297,45")), Some(297.45));
        assert_eq!(c.normalize_number(&text("$1,000.00")), Some(1000.0));
        assert_eq!(c.normalize_number(&text("1.234.567")), Some(1234567.0));
        assert_eq!(c.normalize_number(&text("1.234.567,8")), Some(1234567.8));
        assert_eq!(c.normalize_number(&text("5,899")), Some(5.899));
    }

    #[test]
    fn test_number_signs_and_noise() {
        let c = cleaner();
        assert_eq!(c.normalize_number(&text("-42,5")), Some(-42.5));
        assert_eq!(c.normalize_number(&text("R$ -10,00")), Some(-10.0));
        assert_eq!(c.normalize_number(&text("(15,00)")), Some(-15.0));
        assert_eq!(c.normalize_number(&text("15%")), Some(15.0));
        assert_eq!(c.normalize_number(&text("R$\u{a0}1.000,00")), Some(1000.0));
    }

    #[test]
    fn test_single_dot_group_is_thousands() {
        let c = cleaner();
        assert_eq!(c.normalize_number(&text("R$ 1.500")), Some(1500.0));
        assert_eq!(c.normalize_number(&text("1.500")), Some(1500.0));
        assert_eq!(c.normalize_number(&text("1.500,00")), Some(1500.0));
        assert_eq!(c.normalize_number(&text("120.500")), Some(120500.0));
        assert_eq!(c.normalize_number(&text("-2.300")), Some(-2300.0));
        // not a thousands group
        assert_eq!(c.normalize_number(&text("1.5")), Some(1.5));
        assert_eq!(c.normalize_number(&text("1234.5678")), Some(1234.5678));
    }

    #[test]
    fn test_number_unparseable_is_none() {
        let c = cleaner();
        assert_eq!(c.normalize_number(&text("abc")), None);
        assert_eq!(c.normalize_number(&text("")), None);
        assert_eq!(c.normalize_number(&text("NaN")), None);
        assert_eq!(c.normalize_number(&text("1,2,3")), None);
        assert_eq!(c.normalize_number(&CellValue::Empty), None);
        assert_eq!(c.normalize_number(&CellValue::Number(f64::NAN)), None);
    }

    #[test]
    fn test_number_passthrough_and_round_trip() {
        let c = cleaner();
        assert_eq!(c.normalize_number(&CellValue::Number(12.5)), Some(12.5));

        for x in [0.0, 1.25, 1234.56, -7.5, 1_000_000.0, 0.001, 297.45] {
            let first = c.normalize_number(&CellValue::Number(x)).unwrap();
            let again = c.normalize_number(&text(&first.to_string())).unwrap();
            assert_eq!(first, again, "round trip failed for {}", x);
        }
    }

    // ===== dates =====

    #[test]
    fn test_date_day_first() {
        let c = cleaner();
        let expected = NaiveDate::from_ymd_opt(2024, 12, 1);
        assert_eq!(c.normalize_date(&text("01/12/2024")), expected);
        assert_eq!(c.normalize_date(&text("01-12-2024")), expected);
        assert_eq!(c.normalize_date(&text("1/12/2024 08:30")), expected);
        assert_eq!(c.normalize_date(&text("01.12.24")), expected);
    }

    #[test]
    fn test_date_two_digit_pivot() {
        let c = cleaner();
        assert_eq!(
            c.normalize_date(&text("15.06.49")),
            NaiveDate::from_ymd_opt(2049, 6, 15)
        );
        assert_eq!(
            c.normalize_date(&text("15.06.50")),
            NaiveDate::from_ymd_opt(1950, 6, 15)
        );
    }

    #[test]
    fn test_date_iso_prefix_passes_date_part() {
        let c = cleaner();
        assert_eq!(
            c.normalize_date(&text("2024-12-01T03:00:00.000Z")),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
        assert_eq!(
            c.normalize_date(&text("2024-12-01")),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
    }

    #[test]
    fn test_date_enumerated_fallbacks() {
        let c = cleaner();
        assert_eq!(
            c.normalize_date(&text("2024/12/01")),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
        assert_eq!(
            c.normalize_date(&text("20241201")),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
    }

    #[test]
    fn test_date_rejects_out_of_range() {
        let c = cleaner();
        assert_eq!(c.normalize_date(&text("32/01/2024")), None);
        assert_eq!(c.normalize_date(&text("01/13/2024")), None);
        assert_eq!(c.normalize_date(&text("31/02/2024")), None);
        assert_eq!(c.normalize_date(&text("01/01/1850")), None);
        assert_eq!(c.normalize_date(&text("amanhã")), None);
        assert_eq!(c.normalize_date(&CellValue::Empty), None);
    }

    #[test]
    fn test_date_round_trip_has_no_shift() {
        let c = cleaner();
        let first = c.normalize_date(&text("28/02/2023")).unwrap();
        let rendered = first.format("%Y-%m-%d").to_string();
        assert_eq!(rendered, "2023-02-28");
        assert_eq!(c.normalize_date(&text(&rendered)), Some(first));
    }

    #[test]
    fn test_excel_serial_huge_window_does_not_overflow() {
        let settings = ImportSettings {
            excel_serial_max: 1e300,
            ..ImportSettings::default()
        };
        let c = DataCleaner::new(&settings);
        assert_eq!(c.excel_serial_to_date(1e200), None);
        assert_eq!(c.excel_serial_to_date(9.3e18), None);
        assert_eq!(
            c.excel_serial_to_date(45627.0),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
    }

    #[test]
    fn test_excel_serial() {
        let c = cleaner();
        // 45627 = 2024-12-01
        assert_eq!(
            c.excel_serial_to_date(45627.0),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
        assert_eq!(
            c.excel_serial_to_date(45627.75),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
        assert_eq!(c.excel_serial_to_date(1.0), None);
        assert_eq!(c.excel_serial_to_date(100000.0), None);
        // year 2173 is outside the window
        assert_eq!(c.excel_serial_to_date(99999.0), None);
        assert_eq!(
            c.normalize_date(&CellValue::Number(45627.0)),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
        assert_eq!(
            c.normalize_date(&text("45627")),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
    }

    // ===== booleans =====

    #[test]
    fn test_boolean_sets() {
        let c = cleaner();
        for t in ["Sim", "S", "true", "1", "x", "YES", "y", "Verdadeiro", "v"] {
            assert_eq!(c.normalize_boolean(&text(t)), Some(true), "{}", t);
        }
        for f in ["não", "NAO", "n", "false", "0", "no", "falso", "F", ""] {
            assert_eq!(c.normalize_boolean(&text(f)), Some(false), "{}", f);
        }
        assert_eq!(c.normalize_boolean(&text("talvez")), None);
        assert_eq!(c.normalize_boolean(&CellValue::Number(1.0)), Some(true));
        assert_eq!(c.normalize_boolean(&CellValue::Number(2.0)), None);
        assert_eq!(c.normalize_boolean(&CellValue::Empty), Some(false));
        assert_eq!(c.normalize_boolean(&text("   ")), Some(false));
    }

    // ===== text =====

    #[test]
    fn test_text_cases() {
        let c = cleaner();
        assert_eq!(
            c.normalize_text(&text("  joão da SILVA "), TextCase::Title),
            Some("João Da Silva".to_string())
        );
        assert_eq!(
            c.normalize_text(&text(" abc "), TextCase::Upper),
            Some("ABC".to_string())
        );
        assert_eq!(
            c.normalize_text(&text(" keep Me "), TextCase::Keep),
            Some("keep Me".to_string())
        );
        assert_eq!(c.normalize_text(&text("   "), TextCase::Keep), None);
        assert_eq!(
            c.normalize_text(&CellValue::Number(5134.0), TextCase::Keep),
            Some("5134".to_string())
        );
    }

    #[test]
    fn test_placa_formats() {
        let c = cleaner();
        assert_eq!(c.normalize_placa(&text("abc-1234")), Some("ABC1234".to_string()));
        assert_eq!(c.normalize_placa(&text(" abc 1d23 ")), Some("ABC1D23".to_string()));
        assert_eq!(c.normalize_placa(&text(" - ")), None);
    }

    // ===== enums =====

    #[test]
    fn test_uf() {
        let c = cleaner();
        assert_eq!(c.normalize_uf(&text("sp")), Some("SP".to_string()));
        assert_eq!(c.normalize_uf(&text("São Paulo")), Some("SP".to_string()));
        assert_eq!(c.normalize_uf(&text("minas  gerais")), Some("MG".to_string()));
        assert_eq!(c.normalize_uf(&text("xx")), Some("XX".to_string()));
        assert_eq!(c.normalize_uf(&text("")), None);
    }

    #[test]
    fn test_status() {
        let c = cleaner();
        assert_eq!(c.normalize_status(&text("Concluído")), Some("concluido".to_string()));
        assert_eq!(c.normalize_status(&text("FINALIZADA")), Some("concluido".to_string()));
        assert_eq!(c.normalize_status(&text("Em trânsito")), Some("em_andamento".to_string()));
        assert_eq!(c.normalize_status(&text("Em-Rota")), Some("em_andamento".to_string()));
        assert_eq!(c.normalize_status(&text(" Perdido ")), Some("perdido".to_string()));
    }

    #[test]
    fn test_produto() {
        let c = cleaner();
        for raw in ["diesel s-10", "S10", "Diesel S10", "DIESEL_S10", "s-10"] {
            assert_eq!(
                c.normalize_produto(&text(raw)),
                Some("Diesel S10".to_string()),
                "{}",
                raw
            );
        }
        assert_eq!(c.normalize_produto(&text("Álcool")), Some("Etanol".to_string()));
        assert_eq!(c.normalize_produto(&text(" Querosene ")), Some("Querosene".to_string()));
        assert!(is_known_product("Arla 32"));
        assert!(!is_known_product("Querosene"));
    }

    #[test]
    fn test_digits() {
        let c = cleaner();
        assert_eq!(
            c.normalize_digits(&text("123.456.789-09")),
            Some("12345678909".to_string())
        );
        assert_eq!(c.normalize_digits(&text("n/a")), None);
    }
}
