// ==========================================
// Fleet Import - Delivery Row Processor
// ==========================================
// Delivery sheets carry three legacy quirks:
// - PV and invoice number glued into the first column
// - up to seven "montador N" columns for two storage slots
// - the expense percentage sometimes left for us to compute
// Everything here is pure; the mapper calls it once per sheet or row.
// ==========================================

use crate::importer::field_lookup::FieldLookup;
use crate::importer::header_normalizer::assembler_slot;
use once_cell::sync::Lazy;
use regex::Regex;

static AGLUTINATED_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s+(.*)$").expect("valid aglutinated regex"));

// ==========================================
// Flexible lookups (exact candidates, then substring sets)
// ==========================================
pub const UF_LOOKUP: FieldLookup = FieldLookup::new(
    "uf",
    &["uf", "estado", "uf_destino", "estado_destino"],
    &[&["uf"], &["estado"]],
);

pub const DATA_SAIDA_LOOKUP: FieldLookup = FieldLookup::new(
    "data_saida",
    &["data_saida", "saida", "data_envio", "data_entrega"],
    &[&["saida"]],
);

pub const DATA_MONTAGEM_LOOKUP: FieldLookup =
    FieldLookup::new("data_montagem", &["data_montagem"], &[&["data", "mont"]]);

pub const VEICULO_LOOKUP: FieldLookup = FieldLookup::new(
    "veiculo",
    &["veiculo", "placa", "carro", "caminhao"],
    &[&["veic"], &["placa"]],
);

pub const TIPO_TRANSPORTE_LOOKUP: FieldLookup = FieldLookup::new(
    "tipo_transporte",
    &["tipo_transporte", "transporte", "modalidade"],
    &[&["transp"]],
);

pub const ERROS_LOOKUP: FieldLookup = FieldLookup::new(
    "erros",
    &["erros", "erro", "observacoes", "observacao", "obs", "ocorrencias"],
    &[&["erro"], &["obs"], &["ocorr"]],
);

pub const PV_FOCO_LOOKUP: FieldLookup = FieldLookup::exact("pv_foco", &["pv_foco", "pv", "foco"]);
pub const NF_LOOKUP: FieldLookup = FieldLookup::exact("nf", &["nf", "nota"]);
pub const CLIENTE_LOOKUP: FieldLookup = FieldLookup::exact("cliente", &["cliente", "nome_cliente"]);
pub const CIDADE_LOOKUP: FieldLookup = FieldLookup::exact("cidade", &["cidade", "municipio"]);
pub const MOTORISTA_LOOKUP: FieldLookup =
    FieldLookup::exact("motorista", &["motorista", "entregador"]);
pub const VALOR_LOOKUP: FieldLookup = FieldLookup::exact("valor", &["valor", "valor_venda"]);
pub const GASTO_ENTREGA_LOOKUP: FieldLookup =
    FieldLookup::exact("gasto_entrega", &["gasto_entrega", "frete"]);
pub const GASTO_MONTAGEM_LOOKUP: FieldLookup =
    FieldLookup::exact("gasto_montagem", &["gasto_montagem"]);
pub const PERCENTUAL_LOOKUP: FieldLookup =
    FieldLookup::exact("percentual_gastos", &["percentual_gastos", "percentual_gasto"]);
pub const STATUS_LOOKUP: FieldLookup = FieldLookup::exact("status", &["status"]);

// ==========================================
// Aglutinated PV + NF column
// ==========================================

fn is_invoice_header(header: &str) -> bool {
    header == "nf"
        || header == "nota"
        || header.starts_with("nf_")
        || header.contains("nota_fiscal")
        || header == "numero_nf"
}

/// Sheet-level check, done once before any row.
///
/// Returns the first header when it looks like a combined PV + invoice
/// column and no other column holds the invoice number on its own.
pub fn detect_aglutinated(headers: &[String]) -> Option<&str> {
    let (first, rest) = headers.split_first()?;
    let looks_combined = first.contains("pv") || first.contains("foco");
    if looks_combined && !rest.iter().any(|h| is_invoice_header(h)) {
        Some(first.as_str())
    } else {
        None
    }
}

/// Result of splitting one aglutinated cell
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AglutinatedSplit {
    pub pv_foco: Option<String>,
    pub nf: Option<String>,
    pub error: Option<String>,
}

/// Split `"5134 DECLARAÇÃO"` into PV `5134` and invoice `DECLARAÇÃO`.
///
/// A value that does not start with digits followed by whitespace
/// leaves both fields empty and reports the offending value.
pub fn parse_aglutinated_column(value: &str) -> AglutinatedSplit {
    let trimmed = value.trim();
    match AGLUTINATED_VALUE.captures(trimmed) {
        Some(caps) => {
            let nf = caps[2].trim();
            AglutinatedSplit {
                pv_foco: Some(caps[1].to_string()),
                nf: (!nf.is_empty()).then(|| nf.to_string()),
                error: None,
            }
        }
        None => AglutinatedSplit {
            pv_foco: None,
            nf: None,
            error: Some(format!(
                "Could not split PV/NF from \"{}\" (expected digits, a space, then the invoice)",
                trimmed
            )),
        },
    }
}

// ==========================================
// Assembler folding
// ==========================================

/// Assembler columns in sheet order, at most `max_columns`.
pub fn assembler_columns(headers: &[String], max_columns: usize) -> Vec<String> {
    headers
        .iter()
        .filter(|h| assembler_slot(h).is_some())
        .take(max_columns)
        .cloned()
        .collect()
}

/// Two storage slots plus whatever did not fit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssemblerFold {
    pub assembler_1: Option<String>,
    pub assembler_2: Option<String>,
    pub additional: Vec<String>,
}

impl AssemblerFold {
    /// Human-readable note for the assemblers beyond the second.
    pub fn note(&self) -> Option<String> {
        if self.additional.is_empty() {
            None
        } else {
            Some(format!("Additional assemblers: {}", self.additional.join(", ")))
        }
    }

    /// Append the note to an existing free-text field.
    pub fn append_note_to(&self, erros: Option<String>) -> Option<String> {
        match (erros, self.note()) {
            (Some(existing), Some(note)) if !existing.trim().is_empty() => {
                Some(format!("{}; {}", existing.trim(), note))
            }
            (_, Some(note)) => Some(note),
            (existing, None) => existing,
        }
    }
}

/// Compact non-empty names, left to right, into the two slots.
pub fn fold_assemblers<I, S>(values: I) -> AssemblerFold
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut names = values
        .into_iter()
        .flatten()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty());

    AssemblerFold {
        assembler_1: names.next(),
        assembler_2: names.next(),
        additional: names.collect(),
    }
}

// ==========================================
// Derived expense percentage
// ==========================================

/// Explicit value wins; otherwise expenses over value, never against a
/// missing or zero denominator.
pub fn derive_percentage(
    explicit: Option<f64>,
    valor: Option<f64>,
    gasto_entrega: Option<f64>,
    gasto_montagem: Option<f64>,
) -> Option<f64> {
    if explicit.is_some() {
        return explicit;
    }
    let valor = valor.filter(|v| *v != 0.0)?;
    let expenses = gasto_entrega.unwrap_or(0.0) + gasto_montagem.unwrap_or(0.0);
    Some(expenses * 100.0 / valor)
}
