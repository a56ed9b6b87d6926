// ==========================================
// Fleet Import - Header Normalizer
// ==========================================
// Raw header → token → synonym collapse → per-import-type canonical field
// Unknown tokens pass through unchanged so unexpected columns survive
// ==========================================

use crate::domain::types::ImportType;
use once_cell::sync::Lazy;
use regex::Regex;

static ASSEMBLER_HEADER: Lazy<Regex> = Lazy::new(|| {
    // trailing `_N` is the parser's suffix for a repeated header
    Regex::new(r"^(?:montador|montadores|assembler)_*(?:([1-9])(?:_\d+)?)?$")
        .expect("valid assembler regex")
});

// ==========================================
// Accent folding
// ==========================================

/// Map a Latin letter with diacritics to its base letter.
///
/// Equivalent to NFD decomposition followed by dropping U+0300–U+036F
/// for the Latin-1 Supplement and the Latin Extended-A letters used in
/// Portuguese and Spanish.
fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => 'A',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'Ç' | 'Ć' | 'Č' => 'C',
        'ç' | 'ć' | 'č' => 'c',
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => 'E',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Į' => 'I',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
        'Ñ' | 'Ń' | 'Ň' => 'N',
        'ñ' | 'ń' | 'ň' => 'n',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ō' | 'Ő' => 'O',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' | 'ő' => 'o',
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' => 'U',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
        'Ý' | 'Ÿ' => 'Y',
        'ý' | 'ÿ' => 'y',
        // combining diacritical marks left over from decomposed input
        '\u{0300}'..='\u{036F}' => return None,
        other => other,
    };
    Some(folded)
}

/// Strip diacritics from every character of `s`.
pub fn fold_accents(s: &str) -> String {
    s.chars().filter_map(fold_char).collect()
}

// ==========================================
// Token normalization
// ==========================================

/// Normalize a human-written header into a token.
///
/// trim → lowercase → strip diacritics → whitespace runs to `_` →
/// drop anything outside `[a-z0-9_]`. Total over any input.
pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let folded = fold_accents(&lowered);

    let mut token = String::with_capacity(folded.len());
    let mut in_whitespace = false;
    for c in folded.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                token.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        token.push(c);
    }

    token
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

/// Collapse repeated underscores and trim them from both ends.
fn compact_token(token: &str) -> String {
    token
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

// ==========================================
// Global synonym table
// ==========================================
// Spelling variants written by different people over the years
const HEADER_SYNONYMS: &[(&str, &str)] = &[
    // dates
    ("data_de_saida", "data_saida"),
    ("data_da_saida", "data_saida"),
    ("datasaida", "data_saida"),
    ("dt_saida", "data_saida"),
    ("data_de_montagem", "data_montagem"),
    ("data_da_montagem", "data_montagem"),
    ("datamontagem", "data_montagem"),
    ("dt_montagem", "data_montagem"),
    ("data_de_abastecimento", "data_abastecimento"),
    ("data_da_manutencao", "data_manutencao"),
    ("data_de_manutencao", "data_manutencao"),
    // invoice / order
    ("nota_fiscal", "nf"),
    ("numero_nf", "nf"),
    ("numero_da_nf", "nf"),
    ("numero_da_nota", "nf"),
    ("num_nf", "nf"),
    ("n_nf", "nf"),
    ("no_nf", "nf"),
    ("nfe", "nf"),
    ("n_nota", "nf"),
    ("pvfoco", "pv_foco"),
    ("pv_e_foco", "pv_foco"),
    // money
    ("valor_r", "valor"),
    ("valor_rs", "valor"),
    ("vlr", "valor"),
    ("vl", "valor"),
    ("valortotal", "valor_total"),
    ("valor_total_r", "valor_total"),
    ("vlr_total", "valor_total"),
    ("valor_unit", "valor_unitario"),
    ("vlr_unitario", "valor_unitario"),
    ("vlr_unit", "valor_unitario"),
    ("valor_litro", "valor_unitario"),
    ("preco_litro", "valor_unitario"),
    ("preco_por_litro", "valor_unitario"),
    ("preco_unitario", "valor_unitario"),
    ("custo_entrega", "gasto_entrega"),
    ("custos_entrega", "gasto_entrega"),
    ("despesa_entrega", "gasto_entrega"),
    ("despesas_entrega", "gasto_entrega"),
    ("gastos_entrega", "gasto_entrega"),
    ("gasto_com_entrega", "gasto_entrega"),
    ("custo_montagem", "gasto_montagem"),
    ("custos_montagem", "gasto_montagem"),
    ("despesa_montagem", "gasto_montagem"),
    ("despesas_montagem", "gasto_montagem"),
    ("gastos_montagem", "gasto_montagem"),
    ("gasto_com_montagem", "gasto_montagem"),
    ("percentual", "percentual_gastos"),
    ("perc_gastos", "percentual_gastos"),
    ("percentual_de_gastos", "percentual_gastos"),
    ("_gastos", "percentual_gastos"),
    // quantities
    ("qtd_litros", "litros"),
    ("qtde_litros", "litros"),
    ("quantidade_litros", "litros"),
    ("quantidade_de_litros", "litros"),
    ("litragem", "litros"),
    ("lts", "litros"),
    ("quilometragem", "km"),
    ("odometro", "km"),
    ("hodometro", "km"),
    // vehicle / people
    ("placa_do_veiculo", "placa"),
    ("placa_veiculo", "placa"),
    ("placas", "placa"),
    ("nome_do_motorista", "motorista"),
    ("nome_motorista", "motorista"),
    ("condutor", "motorista"),
    ("tipo_de_transporte", "tipo_transporte"),
    ("modalidade_transporte", "tipo_transporte"),
    ("telefone_celular", "telefone"),
    ("celular", "telefone"),
    ("fone", "telefone"),
    ("tel", "telefone"),
    ("categoria_da_cnh", "categoria_cnh"),
    ("cat_cnh", "categoria_cnh"),
    ("validade_da_cnh", "validade_cnh"),
    ("vencimento_cnh", "validade_cnh"),
    ("vencimento_da_cnh", "validade_cnh"),
    ("venc_cnh", "validade_cnh"),
    ("ano_de_fabricacao", "ano"),
    ("ano_fabricacao", "ano"),
    ("ano_modelo", "ano"),
    ("anofab", "ano"),
    ("situacao", "status"),
];

// ==========================================
// Per-import-type canonical tables
// ==========================================
const VEHICLE_FIELDS: &[(&str, &str)] = &[
    ("fabricante", "marca"),
    ("montadora", "marca"),
    ("tipo_veiculo", "tipo"),
    ("tipo_de_veiculo", "tipo"),
    ("categoria", "tipo"),
    ("produto", "combustivel"),
    ("tipo_combustivel", "combustivel"),
    ("capacidade", "capacidade_kg"),
    ("capacidade_de_carga", "capacidade_kg"),
    ("km", "km_atual"),
];

const DRIVER_FIELDS: &[(&str, &str)] = &[
    ("motorista", "nome"),
    ("nome_completo", "nome"),
    ("numero_cnh", "cnh"),
    ("registro_cnh", "cnh"),
    ("categoria", "categoria_cnh"),
    ("validade", "validade_cnh"),
];

const FUELING_FIELDS: &[(&str, &str)] = &[
    ("data_abastecimento", "data"),
    ("veiculo", "placa"),
    ("fornecedor", "posto"),
    ("estabelecimento", "posto"),
    ("combustivel", "produto"),
    ("quantidade", "litros"),
    ("preco", "valor_unitario"),
    ("total", "valor_total"),
    ("valor", "valor_total"),
    ("estado", "uf"),
];

const MAINTENANCE_FIELDS: &[(&str, &str)] = &[
    ("data_manutencao", "data"),
    ("data_servico", "data"),
    ("veiculo", "placa"),
    ("tipo_manutencao", "tipo"),
    ("tipo_de_manutencao", "tipo"),
    ("servico", "descricao"),
    ("servicos", "descricao"),
    ("descricao_servico", "descricao"),
    ("fornecedor", "oficina"),
    ("prestador", "oficina"),
    ("custo", "valor"),
    ("valor_total", "valor"),
];

const DELIVERY_FIELDS: &[(&str, &str)] = &[
    ("pv", "pv_foco"),
    ("foco", "pv_foco"),
    ("nome_cliente", "cliente"),
    ("destinatario", "cliente"),
    ("cidade_destino", "cidade"),
    ("municipio", "cidade"),
    ("valor_nf", "valor"),
    ("valor_da_nota", "valor"),
    ("valor_total", "valor"),
];

const ASSEMBLER_FIELDS: &[(&str, &str)] = &[
    ("montador", "nome"),
    ("nome_completo", "nome"),
    ("nome_do_montador", "nome"),
];

fn lookup(table: &'static [(&'static str, &'static str)], token: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(from, _)| *from == token)
        .map(|(_, to)| *to)
}

/// Collapse a token through the global synonym table.
pub fn resolve_synonym(token: &str) -> String {
    if let Some(hit) = lookup(HEADER_SYNONYMS, token) {
        return hit.to_string();
    }
    let compact = compact_token(token);
    lookup(HEADER_SYNONYMS, &compact)
        .map(str::to_string)
        .unwrap_or(compact)
}

fn type_table(import_type: ImportType) -> &'static [(&'static str, &'static str)] {
    match import_type {
        ImportType::Vehicles => VEHICLE_FIELDS,
        ImportType::Drivers => DRIVER_FIELDS,
        ImportType::Fuelings => FUELING_FIELDS,
        ImportType::Maintenances => MAINTENANCE_FIELDS,
        ImportType::Deliveries => DELIVERY_FIELDS,
        ImportType::Assemblers => ASSEMBLER_FIELDS,
    }
}

/// Canonical field name for a raw header under the given import type.
pub fn canonical_header(import_type: ImportType, raw: &str) -> String {
    let token = resolve_synonym(&normalize_header(raw));

    if import_type == ImportType::Deliveries {
        if let Some(slot) = assembler_slot(&token) {
            return format!("montador_{}", slot);
        }
    }

    lookup(type_table(import_type), &token)
        .map(str::to_string)
        .unwrap_or(token)
}

/// Slot number (1-based) when a token names an "assembler N" column.
///
/// A bare `montador` column counts as slot 1.
pub fn assembler_slot(token: &str) -> Option<usize> {
    let caps = ASSEMBLER_HEADER.captures(token)?;
    match caps.get(1) {
        Some(n) => n.as_str().parse().ok(),
        None => Some(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header_steps() {
        assert_eq!(normalize_header("  Data de Saída  "), "data_de_saida");
        assert_eq!(normalize_header("Valor (R$)"), "valor_r");
        assert_eq!(normalize_header("MONTADOR   1"), "montador_1");
        assert_eq!(normalize_header("Nº NF"), "n_nf");
        assert_eq!(normalize_header("Ação\tTomada"), "acao_tomada");
    }

    #[test]
    fn test_normalize_header_empty() {
        assert_eq!(normalize_header(""), "");
        assert_eq!(normalize_header("   "), "");
        assert_eq!(normalize_header("%"), "");
    }

    #[test]
    fn test_decomposed_input_is_folded() {
        // "Saída" written with a combining acute accent
        assert_eq!(normalize_header("Sai\u{0301}da"), "saida");
    }

    #[test]
    fn test_synonyms_collapse() {
        assert_eq!(resolve_synonym("data_de_saida"), "data_saida");
        assert_eq!(resolve_synonym("datasaida"), "data_saida");
        assert_eq!(resolve_synonym("data_saida"), "data_saida");
        assert_eq!(resolve_synonym("data__saida"), "data_saida");
        assert_eq!(resolve_synonym("coluna_nova"), "coluna_nova");
    }

    #[test]
    fn test_canonical_header_per_type() {
        assert_eq!(canonical_header(ImportType::Fuelings, "Total"), "valor_total");
        assert_eq!(canonical_header(ImportType::Fuelings, "Preço por Litro"), "valor_unitario");
        assert_eq!(canonical_header(ImportType::Vehicles, "Fabricante"), "marca");
        assert_eq!(canonical_header(ImportType::Vehicles, "KM"), "km_atual");
        assert_eq!(canonical_header(ImportType::Drivers, "Motorista"), "nome");
        assert_eq!(canonical_header(ImportType::Deliveries, "Montador 3"), "montador_3");
        assert_eq!(canonical_header(ImportType::Deliveries, "Montador"), "montador_1");
        assert_eq!(canonical_header(ImportType::Assemblers, "Montador"), "nome");
        assert_eq!(canonical_header(ImportType::Deliveries, "Nota Fiscal"), "nf");
    }

    #[test]
    fn test_unknown_header_passes_through() {
        assert_eq!(canonical_header(ImportType::Vehicles, "Cor Predominante"), "cor_predominante");
    }

    #[test]
    fn test_assembler_slot() {
        assert_eq!(assembler_slot("montador_7"), Some(7));
        assert_eq!(assembler_slot("montador7"), Some(7));
        assert_eq!(assembler_slot("assembler_2"), Some(2));
        assert_eq!(assembler_slot("montador"), Some(1));
        assert_eq!(assembler_slot("montador_1_2"), Some(1));
        assert_eq!(assembler_slot("montador_3_2"), Some(3));
        assert_eq!(assembler_slot("montador_12"), None);
        assert_eq!(assembler_slot("data_montagem"), None);
        assert_eq!(assembler_slot("gasto_montagem"), None);
    }
}
