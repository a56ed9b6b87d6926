// ==========================================
// Fleet Import - CSV Templates
// ==========================================
// One downloadable template per import type: UTF-8 BOM, `;` delimiter
// (what Excel expects under a Brazilian locale), header row plus two
// example rows. Every template re-imports through the parser.
// ==========================================

use crate::domain::types::ImportType;
use crate::importer::error::{ImportError, ImportResult};
use csv::WriterBuilder;

const BOM: &str = "\u{feff}";

/// Header row written for each import type
pub fn template_headers(import_type: ImportType) -> &'static [&'static str] {
    match import_type {
        ImportType::Vehicles => &[
            "Placa",
            "Marca",
            "Modelo",
            "Ano",
            "Tipo",
            "Combustível",
            "Renavam",
            "Capacidade (kg)",
            "KM Atual",
            "Status",
            "Ativo",
        ],
        ImportType::Drivers => &[
            "Nome",
            "CPF",
            "CNH",
            "Categoria CNH",
            "Validade CNH",
            "Telefone",
            "Ativo",
        ],
        ImportType::Deliveries => &[
            "PV Foco",
            "NF",
            "Cliente",
            "Cidade",
            "UF",
            "Data Saída",
            "Data Montagem",
            "Motorista",
            "Veículo",
            "Tipo Transporte",
            "Valor",
            "Gasto Entrega",
            "Gasto Montagem",
            "% Gastos",
            "Montador 1",
            "Montador 2",
            "Status",
            "Erros",
        ],
        ImportType::Fuelings => &[
            "Data",
            "Placa",
            "Motorista",
            "Posto",
            "Produto",
            "Litros",
            "Valor Unitário",
            "Valor Total",
            "KM",
            "Cidade",
            "UF",
        ],
        ImportType::Maintenances => &[
            "Data",
            "Placa",
            "Tipo",
            "Descrição",
            "Oficina",
            "Valor",
            "KM",
            "Status",
        ],
        ImportType::Assemblers => &["Nome", "CPF", "Telefone", "Ativo"],
    }
}

fn example_rows(import_type: ImportType) -> &'static [&'static [&'static str]] {
    match import_type {
        ImportType::Vehicles => &[
            &[
                "ABC1234", "Volvo", "FH 540", "2021", "Caminhão", "Diesel S10", "12345678901",
                "25000", "120500", "ativo", "Sim",
            ],
            &[
                "BRA2E19", "Mercedes-Benz", "Accelo 1016", "2019", "Caminhão", "Diesel S10",
                "98765432109", "5000", "87300", "em_manutencao", "Sim",
            ],
        ],
        ImportType::Drivers => &[
            &[
                "João da Silva", "123.456.789-09", "01234567890", "E", "15/08/2027",
                "(11) 98765-4321", "Sim",
            ],
            &[
                "Maria Souza", "987.654.321-00", "09876543210", "D", "30/01/2026",
                "(21) 91234-5678", "Sim",
            ],
        ],
        ImportType::Deliveries => &[
            &[
                "5134", "NF-1001", "Loja Centro", "Campinas", "SP", "01/12/2024", "02/12/2024",
                "João da Silva", "ABC1234", "Próprio", "1.000,00", "100,00", "50,00", "", "Carlos",
                "Pedro", "concluido", "",
            ],
            &[
                "5135", "NF-1002", "Móveis Sul", "Curitiba", "PR", "03/12/2024", "",
                "Maria Souza", "BRA2E19", "Terceirizado", "2.500,00", "180,00", "", "", "", "",
                "pendente", "Cliente ausente",
            ],
        ],
        ImportType::Fuelings => &[
            &[
                "01/12/2024", "ABC1234", "João da Silva", "Posto Rodovia", "Diesel S10", "150,5",
                "5,89", "886,45", "120650", "Campinas", "SP",
            ],
            &[
                "02/12/2024", "BRA2E19", "Maria Souza", "Posto Central", "Arla 32", "20",
                "3,50", "70,00", "87410", "Curitiba", "PR",
            ],
        ],
        ImportType::Maintenances => &[
            &[
                "05/11/2024", "ABC1234", "Preventiva", "Troca de óleo e filtros",
                "Oficina Diesel Ltda", "1.250,00", "118000", "concluido",
            ],
            &[
                "20/11/2024", "BRA2E19", "Corretiva", "Substituição da embreagem",
                "Auto Center Sul", "3.480,90", "86950", "em_andamento",
            ],
        ],
        ImportType::Assemblers => &[
            &["Carlos Pereira", "111.444.777-35", "(11) 97777-1111", "Sim"],
            &["Pedro Santos", "222.555.888-46", "(19) 96666-2222", "Sim"],
        ],
    }
}

/// Build the CSV template for an import type.
pub fn generate_template(import_type: ImportType) -> ImportResult<String> {
    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record(template_headers(import_type))?;
    for row in example_rows(import_type) {
        writer.write_record(*row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::InternalError(e.to_string()))?;
    let body = String::from_utf8(bytes).map_err(|e| ImportError::InternalError(e.to_string()))?;

    Ok(format!("{}{}", BOM, body))
}

/// Suggested download name, e.g. `modelo_veiculos.csv`
pub fn template_file_name(import_type: ImportType) -> String {
    let label = match import_type {
        ImportType::Vehicles => "veiculos",
        ImportType::Drivers => "motoristas",
        ImportType::Deliveries => "entregas",
        ImportType::Fuelings => "abastecimentos",
        ImportType::Maintenances => "manutencoes",
        ImportType::Assemblers => "montadores",
    };
    format!("modelo_{}.csv", label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::header_normalizer::canonical_header;

    #[test]
    fn test_template_starts_with_bom_and_header() {
        let csv = generate_template(ImportType::Vehicles).unwrap();
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv.contains("Placa;Marca;Modelo"));
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_rows_match_header_width() {
        for import_type in ImportType::ALL {
            let width = template_headers(import_type).len();
            for row in example_rows(import_type) {
                assert_eq!(row.len(), width, "{}", import_type);
            }
        }
    }

    #[test]
    fn test_headers_are_canonical_fields() {
        let delivery: Vec<String> = template_headers(ImportType::Deliveries)
            .iter()
            .map(|h| canonical_header(ImportType::Deliveries, h))
            .collect();
        assert_eq!(delivery[0], "pv_foco");
        assert_eq!(delivery[5], "data_saida");
        assert_eq!(delivery[13], "percentual_gastos");
        assert_eq!(delivery[14], "montador_1");

        let fueling: Vec<String> = template_headers(ImportType::Fuelings)
            .iter()
            .map(|h| canonical_header(ImportType::Fuelings, h))
            .collect();
        assert_eq!(fueling[6], "valor_unitario");
        assert_eq!(fueling[7], "valor_total");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(template_file_name(ImportType::Fuelings), "modelo_abastecimentos.csv");
    }
}
