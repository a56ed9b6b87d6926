// ==========================================
// Fleet Import - Normalized Records
// ==========================================
// One typed struct per import type. Every persistence field is present;
// absent values serialize as explicit null.
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::ImportType;

// ==========================================
// VehicleRecord
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub placa: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub ano: Option<i32>,
    pub tipo: Option<String>,
    pub combustivel: Option<String>,
    pub renavam: Option<String>,
    pub capacidade_kg: Option<f64>,
    pub km_atual: Option<f64>,
    pub status: Option<String>,
    pub ativo: Option<bool>,
}

// ==========================================
// DriverRecord
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverRecord {
    pub nome: Option<String>,
    pub cpf: Option<String>, // digits only
    pub cnh: Option<String>,
    pub categoria_cnh: Option<String>,
    pub validade_cnh: Option<NaiveDate>,
    pub telefone: Option<String>,
    pub ativo: Option<bool>,
}

// ==========================================
// DeliveryRecord
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub pv_foco: Option<String>,
    pub nf: Option<String>,
    pub cliente: Option<String>,
    pub cidade: Option<String>,
    pub uf: Option<String>,
    pub data_saida: Option<NaiveDate>,
    pub data_montagem: Option<NaiveDate>,
    pub motorista: Option<String>,
    pub veiculo: Option<String>,
    pub tipo_transporte: Option<String>,
    pub valor: Option<f64>,
    pub gasto_entrega: Option<f64>,
    pub gasto_montagem: Option<f64>,
    pub percentual_gastos: Option<f64>,
    pub assembler_1: Option<String>,
    pub assembler_2: Option<String>,
    pub status: Option<String>,
    pub erros: Option<String>, // free-text error/notes description
}

// ==========================================
// FuelingRecord
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelingRecord {
    pub data: Option<NaiveDate>,
    pub placa: Option<String>,
    pub motorista: Option<String>,
    pub posto: Option<String>,
    pub produto: Option<String>,
    pub litros: Option<f64>,
    pub valor_unitario: Option<f64>,
    pub valor_total: Option<f64>,
    pub km: Option<f64>,
    pub cidade: Option<String>,
    pub uf: Option<String>,
}

// ==========================================
// MaintenanceRecord
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub data: Option<NaiveDate>,
    pub placa: Option<String>,
    pub tipo: Option<String>,
    pub descricao: Option<String>,
    pub oficina: Option<String>,
    pub valor: Option<f64>,
    pub km: Option<f64>,
    pub status: Option<String>,
}

// ==========================================
// AssemblerRecord
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblerRecord {
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub telefone: Option<String>,
    pub ativo: Option<bool>,
}

// ==========================================
// NormalizedRecord - any of the above
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizedRecord {
    Vehicle(VehicleRecord),
    Delivery(DeliveryRecord),
    Fueling(FuelingRecord),
    Maintenance(MaintenanceRecord),
    Driver(DriverRecord),
    Assembler(AssemblerRecord),
}

impl NormalizedRecord {
    pub fn import_type(&self) -> ImportType {
        match self {
            NormalizedRecord::Vehicle(_) => ImportType::Vehicles,
            NormalizedRecord::Delivery(_) => ImportType::Deliveries,
            NormalizedRecord::Fueling(_) => ImportType::Fuelings,
            NormalizedRecord::Maintenance(_) => ImportType::Maintenances,
            NormalizedRecord::Driver(_) => ImportType::Drivers,
            NormalizedRecord::Assembler(_) => ImportType::Assemblers,
        }
    }

    pub fn as_delivery(&self) -> Option<&DeliveryRecord> {
        match self {
            NormalizedRecord::Delivery(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_vehicle(&self) -> Option<&VehicleRecord> {
        match self {
            NormalizedRecord::Vehicle(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_fueling(&self) -> Option<&FuelingRecord> {
        match self {
            NormalizedRecord::Fueling(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_driver(&self) -> Option<&DriverRecord> {
        match self {
            NormalizedRecord::Driver(d) => Some(d),
            _ => None,
        }
    }
}

// ==========================================
// NormalizedRow - record plus its spreadsheet line
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub line_number: usize,
    pub record: NormalizedRecord,
}
