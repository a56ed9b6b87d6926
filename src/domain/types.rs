// ==========================================
// Fleet Import - Domain Types
// ==========================================
// Import type selector, warning severity and raw cell values
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// ImportType - which rule set applies to a file
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportType {
    Vehicles,
    Deliveries,
    Fuelings,
    Maintenances,
    Drivers,
    Assemblers,
}

impl ImportType {
    pub const ALL: [ImportType; 6] = [
        ImportType::Vehicles,
        ImportType::Deliveries,
        ImportType::Fuelings,
        ImportType::Maintenances,
        ImportType::Drivers,
        ImportType::Assemblers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportType::Vehicles => "vehicles",
            ImportType::Deliveries => "deliveries",
            ImportType::Fuelings => "fuelings",
            ImportType::Maintenances => "maintenances",
            ImportType::Drivers => "drivers",
            ImportType::Assemblers => "assemblers",
        }
    }

    /// Canonical fields holding calendar dates for this import type.
    ///
    /// Numeric cells in these columns are candidates for Excel serial
    /// date conversion; numeric cells anywhere else are left alone.
    pub fn date_fields(&self) -> &'static [&'static str] {
        match self {
            ImportType::Vehicles => &[],
            ImportType::Deliveries => &["data_saida", "data_montagem"],
            ImportType::Fuelings => &["data"],
            ImportType::Maintenances => &["data"],
            ImportType::Drivers => &["validade_cnh"],
            ImportType::Assemblers => &[],
        }
    }
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vehicles" | "veiculos" => Ok(ImportType::Vehicles),
            "deliveries" | "entregas" => Ok(ImportType::Deliveries),
            "fuelings" | "abastecimentos" => Ok(ImportType::Fuelings),
            "maintenances" | "manutencoes" => Ok(ImportType::Maintenances),
            "drivers" | "motoristas" => Ok(ImportType::Drivers),
            "assemblers" | "montadores" => Ok(ImportType::Assemblers),
            other => Err(format!("unknown import type: {}", other)),
        }
    }
}

// ==========================================
// Severity - advisory warning classification
// ==========================================
// Never used to abort processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Moderate,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Moderate => write!(f, "moderate"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

// ==========================================
// TextCase - optional transform for text cells
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCase {
    Keep,
    Upper,
    Title,
}

// ==========================================
// CellValue - one raw spreadsheet cell
// ==========================================
// Date holds cells already recognised as calendar dates by the parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl CellValue {
    pub fn text<S: Into<String>>(value: S) -> Self {
        CellValue::Text(value.into())
    }

    /// Empty cells and whitespace-only text both count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell as display text (integers without a trailing `.0`).
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{:.0}", n))
                } else {
                    Some(n.to_string())
                }
            }
            CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            CellValue::Text(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_type_from_str() {
        assert_eq!("entregas".parse::<ImportType>(), Ok(ImportType::Deliveries));
        assert_eq!(" Vehicles ".parse::<ImportType>(), Ok(ImportType::Vehicles));
        assert!("boats".parse::<ImportType>().is_err());
    }

    #[test]
    fn test_cell_value_as_text() {
        assert_eq!(CellValue::Number(5134.0).as_text(), Some("5134".to_string()));
        assert_eq!(CellValue::Number(2.5).as_text(), Some("2.5".to_string()));
        assert_eq!(CellValue::Empty.as_text(), None);
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Moderate);
        assert!(Severity::Moderate > Severity::Info);
    }
}
