// ==========================================
// Fleet Import - Flexible Field Lookup
// ==========================================
// Ordered header candidates per field, first non-blank match wins;
// falls back to a substring scan across the sheet's headers; None when
// nothing matches. A missing field is preferable to a mis-mapped one.
// ==========================================

use crate::domain::import::RawRow;
use crate::domain::types::CellValue;

/// A resolved cell together with the header it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMatch<'a> {
    pub header: &'a str,
    pub value: &'a CellValue,
}

/// Lookup rule for one canonical field
#[derive(Debug, Clone, Copy)]
pub struct FieldLookup {
    pub field: &'static str,
    /// Exact header names, tried in order
    pub candidates: &'static [&'static str],
    /// Each inner list is a set of substrings that must all appear in a header
    pub fuzzy: &'static [&'static [&'static str]],
}

impl FieldLookup {
    pub const fn new(
        field: &'static str,
        candidates: &'static [&'static str],
        fuzzy: &'static [&'static [&'static str]],
    ) -> Self {
        Self {
            field,
            candidates,
            fuzzy,
        }
    }

    /// Exact-only lookup on the field's own name
    pub const fn exact(field: &'static str, candidates: &'static [&'static str]) -> Self {
        Self::new(field, candidates, &[])
    }

    pub fn find<'a>(&self, row: &'a RawRow, headers: &'a [String]) -> Option<FieldMatch<'a>> {
        self.find_exact(row, headers)
            .or_else(|| self.find_fuzzy(row, headers))
    }

    fn find_exact<'a>(&self, row: &'a RawRow, headers: &'a [String]) -> Option<FieldMatch<'a>> {
        self.candidates.iter().find_map(|candidate| {
            let header = headers.iter().find(|h| h.as_str() == *candidate)?;
            row.non_blank(header).map(|value| FieldMatch {
                header: header.as_str(),
                value,
            })
        })
    }

    fn find_fuzzy<'a>(&self, row: &'a RawRow, headers: &'a [String]) -> Option<FieldMatch<'a>> {
        self.fuzzy.iter().find_map(|fragments| {
            headers
                .iter()
                .filter(|h| !self.candidates.contains(&h.as_str()))
                .filter(|h| fragments.iter().all(|f| h.contains(f)))
                .find_map(|header| {
                    row.non_blank(header).map(|value| FieldMatch {
                        header: header.as_str(),
                        value,
                    })
                })
        })
    }

    /// Value only
    pub fn value<'a>(&self, row: &'a RawRow, headers: &'a [String]) -> Option<&'a CellValue> {
        self.find(row, headers).map(|m| m.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UF: FieldLookup = FieldLookup::new(
        "uf",
        &["uf", "estado", "uf_destino"],
        &[&["uf"], &["estado"]],
    );

    fn row_with(cells: &[(&str, &str)]) -> (RawRow, Vec<String>) {
        let mut row = RawRow::new(2);
        let mut headers = Vec::new();
        for (k, v) in cells {
            row.cells.insert(k.to_string(), CellValue::text(*v));
            headers.push(k.to_string());
        }
        (row, headers)
    }

    #[test]
    fn test_first_candidate_wins() {
        let (row, headers) = row_with(&[("estado", "MG"), ("uf", "SP")]);
        let found = UF.find(&row, &headers).unwrap();
        assert_eq!(found.header, "uf");
        assert_eq!(found.value, &CellValue::text("SP"));
    }

    #[test]
    fn test_blank_candidate_falls_through() {
        let (row, headers) = row_with(&[("uf", "  "), ("estado", "MG")]);
        assert_eq!(UF.value(&row, &headers), Some(&CellValue::text("MG")));
    }

    #[test]
    fn test_fuzzy_fallback() {
        let (row, headers) = row_with(&[("cliente", "ACME"), ("uf_entrega", "RJ")]);
        let found = UF.find(&row, &headers).unwrap();
        assert_eq!(found.header, "uf_entrega");
    }

    #[test]
    fn test_no_match_is_none() {
        let (row, headers) = row_with(&[("cliente", "ACME")]);
        assert!(UF.find(&row, &headers).is_none());
    }
}
