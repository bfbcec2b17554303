//! Header row location
//!
//! Scans a bounded window of rows for the first one containing a recognized
//! header token and records each header's column.

use std::ops::RangeInclusive;

use calamine::Data;

use super::cells;
use super::excel::sheet::Sheet;

/// A located header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRow {
    /// 1-based row number
    pub row: u32,
    /// Normalized header text and its 1-based column, in sheet order.
    /// Empty headers are keyed `col{N}`.
    pub columns: Vec<(String, u32)>,
}

impl HeaderRow {
    /// Column of a normalized header. When a header repeats the rightmost
    /// occurrence wins.
    pub fn column(&self, name: &str) -> Option<u32> {
        self.columns
            .iter()
            .rev()
            .find(|(header, _)| header == name)
            .map(|(_, column)| *column)
    }

    /// First synonym present in the row
    pub fn resolve(&self, synonyms: &[String]) -> Option<u32> {
        synonyms
            .iter()
            .find_map(|synonym| self.column(&cells::normalize_str(synonym)))
    }

    /// Non-empty header names in sheet order, for error reports
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(self.columns.len());
        for (name, column) in &self.columns {
            if *name == placeholder(*column) {
                continue;
            }
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

fn placeholder(column: u32) -> String {
    format!("col{}", column)
}

/// Default scan window: rows `1..=min(scan_rows, last_row)`
pub fn default_window(sheet: &Sheet, scan_rows: u32) -> RangeInclusive<u32> {
    1..=scan_rows.min(sheet.last_row())
}

/// Find the first row in `window` where some normalized cell equals a token.
/// Returns `None` when no row qualifies.
pub fn find_header_row(
    sheet: &Sheet,
    window: RangeInclusive<u32>,
    tokens: &[String],
) -> Option<HeaderRow> {
    let tokens: Vec<String> = tokens.iter().map(|t| cells::normalize_str(t)).collect();
    let width = sheet.last_column();

    for row in window {
        let normalized: Vec<String> = sheet
            .row(row, width)
            .into_iter()
            .map(cells::normalize_text)
            .collect();

        if !normalized.iter().any(|cell| tokens.contains(cell)) {
            continue;
        }

        let columns = normalized
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let column = idx as u32 + 1;
                if name.is_empty() {
                    (placeholder(column), column)
                } else {
                    (name, column)
                }
            })
            .collect();

        log::debug!("Header row found at row {} of sheet '{}'", row, sheet.name);
        return Some(HeaderRow { row, columns });
    }

    None
}

/// True when any of the given cells normalizes to a header token. Used to
/// skip repeated header lines inside the data.
pub fn is_header_like(values: &[&Data], tokens: &[String]) -> bool {
    values.iter().any(|cell| {
        let text = cells::normalize_text(cell);
        !text.is_empty() && tokens.iter().any(|token| cells::normalize_str(token) == text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Range;

    fn tokens() -> Vec<String> {
        ["fecha", "numero", "número", "asunto"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn sheet_with(rows: &[(u32, u32, &str)]) -> Sheet {
        let mut range = Range::new((0, 0), (24, 6));
        for (row, column, text) in rows {
            range.set_value((row - 1, column - 1), Data::String(text.to_string()));
        }
        Sheet::new("Hoja1", range)
    }

    #[test]
    fn test_finds_first_matching_row() {
        let sheet = sheet_with(&[
            (1, 1, "Informe de actividades"),
            (3, 1, "Responsable: 12 Ana"),
            (5, 1, " FECHA "),
            (5, 3, "Número"),
            (5, 5, "Descripción"),
        ]);
        let header = find_header_row(&sheet, default_window(&sheet, 20), &tokens()).unwrap();
        assert_eq!(header.row, 5);
        assert_eq!(header.column("fecha"), Some(1));
        assert_eq!(header.column("numero"), Some(3));
        assert_eq!(header.column("descripcion"), Some(5));
        assert_eq!(header.column("col2"), Some(2));
    }

    #[test]
    fn test_not_found_outside_window() {
        let sheet = sheet_with(&[(22, 1, "Fecha")]);
        assert_eq!(find_header_row(&sheet, default_window(&sheet, 20), &tokens()), None);
        assert!(find_header_row(&sheet, 1..=25, &tokens()).is_some());
    }

    #[test]
    fn test_duplicate_header_last_wins() {
        let sheet = sheet_with(&[(2, 1, "Fecha"), (2, 2, "Asunto"), (2, 4, "asunto")]);
        let header = find_header_row(&sheet, 1..=20, &tokens()).unwrap();
        assert_eq!(header.column("asunto"), Some(4));
        assert_eq!(header.names().iter().filter(|n| *n == "asunto").count(), 1);
    }

    #[test]
    fn test_resolve_uses_first_present_synonym() {
        let sheet = sheet_with(&[(1, 1, "Fecha"), (1, 2, "Nro"), (1, 3, "Num Act")]);
        let header = find_header_row(&sheet, 1..=20, &tokens()).unwrap();
        let synonyms: Vec<String> = ["numero", "número", "numero act", "num act", "nro"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(header.resolve(&synonyms), Some(3));
        assert_eq!(header.resolve(&["subject".to_string()]), None);
    }

    #[test]
    fn test_is_header_like() {
        let fecha = Data::String("Fecha".to_string());
        let value = Data::String("Reunión".to_string());
        assert!(is_header_like(&[&value, &fecha], &tokens()));
        assert!(!is_header_like(&[&value, &Data::Empty], &tokens()));
    }
}
