//! Spreadsheet layouts
//!
//! Fixed positions of the two supported activity sheets. Rows and columns
//! are 1-based. Defaults reproduce the layouts produced by the CRM export
//! and by the Darío annotation template.

use serde::{Deserialize, Serialize};

use crate::import::cells::Epoch;

/// A column the CRM extractor looks up by header name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalField {
    Date,
    ActivityNumber,
    Subject,
}

impl LogicalField {
    pub const ALL: [LogicalField; 3] = [
        LogicalField::Date,
        LogicalField::ActivityNumber,
        LogicalField::Subject,
    ];

    /// Label used when reporting a missing column
    pub fn label(self) -> &'static str {
        match self {
            LogicalField::Date => "Fecha",
            LogicalField::ActivityNumber => "Número",
            LogicalField::Subject => "Asunto",
        }
    }
}

/// Header synonyms per logical field, tried in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSynonyms {
    pub date: Vec<String>,
    pub activity_number: Vec<String>,
    pub subject: Vec<String>,
}

impl ColumnSynonyms {
    pub fn for_field(&self, field: LogicalField) -> &[String] {
        match field {
            LogicalField::Date => &self.date,
            LogicalField::ActivityNumber => &self.activity_number,
            LogicalField::Subject => &self.subject,
        }
    }
}

impl Default for ColumnSynonyms {
    fn default() -> Self {
        Self {
            date: strings(&["fecha"]),
            activity_number: strings(&[
                "numero",
                "número",
                "numero act",
                "num act",
                "nro",
                "nº",
                "no",
            ]),
            subject: strings(&[
                "asunto",
                "asuntos",
                "descripcion",
                "descripción",
                "concepto",
                "detalle",
                "subject",
            ]),
        }
    }
}

/// CRM activities sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmLayout {
    /// Cell holding `Responsable: <number> <name>` (A3)
    pub responsible_row: u32,
    pub responsible_column: u32,
    /// Data never starts above this row
    pub min_data_row: u32,
    /// Rows searched for the header, starting at row 1
    pub header_scan_rows: u32,
    /// A non-empty, non-date value here ends the data (column A)
    pub termination_column: u32,
    /// Column J
    pub hours_column: u32,
    /// Column L
    pub minutes_column: u32,
    /// Any of these identifies a header row
    pub header_tokens: Vec<String>,
    pub synonyms: ColumnSynonyms,
    /// Date system of raw serials, detected from the workbook when unset
    pub epoch: Option<Epoch>,
}

impl Default for CrmLayout {
    fn default() -> Self {
        Self {
            responsible_row: 3,
            responsible_column: 1,
            min_data_row: 4,
            header_scan_rows: 20,
            termination_column: 1,
            hours_column: 10,
            minutes_column: 12,
            header_tokens: strings(&["fecha", "numero", "número", "asunto"]),
            synonyms: ColumnSynonyms::default(),
            epoch: None,
        }
    }
}

/// Darío annotations sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DarioLayout {
    /// Rows above this are headers
    pub first_data_row: u32,
    /// Positional columns read per row
    pub width: u32,
    /// A row is skipped when its first `key_columns` cells are all empty
    pub key_columns: u32,
    pub epoch: Option<Epoch>,
}

impl Default for DarioLayout {
    fn default() -> Self {
        Self {
            first_data_row: 2,
            width: 11,
            key_columns: 3,
            epoch: None,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
