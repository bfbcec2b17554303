//! Staging records produced by the extractors

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

/// One row of `TMP_Actividades`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmActivity {
    pub responsible_number: i64,
    pub date: Option<NaiveDate>,
    pub activity_number: Option<i64>,
    pub subject: Option<String>,
    /// `HH:MM:SS`
    pub duration: String,
}

/// One row of `TMP_Actividades_Dario`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DarioActivity {
    pub size: Option<String>,
    pub number: Option<i64>,
    pub name: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub synopsis: Option<String>,
    pub observations: Option<String>,
    pub vcx_s: Option<String>,
    pub sync_requirement: Option<String>,
    pub version: Option<String>,
    pub responsible_number: i64,
}

/// Responsible party read from a CRM sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Responsible {
    pub number: i64,
    pub name: Option<String>,
}

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows committed to the staging table
    pub inserted: u64,
    pub responsible: Responsible,
    pub source: PathBuf,
    /// Whether the file went through the `.xls` adapter
    pub converted_from_legacy: bool,
}
