//! Spreadsheet activity import
//!
//! Both imports follow the same pipeline: validate and (for `.xls`) convert
//! the file, read the first sheet, extract records, then replace the
//! staging table in one transaction. Nothing touches the database until
//! extraction has succeeded.

pub mod cells;
pub mod crm;
pub mod dario;
pub mod error;
pub mod excel;
pub mod headers;
pub mod models;

use std::path::Path;

use sqlx::SqlitePool;

use crate::config::layout::{CrmLayout, DarioLayout};
use crate::config::repository::staging::{self, StagingBatch};
pub use error::{ErrorKind, ImportError, Result};
use excel::PreparedWorkbook;
pub use models::{ImportSummary, Responsible};

/// Import a CRM activities workbook into `TMP_Actividades`
pub async fn import_crm(
    pool: &SqlitePool,
    path: &Path,
    layout: &CrmLayout,
) -> Result<ImportSummary> {
    log::info!("Importing CRM activities from {}", path.display());
    let workbook = PreparedWorkbook::prepare(path)?;
    let sheet = workbook.open_first_sheet()?;
    let extraction = crm::extract(&sheet, layout)?;
    log::debug!(
        "Header at row {}, data from row {}, stopped at {:?}",
        extraction.header.row,
        extraction.start_row,
        extraction.stopped_at
    );

    let inserted = stage(pool, StagingBatch::Crm(extraction.records)).await?;

    Ok(ImportSummary {
        inserted,
        responsible: extraction.responsible,
        source: path.to_path_buf(),
        converted_from_legacy: workbook.is_converted(),
    })
}

/// Import a Darío annotations workbook into `TMP_Actividades_Dario`.
/// The responsible number is supplied by the caller, see
/// [`parse_responsible_number`].
pub async fn import_dario(
    pool: &SqlitePool,
    path: &Path,
    responsible_number: i64,
    layout: &DarioLayout,
) -> Result<ImportSummary> {
    log::info!(
        "Importing Darío annotations from {} for responsible {}",
        path.display(),
        responsible_number
    );
    let workbook = PreparedWorkbook::prepare(path)?;
    let sheet = workbook.open_first_sheet()?;
    let records = dario::extract(&sheet, responsible_number, layout);

    let inserted = stage(pool, StagingBatch::Dario(records)).await?;

    Ok(ImportSummary {
        inserted,
        responsible: Responsible {
            number: responsible_number,
            name: None,
        },
        source: path.to_path_buf(),
        converted_from_legacy: workbook.is_converted(),
    })
}

/// Validate user-entered responsible number text
pub fn parse_responsible_number(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    trimmed
        .parse()
        .map_err(|_| ImportError::InvalidResponsible(trimmed.to_string()))
}

async fn stage(pool: &SqlitePool, batch: StagingBatch) -> Result<u64> {
    staging::ensure_schema(pool)
        .await
        .map_err(ImportError::Transaction)?;
    staging::replace_all(pool, &batch)
        .await
        .map_err(ImportError::Transaction)
}
