//! One-time repair of the CRM staging table
//!
//! Early databases declared `numero_act` as text. Such a table is dropped so
//! that schema creation rebuilds it; its rows are transient anyway.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// Drop `TMP_Actividades` when `numero_act` is missing or not an integer
/// column. Returns whether the table was dropped.
pub async fn repair_activity_number_column(pool: &SqlitePool) -> Result<bool> {
    let columns = sqlx::query("PRAGMA table_info(TMP_Actividades)")
        .fetch_all(pool)
        .await
        .context("Failed to inspect TMP_Actividades")?;

    if columns.is_empty() {
        return Ok(false);
    }

    let mut declared_type = None;
    for column in &columns {
        let name: String = column.try_get("name")?;
        if name.eq_ignore_ascii_case("numero_act") {
            declared_type = Some(column.try_get::<String, _>("type")?);
        }
    }

    let is_integer = declared_type
        .as_deref()
        .is_some_and(|t| t.to_ascii_uppercase().contains("INT"));
    if is_integer {
        return Ok(false);
    }

    log::warn!(
        "TMP_Actividades.numero_act has type {:?}, recreating table",
        declared_type.unwrap_or_default()
    );
    sqlx::query("DROP TABLE TMP_Actividades")
        .execute(pool)
        .await
        .context("Failed to drop legacy TMP_Actividades")?;

    Ok(true)
}
