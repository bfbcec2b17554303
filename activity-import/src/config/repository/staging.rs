//! Staging tables repository
//!
//! Each table holds exactly the rows of the latest successful import of its
//! kind. Replacement is a single transaction: delete everything, insert the
//! batch, commit.

use std::fmt;

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use super::legacy;
use crate::import::models::{CrmActivity, DarioActivity};

const CREATE_CRM_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS TMP_Actividades (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        numero_responsable INTEGER NOT NULL,
        fecha DATE,
        numero_act INTEGER,
        asunto VARCHAR(512),
        horas VARCHAR(16)
    )
"#;

const CREATE_DARIO_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS TMP_Actividades_Dario (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        size VARCHAR(2),
        numero INTEGER,
        nombre TEXT,
        comienzo DATETIME,
        fin DATETIME,
        sintesis TEXT,
        observaciones TEXT,
        vcx_s TEXT,
        req_sincro TEXT,
        version TEXT,
        numero_responsable INTEGER NOT NULL
    )
"#;

/// Which staging table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingKind {
    Crm,
    Dario,
}

impl StagingKind {
    pub const ALL: [StagingKind; 2] = [StagingKind::Crm, StagingKind::Dario];

    pub fn table_name(self) -> &'static str {
        match self {
            StagingKind::Crm => "TMP_Actividades",
            StagingKind::Dario => "TMP_Actividades_Dario",
        }
    }

    fn delete_sql(self) -> &'static str {
        match self {
            StagingKind::Crm => "DELETE FROM TMP_Actividades",
            StagingKind::Dario => "DELETE FROM TMP_Actividades_Dario",
        }
    }

    fn count_sql(self) -> &'static str {
        match self {
            StagingKind::Crm => "SELECT COUNT(*) FROM TMP_Actividades",
            StagingKind::Dario => "SELECT COUNT(*) FROM TMP_Actividades_Dario",
        }
    }
}

impl fmt::Display for StagingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

/// A complete batch for one staging table
#[derive(Debug, Clone)]
pub enum StagingBatch {
    Crm(Vec<CrmActivity>),
    Dario(Vec<DarioActivity>),
}

impl StagingBatch {
    pub fn kind(&self) -> StagingKind {
        match self {
            StagingBatch::Crm(_) => StagingKind::Crm,
            StagingBatch::Dario(_) => StagingKind::Dario,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StagingBatch::Crm(records) => records.len(),
            StagingBatch::Dario(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Create both staging tables if needed, repairing a legacy CRM table first
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    legacy::repair_activity_number_column(pool).await?;

    sqlx::query(CREATE_CRM_TABLE)
        .execute(pool)
        .await
        .context("Failed to create TMP_Actividades")?;

    sqlx::query(CREATE_DARIO_TABLE)
        .execute(pool)
        .await
        .context("Failed to create TMP_Actividades_Dario")?;

    Ok(())
}

/// Replace the contents of the batch's table. Returns the inserted row count.
/// On any failure the transaction is rolled back and the previous rows stay.
pub async fn replace_all(pool: &SqlitePool, batch: &StagingBatch) -> Result<u64> {
    let kind = batch.kind();
    if batch.is_empty() {
        log::warn!("Empty batch, {} will be cleared", kind);
    } else {
        log::debug!("Replacing {} with {} rows", kind, batch.len());
    }
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    let deleted = sqlx::query(kind.delete_sql())
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to clear {}", kind))?
        .rows_affected();

    let mut inserted = 0u64;
    match batch {
        StagingBatch::Crm(records) => {
            for record in records {
                inserted += sqlx::query(
                    r#"
                    INSERT INTO TMP_Actividades (numero_responsable, fecha, numero_act, asunto, horas)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(record.responsible_number)
                .bind(record.date)
                .bind(record.activity_number)
                .bind(record.subject.as_deref())
                .bind(&record.duration)
                .execute(&mut *tx)
                .await
                .context("Failed to insert CRM activity")?
                .rows_affected();
            }
        }
        StagingBatch::Dario(records) => {
            for record in records {
                inserted += sqlx::query(
                    r#"
                    INSERT INTO TMP_Actividades_Dario (
                        size, numero, nombre, comienzo, fin, sintesis,
                        observaciones, vcx_s, req_sincro, version, numero_responsable
                    )
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(record.size.as_deref())
                .bind(record.number)
                .bind(record.name.as_deref())
                .bind(record.start)
                .bind(record.end)
                .bind(record.synopsis.as_deref())
                .bind(record.observations.as_deref())
                .bind(record.vcx_s.as_deref())
                .bind(record.sync_requirement.as_deref())
                .bind(record.version.as_deref())
                .bind(record.responsible_number)
                .execute(&mut *tx)
                .await
                .context("Failed to insert Darío activity")?
                .rows_affected();
            }
        }
    }

    tx.commit().await.context("Failed to commit staging batch")?;

    log::info!("Replaced {} rows of {} with {}", deleted, kind, inserted);
    Ok(inserted)
}

/// Current row count of a staging table
pub async fn count_rows(pool: &SqlitePool, kind: StagingKind) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(kind.count_sql())
        .fetch_one(pool)
        .await
        .with_context(|| format!("Failed to count rows of {}", kind))?;

    Ok(count)
}

/// All CRM staging rows in insertion order
pub async fn list_crm_activities(pool: &SqlitePool) -> Result<Vec<CrmActivity>> {
    let rows = sqlx::query(
        r#"
        SELECT numero_responsable, fecha, numero_act, asunto, horas
        FROM TMP_Actividades
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list CRM activities")?;

    let mut activities = Vec::with_capacity(rows.len());
    for row in rows {
        activities.push(CrmActivity {
            responsible_number: row.try_get("numero_responsable")?,
            date: row.try_get("fecha")?,
            activity_number: row.try_get("numero_act")?,
            subject: row.try_get("asunto")?,
            duration: row.try_get::<Option<String>, _>("horas")?.unwrap_or_default(),
        });
    }

    Ok(activities)
}

/// All Darío staging rows in insertion order
pub async fn list_dario_activities(pool: &SqlitePool) -> Result<Vec<DarioActivity>> {
    let rows = sqlx::query(
        r#"
        SELECT size, numero, nombre, comienzo, fin, sintesis,
               observaciones, vcx_s, req_sincro, version, numero_responsable
        FROM TMP_Actividades_Dario
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list Darío activities")?;

    let mut activities = Vec::with_capacity(rows.len());
    for row in rows {
        activities.push(DarioActivity {
            size: row.try_get("size")?,
            number: row.try_get("numero")?,
            name: row.try_get("nombre")?,
            start: row.try_get("comienzo")?,
            end: row.try_get("fin")?,
            synopsis: row.try_get("sintesis")?,
            observations: row.try_get("observaciones")?,
            vcx_s: row.try_get("vcx_s")?,
            sync_requirement: row.try_get("req_sincro")?,
            version: row.try_get("version")?,
            responsible_number: row.try_get("numero_responsable")?,
        });
    }

    Ok(activities)
}
