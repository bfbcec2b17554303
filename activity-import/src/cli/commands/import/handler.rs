//! Import command handlers

use anyhow::{Context, Result};
use colored::*;
use sqlx::SqlitePool;

use super::{CrmArgs, DarioArgs, StatusArgs};
use crate::config::Config;
use crate::config::repository::staging::{self, StagingKind};
use crate::import::{self, ImportSummary};

pub async fn handle_crm_command(args: CrmArgs, config: &Config, pool: &SqlitePool) -> Result<()> {
    let summary = import::import_crm(pool, &args.file, &config.crm).await?;

    print_summary(&summary, StagingKind::Crm);
    match &summary.responsible.name {
        Some(name) => println!(
            "  Responsible: {} {}",
            summary.responsible.number.to_string().cyan(),
            name.cyan()
        ),
        None => println!(
            "  Responsible: {}",
            summary.responsible.number.to_string().cyan()
        ),
    }
    Ok(())
}

pub async fn handle_dario_command(
    args: DarioArgs,
    config: &Config,
    pool: &SqlitePool,
) -> Result<()> {
    // Rejected before the workbook is even opened
    let responsible = import::parse_responsible_number(&args.responsible)?;
    let summary = import::import_dario(pool, &args.file, responsible, &config.dario).await?;

    print_summary(&summary, StagingKind::Dario);
    println!("  Responsible: {}", responsible.to_string().cyan());
    Ok(())
}

pub async fn handle_status_command(
    args: StatusArgs,
    config: &Config,
    pool: &SqlitePool,
) -> Result<()> {
    staging::ensure_schema(pool)
        .await
        .context("Failed to prepare staging tables")?;

    println!("Database: {}", config.database_path.display().to_string().cyan());
    for kind in StagingKind::ALL {
        let count = staging::count_rows(pool, kind).await?;
        println!("  {:<24} {}", kind.table_name(), count.to_string().bold());
    }

    if args.show {
        print_crm_rows(pool).await?;
        print_dario_rows(pool).await?;
    }
    Ok(())
}

async fn print_crm_rows(pool: &SqlitePool) -> Result<()> {
    let rows = staging::list_crm_activities(pool).await?;
    if rows.is_empty() {
        return Ok(());
    }

    println!();
    println!("{}", StagingKind::Crm.table_name().bold());
    for row in rows {
        println!(
            "  {:>6}  {:<10}  {:>8}  {}  {}",
            row.responsible_number,
            optional(row.date),
            optional(row.activity_number),
            row.duration,
            row.subject.as_deref().unwrap_or("").dimmed()
        );
    }
    Ok(())
}

async fn print_dario_rows(pool: &SqlitePool) -> Result<()> {
    let rows = staging::list_dario_activities(pool).await?;
    if rows.is_empty() {
        return Ok(());
    }

    println!();
    println!("{}", StagingKind::Dario.table_name().bold());
    for row in rows {
        println!(
            "  {:>6}  {:<2}  {:>6}  {:<19}  {:<19}  {}",
            row.responsible_number,
            row.size.as_deref().unwrap_or(""),
            optional(row.number),
            optional(row.start),
            optional(row.end),
            row.name.as_deref().unwrap_or("").dimmed()
        );
    }
    Ok(())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn print_summary(summary: &ImportSummary, kind: StagingKind) {
    println!(
        "{} Imported {} rows into {}",
        "✓".green().bold(),
        summary.inserted.to_string().bold(),
        kind.table_name()
    );
    println!("  Source: {}", summary.source.display());
    if summary.converted_from_legacy {
        println!("  {}", "Converted from legacy .xls".dimmed());
    }
}
