pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::import::{CrmArgs, DarioArgs, StatusArgs};

#[derive(Parser, Debug)]
#[command(
    name = "activity-import",
    version,
    about = "Load CRM and Darío activity spreadsheets into the staging database"
)]
pub struct Cli {
    /// SQLite database file (overrides config and ACTIVITY_IMPORT_DATABASE)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a CRM activities workbook into TMP_Actividades
    Crm(CrmArgs),
    /// Import a Darío annotations workbook into TMP_Actividades_Dario
    Dario(DarioArgs),
    /// Show the row count of each staging table
    Status(StatusArgs),
}
