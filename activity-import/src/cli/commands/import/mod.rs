pub mod handler;

use std::path::PathBuf;

use clap::Args;

pub use handler::{handle_crm_command, handle_dario_command, handle_status_command};

#[derive(Args, Debug)]
pub struct CrmArgs {
    /// Workbook to import (.xls or .xlsx)
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also list the staged rows
    #[arg(long)]
    pub show: bool,
}

#[derive(Args, Debug)]
pub struct DarioArgs {
    /// Workbook to import (.xls or .xlsx)
    pub file: PathBuf,

    /// Responsible party number attached to every row
    #[arg(short, long, allow_negative_numbers = true)]
    pub responsible: String,
}
