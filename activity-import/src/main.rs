mod cli;
mod config;
mod import;

use anyhow::Result;
use clap::Parser;
use colored::*;

use cli::{Cli, Commands};
use config::Config;
use import::{ErrorKind, ImportError};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(hint) = e.downcast_ref::<ImportError>().and_then(hint) {
            eprintln!("{}", hint.dimmed());
        }
        std::process::exit(1);
    }
}

fn hint(err: &ImportError) -> Option<&'static str> {
    match err.kind() {
        ErrorKind::UserInput => None,
        ErrorKind::Format => Some("Nothing was imported; check the sheet layout."),
        ErrorKind::Transaction => Some("The staging table keeps its previous contents."),
        ErrorKind::Resource => Some("The workbook could not be read or converted."),
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = Config::load()?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    log::debug!("Using database {}", config.database_path.display());

    let pool = config.connect().await?;

    let result = match cli.command {
        Commands::Crm(args) => cli::commands::import::handle_crm_command(args, &config, &pool).await,
        Commands::Dario(args) => {
            cli::commands::import::handle_dario_command(args, &config, &pool).await
        }
        Commands::Status(args) => {
            cli::commands::import::handle_status_command(args, &config, &pool).await
        }
    };

    pool.close().await;
    result
}
