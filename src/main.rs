mod cli;
mod config;
mod db;
mod delivery;
mod error;
mod mapper;
mod monitor;
mod report;
mod sync;

use clap::Parser;
use cli::{Cli, Command, ConfigCommand, ProgramCommand};

use crate::config::SyncSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Open database
    let db_path = config::db_path()?;
    let db = db::Database::open(&db_path)?;

    match cli.command {
        Command::Capture(args) => {
            let settings = SyncSettings::load(&db)?;
            cli::capture::capture(&db, &settings, &args)?;
        }
        Command::List => cli::list::list(&db)?,
        Command::Show { id } => cli::show::show(&db, id)?,
        Command::Sync { mass } => {
            let settings = SyncSettings::load(&db)?;
            let engine = sync::SyncEngine::new(delivery::build_route_list())?;
            cli::sync::sync(&db, &engine, &settings, mass).await?;
        }
        Command::Status => cli::status::status(&db)?,
        Command::Watch {
            interval,
            probe_url,
        } => {
            let engine = sync::SyncEngine::new(delivery::build_route_list())?;
            let monitor = monitor::ConnectivityMonitor::new(probe_url, interval)?;
            monitor.watch(&db, &engine).await?;
        }
        Command::Export { format, output } => {
            let settings = SyncSettings::load(&db)?;
            cli::export::export(&db, &settings, &format, output.as_deref())?;
        }
        Command::Config { command } => match command {
            ConfigCommand::Show => cli::config::show(&db)?,
            ConfigCommand::Set { key, value } => cli::config::set(&db, &key, &value)?,
        },
        Command::Program { command } => match command {
            ProgramCommand::List => cli::program::list(&db)?,
            ProgramCommand::Set {
                name,
                product,
                dedication,
            } => cli::program::set(&db, &name, &product, &dedication)?,
            ProgramCommand::Remove { name } => cli::program::remove(&db, &name)?,
        },
        Command::Purge { force } => cli::purge::purge(&db, force)?,
    }

    Ok(())
}
