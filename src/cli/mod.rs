pub mod capture;
pub mod config;
pub mod export;
pub mod list;
pub mod program;
pub mod purge;
pub mod show;
pub mod status;
pub mod sync;

use clap::{Parser, Subcommand};

use crate::config::INGEST_URL;

#[derive(Parser)]
#[command(
    name = "lead-courier",
    version,
    about = "Capture recruiting leads offline, forward them to the CRM when connectivity allows"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Capture a new lead into the local queue
    Capture(capture::CaptureArgs),
    /// List captured leads, newest first
    List,
    /// Show one lead with its delivery diagnostics
    Show {
        /// Lead id as printed by `list`
        id: i64,
    },
    /// Send pending leads to the CRM
    Sync {
        /// Bypass the rate cap for this run (elevated use only)
        #[arg(long)]
        mass: bool,
    },
    /// Show queue totals and rate-limit state
    Status,
    /// Watch connectivity and sync unattended whenever it returns
    Watch {
        /// Seconds between connectivity probes
        #[arg(long, default_value_t = 30)]
        interval: u64,
        /// URL probed to detect connectivity
        #[arg(long, default_value = INGEST_URL)]
        probe_url: String,
    },
    /// Export captured leads as a tabular file
    Export {
        /// Output format
        #[arg(long, default_value = "csv", value_parser = ["terminal", "json", "csv"])]
        format: String,
        /// Output file path (stdout if not specified)
        #[arg(long)]
        output: Option<String>,
    },
    /// Inspect or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Manage the program catalog
    Program {
        #[command(subcommand)]
        command: ProgramCommand,
    },
    /// Delete every captured lead
    Purge {
        /// Confirm the irreversible wipe
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the current settings
    Show,
    /// Set one setting, e.g. `config set api_key <value>`
    Set { key: String, value: String },
}

#[derive(Subcommand)]
pub enum ProgramCommand {
    /// List catalog entries
    List,
    /// Add or update a program
    Set {
        /// Program display name as shown on the form
        name: String,
        /// CRM product id
        #[arg(long)]
        product: String,
        /// CRM dedication id
        #[arg(long, default_value = "1")]
        dedication: String,
    },
    /// Remove a program
    Remove { name: String },
}
