//! Campsync CLI
//!
//! Command-line tools for inspecting and triaging offline action queues.
//!
//! # Commands
//!
//! - `status` - Show per-queue counts, conflicts, and retry schedule
//! - `conflicts` - List, retry, or discard conflicted items
//! - `telemetry` - Show or clear the bounded sync log

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Campsync command-line queue tools.
#[derive(Parser)]
#[command(name = "campsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the queue storage directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show per-queue counts, conflicts, and retry schedule
    Status {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List, retry, or discard conflicted items
    Conflicts {
        #[command(subcommand)]
        action: ConflictAction,
    },

    /// Show or clear the bounded sync log
    Telemetry {
        #[command(subcommand)]
        action: TelemetryAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ConflictAction {
    /// List every conflicted item across all queues
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Clear an item's conflict flag so the next flush picks it up
    Retry {
        /// Queue key (e.g. pos-orders)
        queue: String,

        /// Item id
        id: String,
    },

    /// Permanently remove a conflicted item from its queue
    Discard {
        /// Queue key (e.g. pos-orders)
        queue: String,

        /// Item id
        id: String,
    },
}

#[derive(Subcommand)]
enum TelemetryAction {
    /// Show recorded events, newest first
    Show {
        /// Maximum number of events to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Remove every recorded event
    Clear,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Status { format } => {
            let path = cli.path.ok_or("Storage path required for status")?;
            commands::status::run(&path, &format)?;
        }
        Commands::Conflicts { action } => {
            let path = cli.path.ok_or("Storage path required for conflicts")?;
            match action {
                ConflictAction::List { format } => {
                    commands::conflicts::run_list(&path, &format)?;
                }
                ConflictAction::Retry { queue, id } => {
                    commands::conflicts::run_retry(&path, &queue, &id)?;
                }
                ConflictAction::Discard { queue, id } => {
                    commands::conflicts::run_discard(&path, &queue, &id)?;
                }
            }
        }
        Commands::Telemetry { action } => {
            let path = cli.path.ok_or("Storage path required for telemetry")?;
            match action {
                TelemetryAction::Show { limit, format } => {
                    commands::telemetry::run_show(&path, limit, &format)?;
                }
                TelemetryAction::Clear => {
                    commands::telemetry::run_clear(&path)?;
                }
            }
        }
        Commands::Version => {
            println!("Campsync CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
