use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "nexus-flow")]
#[command(about = "Lead-to-reconciliation sales pipeline simulator")]
#[command(long_about = "Nexus Flow moves one customer opportunity through lead, quote, measurement, \
                       sales order, installation and reconciliation, keeping every document in sync \
                       and recording each step in an audit log. Start with 'nexus-flow simulate'.")]
pub struct Cli {
    /// Configuration file used instead of ./nexus-flow.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Drive one opportunity through the whole pipeline and print the result
    Simulate {
        #[arg(long, help = "Report refused intents instead of skipping them")]
        strict: bool,
        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay an intent script (.toml or .json) against an empty pipeline
    Run {
        /// Script file
        file: PathBuf,
        #[arg(long, help = "Report refused intents instead of skipping them")]
        strict: bool,
        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the intents the engine would accept next
    Intents {
        /// Optional script replayed first
        file: Option<PathBuf>,
    },
    /// Show the pipeline stage map
    Map {
        /// Optional script replayed first
        file: Option<PathBuf>,
    },
}
