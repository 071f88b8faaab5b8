use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "markcal", version, about = "Terminal year calendar for marking dates")]
pub struct Cli {
    /// Path to a YAML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Path to the JSON store holding marked dates
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
    /// Write logs to this file instead of the data directory
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project store in the current directory
    Init,
    /// Print marked dates
    List {
        /// Only dates in this year
        #[arg(long)]
        year: Option<i32>,
    },
    /// Print the year calendar without entering the TUI
    Show {
        /// Year to print (defaults to the configured start year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Launch the interactive calendar
    Tui,
}
