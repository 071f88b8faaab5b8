mod calendar;
mod cli;
mod commands;
mod config;
mod gesture;
mod logging;
mod model;
mod storage;
mod ui;
mod widget;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let _logger = logging::init_logging(args.log_file.as_deref())?;
    let command = args.command.unwrap_or(cli::Command::Tui);
    let session = || commands::open_session(args.config.as_deref(), args.store.as_deref());
    match command {
        cli::Command::Init => commands::init(),
        cli::Command::List { year } => commands::list(session()?, year),
        cli::Command::Show { year } => commands::show(session()?, year),
        cli::Command::Tui => commands::tui(session()?),
    }
}
