mod agenda;
mod cli;
mod commands;
mod config;
mod model;
mod storage;
mod ui;

use anyhow::Result;
use clap::Parser;
use config::Config;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = cli::Cli::parse();
    let config = Config::load()?;
    let command = args.command.unwrap_or(cli::Command::Tui {
        radius: None,
        filter: None,
    });
    match command {
        cli::Command::Init => commands::init(),
        cli::Command::Days { date, radius } => {
            commands::days(config.with_overrides(radius, None, args.tasks), date)
        }
        cli::Command::List { date, filter } => {
            commands::list(config.with_overrides(None, filter, args.tasks), date)
        }
        cli::Command::Tui { radius, filter } => {
            commands::tui(config.with_overrides(radius, filter, args.tasks))
        }
    }
}
