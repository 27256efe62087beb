use crate::model::StatusFilter;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskday", version, about = "Terminal day agenda for your tasks")]
pub struct Cli {
    /// Task file to read instead of the project/global one
    #[arg(long, global = true)]
    pub tasks: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the sample task file to .taskday/tasks.yml in the current directory
    Init,
    /// Print the day strip around a date
    Days {
        /// Center date in YYYY-MM-DD format (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Days shown on each side of the center date
        #[arg(long)]
        radius: Option<i64>,
    },
    /// List the tasks of a day
    List {
        /// Date in YYYY-MM-DD format (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Status filter: all, todo, in-progress, completed
        #[arg(long, short = 'f')]
        filter: Option<StatusFilter>,
    },
    /// Launch the interactive TUI
    Tui {
        /// Days shown on each side of the selected date
        #[arg(long)]
        radius: Option<i64>,
        /// Initial status filter
        #[arg(long, short = 'f')]
        filter: Option<StatusFilter>,
    },
}
