//! Command-line arguments for the `nexplan` host.
//!
//! Each subcommand maps to one project store operation, plus CSV
//! export and a watch mode that follows writes from other processes.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Spreadsheet-style project tracker
#[derive(Parser, Debug)]
#[command(name = "nexplan", version, about = "Spreadsheet-style project tracker")]
pub struct CliArgs {
    /// JSON config file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// State database file (overrides config and environment)
    #[arg(long, value_name = "FILE", global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the project as a table
    Show,
    /// Rename the project
    Rename { name: String },
    /// Set one cell value
    Set {
        row: String,
        column: String,
        value: String,
    },
    /// Append an empty row
    AddRow,
    /// Delete a row by id
    DeleteRow { id: String },
    /// Append a text column
    AddColumn { title: Option<String> },
    /// Delete a column by id (cell data stays in rows)
    DeleteColumn { id: String },
    /// Persist the current project again
    Save,
    /// Replace all columns and rows with a CSV file
    Import { file: PathBuf },
    /// Write the project as CSV
    Export {
        /// Output path; defaults to the project name with `.csv`
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Follow changes written by other processes
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 500)]
        interval_ms: u64,
    },
}
