//! IBCI unified CLI tool
//!
//! Command-line interface for the IBCI front end: multi-file
//! compilation with diagnostics rendering, and build-order inspection.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod report;

#[derive(Parser)]
#[command(name = "ibci")]
#[command(about = "IBCI language front end", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an entry file and everything it imports
    Check {
        /// Entry source file
        entry: PathBuf,
        /// Project root the build is sandboxed to (defaults to the
        /// entry file's directory)
        #[arg(short, long)]
        root: Option<PathBuf>,
        /// Emit diagnostics as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Print the compilation order for an entry file
    Order {
        /// Entry source file
        entry: PathBuf,
        /// Project root the build is sandboxed to (defaults to the
        /// entry file's directory)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { entry, root, json } => commands::check::execute(entry, root, json),
        Commands::Order { entry, root } => commands::order::execute(entry, root),
    }
}
