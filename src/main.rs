use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli_exec;

#[derive(Parser)]
#[command(name = "celledit")]
#[command(about = "Edit the queries of a dashboard cell", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Debug)]
struct SessionArgs {
    /// Session JSON: the cell, sources, templates and palettes
    #[arg(long, value_name = "PATH")]
    session: PathBuf,

    /// Editor config JSON (defaults apply when omitted)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base URL for relative parse endpoints (overrides the config)
    #[arg(long)]
    parser_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the cell editor in the terminal
    Edit {
        #[command(flatten)]
        session: SessionArgs,

        /// Write the saved cell here instead of stdout
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,

        /// Log file while the editor owns the terminal
        #[arg(long, value_name = "PATH")]
        log_file: Option<PathBuf>,
    },

    /// Report whether the cell can be saved and print the payload it would save
    Check {
        #[command(flatten)]
        session: SessionArgs,

        /// Resolve raw-text queries through the parse service first
        #[arg(long)]
        resolve: bool,

        /// Seconds to wait for each resolution
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Edit {
            session,
            out,
            log_file,
        } => cli_exec::handle_edit(&session, out, log_file),
        Commands::Check {
            session,
            resolve,
            timeout_secs,
            json,
        } => cli_exec::handle_check(&session, resolve, timeout_secs, json),
    }
}
