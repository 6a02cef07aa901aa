//! Coursebook: import course programs and render them to static HTML.
//!
//! # Usage
//!
//! ```text
//! coursebook import <export.json> --program <name> [--order 1,2,3] [--file-name NAME] [--id N] [--level N]
//! coursebook list
//! coursebook render <program> [--out DIR] [--dry-run] [--templates DIR]
//! coursebook render --all [--out DIR] [--dry-run] [--templates DIR]
//! coursebook check <template-file>...
//! ```

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, import::ImportArgs, list::ListArgs, render::RenderArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "coursebook",
    version,
    about = "Import course programs and render them to static HTML pages",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a saved course export into a stored program.
    Import(ImportArgs),

    /// List stored programs.
    List(ListArgs),

    /// Render stored programs to HTML.
    Render(RenderArgs),

    /// Parse template files and report syntax errors.
    Check(CheckArgs),
}

impl Commands {
    fn run(self) -> Result<()> {
        match self {
            Commands::Import(args) => args.run(),
            Commands::List(args) => args.run(),
            Commands::Render(args) => args.run(),
            Commands::Check(args) => args.run(),
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    match cli.command.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            for cause in err.chain().skip(1) {
                eprintln!("  caused by: {cause}");
            }
            ExitCode::FAILURE
        }
    }
}
