//! `coursebook render`: render stored programs to HTML.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use coursebook_core::store;
use coursebook_sync::{
    pipeline::{self, RenderScope},
    RenderOptions, RenderProgramResult, WriteResult,
};

/// Arguments for `coursebook render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Program to render (omit when using `--all`).
    pub program: Option<String>,

    /// Render every stored program.
    #[arg(long, conflicts_with = "program")]
    pub all: bool,

    /// Output directory. With `--all`, each program goes to `<DIR>/<program>`.
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Directory of `.tpl` files overriding the built-in templates.
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let home = store::home().context("could not determine home directory")?;
        log::debug!("program store home: {}", home.display());
        let options = RenderOptions {
            out_dir: self.out,
            templates: self.templates,
            dry_run: self.dry_run,
        };

        if self.all {
            let results = pipeline::run(&home, RenderScope::All, &options)
                .context("render --all failed")?;
            for r in &results {
                print_result(r, options.dry_run);
            }
            if results.is_empty() {
                println!("No programs stored. Run `coursebook import` first.");
            }
        } else {
            let name = self
                .program
                .context("provide a program name or use --all")?;
            let results = pipeline::run(&home, RenderScope::Program(name.clone()), &options)
                .with_context(|| format!("render failed for '{name}'"))?;
            for r in &results {
                print_result(r, options.dry_run);
            }
        }
        Ok(())
    }
}

fn print_result(result: &RenderProgramResult, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let written = result.written();
    let unchanged = result.writes.len() - written;

    println!(
        "{prefix}{} '{}' rendered to {} ({} written, {} unchanged)",
        "✓".green(),
        result.program_name,
        result.site_dir.display(),
        written,
        unchanged
    );
    for w in &result.writes {
        match w {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { .. } => {}
        }
    }
}
