//! `coursebook check <template-file>...`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use coursebook_renderer::Template;

/// Parse template files and report syntax errors.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Template files to check.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let mut failed = 0;
        for path in &self.files {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read '{}'", path.display()))?;
            let parsed = Template::parse(path.display().to_string(), &text)
                .and_then(|template| template.check_blocks().map(|()| template));
            match parsed {
                Ok(template) => println!(
                    "{} {} ({} directives)",
                    "ok".green(),
                    path.display(),
                    template.segments().len()
                ),
                Err(err) => {
                    failed += 1;
                    println!("{} {err}", "error".red());
                }
            }
        }
        if failed > 0 {
            bail!("{failed} of {} template(s) failed to parse", self.files.len());
        }
        Ok(())
    }
}
