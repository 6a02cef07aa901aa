//! `coursebook list`

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use coursebook_core::store;

/// List stored programs.
#[derive(Args, Debug)]
pub struct ListArgs {}

#[derive(Tabled)]
struct ProgramRow {
    #[tabled(rename = "program")]
    key: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "level")]
    level: String,
    #[tabled(rename = "courses")]
    courses: usize,
    #[tabled(rename = "lessons")]
    lessons: usize,
    #[tabled(rename = "pages")]
    pages: usize,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let programs = store::list_programs().context("failed to read the program store")?;

        if programs.is_empty() {
            println!("No programs stored.");
            println!("Run: coursebook import <export.json> --program <name>");
            return Ok(());
        }

        let rows: Vec<ProgramRow> = programs
            .into_iter()
            .map(|(key, program)| ProgramRow {
                key,
                level: program.level.to_string(),
                courses: program.courses.len(),
                lessons: program.courses.iter().map(|c| c.lessons.len()).sum(),
                pages: program.courses.iter().map(|c| c.pages().count()).sum(),
                name: program.name,
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
