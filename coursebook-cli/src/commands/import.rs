//! `coursebook import <export.json> --program <name> [--order ids] [--file-name NAME]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use coursebook_core::{
    import::{parse_course_export, ImportOptions},
    store, LanguageLevel,
};

/// Import a saved course export into a stored program.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the course export JSON.
    pub export: PathBuf,

    /// Program to add the course to; created when absent.
    #[arg(long, short = 'p')]
    pub program: String,

    /// Lesson and page ids, interleaved, giving order and page ownership.
    #[arg(long, value_delimiter = ',')]
    pub order: Vec<u32>,

    /// Output directory name for the course. Defaults to the export's file stem.
    #[arg(long)]
    pub file_name: Option<String>,

    /// Numeric course id.
    #[arg(long, default_value_t = 0)]
    pub id: u32,

    /// Course level as a 1-based group number (1 = beginner).
    #[arg(long, default_value_t = 0)]
    pub level: u32,
}

impl ImportArgs {
    pub fn run(self) -> Result<()> {
        let json = std::fs::read_to_string(&self.export)
            .with_context(|| format!("cannot read '{}'", self.export.display()))?;

        let file_name = self.file_name.or_else(|| {
            self.export
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        });
        let options = ImportOptions { order: self.order, file_name };
        let imported = parse_course_export(&json, &options)
            .with_context(|| format!("failed to import '{}'", self.export.display()))?;

        let mut course = imported.course;
        course.id = self.id;
        course.level = LanguageLevel::from_group(self.level);
        let course_name = course.name.clone();
        let dir = course.dir_name();
        let page_count = course.pages().count();

        let program = store::upsert_course(&self.program, course)
            .with_context(|| format!("failed to save program '{}'", self.program))?;

        println!(
            "✓ Imported '{}' into program '{}' ({} pages, {} courses total)",
            course_name,
            self.program,
            page_count,
            program.courses.len()
        );
        println!("  Pages render to: {}/", dir);
        if !imported.images.is_empty() {
            println!("  {} image(s) referenced; place them under {}/images/", imported.images.len(), dir);
            for src in &imported.images {
                println!("    - {src}");
            }
        }
        Ok(())
    }
}
