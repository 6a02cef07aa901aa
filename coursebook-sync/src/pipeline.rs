//! Render pipeline entrypoint used by the CLI.

use std::path::Path;

use crate::{render_all, render_program, RenderOptions, RenderProgramResult, SyncError};

/// Which stored programs a pipeline run renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderScope {
    /// Every stored program.
    All,
    /// A single program, by store key.
    Program(String),
}

/// Run the render pipeline for a scope.
pub fn run(
    home: &Path,
    scope: RenderScope,
    options: &RenderOptions,
) -> Result<Vec<RenderProgramResult>, SyncError> {
    match scope {
        RenderScope::All => render_all(home, options),
        RenderScope::Program(name) => Ok(vec![render_program(&name, home, options)?]),
    }
}

#[cfg(test)]
mod tests {
    use coursebook_core::{store, Program};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn run_all_empty_store_returns_empty_vec() {
        let home = TempDir::new().expect("home");
        let options = RenderOptions { dry_run: true, ..Default::default() };
        let result = run(home.path(), RenderScope::All, &options).expect("run");
        assert!(result.is_empty());
    }

    #[test]
    fn run_single_program_returns_single_result() {
        let home = TempDir::new().expect("home");
        store::save_program_at(home.path(), "english", &Program::named("English")).expect("save");

        let options = RenderOptions { dry_run: true, ..Default::default() };
        let result = run(home.path(), RenderScope::Program("english".to_string()), &options)
            .expect("run");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].program_name, "english");
        assert_eq!(result[0].writes.len(), 1, "a program without courses renders only its index");
    }

    #[test]
    fn unknown_program_is_a_store_error() {
        let home = TempDir::new().expect("home");
        let err = run(
            home.path(),
            RenderScope::Program("missing".to_string()),
            &RenderOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::Store(_)));
    }
}
