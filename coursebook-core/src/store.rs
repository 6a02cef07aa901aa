//! Per-program YAML store.
//!
//! # Storage layout
//!
//! ```text
//! ~/.coursebook/
//!   programs/
//!     <program_name>/
//!       program.yaml   (mode 0600)
//!       site/          (default render output)
//!   hashes/
//!     <program_name>.json
//! ```
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(home: &Path, …)`: explicit home, used in tests with `TempDir`
//! - `fn(…)`: resolves home via [`home`], delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::types::{Course, Program};

/// Environment variable that overrides the home directory.
pub const HOME_ENV: &str = "COURSEBOOK_HOME";

const PROGRAM_FILE: &str = "program.yaml";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.coursebook`
pub fn coursebook_root(home: &Path) -> PathBuf {
    home.join(".coursebook")
}

/// `<home>/.coursebook/programs`
pub fn programs_root(home: &Path) -> PathBuf {
    coursebook_root(home).join("programs")
}

/// `<home>/.coursebook/programs/<program>/`. Pure, no I/O.
pub fn program_dir_at(home: &Path, program: &str) -> PathBuf {
    programs_root(home).join(program)
}

/// `<home>/.coursebook/programs/<program>/program.yaml`. Pure, no I/O.
pub fn program_path_at(home: &Path, program: &str) -> PathBuf {
    program_dir_at(home, program).join(PROGRAM_FILE)
}

/// Default render output directory for a program.
pub fn site_dir_at(home: &Path, program: &str) -> PathBuf {
    program_dir_at(home, program).join("site")
}

/// Resolve the home directory: `$COURSEBOOK_HOME` first, then `dirs::home_dir()`.
pub fn home() -> Result<PathBuf, StoreError> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir().ok_or(StoreError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load a program from `<home>/.coursebook/programs/<program>/program.yaml`.
///
/// Returns `StoreError::ProgramNotFound` if absent,
/// `StoreError::Parse` (with path + line context) if malformed YAML.
pub fn load_program_at(home: &Path, program: &str) -> Result<Program, StoreError> {
    let path = program_path_at(home, program);
    if !path.exists() {
        return Err(StoreError::ProgramNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse { path, source: e })
}

/// `load_program_at` convenience wrapper.
pub fn load_program(program: &str) -> Result<Program, StoreError> {
    load_program_at(&home()?, program)
}

/// Walk `<home>/.coursebook/programs/*/program.yaml` and return every stored
/// program keyed by its directory name, sorted by that name.
///
/// Directories without a `program.yaml` are skipped.
pub fn list_programs_at(home: &Path) -> Result<Vec<(String, Program)>, StoreError> {
    let root = programs_root(home);
    if !root.exists() {
        return Ok(vec![]);
    }

    let mut entries: Vec<_> = std::fs::read_dir(&root)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut result = Vec::new();
    for entry in entries {
        let dir_name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path().join(PROGRAM_FILE);
        if !path.exists() {
            continue;
        }
        let contents = std::fs::read_to_string(&path)?;
        let program: Program = serde_yaml::from_str(&contents)
            .map_err(|e| StoreError::Parse { path, source: e })?;
        result.push((dir_name, program));
    }
    Ok(result)
}

/// `list_programs_at` convenience wrapper.
pub fn list_programs() -> Result<Vec<(String, Program)>, StoreError> {
    list_programs_at(&home()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save a program under the directory named `key`.
///
/// Write flow: serialize → `program.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// `.tmp` is always in the same directory as the target (same filesystem).
pub fn save_program_at(home: &Path, key: &str, program: &Program) -> Result<(), StoreError> {
    let dir = program_dir_at(home, key);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = dir.join(PROGRAM_FILE);
    let tmp_path = dir.join(format!("{PROGRAM_FILE}.tmp"));

    let yaml = serde_yaml::to_string(program)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_program_at` convenience wrapper.
pub fn save_program(key: &str, program: &Program) -> Result<(), StoreError> {
    save_program_at(&home()?, key, program)
}

// ---------------------------------------------------------------------------
// 4. Upsert course
// ---------------------------------------------------------------------------

/// Add or replace `course` in the program stored under `key`.
///
/// Creates the program when absent. A course with the same
/// [`Course::dir_name`] is replaced in place; otherwise the course is
/// appended. The program level is recomputed before saving.
pub fn upsert_course_at(home: &Path, key: &str, course: Course) -> Result<Program, StoreError> {
    let mut program = match load_program_at(home, key) {
        Ok(program) => program,
        Err(StoreError::ProgramNotFound { .. }) => Program::named(key),
        Err(e) => return Err(e),
    };

    let dir = course.dir_name();
    match program.courses.iter_mut().find(|c| c.dir_name() == dir) {
        Some(existing) => {
            tracing::info!("replacing course '{}' in program '{}'", dir, key);
            *existing = course;
        }
        None => {
            tracing::info!("adding course '{}' to program '{}'", dir, key);
            program.courses.push(course);
        }
    }
    program.recompute_level();

    save_program_at(home, key, &program)?;
    Ok(program)
}

/// `upsert_course_at` convenience wrapper.
pub fn upsert_course(key: &str, course: Course) -> Result<Program, StoreError> {
    upsert_course_at(&home()?, key, course)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LanguageLevel, Lesson, Page};
    use tempfile::TempDir;

    fn make_home() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    fn course(id: u32, level: LanguageLevel) -> Course {
        Course {
            id,
            file_name: None,
            name: format!("Course {id}"),
            description: None,
            level,
            pic_file: None,
            lessons: vec![Lesson {
                id: 1,
                name: "Intro".into(),
                description: None,
                pages: vec![Page { id: 100, name: None, last_update: None, rule: Some("<p/>".into()) }],
            }],
        }
    }

    #[test]
    fn program_path_is_correct() {
        let home = make_home();
        let path = program_path_at(home.path(), "english");
        assert!(path.ends_with(".coursebook/programs/english/program.yaml"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let home = make_home();
        let mut program = Program::named("English");
        program.courses.push(course(7, LanguageLevel::BEGINNER));
        save_program_at(home.path(), "english", &program).expect("save");
        let loaded = load_program_at(home.path(), "english").expect("load");
        assert_eq!(loaded, program);
    }

    #[test]
    fn save_sets_permissions_and_cleans_tmp() {
        let home = make_home();
        save_program_at(home.path(), "english", &Program::named("English")).expect("save");
        let dir = program_dir_at(home.path(), "english");
        assert!(!dir.join("program.yaml.tmp").exists(), ".tmp must be gone after save");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(dir.join("program.yaml"))
                .unwrap()
                .permissions()
                .mode()
                & 0o777;
            assert_eq!(mode, 0o600);
        }
    }

    #[test]
    fn load_missing_program_returns_not_found() {
        let home = make_home();
        let err = load_program_at(home.path(), "nope").unwrap_err();
        assert!(matches!(err, StoreError::ProgramNotFound { .. }));
    }

    #[test]
    fn load_malformed_program_returns_parse_error() {
        let home = make_home();
        let path = program_path_at(home.path(), "broken");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "name: [unclosed").unwrap();
        let err = load_program_at(home.path(), "broken").unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn list_programs_empty_when_root_missing() {
        let home = make_home();
        assert!(list_programs_at(home.path()).expect("list").is_empty());
    }

    #[test]
    fn upsert_creates_then_replaces() {
        let home = make_home();
        let p = upsert_course_at(home.path(), "english", course(1, LanguageLevel::BEGINNER))
            .expect("first upsert");
        assert_eq!(p.courses.len(), 1);
        assert_eq!(p.level, LanguageLevel::BEGINNER);

        let mut replacement = course(1, LanguageLevel::ADVANCED);
        replacement.name = "Renamed".into();
        let p = upsert_course_at(home.path(), "english", replacement).expect("replace");
        assert_eq!(p.courses.len(), 1);
        assert_eq!(p.courses[0].name, "Renamed");

        let p = upsert_course_at(home.path(), "english", course(2, LanguageLevel::BEGINNER))
            .expect("append");
        assert_eq!(p.courses.len(), 2);
        assert_eq!(p.level, LanguageLevel::BEGINNER | LanguageLevel::ADVANCED);
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(StoreError::HomeNotFound.to_string().contains("home directory"));
    }
}
