use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const EXPORT: &str = r#"{
    "course": { "name": "Grammar", "description": "Basics of grammar" },
    "lesson": {
        "1": { "name": "Nouns" },
        "2": { "name": "Verbs" }
    },
    "item": {
        "10": { "title": "Plural", "field": { "text": "<p>plural</p>" } },
        "11": { "title": "Articles", "field": { "text": "<img src=\"http://cdn/img/a.png\">" } },
        "20": { "title": "Tenses", "field": { "text": "<p>tenses</p>" } }
    }
}"#;

fn coursebook(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("coursebook").expect("binary");
    cmd.env("COURSEBOOK_HOME", home).env("NO_COLOR", "1").env("RUST_LOG", "warn");
    cmd
}

fn import_grammar(home: &TempDir) {
    let export = home.path().join("grammar.json");
    fs::write(&export, EXPORT).unwrap();
    coursebook(home.path())
        .args(["import", export.to_str().unwrap(), "--program", "english"])
        .args(["--order", "1,10,11,2,20", "--level", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 'Grammar' into program 'english' (3 pages"))
        .stdout(predicate::str::contains("http://cdn/img/a.png"));
}

#[test]
fn import_stores_program_and_list_shows_it() {
    let home = TempDir::new().unwrap();
    import_grammar(&home);

    assert!(home.path().join(".coursebook/programs/english/program.yaml").exists());
    coursebook(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("english"))
        .stdout(predicate::str::contains("Beginner"));
}

#[test]
fn list_on_empty_store_hints_at_import() {
    let home = TempDir::new().unwrap();
    coursebook(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No programs stored."));
}

#[test]
fn dry_run_render_reports_files_and_writes_nothing() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    import_grammar(&home);

    coursebook(home.path())
        .args(["render", "english", "--dry-run", "--out", out.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run]"))
        .stdout(predicate::str::contains("Lesson_20.html"));
    assert!(!out.path().join("Course.html").exists());
}

#[test]
fn render_writes_site_and_second_run_is_unchanged() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    import_grammar(&home);

    let out_arg = out.path().to_str().unwrap();
    coursebook(home.path())
        .args(["render", "english", "--out", out_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("(4 written, 0 unchanged)"));

    let page = fs::read_to_string(out.path().join("grammar").join("Lesson_11.html")).unwrap();
    assert!(page.contains("<img src=\"images/a.png\">"));
    assert!(page.contains("<a class=\"prev\" href=\"Lesson_10.html\">Previous</a>"));

    coursebook(home.path())
        .args(["render", "english", "--out", out_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("(0 written, 4 unchanged)"));
}

#[test]
fn render_all_uses_one_directory_per_program() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    import_grammar(&home);

    coursebook(home.path())
        .args(["render", "--all", "--out", out.path().to_str().unwrap()])
        .assert()
        .success();
    assert!(out.path().join("english").join("Course.html").exists());
}

#[test]
fn render_unknown_program_prints_cause_chain() {
    let home = TempDir::new().unwrap();
    coursebook(home.path())
        .args(["render", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: render failed for 'nope'"))
        .stderr(predicate::str::contains("caused by: store error: program not found"));
}

#[test]
fn render_requires_program_or_all() {
    let home = TempDir::new().unwrap();
    coursebook(home.path())
        .arg("render")
        .assert()
        .failure()
        .stderr(predicate::str::contains("provide a program name or use --all"));
}

#[test]
fn check_reports_line_of_bad_directive() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.tpl");
    let bad = dir.path().join("bad.tpl");
    fs::write(&good, "<%foreach (var c in items) {%><%#c%><%}%>").unwrap();
    fs::write(&bad, "line one\n<% while (x) { %>\n").unwrap();

    coursebook(dir.path())
        .args(["check", good.to_str().unwrap(), bad.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("ok"))
        .stdout(predicate::str::contains("bad.tpl:2 (directive #1): unsupported directive"))
        .stderr(predicate::str::contains("1 of 2 template(s) failed to parse"));
}

#[test]
fn check_catches_unclosed_block() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("open.tpl");
    fs::write(&file, "<%if (page.has_name) {%>\nname\n").unwrap();

    coursebook(dir.path())
        .args(["check", file.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("block is never closed"));
}
