use std::fs;
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use tempfile::TempDir;

use coursebook_core::{store, Course, LanguageLevel, Lesson, Page, Program};
use coursebook_sync::{
    hash_store, pipeline, render_program, RenderOptions, RenderScope, SyncError, WriteResult,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sample_program(name: &str) -> Program {
    let mut program = Program::named(name);
    program.courses = vec![Course {
        id: 5,
        file_name: Some("basics".to_string()),
        name: "Basics".to_string(),
        description: None,
        level: LanguageLevel::BEGINNER,
        pic_file: None,
        lessons: vec![Lesson {
            id: 1,
            name: "Greetings".to_string(),
            description: None,
            pages: vec![
                Page { id: 10, name: Some("Hello".to_string()), last_update: None, rule: Some("<p>hi</p>".to_string()) },
                Page { id: 11, name: None, last_update: None, rule: Some("<p>bye</p>".to_string()) },
            ],
        }],
    }];
    program
}

fn save(home: &TempDir, key: &str) {
    store::save_program_at(home.path(), key, &sample_program(key)).expect("save program");
}

#[test]
fn first_render_writes_every_page_to_default_site_dir() {
    init_logging();
    let home = TempDir::new().unwrap();
    save(&home, "english");

    let result = render_program("english", home.path(), &RenderOptions::default()).expect("render");
    let site = store::site_dir_at(home.path(), "english");
    assert_eq!(result.site_dir, site);
    assert_eq!(result.writes.len(), 3);
    assert!(result.writes.iter().all(|w| matches!(w, WriteResult::Written { .. })));

    assert!(site.join("Course.html").exists());
    let page = fs::read_to_string(site.join("basics").join("Lesson_11.html")).unwrap();
    assert!(page.contains("<h1>Greetings</h1>"));

    let hashes = hash_store::load_at(home.path(), "english").unwrap();
    assert_eq!(hashes.files.len(), 3);
}

#[test]
fn unchanged_rerender_leaves_files_untouched() {
    init_logging();
    let home = TempDir::new().unwrap();
    save(&home, "english");
    render_program("english", home.path(), &RenderOptions::default()).expect("first render");

    let target = store::site_dir_at(home.path(), "english").join("Course.html");
    let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(24 * 60 * 60));
    set_file_mtime(&target, old).unwrap();

    let second = render_program("english", home.path(), &RenderOptions::default()).expect("second render");
    assert_eq!(second.written(), 0);
    let mtime = FileTime::from_last_modification_time(&fs::metadata(&target).unwrap());
    assert_eq!(mtime, old, "unchanged page must not be rewritten");
}

#[test]
fn dry_run_writes_nothing_and_keeps_hash_store() {
    init_logging();
    let home = TempDir::new().unwrap();
    save(&home, "english");

    let options = RenderOptions { dry_run: true, ..Default::default() };
    let result = render_program("english", home.path(), &options).expect("dry run");
    assert!(result.writes.iter().all(|w| matches!(w, WriteResult::WouldWrite { .. })));
    assert!(!store::site_dir_at(home.path(), "english").exists());
    assert!(!hash_store::store_path_at(home.path(), "english").exists());
}

#[test]
fn out_dir_and_template_overrides_are_honoured() {
    init_logging();
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    fs::write(templates.path().join("course.html.tpl"), "<%#program.name%>:<%#program.course_count%>").unwrap();
    save(&home, "english");

    let options = RenderOptions {
        out_dir: Some(out.path().to_path_buf()),
        templates: Some(templates.path().to_path_buf()),
        dry_run: false,
    };
    render_program("english", home.path(), &options).expect("render");
    assert_eq!(fs::read_to_string(out.path().join("Course.html")).unwrap(), "english:1");
    assert!(out.path().join("basics").join("Lesson_10.html").exists());
}

#[test]
fn render_all_places_each_program_under_out_dir() {
    init_logging();
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    save(&home, "english");
    save(&home, "spanish");

    let options = RenderOptions { out_dir: Some(out.path().to_path_buf()), ..Default::default() };
    let results = pipeline::run(home.path(), RenderScope::All, &options).expect("render all");
    let names: Vec<&str> = results.iter().map(|r| r.program_name.as_str()).collect();
    assert_eq!(names, vec!["english", "spanish"]);
    assert!(out.path().join("english").join("Course.html").exists());
    assert!(out.path().join("spanish").join("basics").join("Lesson_11.html").exists());
}

#[test]
fn broken_template_aborts_before_any_write() {
    init_logging();
    let home = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    fs::write(templates.path().join("lesson.html.tpl"), "<%#page.missing%>").unwrap();
    save(&home, "english");

    let options = RenderOptions { templates: Some(templates.path().to_path_buf()), ..Default::default() };
    let err = render_program("english", home.path(), &options).unwrap_err();
    assert!(matches!(err, SyncError::Render(_)));
    assert!(!store::site_dir_at(home.path(), "english").exists());
}
