//! Template store and program [`Renderer`].
//!
//! # Output layout
//!
//! | Page          | Template      | Output path                          |
//! |---------------|---------------|--------------------------------------|
//! | Program index | `course.html` | `Course.html`                        |
//! | Lesson page   | `lesson.html` | `<course dir>/Lesson_<page id>.html` |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use coursebook_core::types::Program;

use crate::context::Context;
use crate::error::RenderError;
use crate::template::Template;

/// Template rendered once per program.
pub const PROGRAM_TEMPLATE: &str = "course.html";
/// Template rendered once per page.
pub const PAGE_TEMPLATE: &str = "lesson.html";

/// Extension of template files in a user override directory.
const TEMPLATE_EXT: &str = "tpl";

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    (PROGRAM_TEMPLATE, include_str!("templates/course.html.tpl")),
    (PAGE_TEMPLATE, include_str!("templates/lesson.html.tpl")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

/// `Lessons\Lesson.HTML.tpl` → `lessons/lesson.html`.
fn normalize_template_name(path: &Path) -> String {
    let name = path.to_string_lossy().replace('\\', "/").to_lowercase();
    match name.strip_suffix(".tpl") {
        Some(stem) => stem.to_string(),
        None => name,
    }
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        tracing::debug!("template dir {} does not exist, using defaults", dir.display());
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some(TEMPLATE_EXT) {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!("loaded template override '{}' from {}", name, path.display());
        templates.push((name, contents));
    }
    Ok(templates)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Parsed templates by name, with optional user overrides.
///
/// `user_template_dir` may contain `.tpl` files that override embedded
/// defaults or add new templates. Every template is parsed up front, so a
/// malformed override fails construction rather than a later render.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    templates: BTreeMap<String, Template>,
}

impl TemplateEngine {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let mut sources: BTreeMap<String, String> = TPLS
            .iter()
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect();
        if let Some(dir) = user_template_dir {
            sources.extend(load_user_templates(dir)?);
        }

        let mut engine = TemplateEngine { templates: BTreeMap::new() };
        for (name, text) in sources {
            engine.add_raw_template(name, &text)?;
        }
        Ok(engine)
    }

    /// Parse `text` and register it as `name`, replacing any previous template.
    pub fn add_raw_template(&mut self, name: impl Into<String>, text: &str) -> Result<(), RenderError> {
        let template = Template::parse(name, text)?;
        self.templates.insert(template.name().to_string(), template);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Template, RenderError> {
        self.templates
            .get(name)
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))
    }

    /// Registered template names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn render(&self, name: &str, ctx: &Context<'_>) -> Result<String, RenderError> {
        self.get(name)?.render(ctx)
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders every page of a [`Program`].
///
/// Create once with [`Renderer::new`] and reuse across programs.
#[derive(Debug, Clone)]
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(user_template_dir)? })
    }

    pub fn with_engine(engine: TemplateEngine) -> Self {
        Renderer { engine }
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    /// Render the program index and one page per course page.
    ///
    /// Returns `Vec<(output_path, rendered_content)>` with paths under `root`,
    /// the index first, then pages in course, lesson, page order.
    pub fn render_program(
        &self,
        program: &Program,
        root: &Path,
    ) -> Result<Vec<(PathBuf, String)>, RenderError> {
        let mut results = Vec::new();

        let index = self.engine.render(PROGRAM_TEMPLATE, &Context::for_program(program))?;
        results.push((root.join("Course.html"), index));

        for course in &program.courses {
            let dir = root.join(course.dir_name());
            for (lesson, page) in course.pages() {
                let ctx = Context::for_page(program, course, lesson, page);
                let content = self.engine.render(PAGE_TEMPLATE, &ctx)?;
                results.push((dir.join(format!("Lesson_{}.html", page.id)), content));
            }
        }

        tracing::debug!("rendered {} files for program '{}'", results.len(), program.name);
        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
