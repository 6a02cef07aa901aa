//! Import of a locally saved course export (JSON).
//!
//! The export lists lessons and pages as flat id-keyed maps. Page ownership
//! and ordering come from an optional id list in which lesson ids and page
//! ids are interleaved: each page belongs to the lesson named most recently
//! before it.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::error::ImportError;
use crate::types::{Course, LanguageLevel, Lesson, Page};

#[derive(Debug, Deserialize)]
struct Export {
    #[serde(default)]
    course: ExportCourse,
    #[serde(default)]
    lesson: BTreeMap<u32, ExportLesson>,
    #[serde(default)]
    item: BTreeMap<u32, ExportItem>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportCourse {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExportLesson {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExportItem {
    title: Option<String>,
    field: Option<ExportField>,
}

#[derive(Debug, Deserialize)]
struct ExportField {
    text: Option<String>,
}

/// Knobs for [`parse_course_export`].
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Interleaved lesson/page ids giving order and page ownership.
    pub order: Vec<u32>,
    /// Output directory name for the course; also the fallback course name.
    pub file_name: Option<String>,
}

/// Result of an import: the course plus the image sources its pages reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedCourse {
    pub course: Course,
    /// Original `src` values, in page order, before rewriting to `images/…`.
    pub images: Vec<String>,
}

/// Parse a course export payload into a [`Course`].
pub fn parse_course_export(json: &str, options: &ImportOptions) -> Result<ImportedCourse, ImportError> {
    let export: Export = serde_json::from_str(json)?;

    let name = non_empty(export.course.name)
        .or_else(|| options.file_name.clone())
        .unwrap_or_else(|| "Untitled".to_string());
    tracing::info!("course name: {}", name);

    let rank = |id: u32| {
        options
            .order
            .iter()
            .position(|o| *o == id)
            .unwrap_or(usize::MAX)
    };

    let mut lessons: Vec<Lesson> = export
        .lesson
        .into_iter()
        .map(|(id, l)| Lesson {
            id,
            name: non_empty(l.name).unwrap_or_default(),
            description: non_empty(l.description),
            pages: Vec::new(),
        })
        .collect();
    lessons.sort_by_key(|l| (rank(l.id), l.id));

    let first = match lessons.first() {
        Some(lesson) => lesson.id,
        None => return Err(ImportError::NoLessons { name }),
    };

    // Walk the order list: lesson ids switch the current owner, anything
    // else is a page owned by the current lesson.
    let mut owner: HashMap<u32, u32> = HashMap::new();
    let mut current = first;
    for id in &options.order {
        if lessons.iter().any(|l| l.id == *id) {
            current = *id;
        } else {
            owner.insert(*id, current);
        }
    }

    let mut images = Vec::new();
    let mut pages: Vec<(u32, Page)> = Vec::new();
    for (id, item) in export.item {
        let Some(text) = item.field.and_then(|f| f.text) else {
            tracing::debug!("skipping page {} without rule text", id);
            continue;
        };
        let (rule, sources) = rewrite_image_links(&text);
        images.extend(sources);
        let lesson_id = owner.get(&id).copied().unwrap_or(first);
        pages.push((
            lesson_id,
            Page {
                id,
                name: non_empty(item.title),
                last_update: None,
                rule: Some(rule),
            },
        ));
    }
    pages.sort_by_key(|(_, p)| (rank(p.id), p.id));

    for (lesson_id, page) in pages {
        if let Some(lesson) = lessons.iter_mut().find(|l| l.id == lesson_id) {
            lesson.pages.push(page);
        }
    }
    lessons.retain(|l| !l.pages.is_empty());

    for lesson in &lessons {
        tracing::info!("lesson name: {} ({} pages)", lesson.name, lesson.pages.len());
    }

    Ok(ImportedCourse {
        course: Course {
            id: 0,
            file_name: options.file_name.clone(),
            name,
            description: non_empty(export.course.description),
            level: LanguageLevel::UNKNOWN,
            pic_file: None,
            lessons,
        },
        images,
    })
}

/// Rewrite every `src="…"` in `rule` to `images/<file name>`.
///
/// Empty sources and `#` are left alone. Returns the rewritten text and the
/// original sources in document order.
pub fn rewrite_image_links(rule: &str) -> (String, Vec<String>) {
    const MARKER: &str = "src=\"";

    let mut out = String::with_capacity(rule.len());
    let mut sources = Vec::new();
    let mut rest = rule;

    while let Some(at) = rest.find(MARKER) {
        let start = at + MARKER.len();
        out.push_str(&rest[..start]);
        let Some(len) = rest[start..].find('"') else {
            // Unterminated attribute: copy the remainder verbatim.
            rest = &rest[start..];
            break;
        };
        let src = &rest[start..start + len];
        if src.is_empty() || src == "#" {
            out.push_str(src);
        } else {
            let file = src.rsplit(['/', '\\']).next().unwrap_or(src);
            out.push_str("images/");
            out.push_str(file);
            sources.push(src.to_string());
        }
        rest = &rest[start + len..];
    }
    out.push_str(rest);
    (out, sources)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
