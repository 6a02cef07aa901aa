//! Render context: the bindings a template starts from.
//!
//! Domain types are exposed to templates through small view records that
//! borrow from a [`Program`]. Each view answers a fixed set of snake_case
//! field names; navigation fields (`page.lesson`, `lesson.course`,
//! `course.program`) hand out further views.

use std::collections::HashMap;
use std::rc::Rc;

use coursebook_core::types::{Course, LanguageLevel, Lesson, Page, Program};

use crate::value::{Record, Value};

/// Named values and named sequences seeded into every render.
#[derive(Debug, Default, Clone)]
pub struct Context<'a> {
    variables: HashMap<String, Value<'a>>,
    enumerators: HashMap<String, Rc<[Value<'a>]>>,
}

impl<'a> Context<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable, replacing any previous binding of `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value<'a>>) -> &mut Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Bind a named sequence for `foreach`.
    pub fn insert_enumerator<I>(&mut self, name: impl Into<String>, items: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value<'a>>,
    {
        let items: Rc<[Value<'a>]> = items.into_iter().map(Into::into).collect();
        self.enumerators.insert(name.into(), items);
        self
    }

    pub fn variables(&self) -> &HashMap<String, Value<'a>> {
        &self.variables
    }

    pub fn enumerators(&self) -> &HashMap<String, Rc<[Value<'a>]>> {
        &self.enumerators
    }

    /// Bind every top-level key of a JSON object as a variable.
    ///
    /// Any other JSON root binds nothing.
    pub fn from_json(data: &'a serde_json::Value) -> Self {
        let mut ctx = Context::new();
        if let Some(map) = data.as_object() {
            for (key, value) in map {
                ctx.insert(key.as_str(), value);
            }
        }
        ctx
    }

    /// Program page: `program` plus the `courses_by_level` enumerator.
    pub fn for_program(program: &'a Program) -> Self {
        let mut ctx = Context::new();
        ctx.insert("program", Value::record(ProgramView { program }));
        ctx.insert_enumerator(
            "courses_by_level",
            program
                .courses_by_level()
                .into_iter()
                .map(|(level, courses)| Value::record(LevelGroup { program, level, courses })),
        );
        ctx
    }

    /// Program bindings plus `course`.
    pub fn for_course(program: &'a Program, course: &'a Course) -> Self {
        let mut ctx = Self::for_program(program);
        ctx.insert("course", Value::record(CourseView { program, course }));
        ctx
    }

    /// Course bindings plus `lesson`.
    pub fn for_lesson(program: &'a Program, course: &'a Course, lesson: &'a Lesson) -> Self {
        let mut ctx = Self::for_course(program, course);
        ctx.insert("lesson", Value::record(LessonView { program, course, lesson }));
        ctx
    }

    /// Lesson bindings plus `page`.
    pub fn for_page(
        program: &'a Program,
        course: &'a Course,
        lesson: &'a Lesson,
        page: &'a Page,
    ) -> Self {
        let mut ctx = Self::for_lesson(program, course, lesson);
        ctx.insert("page", Value::record(PageView { program, course, lesson, page }));
        ctx
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

fn text(s: &Option<String>) -> Value<'_> {
    s.as_deref().into()
}

fn course_views<'a>(program: &'a Program, courses: &[&'a Course]) -> Value<'a> {
    Value::list(
        courses
            .iter()
            .map(|&course| Value::record(CourseView { program, course })),
    )
}

struct ProgramView<'a> {
    program: &'a Program,
}

impl<'a> Record<'a> for ProgramView<'a> {
    fn kind(&self) -> &str {
        "Program"
    }

    fn field(&self, name: &str) -> Option<Value<'a>> {
        let p = self.program;
        Some(match name {
            "name" => p.name.as_str().into(),
            "type" => text(&p.kind),
            "author" => text(&p.author),
            "has_author" => p.author.is_some().into(),
            "level" => p.level.to_string().into(),
            "description" => text(&p.description),
            "has_description" => p.description.is_some().into(),
            "icon_file" => text(&p.icon_file),
            "cover_file" => text(&p.cover_file),
            "courses" => course_views(p, &p.courses.iter().collect::<Vec<_>>()),
            "course_count" => p.courses.len().into(),
            _ => return None,
        })
    }
}

/// Courses sharing one level; iterable in `foreach`.
struct LevelGroup<'a> {
    program: &'a Program,
    level: LanguageLevel,
    courses: Vec<&'a Course>,
}

impl<'a> Record<'a> for LevelGroup<'a> {
    fn kind(&self) -> &str {
        "LevelGroup"
    }

    fn field(&self, name: &str) -> Option<Value<'a>> {
        Some(match name {
            "level" => self.level.to_string().into(),
            "courses" => course_views(self.program, &self.courses),
            "course_count" => self.courses.len().into(),
            _ => return None,
        })
    }

    fn items(&self) -> Option<Vec<Value<'a>>> {
        let program = self.program;
        Some(
            self.courses
                .iter()
                .map(|&course| Value::record(CourseView { program, course }))
                .collect(),
        )
    }
}

struct CourseView<'a> {
    program: &'a Program,
    course: &'a Course,
}

impl<'a> Record<'a> for CourseView<'a> {
    fn kind(&self) -> &str {
        "Course"
    }

    fn field(&self, name: &str) -> Option<Value<'a>> {
        let (program, c) = (self.program, self.course);
        Some(match name {
            "id" => c.id.into(),
            "name" => c.name.as_str().into(),
            "description" => text(&c.description),
            "has_description" => c.description.is_some().into(),
            "level" => c.level.to_string().into(),
            "pic_file" => text(&c.pic_file),
            "dir_name" => c.dir_name().into(),
            "first_page" => c.first_page_id().into(),
            "lessons" => Value::list(
                c.lessons
                    .iter()
                    .map(|lesson| Value::record(LessonView { program, course: c, lesson })),
            ),
            "lesson_count" => c.lessons.len().into(),
            "page_count" => c.pages().count().into(),
            "program" => Value::record(ProgramView { program }),
            _ => return None,
        })
    }
}

struct LessonView<'a> {
    program: &'a Program,
    course: &'a Course,
    lesson: &'a Lesson,
}

impl<'a> Record<'a> for LessonView<'a> {
    fn kind(&self) -> &str {
        "Lesson"
    }

    fn field(&self, name: &str) -> Option<Value<'a>> {
        let (program, course, l) = (self.program, self.course, self.lesson);
        Some(match name {
            "id" => l.id.into(),
            "name" => l.name.as_str().into(),
            "description" => text(&l.description),
            "has_description" => l.description.is_some().into(),
            "sort" => course.lesson_sort(l.id).into(),
            "first_page" => l.pages.first().map(|p| p.id).unwrap_or(0).into(),
            "pages" => Value::list(
                l.pages
                    .iter()
                    .map(|page| Value::record(PageView { program, course, lesson: l, page })),
            ),
            "page_count" => l.pages.len().into(),
            "course" => Value::record(CourseView { program, course }),
            _ => return None,
        })
    }
}

struct PageView<'a> {
    program: &'a Program,
    course: &'a Course,
    lesson: &'a Lesson,
    page: &'a Page,
}

impl<'a> Record<'a> for PageView<'a> {
    fn kind(&self) -> &str {
        "Page"
    }

    fn field(&self, name: &str) -> Option<Value<'a>> {
        let (program, course, lesson, p) = (self.program, self.course, self.lesson, self.page);
        Some(match name {
            "id" => p.id.into(),
            "name" => text(&p.name),
            "has_name" => p.has_name().into(),
            "last_update" => p.last_update.into(),
            "has_last_update" => p.last_update.is_some().into(),
            "rule" => text(&p.rule),
            "has_rule" => p.rule.is_some().into(),
            "sort" => lesson.page_sort(p.id).into(),
            "prev_page" => course.prev_page_id(p.id).into(),
            "next_page" => course.next_page_id(p.id).into(),
            "has_prev" => (course.prev_page_id(p.id) != 0).into(),
            "has_next" => (course.next_page_id(p.id) != 0).into(),
            "lesson" => Value::record(LessonView { program, course, lesson }),
            "course" => Value::record(CourseView { program, course }),
            _ => return None,
        })
    }
}
