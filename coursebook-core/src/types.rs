//! Domain types for a course program: program → course → lesson → page.
//!
//! All types are serializable/deserializable via serde + serde_yaml.
//! Positions (`sort`) are never stored; they are derived from the order of
//! the owning collection.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LanguageLevel
// ---------------------------------------------------------------------------

/// Set of language levels a course (or a whole program) targets.
///
/// A bit-flag set: a program spanning beginner and intermediate courses has
/// `BEGINNER | INTERMEDIATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageLevel(u8);

impl LanguageLevel {
    pub const UNKNOWN: LanguageLevel = LanguageLevel(0);
    pub const BEGINNER: LanguageLevel = LanguageLevel(1);
    pub const INTERMEDIATE: LanguageLevel = LanguageLevel(2);
    pub const ADVANCED: LanguageLevel = LanguageLevel(4);

    const NAMED: [(LanguageLevel, &'static str); 3] = [
        (LanguageLevel::BEGINNER, "Beginner"),
        (LanguageLevel::INTERMEDIATE, "Intermediate"),
        (LanguageLevel::ADVANCED, "Advanced"),
    ];

    /// Map an upstream 1-based group number to a single level flag.
    ///
    /// `0` (and anything past the known levels) yields [`LanguageLevel::UNKNOWN`].
    pub fn from_group(group: u32) -> Self {
        match group {
            1..=3 => LanguageLevel(1 << (group - 1)),
            _ => LanguageLevel::UNKNOWN,
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_unknown(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: LanguageLevel) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: LanguageLevel) -> Self {
        LanguageLevel(self.0 | other.0)
    }
}

impl std::ops::BitOr for LanguageLevel {
    type Output = LanguageLevel;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for LanguageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return f.write_str("Unknown");
        }
        let mut first = true;
        for (flag, name) in Self::NAMED {
            if self.contains(flag) {
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl FromStr for LanguageLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut level = LanguageLevel::UNKNOWN;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if part.eq_ignore_ascii_case("unknown") {
                continue;
            }
            let flag = Self::NAMED
                .iter()
                .find(|(_, name)| name.eq_ignore_ascii_case(part))
                .map(|(flag, _)| *flag)
                .ok_or_else(|| {
                    format!("unknown language level '{part}'; expected: beginner, intermediate, advanced")
                })?;
            level = level | flag;
        }
        Ok(level)
    }
}

impl TryFrom<String> for LanguageLevel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LanguageLevel> for String {
    fn from(level: LanguageLevel) -> Self {
        level.to_string()
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One page of a lesson: a titled chunk of rule text (HTML).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl Page {
    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }
}

/// A lesson inside a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// A course inside a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub id: u32,
    /// Output directory name override; falls back to the numeric id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub level: LanguageLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pic_file: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// Directory (relative to the program root) that holds this course's pages.
    pub fn dir_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Every page of the course in lesson-then-page order.
    pub fn pages(&self) -> impl Iterator<Item = (&Lesson, &Page)> {
        self.lessons
            .iter()
            .flat_map(|lesson| lesson.pages.iter().map(move |page| (lesson, page)))
    }

    /// Id of the first page of the first lesson, `0` if there is none.
    pub fn first_page_id(&self) -> u32 {
        self.lessons
            .first()
            .and_then(|lesson| lesson.pages.first())
            .map(|page| page.id)
            .unwrap_or(0)
    }

    /// Id of the page before `page_id` across all lessons, `0` if none.
    pub fn prev_page_id(&self, page_id: u32) -> u32 {
        let mut last = 0;
        for (_, page) in self.pages() {
            if page.id == page_id {
                return last;
            }
            last = page.id;
        }
        0
    }

    /// Id of the page after `page_id` across all lessons, `0` if none.
    pub fn next_page_id(&self, page_id: u32) -> u32 {
        let mut found = false;
        for (_, page) in self.pages() {
            if found {
                return page.id;
            }
            found = page.id == page_id;
        }
        0
    }

    /// 1-based position of a lesson within the course.
    pub fn lesson_sort(&self, lesson_id: u32) -> Option<usize> {
        self.lessons
            .iter()
            .position(|l| l.id == lesson_id)
            .map(|i| i + 1)
    }
}

impl Lesson {
    /// 1-based position of a page within the lesson.
    pub fn page_sort(&self, page_id: u32) -> Option<usize> {
        self.pages
            .iter()
            .position(|p| p.id == page_id)
            .map(|i| i + 1)
    }
}

/// Root of a stored program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub level: LanguageLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_file: Option<String>,
    #[serde(default)]
    pub courses: Vec<Course>,
}

impl Program {
    /// An empty program named `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Program {
            name: name.into(),
            kind: None,
            author: None,
            level: LanguageLevel::UNKNOWN,
            description: None,
            icon_file: None,
            cover_file: None,
            courses: Vec::new(),
        }
    }

    /// Recompute the program level as the union of its courses' levels.
    ///
    /// Leaves the current level alone when no course has a known level.
    pub fn recompute_level(&mut self) {
        let union = self
            .courses
            .iter()
            .fold(LanguageLevel::UNKNOWN, |acc, c| acc | c.level);
        if !union.is_unknown() {
            self.level = union;
        }
    }

    /// Courses grouped by level, groups in ascending level order.
    ///
    /// Courses inside a group keep their program order.
    pub fn courses_by_level(&self) -> Vec<(LanguageLevel, Vec<&Course>)> {
        let mut groups: Vec<(LanguageLevel, Vec<&Course>)> = Vec::new();
        for course in &self.courses {
            match groups.iter_mut().find(|(level, _)| *level == course.level) {
                Some((_, courses)) => courses.push(course),
                None => groups.push((course.level, vec![course])),
            }
        }
        groups.sort_by_key(|(level, _)| *level);
        groups
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
