//! Error types for coursebook-renderer.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Where in a template a failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Template name as registered with the engine.
    pub template: String,
    /// 1-based source line of the directive's open marker.
    pub line: usize,
    /// 1-based index of the directive within the template.
    pub directive: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (directive #{})", self.template, self.line, self.directive)
    }
}

/// The shape of a syntax failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// An open marker with no close marker after it.
    UnterminatedDirective,
    /// A directive that matches none of the supported shapes.
    UnsupportedDirective,
    /// A loop or conditional with no matching close.
    UnmatchedOpenBlock,
    /// A close directive outside any open block.
    UnexpectedClose,
    /// An else directive outside a conditional, or a second else.
    UnexpectedAlternative,
    /// Blocks nested deeper than [`MAX_NESTING`](crate::template::MAX_NESTING).
    NestingTooDeep,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyntaxErrorKind::UnterminatedDirective => "unterminated directive, '%>' not found",
            SyntaxErrorKind::UnsupportedDirective => {
                "unsupported directive; expected '#name[.field]', \
                 'foreach (var item in items) {', 'if (item.flag) {', '} else {' or '}'"
            }
            SyntaxErrorKind::UnmatchedOpenBlock => "block is never closed, '<%}%>' not found",
            SyntaxErrorKind::UnexpectedClose => "'}' outside of any open block",
            SyntaxErrorKind::UnexpectedAlternative => "'} else {' outside of a conditional",
            SyntaxErrorKind::NestingTooDeep => "blocks nested too deeply",
        };
        f.write_str(s)
    }
}

/// All errors that can arise from template loading and rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Malformed template text.
    #[error("{at}: {kind}: `{text}`")]
    Syntax {
        at: Location,
        kind: SyntaxErrorKind,
        text: String,
    },

    /// A referenced variable or enumerator is not bound.
    #[error("{at}: unbound name '{name}'")]
    UnboundName { at: Location, name: String },

    /// A `.field` reference the resolved value does not provide.
    #[error("{at}: unknown attribute '{field}' for {kind}")]
    UnknownAttribute {
        at: Location,
        field: String,
        kind: String,
    },

    /// A value of the wrong kind (non-boolean condition, non-sequence loop source).
    #[error("{at}: '{reference}' is {found}, expected {expected}")]
    Type {
        at: Location,
        reference: String,
        expected: &'static str,
        found: String,
    },

    /// No template registered under the requested name.
    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    /// Filesystem error while loading user templates.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// The output destination rejected a write.
    #[error("failed to write rendered output")]
    Output(#[from] fmt::Error),
}
