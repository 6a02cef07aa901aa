//! Tokenizer and compiled [`Template`].
//!
//! Template text is split on the open marker `<%`. Everything before the
//! first marker is leading literal text; every later piece holds one
//! directive, ended by the first `%>`, followed by the literal text that runs
//! up to the next open marker.

use std::fmt;

use crate::context::Context;
use crate::directive::{classify, Directive};
use crate::env::Environment;
use crate::error::{Location, RenderError, SyntaxErrorKind};
use crate::interpreter::Interpreter;

/// Directive open marker.
pub const OPEN: &str = "<%";
/// Directive close marker.
pub const CLOSE: &str = "%>";
/// Deepest block nesting a template may use.
pub const MAX_NESTING: usize = 128;

/// One directive plus the literal text that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub directive: Directive,
    /// Command text exactly as written between the markers.
    pub command: String,
    /// Literal text after the close marker, up to the next open marker.
    pub literal: String,
    /// 1-based line of the open marker.
    pub line: usize,
}

/// A parsed template: immutable once built, shareable across renders.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    leading: String,
    segments: Vec<Segment>,
}

/// Raw text following one open marker.
struct Piece<'s> {
    line: usize,
    body: &'s str,
}

fn tokenize(text: &str) -> (&str, Vec<Piece<'_>>) {
    let mut parts = text.split(OPEN);
    let leading = parts.next().unwrap_or_default();
    let mut line = 1 + newlines(leading);
    let mut pieces = Vec::new();
    for body in parts {
        pieces.push(Piece { line, body });
        line += newlines(body);
    }
    (leading, pieces)
}

fn newlines(s: &str) -> usize {
    s.bytes().filter(|b| *b == b'\n').count()
}

/// First line of an unterminated directive, shortened for error messages.
fn excerpt(body: &str) -> String {
    const MAX: usize = 40;
    let first = body.lines().next().unwrap_or_default().trim();
    match first.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &first[..cut]),
        None => first.to_string(),
    }
}

impl Template {
    /// Tokenize and classify `text`.
    ///
    /// Fails on the first unterminated or unsupported directive, before any
    /// output can be produced. Block structure is checked while rendering.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, RenderError> {
        let name = name.into();
        let (leading, pieces) = tokenize(text);

        let mut segments = Vec::with_capacity(pieces.len());
        for (index, piece) in pieces.into_iter().enumerate() {
            let at = Location { template: name.clone(), line: piece.line, directive: index + 1 };
            let Some((command, literal)) = piece.body.split_once(CLOSE) else {
                return Err(RenderError::Syntax {
                    at,
                    kind: SyntaxErrorKind::UnterminatedDirective,
                    text: excerpt(piece.body),
                });
            };
            let directive = classify(command).map_err(|kind| RenderError::Syntax {
                at,
                kind,
                text: command.trim().to_string(),
            })?;
            segments.push(Segment {
                directive,
                command: command.to_string(),
                literal: literal.to_string(),
                line: piece.line,
            });
        }

        tracing::debug!("parsed template '{}' ({} directives)", name, segments.len());
        Ok(Template { name, leading: leading.to_string(), segments })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Literal text before the first directive.
    pub fn leading(&self) -> &str {
        &self.leading
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Error location of the segment at `index`.
    pub(crate) fn location(&self, index: usize) -> Location {
        Location {
            template: self.name.clone(),
            line: self.segments.get(index).map(|s| s.line).unwrap_or(0),
            directive: index + 1,
        }
    }

    /// Check block structure without rendering.
    ///
    /// Rendering only matches the blocks it actually reaches; this walks
    /// every directive so a stray `}`, a misplaced `} else {`, an unclosed
    /// block or nesting past [`MAX_NESTING`] anywhere in the template is
    /// reported.
    pub fn check_blocks(&self) -> Result<(), RenderError> {
        // (opener index, whether an else has been seen)
        let mut open: Vec<(usize, bool)> = Vec::new();
        for (index, segment) in self.segments.iter().enumerate() {
            match segment.directive {
                Directive::Interpolate { .. } => {}
                Directive::LoopOpen { .. } | Directive::CondOpen { .. } => {
                    if open.len() == MAX_NESTING {
                        return Err(self.syntax(index, SyntaxErrorKind::NestingTooDeep));
                    }
                    open.push((index, false));
                }
                Directive::Close => {
                    if open.pop().is_none() {
                        return Err(self.syntax(index, SyntaxErrorKind::UnexpectedClose));
                    }
                }
                Directive::Alternative => match open.last_mut() {
                    Some((opener, seen_else))
                        if !*seen_else
                            && matches!(self.segments[*opener].directive, Directive::CondOpen { .. }) =>
                    {
                        *seen_else = true;
                    }
                    _ => return Err(self.syntax(index, SyntaxErrorKind::UnexpectedAlternative)),
                },
            }
        }
        match open.pop() {
            Some((opener, _)) => Err(self.syntax(opener, SyntaxErrorKind::UnmatchedOpenBlock)),
            None => Ok(()),
        }
    }

    fn syntax(&self, index: usize, kind: SyntaxErrorKind) -> RenderError {
        RenderError::Syntax {
            at: self.location(index),
            kind,
            text: self.segments[index].command.trim().to_string(),
        }
    }

    /// Render against `ctx` into a new string.
    pub fn render(&self, ctx: &Context<'_>) -> Result<String, RenderError> {
        let mut out = String::new();
        self.render_to(ctx, &mut out)?;
        Ok(out)
    }

    /// Render against `ctx`, appending to `out`.
    ///
    /// Stops at the first error; text written before it stays in `out`.
    pub fn render_to<W: fmt::Write>(&self, ctx: &Context<'_>, out: &mut W) -> Result<(), RenderError> {
        let mut env = Environment::seeded(ctx);
        out.write_str(&self.leading)?;
        Interpreter::new(self, &mut env, out).execute(0, self.segments.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(t: &Template) -> String {
        let mut s = t.leading().to_string();
        for seg in t.segments() {
            s.push_str(OPEN);
            s.push_str(&seg.command);
            s.push_str(CLOSE);
            s.push_str(&seg.literal);
        }
        s
    }

    #[test]
    fn segments_reconstruct_source() {
        let text = "Hello <%#name%>!\n<% foreach (var c in items) { %>- <%#c%>\n<%}%>Done %> tail";
        let t = Template::parse("t", text).expect("parse");
        assert_eq!(t.segments().len(), 4);
        assert_eq!(reconstruct(&t), text);
    }

    #[test]
    fn plain_text_has_no_segments() {
        let t = Template::parse("t", "just text\n").expect("parse");
        assert_eq!(t.leading(), "just text\n");
        assert!(t.segments().is_empty());
    }

    #[test]
    fn segment_lines_are_tracked() {
        let t = Template::parse("t", "a\nb <%#x%>\n\n<%#y%>").expect("parse");
        let lines: Vec<usize> = t.segments().iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn unterminated_directive_is_reported_with_line() {
        let err = Template::parse("page.tpl", "ok <%#a%>\nbroken <%#b\nrest").unwrap_err();
        match err {
            RenderError::Syntax { at, kind, text } => {
                assert_eq!(kind, SyntaxErrorKind::UnterminatedDirective);
                assert_eq!(at.line, 2);
                assert_eq!(at.directive, 2);
                assert_eq!(text, "#b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unsupported_directive_names_offending_text() {
        let err = Template::parse("t", "<% while (x) { %>").unwrap_err();
        assert!(matches!(
            err,
            RenderError::Syntax { kind: SyntaxErrorKind::UnsupportedDirective, ref text, .. }
                if text == "while (x) {"
        ));
        assert!(err.to_string().starts_with("t:1 (directive #1)"));
    }

    fn block_error(text: &str) -> Option<(SyntaxErrorKind, usize)> {
        match Template::parse("t", text).expect("parse").check_blocks() {
            Ok(()) => None,
            Err(RenderError::Syntax { at, kind, .. }) => Some((kind, at.directive)),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn balanced_blocks_pass_check() {
        assert_eq!(
            block_error("<%foreach (var a in b) {%><%if (a.x) {%>1<%} else {%>2<%}%><%}%>"),
            None
        );
    }

    #[test]
    fn check_reports_block_structure_errors() {
        assert_eq!(block_error("a<%}%>"), Some((SyntaxErrorKind::UnexpectedClose, 1)));
        assert_eq!(
            block_error("<%foreach (var a in b) {%><%} else {%><%}%>"),
            Some((SyntaxErrorKind::UnexpectedAlternative, 2))
        );
        assert_eq!(
            block_error("<%if (a.x) {%><%} else {%><%} else {%><%}%>"),
            Some((SyntaxErrorKind::UnexpectedAlternative, 3))
        );
        assert_eq!(
            block_error("<%if (a.x) {%><%foreach (var c in a.y) {%><%}%>"),
            Some((SyntaxErrorKind::UnmatchedOpenBlock, 1))
        );
    }

    #[test]
    fn long_excerpt_is_shortened() {
        let body = "#".repeat(100);
        assert_eq!(excerpt(&body).chars().count(), 41);
    }
}
