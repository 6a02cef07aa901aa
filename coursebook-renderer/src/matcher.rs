//! Block matcher.
//!
//! Finds the directive that ends a block by counting opens and closes.
//! Nesting depth depends only on those counts, never on the block kind, so
//! loops inside conditionals and conditionals inside loops resolve the same way.

use crate::directive::Directive;
use crate::error::{RenderError, SyntaxErrorKind};
use crate::template::Template;

/// Index of the directive that ends the block whose body starts at `start`.
///
/// Interpolations are ignored. A `}` at depth 0 ends the block. When
/// `conditional` is set, a `} else {` at depth 0 ends it too (the "then"
/// branch). An else never changes depth. Reaching the end of the template
/// is an [`SyntaxErrorKind::UnmatchedOpenBlock`] reported at `opener`, the
/// directive that opened the block.
pub fn find_close(
    template: &Template,
    opener: usize,
    start: usize,
    conditional: bool,
) -> Result<usize, RenderError> {
    let mut depth = 0usize;
    for (index, segment) in template.segments().iter().enumerate().skip(start) {
        match segment.directive {
            Directive::Interpolate { .. } => {}
            Directive::Close => {
                if depth == 0 {
                    return Ok(index);
                }
                depth -= 1;
            }
            Directive::Alternative => {
                if depth == 0 && conditional {
                    return Ok(index);
                }
            }
            Directive::LoopOpen { .. } | Directive::CondOpen { .. } => depth += 1,
        }
    }

    Err(RenderError::Syntax {
        at: template.location(opener),
        kind: SyntaxErrorKind::UnmatchedOpenBlock,
        text: template
            .segments()
            .get(opener)
            .map(|s| s.command.trim().to_string())
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tpl(text: &str) -> Template {
        Template::parse("t", text).expect("parse")
    }

    #[test]
    fn finds_close_of_flat_loop() {
        let t = tpl("<%foreach (var a in b) {%><%#a%><%}%>");
        assert_eq!(find_close(&t, 0, 1, false).unwrap(), 2);
    }

    #[test]
    fn skips_nested_blocks_of_any_kind() {
        // 0 loop, 1 if, 2 loop, 3 close, 4 else, 5 close, 6 close
        let t = tpl(
            "<%foreach (var a in b) {%><%if (a.ok) {%><%foreach (var c in a.items) {%>\
             <%}%><%} else {%><%}%><%}%>",
        );
        assert_eq!(find_close(&t, 0, 1, false).unwrap(), 6);
        assert_eq!(find_close(&t, 1, 2, true).unwrap(), 4);
        assert_eq!(find_close(&t, 1, 5, false).unwrap(), 5);
    }

    #[test]
    fn else_ends_only_conditional_search() {
        let t = tpl("<%if (a.b) {%>x<%} else {%>y<%}%>");
        assert_eq!(find_close(&t, 0, 1, true).unwrap(), 1);
        assert_eq!(find_close(&t, 0, 1, false).unwrap(), 2);
    }

    #[test]
    fn unmatched_open_names_the_opener() {
        let t = tpl("x\n<%foreach (var a in b) {%>\n<%#a%>");
        let err = find_close(&t, 0, 1, false).unwrap_err();
        match err {
            RenderError::Syntax { at, kind, text } => {
                assert_eq!(kind, SyntaxErrorKind::UnmatchedOpenBlock);
                assert_eq!(at.line, 2);
                assert_eq!(at.directive, 1);
                assert_eq!(text, "foreach (var a in b) {");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unclosed_else_branch_names_the_conditional() {
        let t = tpl("<%if (u.ok) {%>yes\n<%} else {%>no");
        assert_eq!(find_close(&t, 0, 1, true).unwrap(), 1);
        match find_close(&t, 0, 2, false).unwrap_err() {
            RenderError::Syntax { at, kind, text } => {
                assert_eq!(kind, SyntaxErrorKind::UnmatchedOpenBlock);
                assert_eq!((at.line, at.directive), (1, 1));
                assert_eq!(text, "if (u.ok) {");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
