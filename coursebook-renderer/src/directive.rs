//! Directive classifier.
//!
//! Turns the command text between `<%` and `%>` into a [`Directive`]. The
//! grammar is tiny, so classification is a hand-written scan over the
//! command rather than a set of patterns tried one after another.

use crate::error::SyntaxErrorKind;

/// One classified directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `#item` or `#item.field[.field…]`; `path` is empty for a bare item.
    Interpolate { item: String, path: String },
    /// `foreach (var item in enumerator[.field…]) {`
    LoopOpen {
        item: String,
        enumerator: String,
        path: String,
    },
    /// `if (item.field[.field…]) {`
    CondOpen { item: String, path: String },
    /// `}`
    Close,
    /// `} else {`
    Alternative,
}

impl Directive {
    /// Whether the directive opens a block that needs a matching close.
    pub fn opens_block(&self) -> bool {
        matches!(self, Directive::LoopOpen { .. } | Directive::CondOpen { .. })
    }
}

/// Classify a directive's command text (without delimiters).
pub fn classify(command: &str) -> Result<Directive, SyntaxErrorKind> {
    let command = command.trim();

    if let Some(reference) = command.strip_prefix('#') {
        let (item, path) = reference_parts(reference.trim())
            .ok_or(SyntaxErrorKind::UnsupportedDirective)?;
        return Ok(Directive::Interpolate { item, path });
    }
    if command == "}" {
        return Ok(Directive::Close);
    }

    let mut cursor = Cursor::new(command);
    if cursor.keyword("foreach") {
        return parse_loop(cursor).ok_or(SyntaxErrorKind::UnsupportedDirective);
    }
    if cursor.keyword("if") {
        return parse_conditional(cursor).ok_or(SyntaxErrorKind::UnsupportedDirective);
    }
    if cursor.eat("}") {
        cursor.skip_ws();
        if cursor.keyword("else") {
            cursor.skip_ws();
            if cursor.eat("{") && cursor.at_end() {
                return Ok(Directive::Alternative);
            }
        }
    }
    Err(SyntaxErrorKind::UnsupportedDirective)
}

/// `( var item in source ) {` after the `foreach` keyword.
fn parse_loop(mut c: Cursor<'_>) -> Option<Directive> {
    c.skip_ws();
    c.expect("(")?;
    c.skip_ws();
    if !c.keyword("var") || !c.skip_ws() {
        return None;
    }
    let item = c.ident()?;
    if !c.skip_ws() || !c.keyword("in") || !c.skip_ws() {
        return None;
    }
    let source = c.reference()?;
    c.skip_ws();
    c.expect(")")?;
    c.skip_ws();
    c.expect("{")?;
    c.skip_ws();
    if !c.at_end() {
        return None;
    }
    let (enumerator, path) = reference_parts(source)?;
    Some(Directive::LoopOpen { item: item.to_string(), enumerator, path })
}

/// `( item.field ) {` after the `if` keyword.
fn parse_conditional(mut c: Cursor<'_>) -> Option<Directive> {
    c.skip_ws();
    c.expect("(")?;
    c.skip_ws();
    let reference = c.reference()?;
    c.skip_ws();
    c.expect(")")?;
    c.skip_ws();
    c.expect("{")?;
    c.skip_ws();
    if !c.at_end() {
        return None;
    }
    let (item, path) = reference_parts(reference)?;
    if path.is_empty() {
        return None;
    }
    Some(Directive::CondOpen { item, path })
}

/// Split `item.a.b` into `("item", "a.b")`, validating every part.
fn reference_parts(reference: &str) -> Option<(String, String)> {
    let (item, path) = match reference.split_once('.') {
        Some((item, path)) if path.split('.').all(is_ident) => (item, path),
        Some(_) => return None,
        None => (reference, ""),
    };
    if !is_ident(item) {
        return None;
    }
    Some((item.to_string(), path.to_string()))
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_word)
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

struct Cursor<'s> {
    rest: &'s str,
}

impl<'s> Cursor<'s> {
    fn new(text: &'s str) -> Self {
        Cursor { rest: text }
    }

    /// Skip whitespace; reports whether any was skipped.
    fn skip_ws(&mut self) -> bool {
        let trimmed = self.rest.trim_start();
        let skipped = trimmed.len() != self.rest.len();
        self.rest = trimmed;
        skipped
    }

    fn eat(&mut self, token: &str) -> bool {
        match self.rest.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn expect(&mut self, token: &str) -> Option<()> {
        self.eat(token).then_some(())
    }

    /// Eat `word` only when it is not the prefix of a longer identifier.
    fn keyword(&mut self, word: &str) -> bool {
        match self.rest.strip_prefix(word) {
            Some(rest) if !rest.starts_with(is_word) => {
                self.rest = rest;
                true
            }
            _ => false,
        }
    }

    fn ident(&mut self) -> Option<&'s str> {
        let end = self.rest.find(|c: char| !is_word(c)).unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let (ident, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(ident)
    }

    /// An identifier optionally followed by `.field` parts.
    fn reference(&mut self) -> Option<&'s str> {
        let end = self
            .rest
            .find(|c: char| !is_word(c) && c != '.')
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let (reference, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(reference)
    }

    fn at_end(&self) -> bool {
        self.rest.is_empty()
    }
}
