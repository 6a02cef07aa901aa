//! Recursive interpreter over a template's segments.

use std::fmt;
use std::rc::Rc;

use crate::directive::Directive;
use crate::env::Environment;
use crate::error::{RenderError, SyntaxErrorKind};
use crate::matcher::find_close;
use crate::template::{Template, MAX_NESTING};
use crate::value::{resolve, AttributeError, Value};

/// Walks segment ranges, writing literal text and interpolated values.
pub(crate) struct Interpreter<'t, 'e, 'a, W> {
    template: &'t Template,
    env: &'e mut Environment<'a>,
    out: &'e mut W,
    /// Block bodies currently being executed.
    depth: usize,
}

impl<'t, 'e, 'a, W: fmt::Write> Interpreter<'t, 'e, 'a, W> {
    pub(crate) fn new(template: &'t Template, env: &'e mut Environment<'a>, out: &'e mut W) -> Self {
        Interpreter { template, env, out, depth: 0 }
    }

    /// Execute segments `[from, to)`.
    ///
    /// Block bodies are executed by recursive calls on the body range; the
    /// directive closing a block is never part of that range, so a `}` or
    /// `} else {` reached here is a syntax error.
    pub(crate) fn execute(&mut self, from: usize, to: usize) -> Result<(), RenderError> {
        let template = self.template;
        let segments = template.segments();
        let mut k = from;
        while k < to {
            let segment = &segments[k];
            match &segment.directive {
                Directive::Interpolate { item, path } => {
                    let value = self.lookup(k, item)?;
                    let value = resolve(&value, path).map_err(|e| self.unknown_attribute(k, e))?;
                    write!(self.out, "{value}")?;
                }
                Directive::LoopOpen { item, enumerator, path } => {
                    let elements = self.sequence(k, enumerator, path)?;
                    let end = find_close(template, k, k + 1, false)?;
                    for element in elements.iter() {
                        self.out.write_str(&segment.literal)?;
                        self.env.bind(item, element.clone());
                        self.body(k, k + 1, end)?;
                    }
                    k = end;
                }
                Directive::CondOpen { item, path } => {
                    let flag = self.flag(k, item, path)?;
                    let mid = find_close(template, k, k + 1, true)?;
                    let end = match segments[mid].directive {
                        Directive::Alternative => find_close(template, k, mid + 1, false)?,
                        _ => mid,
                    };
                    if flag {
                        self.out.write_str(&segment.literal)?;
                        self.body(k, k + 1, mid)?;
                    } else if mid < end {
                        self.out.write_str(&segments[mid].literal)?;
                        self.body(k, mid + 1, end)?;
                    }
                    k = end;
                }
                Directive::Close => return Err(self.syntax(k, SyntaxErrorKind::UnexpectedClose)),
                Directive::Alternative => {
                    return Err(self.syntax(k, SyntaxErrorKind::UnexpectedAlternative))
                }
            }
            // For blocks `k` now points at the closing directive, whose
            // trailing text follows the whole block.
            self.out.write_str(&segments[k].literal)?;
            k += 1;
        }
        Ok(())
    }

    /// Execute the body of the block opened at `opener`, one level deeper.
    fn body(&mut self, opener: usize, from: usize, to: usize) -> Result<(), RenderError> {
        if self.depth >= MAX_NESTING {
            return Err(self.syntax(opener, SyntaxErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        let result = self.execute(from, to);
        self.depth -= 1;
        result
    }

    fn lookup(&self, k: usize, name: &str) -> Result<Value<'a>, RenderError> {
        self.env.get(name).cloned().ok_or_else(|| RenderError::UnboundName {
            at: self.template.location(k),
            name: name.to_string(),
        })
    }

    /// Elements for a loop: a named enumerator first, else a variable
    /// holding a list or an iterable record.
    fn sequence(&self, k: usize, name: &str, path: &str) -> Result<Rc<[Value<'a>]>, RenderError> {
        if path.is_empty() {
            if let Some(elements) = self.env.enumerator(name) {
                return Ok(elements);
            }
        }
        let value = self.lookup(k, name)?;
        let value = resolve(&value, path).map_err(|e| self.unknown_attribute(k, e))?;
        match value.items() {
            Some(items) => Ok(items.into()),
            None => Err(RenderError::Type {
                at: self.template.location(k),
                reference: reference(name, path),
                expected: "a sequence",
                found: value.kind_name(),
            }),
        }
    }

    fn flag(&self, k: usize, name: &str, path: &str) -> Result<bool, RenderError> {
        let value = self.lookup(k, name)?;
        match resolve(&value, path).map_err(|e| self.unknown_attribute(k, e))? {
            Value::Bool(flag) => Ok(flag),
            other => Err(RenderError::Type {
                at: self.template.location(k),
                reference: reference(name, path),
                expected: "a boolean",
                found: other.kind_name(),
            }),
        }
    }

    fn unknown_attribute(&self, k: usize, e: AttributeError) -> RenderError {
        RenderError::UnknownAttribute {
            at: self.template.location(k),
            field: e.field,
            kind: e.kind,
        }
    }

    fn syntax(&self, k: usize, kind: SyntaxErrorKind) -> RenderError {
        RenderError::Syntax {
            at: self.template.location(k),
            kind,
            text: self.template.segments()[k].command.trim().to_string(),
        }
    }
}

fn reference(name: &str, path: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{name}.{path}")
    }
}
