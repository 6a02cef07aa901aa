//! Render environment: the live name → value and name → sequence tables.

use std::collections::HashMap;
use std::rc::Rc;

use crate::context::Context;
use crate::value::Value;

/// Mutable variable scope for one render call.
///
/// There is a single flat table. Binding a loop variable overwrites any
/// existing binding of that name, and nothing is restored when the loop
/// ends: after the loop the name still holds the last element.
#[derive(Debug, Default)]
pub struct Environment<'a> {
    variables: HashMap<String, Value<'a>>,
    enumerators: HashMap<String, Rc<[Value<'a>]>>,
}

impl<'a> Environment<'a> {
    /// Fresh environment holding a copy of the context's bindings.
    pub fn seeded(ctx: &Context<'a>) -> Self {
        Environment {
            variables: ctx.variables().clone(),
            enumerators: ctx.enumerators().clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value<'a>> {
        self.variables.get(name)
    }

    /// Bind or rebind `name` (last write wins).
    pub fn bind(&mut self, name: &str, value: Value<'a>) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn enumerator(&self, name: &str) -> Option<Rc<[Value<'a>]>> {
        self.enumerators.get(name).cloned()
    }
}
