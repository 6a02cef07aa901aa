//! # coursebook-renderer
//!
//! A small embedded template language and the renderer that turns stored
//! course programs into static HTML pages with it.
//!
//! Directives sit between `<%` and `%>`:
//!
//! | Directive                          | Meaning                               |
//! |------------------------------------|---------------------------------------|
//! | `#name`, `#name.field.field`       | write a value's text form             |
//! | `foreach (var item in source) {`   | repeat the body for every element     |
//! | `if (item.flag) {`                 | render the body when `flag` is true   |
//! | `} else {`                         | alternative branch of an `if`         |
//! | `}`                                | end the innermost block               |
//!
//! ## Usage
//!
//! ```rust
//! use coursebook_renderer::{Context, Template};
//!
//! let template = Template::parse(
//!     "greeting",
//!     "Hello <%#name%>! <%foreach (var c in items) {%>- <%#c%><%}%>Done",
//! )
//! .unwrap();
//! let mut ctx = Context::new();
//! ctx.insert("name", "World").insert_enumerator("items", ["A", "B"]);
//! assert_eq!(template.render(&ctx).unwrap(), "Hello World! - A- BDone");
//! ```

pub mod context;
pub mod directive;
pub mod engine;
pub mod env;
pub mod error;
mod interpreter;
pub mod matcher;
pub mod template;
pub mod value;

pub use context::Context;
pub use directive::Directive;
pub use engine::{Renderer, TemplateEngine};
pub use error::{Location, RenderError, SyntaxErrorKind};
pub use template::{Segment, Template};
pub use value::{Record, Value};
