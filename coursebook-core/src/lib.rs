//! Coursebook core library: domain types, the program store and course import.
//!
//! - [`types`]: program / course / lesson / page and [`LanguageLevel`]
//! - [`error`]: [`StoreError`], [`ImportError`]
//! - [`store`]: load / save / list / upsert
//! - [`import`]: local JSON course exports

pub mod error;
pub mod import;
pub mod store;
pub mod types;

pub use error::{ImportError, StoreError};
pub use types::{Course, LanguageLevel, Lesson, Page, Program};
