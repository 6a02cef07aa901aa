//! # coursebook-sync
//!
//! Renders stored programs to disk with hash-gated atomic writes.
//!
//! Call [`render_program`] to render and write every page of a single stored
//! program, or [`render_all`] to process every stored program.

pub mod error;
pub mod hash_store;
pub mod pipeline;
pub mod writer;

pub use error::SyncError;
pub use pipeline::RenderScope;
pub use writer::{
    atomic_write, render_all, render_program, RenderOptions, RenderProgramResult, WriteResult,
};
