//! Atomic writer and program rendering.
//!
//! ## `atomic_write` protocol
//!
//! 1. Normalize line endings to LF.
//! 2. SHA-256 hash the normalized content.
//! 3. Compare with the stored hash, skip if identical and the file exists.
//! 4. Write to `<path>.coursebook.tmp`.
//! 5. Rename to the final path (atomic on POSIX).
//! 6. Update the in-memory hash entry; the caller saves the store.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};

use coursebook_core::store;
use coursebook_renderer::Renderer;

use crate::error::{io_err, SyncError};
use crate::hash_store;

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped; rendered content matches the stored hash.
    Unchanged { path: PathBuf },
    /// Dry-run mode: the file would have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

/// Atomically write one rendered file, gated on the hash store.
pub fn atomic_write(
    path: &Path,
    content: &str,
    hash_store: &mut hash_store::HashStore,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}.coursebook.tmp", path.display()));
    atomic_write_with_tmp(path, content, hash_store, dry_run, &tmp)
}

fn atomic_write_with_tmp(
    path: &Path,
    content: &str,
    hash_store: &mut hash_store::HashStore,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    let normalized = content.replace("\r\n", "\n");
    let content = normalized.as_str();

    let digest = {
        let mut h = Sha256::new();
        h.update(content.as_bytes());
        hex::encode(h.finalize())
    };

    let key = path.to_string_lossy().to_string();
    if hash_store.get(&key) == Some(&digest) && path.exists() {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged { path: path.to_path_buf() });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite { path: path.to_path_buf() });
    }

    for dir in [path.parent(), tmp.parent()].into_iter().flatten() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    hash_store.insert(key, digest);

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written { path: path.to_path_buf() })
}

// ---------------------------------------------------------------------------
// render_program
// ---------------------------------------------------------------------------

/// Knobs shared by every program render.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Site root; defaults to `<home>/.coursebook/programs/<program>/site`.
    /// When rendering every program, each one goes to `<out_dir>/<program>`.
    pub out_dir: Option<PathBuf>,
    /// Directory of `.tpl` files overriding the embedded templates.
    pub templates: Option<PathBuf>,
    pub dry_run: bool,
}

/// Outcome of rendering a single program.
#[derive(Debug)]
pub struct RenderProgramResult {
    pub program_name: String,
    pub site_dir: PathBuf,
    pub writes: Vec<WriteResult>,
}

impl RenderProgramResult {
    pub fn written(&self) -> usize {
        self.writes
            .iter()
            .filter(|w| !matches!(w, WriteResult::Unchanged { .. }))
            .count()
    }
}

/// Render every page of the stored program `name` and write it under the
/// site directory.
///
/// Nothing is written when any page fails to render. The hash store is
/// saved after the writes unless `dry_run` is set.
pub fn render_program(
    name: &str,
    home: &Path,
    options: &RenderOptions,
) -> Result<RenderProgramResult, SyncError> {
    let renderer = Renderer::new(options.templates.as_deref())?;
    let site_dir = options
        .out_dir
        .clone()
        .unwrap_or_else(|| store::site_dir_at(home, name));
    render_program_with(&renderer, name, home, &site_dir, options.dry_run)
}

fn render_program_with(
    renderer: &Renderer,
    name: &str,
    home: &Path,
    site_dir: &Path,
    dry_run: bool,
) -> Result<RenderProgramResult, SyncError> {
    let started_at = Utc::now();
    let program = store::load_program_at(home, name)?;
    let outputs = renderer.render_program(&program, site_dir)?;

    let mut store = hash_store::load_at(home, name)?;
    let mut writes = Vec::with_capacity(outputs.len());
    for (path, content) in outputs {
        writes.push(atomic_write(&path, &content, &mut store.files, dry_run)?);
    }

    if !dry_run {
        store.synced_at = started_at;
        hash_store::save_at(home, name, &store)?;
    }

    Ok(RenderProgramResult {
        program_name: name.to_string(),
        site_dir: site_dir.to_path_buf(),
        writes,
    })
}

// ---------------------------------------------------------------------------
// render_all
// ---------------------------------------------------------------------------

/// Render every stored program.
pub fn render_all(home: &Path, options: &RenderOptions) -> Result<Vec<RenderProgramResult>, SyncError> {
    let renderer = Renderer::new(options.templates.as_deref())?;
    let mut results = Vec::new();
    for (name, _) in store::list_programs_at(home)? {
        let site_dir = match &options.out_dir {
            Some(out) => out.join(&name),
            None => store::site_dir_at(home, &name),
        };
        results.push(render_program_with(&renderer, &name, home, &site_dir, options.dry_run)?);
    }
    Ok(results)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
