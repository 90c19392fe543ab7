//! Per-file pipeline: read, render, locate, merge, write when changed.

use crate::error::Result;
use crate::locate::locate;
use crate::merge::{merge, strip};
use crate::options::Options;
use crate::render::render;
use crate::schema::Table;

#[cfg(not(target_arch = "wasm32"))]
pub use self::files::{annotate_file, apply, remove_annotation_file};

/// What a file-level run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Written,
    Unchanged,
    /// The table has no columns, so there was nothing to annotate.
    Skipped,
}

/// Annotate `source` with the block for `table`. Tables without columns
/// leave the text as it is.
pub fn annotate_text(source: &str, table: &Table, options: &Options) -> Result<String> {
    table.validate()?;
    if table.columns().is_empty() {
        return Ok(source.to_string());
    }

    let block = render(table, &options.header, options);
    let location = locate(source, &options.header, &options.comment_prefix);
    Ok(merge(source, &location, &block, options))
}

/// Strip the managed block from `source`.
pub fn remove_annotation_text(source: &str, options: &Options) -> String {
    let location = locate(source, &options.header, &options.comment_prefix);
    strip(source, &location)
}

#[cfg(not(target_arch = "wasm32"))]
mod files {
    use std::io::Write;
    use std::path::Path;

    use tempfile::NamedTempFile;

    use super::{Outcome, annotate_text, remove_annotation_text};
    use crate::error::{AnnotateError, Result};
    use crate::options::Options;
    use crate::schema::Table;

    pub fn annotate_file(path: &Path, table: &Table, options: &Options) -> Result<Outcome> {
        if table.columns().is_empty() {
            tracing::info!(path = %path.display(), table = table.name(), "No columns, skipping");
            return Ok(Outcome::Skipped);
        }

        let current = read(path)?;
        let updated = annotate_text(&current, table, options)?;
        finish(path, &current, &updated, options)
    }

    pub fn remove_annotation_file(path: &Path, options: &Options) -> Result<Outcome> {
        let current = read(path)?;
        let updated = remove_annotation_text(&current, options);
        finish(path, &current, &updated, options)
    }

    /// Write `updated` over `path` unless it equals `current`. Returns whether
    /// the file was written.
    ///
    /// The new text goes to a temporary file beside the target which then
    /// replaces it, keeping the original permissions.
    pub fn apply(path: &Path, current: &str, updated: &str) -> Result<bool> {
        if updated == current {
            tracing::debug!(path = %path.display(), "Unchanged");
            return Ok(false);
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).map_err(|e| AnnotateError::io(dir, e))?;
        file.write_all(updated.as_bytes())
            .map_err(|e| AnnotateError::io(file.path(), e))?;

        if let Ok(metadata) = std::fs::metadata(path) {
            std::fs::set_permissions(file.path(), metadata.permissions())
                .map_err(|e| AnnotateError::io(file.path(), e))?;
        }

        file.persist(path)
            .map_err(|e| AnnotateError::io(path, e.error))?;

        tracing::info!(path = %path.display(), "Written");
        Ok(true)
    }

    fn read(path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| AnnotateError::io(path, e))
    }

    fn finish(path: &Path, current: &str, updated: &str, options: &Options) -> Result<Outcome> {
        if options.frozen && updated != current {
            return Err(AnnotateError::Frozen(path.to_path_buf()));
        }

        if apply(path, current, updated)? {
            Ok(Outcome::Written)
        } else {
            Ok(Outcome::Unchanged)
        }
    }
}
