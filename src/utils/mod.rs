//! Small host-level helpers shared by the CLI entry point and the
//! loaders: attaching uniform `anyhow` context to file I/O, the one
//! ambient concern every one of them needs.
//!
//! A slimmed cousin of the teacher's `utils::common_patterns` grab-bag:
//! only the file-context extension survives here, since nothing else in
//! that module has a counterpart in this crate's scope.

use anyhow::{Context, Result};
use std::path::Path;

/// Attaches a uniform "failed to {op} file {path}" context to an I/O
/// result, the way the teacher's `module_loader.rs` does for module
/// resolution failures.
pub trait ResultContextExt<T> {
    /// # Errors
    /// The original error, wrapped with file-operation context.
    fn file_context(self, op: &str, path: &Path) -> Result<T>;
}

impl<T, E> ResultContextExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn file_context(self, op: &str, path: &Path) -> Result<T> {
        self.with_context(|| format!("failed to {op} file {}", path.display()))
    }
}

/// Reads an entire file's contents, wrapping any I/O failure with
/// [`ResultContextExt::file_context`].
///
/// # Errors
/// Propagates the read failure, with context attached.
pub fn read_file_with_context(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).file_context("read", path)
}
