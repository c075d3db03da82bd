//! Environment-variable-driven run configuration.
//!
//! Centralizing `std::env::var` here means the rest of the crate builds
//! and tests against a plain [`RunConfig`] value instead of mutating
//! process environment to exercise `KRAIT_PATH`/`KRAIT_STARTUP` handling.

use std::path::PathBuf;

/// The resolved configuration for one interpreter run, built once from
/// the process environment (or constructed directly in tests).
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// `KRAIT_PATH`: colon-separated module/library search roots.
    pub search_paths: Vec<PathBuf>,
    /// `KRAIT_STARTUP`: a source file evaluated before the entry point.
    pub startup: Option<PathBuf>,
    /// `KRAIT_STARTUP_EXCLUDE`: root under which startup re-seeding is
    /// suppressed, to stop the standard library importing itself.
    pub startup_exclude: Option<PathBuf>,
}

impl RunConfig {
    /// Reads `KRAIT_PATH`, `KRAIT_STARTUP`, and `KRAIT_STARTUP_EXCLUDE`
    /// from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let search_paths = std::env::var("KRAIT_PATH")
            .ok()
            .map(|raw| raw.split(':').filter(|s| !s.is_empty()).map(PathBuf::from).collect())
            .unwrap_or_default();
        let startup = std::env::var_os("KRAIT_STARTUP").map(PathBuf::from);
        let startup_exclude = std::env::var_os("KRAIT_STARTUP_EXCLUDE").map(PathBuf::from);
        Self {
            search_paths,
            startup,
            startup_exclude,
        }
    }
}
