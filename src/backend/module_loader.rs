//! `KRAIT_PATH`-based module resolution, plus the process-wide resolved-
//! module cache and in-progress stack the evaluator consults for import
//! cycle detection.
//!
//! Grounded on the teacher's own `module_loader.rs`: a `search_paths`
//! list probed in order, a cache keyed by a stable identity (there: module
//! name; here: the resolved absolute path, since two names never alias
//! the same file but `KRAIT_PATH` can list overlapping directories), and a
//! `loading_stack` used to detect and render circular imports.

use log::{debug, trace};
use std::path::{Path, PathBuf};
use std::collections::HashMap;

use crate::runtime::value::Value;

/// Resolves `name.path.segments` dotted module names to `.krait` files
/// under a colon-separated search path, and tracks which modules are
/// cached or currently being loaded.
#[derive(Debug)]
pub struct ModuleLoader {
    search_paths: Vec<PathBuf>,
    cache: HashMap<PathBuf, Value>,
    loading_stack: Vec<PathBuf>,
}

impl ModuleLoader {
    #[must_use]
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            cache: HashMap::new(),
            loading_stack: Vec::new(),
        }
    }

    /// Translates a dotted module name (`foo.bar`) to a relative path
    /// (`foo/bar.krait`) and probes each search path in order, returning
    /// the first existing file. A directory match with no accompanying
    /// file is not a module.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = format!("{}.krait", name.replace('.', std::path::MAIN_SEPARATOR_STR));
        for root in &self.search_paths {
            let candidate = root.join(&relative);
            if candidate.is_file() {
                trace!("resolved module `{name}` to {}", candidate.display());
                return candidate.canonicalize().ok().or(Some(candidate));
            }
        }
        debug!("module `{name}` not found in {} search path(s)", self.search_paths.len());
        None
    }

    #[must_use]
    pub fn cached(&self, path: &Path) -> Option<Value> {
        let hit = self.cache.get(path).cloned();
        if hit.is_some() {
            debug!("module cache hit for {}", path.display());
        }
        hit
    }

    #[must_use]
    pub fn is_loading(&self, path: &Path) -> bool {
        self.loading_stack.iter().any(|p| p == path)
    }

    /// Renders the full `RUNTIME-13` import-cycle diagnostic body: a
    /// headline naming the module whose `import` call detected the cycle —
    /// the last entry on the loading stack, since that module is the one
    /// currently executing — followed by the whole in-progress chain,
    /// arrow-joined, from the entry point down to that same module. The
    /// stack already contains the re-entered path (it's why the cycle was
    /// detected), so nothing further is appended.
    #[must_use]
    pub fn cycle_report(&self) -> String {
        let importer = self
            .loading_stack
            .last()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        debug!("import cycle detected, importer = {importer}");

        let mut lines = self.loading_stack.iter().map(|p| p.display().to_string());
        let mut stack = lines.next().unwrap_or_default();
        for line in lines {
            stack.push_str("\n\u{21b3} ");
            stack.push_str(&line);
        }

        format!(
            "Encountered an import cycle\n\n\"{importer}\" couldn't be imported. See the following import stack.\n\n{stack}"
        )
    }

    pub fn push_loading(&mut self, path: PathBuf) {
        self.loading_stack.push(path);
    }

    pub fn pop_loading(&mut self) {
        self.loading_stack.pop();
    }

    pub fn cache(&mut self, path: PathBuf, value: Value) {
        self.cache.insert(path, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn resolve_finds_first_matching_search_path() {
        let temp_dir = TempDir::new().expect("tempdir");
        fs::write(temp_dir.path().join("foo.krait"), "foo = 1\n").expect("write fixture");
        let loader = ModuleLoader::new(vec![temp_dir.path().to_path_buf()]);
        let resolved = loader.resolve("foo").expect("module should resolve");
        assert_eq!(resolved.file_name().unwrap(), "foo.krait");
    }

    #[test]
    fn resolve_translates_dotted_names_to_nested_paths() {
        let temp_dir = TempDir::new().expect("tempdir");
        fs::create_dir(temp_dir.path().join("foo")).expect("create subdir");
        fs::write(temp_dir.path().join("foo").join("bar.krait"), "bar = 1\n").expect("write fixture");
        let loader = ModuleLoader::new(vec![temp_dir.path().to_path_buf()]);
        assert!(loader.resolve("foo.bar").is_some());
    }

    #[test]
    fn resolve_returns_none_for_a_directory_with_no_matching_file() {
        let temp_dir = TempDir::new().expect("tempdir");
        fs::create_dir(temp_dir.path().join("foo")).expect("create subdir");
        let loader = ModuleLoader::new(vec![temp_dir.path().to_path_buf()]);
        assert!(loader.resolve("foo").is_none());
    }

    #[test]
    fn cache_roundtrips_a_resolved_module() {
        let mut loader = ModuleLoader::new(vec![]);
        let path = PathBuf::from("/tmp/does-not-matter.krait");
        assert!(loader.cached(&path).is_none());
        loader.cache(path.clone(), Value::Unit);
        assert!(matches!(loader.cached(&path), Some(Value::Unit)));
    }

    #[test]
    fn loading_stack_tracks_push_and_pop() {
        let mut loader = ModuleLoader::new(vec![]);
        let path = PathBuf::from("/tmp/a.krait");
        assert!(!loader.is_loading(&path));
        loader.push_loading(path.clone());
        assert!(loader.is_loading(&path));
        loader.pop_loading();
        assert!(!loader.is_loading(&path));
    }

    #[test]
    fn cycle_report_quotes_the_innermost_frame_and_arrow_joins_the_stack() {
        let mut loader = ModuleLoader::new(vec![]);
        loader.push_loading(PathBuf::from("/a.krait"));
        loader.push_loading(PathBuf::from("/b.krait"));
        loader.push_loading(PathBuf::from("/c.krait"));
        let report = loader.cycle_report();
        assert!(report.starts_with("Encountered an import cycle\n\n\"/c.krait\""));
        assert!(report.contains("/a.krait\n\u{21b3} /b.krait\n\u{21b3} /c.krait"));
    }
}
