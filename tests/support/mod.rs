//! Black-box test helpers mirroring the original Python test harness's
//! `output_from_code`/`output_from_multiple_files`: run a program through
//! the real pipeline and assert on its combined stdout+stderr text and
//! exit classification, rather than reaching into the AST or value model.

use krait::config::RunConfig;
use krait::io::CollectStringPrint;
use krait::{run, RunOutcome};
use std::io::Write as _;
use std::path::Path;

/// Runs `code` as the entry file (written to a fresh temp file) and
/// returns the combined text a real process would have printed to
/// stdout and stderr — `println`/`print` output, followed by a rendered
/// diagnostic and trailing newline if the program failed at the language
/// level.
///
/// # Panics
/// If the run produced a different exit classification than
/// `expected_return_code` expects (`0` success, `1` language error, `2`
/// host-level failure), or hit a host-level failure where a language
/// error was expected.
#[must_use]
pub fn output_from_code(code: &str, expected_return_code: i32) -> String {
    let dir = tempfile::tempdir().expect("create temp dir");
    let entry = dir.path().join("main.krait");
    std::fs::write(&entry, code).expect("write entry file");
    output_from_entry(&entry, &RunConfig::default(), expected_return_code)
}

/// Like [`output_from_code`], but lets the caller supply search paths
/// (`KRAIT_PATH`) for tests exercising `import`/`import_library`.
#[must_use]
pub fn output_from_code_with_search_paths(
    code: &str,
    search_paths: Vec<std::path::PathBuf>,
    expected_return_code: i32,
) -> String {
    let dir = tempfile::tempdir().expect("create temp dir");
    let entry = dir.path().join("main.krait");
    std::fs::write(&entry, code).expect("write entry file");
    let config = RunConfig {
        search_paths,
        ..RunConfig::default()
    };
    output_from_entry(&entry, &config, expected_return_code)
}

/// Writes `files` (relative path -> source) under a fresh temp directory,
/// runs `entry_name` (also a relative path within that directory) with
/// `KRAIT_PATH` set to the directory itself, and returns the combined
/// output — the multi-file counterpart used by the module-loader tests.
#[must_use]
pub fn output_from_multiple_files(
    files: &[(&str, &str)],
    entry_name: &str,
    expected_return_code: i32,
) -> String {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (name, contents) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture subdirectory");
        }
        let mut f = std::fs::File::create(&path).expect("create fixture file");
        f.write_all(contents.as_bytes()).expect("write fixture file");
    }
    let config = RunConfig {
        search_paths: vec![dir.path().to_path_buf()],
        ..RunConfig::default()
    };
    let entry = dir.path().join(entry_name);
    output_from_entry(&entry, &config, expected_return_code)
}

fn output_from_entry(entry: &Path, config: &RunConfig, expected_return_code: i32) -> String {
    let mut sink = CollectStringPrint::new();
    match run(entry, config, &mut sink) {
        Ok(RunOutcome::Success) => {
            assert_eq!(expected_return_code, 0, "expected a failing run but it succeeded");
            sink.into_inner()
        }
        Ok(RunOutcome::LanguageError(err, source)) => {
            assert_eq!(
                expected_return_code, 1,
                "expected return code {expected_return_code} but got a language error: {err}"
            );
            let mut out = sink.into_inner();
            out.push_str(&krait::diagnostics::render(&err, &source));
            out.push('\n');
            out
        }
        Err(err) => {
            assert_eq!(
                expected_return_code, 2,
                "expected return code {expected_return_code} but got a host-level error: {err:#}"
            );
            sink.into_inner()
        }
    }
}
