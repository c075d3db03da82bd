//! Cross-file `import`, grounded on
//! `original_source/tests/builtin/functions/test_import.py` and the
//! module loader's own `RUNTIME-13` cycle-detection contract.

mod support;
use support::{output_from_code, output_from_multiple_files};
use pretty_assertions::assert_eq;

#[test]
fn import_resolves_a_sibling_module_by_name() {
    let files = [("main.krait", "println(import(\"foo\").foo)\n"), ("foo.krait", "foo = \"bar\"\n")];
    assert_eq!(output_from_multiple_files(&files, "main.krait", 0), "bar\n");
}

#[test]
fn import_result_is_cached_across_repeated_calls() {
    // A module's top-level `println` should fire once, not once per
    // `import` call, since results memoize in the loader's cache.
    let files = [
        (
            "main.krait",
            "import(\"foo\")\nimport(\"foo\")\nimport(\"foo\")\nprintln(\"done\")\n",
        ),
        ("foo.krait", "println(\"loaded\")\n"),
    ];
    assert_eq!(output_from_multiple_files(&files, "main.krait", 0), "loaded\ndone\n");
}

#[test]
fn importing_a_nonexistent_module_is_a_runtime_error() {
    assert_eq!(
        output_from_code("import(\"nonexistent\")\n", 1),
        "Error (RUNTIME-13): The module \"nonexistent\" wasn't found\n"
    );
}

#[test]
fn import_argument_must_be_a_string() {
    assert_eq!(
        output_from_code("import(0)\n", 1),
        "Error (RUNTIME-2): A built-in function was called with an argument of incorrect type\n\nimport expected argument #1 to be of a different type.\n"
    );
}

#[test]
fn three_file_import_cycle_is_a_runtime_error() {
    let files = [
        ("main.krait", "import(\"foo\")\n"),
        ("foo.krait", "import(\"bar\")\n"),
        ("bar.krait", "import(\"main\")\n"),
    ];
    let output = output_from_multiple_files(&files, "main.krait", 1);

    let prefix = "Error (RUNTIME-13): Encountered an import cycle\n\n\"";
    assert!(output.starts_with(prefix), "unexpected output: {output}");
    let after_quote = &output[prefix.len()..];
    let closing_quote = after_quote.find('"').expect("quoted importer name");
    let importer = &after_quote[..closing_quote];
    // The module whose re-entrant `import` actually detected the cycle is
    // `bar`, which tries to import `main` again while `main` is still
    // loading (it's the innermost frame still on the loading stack).
    assert!(importer.ends_with("bar.krait"), "importer: {importer}");

    let rest = &after_quote[closing_quote + 1..];
    let tail = " couldn't be imported. See the following import stack.\n\n";
    assert!(rest.starts_with(tail), "unexpected output: {output}");
    let stack = rest[tail.len()..].trim_end_matches('\n');
    // Rendered entry-point-first, each subsequent frame joined by an
    // arrow, down to that same innermost (`bar`) frame.
    let frames: Vec<&str> = stack.split("\n\u{21b3} ").collect();
    assert_eq!(frames.len(), 3, "expected 3 stack frames, got: {stack:?}");
    assert!(frames[0].ends_with("main.krait"), "frame 0: {}", frames[0]);
    assert!(frames[1].ends_with("foo.krait"), "frame 1: {}", frames[1]);
    assert!(frames[2].ends_with("bar.krait"), "frame 2: {}", frames[2]);
}
