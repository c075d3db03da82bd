//! `import_library`'s host-error paths that don't require an actual
//! compiled shared object, grounded on `src/backend/library_loader.rs`'s
//! own `RUNTIME-15`/`RUNTIME-17` contract and
//! `original_source/tests/builtin/functions/test_import_library.py`'s
//! argument-validation cases.

mod support;
use support::output_from_code;
use pretty_assertions::assert_eq;

#[test]
fn importing_a_nonexistent_library_is_a_runtime_error() {
    assert_eq!(
        output_from_code("import_library(\"nonexistent\")\n", 1),
        "Error (RUNTIME-15): The library \"nonexistent\" wasn't found\n"
    );
}

#[test]
fn import_library_argument_must_be_a_string() {
    assert_eq!(
        output_from_code("import_library(0)\n", 1),
        "Error (RUNTIME-2): A built-in function was called with an argument of incorrect type\n\nimport_library expected argument #1 to be of a different type.\n"
    );
}

#[test]
fn import_library_arity_mismatch() {
    assert_eq!(
        output_from_code("import_library()\n", 1),
        "Error (RUNTIME-1): A function accepting 1 argument was called with 0 arguments\n"
    );
    assert_eq!(
        output_from_code("import_library(\"a\", \"b\")\n", 1),
        "Error (RUNTIME-1): A function accepting 1 argument was called with 2 arguments\n"
    );
}
