//! String and tuple built-in methods, grounded on
//! `original_source/tests/builtin/types/test_string_manipulation.py` and
//! `original_source/tests/constructs/test_tuples.py`.

mod support;
use support::output_from_code;
use pretty_assertions::assert_eq;

#[test]
fn string_length_and_concatenation() {
    assert_eq!(output_from_code("println(\"\".length)\n", 0), "0\n");
    assert_eq!(output_from_code("println(\"01\".length)\n", 0), "2\n");
    assert_eq!(
        output_from_code("println((\"foo\" + \"bar\") == \"foobar\")\n", 0),
        "true\n"
    );
}

#[test]
fn string_plus_is_strongly_typed() {
    assert_eq!(
        output_from_code("\"foo\" + 0\n", 1),
        "Error (RUNTIME-2): A built-in function was called with an argument of incorrect type\n\n+ expected argument #1 to be of a different type.\n"
    );
}

#[test]
fn string_get_and_slice() {
    assert_eq!(output_from_code("println(\"hello\".get(1))\n", 0), "e\n");
    assert_eq!(output_from_code("println(\"hello\".slice(1, 3))\n", 0), "el\n");
    assert_eq!(
        output_from_code("println(\"hello\".get(10))\n", 1),
        "Error (RUNTIME-14): An out-of-bounds index was provided to string#get\n\nExpected an index in the range [0, 5), but got 10.\n"
    );
}

#[test]
fn string_split_and_codepoint() {
    assert_eq!(
        output_from_code("println(\"a,b,c\".split(\",\"))\n", 0),
        "(a, b, c)\n"
    );
    assert_eq!(output_from_code("println(\"a\".codepoint())\n", 0), "97\n");
}

#[test]
fn tuple_construction_and_display() {
    assert_eq!(output_from_code("println(__tuple__())\n", 0), "(,)\n");
    assert_eq!(output_from_code("println(__tuple__(0))\n", 0), "(0,)\n");
    assert_eq!(output_from_code("println((0, 1))\n", 0), "(0, 1)\n");
    assert_eq!(output_from_code("println((0))\n", 0), "0\n");
}

#[test]
fn tuple_get_and_out_of_bounds() {
    assert_eq!(output_from_code("println((\"foo\",).get(0))\n", 0), "foo\n");
    assert_eq!(
        output_from_code("println((\"foo\", \"bar\").get(2))\n", 1),
        "Error (RUNTIME-14): An out-of-bounds index was provided to tuple#get\n\nExpected an index in the range [0, 2), but got 2.\n"
    );
}

#[test]
fn tuple_length_plus_slice() {
    assert_eq!(output_from_code("println((,).length)\n", 0), "0\n");
    assert_eq!(output_from_code("println((0, 1).length)\n", 0), "2\n");
    assert_eq!(
        output_from_code("println(((0,) + (1, 2)) == (0, 1, 2))\n", 0),
        "true\n"
    );
    assert_eq!(output_from_code("println((1, 2, 3).slice(1, 2))\n", 0), "(2,)\n");
    assert_eq!(output_from_code("println((1, 2, 3).slice(1, 1))\n", 0), "(,)\n");
}
