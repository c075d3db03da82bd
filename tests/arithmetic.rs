//! Numeric operators, precedence, and their `RUNTIME-2`/`RUNTIME-7`
//! failure modes, grounded on
//! `original_source/tests/builtin/types/test_arithmetic.py`.

mod support;
use support::output_from_code;
use pretty_assertions::assert_eq;

#[test]
fn int_arithmetic() {
    assert_eq!(output_from_code("println(1 + 2 + 3)\n", 0), "6\n");
    assert_eq!(output_from_code("println(1 - 2 - 3)\n", 0), "-4\n");
    assert_eq!(output_from_code("println(-(2 + 2))\n", 0), "-4\n");
    assert_eq!(output_from_code("println(1 * 2 * 3)\n", 0), "6\n");
    assert_eq!(output_from_code("println(4 / 2 / 1)\n", 0), "2\n");
    assert_eq!(output_from_code("println(81 % 12)\n", 0), "9\n");
}

#[test]
fn int_division_by_zero() {
    assert_eq!(
        output_from_code("1 / 0\n", 1),
        "Error (RUNTIME-7): Cannot divide by zero\n\nExpected the right-hand side of int#/ to be nonzero.\n"
    );
    assert_eq!(
        output_from_code("1 % 0\n", 1),
        "Error (RUNTIME-7): Cannot divide by zero\n\nExpected the right-hand side of int#% to be nonzero.\n"
    );
}

#[test]
fn float_arithmetic() {
    assert_eq!(output_from_code("println(1.1 + 2.2 + 3.3)\n", 0), "6.6\n");
    assert_eq!(output_from_code("println(-(2.2 + 2.2))\n", 0), "-4.4\n");
    assert_eq!(output_from_code("println(1.1 * 2.2 * 3.3)\n", 0), "7.986000000000001\n");
}

#[test]
fn float_division_by_zero() {
    assert_eq!(
        output_from_code("1.0 / 0.0\n", 1),
        "Error (RUNTIME-7): Cannot divide by zero\n\nExpected the right-hand side of float#/ to be nonzero.\n"
    );
}

#[test]
fn float_formatting_drops_trailing_zero() {
    assert_eq!(output_from_code("println(1.)\n", 0), "1\n");
    assert_eq!(output_from_code("println(.1)\n", 0), "0.1\n");
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(output_from_code("println(1 + 1 - 1)\n", 0), "1\n");
    assert_eq!(output_from_code("println(-1 + 1)\n", 0), "0\n");
    assert_eq!(output_from_code("println(-1 - 1)\n", 0), "-2\n");
    assert_eq!(output_from_code("println(1 + 2 * 2)\n", 0), "5\n");
    assert_eq!(output_from_code("println(4 / 2 * 3)\n", 0), "6\n");
    assert_eq!(output_from_code("println(4 * 2 % 4)\n", 0), "0\n");
}

#[test]
fn comparisons() {
    assert_eq!(output_from_code("println(1 < 2)\n", 0), "true\n");
    assert_eq!(output_from_code("println(1 <= 0)\n", 0), "false\n");
    assert_eq!(output_from_code("println(1.0 >= 1.0)\n", 0), "true\n");
    assert_eq!(output_from_code("println(1 == 2)\n", 0), "false\n");
}

#[test]
fn arithmetic_is_strongly_typed() {
    for op in ["+", "-", "*", "/", "%"] {
        let expected = format!(
            "Error (RUNTIME-2): A built-in function was called with an argument of incorrect type\n\n{op} expected argument #1 to be of a different type.\n"
        );
        assert_eq!(output_from_code(&format!("1 {op} 1.0\n"), 1), expected);
        assert_eq!(output_from_code(&format!("1.0 {op} 1\n"), 1), expected);
    }
}
