//! User-declared `struct` types: field factories, `self`, equality, and
//! display, grounded on `original_source/tests/constructs/test_struct.py`.

mod support;
use support::output_from_code;
use pretty_assertions::assert_eq;

#[test]
fn bare_constructor_argument_is_a_field() {
    assert_eq!(
        output_from_code("struct Box(self, value):\n\nprintln(Box(\"foo\").value)\n", 0),
        "foo\n"
    );
}

#[test]
fn struct_instance_is_callable_with_a_field_name() {
    assert_eq!(
        output_from_code("struct Box(self, value):\n\nprintln(Box(\"foo\")(\"value\"))\n", 0),
        "foo\n"
    );
}

#[test]
fn factory_method_closes_over_constructor_arguments() {
    let code = "struct Incrementor(self, value):\n\tfn incremented():\n\t\tvalue + 1\n\nprintln(Incrementor(1).incremented())\n";
    assert_eq!(output_from_code(code, 0), "2\n");
}

#[test]
fn self_resolves_to_the_finished_instance_after_construction() {
    let code = "struct Box(self, value):\n\tfn value_mirror():\n\t\tself.value\n\nprintln(Box(\"foo\").value_mirror())\n";
    assert_eq!(output_from_code(code, 0), "foo\n");
}

#[test]
fn self_field_access_during_factory_execution_is_runtime_9() {
    let code = "struct Box(self, value):\n\tself.value\n\nBox(\"foo\")\n";
    assert_eq!(
        output_from_code(code, 1),
        "Error (RUNTIME-9): Unknown field: `value`\n"
    );
}

#[test]
fn to_str_is_available_on_self_even_during_factory_execution() {
    // `to_str`/`==`/`!=` are the built-in, non-overridable implementations
    // regardless of factory state — unlike a user field, they don't need
    // the finished instance, since `to_str` only ever reads `ctor_fields`.
    let code = "struct Struct(self):\n\tprintln(self)\n\nStruct()\n";
    assert_eq!(output_from_code(code, 0), "Struct()\n");
}

#[test]
fn struct_decl_requires_self_as_its_first_parameter() {
    // `struct Struct():` has no parameters at all, so the declaration is
    // missing its required `self` — the parser reports the unexpected
    // `:` it finds instead (there's no parameter to check the name of).
    assert_eq!(
        output_from_code("struct Struct():\n", 1),
        "Error (PARSER-1): The parser failed: unexpected token \":\"\n\n  1  \u{2502} struct Struct():\n     \u{2502}                ^\n\n"
    );
}

#[test]
fn built_in_to_str_is_not_overridable() {
    let code = "struct Struct(self):\n\tfn __to_str__():\n\t\t\"\"\n\nprintln(Struct())\n";
    assert_eq!(output_from_code(code, 0), "Struct()\n");
}

#[test]
fn built_in_eq_is_not_overridable() {
    let code = "struct Struct(self):\n\tfn ==(_):\n\t\tfalse\n\nprintln(Struct() == Struct())\n";
    assert_eq!(output_from_code(code, 0), "true\n");
}

#[test]
fn built_in_neq_is_not_overridable() {
    let code = "struct Struct(self):\n\tfn !=(_):\n\t\ttrue\n\nprintln(Struct() != Struct())\n";
    assert_eq!(output_from_code(code, 0), "false\n");
}

#[test]
fn plain_binding_in_factory_body_is_a_field() {
    let code = "struct Struct(self):\n\tvalue = \"foo\"\n\nprintln(Struct().value)\n";
    assert_eq!(output_from_code(code, 0), "foo\n");
}

#[test]
fn equality_requires_same_constructor_and_equal_fields() {
    let code = "struct Struct1(self):\nstruct Struct2(self):\n\nprintln(\n\t(Struct1() == Struct1()) &&\n\t!(Struct1() != Struct1()) &&\n\t!(Struct1() == Struct2()) &&\n\t(Struct1() != Struct2())\n)\n";
    assert_eq!(output_from_code(code, 0), "true\n");

    let code = "struct Box(self, value):\n\nprintln(\n\t(Box(\"foo\") == Box(\"foo\")) &&\n\t!(Box(\"foo\") != Box(\"foo\")) &&\n\t!(Box(\"foo\") == Box(\"bar\")) &&\n\t(Box(\"foo\") != Box(\"bar\"))\n)\n";
    assert_eq!(output_from_code(code, 0), "true\n");

    let code = "struct Box1(self, value):\nstruct Box2(self, value):\n\nprintln(\n\t(Box1(\"foo\") == Box1(\"foo\")) &&\n\t!(Box1(\"foo\") != Box1(\"foo\")) &&\n\t!(Box1(\"foo\") == Box2(\"foo\")) &&\n\t(Box1(\"foo\") != Box2(\"foo\"))\n)\n";
    assert_eq!(output_from_code(code, 0), "true\n");
}

#[test]
fn display_shows_constructor_arguments_not_factory_fields() {
    assert_eq!(
        output_from_code("struct Struct(self):\n\nprintln(Struct())\n", 0),
        "Struct()\n"
    );
    assert_eq!(
        output_from_code("struct Box(self, value):\n\nprintln(Box(\"foo\"))\n", 0),
        "Box(foo)\n"
    );
    assert_eq!(
        output_from_code("struct Pair(self, number1, number2):\n\nprintln(Pair(1, 2))\n", 0),
        "Pair(1, 2)\n"
    );
    assert_eq!(
        output_from_code("struct Box(self, value):\n\nprintln(Box(Box(\"foo\")))\n", 0),
        "Box(Box(foo))\n"
    );
}
