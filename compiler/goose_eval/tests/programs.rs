//! Whole-program tests: parse with `goose_parse`, run, compare output.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

mod common;

use common::{error_of, output_of, run};
use pretty_assertions::assert_eq;

// Basics

#[test]
fn compound_assignment() {
    assert_eq!(output_of("let x = 1; x += 2; print(x)"), "3");
}

#[test]
fn string_interpolation() {
    let source = r#"let a = 1; let b = 2; print("sum: ${a + b}, a: $a")"#;
    assert_eq!(output_of(source), "sum: 3, a: 1");
}

#[test]
fn printf_verbs() {
    let source = r#"printf("%s|%d|%.2f|%%", "x", 7.9, 3.14159)"#;
    assert_eq!(output_of(source), "x|7|3.14|%");
}

#[test]
fn pipeline_binds_underscore() {
    assert_eq!(output_of("print(3 -> _ * 2)"), "6");
}

#[test]
fn if_expression() {
    assert_eq!(output_of("let n = 4\nprint(if n > 3 then \"big\" else \"small\")"), "big");
}

// Loops

#[test]
fn for_over_string_yields_characters() {
    assert_eq!(output_of(r#"for c in "ab" { print(c) }"#), "ab");
}

#[test]
fn for_over_range() {
    assert_eq!(output_of("for i in 0 to 3 { print(i) }"), "012");
    assert_eq!(output_of("for i in 5 to 0 step -2 { print(i) }"), "531");
}

#[test]
fn repeat_forms() {
    let source = "let n = 0\n\
                  repeat 3 times\n  n++\nend\n\
                  repeat while n < 5\n  n++\nend\n\
                  repeat forever\n  n += 10\n  if n > 20 { break }\nend\n\
                  print(n)";
    assert_eq!(output_of(source), "25");
}

#[test]
fn continue_skips_rest_of_body() {
    let source = "for i in 0 to 5\n  if i % 2 == 0 { continue }\n  print(i)\nend";
    assert_eq!(output_of(source), "13");
}

// Arrays and strings

#[test]
fn array_read_past_end_is_null() {
    assert_eq!(output_of("let a = [1, 2]\nprint(a[5])"), "null");
}

#[test]
fn array_write_past_end_fails() {
    assert_eq!(error_of("let a = [1, 2]\na[5] = 1"), "index 5 out of range");
}

#[test]
fn array_init_binds_index() {
    assert_eq!(output_of("let a = [_ * 2; 4]\nprint(a[3], len(a))"), "6 4");
}

#[test]
fn slices() {
    assert_eq!(output_of(r#"print("hello"[1:3])"#), "el");
    assert_eq!(output_of("let a = [1, 2, 3, 4]\nprint(len(a[1:]))"), "3");
}

#[test]
fn spread_in_array_literal() {
    assert_eq!(output_of("let a = [1, 2]\nlet b = [...a, 3]\nprint(len(b))"), "3");
}

#[test]
fn frozen_array_rejects_writes() {
    assert_eq!(
        error_of("let a = frozen [1, 2]\na[0] = 5"),
        "cannot modify frozen value"
    );
}

#[test]
fn oversized_repeat_is_an_error() {
    let (outcome, output) = run("print(\"ab\" * 3)\nlet s = \"ab\" * 9223372036854775807");
    assert_eq!(output, "ababab");
    assert_eq!(outcome.exit_code, goose_eval::PANIC_EXIT_CODE);
    assert_eq!(
        outcome.error.unwrap().message,
        "string repeat count 9223372036854775807 is too large"
    );
    assert_eq!(output_of("print(len(\"ab\" * -2))"), "0");
}

#[test]
fn oversized_array_init_is_an_error() {
    assert_eq!(
        error_of("let a = [0; 9223372036854775807]"),
        "array size 9223372036854775807 is too large"
    );
}

// Functions

#[test]
fn default_and_rest_parameters() {
    let source = "fn f(a, b = 10, ...rest) -> a + b + len(rest)\nprint(f(1), f(1, 2), f(1, 2, 3, 4))";
    assert_eq!(output_of(source), "11 3 5");
}

#[test]
fn closures_share_captured_variables() {
    let source = "fn counter()\n  let n = 0\n  return fn()\n    n += 1\n    return n\n  end\nend\n\
                  let c = counter()\nc()\nc()\nprint(c())";
    assert_eq!(output_of(source), "3");
}

#[test]
fn memoized_fibonacci() {
    let source = "memo fn fib(n) -> if n < 2 then n else fib(n - 1) + fib(n - 2)\nprint(fib(90))";
    assert_eq!(output_of(source), "2880067194370816120");
}

#[test]
fn memoized_calls_share_their_result() {
    let source = "memo fn mk(n) -> { v: n }\nlet a = mk(1)\nlet b = mk(1)\nlet c = mk(2)\n\
                  a.v = 9\nprint(b.v, c.v)";
    assert_eq!(output_of(source), "9 2");
}

#[test]
fn integers_do_not_overflow() {
    assert_eq!(
        output_of("print(9223372036854775807 + 1)"),
        "9223372036854775808"
    );
}

// Structs

#[test]
fn struct_fields_and_receiver_functions() {
    let source = "struct Point(x, y) end\n\
                  fn Point.sum() -> #x + #y\n\
                  let p = Point(1, 2)\n\
                  print(p.x, p.sum(), typeof(p))";
    assert_eq!(output_of(source), "1 3 Point");
}

#[test]
fn struct_defaults_and_init() {
    let source = "struct V(x = 0)\ninit\n  #x = #x + 1\nend\nprint(V().x, V(5).x)";
    assert_eq!(output_of(source), "1 6");
}

#[test]
fn struct_name_can_be_reassigned() {
    let source = "struct P(x) end\nlet p = P(1)\nP = 3\nprint(P, typeof(p), p.x)";
    assert_eq!(output_of(source), "3 P 1");
    assert_eq!(
        error_of("struct P(x) end\nstruct P(y) end"),
        "cannot redefine variable P"
    );
}

#[test]
fn operator_overloading() {
    let source = "struct Vec(x, y) end\n\
                  operator Vec +(other) -> Vec(#x + other.x, #y + other.y)\n\
                  let s = Vec(1, 2) + Vec(3, 4)\n\
                  print(s.x, s.y)";
    assert_eq!(output_of(source), "4 6");
}

// Match

#[test]
fn match_binds_array_elements() {
    // A newline does not end an expression, so the arm before a `[`
    // pattern needs its comma.
    let source = "let pair = [1, 2]\n\
                  let r = match pair\n  null -> 0,\n  [$a, $b] -> a + b,\n  else -> -1\nend\n\
                  print(r)";
    assert_eq!(output_of(source), "3");
}

#[test]
fn match_binds_object_fields() {
    let source = "let p = { x: 1, y: 5 }\n\
                  print(match p\n  { x: 2, y: $y } -> y\n  { x: 1, y: $y } -> y * 10\nend)";
    assert_eq!(output_of(source), "50");
}

#[test]
fn match_ranges_and_fallback() {
    let source = "fn grade(n) -> match n\n  0 to 50 -> \"low\"\n  50 to 101 -> \"high\"\n  else -> \"?\"\nend\n\
                  print(grade(10), grade(70), grade(500))";
    assert_eq!(output_of(source), "low high ?");
}

// Errors and exit

#[test]
fn division_by_zero_exits_with_panic_code() {
    let (outcome, output) = run("print(\"before\")\nlet x = 1 / 0\nprint(\"after\")");
    assert_eq!(outcome.exit_code, goose_eval::PANIC_EXIT_CODE);
    assert_eq!(output, "before");
    assert_eq!(outcome.error.unwrap().message, "division by zero");
}

#[test]
fn exit_code_is_reported() {
    let (outcome, _) = run("exit(7)");
    assert_eq!(outcome.exit_code, 7);
    assert!(outcome.error.is_none());
}

#[test]
fn thrown_value_reaches_catch() {
    let source = "try\n  throw { code: 3 }\ncatch as e\n  print(e.code)\nend";
    assert_eq!(output_of(source), "3");
}

#[test]
fn return_inside_finally_wins() {
    let source = "fn f()\n  try\n    return 1\n  finally\n    return 2\n  end\nend\nprint(f())";
    assert_eq!(output_of(source), "2");
}

// Generators

#[test]
fn generator_early_break_stops_producer() {
    let source = "generator naturals()\n  let n = 0\n  repeat forever\n    yield n\n    n++\n  end\nend\n\
                  for n in naturals()\n  if n == 3 { break }\n  print(n)\nend\n\
                  print(\"done\")";
    assert_eq!(output_of(source), "012done");
}

#[test]
fn generator_methods() {
    let source = "generator upto(limit)\n  for i in 0 to limit\n    yield i\n  end\nend\n\
                  let g = upto(3)\n\
                  print(g.next(), g.next())\n\
                  print(len(upto(4).toArray()))\n\
                  g.close()\n\
                  print(g.isDone())";
    assert_eq!(output_of(source), "0 14true");
}

// Standard library

#[test]
fn std_math_import() {
    let source = "import \"std:math\" show { sqrt, max, PI }\n\
                  print(sqrt(16), max(2, 9), PI > 3)";
    assert_eq!(output_of(source), "4 9 true");
}

#[test]
fn std_json_round_trip() {
    let source = "import \"std:json\" as json\n\
                  let text = json.encode({ a: [1, 2] })\n\
                  print(text)\n\
                  print(json.decode(text).a[1])";
    assert_eq!(output_of(source), "{\"a\":[1,2]}2");
}

#[test]
fn unknown_std_module_fails() {
    let message = error_of("import \"std:nope\" as nope");
    assert!(message.contains("not found"), "{message}");
}
