// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! End-to-end interpreter tests: compile a source, run `main`, compare the
//! captured output byte for byte.

use rill_interp::{Interpreter, RuntimeError};
use rill_resolve::{load_program, MemoryLoader, ResolvedProgram};
use rill_types::{typecheck, CheckOptions};

fn compile_with(source: &str, loader: MemoryLoader, strict: bool) -> ResolvedProgram {
    let (_, result) = load_program("main", "main.rill", source.to_string(), &loader);
    let program = result.expect("test source should resolve");
    let options = CheckOptions {
        strict_types: strict,
    };
    typecheck(&program, &options).expect("test source should type-check");
    program
}

fn compile(source: &str) -> ResolvedProgram {
    compile_with(source, MemoryLoader::new(), true)
}

/// Run a program, returning (stdout, result-of-main as error message).
fn run(source: &str) -> (String, Result<(), String>) {
    let program = compile(source);
    let (mut interp, buffer) = Interpreter::with_captured_output(&program);
    let result = interp.run().map(|_| ()).map_err(|d| d.error.to_string());
    let output = buffer.borrow().clone();
    (output, result)
}

fn run_ok(source: &str) -> String {
    let (output, result) = run(source);
    result.expect("program should run without a runtime error");
    output
}

fn run_err(source: &str) -> (String, String) {
    let (output, result) = run(source);
    let message = result.expect_err("program should stop with a runtime error");
    (output, message)
}

#[test]
fn hello_world() {
    let output = run_ok(r#"fn main() { print("Hello from the Language!"); }"#);
    assert_eq!(output, "Hello from the Language!\n");
}

#[test]
fn string_coercion_in_concat() {
    let output =
        run_ok(r#"fn main() { let a = 40; let b = 2; print("Result is " + (a + b)); }"#);
    assert_eq!(output, "Result is 42\n");
}

#[test]
fn coercion_works_on_either_side() {
    let output = run_ok(r#"fn main() { print(1 + "x" + true); }"#);
    assert_eq!(output, "1xtrue\n");
}

#[test]
fn for_with_step() {
    let output = run_ok("fn main() { for i in 0..=4 by 2 { print(i); } }");
    assert_eq!(output, "0\n2\n4\n");
}

#[test]
fn exclusive_range_stops_short() {
    let output = run_ok("fn main() { for i in 0..3 { print(i); } }");
    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn descending_range_defaults_to_negative_step() {
    let output = run_ok("fn main() { for i in 3..0 { print(i); } }");
    assert_eq!(output, "3\n2\n1\n");
}

#[test]
fn descending_inclusive_with_step() {
    let output = run_ok("fn main() { for i in 10..=0 by -5 { print(i); } }");
    assert_eq!(output, "10\n5\n0\n");
}

#[test]
fn empty_range_runs_zero_iterations() {
    let output = run_ok("fn main() { for i in 2..2 { print(i); } print(\"done\"); }");
    assert_eq!(output, "done\n");
}

#[test]
fn record_fields() {
    let output = run_ok("fn main() { let p = {x: 1, y: 2}; print(p.x + p.y); }");
    assert_eq!(output, "3\n");
}

#[test]
fn list_indexing() {
    let output = run_ok("fn main() { let xs = [10, 20, 30]; print(xs[1]); }");
    assert_eq!(output, "20\n");
}

#[test]
fn enum_match() {
    let output = run_ok(
        "enum C { R, G, B } \
         fn main() { let c = G; match c { R => { print(1); }; G => { print(2); }; B => { print(3); }; } }",
    );
    assert_eq!(output, "2\n");
}

#[test]
fn match_binds_payloads() {
    let output = run_ok(
        "enum Shape { Circle(Int), Rect(Int, Int) } \
         fn main() { \
             let s = Rect(3, 4); \
             match s { Circle(r) => { print(r); } Rect(w, h) => { print(w * h); } } \
         }",
    );
    assert_eq!(output, "12\n");
}

#[test]
fn match_literals_first_wins() {
    let output = run_ok(
        "fn main() { match 7 { 1 => { print(\"one\"); } 7 => { print(\"seven\"); } _ => { print(\"other\"); } } }",
    );
    assert_eq!(output, "seven\n");
}

#[test]
fn while_with_break_and_continue() {
    let output = run_ok(
        "fn main() { \
             let i = 0; \
             while true { \
                 set i = i + 1; \
                 if i == 2 { continue; } else { } \
                 if i > 4 { break; } else { } \
                 print(i); \
             } \
         }",
    );
    assert_eq!(output, "1\n3\n4\n");
}

#[test]
fn return_exits_the_function() {
    let output = run_ok(
        "fn pick(n: Int) -> Int { \
             if n > 0 { return 1; } else { }; \
             return -1; \
         } \
         fn main() { print(pick(5)); print(pick(-5)); }",
    );
    assert_eq!(output, "1\n-1\n");
}

#[test]
fn return_escapes_a_loop() {
    let output = run_ok(
        "fn first_over(limit: Int) -> Int { \
             for i in 0..100 { if i * i > limit { return i; } else { } } \
             return -1; \
         } \
         fn main() { print(first_over(10)); }",
    );
    assert_eq!(output, "4\n");
}

#[test]
fn recursion() {
    let output = run_ok(
        "fn fact(n: Int) -> Int { \
             if n <= 1 { return 1; } else { }; \
             return n * fact(n - 1); \
         } \
         fn main() { print(fact(10)); }",
    );
    assert_eq!(output, "3628800\n");
}

#[test]
fn function_values_are_callable() {
    let output = run_ok(
        "fn double(x: Int) -> Int { return x * 2; } \
         fn main() { let f = double; print(f(21)); }",
    );
    assert_eq!(output, "42\n");
}

#[test]
fn if_is_an_expression() {
    let output = run_ok("fn main() { let x = if 1 < 2 { 10; } else { 20; }; print(x); }");
    assert_eq!(output, "10\n");
}

#[test]
fn block_value_is_last_expression_statement() {
    let output = run_ok("fn main() { let x = if true { 1; let y = 2; } else { 3; }; print(x); }");
    assert_eq!(output, "()\n");
}

#[test]
fn integer_division_truncates_toward_zero() {
    let output = run_ok("fn main() { print(7 / 2); print(-7 / 2); }");
    assert_eq!(output, "3\n-3\n");
}

#[test]
fn print_joins_with_spaces() {
    let output = run_ok("fn main() { print(1, \"two\", true, [1, 2], {a: 1}); print(); }");
    assert_eq!(output, "1 two true [1, 2] {a: 1}\n\n");
}

#[test]
fn lexical_scoping_callee_cannot_see_caller_locals() {
    // `helper` must resolve `shadow` in its own module namespace, not in
    // main's scope; since there is none, the checker would reject a direct
    // reference, so instead observe that a parameter shadows correctly.
    let output = run_ok(
        "fn helper(x: Int) -> Int { return x + 1; } \
         fn main() { let x = 100; print(helper(1)); print(x); }",
    );
    assert_eq!(output, "2\n100\n");
}

#[test]
fn modules_and_qualified_names() {
    let loader = MemoryLoader::new().with(
        "palette",
        "module palette; \
         export { Color, best }; \
         enum Color { Red, Green, Blue } \
         fn best() -> Color { return Green; }",
    );
    let program = compile_with(
        "import palette as p; \
         fn main() { \
             let c = p.best(); \
             match c { p.Red => { print(\"r\"); } p.Green => { print(\"g\"); } _ => { print(\"?\"); } } \
             print(c); \
         }",
        loader,
        true,
    );
    let (mut interp, buffer) = Interpreter::with_captured_output(&program);
    interp.run().expect("should run");
    assert_eq!(buffer.borrow().as_str(), "g\nColor.Green\n");
}

#[test]
fn truthiness_applies_to_unannotated_conditions() {
    let program = compile_with(
        "fn report(flag) { if flag { print(\"yes\"); } else { print(\"no\"); } } \
         fn main() { report(0); report(1); report(\"\"); report(\"x\"); report(false); }",
        MemoryLoader::new(),
        false,
    );
    let (mut interp, buffer) = Interpreter::with_captured_output(&program);
    interp.run().expect("should run");
    assert_eq!(buffer.borrow().as_str(), "no\nyes\nno\nyes\nno\n");
}

// ─── Runtime errors ──────────────────────────────────────────

#[test]
fn division_by_zero() {
    let (_, message) = run_err("fn main() { let z = 0; print(5 / z); }");
    assert_eq!(message, "division by zero");
}

#[test]
fn index_out_of_bounds() {
    let (_, message) = run_err("fn main() { print([1, 2][5]); }");
    assert!(message.contains("index 5 out of bounds (length is 2)"));
}

#[test]
fn negative_index_is_out_of_bounds() {
    let (_, message) = run_err("fn main() { print([1, 2][-1]); }");
    assert!(message.contains("out of bounds"));
}

#[test]
fn non_exhaustive_match() {
    let (_, message) = run_err("fn main() { match 7 { 1 => { print(1); }; } }");
    assert_eq!(message, "no matching arm in match");
}

#[test]
fn break_outside_loop() {
    let (_, message) = run_err("fn main() { break; }");
    assert_eq!(message, "break used outside of a loop");
}

#[test]
fn continue_outside_loop() {
    let (_, message) = run_err("fn main() { continue; }");
    assert_eq!(message, "continue used outside of a loop");
}

#[test]
fn zero_step_is_rejected() {
    let (_, message) = run_err("fn main() { let s = 0; for i in 0..3 by s { print(i); } }");
    assert_eq!(message, "for step cannot be zero");
}

#[test]
fn step_against_range_direction() {
    let (_, message) = run_err("fn main() { let s = -1; for i in 0..3 by s { print(i); } }");
    assert_eq!(message, "for step must be positive for this range");

    let (_, message) = run_err("fn main() { let s = 1; for i in 3..0 by s { print(i); } }");
    assert_eq!(message, "for step must be negative for this range");
}

#[test]
fn missing_main() {
    let (_, message) = run_err("fn helper() { print(1); }");
    assert_eq!(message, "no `main` function defined");
}

#[test]
fn main_with_params_is_rejected() {
    let (_, message) = run_err("fn main(x: Int) { print(x); }");
    assert_eq!(message, "`main` must take no parameters");
}

#[test]
fn duplicate_record_field_at_runtime() {
    let (_, message) = run_err("fn main() { let p = {x: 1, x: 2}; print(p.x); }");
    assert!(message.contains("duplicate field `x`"));
}

#[test]
fn runtime_error_reports_call_chain() {
    let program = compile(
        "fn inner(d: Int) -> Int { return 10 / d; } \
         fn outer(d: Int) -> Int { return inner(d); } \
         fn main() { print(outer(0)); }",
    );
    let (mut interp, _) = Interpreter::with_captured_output(&program);
    let diag = interp.run().expect_err("should fail");
    assert!(matches!(diag.error, RuntimeError::DivisionByZero));
    let chain: Vec<&str> = interp
        .call_chain()
        .iter()
        .map(|f| f.function.as_str())
        .collect();
    assert_eq!(chain, vec!["main", "outer", "inner"]);
}

#[test]
fn output_before_the_error_is_kept() {
    let (output, _) = run_err("fn main() { print(\"before\"); print(1 / 0); }");
    assert_eq!(output, "before\n");
}

#[test]
fn step_limit_stops_infinite_loops() {
    let program = compile("fn main() { while true { } }");
    let (interp, _buffer) = Interpreter::with_captured_output(&program);
    let mut interp = interp.with_max_steps(Some(10_000));
    let diag = interp.run().expect_err("should hit the ceiling");
    assert!(matches!(diag.error, RuntimeError::StepLimit(_)));
}

#[test]
fn deterministic_output() {
    let source = "fn main() { for i in 0..5 { print(i * i); } }";
    assert_eq!(run_ok(source), run_ok(source));
}
