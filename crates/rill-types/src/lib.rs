// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Static type checking for Rill.

mod checker;
mod errors;
mod types;

pub use checker::{typecheck, CheckOptions};
pub use errors::TypeError;
pub use types::Type;

#[cfg(test)]
mod tests {
    use super::*;
    use rill_resolve::{load_program, MemoryLoader, ResolvedProgram};

    fn resolve(source: &str, loader: MemoryLoader) -> ResolvedProgram {
        let (_, result) = load_program("main", "main.rill", source.to_string(), &loader);
        result.expect("test source should resolve")
    }

    fn check_with(source: &str, loader: MemoryLoader, strict: bool) -> Vec<String> {
        let program = resolve(source, loader);
        let options = CheckOptions {
            strict_types: strict,
        };
        match typecheck(&program, &options) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn check(source: &str) -> Vec<String> {
        check_with(source, MemoryLoader::new(), true)
    }

    fn check_loose(source: &str) -> Vec<String> {
        check_with(source, MemoryLoader::new(), false)
    }

    fn assert_ok(source: &str) {
        let errors = check(source);
        assert!(errors.is_empty(), "unexpected type errors: {:?}", errors);
    }

    fn assert_err(source: &str, needle: &str) {
        let errors = check(source);
        assert!(
            errors.iter().any(|e| e.contains(needle)),
            "expected an error containing {:?}, got {:?}",
            needle,
            errors
        );
    }

    #[test]
    fn let_annotation_must_match() {
        assert_err(
            "fn main() { let x: Int = \"hi\"; }",
            "expected Int, found String",
        );
        assert_ok("fn main() { let x: Int = 42; print(x); }");
    }

    #[test]
    fn let_acquires_initializer_type() {
        assert_err(
            "fn main() { let x = 1; set x = \"hi\"; }",
            "expected Int, found String",
        );
    }

    #[test]
    fn arithmetic_needs_integers() {
        assert_err("fn main() { let x = true * 2; }", "`*` expects integers");
        assert_err("fn main() { let x = 1 - \"a\"; }", "`-` expects integers");
    }

    #[test]
    fn plus_concatenates_with_strings() {
        assert_ok("fn main() { print(\"n = \" + 42); }");
        assert_ok("fn main() { print(1 + 2); }");
        assert_err("fn main() { let x = true + 1; }", "string operand");
    }

    #[test]
    fn comparisons_are_int_only() {
        assert_err("fn main() { let x = \"a\" < \"b\"; }", "`<` expects integers");
        assert_ok("fn main() { let x = 1 < 2; print(x); }");
    }

    #[test]
    fn equality_requires_matching_types() {
        assert_err("fn main() { let x = 1 == \"one\"; }", "must match");
        assert_ok("fn main() { let x = [1] == [2]; print(x); }");
    }

    #[test]
    fn logic_requires_booleans() {
        assert_err("fn main() { let x = 1 && true; }", "`&&` expects booleans");
        assert_err("fn main() { let x = !0; }", "`!` expects booleans");
    }

    #[test]
    fn if_condition_must_be_bool() {
        assert_err(
            "fn main() { if 1 { print(1); } else { print(2); } }",
            "expected Bool",
        );
    }

    #[test]
    fn if_join_of_differing_arms_is_unit() {
        // A unit-joined if cannot flow into an Int binding.
        assert_err(
            "fn main() { let x: Int = if true { 1; } else { \"s\"; }; }",
            "expected Int, found Unit",
        );
        assert_ok("fn main() { let x: Int = if true { 1; } else { 2; }; print(x); }");
    }

    #[test]
    fn join_does_not_adopt_an_unknown_arm() {
        // The unannotated arm must not silently take the Int arm's type;
        // the join is Unit, so the return no longer fits the signature.
        let source =
            "fn f(a) -> Int { return if true { a; } else { 5; }; } fn main() { print(f(\"oops\")); }";
        let strict_errors = check(source);
        assert!(
            strict_errors
                .iter()
                .any(|e| e.contains("expected Int, found Unit")),
            "{:?}",
            strict_errors
        );
        let loose_errors = check_loose(source);
        assert!(
            loose_errors
                .iter()
                .any(|e| e.contains("expected Int, found Unit")),
            "{:?}",
            loose_errors
        );
    }

    #[test]
    fn block_value_is_last_expression_statement() {
        assert_err(
            "fn main() { let x: Int = if true { let y = 1; } else { 2; }; }",
            "expected Int, found Unit",
        );
    }

    #[test]
    fn field_access_checks_the_record() {
        assert_ok("fn main() { let p = {x: 1, y: 2}; print(p.x + p.y); }");
        assert_err(
            "fn main() { let p = {x: 1}; print(p.z); }",
            "no field `z`",
        );
        assert_err("fn main() { let n = 1; print(n.x); }", "expects a record");
    }

    #[test]
    fn indexing_checks_list_and_index() {
        assert_ok("fn main() { let xs = [10, 20]; print(xs[1]); }");
        assert_err("fn main() { let xs = [1]; print(xs[true]); }", "`indexing` expects integers");
        assert_err("fn main() { let n = 3; print(n[0]); }", "expects a list");
    }

    #[test]
    fn list_elements_must_agree() {
        assert_err("fn main() { let xs = [1, \"two\"]; }", "expected Int, found String");
    }

    #[test]
    fn call_arity_and_argument_types() {
        assert_err(
            "fn f(a: Int) -> Int { return a; } fn main() { f(1, 2); }",
            "expects 1 argument(s), found 2",
        );
        assert_err(
            "fn f(a: Int) -> Int { return a; } fn main() { f(true); }",
            "expected Int, found Bool",
        );
        assert_ok("fn f(a: Int) -> Int { return a; } fn main() { print(f(1)); }");
    }

    #[test]
    fn return_type_is_enforced() {
        assert_err(
            "fn f() -> Int { return \"no\"; } fn main() { }",
            "expected Int, found String",
        );
        assert_err(
            "fn f() -> Int { print(1); } fn main() { }",
            "no return statement",
        );
    }

    #[test]
    fn enum_patterns_check_ownership() {
        assert_ok(
            "enum Color { R, G, B } \
             fn main() { let c = G; match c { R => { print(1); } G => { print(2); } B => { print(3); } } }",
        );
        assert_err(
            "enum Color { R, G } enum Other { X } \
             fn main() { let c = R; match c { X => { print(1); } _ => { print(0); } } }",
            "pattern does not fit",
        );
    }

    #[test]
    fn literal_patterns_constrain_subject() {
        assert_err(
            "fn main() { let s = \"x\"; match s { 1 => { print(1); } _ => { print(0); } } }",
            "pattern does not fit",
        );
    }

    #[test]
    fn match_arms_must_agree_with_first() {
        assert_err(
            "fn main() { let x: Int = match 1 { 1 => { 2; } _ => { \"s\"; } }; }",
            "expected Int, found String",
        );
    }

    #[test]
    fn variant_payload_construction() {
        assert_ok(
            "enum Shape { Circle(Int), Dot } \
             fn main() { let s = Circle(3); match s { Circle(r) => { print(r); } Dot => { print(0); } } }",
        );
        assert_err(
            "enum Shape { Circle(Int) } fn main() { let s = Circle(true); }",
            "expected Int, found Bool",
        );
        assert_err(
            "enum Shape { Circle(Int) } fn main() { let s = Circle; }",
            "carries a payload",
        );
        assert_err(
            "enum Shape { Circle(Int) } \
             fn main() { let s = Circle(1); match s { Circle(a, b) => { print(a); } _ => { } } }",
            "expects 1 payload value(s)",
        );
    }

    #[test]
    fn payload_binding_gets_payload_type() {
        assert_err(
            "enum Shape { Circle(Int) } \
             fn main() { let s = Circle(1); match s { Circle(r) => { let x: Bool = r; } _ => { } } }",
            "expected Bool, found Int",
        );
    }

    #[test]
    fn qualified_enum_types_flow_across_modules() {
        let loader = MemoryLoader::new().with(
            "palette",
            "export { Color, red }; enum Color { Red, Blue } fn red() -> Color { return Red; }",
        );
        let errors = check_with(
            "import palette; \
             fn main() { let c: palette.Color = palette.red(); \
                         match c { palette.Red => { print(1); } _ => { print(0); } } }",
            loader,
            true,
        );
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn cross_module_enum_mismatch() {
        let loader = MemoryLoader::new().with(
            "palette",
            "export { Color }; enum Color { Red, Blue }",
        );
        let errors = check_with(
            "import palette; enum Local { Red2 } \
             fn main() { let c: palette.Color = Red2; }",
            loader,
            true,
        );
        assert!(
            errors
                .iter()
                .any(|e| e.contains("expected palette.Color, found main.Local")),
            "{:?}",
            errors
        );
    }

    #[test]
    fn strict_mode_rejects_unknown_operands() {
        let errors = check("fn f(a, b) { return a + b; } fn main() { }");
        assert!(
            errors.iter().any(|e| e.contains("unknown type")
                || e.contains("add a type annotation")),
            "{:?}",
            errors
        );
    }

    #[test]
    fn loose_mode_admits_unknown_operands() {
        let errors = check_loose("fn f(a, b) { return a + b; } fn main() { print(f(1, 2)); }");
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn unknown_conditions_are_admitted_in_both_modes() {
        let errors = check("fn f(flag) { if flag { print(1); } else { print(2); } } fn main() { }");
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn checker_reports_multiple_errors() {
        let errors = check(
            "fn main() { let a = true * 2; let b = 1 && false; let c = \"s\" < 1; }",
        );
        assert!(errors.len() >= 3, "{:?}", errors);
    }

    #[test]
    fn unknown_type_annotation() {
        assert_err("fn main() { let x: Whatever = 1; }", "unknown type `Whatever`");
    }

    #[test]
    fn print_accepts_anything() {
        assert_ok("fn main() { print(); print(1, \"a\", true, [1], {x: 1}); }");
    }

    #[test]
    fn function_values_have_fn_types() {
        assert_ok(
            "fn double(x: Int) -> Int { return x * 2; } \
             fn main() { let f = double; print(f(21)); }",
        );
        assert_err(
            "fn main() { let n = 3; n(); }",
            "not callable",
        );
    }
}
