//! Parser unit tests.

use rill_ast::decl::ItemKind;
use rill_ast::expr::{BinOp, ExprKind, PatternKind};
use rill_ast::stmt::StmtKind;
use rill_ast::SourceId;
use rill_lexer::Lexer;

use crate::{ParseResult, Parser};

fn parse(source: &str) -> ParseResult {
    let lexed = Lexer::new(source, SourceId(0)).tokenize();
    assert!(lexed.is_ok(), "lex errors in test input: {:?}", lexed.errors);
    Parser::new(lexed.tokens).parse()
}

fn parse_ok(source: &str) -> ParseResult {
    let result = parse(source);
    assert!(result.is_ok(), "parse errors: {:?}", result.errors);
    result
}

/// Parse `source` as the body of `fn main`, returning the main item.
fn main_body(source: &str) -> Vec<StmtKind> {
    let result = parse_ok(&format!("fn main() {{ {} }}", source));
    match result.program.items.into_iter().next().map(|i| i.kind) {
        Some(ItemKind::Fn(f)) => f.body.stmts.into_iter().map(|s| s.kind).collect(),
        other => panic!("expected fn item, got {:?}", other),
    }
}

#[test]
fn module_and_items() {
    let result = parse_ok(
        "module geometry;\n\
         import util as u;\n\
         export { area };\n\
         enum Shape { Circle(Int), Square }\n\
         fn area(s: Shape) -> Int { return 0; }",
    );
    assert_eq!(
        result.program.module_name.as_ref().map(|(n, _)| n.as_str()),
        Some("geometry")
    );
    assert_eq!(result.program.items.len(), 4);
}

#[test]
fn precedence_mul_binds_tighter_than_add() {
    let stmts = main_body("let x = 1 + 2 * 3;");
    let StmtKind::Let { init, .. } = &stmts[0] else {
        panic!("expected let")
    };
    let ExprKind::Binary { op, right, .. } = &init.kind else {
        panic!("expected binary")
    };
    assert_eq!(*op, BinOp::Add);
    assert!(matches!(
        right.kind,
        ExprKind::Binary { op: BinOp::Mul, .. }
    ));
}

#[test]
fn binary_operators_left_associate() {
    let stmts = main_body("let x = 10 - 3 - 2;");
    let StmtKind::Let { init, .. } = &stmts[0] else {
        panic!("expected let")
    };
    // (10 - 3) - 2
    let ExprKind::Binary { op, left, right } = &init.kind else {
        panic!("expected binary")
    };
    assert_eq!(*op, BinOp::Sub);
    assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::Sub, .. }));
    assert!(matches!(right.kind, ExprKind::Int(2)));
}

#[test]
fn comparison_below_logic() {
    let stmts = main_body("let x = 1 < 2 && 3 < 4;");
    let StmtKind::Let { init, .. } = &stmts[0] else {
        panic!("expected let")
    };
    assert!(matches!(
        init.kind,
        ExprKind::Binary { op: BinOp::And, .. }
    ));
}

#[test]
fn postfix_chain() {
    let stmts = main_body("let x = points[0].x;");
    let StmtKind::Let { init, .. } = &stmts[0] else {
        panic!("expected let")
    };
    let ExprKind::Field { object, field, .. } = &init.kind else {
        panic!("expected field access")
    };
    assert_eq!(field, "x");
    assert!(matches!(object.kind, ExprKind::Index { .. }));
}

#[test]
fn unary_binds_tighter_than_binary() {
    let stmts = main_body("let x = -a + b;");
    let StmtKind::Let { init, .. } = &stmts[0] else {
        panic!("expected let")
    };
    let ExprKind::Binary { op, left, .. } = &init.kind else {
        panic!("expected binary")
    };
    assert_eq!(*op, BinOp::Add);
    assert!(matches!(left.kind, ExprKind::Unary { .. }));
}

#[test]
fn else_if_nests_in_else_block() {
    let stmts = main_body("if a { 1; } else if b { 2; } else { 3; }");
    let StmtKind::Expr(expr) = &stmts[0] else {
        panic!("expected expression statement")
    };
    let ExprKind::If { else_block, .. } = &expr.kind else {
        panic!("expected if")
    };
    assert_eq!(else_block.stmts.len(), 1);
    let StmtKind::Expr(nested) = &else_block.stmts[0].kind else {
        panic!("expected nested if as expression statement")
    };
    assert!(matches!(nested.kind, ExprKind::If { .. }));
}

#[test]
fn if_without_else_is_an_error() {
    let result = parse("fn main() { if a { 1; } }");
    assert!(!result.is_ok());
}

#[test]
fn while_condition_is_not_a_record_literal() {
    let stmts = main_body("while x { set x = false; }");
    let StmtKind::While { cond, body } = &stmts[0] else {
        panic!("expected while")
    };
    assert!(matches!(cond.kind, ExprKind::Ident(_)));
    assert_eq!(body.stmts.len(), 1);
}

#[test]
fn record_literal_in_let() {
    let stmts = main_body("let p = {x: 1, y: 2};");
    let StmtKind::Let { init, .. } = &stmts[0] else {
        panic!("expected let")
    };
    let ExprKind::Record(fields) = &init.kind else {
        panic!("expected record literal")
    };
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name, "x");
}

#[test]
fn for_with_step() {
    let stmts = main_body("for i in 0..=4 by 2 { print(i); }");
    let StmtKind::For {
        binding,
        inclusive,
        step,
        ..
    } = &stmts[0]
    else {
        panic!("expected for")
    };
    assert_eq!(binding, "i");
    assert!(*inclusive);
    assert!(step.is_some());
}

#[test]
fn match_arms_with_optional_semicolons() {
    let stmts = main_body(
        "match c { R => { print(1); }; G => { print(2); } B(n) => { print(n); }; _ => { print(0); } }",
    );
    let StmtKind::Expr(expr) = &stmts[0] else {
        panic!("expected expression statement")
    };
    let ExprKind::Match { arms, .. } = &expr.kind else {
        panic!("expected match")
    };
    assert_eq!(arms.len(), 4);
    assert!(matches!(
        &arms[2].pattern.kind,
        PatternKind::Name {
            qualifier: None,
            args: Some(_),
            ..
        }
    ));
    assert!(matches!(&arms[3].pattern.kind, PatternKind::Wildcard));
}

#[test]
fn qualified_pattern() {
    let stmts = main_body("match c { palette.Red => { 1; } _ => { 0; } }");
    let StmtKind::Expr(expr) = &stmts[0] else {
        panic!("expected expression statement")
    };
    let ExprKind::Match { arms, .. } = &expr.kind else {
        panic!("expected match")
    };
    let PatternKind::Name { qualifier, name, .. } = &arms[0].pattern.kind else {
        panic!("expected name pattern")
    };
    assert_eq!(qualifier.as_deref(), Some("palette"));
    assert_eq!(name, "Red");
}

#[test]
fn recovery_leaves_a_sentinel_and_continues() {
    let result = parse("fn main() { let = 3; print(1); }");
    assert!(!result.is_ok());
    let ItemKind::Fn(f) = &result.program.items[0].kind else {
        panic!("expected fn item to survive recovery")
    };
    assert!(f.body.stmts.iter().any(|s| matches!(s.kind, StmtKind::Err)));
    // The statement after the bad one still parses.
    assert!(f
        .body
        .stmts
        .iter()
        .any(|s| matches!(s.kind, StmtKind::Expr(_))));
}

#[test]
fn recovery_continues_with_later_items() {
    let result = parse("fn broken() { let = 1; } fn fine() { print(1); }");
    assert!(!result.is_ok());
    assert_eq!(result.program.items.len(), 2);
}

#[test]
fn error_count_is_capped() {
    let source = "fn main() { ".to_string() + &"let = ;".repeat(100) + " }";
    let result = parse(&source);
    assert!(result.errors.len() <= 20);
}

#[test]
fn stray_token_at_top_level() {
    let result = parse("42 fn main() { print(1); }");
    assert!(!result.is_ok());
    assert_eq!(result.program.items.len(), 1);
}

#[test]
fn missing_semicolon_reported_at_offending_token() {
    let result = parse("fn main() { let a = 1 let b = 2; }");
    assert!(!result.is_ok());
    assert!(result.errors[0].message.contains("`;`"));
}

#[test]
fn parser_is_total_on_garbage() {
    for source in ["", "}}}}", "fn", "fn f(", "enum {", "let x = ;", "((((("] {
        let lexed = Lexer::new(source, SourceId(0)).tokenize();
        let _ = Parser::new(lexed.tokens).parse();
    }
}
