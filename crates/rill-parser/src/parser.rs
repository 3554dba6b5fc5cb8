// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation using Pratt parsing for expressions.

use rill_ast::decl::{
    EnumDecl, ExportDecl, FnDecl, ImportDecl, Item, ItemKind, Param, Program, Variant,
};
use rill_ast::expr::{BinOp, Expr, ExprKind, FieldInit, MatchArm, Pattern, PatternKind, UnaryOp};
use rill_ast::stmt::{Block, Stmt, StmtKind, TypeRef, TypeRefKind};
use rill_ast::token::{Token, TokenKind};
use rill_ast::Span;

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// Binding power of prefix operators.
const PREFIX_BP: u8 = 13;
/// Binding power of postfix forms (field access, indexing, calls).
const POSTFIX_BP: u8 = 15;

/// The parser for Rill source code.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Controls whether `{` can start a record literal (false in the header
    /// expressions of `if`/`while`/`match`/`for`, where `{` opens the body).
    allow_brace_expr: bool,
    /// Collected errors during parsing.
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            allow_brace_expr: true,
            errors: Vec::new(),
        }
    }

    /// Parse a whole source buffer.
    ///
    /// Always terminates and always returns a structurally sound program:
    /// statements that failed to parse are replaced by `StmtKind::Err`
    /// sentinels, and the errors that produced them ride along in the result.
    pub fn parse(mut self) -> ParseResult {
        let module_name = self.parse_module_decl();

        let mut items = Vec::new();
        while !self.at_end() && self.errors.len() < MAX_ERRORS {
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize_item();
                }
            }
        }

        ParseResult {
            program: Program { module_name, items },
            errors: self.errors,
        }
    }

    fn parse_module_decl(&mut self) -> Option<(String, Span)> {
        if !self.check(&TokenKind::Module) {
            return None;
        }
        self.advance();
        let result = (|| {
            let (name, span) = self.expect_ident()?;
            self.expect(&TokenKind::Semi)?;
            Ok((name, span))
        })();
        match result {
            Ok(decl) => Some(decl),
            Err(e) => {
                self.errors.push(e);
                self.synchronize_item();
                None
            }
        }
    }

    // =========================================================================
    // Items
    // =========================================================================

    fn parse_item(&mut self) -> Result<Item, ParseError> {
        match self.current_kind() {
            TokenKind::Import => self.parse_import(),
            TokenKind::Export => self.parse_export(),
            TokenKind::Enum => self.parse_enum(),
            TokenKind::Fn => self.parse_fn(),
            TokenKind::Module => Err(ParseError::new(
                "`module` is only allowed before the first item",
                self.current().span,
            )),
            _ => Err(ParseError::expected(
                "a declaration (`fn`, `enum`, `import`, `export`)",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    fn parse_import(&mut self) -> Result<Item, ParseError> {
        let start = self.current().span;
        self.advance(); // `import`
        let (name, name_span) = self.expect_ident()?;

        // `as` is contextual, not a reserved word.
        let alias = if matches!(self.current_kind(), TokenKind::Ident(kw) if kw == "as") {
            self.advance();
            Some(self.expect_ident()?)
        } else {
            None
        };

        self.expect(&TokenKind::Semi)?;
        let span = start.to(self.prev_span());
        Ok(Item {
            kind: ItemKind::Import(ImportDecl {
                name,
                name_span,
                alias,
            }),
            span,
        })
    }

    fn parse_export(&mut self) -> Result<Item, ParseError> {
        let start = self.current().span;
        self.advance(); // `export`
        self.expect(&TokenKind::LBrace)?;

        let mut names = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            names.push(self.expect_ident()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        self.expect(&TokenKind::Semi)?;

        let span = start.to(self.prev_span());
        Ok(Item {
            kind: ItemKind::Export(ExportDecl { names }),
            span,
        })
    }

    fn parse_enum(&mut self) -> Result<Item, ParseError> {
        let start = self.current().span;
        self.advance(); // `enum`
        let (name, name_span) = self.expect_ident()?;
        self.expect(&TokenKind::LBrace)?;

        let mut variants = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let (vname, vspan) = self.expect_ident()?;
            let mut payload = Vec::new();
            if self.match_token(&TokenKind::LParen) {
                while !self.check(&TokenKind::RParen) && !self.at_end() {
                    payload.push(self.parse_type()?);
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen)?;
            }
            variants.push(Variant {
                name: vname,
                payload,
                span: vspan.to(self.prev_span()),
            });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;

        let span = start.to(self.prev_span());
        Ok(Item {
            kind: ItemKind::Enum(EnumDecl {
                name,
                name_span,
                variants,
            }),
            span,
        })
    }

    fn parse_fn(&mut self) -> Result<Item, ParseError> {
        let start = self.current().span;
        self.advance(); // `fn`
        let (name, name_span) = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;

        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            let (pname, pspan) = self.expect_ident()?;
            let ty = if self.match_token(&TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(Param {
                name: pname,
                ty,
                span: pspan.to(self.prev_span()),
            });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;

        let ret = if self.match_token(&TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block()?;
        let span = start.to(self.prev_span());
        Ok(Item {
            kind: ItemKind::Fn(FnDecl {
                name,
                name_span,
                params,
                ret,
                body,
            }),
            span,
        })
    }

    fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        let start = self.current().span;
        if self.match_token(&TokenKind::LBracket) {
            let inner = self.parse_type()?;
            self.expect(&TokenKind::RBracket)?;
            return Ok(TypeRef {
                kind: TypeRefKind::List(Box::new(inner)),
                span: start.to(self.prev_span()),
            });
        }

        let (first, _) = self.expect_ident_as("a type")?;
        if self.match_token(&TokenKind::Dot) {
            let (name, _) = self.expect_ident()?;
            Ok(TypeRef {
                kind: TypeRefKind::Name {
                    qualifier: Some(first),
                    name,
                },
                span: start.to(self.prev_span()),
            })
        } else {
            Ok(TypeRef {
                kind: TypeRefKind::Name {
                    qualifier: None,
                    name: first,
                },
                span: start.to(self.prev_span()),
            })
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.current().span;
        self.expect(&TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        self.with_brace_expr(true, |p| {
            while !p.check(&TokenKind::RBrace) && !p.at_end() && p.errors.len() < MAX_ERRORS {
                match p.parse_stmt() {
                    Ok(stmt) => stmts.push(stmt),
                    Err(e) => {
                        let err_span = e.span;
                        p.errors.push(e);
                        p.synchronize_stmt();
                        stmts.push(Stmt {
                            kind: StmtKind::Err,
                            span: err_span,
                        });
                        if p.at_item_keyword() {
                            break;
                        }
                    }
                }
            }
        });

        // Recover even when the closing brace went missing, so that one bad
        // statement cannot take the whole enclosing item with it.
        if self.check(&TokenKind::RBrace) {
            self.advance();
        } else {
            if self.errors.len() < MAX_ERRORS {
                self.errors.push(ParseError::expected(
                    "`}` to close the block",
                    self.current_kind(),
                    self.current().span,
                ));
            }
            if stmts.iter().all(|s| !matches!(s.kind, StmtKind::Err)) {
                stmts.push(Stmt {
                    kind: StmtKind::Err,
                    span: self.current().span,
                });
            }
        }

        Ok(Block {
            stmts,
            span: start.to(self.prev_span()),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.current_kind() {
            TokenKind::Let => self.parse_let(),
            TokenKind::Set => self.parse_set(),
            TokenKind::Return => self.parse_return(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Break => {
                let span = self.current().span;
                self.advance();
                self.expect(&TokenKind::Semi)?;
                Ok(Stmt {
                    kind: StmtKind::Break,
                    span,
                })
            }
            TokenKind::Continue => {
                let span = self.current().span;
                self.advance();
                self.expect(&TokenKind::Semi)?;
                Ok(Stmt {
                    kind: StmtKind::Continue,
                    span,
                })
            }
            _ => {
                let expr = self.parse_expr()?;
                let block_formed = matches!(expr.kind, ExprKind::If { .. } | ExprKind::Match { .. });
                if block_formed {
                    self.match_token(&TokenKind::Semi);
                } else {
                    self.expect(&TokenKind::Semi)?;
                }
                let span = expr.span.to(self.prev_span());
                Ok(Stmt {
                    kind: StmtKind::Expr(expr),
                    span,
                })
            }
        }
    }

    fn parse_let(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance(); // `let`
        let (name, name_span) = self.expect_ident()?;
        let ty = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(&TokenKind::Eq)?;
        let init = self.parse_expr()?;
        self.expect(&TokenKind::Semi)?;
        Ok(Stmt {
            kind: StmtKind::Let {
                name,
                name_span,
                ty,
                init,
            },
            span: start.to(self.prev_span()),
        })
    }

    fn parse_set(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance(); // `set`
        let (name, name_span) = self.expect_ident()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expr()?;
        self.expect(&TokenKind::Semi)?;
        Ok(Stmt {
            kind: StmtKind::Set {
                name,
                name_span,
                value,
            },
            span: start.to(self.prev_span()),
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance(); // `return`
        let expr = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semi)?;
        Ok(Stmt {
            kind: StmtKind::Return(expr),
            span: start.to(self.prev_span()),
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance(); // `while`
        let cond = self.with_brace_expr(false, |p| p.parse_expr())?;
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::While { cond, body },
            span: start.to(self.prev_span()),
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance(); // `for`
        let (binding, binding_span) = self.expect_ident()?;
        self.expect(&TokenKind::In)?;

        let range_start = self.with_brace_expr(false, |p| p.parse_expr())?;
        let inclusive = match self.current_kind() {
            TokenKind::DotDot => false,
            TokenKind::DotDotEq => true,
            _ => {
                return Err(ParseError::expected(
                    "`..` or `..=`",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };
        self.advance();
        let range_end = self.with_brace_expr(false, |p| p.parse_expr())?;

        let step = if self.match_token(&TokenKind::By) {
            Some(self.with_brace_expr(false, |p| p.parse_expr())?)
        } else {
            None
        };

        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::For {
                binding,
                binding_span,
                start: range_start,
                end: range_end,
                inclusive,
                step,
                body,
            },
            span: start.to(self.prev_span()),
        })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = match self.current_kind() {
            TokenKind::Minus | TokenKind::Bang => {
                let op = if matches!(self.current_kind(), TokenKind::Minus) {
                    UnaryOp::Neg
                } else {
                    UnaryOp::Not
                };
                let op_span = self.current().span;
                self.advance();
                let operand = self.parse_expr_bp(PREFIX_BP)?;
                let span = op_span.to(operand.span);
                Expr {
                    kind: ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                }
            }
            _ => self.parse_primary()?,
        };

        loop {
            if min_bp <= POSTFIX_BP {
                match self.current_kind() {
                    TokenKind::Dot => {
                        self.advance();
                        let (field, field_span) = self.expect_ident()?;
                        let span = lhs.span.to(field_span);
                        lhs = Expr {
                            kind: ExprKind::Field {
                                object: Box::new(lhs),
                                field,
                                field_span,
                            },
                            span,
                        };
                        continue;
                    }
                    TokenKind::LBracket => {
                        self.advance();
                        let index = self.with_brace_expr(true, |p| p.parse_expr())?;
                        self.expect(&TokenKind::RBracket)?;
                        let span = lhs.span.to(self.prev_span());
                        lhs = Expr {
                            kind: ExprKind::Index {
                                object: Box::new(lhs),
                                index: Box::new(index),
                            },
                            span,
                        };
                        continue;
                    }
                    TokenKind::LParen => {
                        self.advance();
                        let args = self.parse_call_args()?;
                        let span = lhs.span.to(self.prev_span());
                        lhs = Expr {
                            kind: ExprKind::Call {
                                callee: Box::new(lhs),
                                args,
                            },
                            span,
                        };
                        continue;
                    }
                    _ => {}
                }
            }

            let Some((lbp, rbp, op)) = self.infix_bp() else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr_bp(rbp)?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr {
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                span,
            };
        }

        Ok(lhs)
    }

    /// Left/right binding powers for infix operators; all left-associative.
    fn infix_bp(&self) -> Option<(u8, u8, BinOp)> {
        Some(match self.current_kind() {
            TokenKind::PipePipe => (1, 2, BinOp::Or),
            TokenKind::AmpAmp => (3, 4, BinOp::And),
            TokenKind::EqEq => (5, 6, BinOp::Eq),
            TokenKind::BangEq => (5, 6, BinOp::Ne),
            TokenKind::Lt => (7, 8, BinOp::Lt),
            TokenKind::LtEq => (7, 8, BinOp::Le),
            TokenKind::Gt => (7, 8, BinOp::Gt),
            TokenKind::GtEq => (7, 8, BinOp::Ge),
            TokenKind::Plus => (9, 10, BinOp::Add),
            TokenKind::Minus => (9, 10, BinOp::Sub),
            TokenKind::Star => (11, 12, BinOp::Mul),
            TokenKind::Slash => (11, 12, BinOp::Div),
            _ => return None,
        })
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        self.with_brace_expr(true, |p| {
            while !p.check(&TokenKind::RParen) && !p.at_end() {
                args.push(p.parse_expr()?);
                if !p.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            Ok(())
        })?;
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.current().span;
        match self.current_kind().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Int(n),
                    span,
                })
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Str(s),
                    span,
                })
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(b),
                    span,
                })
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Ident(name),
                    span,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.with_brace_expr(true, |p| p.parse_expr())?;
                self.expect(&TokenKind::RParen)?;
                Ok(Expr {
                    kind: ExprKind::Paren(Box::new(inner)),
                    span: span.to(self.prev_span()),
                })
            }
            TokenKind::LBracket => self.parse_list_literal(),
            TokenKind::LBrace if self.allow_brace_expr => self.parse_record_literal(),
            TokenKind::If => self.parse_if_expr(),
            TokenKind::Match => self.parse_match_expr(),
            _ => Err(ParseError::expected(
                "an expression",
                self.current_kind(),
                span,
            )),
        }
    }

    fn parse_list_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.advance(); // `[`
        let mut elements = Vec::new();
        self.with_brace_expr(true, |p| {
            while !p.check(&TokenKind::RBracket) && !p.at_end() {
                elements.push(p.parse_expr()?);
                if !p.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            Ok(())
        })?;
        self.expect(&TokenKind::RBracket)?;
        Ok(Expr {
            kind: ExprKind::List(elements),
            span: start.to(self.prev_span()),
        })
    }

    fn parse_record_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.advance(); // `{`
        let mut fields = Vec::new();
        self.with_brace_expr(true, |p| {
            while !p.check(&TokenKind::RBrace) && !p.at_end() {
                let (name, name_span) = p.expect_ident_as("a field name")?;
                p.expect(&TokenKind::Colon)?;
                let value = p.parse_expr()?;
                fields.push(FieldInit {
                    name,
                    name_span,
                    value,
                });
                if !p.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            Ok(())
        })?;
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr {
            kind: ExprKind::Record(fields),
            span: start.to(self.prev_span()),
        })
    }

    fn parse_if_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.advance(); // `if`
        let cond = self.with_brace_expr(false, |p| p.parse_expr())?;
        let then_block = self.parse_block()?;
        self.expect(&TokenKind::Else)?;

        // `else if` nests as `else { if ... }`.
        let else_block = if self.check(&TokenKind::If) {
            let nested = self.parse_if_expr()?;
            let span = nested.span;
            Block {
                stmts: vec![Stmt {
                    kind: StmtKind::Expr(nested),
                    span,
                }],
                span,
            }
        } else {
            self.parse_block()?
        };

        Ok(Expr {
            kind: ExprKind::If {
                cond: Box::new(cond),
                then_block,
                else_block,
            },
            span: start.to(self.prev_span()),
        })
    }

    fn parse_match_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.advance(); // `match`
        let subject = self.with_brace_expr(false, |p| p.parse_expr())?;
        self.expect(&TokenKind::LBrace)?;

        let mut arms = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let arm_start = self.current().span;
            let pattern = self.parse_pattern()?;
            self.expect(&TokenKind::FatArrow)?;
            let body = self.parse_block()?;
            // A trailing `;` after an arm is optional.
            self.match_token(&TokenKind::Semi);
            arms.push(MatchArm {
                pattern,
                body,
                span: arm_start.to(self.prev_span()),
            });
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(Expr {
            kind: ExprKind::Match {
                subject: Box::new(subject),
                arms,
            },
            span: start.to(self.prev_span()),
        })
    }

    fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        let span = self.current().span;
        match self.current_kind().clone() {
            TokenKind::Underscore => {
                self.advance();
                Ok(Pattern {
                    kind: PatternKind::Wildcard,
                    span,
                })
            }
            TokenKind::Int(n) => {
                self.advance();
                Ok(Pattern {
                    kind: PatternKind::Int(n),
                    span,
                })
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Pattern {
                    kind: PatternKind::Str(s),
                    span,
                })
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(Pattern {
                    kind: PatternKind::Bool(b),
                    span,
                })
            }
            TokenKind::Ident(first) => {
                self.advance();

                // Qualified variant: alias.Variant
                let (qualifier, name) = if self.match_token(&TokenKind::Dot) {
                    let (name, _) = self.expect_ident()?;
                    (Some(first), name)
                } else {
                    (None, first)
                };

                let args = if self.match_token(&TokenKind::LParen) {
                    let mut args = Vec::new();
                    while !self.check(&TokenKind::RParen) && !self.at_end() {
                        args.push(self.parse_pattern()?);
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(&TokenKind::RParen)?;
                    Some(args)
                } else {
                    None
                };

                Ok(Pattern {
                    kind: PatternKind::Name {
                        qualifier,
                        name,
                        args,
                    },
                    span: span.to(self.prev_span()),
                })
            }
            _ => Err(ParseError::expected(
                "a pattern",
                self.current_kind(),
                span,
            )),
        }
    }

    // =========================================================================
    // Error Recovery
    // =========================================================================

    /// Skip to a statement boundary after an error: past the next `;` at the
    /// current brace depth, or up to a `}` closing the current block, or up
    /// to a stray top-level keyword.
    fn synchronize_stmt(&mut self) {
        let mut depth = 0usize;
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.advance();
                }
                TokenKind::Fn
                | TokenKind::Enum
                | TokenKind::Import
                | TokenKind::Module
                | TokenKind::Export
                    if depth == 0 =>
                {
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip to the next top-level declaration after an item-level error.
    fn synchronize_item(&mut self) {
        if !self.at_end() {
            self.advance();
        }
        let mut depth = 0usize;
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Fn
                | TokenKind::Enum
                | TokenKind::Import
                | TokenKind::Module
                | TokenKind::Export
                    if depth == 0 =>
                {
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn at_item_keyword(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Fn
                | TokenKind::Enum
                | TokenKind::Import
                | TokenKind::Module
                | TokenKind::Export
        )
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with Eof"))
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn prev_span(&self) -> Span {
        if self.pos == 0 {
            self.current().span
        } else {
            self.tokens[self.pos - 1].span
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            let span = self.current().span;
            self.advance();
            Ok(span)
        } else {
            Err(ParseError::expected(
                kind.display_name(),
                self.current_kind(),
                self.current().span,
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        self.expect_ident_as("a name")
    }

    fn expect_ident_as(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                let span = self.current().span;
                self.advance();
                Ok((name, span))
            }
            _ => Err(ParseError::expected(
                what,
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    fn with_brace_expr<T>(&mut self, allow: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.allow_brace_expr;
        self.allow_brace_expr = allow;
        let result = f(self);
        self.allow_brace_expr = saved;
        result
    }
}

/// Result of parsing: the program plus any errors found.
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns true if parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A parser error with location and message.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub span: Span,
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        Self {
            span,
            message: format!("expected {}, found {}", expected, found.display_name()),
        }
    }
}
