// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use logos::Logos;
use rill_ast::token::{Token, TokenKind};
use rill_ast::{SourceId, Span};

/// Raw token type for logos - literal values are parsed in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"#[^\n]*")]
enum RawToken {
    // === Keywords ===
    #[token("module")]
    Module,
    #[token("import")]
    Import,
    #[token("enum")]
    Enum,
    #[token("fn")]
    Fn,
    #[token("let")]
    Let,
    #[token("set")]
    Set,
    #[token("return")]
    Return,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("by")]
    By,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("match")]
    Match,
    #[token("export")]
    Export,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Operators (longer forms first so `..=` beats `..`, `==` beats `=`) ===
    #[token("..=")]
    DotDotEq,
    #[token("..")]
    DotDot,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    // === Literals ===
    // Decimal integers; leading zeros are fine.
    #[regex(r"[0-9]+")]
    Int,

    // A terminated string. The unterminated form below only wins when no
    // closing quote exists before the end of the line.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    // A string that hits end-of-line (or end-of-input) without closing.
    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedStr,

    // === Identifier (must come after keywords) ===
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
}

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The lexer for Rill source code.
pub struct Lexer<'a> {
    source: &'a str,
    source_id: SourceId,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source buffer.
    pub fn new(source: &'a str, source_id: SourceId) -> Self {
        Self {
            source,
            source_id,
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source, collecting multiple errors.
    ///
    /// Total: any input terminates with a finite token list ending in Eof.
    pub fn tokenize(mut self) -> LexResult {
        let mut tokens = Vec::new();
        let mut raw = RawToken::lexer(self.source);

        while let Some(result) = raw.next() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }

            let range = raw.span();
            let span = Span::new(self.source_id, range.start, range.end);
            let slice = raw.slice();

            let kind = match result {
                Ok(token) => match self.convert_token(token, slice, span) {
                    Ok(kind) => kind,
                    Err(e) => {
                        self.errors.push(e);
                        continue;
                    }
                },
                Err(()) => {
                    let ch = self.source[range.start..].chars().next().unwrap_or('?');
                    self.errors.push(LexError::unexpected_char(ch, span));
                    continue;
                }
            };

            tokens.push(Token { kind, span });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.source_id, self.source.len(), self.source.len()),
        });

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    /// Convert a raw logos token to our TokenKind, parsing literal values.
    fn convert_token(
        &self,
        raw: RawToken,
        slice: &str,
        span: Span,
    ) -> Result<TokenKind, LexError> {
        Ok(match raw {
            RawToken::Module => TokenKind::Module,
            RawToken::Import => TokenKind::Import,
            RawToken::Enum => TokenKind::Enum,
            RawToken::Fn => TokenKind::Fn,
            RawToken::Let => TokenKind::Let,
            RawToken::Set => TokenKind::Set,
            RawToken::Return => TokenKind::Return,
            RawToken::While => TokenKind::While,
            RawToken::For => TokenKind::For,
            RawToken::In => TokenKind::In,
            RawToken::By => TokenKind::By,
            RawToken::Break => TokenKind::Break,
            RawToken::Continue => TokenKind::Continue,
            RawToken::If => TokenKind::If,
            RawToken::Else => TokenKind::Else,
            RawToken::Match => TokenKind::Match,
            RawToken::Export => TokenKind::Export,
            RawToken::True => TokenKind::Bool(true),
            RawToken::False => TokenKind::Bool(false),

            RawToken::DotDotEq => TokenKind::DotDotEq,
            RawToken::DotDot => TokenKind::DotDot,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::BangEq => TokenKind::BangEq,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::FatArrow => TokenKind::FatArrow,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Bang => TokenKind::Bang,

            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Dot => TokenKind::Dot,

            RawToken::Int => {
                let value = slice
                    .parse::<i64>()
                    .map_err(|_| LexError::int_too_large(span))?;
                TokenKind::Int(value)
            }
            RawToken::Str => {
                let inner = &slice[1..slice.len() - 1];
                TokenKind::Str(parse_string(inner, span)?)
            }
            RawToken::UnterminatedStr => {
                // Report at the opening quote, then keep lexing.
                let quote = Span::new(span.source, span.start as usize, span.start as usize + 1);
                return Err(LexError::unterminated_string(quote));
            }
            RawToken::Ident => {
                if slice == "_" {
                    TokenKind::Underscore
                } else {
                    TokenKind::Ident(slice.to_string())
                }
            }
        })
    }
}

/// Parse a string literal body, handling the `\\ \" \n \t` escapes.
fn parse_string(s: &str, span: Span) -> Result<String, LexError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            other => return Err(LexError::invalid_escape(other, span)),
        }
    }

    Ok(result)
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A lexer error with its location.
#[derive(Debug, Clone)]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LexError {}

impl LexError {
    fn unexpected_char(ch: char, span: Span) -> Self {
        Self {
            span,
            message: format!("unexpected character '{}'", ch),
        }
    }

    fn unterminated_string(span: Span) -> Self {
        Self {
            span,
            message: "unterminated string literal".to_string(),
        }
    }

    fn invalid_escape(ch: Option<char>, span: Span) -> Self {
        let message = match ch {
            Some(c) => format!("invalid escape sequence '\\{}'", c),
            None => "invalid escape sequence at end of string".to_string(),
        };
        Self { span, message }
    }

    fn int_too_large(span: Span) -> Self {
        Self {
            span,
            message: "integer literal too large".to_string(),
        }
    }
}
