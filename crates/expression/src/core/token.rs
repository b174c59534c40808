//! Token types for the expression lexer
//!
//! This module defines all tokens that can appear in an expression.

use std::borrow::Cow;
use std::fmt;

use rust_decimal::Decimal;

use super::span::Span;

/// A token with its position in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    /// The token kind
    pub kind: TokenKind<'a>,
    /// Source span for this token
    pub span: Span,
}

impl<'a> Token<'a> {
    /// Create a new token with span
    pub fn new(kind: TokenKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    // Literals
    /// Decimal literal (e.g., 42, 3.14)
    Number(Decimal),
    /// String literal; borrowed unless it contained escapes
    String(Cow<'a, str>),
    /// Boolean literal (true, false)
    Boolean(bool),
    /// Null literal
    Null,

    /// Identifier (variable, member or method name)
    Identifier(&'a str),

    // Operators - Arithmetic
    /// Addition operator (+)
    Plus,
    /// Subtraction operator (-)
    Minus,
    /// Multiplication operator (*)
    Star,
    /// Division operator (/)
    Slash,
    /// Modulo operator (%)
    Percent,

    // Operators - Comparison
    /// Equal operator (==, or = in legacy mode)
    Equal,
    /// Not equal operator (!=)
    NotEqual,
    /// Exact equal operator (===)
    StrictEqual,
    /// Exact not equal operator (!==)
    StrictNotEqual,
    /// Less than operator (<)
    LessThan,
    /// Greater than operator (>)
    GreaterThan,
    /// Less than or equal operator (<=)
    LessEqual,
    /// Greater than or equal operator (>=)
    GreaterEqual,

    // Operators - Logical
    /// Logical AND operator (&&, and)
    And,
    /// Logical OR operator (||, or)
    Or,
    /// Logical NOT operator (!, not)
    Not,

    // Delimiters
    /// Left parenthesis
    LeftParen,
    /// Right parenthesis
    RightParen,
    /// Left bracket
    LeftBracket,
    /// Right bracket
    RightBracket,
    /// Left brace
    LeftBrace,
    /// Right brace
    RightBrace,

    // Punctuation
    /// Dot operator (.)
    Dot,
    /// Comma separator (,)
    Comma,
    /// Colon (:)
    Colon,
    /// Question mark (?)
    Question,

    // Keywords
    /// new keyword
    New,
    /// dictionary keyword
    Dictionary,

    /// End of input
    Eof,
}

impl TokenKind<'_> {
    /// Check if this token is a literal value
    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Number(_) | TokenKind::String(_) | TokenKind::Boolean(_) | TokenKind::Null
        )
    }

    /// Check if this token is a binary operator
    pub const fn is_binary_operator(&self) -> bool {
        self.precedence().is_some()
    }

    /// Binding power of a binary operator, higher binds tighter
    pub const fn precedence(&self) -> Option<u8> {
        match self {
            TokenKind::Or => Some(1),
            TokenKind::And => Some(2),
            TokenKind::Equal
            | TokenKind::NotEqual
            | TokenKind::StrictEqual
            | TokenKind::StrictNotEqual => Some(3),
            TokenKind::LessThan
            | TokenKind::GreaterThan
            | TokenKind::LessEqual
            | TokenKind::GreaterEqual => Some(4),
            TokenKind::Plus | TokenKind::Minus => Some(5),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(6),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::String(s) => write!(f, "\"{s}\""),
            TokenKind::Boolean(b) => write!(f, "{b}"),
            TokenKind::Null => write!(f, "null"),
            TokenKind::Identifier(name) => write!(f, "{name}"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Percent => write!(f, "%"),
            TokenKind::Equal => write!(f, "=="),
            TokenKind::NotEqual => write!(f, "!="),
            TokenKind::StrictEqual => write!(f, "==="),
            TokenKind::StrictNotEqual => write!(f, "!=="),
            TokenKind::LessThan => write!(f, "<"),
            TokenKind::GreaterThan => write!(f, ">"),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::GreaterEqual => write!(f, ">="),
            TokenKind::And => write!(f, "&&"),
            TokenKind::Or => write!(f, "||"),
            TokenKind::Not => write!(f, "!"),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),
            TokenKind::LeftBrace => write!(f, "{{"),
            TokenKind::RightBrace => write!(f, "}}"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Question => write!(f, "?"),
            TokenKind::New => write!(f, "new"),
            TokenKind::Dictionary => write!(f, "dictionary"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
