//! Lexer for tokenizing expression strings
//!
//! This module implements a lexer that converts expression strings into tokens.
//! String literals without escapes borrow from the input; numbers are parsed
//! straight into decimals.

use std::borrow::Cow;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::core::span::Span;
use crate::core::token::{Token, TokenKind};
use crate::error::{LexError, LexErrorKind};

/// Lexer for tokenizing expression strings
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    allow_single_equal_sign: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from an input string
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            allow_single_equal_sign: false,
        }
    }

    /// Treat a bare `=` as `==`
    #[must_use]
    pub const fn with_single_equal_sign(mut self, allow: bool) -> Self {
        self.allow_single_equal_sign = allow;
        self
    }

    /// Tokenize the entire input string
    ///
    /// The returned vector always ends with an [`TokenKind::Eof`] token.
    pub fn tokenize(&mut self) -> Result<Vec<Token<'a>>, LexError> {
        // Estimate: typical expressions have ~1 token per 4 chars
        let estimated_tokens = (self.input.len() / 4).max(8);
        let mut tokens = Vec::with_capacity(estimated_tokens);

        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token<'a>, LexError> {
        self.skip_whitespace();

        let start = self.position;

        let Some(ch) = self.current_char() else {
            return Ok(Token::new(TokenKind::Eof, Span::at(self.position)));
        };

        let kind = match ch {
            // Single character delimiters
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            '[' => self.single(TokenKind::LeftBracket),
            ']' => self.single(TokenKind::RightBracket),
            '{' => self.single(TokenKind::LeftBrace),
            '}' => self.single(TokenKind::RightBrace),
            ',' => self.single(TokenKind::Comma),
            '.' => self.single(TokenKind::Dot),
            ':' => self.single(TokenKind::Colon),
            '?' => self.single(TokenKind::Question),

            // Arithmetic operators
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '%' => self.single(TokenKind::Percent),

            // Comparison operators, longest match first
            '=' if self.lookahead("===") => self.multi(3, TokenKind::StrictEqual),
            '=' if self.lookahead("==") => self.multi(2, TokenKind::Equal),
            '=' if self.allow_single_equal_sign => self.single(TokenKind::Equal),
            '=' => return Err(LexError::new(start, LexErrorKind::SingleEqualSign)),
            '!' if self.lookahead("!==") => self.multi(3, TokenKind::StrictNotEqual),
            '!' if self.lookahead("!=") => self.multi(2, TokenKind::NotEqual),
            '!' => self.single(TokenKind::Not),
            '<' if self.lookahead("<=") => self.multi(2, TokenKind::LessEqual),
            '<' => self.single(TokenKind::LessThan),
            '>' if self.lookahead(">=") => self.multi(2, TokenKind::GreaterEqual),
            '>' => self.single(TokenKind::GreaterThan),

            // Logical operators
            '&' if self.lookahead("&&") => self.multi(2, TokenKind::And),
            '|' if self.lookahead("||") => self.multi(2, TokenKind::Or),

            // String literals
            '"' => self.read_string()?,

            // Numbers
            ch if ch.is_ascii_digit() => self.read_number()?,

            // Identifiers and keywords
            ch if is_identifier_start(ch) => self.read_identifier_or_keyword(),

            _ => {
                return Err(LexError::new(start, LexErrorKind::UnexpectedCharacter(ch)));
            }
        };

        Ok(Token::new(kind, Span::new(start, self.position)))
    }

    /// Get the current character at position
    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Peek at the next character without advancing
    fn peek(&self) -> Option<char> {
        let mut chars = self.input[self.position..].chars();
        chars.next()?;
        chars.next()
    }

    /// Check whether the remaining input starts with `s`
    fn lookahead(&self, s: &str) -> bool {
        self.input[self.position..].starts_with(s)
    }

    /// Advance position by the current character's UTF-8 byte length
    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    /// Consume one character and yield `kind`
    fn single(&mut self, kind: TokenKind<'a>) -> TokenKind<'a> {
        self.advance();
        kind
    }

    /// Consume an ASCII operator of `len` bytes and yield `kind`
    fn multi(&mut self, len: usize, kind: TokenKind<'a>) -> TokenKind<'a> {
        self.position += len;
        kind
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Read a double-quoted string literal
    fn read_string(&mut self) -> Result<TokenKind<'a>, LexError> {
        let start_pos = self.position;
        self.advance(); // Skip opening quote

        let mut has_escapes = false;

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    let end_pos = self.position;
                    self.advance(); // Skip closing quote

                    let raw = &self.input[start_pos + 1..end_pos];
                    if !has_escapes {
                        return Ok(TokenKind::String(Cow::Borrowed(raw)));
                    }
                    return unescape(raw, start_pos + 1).map(|s| TokenKind::String(Cow::Owned(s)));
                }
                '\\' => {
                    has_escapes = true;
                    self.advance();
                    self.advance();
                }
                _ => self.advance(),
            }
        }

        Err(LexError::new(start_pos, LexErrorKind::UnterminatedString))
    }

    /// Read a decimal literal: digits with an optional fractional part
    fn read_number(&mut self) -> Result<TokenKind<'a>, LexError> {
        let start_pos = self.position;

        while matches!(self.current_char(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        // A dot belongs to the number only when a digit follows it
        if self.current_char() == Some('.') && matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
            while matches!(self.current_char(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        // `12abc` is a malformed number, not a number followed by an identifier
        if matches!(self.current_char(), Some(c) if is_identifier_continue(c)) {
            while matches!(self.current_char(), Some(c) if is_identifier_continue(c)) {
                self.advance();
            }
            return Err(LexError::new(
                start_pos,
                LexErrorKind::InvalidNumber(self.input[start_pos..self.position].to_string()),
            ));
        }

        let text = &self.input[start_pos..self.position];
        Decimal::from_str(text)
            .map(TokenKind::Number)
            .map_err(|_| LexError::new(start_pos, LexErrorKind::InvalidNumber(text.to_string())))
    }

    /// Read an identifier or keyword
    fn read_identifier_or_keyword(&mut self) -> TokenKind<'a> {
        let start_pos = self.position;

        while matches!(self.current_char(), Some(c) if is_identifier_continue(c)) {
            self.advance();
        }

        let ident = &self.input[start_pos..self.position];

        match ident {
            "true" => TokenKind::Boolean(true),
            "false" => TokenKind::Boolean(false),
            "null" => TokenKind::Null,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "new" => TokenKind::New,
            "dictionary" => TokenKind::Dictionary,
            _ => TokenKind::Identifier(ident),
        }
    }
}

/// Tokenize `input` with default options
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    Lexer::new(input).tokenize()
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Resolve escape sequences; `offset` is the byte offset of `raw` in the input
fn unescape(raw: &str, offset: usize) -> Result<String, LexError> {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.char_indices();

    while let Some((i, ch)) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        let invalid = |seq: &str| {
            LexError::new(offset + i, LexErrorKind::InvalidEscape(seq.to_string()))
        };

        let Some((_, escaped)) = chars.next() else {
            return Err(invalid(""));
        };

        let resolved = match escaped {
            '"' => '"',
            '\\' => '\\',
            '\'' => '\'',
            '/' => '/',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            'u' => {
                let hex: String = chars.by_ref().take(4).map(|(_, c)| c).collect();
                let code = if hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    u32::from_str_radix(&hex, 16).ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| invalid(&format!("u{hex}")))?
            }
            other => return Err(invalid(&other.to_string())),
        };
        result.push(resolved);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn num(s: &str) -> TokenKind<'static> {
        TokenKind::Number(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            kinds("1 + 2.5*x"),
            vec![
                num("1"),
                TokenKind::Plus,
                num("2.5"),
                TokenKind::Star,
                TokenKind::Identifier("x"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_greedy() {
        assert_eq!(
            kinds("=== !== == != <= >= < > && || !"),
            vec![
                TokenKind::StrictEqual,
                TokenKind::StrictNotEqual,
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::LessThan,
                TokenKind::GreaterThan,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("true and not false or null new dictionary"),
            vec![
                TokenKind::Boolean(true),
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Boolean(false),
                TokenKind::Or,
                TokenKind::Null,
                TokenKind::New,
                TokenKind::Dictionary,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            kinds("_a1 当前页 name_with_underscore"),
            vec![
                TokenKind::Identifier("_a1"),
                TokenKind::Identifier("当前页"),
                TokenKind::Identifier("name_with_underscore"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_zero_copy() {
        let tokens = tokenize(r#""plain""#).unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::String(Cow::Borrowed("plain"))));
        assert_eq!(tokens[0].span, Span::new(0, 7));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#""a\"b\\c\/d\nA""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String(Cow::Owned("a\"b\\c/d\nA".to_string())));
    }

    #[test]
    fn test_number_followed_by_member() {
        assert_eq!(
            kinds("1.ToString"),
            vec![num("1"), TokenKind::Dot, TokenKind::Identifier("ToString"), TokenKind::Eof]
        );
    }

    #[test]
    fn test_single_equal_sign() {
        let err = tokenize("a = 1").unwrap_err();
        assert_eq!(err, LexError::new(2, LexErrorKind::SingleEqualSign));

        let tokens = Lexer::new("a = 1").with_single_equal_sign(true).tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Equal);

        // exact equality is unaffected by the flag
        let tokens = Lexer::new("a === 1").with_single_equal_sign(true).tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::StrictEqual);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            tokenize(r#"  "open"#).unwrap_err(),
            LexError::new(2, LexErrorKind::UnterminatedString)
        );
        assert_eq!(
            tokenize(r#""bad\q""#).unwrap_err(),
            LexError::new(4, LexErrorKind::InvalidEscape("q".into()))
        );
        assert_eq!(
            tokenize("12abc").unwrap_err(),
            LexError::new(0, LexErrorKind::InvalidNumber("12abc".into()))
        );
        assert!(matches!(
            tokenize(&"9".repeat(40)).unwrap_err().reason,
            LexErrorKind::InvalidNumber(_)
        ));
        assert_eq!(
            tokenize("a & b").unwrap_err(),
            LexError::new(2, LexErrorKind::UnexpectedCharacter('&'))
        );
        assert_eq!(
            tokenize("'x'").unwrap_err(),
            LexError::new(0, LexErrorKind::UnexpectedCharacter('\''))
        );
    }

    #[test]
    fn test_unicode_whitespace() {
        assert_eq!(kinds("1\u{00A0}+\u{2003}2"), vec![num("1"), TokenKind::Plus, num("2"), TokenKind::Eof]);
    }
}
