//! Parser for converting tokens into an AST
//!
//! This module implements a recursive descent parser. Binary operators are
//! handled by precedence climbing over [`TokenKind::precedence`]; the ternary,
//! unary, postfix and primary levels each have their own function.
//!
//! Two limits keep the tree walkable. Real nesting (groups, unary operators,
//! collection elements, arguments, ternary branches) counts against
//! `max_depth`. The links of one flat binary or postfix chain count against
//! the separate, much larger `max_chain_length`.

use std::sync::Arc;

use formula_value::Value;
use serde::Deserialize;

use crate::core::ast::{BinaryOp, Expr, UnaryOp};
use crate::core::token::{Token, TokenKind};
use crate::error::{ParseError, SyntaxResult};
use crate::lexer::Lexer;

/// Default limit for [`ParseOptions::max_nesting_depth`]
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

/// Default limit for [`ParseOptions::max_chain_length`]
pub const DEFAULT_MAX_CHAIN_LENGTH: usize = 4096;

/// Options shared by the lexer and the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Accept a bare `=` as `==`
    pub allow_single_equal_sign: bool,
    /// Maximum nesting depth of the parsed expression
    pub max_nesting_depth: usize,
    /// Maximum number of links in one operator or postfix chain
    pub max_chain_length: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_single_equal_sign: false,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
        }
    }
}

/// Tokenize and parse `source` in one step
pub fn parse(source: &str, options: ParseOptions) -> SyntaxResult<Expr> {
    let tokens = Lexer::new(source)
        .with_single_equal_sign(options.allow_single_equal_sign)
        .tokenize()?;
    let expr = Parser::new(tokens)
        .with_max_depth(options.max_nesting_depth)
        .with_max_chain_length(options.max_chain_length)
        .parse()?;
    Ok(expr)
}

/// Parser for converting tokens into an AST
pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    position: usize,
    depth: usize,
    max_depth: usize,
    max_chain_length: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser from a list of tokens
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
        }
    }

    /// Set the nesting limit
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the chain length limit
    #[must_use]
    pub const fn with_max_chain_length(mut self, max_chain_length: usize) -> Self {
        self.max_chain_length = max_chain_length;
        self
    }

    /// Parse the tokens into an expression AST
    ///
    /// The whole input must form one expression; anything left over is an
    /// error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        if !self.at_end() {
            return Err(self.unexpected("end of input"));
        }
        Ok(expr)
    }

    /// Parse a full expression
    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let expr = self.parse_ternary()?;
        self.leave();
        Ok(expr)
    }

    /// Parse ternary expression (right-associative)
    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_binary_expression(1)?;

        if !self.match_token(&TokenKind::Question) {
            return Ok(condition);
        }

        let then_branch = self.parse_expression()?;
        self.expect_token(&TokenKind::Colon, "':' in conditional expression")?;
        let else_branch = self.parse_expression()?;

        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// Parse binary expression with precedence climbing
    fn parse_binary_expression(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary_expression()?;
        let mut chain = 0;

        while let Some(precedence) = self.current_kind().precedence() {
            if precedence < min_precedence {
                break;
            }

            let op = binary_op(self.current_kind());
            self.extend_chain(&mut chain)?;
            self.advance();

            // All binary operators are left-associative
            let right = self.parse_binary_expression(precedence + 1)?;

            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parse unary expression
    fn parse_unary_expression(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.parse_postfix_expression(),
        };

        self.advance();
        self.enter()?;
        let operand = self.parse_unary_expression()?;
        self.leave();

        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Parse postfix chain (member access, index access, calls)
    fn parse_postfix_expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary_expression()?;
        let mut chain = 0;

        loop {
            if matches!(
                self.current_kind(),
                TokenKind::Dot | TokenKind::LeftBracket | TokenKind::LeftParen
            ) {
                self.extend_chain(&mut chain)?;
            }

            match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let TokenKind::Identifier(name) = *self.current_kind() else {
                        return Err(self.unexpected("member name after '.'"));
                    };
                    self.advance();

                    expr = Expr::MemberAccess {
                        target: Box::new(expr),
                        name: Arc::from(name),
                    };
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect_token(&TokenKind::RightBracket, "']'")?;

                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::LeftParen => {
                    let args = self.parse_arguments()?;

                    expr = Expr::Call {
                        target: Box::new(expr),
                        args,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Parse primary expression (literals, variables, groups, collection literals)
    fn parse_primary_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = match self.current_kind() {
            // Literals
            TokenKind::Number(n) => Expr::Constant(Value::Number(*n)),
            TokenKind::String(s) => Expr::Constant(Value::Text(s.to_string())),
            TokenKind::Boolean(b) => Expr::Constant(Value::Boolean(*b)),
            TokenKind::Null => Expr::Constant(Value::Null),

            // Variables
            TokenKind::Identifier(name) => Expr::VariableRef(Arc::from(*name)),

            // Parenthesized expression
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_token(&TokenKind::RightParen, "')'")?;
                return Ok(expr);
            }

            TokenKind::New => {
                self.advance();
                return self.parse_new_literal();
            }

            _ => return Err(self.unexpected("expression")),
        };

        self.advance();
        Ok(expr)
    }

    /// Parse the part of a collection literal after `new`
    fn parse_new_literal(&mut self) -> Result<Expr, ParseError> {
        match self.current_kind() {
            // new[]{e1, e2, ...}
            TokenKind::LeftBracket => {
                self.advance();
                self.expect_token(&TokenKind::RightBracket, "']' after 'new['")?;
                self.expect_token(&TokenKind::LeftBrace, "'{' to start array elements")?;

                let mut elements = Vec::new();
                if self.current_kind() != &TokenKind::RightBrace {
                    loop {
                        elements.push(self.parse_expression()?);
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                }

                self.expect_token(&TokenKind::RightBrace, "',' or '}'")?;
                Ok(Expr::ArrayLiteral(elements))
            }

            // new dictionary{{k1, v1}, {k2, v2}, ...}
            TokenKind::Dictionary => {
                self.advance();
                self.expect_token(&TokenKind::LeftBrace, "'{' to start dictionary entries")?;

                let mut pairs = Vec::new();
                if self.current_kind() != &TokenKind::RightBrace {
                    loop {
                        self.expect_token(&TokenKind::LeftBrace, "'{' to start a dictionary entry")?;
                        let key = self.parse_expression()?;
                        self.expect_token(&TokenKind::Comma, "',' between key and value")?;
                        let value = self.parse_expression()?;
                        self.expect_token(&TokenKind::RightBrace, "'}' to close a dictionary entry")?;
                        pairs.push((key, value));

                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                }

                self.expect_token(&TokenKind::RightBrace, "',' or '}'")?;
                Ok(Expr::DictionaryLiteral(pairs))
            }

            _ => Err(self.unexpected("'[' or 'dictionary' after 'new'")),
        }
    }

    /// Parse a parenthesized argument list
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect_token(&TokenKind::LeftParen, "'('")?;
        let mut args = Vec::new();

        if self.current_kind() != &TokenKind::RightParen {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect_token(&TokenKind::RightParen, "',' or ')'")?;
        Ok(args)
    }

    // ==================== Token helpers ====================

    /// Get the current token
    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.position)
    }

    /// Get the current token kind
    fn current_kind(&self) -> &TokenKind<'a> {
        self.current().map_or(&TokenKind::Eof, |t| &t.kind)
    }

    /// Byte offset of the current token
    fn current_position(&self) -> usize {
        self.current()
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.span.start())
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Advance to the next token
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Check if current token matches and advance if it does
    fn match_token(&mut self, expected: &TokenKind<'_>) -> bool {
        if self.current_kind() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect a specific token and advance, or return an error
    fn expect_token(&mut self, expected: &TokenKind<'_>, description: &str) -> Result<(), ParseError> {
        if self.match_token(expected) {
            Ok(())
        } else {
            Err(self.unexpected(description))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let found = match self.current_kind() {
            TokenKind::Eof => "end of input".to_string(),
            kind => format!("'{kind}'"),
        };
        ParseError::unexpected(self.current_position(), expected, found)
    }

    // ==================== Depth tracking ====================

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::NestingTooDeep {
                position: self.current_position(),
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    const fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn extend_chain(&self, chain: &mut usize) -> Result<(), ParseError> {
        *chain += 1;
        if *chain > self.max_chain_length {
            return Err(ParseError::ChainTooLong {
                position: self.current_position(),
                limit: self.max_chain_length,
            });
        }
        Ok(())
    }
}

fn binary_op(kind: &TokenKind<'_>) -> BinaryOp {
    match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Subtract,
        TokenKind::Star => BinaryOp::Multiply,
        TokenKind::Slash => BinaryOp::Divide,
        TokenKind::Percent => BinaryOp::Modulo,
        TokenKind::Equal => BinaryOp::Equal,
        TokenKind::NotEqual => BinaryOp::NotEqual,
        TokenKind::StrictEqual => BinaryOp::StrictEqual,
        TokenKind::StrictNotEqual => BinaryOp::StrictNotEqual,
        TokenKind::LessThan => BinaryOp::LessThan,
        TokenKind::GreaterThan => BinaryOp::GreaterThan,
        TokenKind::LessEqual => BinaryOp::LessEqual,
        TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
        TokenKind::And => BinaryOp::And,
        // only called for tokens with a precedence
        _ => BinaryOp::Or,
    }
}
