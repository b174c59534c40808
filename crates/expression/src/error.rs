//! Error types for formula-expression
//!
//! Uses thiserror for clean, idiomatic Rust error definitions. Errors are
//! layered the way evaluation is: [`LexError`] and [`ParseError`] make up
//! [`SyntaxError`], runtime failures are [`EvalError`], and
//! [`ExpressionError`] is what the engine returns.

use formula_value::ComparisonError;
use thiserror::Error;

use crate::error_formatter::ErrorFormatter;

// ============================================================================
// Syntax errors
// ============================================================================

/// Why the lexer rejected the input
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A string literal has no closing quote
    #[error("unterminated string literal")]
    UnterminatedString,

    /// Backslash followed by an unsupported character
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(String),

    /// Malformed or out-of-range numeric literal
    #[error("invalid numeric literal '{0}'")]
    InvalidNumber(String),

    /// A bare `=` while single equal signs are disabled
    #[error("unexpected '=' (use '==' for comparison)")]
    SingleEqualSign,

    /// Character that starts no token
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
}

/// Tokenizer failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} at position {position}")]
pub struct LexError {
    /// Byte offset of the offending input
    pub position: usize,
    /// What went wrong
    pub reason: LexErrorKind,
}

impl LexError {
    /// Create a lex error
    pub const fn new(position: usize, reason: LexErrorKind) -> Self {
        Self { position, reason }
    }
}

/// Grammar violation found by the parser
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The token at `position` does not fit the grammar
    #[error("expected {expected}, found {found} at position {position}")]
    UnexpectedToken {
        /// Byte offset of the found token
        position: usize,
        /// Description of what the grammar allows here
        expected: String,
        /// The token actually found
        found: String,
    },

    /// The expression nests deeper than the configured limit
    #[error("expression nesting exceeds the limit of {limit} at position {position}")]
    NestingTooDeep {
        /// Byte offset where the limit was crossed
        position: usize,
        /// Configured maximum depth
        limit: usize,
    },

    /// One operator or postfix chain has more links than the configured limit
    #[error("expression chain exceeds the limit of {limit} links at position {position}")]
    ChainTooLong {
        /// Byte offset where the limit was crossed
        position: usize,
        /// Configured maximum chain length
        limit: usize,
    },
}

impl ParseError {
    /// Create an unexpected token error
    pub fn unexpected(position: usize, expected: impl Into<String>, found: impl ToString) -> Self {
        Self::UnexpectedToken {
            position,
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    /// Byte offset of the error
    pub const fn position(&self) -> usize {
        match self {
            Self::UnexpectedToken { position, .. }
            | Self::NestingTooDeep { position, .. }
            | Self::ChainTooLong { position, .. } => *position,
        }
    }
}

/// Any error raised before evaluation starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// Tokenizer failure
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    /// Parser failure
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    /// Byte offset of the error
    pub const fn position(&self) -> usize {
        match self {
            Self::Lex(e) => e.position,
            Self::Parse(e) => e.position(),
        }
    }

    /// Render a diagnostic pointing at the error in `source`
    pub fn render(&self, source: &str) -> String {
        let message = match self {
            Self::Lex(e) => e.reason.to_string(),
            Self::Parse(ParseError::UnexpectedToken {
                expected, found, ..
            }) => format!("expected {expected}, found {found}"),
            Self::Parse(ParseError::NestingTooDeep { limit, .. }) => {
                format!("expression nesting exceeds the limit of {limit}")
            }
            Self::Parse(ParseError::ChainTooLong { limit, .. }) => {
                format!("expression chain exceeds the limit of {limit} links")
            }
        };
        ErrorFormatter::new(source, self.position(), message)
            .with_context(1, 1)
            .format()
    }
}

// ============================================================================
// Evaluation errors
// ============================================================================

/// Runtime failure while evaluating an AST
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EvalError {
    /// Operator applied to operands it does not support
    #[error("Operator '{operator}' cannot be applied to {operands}")]
    UnknownOperatorApplication {
        /// Operator symbol
        operator: &'static str,
        /// Operand kinds, e.g. "text and sequence"
        operands: String,
    },

    /// Host reported no member with this name
    #[error("Member '{member}' not found on {target}")]
    MemberNotFound {
        /// Member name
        member: String,
        /// Type of the target value
        target: String,
    },

    /// Call target is not callable
    #[error("Value of type {target} is not callable")]
    NotCallable {
        /// Type of the call target
        target: String,
    },

    /// Sequence or text index past the end or negative
    #[error("Index {index} is out of range for length {length}")]
    IndexOutOfRange {
        /// The requested index
        index: String,
        /// Length of the indexed value
        length: usize,
    },

    /// Mapping has no entry for the key
    #[error("Key '{key}' not found")]
    KeyNotFound {
        /// The missing key
        key: String,
    },

    /// Division or modulo by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Host member or callable failed
    #[error("Host invocation of '{member}' failed: {source}")]
    HostInvocationFailed {
        /// Member or callable description
        member: String,
        /// Host error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Decimal arithmetic overflowed
    #[error("Numeric overflow in '{operator}'")]
    NumericOverflow {
        /// Operator symbol
        operator: &'static str,
    },

    /// Target cannot be indexed
    #[error("Value of type {target} cannot be indexed")]
    NotIndexable {
        /// Type of the target
        target: String,
    },

    /// Dictionary literal repeats a key
    #[error("Duplicate key '{key}' in dictionary literal")]
    DuplicateKey {
        /// The repeated key
        key: String,
    },

    /// Comparison failed and errors are not suppressed
    #[error("Comparison failed: {0}")]
    Comparison(#[from] ComparisonError),
}

impl EvalError {
    /// Create an operator application error from operand type names
    pub fn operator(operator: &'static str, operands: impl Into<String>) -> Self {
        Self::UnknownOperatorApplication {
            operator,
            operands: operands.into(),
        }
    }

    /// Create a member not found error
    pub fn member_not_found(member: impl Into<String>, target: impl Into<String>) -> Self {
        Self::MemberNotFound {
            member: member.into(),
            target: target.into(),
        }
    }

    /// Create a not callable error
    pub fn not_callable(target: impl Into<String>) -> Self {
        Self::NotCallable {
            target: target.into(),
        }
    }

    /// Create a host failure error
    pub fn host_failed(
        member: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::HostInvocationFailed {
            member: member.into(),
            source,
        }
    }
}

// ============================================================================
// Top-level error
// ============================================================================

/// Error returned by the engine
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ExpressionError {
    /// Expression text is not valid
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Evaluation failed
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

impl ExpressionError {
    /// Get error code for categorization
    pub fn code(&self) -> &'static str {
        match self {
            Self::Syntax(SyntaxError::Lex(_)) => "EXPR:LEX",
            Self::Syntax(SyntaxError::Parse(ParseError::NestingTooDeep { .. })) => "EXPR:NESTING",
            Self::Syntax(SyntaxError::Parse(ParseError::ChainTooLong { .. })) => "EXPR:CHAIN",
            Self::Syntax(SyntaxError::Parse(_)) => "EXPR:PARSE",
            Self::Eval(e) => match e {
                EvalError::UnknownOperatorApplication { .. } => "EXPR:OPERATOR",
                EvalError::MemberNotFound { .. } => "EXPR:MEMBER_NOT_FOUND",
                EvalError::NotCallable { .. } => "EXPR:NOT_CALLABLE",
                EvalError::IndexOutOfRange { .. } => "EXPR:INDEX_OOB",
                EvalError::KeyNotFound { .. } => "EXPR:KEY_NOT_FOUND",
                EvalError::DivisionByZero => "EXPR:DIV_ZERO",
                EvalError::HostInvocationFailed { .. } => "EXPR:HOST",
                EvalError::NumericOverflow { .. } => "EXPR:OVERFLOW",
                EvalError::NotIndexable { .. } => "EXPR:NOT_INDEXABLE",
                EvalError::DuplicateKey { .. } => "EXPR:DUPLICATE_KEY",
                EvalError::Comparison(_) => "EXPR:COMPARISON",
            },
        }
    }

    /// Raised before evaluation (lexing or parsing)
    pub const fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax(_))
    }

    /// Raised while evaluating
    pub const fn is_runtime(&self) -> bool {
        matches!(self, Self::Eval(_))
    }

    /// Get the syntax error, if this is one
    pub const fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Self::Syntax(e) => Some(e),
            Self::Eval(_) => None,
        }
    }

    /// Get the evaluation error, if this is one
    pub const fn as_eval(&self) -> Option<&EvalError> {
        match self {
            Self::Eval(e) => Some(e),
            Self::Syntax(_) => None,
        }
    }
}

impl From<LexError> for ExpressionError {
    fn from(e: LexError) -> Self {
        Self::Syntax(SyntaxError::Lex(e))
    }
}

impl From<ParseError> for ExpressionError {
    fn from(e: ParseError) -> Self {
        Self::Syntax(SyntaxError::Parse(e))
    }
}

impl From<ComparisonError> for ExpressionError {
    fn from(e: ComparisonError) -> Self {
        Self::Eval(EvalError::Comparison(e))
    }
}

/// Result type for engine operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

/// Result type for evaluation
pub type EvalResult<T> = Result<T, EvalError>;

/// Result type for lexing and parsing
pub type SyntaxResult<T> = Result<T, SyntaxError>;
