#![warn(clippy::all)]
#![warn(missing_docs)]
//! # formula-expression
//!
//! Embeddable expression language for evaluating formulas against a set of
//! named variables and host objects.
//!
//! ## Quick Start
//!
//! ```rust
//! use formula_expression::{ExpressionEngine, Value, VariableContext};
//!
//! // Create an engine
//! let engine = ExpressionEngine::new();
//!
//! // Create a context
//! let mut ctx = VariableContext::new();
//! ctx.set("price", 10);
//! ctx.set("qty", 3);
//!
//! // Evaluate an expression
//! let total = engine.eval("price * qty > 25 ? \"bulk\" : \"single\"", &ctx).unwrap();
//! assert_eq!(total, Value::text("bulk"));
//! ```
//!
//! ## Language
//!
//! - Arithmetic operators: `+`, `-`, `*`, `/`, `%` on decimals; `+`/`-` also
//!   on date/times and durations, `+` concatenates when either side is text
//! - Comparison operators: `==`, `!=`, `<`, `<=`, `>`, `>=` (cross-type, see
//!   [`ValueComparer`]) and exact `===`, `!==`
//! - Logical operators: `&&`/`and`, `||`/`or`, `!`/`not` (short-circuit)
//! - Conditionals: `cond ? a : b` (only the chosen branch is evaluated)
//! - Member access and calls: `s.Length`, `s.Substring(1, 2)`, `f(x)`
//! - Index access: `arr[0]`, `map["key"]`, `text[1]`
//! - Literals: numbers, `"strings"`, `true`, `false`, `null`,
//!   `new[]{1, 2}`, `new dictionary{{"a", 1}, {"b", 2}}`
//!
//! Unknown variables evaluate to `null`.
//!
//! ## Host objects
//!
//! Members of built-in values (text, sequences, mappings, date/times,
//! durations) are served by the default [`HostResolver`]. Hosts expose their
//! own objects by implementing the trait and installing it with
//! [`ExpressionEngineBuilder::resolver`]; Rust closures can be placed in the
//! context as [`NativeFunction`]s.
//!
//! ## Caching
//!
//! [`ExpressionEngine::eval`] caches parsed trees by trimmed source text, so
//! repeated evaluation of the same formula parses once.
//!
//! ```rust
//! use formula_expression::{ExpressionEngine, VariableContext};
//!
//! let engine = ExpressionEngine::new();
//! let ctx = VariableContext::new();
//! for _ in 0..3 {
//!     engine.eval("1 + 2 + 3", &ctx).unwrap();
//! }
//! assert_eq!(engine.cache_stats().misses, 1);
//! ```

// Core modules
pub mod core;
pub mod error;
mod error_formatter;
pub mod lexer;
pub mod parser;

// Evaluation
pub mod builtins;
pub mod context;
pub mod engine;
pub mod eval;
pub mod host;

// Re-export main types
pub use context::{VariableContext, VariableContextBuilder};
pub use crate::core::ast::{BinaryOp, Expr, UnaryOp};
pub use engine::{
    CacheStats, EngineConfig, Expression, ExpressionEngine, ExpressionEngineBuilder,
    default_engine, eval,
};
pub use error::{
    EvalError, ExpressionError, ExpressionResult, LexError, LexErrorKind, ParseError, SyntaxError,
};
pub use host::{DefaultResolver, HostError, HostResolver, HostResult, NativeFunction};
pub use parser::ParseOptions;

pub use formula_value::{
    Decimal, HostHandle, Mapping, NullComparisonMode, NumberFormat, Value, ValueComparer,
    ValueKind,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        EngineConfig, Expr, Expression, ExpressionEngine, ExpressionError, ExpressionResult,
        HostError, HostResolver, HostResult, NativeFunction, Value, VariableContext,
    };
}
