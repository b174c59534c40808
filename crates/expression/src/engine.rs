//! Expression engine with caching support
//!
//! This module provides the main [`ExpressionEngine`] that parses and
//! evaluates expressions. Parsed ASTs are cached by their trimmed source text
//! in a `moka` cache; concurrent first-time evaluations of the same text
//! share a single parse.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use formula_value::{
    ComparerOptions, Normalizer, NullComparisonMode, NumberFormat, Value, ValueComparer,
};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::context::VariableContext;
use crate::core::ast::Expr;
use crate::error::{ExpressionResult, SyntaxError};
use crate::eval::Evaluator;
use crate::host::{DefaultResolver, HostResolver};
use crate::parser::{self, DEFAULT_MAX_CHAIN_LENGTH, DEFAULT_MAX_NESTING_DEPTH, ParseOptions};

/// Engine configuration
///
/// Every field has a default, so a host can deserialize a partial section of
/// its own configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Accept a bare `=` as `==`
    pub allow_single_equal_sign: bool,
    /// Null handling for comparisons
    pub null_comparison: NullComparisonMode,
    /// Turn comparison errors into `null` results
    pub suppress_comparison_errors: bool,
    /// Format used for text/number conversions
    pub number_format: NumberFormat,
    /// Maximum nesting depth accepted by the parser
    pub max_nesting_depth: usize,
    /// Maximum number of links in one operator or postfix chain
    pub max_chain_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allow_single_equal_sign: false,
            null_comparison: NullComparisonMode::default(),
            suppress_comparison_errors: false,
            number_format: NumberFormat::default(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
        }
    }
}

impl EngineConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a bare `=` as `==`
    #[must_use]
    pub const fn with_single_equal_sign(mut self, allow: bool) -> Self {
        self.allow_single_equal_sign = allow;
        self
    }

    /// Set the null comparison mode
    #[must_use]
    pub const fn with_null_comparison(mut self, mode: NullComparisonMode) -> Self {
        self.null_comparison = mode;
        self
    }

    /// Enable or disable comparison error suppression
    #[must_use]
    pub const fn with_suppress_comparison_errors(mut self, suppress: bool) -> Self {
        self.suppress_comparison_errors = suppress;
        self
    }

    /// Set the number format
    #[must_use]
    pub const fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    /// Set the nesting limit
    #[must_use]
    pub const fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Set the chain length limit
    #[must_use]
    pub const fn with_max_chain_length(mut self, links: usize) -> Self {
        self.max_chain_length = links;
        self
    }

    /// Options for the lexer and parser
    pub const fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            allow_single_equal_sign: self.allow_single_equal_sign,
            max_nesting_depth: self.max_nesting_depth,
            max_chain_length: self.max_chain_length,
        }
    }

    /// Options for the value comparer
    pub fn comparer_options(&self) -> ComparerOptions {
        ComparerOptions::new()
            .with_null_comparison(self.null_comparison)
            .with_suppress_errors(self.suppress_comparison_errors)
            .with_number_format(self.number_format)
    }
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to parse
    pub misses: u64,
    /// Entries currently cached
    pub entries: u64,
}

/// A parsed expression together with its source text
#[derive(Debug, Clone)]
pub struct Expression {
    source: Arc<str>,
    ast: Arc<Expr>,
}

impl Expression {
    /// The source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed tree
    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// Shared handle to the parsed tree
    pub fn shared_ast(&self) -> Arc<Expr> {
        Arc::clone(&self.ast)
    }

    /// Names of all referenced variables, in first-occurrence order
    pub fn referenced_names(&self) -> IndexSet<String> {
        self.ast.referenced_names()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Expression engine with parsing and evaluation capabilities
pub struct ExpressionEngine {
    config: EngineConfig,
    comparer: ValueComparer,
    resolver: Arc<dyn HostResolver>,
    /// Parsed ASTs keyed by trimmed source text
    cache: moka::sync::Cache<String, Arc<Expr>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ExpressionEngine {
    /// Create a new expression engine with default configuration
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new expression engine with the given configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Create a builder
    pub fn builder() -> ExpressionEngineBuilder {
        ExpressionEngineBuilder::default()
    }

    /// Get the configuration
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the comparer used for equality and ordering
    pub const fn comparer(&self) -> &ValueComparer {
        &self.comparer
    }

    /// Parse (with caching) and evaluate an expression
    pub fn eval(&self, text: &str, context: &VariableContext) -> ExpressionResult<Value> {
        let key = text.trim();
        trace!(expression = key, "evaluating expression");

        let ast = self.cached_parse(key)?;
        self.evaluate(&ast, context)
    }

    /// Parse an expression without touching the cache
    pub fn parse(&self, text: &str) -> ExpressionResult<Expression> {
        let source = text.trim();
        let ast = parser::parse(source, self.config.parse_options())?;
        Ok(Expression {
            source: Arc::from(source),
            ast: Arc::new(ast),
        })
    }

    /// Evaluate an already parsed expression
    pub fn evaluate(&self, expr: &Expr, context: &VariableContext) -> ExpressionResult<Value> {
        let evaluator = Evaluator::new(&self.comparer, self.resolver.as_ref());
        let result = evaluator.eval(expr, context)?;
        trace!(result = ?result, "expression evaluation completed");
        Ok(result)
    }

    /// Names of all variables referenced by `expr`, in first-occurrence order
    pub fn referenced_names(&self, expr: &Expr) -> IndexSet<String> {
        expr.referenced_names()
    }

    /// Drop every cached AST
    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
        debug!("expression cache cleared");
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.run_pending_tasks();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
        }
    }

    fn cached_parse(&self, key: &str) -> ExpressionResult<Arc<Expr>> {
        let mut parsed = false;
        let result = self.cache.try_get_with_by_ref(key, || {
            parsed = true;
            debug!(expression = key, "parsing expression");
            parser::parse(key, self.config.parse_options()).map(Arc::new)
        });

        if parsed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }

        result.map_err(|e: Arc<SyntaxError>| SyntaxError::clone(&e).into())
    }
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExpressionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionEngine")
            .field("config", &self.config)
            .field("comparer", &self.comparer)
            .field("cache_stats", &self.cache_stats())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ExpressionEngine`]
#[derive(Default)]
pub struct ExpressionEngineBuilder {
    config: EngineConfig,
    resolver: Option<Arc<dyn HostResolver>>,
    normalizer: Option<Normalizer>,
}

impl ExpressionEngineBuilder {
    /// Set the configuration
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the host resolver
    #[must_use]
    pub fn resolver(mut self, resolver: impl HostResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Set an already shared host resolver
    #[must_use]
    pub fn shared_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Set the comparer normalizer
    #[must_use]
    pub fn normalizer<F>(mut self, normalizer: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.normalizer = Some(Arc::new(normalizer));
        self
    }

    /// Build the engine
    pub fn build(self) -> ExpressionEngine {
        let comparer = ValueComparer::new(self.config.comparer_options())
            .with_shared_normalizer(self.normalizer);

        debug!(config = ?self.config, "created expression engine");

        ExpressionEngine {
            config: self.config,
            comparer,
            resolver: self.resolver.unwrap_or_else(|| Arc::new(DefaultResolver)),
            cache: moka::sync::Cache::builder().build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

static DEFAULT_ENGINE: LazyLock<ExpressionEngine> = LazyLock::new(ExpressionEngine::new);

/// The process-wide engine with default configuration
pub fn default_engine() -> &'static ExpressionEngine {
    &DEFAULT_ENGINE
}

/// Evaluate `text` on the process-wide default engine
pub fn eval(text: &str, context: &VariableContext) -> ExpressionResult<Value> {
    DEFAULT_ENGINE.eval(text, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_evaluate_literal() {
        let engine = ExpressionEngine::new();
        let result = engine.eval("42", &VariableContext::new()).unwrap();
        assert_eq!(result, Value::integer(42));
    }

    #[test]
    fn test_cache_keyed_by_trimmed_text() {
        let engine = ExpressionEngine::new();
        let ctx = VariableContext::new();

        engine.eval("1 + 2", &ctx).unwrap();
        engine.eval("  1 + 2\n", &ctx).unwrap();

        let stats = engine.cache_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_syntax_errors_are_not_cached() {
        let engine = ExpressionEngine::new();
        let ctx = VariableContext::new();

        assert!(engine.eval("1 +", &ctx).unwrap_err().is_syntax());
        assert!(engine.eval("1 +", &ctx).is_err());
        assert_eq!(engine.cache_stats().entries, 0);
        assert_eq!(engine.cache_stats().misses, 2);
    }

    #[test]
    fn test_clear_cache() {
        let engine = ExpressionEngine::new();
        engine.eval("1", &VariableContext::new()).unwrap();
        engine.clear_cache();
        assert_eq!(engine.cache_stats().entries, 0);
    }

    #[test]
    fn test_parse_is_uncached() {
        let engine = ExpressionEngine::new();
        let expr = engine.parse(" a + b * a ").unwrap();
        assert_eq!(expr.source(), "a + b * a");
        assert_eq!(engine.cache_stats(), CacheStats::default());

        let names: Vec<_> = expr.referenced_names().into_iter().collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_config_deserialize() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"allow_single_equal_sign": true, "null_comparison": "sql"}"#,
        )
        .unwrap();
        assert!(config.allow_single_equal_sign);
        assert_eq!(config.null_comparison, NullComparisonMode::Sql);
        assert_eq!(config.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
        assert_eq!(config.max_chain_length, DEFAULT_MAX_CHAIN_LENGTH);
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExpressionEngine>();
        assert_send_sync::<Expression>();
    }
}
