//! Variable context for expression evaluation
//!
//! The context maps names to values for the duration of one evaluation. The
//! evaluator only reads from it.

use std::collections::HashMap;
use std::sync::Arc;

use formula_value::Value;

/// Variables visible to an expression
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    variables: HashMap<Arc<str>, Value>,
}

impl VariableContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any previous value
    pub fn set(&mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Get a variable by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Check if a variable is defined
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Remove a variable, returning its value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Check if no variables are defined
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterate over all variables
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.variables.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Create a builder for constructing contexts
    pub fn builder() -> VariableContextBuilder {
        VariableContextBuilder::new()
    }
}

impl<K, V> FromIterator<(K, V)> for VariableContext
where
    K: Into<Arc<str>>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            variables: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V> Extend<(K, V)> for VariableContext
where
    K: Into<Arc<str>>,
    V: Into<Value>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.variables
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

/// Builder for creating variable contexts
#[derive(Debug, Clone, Default)]
pub struct VariableContextBuilder {
    variables: HashMap<Arc<str>, Value>,
}

impl VariableContextBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable
    #[must_use]
    pub fn var(mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Build the context
    pub fn build(self) -> VariableContext {
        VariableContext {
            variables: self.variables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut ctx = VariableContext::new();
        ctx.set("one", 1);
        ctx.set("name", "test");

        assert_eq!(ctx.get("one"), Some(&Value::integer(1)));
        assert_eq!(ctx.get("name"), Some(&Value::text("test")));
        assert_eq!(ctx.get("missing"), None);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let ctx: VariableContext = [("Yes", true)].into_iter().collect();
        assert!(ctx.contains("Yes"));
        assert!(!ctx.contains("yes"));
    }

    #[test]
    fn test_builder() {
        let ctx = VariableContext::builder()
            .var("当前页", 3)
            .var("_x", Value::Null)
            .build();

        assert_eq!(ctx.get("当前页"), Some(&Value::integer(3)));
        assert!(ctx.contains("_x"));
    }

    #[test]
    fn test_extend_replaces() {
        let mut ctx = VariableContext::new();
        ctx.set("a", 1);
        ctx.extend([("a", 2), ("b", 3)]);
        assert_eq!(ctx.get("a"), Some(&Value::integer(2)));
        assert_eq!(ctx.remove("b"), Some(Value::integer(3)));
    }
}
