//! Abstract Syntax Tree (AST) node types
//!
//! This module defines the AST structure for parsed expressions. A tree is
//! built once per expression text and never mutated, so it can be shared
//! between threads behind an `Arc`.

use std::sync::Arc;

use formula_value::Value;
use indexmap::IndexSet;

/// An expression node in the AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Constant(Value),

    /// Variable looked up in the context
    VariableRef(Arc<str>),

    /// Unary operation (op operand)
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Binary operation (left op right)
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// Ternary (condition ? then_branch : else_branch)
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// Member access (target.name)
    MemberAccess { target: Box<Expr>, name: Arc<str> },

    /// Index access (target[index])
    Index { target: Box<Expr>, index: Box<Expr> },

    /// Call (target(args...)); `target` is a member access for method calls
    Call { target: Box<Expr>, args: Vec<Expr> },

    /// Array literal (new[]{e1, e2, ...})
    ArrayLiteral(Vec<Expr>),

    /// Dictionary literal (new dictionary{{k1, v1}, ...})
    DictionaryLiteral(Vec<(Expr, Expr)>),
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl UnaryOp {
    /// Get a human-readable name for the operator
    pub const fn name(&self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // Comparison
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Get a human-readable name for the operator
    pub const fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::StrictEqual => "===",
            BinaryOp::StrictNotEqual => "!==",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Expr {
    /// Check if this expression is a literal constant
    pub const fn is_constant(&self) -> bool {
        matches!(self, Expr::Constant(_))
    }

    /// Try to extract a literal value if this is a constant expression
    pub const fn as_constant(&self) -> Option<&Value> {
        match self {
            Expr::Constant(val) => Some(val),
            _ => None,
        }
    }

    /// Names of all variables referenced, in first-occurrence order
    ///
    /// Member and method names are not variables: in `a.b(c)` only `a` and
    /// `c` are reported.
    pub fn referenced_names(&self) -> IndexSet<String> {
        let mut names = IndexSet::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, names: &mut IndexSet<String>) {
        match self {
            Expr::Constant(_) => {}
            Expr::VariableRef(name) => {
                if !names.contains(&**name) {
                    names.insert(name.to_string());
                }
            }
            Expr::Unary { operand, .. } => operand.collect_names(names),
            Expr::Binary { left, right, .. } => {
                left.collect_names(names);
                right.collect_names(names);
            }
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.collect_names(names);
                then_branch.collect_names(names);
                else_branch.collect_names(names);
            }
            Expr::MemberAccess { target, .. } => target.collect_names(names),
            Expr::Index { target, index } => {
                target.collect_names(names);
                index.collect_names(names);
            }
            Expr::Call { target, args } => {
                target.collect_names(names);
                for arg in args {
                    arg.collect_names(names);
                }
            }
            Expr::ArrayLiteral(elements) => {
                for element in elements {
                    element.collect_names(names);
                }
            }
            Expr::DictionaryLiteral(pairs) => {
                for (key, value) in pairs {
                    key.collect_names(names);
                    value.collect_names(names);
                }
            }
        }
    }

    /// Depth of the deepest path through this tree
    pub fn depth(&self) -> usize {
        let child_depth = match self {
            Expr::Constant(_) | Expr::VariableRef(_) => 0,
            Expr::Unary { operand, .. } => operand.depth(),
            Expr::Binary { left, right, .. } => left.depth().max(right.depth()),
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => condition.depth().max(then_branch.depth()).max(else_branch.depth()),
            Expr::MemberAccess { target, .. } => target.depth(),
            Expr::Index { target, index } => target.depth().max(index.depth()),
            Expr::Call { target, args } => args
                .iter()
                .map(Expr::depth)
                .fold(target.depth(), usize::max),
            Expr::ArrayLiteral(elements) => elements.iter().map(Expr::depth).max().unwrap_or(0),
            Expr::DictionaryLiteral(pairs) => pairs
                .iter()
                .map(|(k, v)| k.depth().max(v.depth()))
                .max()
                .unwrap_or(0),
        };
        child_depth + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::VariableRef(Arc::from(name)))
    }

    #[test]
    fn test_referenced_names_order_and_dedup() {
        // b + a.m(b, c)
        let expr = Expr::Binary {
            left: var("b"),
            op: BinaryOp::Add,
            right: Box::new(Expr::Call {
                target: Box::new(Expr::MemberAccess {
                    target: var("a"),
                    name: Arc::from("m"),
                }),
                args: vec![*var("b"), *var("c")],
            }),
        };

        let names: Vec<_> = expr.referenced_names().into_iter().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_constant_has_no_names() {
        let expr = Expr::Constant(Value::integer(1));
        assert!(expr.referenced_names().is_empty());
        assert!(expr.is_constant());
        assert_eq!(expr.depth(), 1);
    }

    #[test]
    fn test_operator_names() {
        assert_eq!(BinaryOp::StrictNotEqual.to_string(), "!==");
        assert_eq!(UnaryOp::Not.to_string(), "!");
    }
}
