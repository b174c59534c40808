//! AST evaluation module
//!
//! This module implements the evaluation of parsed expression ASTs. The
//! evaluator borrows a [`ValueComparer`] for equality and ordering and a
//! [`HostResolver`] for everything that reaches into values (members,
//! calls, host indexing). Recursion depth is bounded by the parser's
//! nesting limit; flat operator and postfix chains are walked in a loop.

use std::cmp::Ordering;

use formula_value::number::decimal_to_index;
use formula_value::{Decimal, Mapping, NumberFormat, Value, ValueComparer};
use tracing::{debug, trace};

use crate::context::VariableContext;
use crate::core::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{EvalError, EvalResult};
use crate::host::{HostError, HostResolver};

/// Evaluator for expression ASTs
pub struct Evaluator<'e> {
    comparer: &'e ValueComparer,
    resolver: &'e dyn HostResolver,
}

impl<'e> Evaluator<'e> {
    /// Create a new evaluator
    pub fn new(comparer: &'e ValueComparer, resolver: &'e dyn HostResolver) -> Self {
        Self { comparer, resolver }
    }

    /// Evaluate an expression in the given context
    pub fn eval(&self, expr: &Expr, context: &VariableContext) -> EvalResult<Value> {
        match expr {
            Expr::Constant(value) => Ok(value.clone()),

            Expr::VariableRef(name) => Ok(context.get(name).cloned().unwrap_or_else(|| {
                trace!(variable = %name, "unknown variable resolved to null");
                Value::Null
            })),

            Expr::Unary { op, operand } => {
                let value = self.eval(operand, context)?;
                self.eval_unary_op(*op, value)
            }

            Expr::Binary { .. } => self.eval_binary_chain(expr, context),

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                // exactly one branch is evaluated
                if self.eval(condition, context)?.is_truthy() {
                    self.eval(then_branch, context)
                } else {
                    self.eval(else_branch, context)
                }
            }

            Expr::MemberAccess { .. } | Expr::Index { .. } | Expr::Call { .. } => {
                self.eval_postfix_chain(expr, context)
            }

            Expr::ArrayLiteral(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval(element, context)?);
                }
                Ok(Value::Sequence(items))
            }

            Expr::DictionaryLiteral(pairs) => {
                let mut map = Mapping::with_capacity(pairs.len());
                for (key_expr, value_expr) in pairs {
                    let key = self.eval(key_expr, context)?;
                    let value = self.eval(value_expr, context)?;
                    if map.contains_key(&key) {
                        return Err(EvalError::DuplicateKey {
                            key: key.to_string(),
                        });
                    }
                    map.insert(key, value);
                }
                Ok(Value::Mapping(map))
            }
        }
    }

    fn number_format(&self) -> &NumberFormat {
        &self.comparer.options().number_format
    }

    // ==================== Operators ====================

    fn eval_unary_op(&self, op: UnaryOp, value: Value) -> EvalResult<Value> {
        match (op, value) {
            (UnaryOp::Not, value) => Ok(Value::Boolean(!value.is_truthy())),
            (UnaryOp::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
            (UnaryOp::Negate, Value::Duration(d)) => Ok(Value::Duration(-d)),
            (UnaryOp::Negate, other) => Err(EvalError::operator("-", other.kind().name())),
        }
    }

    /// Fold the left spine of `expr` in source order
    ///
    /// `&&` and `||` skip their right operand once the result is decided.
    fn eval_binary_chain(&self, expr: &Expr, context: &VariableContext) -> EvalResult<Value> {
        let mut links = Vec::new();
        let mut leftmost = expr;
        while let Expr::Binary { left, op, right } = leftmost {
            links.push((*op, right.as_ref()));
            leftmost = left.as_ref();
        }

        let mut acc = self.eval(leftmost, context)?;
        for (op, right) in links.into_iter().rev() {
            acc = match op {
                BinaryOp::And if !acc.is_truthy() => Value::Boolean(false),
                BinaryOp::Or if acc.is_truthy() => Value::Boolean(true),
                BinaryOp::And | BinaryOp::Or => {
                    Value::Boolean(self.eval(right, context)?.is_truthy())
                }
                _ => {
                    let right_val = self.eval(right, context)?;
                    self.apply_binary_op(op, acc, right_val)?
                }
            };
        }
        Ok(acc)
    }

    /// Apply a binary operator to evaluated operands
    pub fn apply_binary_op(&self, op: BinaryOp, left_val: Value, right_val: Value) -> EvalResult<Value> {
        match op {
            BinaryOp::Add => self.add(left_val, right_val),
            BinaryOp::Subtract => subtract(left_val, right_val),
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => {
                arithmetic(op, &left_val, &right_val)
            }

            BinaryOp::Equal => Ok(optional_bool(self.comparer.equals(&left_val, &right_val)?)),
            BinaryOp::NotEqual => Ok(optional_bool(
                self.comparer.equals(&left_val, &right_val)?.map(|eq| !eq),
            )),
            BinaryOp::StrictEqual => Ok(Value::Boolean(self.comparer.exact_equals(&left_val, &right_val))),
            BinaryOp::StrictNotEqual => Ok(Value::Boolean(!self.comparer.exact_equals(&left_val, &right_val))),

            BinaryOp::LessThan => self.relational(&left_val, &right_val, Ordering::is_lt),
            BinaryOp::GreaterThan => self.relational(&left_val, &right_val, Ordering::is_gt),
            BinaryOp::LessEqual => self.relational(&left_val, &right_val, Ordering::is_le),
            BinaryOp::GreaterEqual => self.relational(&left_val, &right_val, Ordering::is_ge),

            BinaryOp::And => Ok(Value::Boolean(left_val.is_truthy() && right_val.is_truthy())),
            BinaryOp::Or => Ok(Value::Boolean(left_val.is_truthy() || right_val.is_truthy())),
        }
    }

    fn add(&self, left: Value, right: Value) -> EvalResult<Value> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => a
                .checked_add(b)
                .map(Value::Number)
                .ok_or(EvalError::NumericOverflow { operator: "+" }),

            (left @ Value::Text(_), right) | (left, right @ Value::Text(_)) => {
                let format = self.number_format();
                let mut text = left.to_text(format);
                text.push_str(&right.to_text(format));
                Ok(Value::Text(text))
            }

            (Value::DateTime(dt), Value::Duration(d)) | (Value::Duration(d), Value::DateTime(dt)) => dt
                .checked_add_signed(d)
                .map(Value::DateTime)
                .ok_or(EvalError::NumericOverflow { operator: "+" }),

            (Value::Duration(a), Value::Duration(b)) => a
                .checked_add(&b)
                .map(Value::Duration)
                .ok_or(EvalError::NumericOverflow { operator: "+" }),

            (left, right) => Err(operand_error("+", &left, &right)),
        }
    }

    fn relational(
        &self,
        left: &Value,
        right: &Value,
        predicate: fn(Ordering) -> bool,
    ) -> EvalResult<Value> {
        let ordering = self.comparer.compare(left, right)?;
        Ok(optional_bool(ordering.map(predicate)))
    }

    // ==================== Members and calls ====================

    fn resolve_member(&self, target: &Value, name: &str) -> EvalResult<Value> {
        self.resolver
            .resolve_member(target, name)
            .map_err(|e| host_error(e, name, target))
    }

    /// Apply member, index and call links to their innermost target
    fn eval_postfix_chain(&self, expr: &Expr, context: &VariableContext) -> EvalResult<Value> {
        let mut links = Vec::new();
        let mut base = expr;
        loop {
            base = match base {
                Expr::Call { target, args } => match target.as_ref() {
                    Expr::MemberAccess {
                        target: receiver,
                        name,
                    } => {
                        links.push(Link::Method(name, args));
                        receiver.as_ref()
                    }
                    callee => {
                        links.push(Link::Call(callee, args));
                        callee
                    }
                },
                Expr::MemberAccess { target, name } => {
                    links.push(Link::Member(name));
                    target.as_ref()
                }
                Expr::Index { target, index } => {
                    links.push(Link::Index(index));
                    target.as_ref()
                }
                _ => break,
            };
        }

        let mut value = self.eval(base, context)?;
        for link in links.into_iter().rev() {
            value = match link {
                Link::Member(name) => self.resolve_member(&value, name)?,
                Link::Index(index) => {
                    let index = self.eval(index, context)?;
                    self.access_index(&value, &index)?
                }
                Link::Method(name, args) => {
                    let args = self.eval_args(args, context)?;
                    self.invoke_method(&value, name, &args)?
                }
                Link::Call(callee, args) => {
                    let args = self.eval_args(args, context)?;
                    let description = match callee {
                        Expr::VariableRef(name) => name.as_ref(),
                        _ => value.type_name(),
                    };
                    self.invoke_callable(&value, &args, description)?
                }
            };
        }
        Ok(value)
    }

    fn invoke_method(&self, receiver: &Value, name: &str, args: &[Value]) -> EvalResult<Value> {
        match self.resolver.invoke(receiver, name, args) {
            Ok(value) => Ok(value),
            // not a method: read the member and call it if it is callable
            Err(HostError::NotFound) => {
                let member = self.resolve_member(receiver, name)?;
                self.invoke_callable(&member, args, name)
            }
            Err(e) => Err(host_error(e, name, receiver)),
        }
    }

    fn eval_args(&self, args: &[Expr], context: &VariableContext) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, context)?);
        }
        Ok(values)
    }

    fn invoke_callable(&self, callee: &Value, args: &[Value], description: &str) -> EvalResult<Value> {
        if !matches!(callee, Value::Callable(_)) {
            return Err(EvalError::not_callable(callee.type_name()));
        }
        self.resolver
            .invoke_callable(callee, args)
            .map_err(|e| match e {
                HostError::NotFound | HostError::NotCallable => {
                    EvalError::not_callable(callee.type_name())
                }
                HostError::Failed(source) => failed(description, source),
            })
    }

    // ==================== Indexing ====================

    fn access_index(&self, target: &Value, index: &Value) -> EvalResult<Value> {
        match (target, index) {
            (Value::Sequence(items), Value::Number(n)) => {
                let i = checked_index(n, items.len())?;
                Ok(items[i].clone())
            }

            (Value::Text(s), Value::Number(n)) => {
                let length = s.chars().count();
                let i = checked_index(n, length)?;
                Ok(s.chars().nth(i).map(String::from).map_or(Value::Null, Value::Text))
            }

            (Value::Sequence(_) | Value::Text(_), other) => {
                Err(operand_error("[]", target, other))
            }

            (Value::Mapping(map), key) => map.get(key).cloned().ok_or_else(|| EvalError::KeyNotFound {
                key: key.to_string(),
            }),

            _ => self.resolver.index(target, index).map_err(|e| match e {
                HostError::NotFound | HostError::NotCallable => EvalError::NotIndexable {
                    target: target.type_name().to_string(),
                },
                HostError::Failed(source) => failed("[]", source),
            }),
        }
    }
}

/// Validate a numeric index against a length
/// One step of a postfix chain
enum Link<'x> {
    Member(&'x str),
    Index(&'x Expr),
    Method(&'x str, &'x [Expr]),
    Call(&'x Expr, &'x [Expr]),
}

fn checked_index(n: &Decimal, length: usize) -> EvalResult<usize> {
    if !n.fract().is_zero() {
        return Err(EvalError::operator("[]", format!("non-integral index {n}")));
    }
    match decimal_to_index(n) {
        Some(i) if i < length => Ok(i),
        _ => Err(EvalError::IndexOutOfRange {
            index: n.to_string(),
            length,
        }),
    }
}

fn subtract(left: Value, right: Value) -> EvalResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a
            .checked_sub(b)
            .map(Value::Number)
            .ok_or(EvalError::NumericOverflow { operator: "-" }),

        (Value::DateTime(a), Value::DateTime(b)) => Ok(Value::Duration(a.signed_duration_since(b))),

        (Value::DateTime(dt), Value::Duration(d)) => dt
            .checked_sub_signed(d)
            .map(Value::DateTime)
            .ok_or(EvalError::NumericOverflow { operator: "-" }),

        (Value::Duration(a), Value::Duration(b)) => a
            .checked_sub(&b)
            .map(Value::Duration)
            .ok_or(EvalError::NumericOverflow { operator: "-" }),

        (left, right) => Err(operand_error("-", &left, &right)),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Value> {
    let operator = op.name();
    let (Value::Number(a), Value::Number(b)) = (left, right) else {
        return Err(operand_error(operator, left, right));
    };

    let result = match op {
        BinaryOp::Multiply => a.checked_mul(*b),
        BinaryOp::Divide | BinaryOp::Modulo if b.is_zero() => {
            return Err(EvalError::DivisionByZero);
        }
        BinaryOp::Divide => a.checked_div(*b),
        _ => a.checked_rem(*b),
    };

    result
        .map(Value::Number)
        .ok_or(EvalError::NumericOverflow { operator })
}

fn optional_bool(value: Option<bool>) -> Value {
    value.map_or(Value::Null, Value::Boolean)
}

fn operand_error(operator: &'static str, left: &Value, right: &Value) -> EvalError {
    EvalError::operator(operator, format!("{} and {}", left.kind(), right.kind()))
}

fn failed(member: &str, source: Box<dyn std::error::Error + Send + Sync>) -> EvalError {
    debug!(member, error = %source, "host invocation failed");
    EvalError::host_failed(member, source)
}

fn host_error(error: HostError, member: &str, target: &Value) -> EvalError {
    match error {
        HostError::NotFound => EvalError::member_not_found(member, target.type_name()),
        HostError::NotCallable => EvalError::not_callable(target.type_name()),
        HostError::Failed(source) => failed(member, source),
    }
}
