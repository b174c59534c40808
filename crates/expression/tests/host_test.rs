//! Host object binding tests

mod common;

use std::sync::{Arc, Mutex};

use formula_expression::builtins;
use formula_expression::{
    EvalError, ExpressionEngine, ExpressionError, HostError, HostHandle, HostResolver, HostResult,
    NativeFunction, Value, VariableContext,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

#[derive(Debug)]
struct Customer {
    name: String,
    orders: Vec<Decimal>,
}

/// Wrapper a host uses around plain values, e.g. a JSON node
#[derive(Debug)]
struct Wrapped(Value);

/// Exposes [`Customer`] objects and falls back to the built-in members
struct CustomerResolver;

impl CustomerResolver {
    fn customer(target: &Value) -> Option<&Customer> {
        target.as_handle()?.downcast_ref::<Customer>()
    }
}

impl HostResolver for CustomerResolver {
    fn resolve_member(&self, target: &Value, name: &str) -> HostResult<Value> {
        let Some(customer) = Self::customer(target) else {
            return builtins::registry().get(target, name);
        };
        match name {
            "Name" => Ok(Value::text(customer.name.as_str())),
            "Orders" => Ok(customer.orders.iter().copied().map(Value::number).collect()),
            "Greeter" => Ok(NativeFunction::new("Greeter", |args| {
                let who = args.first().map(ToString::to_string).unwrap_or_default();
                Ok(Value::text(format!("hello {who}")))
            })
            .into_value()),
            _ => Err(HostError::NotFound),
        }
    }

    fn invoke(&self, target: &Value, name: &str, args: &[Value]) -> HostResult<Value> {
        let Some(customer) = Self::customer(target) else {
            return builtins::registry().invoke(target, name, args);
        };
        match name {
            "Total" => Ok(Value::number(customer.orders.iter().sum())),
            "Fail" => Err(HostError::failed("customer service unavailable")),
            _ => Err(HostError::NotFound),
        }
    }

    fn index(&self, target: &Value, index: &Value) -> HostResult<Value> {
        let customer = Self::customer(target).ok_or(HostError::NotFound)?;
        match index.as_text() {
            Some("name") => Ok(Value::text(customer.name.as_str())),
            _ => Err(HostError::NotFound),
        }
    }
}

fn customer_context() -> VariableContext {
    let customer = Customer {
        name: "Ada".to_string(),
        orders: vec![Decimal::new(1050, 2), Decimal::new(250, 2)],
    };
    VariableContext::builder()
        .var("customer", Value::HostObject(HostHandle::named(customer, "Customer")))
        .build()
}

fn engine() -> ExpressionEngine {
    common::init_tracing();
    ExpressionEngine::builder().resolver(CustomerResolver).build()
}

#[test]
fn test_member_access() {
    let ctx = customer_context();
    let engine = engine();

    assert_eq!(engine.eval("customer.Name", &ctx).unwrap(), Value::text("Ada"));
    assert_eq!(engine.eval("customer.Orders.Count", &ctx).unwrap(), Value::integer(2));
    assert_eq!(engine.eval("customer.Name.Length", &ctx).unwrap(), Value::integer(3));
    assert_eq!(engine.eval(r#"customer["name"]"#, &ctx).unwrap(), Value::text("Ada"));
}

#[test]
fn test_method_calls() {
    let ctx = customer_context();
    let engine = engine();

    assert_eq!(
        engine.eval("customer.Total()", &ctx).unwrap(),
        Value::number(Decimal::new(13, 0))
    );
    // a member holding a callable is invoked when no method matches
    assert_eq!(
        engine.eval("customer.Greeter(customer.Name)", &ctx).unwrap(),
        Value::text("hello Ada")
    );
}

#[test]
fn test_host_errors() {
    let ctx = customer_context();
    let engine = engine();

    let err = engine.eval("customer.Missing", &ctx).unwrap_err();
    assert!(matches!(err, ExpressionError::Eval(EvalError::MemberNotFound { .. })));
    assert_eq!(
        err.to_string(),
        "Evaluation error: Member 'Missing' not found on Customer"
    );

    let err = engine.eval("customer.Fail()", &ctx).unwrap_err();
    let ExpressionError::Eval(EvalError::HostInvocationFailed { member, source }) = err else {
        panic!("expected host failure");
    };
    assert_eq!(member, "Fail");
    assert_eq!(source.to_string(), "customer service unavailable");

    assert!(matches!(
        engine.eval("customer[0]", &ctx).unwrap_err(),
        ExpressionError::Eval(EvalError::NotIndexable { .. })
    ));
    assert!(matches!(
        engine.eval("customer.Name()", &ctx).unwrap_err(),
        ExpressionError::Eval(EvalError::NotCallable { .. })
    ));
}

#[test]
fn test_host_object_identity() {
    let ctx = customer_context();
    let engine = engine();

    assert_eq!(engine.eval("1 === customer", &ctx).unwrap(), Value::boolean(false));
    assert_eq!(engine.eval("customer === customer", &ctx).unwrap(), Value::boolean(true));
    assert_eq!(engine.eval("customer == customer", &ctx).unwrap(), Value::boolean(true));
    assert_eq!(engine.eval(r#""===" + customer"#, &ctx).unwrap(), Value::text("===Customer"));
}

#[test]
fn test_callable_returning_callable() {
    let inner = NativeFunction::new("inner", |_| Ok(Value::boolean(true)));
    let outer = NativeFunction::new("GetDelegNoParam", move |_| Ok(inner.clone().into_value()));
    let ctx = VariableContext::builder()
        .var("testObj", Value::mapping([(Value::text("GetDelegNoParam"), outer.into_value())]))
        .build();

    let result = ExpressionEngine::new().eval("testObj.GetDelegNoParam()()", &ctx).unwrap();
    assert_eq!(result, Value::boolean(true));
}

#[test]
fn test_native_function_in_context() {
    let not = NativeFunction::new("NOT", |args| {
        Ok(Value::boolean(!args.first().is_some_and(Value::is_truthy)))
    });
    let ctx = VariableContext::builder().var("NOT", not).build();

    let result = ExpressionEngine::new().eval("NOT(NOT(1==1))", &ctx).unwrap();
    assert_eq!(result, Value::boolean(true));
}

#[test]
fn test_call_evaluation_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&log);
    let record = NativeFunction::new("log", move |args| {
        let value = args.first().cloned().unwrap_or_default();
        recorder.lock().unwrap().push(value.to_string());
        Ok(value)
    });
    let ctx = VariableContext::builder().var("log", record).build();

    let result = ExpressionEngine::new()
        .eval(r#"log("banana").Replace(log("a"), log("o"))"#, &ctx)
        .unwrap();

    assert_eq!(result, Value::text("bonono"));
    assert_eq!(*log.lock().unwrap(), vec!["banana", "a", "o"]);
}

#[test]
fn test_normalizer_unwraps_host_values() {
    let engine = ExpressionEngine::builder()
        .normalizer(|value| {
            value
                .as_handle()
                .and_then(|h| h.downcast_ref::<Wrapped>())
                .map(|w| w.0.clone())
        })
        .build();
    let ctx = VariableContext::builder()
        .var("w", Value::host_object(Wrapped(Value::integer(5))))
        .build();

    assert_eq!(engine.eval("w == 5", &ctx).unwrap(), Value::boolean(true));
    assert_eq!(engine.eval("w > 4", &ctx).unwrap(), Value::boolean(true));
    assert_eq!(engine.eval("w === 5", &ctx).unwrap(), Value::boolean(true));
    assert_eq!(engine.eval(r#"w === "5""#, &ctx).unwrap(), Value::boolean(false));
}
