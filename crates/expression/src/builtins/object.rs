//! Mapping members

use formula_value::Value;

use super::check_arg_count;
use crate::host::HostResult;

/// Number of entries
pub fn count(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(target.as_mapping().map_or(0, |m| m.len())))
}

/// Keys in insertion order
pub fn keys(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(target
        .as_mapping()
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_else(|| Value::sequence([])))
}

/// Values in insertion order
pub fn values(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(target
        .as_mapping()
        .map(|m| m.values().cloned().collect())
        .unwrap_or_else(|| Value::sequence([])))
}

/// Check whether a key is present
pub fn contains_key(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_count("ContainsKey", args, 1)?;
    let found = target.as_mapping().is_some_and(|m| m.contains_key(&args[0]));
    Ok(Value::boolean(found))
}
