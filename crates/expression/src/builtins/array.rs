//! Sequence members

use formula_value::Value;

use super::{check_arg_count, index_value};
use crate::host::HostResult;

fn items(target: &Value) -> &[Value] {
    target.as_sequence().unwrap_or_default()
}

/// Number of elements (`Length` and `Count`)
pub fn count(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(items(target).len()))
}

/// Check whether an element is present
pub fn contains(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_count("Contains", args, 1)?;
    Ok(Value::boolean(items(target).contains(&args[0])))
}

/// Position of the first equal element, or -1
pub fn index_of(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_count("IndexOf", args, 1)?;
    let position = items(target).iter().position(|item| item == &args[0]);
    Ok(index_value(position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_members() {
        let seq = Value::sequence([Value::integer(1), Value::text("a")]);
        assert_eq!(count(&seq, &[]).unwrap(), Value::integer(2));
        assert_eq!(contains(&seq, &[Value::text("a")]).unwrap(), Value::boolean(true));
        // no coercion: 1 and "1" are different elements
        assert_eq!(contains(&seq, &[Value::text("1")]).unwrap(), Value::boolean(false));
        assert_eq!(index_of(&seq, &[Value::text("a")]).unwrap(), Value::integer(1));
        assert_eq!(index_of(&seq, &[Value::Null]).unwrap(), Value::integer(-1));
        assert!(contains(&seq, &[]).is_err());
    }
}
