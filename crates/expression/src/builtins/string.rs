//! Text members
//!
//! Positions and lengths count characters, not bytes.

use formula_value::Value;

use super::{ArgumentError, check_arg_count, check_arg_range, get_index_arg, get_text_arg, index_value};
use crate::host::HostResult;

fn text(target: &Value) -> &str {
    target.as_text().unwrap_or_default()
}

/// Number of characters
pub fn length(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(text(target).chars().count()))
}

/// `Substring(start)` or `Substring(start, length)`
pub fn substring(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_range("Substring", args, 1, 2)?;
    let s = text(target);
    let char_count = s.chars().count();

    let start = get_index_arg("Substring", args, 0)?;
    if start > char_count {
        return Err(ArgumentError::new(
            "Substring",
            format!("start index {start} is past the end of a text of length {char_count}"),
        )
        .into());
    }

    let len = if args.len() == 2 {
        let len = get_index_arg("Substring", args, 1)?;
        if len > char_count - start {
            return Err(ArgumentError::new(
                "Substring",
                format!("length {len} from index {start} exceeds a text of length {char_count}"),
            )
            .into());
        }
        len
    } else {
        char_count - start
    };

    Ok(Value::text(s.chars().skip(start).take(len).collect::<String>()))
}

/// Check whether the text contains a substring
pub fn contains(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_count("Contains", args, 1)?;
    let needle = get_text_arg("Contains", args, 0)?;
    Ok(Value::boolean(text(target).contains(needle)))
}

/// Check whether the text starts with a prefix
pub fn starts_with(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_count("StartsWith", args, 1)?;
    let prefix = get_text_arg("StartsWith", args, 0)?;
    Ok(Value::boolean(text(target).starts_with(prefix)))
}

/// Check whether the text ends with a suffix
pub fn ends_with(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_count("EndsWith", args, 1)?;
    let suffix = get_text_arg("EndsWith", args, 0)?;
    Ok(Value::boolean(text(target).ends_with(suffix)))
}

/// Character position of the first occurrence, or -1
pub fn index_of(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_count("IndexOf", args, 1)?;
    let needle = get_text_arg("IndexOf", args, 0)?;
    let s = text(target);
    let position = s.find(needle).map(|byte| s[..byte].chars().count());
    Ok(index_value(position))
}

/// Convert to uppercase
pub fn to_upper(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_count("ToUpper", args, 0)?;
    Ok(Value::text(text(target).to_uppercase()))
}

/// Convert to lowercase
pub fn to_lower(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_count("ToLower", args, 0)?;
    Ok(Value::text(text(target).to_lowercase()))
}

/// Trim whitespace from both ends
pub fn trim(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_count("Trim", args, 0)?;
    Ok(Value::text(text(target).trim()))
}

/// Replace every occurrence of a substring
pub fn replace(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_count("Replace", args, 2)?;
    let from = get_text_arg("Replace", args, 0)?;
    let to = get_text_arg("Replace", args, 1)?;
    if from.is_empty() {
        return Err(ArgumentError::new("Replace", "text to replace must not be empty").into());
    }
    Ok(Value::text(text(target).replace(from, to)))
}
