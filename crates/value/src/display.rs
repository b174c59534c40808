//! Display implementation for Value
//!
//! `Display` is the language's stringification: it is what `"a" + x`
//! concatenates and what the comparer uses for lexical fallbacks.

use std::fmt;

use crate::temporal::{format_datetime, format_duration};
use crate::value::Value;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),

            Value::Boolean(b) => write!(f, "{b}"),

            Value::Number(n) => write!(f, "{n}"),

            Value::Text(s) => f.write_str(s),

            Value::DateTime(dt) => f.write_str(&format_datetime(dt)),

            Value::Duration(d) => f.write_str(&format_duration(d)),

            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }

            Value::Mapping(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }

            Value::Callable(h) | Value::HostObject(h) => f.write_str(h.type_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_scalars() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::boolean(true).to_string(), "true");
        assert_eq!(Value::integer(-4).to_string(), "-4");
        assert_eq!(Value::number(Decimal::from_str("2.50").unwrap()).to_string(), "2.50");
        assert_eq!(Value::text("hi").to_string(), "hi");
    }

    #[test]
    fn test_temporal() {
        let dt = NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(Value::datetime(dt).to_string(), "2020-01-02 03:04:05");
        assert_eq!(Value::duration(TimeDelta::minutes(1)).to_string(), "00:01:00");
    }

    #[test]
    fn test_collections() {
        let seq = Value::sequence([Value::integer(1), Value::text("a"), Value::Null]);
        assert_eq!(seq.to_string(), "[1, a, ]");

        let map = Value::mapping([(Value::text("k"), Value::boolean(false))]);
        assert_eq!(map.to_string(), "{k: false}");
    }

    #[test]
    fn test_host_handle() {
        let obj = Value::HostObject(crate::HostHandle::named((), "Customer"));
        assert_eq!(obj.to_string(), "Customer");
    }
}
