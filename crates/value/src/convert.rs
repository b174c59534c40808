//! Conversions into and between values
//!
//! `From` impls let hosts build contexts from plain Rust data. The
//! [`Value::convert_to`] family is the kind-to-kind conversion the comparer
//! falls back to when two operands have different kinds.

use chrono::{NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;

use crate::kind::ValueKind;
use crate::number::NumberFormat;
use crate::temporal::{parse_datetime, parse_duration};
use crate::value::{Mapping, Value};

impl Value {
    /// Convert this value into `target` kind, if a conversion exists
    ///
    /// Supported conversions:
    /// - any value to its own kind (clone)
    /// - text to number (via `format`), boolean (`true`/`false`, any case),
    ///   datetime and duration
    /// - number, boolean, datetime and duration to text
    /// - boolean to number (`1`/`0`) and number to boolean (nonzero)
    pub fn convert_to(&self, target: ValueKind, format: &NumberFormat) -> Option<Value> {
        if self.kind() == target {
            return Some(self.clone());
        }

        match (self, target) {
            (Value::Text(s), ValueKind::Number) => format.parse(s).map(Value::Number),
            (Value::Text(s), ValueKind::Boolean) => parse_bool(s).map(Value::Boolean),
            (Value::Text(s), ValueKind::DateTime) => parse_datetime(s).map(Value::DateTime),
            (Value::Text(s), ValueKind::Duration) => parse_duration(s).map(Value::Duration),

            (Value::Number(n), ValueKind::Text) => Some(Value::Text(format.format(n))),
            (Value::Number(n), ValueKind::Boolean) => Some(Value::Boolean(!n.is_zero())),

            (Value::Boolean(b), ValueKind::Number) => {
                Some(Value::Number(if *b { Decimal::ONE } else { Decimal::ZERO }))
            }
            (Value::Boolean(_) | Value::DateTime(_) | Value::Duration(_), ValueKind::Text) => {
                Some(Value::Text(self.to_string()))
            }

            _ => None,
        }
    }

    /// Render this value as text, honoring the number format for numbers
    pub fn to_text(&self, format: &NumberFormat) -> String {
        match self {
            Value::Number(n) => format.format(n),
            other => other.to_string(),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// ==================== From implementations ====================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Number(v)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Number(Decimal::from(v))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<TimeDelta> for Value {
    fn from(v: TimeDelta) -> Self {
        Value::Duration(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Sequence(v)
    }
}

impl From<Mapping> for Value {
    fn from(v: Mapping) -> Self {
        Value::Mapping(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Sequence(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_text_to_number_uses_format() {
        let invariant = NumberFormat::invariant();
        let german = NumberFormat::new(',', Some('.'));

        assert_eq!(
            Value::text("1,5").convert_to(ValueKind::Number, &german),
            Some(Value::number(dec("1.5")))
        );
        assert_eq!(
            Value::text("1,500").convert_to(ValueKind::Number, &invariant),
            Some(Value::integer(1500))
        );
        assert_eq!(Value::text("x").convert_to(ValueKind::Number, &invariant), None);
    }

    #[test]
    fn test_bool_conversions() {
        let fmt = NumberFormat::default();
        assert_eq!(
            Value::text("TRUE").convert_to(ValueKind::Boolean, &fmt),
            Some(Value::boolean(true))
        );
        assert_eq!(
            Value::boolean(true).convert_to(ValueKind::Number, &fmt),
            Some(Value::integer(1))
        );
        assert_eq!(
            Value::integer(0).convert_to(ValueKind::Boolean, &fmt),
            Some(Value::boolean(false))
        );
    }

    #[test]
    fn test_unsupported_conversion() {
        let fmt = NumberFormat::default();
        assert_eq!(Value::sequence([]).convert_to(ValueKind::Number, &fmt), None);
        assert_eq!(Value::Null.convert_to(ValueKind::Text, &fmt), None);
        assert_eq!(
            Value::integer(3).convert_to(ValueKind::Number, &fmt),
            Some(Value::integer(3))
        );
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(Value::from(5_u8), Value::integer(5));
        assert_eq!(Value::from("a"), Value::text("a"));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(
            [1, 2].into_iter().map(Value::from).collect::<Value>(),
            Value::sequence([Value::integer(1), Value::integer(2)])
        );
    }
}
