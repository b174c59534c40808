//! Cross-type comparison
//!
//! [`ValueComparer`] orders any two values. Rules are applied in a fixed
//! order, the first that applies decides:
//!
//! 1. nulls, per [`NullComparisonMode`]
//! 2. sequence vs sequence: length, then element-wise
//! 3. boolean vs anything: the other side is `true` iff it is `"1"` or `1`
//! 4. both numeric-looking (numbers or decimal text): decimal comparison
//! 5. one numeric-looking, other text: ordinal text comparison
//! 6. same orderable kind: natural order; otherwise convert one side into
//!    the other's kind, and if neither converts the left sorts first
//! 7. anything else: compare the stringified forms
//!
//! A comparison may be indeterminate (`Ok(None)`), which expressions see as
//! `null`.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ComparisonError, ComparisonResult};
use crate::number::{NumberFormat, is_decimal_text, parse_decimal_text};
use crate::value::Value;

/// Maps a wrapped host value to the plain value it stands for
///
/// Returning `None` leaves the value unchanged.
pub type Normalizer = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// How comparisons involving null behave
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullComparisonMode {
    /// Null sorts below every value and equals only itself
    #[default]
    MinValue,
    /// Any comparison touching null is indeterminate
    Sql,
}

/// Configuration for [`ValueComparer`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparerOptions {
    /// Null handling mode
    pub null_comparison: NullComparisonMode,
    /// Turn comparison errors into indeterminate results
    pub suppress_errors: bool,
    /// Format used for text/number conversions
    pub number_format: NumberFormat,
}

impl ComparerOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the null comparison mode
    #[must_use]
    pub const fn with_null_comparison(mut self, mode: NullComparisonMode) -> Self {
        self.null_comparison = mode;
        self
    }

    /// Enable or disable error suppression
    #[must_use]
    pub const fn with_suppress_errors(mut self, suppress: bool) -> Self {
        self.suppress_errors = suppress;
        self
    }

    /// Set the number format
    #[must_use]
    pub const fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }
}

/// Cross-type ordering and equality engine
///
/// Cheap to clone; an engine builds one from its configuration and shares it
/// across evaluations.
#[derive(Clone, Default)]
pub struct ValueComparer {
    options: ComparerOptions,
    normalizer: Option<Normalizer>,
}

impl fmt::Debug for ValueComparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueComparer")
            .field("options", &self.options)
            .field("normalizer", &self.normalizer.is_some())
            .finish()
    }
}

impl ValueComparer {
    /// Create a comparer with the given options
    pub fn new(options: ComparerOptions) -> Self {
        Self {
            options,
            normalizer: None,
        }
    }

    /// Register a normalizer applied to both operands before comparing
    #[must_use]
    pub fn with_normalizer<F>(mut self, normalizer: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.normalizer = Some(Arc::new(normalizer));
        self
    }

    /// Register an already shared normalizer
    #[must_use]
    pub fn with_shared_normalizer(mut self, normalizer: Option<Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Get the options
    pub const fn options(&self) -> &ComparerOptions {
        &self.options
    }

    /// Order `a` relative to `b`
    ///
    /// `Ok(None)` means indeterminate. Errors are only returned when
    /// suppression is off.
    pub fn compare(&self, a: &Value, b: &Value) -> ComparisonResult<Option<Ordering>> {
        match self.compare_values(a, b) {
            Err(error) if self.options.suppress_errors => {
                debug!(%error, left = a.type_name(), right = b.type_name(), "comparison error suppressed");
                Ok(None)
            }
            result => result,
        }
    }

    /// Loose equality: `compare == Equal`, indeterminate stays `None`
    pub fn equals(&self, a: &Value, b: &Value) -> ComparisonResult<Option<bool>> {
        Ok(self.compare(a, b)?.map(|ord| ord == Ordering::Equal))
    }

    /// Equality after normalization with no cross-kind coercion
    pub fn exact_equals(&self, a: &Value, b: &Value) -> bool {
        *self.normalize(a) == *self.normalize(b)
    }

    fn normalize<'v>(&self, value: &'v Value) -> Cow<'v, Value> {
        match &self.normalizer {
            Some(normalizer) => normalizer(value).map_or(Cow::Borrowed(value), Cow::Owned),
            None => Cow::Borrowed(value),
        }
    }

    fn compare_values(&self, a: &Value, b: &Value) -> ComparisonResult<Option<Ordering>> {
        let a = self.normalize(a);
        let b = self.normalize(b);
        let (a, b) = (a.as_ref(), b.as_ref());

        if a.is_null() || b.is_null() {
            return Ok(self.compare_nulls(a, b));
        }

        if let (Value::Sequence(left), Value::Sequence(right)) = (a, b) {
            return self.compare_sequences(left, right);
        }

        match (a, b) {
            (Value::Boolean(left), Value::Boolean(right)) => return Ok(Some(left.cmp(right))),
            (Value::Boolean(left), other) => return Ok(Some(left.cmp(&coerce_bool(other)))),
            (other, Value::Boolean(right)) => return Ok(Some(coerce_bool(other).cmp(right))),
            _ => {}
        }

        let format = &self.options.number_format;
        match (is_numeric_like(a), is_numeric_like(b)) {
            (true, true) => {
                let left = numeric_operand(a)?;
                let right = numeric_operand(b)?;
                return Ok(Some(left.cmp(&right)));
            }
            (true, false) if is_text(b) => {
                return Ok(Some(a.to_text(format).cmp(&b.to_text(format))));
            }
            (false, true) if is_text(a) => {
                return Ok(Some(a.to_text(format).cmp(&b.to_text(format))));
            }
            _ => {}
        }

        if let Some(ord) = natural_order(a, b) {
            return Ok(Some(ord));
        }

        if a.kind().has_natural_order() || b.kind().has_natural_order() {
            if let Some(converted) = b.convert_to(a.kind(), format) {
                return Ok(natural_order(a, &converted));
            }
            if let Some(converted) = a.convert_to(b.kind(), format) {
                return Ok(natural_order(&converted, b));
            }
            return Ok(Some(Ordering::Less));
        }

        Ok(Some(lexical_order(a, b)))
    }

    fn compare_nulls(&self, a: &Value, b: &Value) -> Option<Ordering> {
        match self.options.null_comparison {
            NullComparisonMode::Sql => None,
            NullComparisonMode::MinValue => Some(match (a.is_null(), b.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                _ => Ordering::Greater,
            }),
        }
    }

    fn compare_sequences(&self, left: &[Value], right: &[Value]) -> ComparisonResult<Option<Ordering>> {
        if left.len() != right.len() {
            return Ok(Some(left.len().cmp(&right.len())));
        }
        for (l, r) in left.iter().zip(right) {
            match self.compare_values(l, r)? {
                Some(Ordering::Equal) => {}
                decided => return Ok(decided),
            }
        }
        Ok(Some(Ordering::Equal))
    }
}

/// Boolean view of a non-boolean operand: only `"1"` and `1` are true
fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Text(s) => s == "1",
        Value::Number(n) => *n == Decimal::ONE,
        _ => false,
    }
}

const fn is_text(value: &Value) -> bool {
    matches!(value, Value::Text(_))
}

fn is_numeric_like(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::Text(s) => is_decimal_text(s),
        _ => false,
    }
}

fn numeric_operand(value: &Value) -> ComparisonResult<Decimal> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Text(s) => {
            parse_decimal_text(s).ok_or_else(|| ComparisonError::decimal_out_of_range(s.as_str()))
        }
        // callers only pass numeric-like values
        other => Err(ComparisonError::decimal_out_of_range(other.to_string())),
    }
}

/// Ordering between two values of the same kind, if that kind is ordered
///
/// Mappings and host handles only answer when they are equal.
fn natural_order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Boolean(x), Value::Boolean(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => Some(x.cmp(y)),
        (Value::Text(x), Value::Text(y)) => Some(x.as_str().cmp(y.as_str())),
        (Value::DateTime(x), Value::DateTime(y)) => Some(x.cmp(y)),
        (Value::Duration(x), Value::Duration(y)) => Some(x.cmp(y)),
        (Value::Mapping(x), Value::Mapping(y)) if x == y => Some(Ordering::Equal),
        (Value::Callable(x), Value::Callable(y)) | (Value::HostObject(x), Value::HostObject(y))
            if x.ptr_eq(y) =>
        {
            Some(Ordering::Equal)
        }
        _ => None,
    }
}

/// Last resort: stringified comparison, handle address as tiebreak
fn lexical_order(a: &Value, b: &Value) -> Ordering {
    a.to_string().cmp(&b.to_string()).then_with(|| match (a.as_handle(), b.as_handle()) {
        (Some(x), Some(y)) => x.addr().cmp(&y.addr()),
        _ => Ordering::Equal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HostHandle;
    use chrono::{NaiveDate, TimeDelta};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::str::FromStr;

    fn cmp(a: &Value, b: &Value) -> Option<Ordering> {
        ValueComparer::default().compare(a, b).unwrap()
    }

    fn dec(s: &str) -> Value {
        Value::number(Decimal::from_str(s).unwrap())
    }

    #[rstest]
    #[case(Value::Null, Value::Null, Some(Ordering::Equal))]
    #[case(Value::Null, Value::integer(0), Some(Ordering::Less))]
    #[case(Value::text(""), Value::Null, Some(Ordering::Greater))]
    fn test_min_value_nulls(#[case] a: Value, #[case] b: Value, #[case] expected: Option<Ordering>) {
        assert_eq!(cmp(&a, &b), expected);
    }

    #[test]
    fn test_sql_nulls_are_indeterminate() {
        let comparer =
            ValueComparer::new(ComparerOptions::new().with_null_comparison(NullComparisonMode::Sql));
        assert_eq!(comparer.compare(&Value::Null, &Value::Null).unwrap(), None);
        assert_eq!(comparer.compare(&Value::integer(1), &Value::Null).unwrap(), None);
        assert_eq!(comparer.equals(&Value::Null, &Value::integer(1)).unwrap(), None);
    }

    #[rstest]
    #[case(Value::boolean(true), Value::integer(1), Some(Ordering::Equal))]
    #[case(Value::text("1"), Value::boolean(true), Some(Ordering::Equal))]
    #[case(Value::boolean(true), Value::text("true"), Some(Ordering::Greater))]
    #[case(Value::boolean(false), Value::integer(2), Some(Ordering::Equal))]
    #[case(Value::boolean(false), Value::boolean(true), Some(Ordering::Less))]
    fn test_boolean_coercion(#[case] a: Value, #[case] b: Value, #[case] expected: Option<Ordering>) {
        assert_eq!(cmp(&a, &b), expected);
    }

    #[rstest]
    #[case(Value::text("10"), Value::integer(9), Ordering::Greater)]
    #[case(Value::text("2.50"), dec("2.5"), Ordering::Equal)]
    #[case(Value::text("-1"), Value::text("+1"), Ordering::Less)]
    #[case(Value::text("abc"), Value::integer(5), Ordering::Greater)]
    #[case(Value::integer(10), Value::text("9x"), Ordering::Less)]
    fn test_numeric_and_lexical(#[case] a: Value, #[case] b: Value, #[case] expected: Ordering) {
        assert_eq!(cmp(&a, &b), Some(expected));
    }

    #[test]
    fn test_out_of_range_numeric_text() {
        let huge = Value::text("9".repeat(40));
        let err = ValueComparer::default().compare(&huge, &Value::integer(1)).unwrap_err();
        assert!(matches!(err, ComparisonError::DecimalOutOfRange { .. }));

        let suppressing = ValueComparer::new(ComparerOptions::new().with_suppress_errors(true));
        assert_eq!(suppressing.compare(&huge, &Value::integer(1)).unwrap(), None);
    }

    #[test]
    fn test_sequences() {
        let a = Value::sequence([Value::integer(1), Value::integer(2)]);
        let b = Value::sequence([Value::integer(1), Value::integer(3)]);
        let c = Value::sequence([Value::integer(1)]);
        let d = Value::sequence([Value::text("1"), Value::text("2")]);

        assert_eq!(cmp(&a, &a.clone()), Some(Ordering::Equal));
        assert_eq!(cmp(&a, &b), Some(Ordering::Less));
        assert_eq!(cmp(&c, &a), Some(Ordering::Less));
        assert_eq!(cmp(&a, &d), Some(Ordering::Equal));
    }

    #[test]
    fn test_temporal_and_conversion() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let later = day + TimeDelta::hours(1);

        assert_eq!(cmp(&Value::datetime(day), &Value::datetime(later)), Some(Ordering::Less));
        assert_eq!(cmp(&Value::datetime(day), &Value::text("2024-05-01")), Some(Ordering::Equal));
        assert_eq!(
            cmp(&Value::duration(TimeDelta::hours(2)), &Value::text("01:00:00")),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_unconvertible_kinds_order_left_first() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(cmp(&Value::integer(1), &Value::datetime(day)), Some(Ordering::Less));
        assert_eq!(cmp(&Value::datetime(day), &Value::integer(1)), Some(Ordering::Less));
    }

    #[rstest]
    #[case(Value::text("5"))]
    #[case(Value::text("x"))]
    fn test_numeric_text_rule_needs_text_on_other_side(#[case] text: Value) {
        let seq = Value::sequence([Value::integer(1)]);
        let obj = Value::host_object(7_i32);
        assert_eq!(cmp(&seq, &text), Some(Ordering::Less));
        assert_eq!(cmp(&obj, &text), Some(Ordering::Less));
        assert_eq!(cmp(&text, &seq), Some(Ordering::Less));
    }

    #[test]
    fn test_host_handles() {
        let handle = HostHandle::named(1_u8, "Thing");
        let a = Value::HostObject(handle.clone());
        let b = Value::HostObject(handle);
        let c = Value::HostObject(HostHandle::named(1_u8, "Thing"));

        assert_eq!(cmp(&a, &b), Some(Ordering::Equal));
        assert_ne!(cmp(&a, &c), Some(Ordering::Equal));
        assert_eq!(cmp(&a, &c).map(Ordering::reverse), cmp(&c, &a));
    }

    #[test]
    fn test_exact_equals() {
        let comparer = ValueComparer::default();
        assert!(comparer.exact_equals(&Value::integer(1), &dec("1.0")));
        assert!(!comparer.exact_equals(&Value::integer(1), &Value::text("1")));
        assert!(!comparer.exact_equals(&Value::integer(1), &Value::host_object(1_i32)));
    }

    #[test]
    fn test_normalizer_unwraps() {
        struct Wrapper(i64);

        let comparer = ValueComparer::default().with_normalizer(|value| {
            value
                .as_handle()
                .and_then(|h| h.downcast_ref::<Wrapper>())
                .map(|w| Value::integer(w.0))
        });
        let wrapped = Value::host_object(Wrapper(5));

        assert_eq!(comparer.equals(&wrapped, &Value::integer(5)).unwrap(), Some(true));
        assert!(comparer.exact_equals(&wrapped, &Value::integer(5)));
    }
}
