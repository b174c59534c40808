//! The runtime value
//!
//! [`Value`] is what every evaluation produces and what variable contexts
//! hold. Numbers are always decimals, so `0.1 + 0.2 == 0.3` holds exactly.

use std::hash::{Hash, Hasher};

use chrono::{NaiveDateTime, TimeDelta};
use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::handle::HostHandle;
use crate::kind::ValueKind;

/// Insertion-ordered mapping produced by dictionary literals
pub type Mapping = IndexMap<Value, Value>;

/// A runtime value of the expression language
///
/// Equality here is structural (`Number(1.0) == Number(1)`, sequences
/// element-wise, mappings entry-wise) and identity-based for host handles.
/// It never coerces across kinds; cross-type rules live in
/// [`ValueComparer`](crate::ValueComparer).
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absence of a value
    #[default]
    Null,

    /// Boolean value
    Boolean(bool),

    /// Arbitrary precision decimal
    Number(Decimal),

    /// UTF-8 text string
    Text(String),

    /// Naive calendar timestamp
    DateTime(NaiveDateTime),

    /// Signed time span
    Duration(TimeDelta),

    /// Ordered list of values
    Sequence(Vec<Value>),

    /// Ordered key/value map
    Mapping(Mapping),

    /// Host delegate, invoked through the host resolver
    Callable(HostHandle),

    /// Opaque host object, accessed through the host resolver
    HostObject(HostHandle),
}

impl Value {
    // ==================== Constructors ====================

    /// Create a null value
    pub const fn null() -> Self {
        Self::Null
    }

    /// Create a boolean value
    pub const fn boolean(v: bool) -> Self {
        Self::Boolean(v)
    }

    /// Create a number value
    pub const fn number(v: Decimal) -> Self {
        Self::Number(v)
    }

    /// Create a number value from an integer
    pub fn integer(v: i64) -> Self {
        Self::Number(Decimal::from(v))
    }

    /// Create a text value from String or &str
    pub fn text(v: impl Into<String>) -> Self {
        Self::Text(v.into())
    }

    /// Create a datetime value
    pub const fn datetime(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }

    /// Create a duration value
    pub const fn duration(v: TimeDelta) -> Self {
        Self::Duration(v)
    }

    /// Create a sequence value
    pub fn sequence(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Sequence(items.into_iter().collect())
    }

    /// Create a mapping value, keeping the iteration order of `entries`
    pub fn mapping(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self::Mapping(entries.into_iter().collect())
    }

    /// Wrap a host delegate
    pub const fn callable(handle: HostHandle) -> Self {
        Self::Callable(handle)
    }

    /// Wrap an arbitrary host object
    pub fn host_object<T: std::any::Any + Send + Sync>(value: T) -> Self {
        Self::HostObject(HostHandle::new(value))
    }

    // ==================== Classification ====================

    /// Kind of this value
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Number(_) => ValueKind::Number,
            Self::Text(_) => ValueKind::Text,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Duration(_) => ValueKind::Duration,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Mapping(_) => ValueKind::Mapping,
            Self::Callable(_) => ValueKind::Callable,
            Self::HostObject(_) => ValueKind::HostObject,
        }
    }

    /// Name used in diagnostics; host handles report their own type name
    pub fn type_name(&self) -> &str {
        match self {
            Self::Callable(h) | Self::HostObject(h) => h.type_name(),
            other => other.kind().name(),
        }
    }

    /// Check if value is null
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Truthiness used by conditions and logical operators
    ///
    /// Booleans are themselves, null is false, numbers are true when
    /// nonzero, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Number(n) => !n.is_zero(),
            _ => true,
        }
    }

    // ==================== Accessors ====================

    /// Get boolean if this is a boolean
    pub const fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get number if this is a number
    pub const fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get text if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get datetime if this is a datetime
    pub const fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Get duration if this is a duration
    pub const fn as_duration(&self) -> Option<TimeDelta> {
        match self {
            Self::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Get items if this is a sequence
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Get entries if this is a mapping
    pub const fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Get the host handle of a callable or host object
    pub const fn as_handle(&self) -> Option<&HostHandle> {
        match self {
            Self::Callable(h) | Self::HostObject(h) => Some(h),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Mapping(a), Self::Mapping(b)) => a == b,
            (Self::Callable(a), Self::Callable(b)) | (Self::HostObject(a), Self::HostObject(b)) => {
                a.ptr_eq(b)
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Boolean(b) => b.hash(state),
            // Decimal hashes its normalized form, so 1.0 and 1 collide as required
            Self::Number(n) => n.hash(state),
            Self::Text(s) => s.hash(state),
            Self::DateTime(dt) => dt.hash(state),
            Self::Duration(d) => d.hash(state),
            Self::Sequence(items) => items.hash(state),
            // mapping equality ignores order, so only the size is hashed
            Self::Mapping(map) => map.len().hash(state),
            Self::Callable(h) | Self::HostObject(h) => h.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::boolean(false).is_truthy());
        assert!(Value::boolean(true).is_truthy());
        assert!(!Value::integer(0).is_truthy());
        assert!(Value::number(Decimal::from_str("0.5").unwrap()).is_truthy());
        assert!(Value::text("").is_truthy());
        assert!(Value::sequence([]).is_truthy());
    }

    #[test]
    fn test_number_equality_ignores_scale() {
        let a = Value::number(Decimal::from_str("1.00").unwrap());
        let b = Value::integer(1);
        assert_eq!(a, b);

        let mut map = Mapping::new();
        map.insert(a, Value::text("one"));
        assert_eq!(map.get(&b), Some(&Value::text("one")));
    }

    #[test]
    fn test_no_cross_kind_equality() {
        assert_ne!(Value::text("1"), Value::integer(1));
        assert_ne!(Value::boolean(true), Value::integer(1));
    }

    #[test]
    fn test_mapping_keeps_insertion_order() {
        let map = Value::mapping([
            (Value::text("b"), Value::integer(2)),
            (Value::text("a"), Value::integer(1)),
        ]);
        let keys: Vec<_> = map.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec![Value::text("b"), Value::text("a")]);
    }

    #[test]
    fn test_host_identity() {
        let obj = Value::host_object(42_u32);
        assert_eq!(obj, obj.clone());
        assert_ne!(obj, Value::host_object(42_u32));
        assert_eq!(obj.kind(), ValueKind::HostObject);
        assert_eq!(obj.type_name(), "u32");
    }
}
