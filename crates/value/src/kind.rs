//! Value kinds
//!
//! `ValueKind` is a lightweight classification of a [`Value`](crate::Value),
//! used for error messages, builtin dispatch and the comparer's
//! type-compatibility rules.

use core::fmt::{Display, Formatter};

/// Represents the kind/type of a Value
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    /// Absence of a value
    Null,
    /// `true` / `false`
    Boolean,
    /// Decimal number
    Number,
    /// UTF-8 text
    Text,
    /// Naive calendar timestamp
    DateTime,
    /// Signed time span
    Duration,
    /// Ordered list
    Sequence,
    /// Insertion-ordered map
    Mapping,
    /// Host delegate
    Callable,
    /// Opaque host reference
    HostObject,
}

impl ValueKind {
    /// Human-readable name used in diagnostics
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Text => "text",
            Self::DateTime => "datetime",
            Self::Duration => "duration",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Callable => "callable",
            Self::HostObject => "object",
        }
    }

    /// Kinds with a natural total ordering among their own values
    pub const fn has_natural_order(&self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Number | Self::Text | Self::DateTime | Self::Duration
        )
    }

    /// Opaque host kinds, reachable only through a host resolver
    pub const fn is_host(&self) -> bool {
        matches!(self, Self::Callable | Self::HostObject)
    }

    /// Check if this kind is a collection
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Sequence | Self::Mapping)
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_order() {
        assert!(ValueKind::Number.has_natural_order());
        assert!(ValueKind::Duration.has_natural_order());
        assert!(!ValueKind::Sequence.has_natural_order());
        assert!(!ValueKind::HostObject.has_natural_order());
    }

    #[test]
    fn test_names() {
        assert_eq!(ValueKind::HostObject.to_string(), "object");
        assert_eq!(ValueKind::Mapping.name(), "mapping");
        assert!(ValueKind::Callable.is_host());
        assert!(ValueKind::Sequence.is_collection());
    }
}
