//! Built-in members of built-in values
//!
//! Text, sequences, mappings, date/times, durations, numbers and booleans
//! expose a small set of properties and methods (`s.Length`,
//! `s.Substring(1, 2)`, `d.AddDays(1)`, ...). They are registered in a
//! [`MemberRegistry`] keyed by value kind and member name, which the default
//! [`HostResolver`](crate::HostResolver) methods consult.

pub mod array;
pub mod datetime;
pub mod object;
pub mod string;

use std::collections::HashMap;
use std::sync::LazyLock;

use formula_value::number::decimal_to_index;
use formula_value::{Decimal, Value, ValueKind};
use thiserror::Error;

use crate::host::{HostError, HostResult};

/// Signature of a built-in member
///
/// Receives the target value and the call arguments (empty for properties).
pub type BuiltinMember = fn(&Value, &[Value]) -> HostResult<Value>;

/// Whether a member is read (`x.Name`) or called (`x.Name(...)`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Read without parentheses
    Property,
    /// Invoked with an argument list
    Method,
}

#[derive(Clone, Copy)]
struct Member {
    kind: MemberKind,
    func: BuiltinMember,
}

/// Invalid arguments passed to a built-in member
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{member}: {message}")]
pub struct ArgumentError {
    /// Member name
    pub member: &'static str,
    /// What was wrong
    pub message: String,
}

impl ArgumentError {
    /// Create an argument error
    pub fn new(member: &'static str, message: impl Into<String>) -> Self {
        Self {
            member,
            message: message.into(),
        }
    }
}

impl From<ArgumentError> for HostError {
    fn from(e: ArgumentError) -> Self {
        HostError::failed(e)
    }
}

static REGISTRY: LazyLock<MemberRegistry> = LazyLock::new(MemberRegistry::new);

/// The shared registry of built-in members
pub fn registry() -> &'static MemberRegistry {
    &REGISTRY
}

/// Registry of built-in members, keyed by value kind and member name
pub struct MemberRegistry {
    members: HashMap<ValueKind, HashMap<&'static str, Member>>,
}

impl MemberRegistry {
    /// Create a new registry with all standard members
    pub fn new() -> Self {
        let mut registry = Self {
            members: HashMap::new(),
        };

        registry.register_text_members();
        registry.register_sequence_members();
        registry.register_mapping_members();
        registry.register_datetime_members();
        registry.register_duration_members();

        registry.register_method(ValueKind::Number, "ToString", to_string);
        registry.register_method(ValueKind::Boolean, "ToString", to_string);

        registry
    }

    /// Register a property
    pub fn register_property(&mut self, kind: ValueKind, name: &'static str, func: BuiltinMember) {
        self.insert(kind, name, MemberKind::Property, func);
    }

    /// Register a method
    pub fn register_method(&mut self, kind: ValueKind, name: &'static str, func: BuiltinMember) {
        self.insert(kind, name, MemberKind::Method, func);
    }

    fn insert(&mut self, kind: ValueKind, name: &'static str, member_kind: MemberKind, func: BuiltinMember) {
        self.members.entry(kind).or_default().insert(
            name,
            Member {
                kind: member_kind,
                func,
            },
        );
    }

    fn lookup(&self, kind: ValueKind, name: &str) -> Option<Member> {
        self.members.get(&kind)?.get(name).copied()
    }

    /// Read a property
    ///
    /// Mappings first look `name` up as a text key, so `map.key` works.
    pub fn get(&self, target: &Value, name: &str) -> HostResult<Value> {
        if let Value::Mapping(map) = target
            && let Some(value) = map.get(&Value::text(name))
        {
            return Ok(value.clone());
        }

        match self.lookup(target.kind(), name) {
            Some(Member {
                kind: MemberKind::Property,
                func,
            }) => func(target, &[]),
            _ => Err(HostError::NotFound),
        }
    }

    /// Call a method
    pub fn invoke(&self, target: &Value, name: &str, args: &[Value]) -> HostResult<Value> {
        match self.lookup(target.kind(), name) {
            Some(Member {
                kind: MemberKind::Method,
                func,
            }) => func(target, args),
            _ => Err(HostError::NotFound),
        }
    }

    /// Check if a member exists
    pub fn has_member(&self, kind: ValueKind, name: &str) -> bool {
        self.lookup(kind, name).is_some()
    }

    /// Get all member names of a kind, sorted
    pub fn member_names(&self, kind: ValueKind) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .members
            .get(&kind)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    // Registration methods for each kind

    fn register_text_members(&mut self) {
        let k = ValueKind::Text;
        self.register_property(k, "Length", string::length);
        self.register_method(k, "Substring", string::substring);
        self.register_method(k, "Contains", string::contains);
        self.register_method(k, "StartsWith", string::starts_with);
        self.register_method(k, "EndsWith", string::ends_with);
        self.register_method(k, "IndexOf", string::index_of);
        self.register_method(k, "ToUpper", string::to_upper);
        self.register_method(k, "ToLower", string::to_lower);
        self.register_method(k, "Trim", string::trim);
        self.register_method(k, "Replace", string::replace);
        self.register_method(k, "ToString", to_string);
    }

    fn register_sequence_members(&mut self) {
        let k = ValueKind::Sequence;
        self.register_property(k, "Length", array::count);
        self.register_property(k, "Count", array::count);
        self.register_method(k, "Contains", array::contains);
        self.register_method(k, "IndexOf", array::index_of);
    }

    fn register_mapping_members(&mut self) {
        let k = ValueKind::Mapping;
        self.register_property(k, "Count", object::count);
        self.register_property(k, "Keys", object::keys);
        self.register_property(k, "Values", object::values);
        self.register_method(k, "ContainsKey", object::contains_key);
    }

    fn register_datetime_members(&mut self) {
        let k = ValueKind::DateTime;
        self.register_property(k, "Year", datetime::year);
        self.register_property(k, "Month", datetime::month);
        self.register_property(k, "Day", datetime::day);
        self.register_property(k, "Hour", datetime::hour);
        self.register_property(k, "Minute", datetime::minute);
        self.register_property(k, "Second", datetime::second);
        self.register_property(k, "DayOfWeek", datetime::day_of_week);
        self.register_property(k, "DayOfYear", datetime::day_of_year);
        self.register_property(k, "Date", datetime::date);
        self.register_method(k, "AddDays", datetime::add_days);
        self.register_method(k, "AddHours", datetime::add_hours);
        self.register_method(k, "AddMinutes", datetime::add_minutes);
        self.register_method(k, "AddSeconds", datetime::add_seconds);
        self.register_method(k, "ToString", datetime::format);
    }

    fn register_duration_members(&mut self) {
        let k = ValueKind::Duration;
        self.register_property(k, "Days", datetime::duration_days);
        self.register_property(k, "Hours", datetime::duration_hours);
        self.register_property(k, "Minutes", datetime::duration_minutes);
        self.register_property(k, "Seconds", datetime::duration_seconds);
        self.register_property(k, "TotalDays", datetime::total_days);
        self.register_property(k, "TotalHours", datetime::total_hours);
        self.register_property(k, "TotalMinutes", datetime::total_minutes);
        self.register_property(k, "TotalSeconds", datetime::total_seconds);
        self.register_property(k, "TotalMilliseconds", datetime::total_milliseconds);
        self.register_method(k, "ToString", to_string);
    }
}

impl Default for MemberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `x.ToString()` for kinds without format arguments
fn to_string(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_count("ToString", args, 0)?;
    Ok(Value::text(target.to_string()))
}

/// Helper to check argument count
pub(crate) fn check_arg_count(
    member: &'static str,
    args: &[Value],
    expected: usize,
) -> Result<(), ArgumentError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ArgumentError::new(
            member,
            format!("expected {expected} arguments, got {}", args.len()),
        ))
    }
}

/// Helper to check an argument count range
pub(crate) fn check_arg_range(
    member: &'static str,
    args: &[Value],
    min: usize,
    max: usize,
) -> Result<(), ArgumentError> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(ArgumentError::new(
            member,
            format!("expected {min} to {max} arguments, got {}", args.len()),
        ))
    }
}

/// Helper to extract a text argument
pub(crate) fn get_text_arg<'a>(
    member: &'static str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a str, ArgumentError> {
    args.get(index).and_then(Value::as_text).ok_or_else(|| {
        ArgumentError::new(member, format!("argument {} must be text", index + 1))
    })
}

/// Helper to extract a number argument
pub(crate) fn get_number_arg(
    member: &'static str,
    args: &[Value],
    index: usize,
) -> Result<Decimal, ArgumentError> {
    args.get(index).and_then(Value::as_number).ok_or_else(|| {
        ArgumentError::new(member, format!("argument {} must be a number", index + 1))
    })
}

/// Helper to extract a non-negative integral argument
pub(crate) fn get_index_arg(
    member: &'static str,
    args: &[Value],
    index: usize,
) -> Result<usize, ArgumentError> {
    let n = get_number_arg(member, args, index)?;
    decimal_to_index(&n).ok_or_else(|| {
        ArgumentError::new(
            member,
            format!("argument {} must be a non-negative integer, got {n}", index + 1),
        )
    })
}

/// Convert a position or count into a number value
pub(crate) fn index_value(index: Option<usize>) -> Value {
    index.map_or_else(|| Value::integer(-1), Value::from)
}
