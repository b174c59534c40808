#![warn(clippy::all)]
#![warn(missing_docs)]
//! # formula-value
//!
//! Runtime value model for the formula expression language.
//!
//! This crate owns the pieces of the language that do not depend on syntax:
//!
//! - [`Value`] - the tagged union produced by evaluation (decimal numbers,
//!   text, booleans, date/time, durations, sequences, ordered mappings and
//!   opaque host handles)
//! - truthiness and stringification rules
//! - [`NumberFormat`] - culture-aware text to number conversion
//! - [`ValueComparer`] - the cross-type ordering and equality engine
//!
//! ## Quick Start
//!
//! ```rust
//! use formula_value::{Value, ValueComparer};
//! use std::cmp::Ordering;
//!
//! let comparer = ValueComparer::default();
//!
//! // numeric text compares as a number
//! let ord = comparer.compare(&Value::text("10"), &Value::integer(9)).unwrap();
//! assert_eq!(ord, Some(Ordering::Greater));
//!
//! // "1" and 1 are both `true` when compared with a boolean
//! assert_eq!(comparer.equals(&Value::text("1"), &Value::boolean(true)).unwrap(), Some(true));
//! ```
//!
//! ## Null handling
//!
//! The comparer supports two null modes. In [`NullComparisonMode::MinValue`]
//! (the default) null sorts below every other value and equals itself. In
//! [`NullComparisonMode::Sql`] any comparison that touches null is
//! indeterminate and `compare` returns `Ok(None)`.

pub mod comparer;
pub mod convert;
pub mod display;
pub mod error;
pub mod handle;
pub mod kind;
pub mod number;
pub mod temporal;
pub mod value;

pub use comparer::{ComparerOptions, Normalizer, NullComparisonMode, ValueComparer};
pub use error::{ComparisonError, ComparisonResult};
pub use handle::HostHandle;
pub use kind::ValueKind;
pub use number::NumberFormat;
pub use value::{Mapping, Value};

// Re-exported so hosts build values without naming the backing crates.
pub use chrono::{NaiveDateTime, TimeDelta};
pub use rust_decimal::Decimal;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ComparerOptions, Decimal, HostHandle, Mapping, NullComparisonMode, NumberFormat, Value,
        ValueComparer, ValueKind,
    };
}
