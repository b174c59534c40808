//! Error types for value comparison

use thiserror::Error;

/// Errors raised while comparing two values
///
/// Under [`ComparerOptions::suppress_errors`](crate::ComparerOptions) these
/// are downgraded to an indeterminate result instead of being returned.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComparisonError {
    /// A numeric-looking text does not fit in the decimal range
    #[error("Cannot compare '{text}' as a number: value is out of decimal range")]
    DecimalOutOfRange {
        /// The offending text
        text: String,
    },
}

impl ComparisonError {
    /// Create a decimal range error
    pub fn decimal_out_of_range(text: impl Into<String>) -> Self {
        Self::DecimalOutOfRange { text: text.into() }
    }

    /// Get error code for categorization
    pub fn code(&self) -> &'static str {
        match self {
            Self::DecimalOutOfRange { .. } => "VALUE:COMPARE_RANGE",
        }
    }
}

/// Result type for comparison operations
pub type ComparisonResult<T> = Result<T, ComparisonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        let error = ComparisonError::decimal_out_of_range("1".repeat(40));
        assert!(error.to_string().contains("out of decimal range"));
        assert_eq!(error.code(), "VALUE:COMPARE_RANGE");
    }
}
