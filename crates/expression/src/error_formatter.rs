//! Error formatting with source code context
//!
//! Renders the offending line of an expression with a `^` marker under the
//! error column:
//!
//! ```text
//! Error at line 1, column 5:
//!   expected expression, found '*'
//!
//!  1 | 1 + * 2
//!          ^
//! ```

use std::fmt::Write as _;

use crate::core::span::line_col;

/// Format an error message with source context
pub struct ErrorFormatter<'a> {
    source: &'a str,
    offset: usize,
    error_message: String,
    /// Number of lines to show before the error line
    context_before: usize,
    /// Number of lines to show after the error line
    context_after: usize,
}

impl<'a> ErrorFormatter<'a> {
    /// Create a formatter for an error at byte `offset` of `source`
    pub fn new(source: &'a str, offset: usize, error_message: impl Into<String>) -> Self {
        Self {
            source,
            offset,
            error_message: error_message.into(),
            context_before: 1,
            context_after: 0,
        }
    }

    /// Set the number of context lines to show
    #[must_use]
    pub const fn with_context(mut self, before: usize, after: usize) -> Self {
        self.context_before = before;
        self.context_after = after;
        self
    }

    /// Format the error message with source context
    pub fn format(&self) -> String {
        let (line, column) = line_col(self.source, self.offset);
        let lines: Vec<&str> = self.source.lines().collect();
        let error_line_idx = line.saturating_sub(1);

        let mut output = String::with_capacity(128 + self.source.len());
        let _ = writeln!(output, "Error at line {line}, column {column}:");
        let _ = writeln!(output, "  {}\n", self.error_message);

        let last_line = (error_line_idx + self.context_after + 1).min(lines.len());
        let width = last_line.max(1).to_string().len();

        let first_line = error_line_idx.saturating_sub(self.context_before);
        for (i, text) in lines.iter().enumerate().take(last_line).skip(first_line) {
            let _ = writeln!(output, " {:width$} | {}", i + 1, text);
            if i == error_line_idx {
                let padding = " ".repeat(width + 4 + column.saturating_sub(1));
                let _ = writeln!(output, "{padding}^");
            }
        }

        // error at end of input after a trailing newline or in empty source
        if error_line_idx >= lines.len() {
            let _ = writeln!(output, " {:width$} | ", error_line_idx + 1);
            let padding = " ".repeat(width + 4 + column.saturating_sub(1));
            let _ = writeln!(output, "{padding}^");
        }

        output
    }
}
