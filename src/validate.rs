//! Line-level lint of candidate logic text.
//!
//! This deliberately knows nothing about the parser: it only checks that every line is
//! terminated and has parentheses, which is the shape the repair loop asks the generator for.

use std::fmt;
use crate::ast::TERMINATOR;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    MissingTerminator,
    MissingParentheses,
}

/// One problem found on one line of raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// 1-based line number within the checked text
    pub line_number: usize,
    pub line: String,
    pub kind: ValidationErrorKind,
}

impl ValidationErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationErrorKind::MissingTerminator => "Missing period at end.",
            ValidationErrorKind::MissingParentheses => "Missing parentheses.",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} (`{}`)", self.line_number, self.kind.message(), self.line)
    }
}

/// Check every line of `source` (the text as a whole is trimmed first, so leading and trailing
/// blank lines are not reported). Each line may produce a missing-terminator error,
/// a missing-parentheses error, or both, in that order. An empty result means valid.
pub fn check_logic_validity(source: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (idx, line) in source.trim().split('\n').enumerate() {
        let stripped = line.trim();
        let mut report = |kind| {
            errors.push(ValidationError {
                line_number: idx + 1,
                line: stripped.to_string(),
                kind,
            })
        };
        if !stripped.ends_with(TERMINATOR) {
            report(ValidationErrorKind::MissingTerminator);
        }
        if !stripped.contains('(') || !stripped.contains(')') {
            report(ValidationErrorKind::MissingParentheses);
        }
    }
    errors
}
