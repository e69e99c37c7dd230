//! Error codes for the gmlfix diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer
//! - `E1xx` - Record structure
//! - `E2xx` - Record content

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A value was opened with a quote but the line ended before it was
    /// closed. The rest of the line is kept verbatim and not interpreted.
    E001,

    // =========================================================================
    // Record structure (E1xx)
    // =========================================================================
    /// Node record interrupted.
    ///
    /// A `node [` line appeared before the previous node record was closed.
    /// The previous record is processed up to that line.
    E100,

    /// Node record not closed.
    ///
    /// The document ended inside a node record. The record is processed up to
    /// the end of the document.
    E101,

    /// Sub-block not closed.
    ///
    /// A nested block such as `graphics [` was still open when its node
    /// record ended.
    E102,

    // =========================================================================
    // Record content (E2xx)
    // =========================================================================
    /// Node record without a label source.
    ///
    /// The record has neither a `name` nor a `label`, so no label can be
    /// derived for it.
    E200,

    /// Duplicate label.
    ///
    /// The record has more than one top-level `label`; only the first is kept.
    E201,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E100 => "node record interrupted",
            ErrorCode::E101 => "node record not closed",
            ErrorCode::E102 => "sub-block not closed",
            ErrorCode::E200 => "node record without label source",
            ErrorCode::E201 => "duplicate label",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
