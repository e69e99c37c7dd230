//! Error and diagnostic system for GML normalization.
//!
//! Most problems found in a GML document are recoverable: an unterminated
//! node record is flushed as-is, a node without a name is left unlabeled.
//! They are reported as [`Diagnostic`]s with an [`ErrorCode`], a labelled
//! source span and optional help text. A [`DiagnosticCollector`] gathers them
//! over one run; in strict mode every warning is promoted to an error and the
//! run fails with a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use gmlfix_parser::error::{Diagnostic, ErrorCode};
//! # use gmlfix_parser::Span;
//!
//! let diag = Diagnostic::warning("node record has no name or label")
//!     .with_code(ErrorCode::E200)
//!     .with_label(Span::new(12..20), "record starts here")
//!     .with_help("add a `name` attribute to the node");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::{Label, LabelStyle};
pub use parse_error::ParseError;
pub use severity::Severity;
