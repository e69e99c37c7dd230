//! # gmlfix parser
//!
//! Reading side of gmlfix: splits a GML document into lines, cuts lines into
//! tokens, and parses node records into a lossless tree that can be edited
//! and flattened back into lines. Problems found along the way are reported
//! as [`error::Diagnostic`]s rather than failures.
//!
//! ## Usage
//!
//! ```
//! # use gmlfix_parser::{error::DiagnosticCollector, parse_record, split_lines};
//!
//! let source = "  node [ id 3 name \"Copper Plate\" ]\n";
//! let lines = split_lines(source);
//!
//! let mut collector = DiagnosticCollector::new();
//! let record = parse_record(lines[0], &lines[1..], &mut collector);
//!
//! assert!(record.is_terminated());
//! assert_eq!(record.root().find_attribute("name"), Some(1));
//! ```

pub mod error;

mod document;
mod lexer;
mod record;
mod span;

pub use document::{Line, LineEnding, OutputLine, split_lines};
pub use lexer::{Token, TokenKind, tokenize};
pub use record::{Attribute, Block, Entry, NodeRecord, Raw, parse_record};
pub use span::Span;
