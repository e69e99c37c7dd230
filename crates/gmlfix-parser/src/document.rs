//! Splitting a GML document into lines and putting it back together.
//!
//! Every [`Line`] remembers the terminator it was written with, so a document
//! with mixed terminators comes back with each line ending the way it did.
//! The document-wide [`LineEnding`] is only used for lines that had no
//! terminator of their own.

use std::{borrow::Cow, fmt};

use crate::span::Span;

/// Line terminator convention of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// Detect the convention from the first terminator in `source`.
    ///
    /// Documents without any terminator are treated as [`LineEnding::Lf`].
    pub fn detect(source: &str) -> Self {
        match source.find('\n') {
            Some(pos) if source[..pos].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    /// The terminator as text.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineEnding::Lf => write!(f, "lf"),
            LineEnding::CrLf => write!(f, "crlf"),
        }
    }
}

/// One line of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    text: &'a str,
    terminator: &'a str,
    span: Span,
    number: usize,
}

impl<'a> Line<'a> {
    /// Create a line. `number` is 1-based; `terminator` is `"\n"`, `"\r\n"`,
    /// or empty for a last line without one.
    pub fn new(text: &'a str, terminator: &'a str, span: Span, number: usize) -> Self {
        Self {
            text,
            terminator,
            span,
            number,
        }
    }

    /// Line content, terminator excluded.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// The terminator exactly as it appears in the source.
    pub fn terminator(&self) -> &'a str {
        self.terminator
    }

    /// Byte range of the content in the source.
    pub fn span(&self) -> Span {
        self.span
    }

    /// 1-based line number.
    pub fn number(&self) -> usize {
        self.number
    }
}

/// Split `source` into lines.
///
/// Both `\n` and `\r\n` end a line and are kept on the [`Line`] they end. A
/// terminator at the very end of the document does not produce an extra
/// empty line.
pub fn split_lines(source: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;

    for (index, chunk) in source.split_inclusive('\n').enumerate() {
        let text = chunk
            .strip_suffix("\r\n")
            .or_else(|| chunk.strip_suffix('\n'))
            .unwrap_or(chunk);
        let terminator = &chunk[text.len()..];
        lines.push(Line::new(
            text,
            terminator,
            Span::new(offset..offset + text.len()),
            index + 1,
        ));
        offset += chunk.len();
    }

    lines
}

/// A line of the output document.
///
/// Lines taken from the source keep the source terminator; lines written by
/// gmlfix have none and get the document's convention when assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine<'a> {
    text: Cow<'a, str>,
    terminator: Option<&'a str>,
}

impl<'a> OutputLine<'a> {
    /// A source line, unchanged.
    pub fn source(line: Line<'a>) -> Self {
        Self {
            text: Cow::Borrowed(line.text()),
            terminator: Some(line.terminator()),
        }
    }

    /// New content for an existing source line.
    pub fn edited(text: String, line: Line<'a>) -> Self {
        Self {
            text: Cow::Owned(text),
            terminator: Some(line.terminator()),
        }
    }

    /// A line with no counterpart in the source.
    pub fn synthesized(text: String) -> Self {
        Self {
            text: Cow::Owned(text),
            terminator: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The source terminator, `None` for synthesized lines. A source line
    /// without a terminator yields `Some("")`.
    pub fn terminator(&self) -> Option<&'a str> {
        self.terminator
    }
}
