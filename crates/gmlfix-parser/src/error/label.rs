//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// Whether a label marks the problem itself or context around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    Primary,
    Secondary,
}

/// A message attached to a span of the GML source.
///
/// The primary label marks the line a diagnostic is about; secondary labels
/// add context, for instance the `node [` line that opened a record which was
/// never closed.
///
/// ```text
/// warning[E100]: node record is not closed before the next one starts
///    |
///  4 |   node [
///    |   ------ node record opened here
///  9 |   node [
///    |   ^^^^^^ next node record starts here
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    style: LabelStyle,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>, style: LabelStyle) -> Self {
        Self {
            span,
            message: message.into(),
            style,
        }
    }

    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self::new(span, message, LabelStyle::Primary)
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self::new(span, message, LabelStyle::Secondary)
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn style(&self) -> LabelStyle {
        self.style
    }

    pub fn is_primary(&self) -> bool {
        self.style == LabelStyle::Primary
    }
}
