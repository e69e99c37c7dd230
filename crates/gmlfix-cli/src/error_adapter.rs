//! Adapters that let miette render gmlfix errors and warnings.
//!
//! A [`GmlfixError::Parse`] can hold many diagnostics; each one becomes its
//! own report so miette draws a separate snippet for every problem. Warnings
//! of a successful run go through the same adapter.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use gmlfix::GmlfixError;
use gmlfix_parser::{
    Span,
    error::{Diagnostic, Severity},
};

/// Anything miette can render.
pub type Reportable<'a> = Box<dyn MietteDiagnostic + 'a>;

/// One gmlfix [`Diagnostic`] together with the document it points into.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diag.severity() {
            Severity::Warning => miette::Severity::Warning,
            Severity::Error => miette::Severity::Error,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// A [`GmlfixError`] without source locations: I/O and configuration
/// failures.
#[derive(Debug)]
pub struct ErrorAdapter<'a>(pub &'a GmlfixError);

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.0 {
            GmlfixError::Io(err) => Some(err),
            GmlfixError::Parse { .. } | GmlfixError::Config(_) => None,
        }
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            GmlfixError::Io(_) => "gmlfix::io",
            GmlfixError::Parse { .. } => return None,
            GmlfixError::Config(_) => "gmlfix::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self.0 {
            GmlfixError::Config(_) => Some(Box::new(
                "check the file given with --config, ./gmlfix/config.toml, or the user config directory",
            )),
            GmlfixError::Io(_) | GmlfixError::Parse { .. } => None,
        }
    }
}

fn span_to_miette(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Split a [`GmlfixError`] into the reports to render.
///
/// [`GmlfixError::Parse`] yields one report per diagnostic, every other
/// variant a single report.
pub fn to_reportables(err: &GmlfixError) -> Vec<Reportable<'_>> {
    match err {
        GmlfixError::Parse {
            err: parse_err,
            src,
        } => diagnostics_to_reportables(parse_err.diagnostics(), src),
        _ => vec![Box::new(ErrorAdapter(err))],
    }
}

/// One report per diagnostic, all pointing into `src`.
pub fn diagnostics_to_reportables<'a>(
    diagnostics: &'a [Diagnostic],
    src: &'a str,
) -> Vec<Reportable<'a>> {
    diagnostics
        .iter()
        .map(|d| Box::new(DiagnosticAdapter::new(d, src)) as Reportable<'a>)
        .collect()
}
