//! Block extraction: splitting a document into node records and the lines
//! between them.
//!
//! Extraction is a single left-to-right pass over the lines. A line starting
//! with `node [` starts a record; bracket tokens are counted until the
//! record's own `]` brings the depth back to zero, which may happen on the
//! very line the record starts on. Everything outside a record passes
//! through untouched.

use log::{debug, trace};

use gmlfix_parser::{
    Line, TokenKind,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    tokenize,
};

/// Key of the blocks this tool rewrites.
const NODE_KEY: &str = "node";

/// The lines of one node record, starting with its `node [` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBlock<'a> {
    lines: Vec<Line<'a>>,
    terminated: bool,
}

impl<'a> NodeBlock<'a> {
    /// The `node [` line.
    pub fn open(&self) -> Line<'a> {
        self.lines[0]
    }

    /// Lines after the `node [` line, closing `]` included when present.
    pub fn body(&self) -> &[Line<'a>] {
        &self.lines[1..]
    }

    /// `false` when the record was cut short by another `node [` line or by
    /// the end of the document.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

/// One piece of an extracted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A line outside any node record.
    Passthrough(Line<'a>),
    /// A complete (or recovered) node record.
    Node(NodeBlock<'a>),
}

/// A node record being collected.
struct Buffer<'a> {
    lines: Vec<Line<'a>>,
    depth: usize,
}

impl<'a> Buffer<'a> {
    fn new(open: Line<'a>) -> Self {
        Self {
            lines: vec![open],
            depth: 0,
        }
    }

    /// Count the brackets on `line`; `true` once the record's own `]` is
    /// reached.
    fn closes_on(&mut self, line: &Line<'_>) -> bool {
        for token in tokenize(line.text()) {
            match token.kind() {
                TokenKind::Open => self.depth += 1,
                TokenKind::Close => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        return true;
                    }
                }
                TokenKind::Quoted(_) | TokenKind::Word(_) | TokenKind::Unterminated(_) => {}
            }
        }
        false
    }

    fn into_block(self, terminated: bool) -> NodeBlock<'a> {
        NodeBlock {
            lines: self.lines,
            terminated,
        }
    }
}

fn is_node_open(line: &Line<'_>) -> bool {
    match tokenize(line.text()).as_slice() {
        [key, bracket, ..] => {
            key.key() == Some(NODE_KEY) && bracket.kind() == TokenKind::Open
        }
        _ => false,
    }
}

/// Split `lines` into passthrough lines and node records.
///
/// Malformed input is recovered, never rejected:
/// - a `node [` line inside an open record ends that record
///   ([`ErrorCode::E100`]) and starts a new one
/// - a record still open at the end of the document is emitted as it is
///   ([`ErrorCode::E101`])
pub fn extract<'a>(lines: &[Line<'a>], collector: &mut DiagnosticCollector) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut buffer: Option<Buffer<'a>> = None;

    for &line in lines {
        if is_node_open(&line) {
            if let Some(interrupted) = buffer.take() {
                let open = interrupted.lines[0];
                debug!(
                    line = open.number(),
                    interrupted_at = line.number();
                    "Node record interrupted by another node record"
                );
                collector.emit(
                    Diagnostic::warning("node record is not closed before the next one starts")
                        .with_code(ErrorCode::E100)
                        .with_label(line.span(), "next node record starts here")
                        .with_secondary_label(open.span(), "node record opened here")
                        .with_help("add `]` to close the node record"),
                );
                segments.push(Segment::Node(interrupted.into_block(false)));
            }
            trace!(line = line.number(); "Node record opened");
            buffer = Some(Buffer::new(line));
        } else if let Some(current) = buffer.as_mut() {
            current.lines.push(line);
        } else {
            segments.push(Segment::Passthrough(line));
            continue;
        }

        if let Some(done) = buffer.take_if(|current| current.closes_on(&line)) {
            trace!(line = line.number(); "Node record closed");
            segments.push(Segment::Node(done.into_block(true)));
        }
    }

    if let Some(unfinished) = buffer {
        let open = unfinished.lines[0];
        debug!(line = open.number(); "Document ends inside a node record");
        collector.emit(
            Diagnostic::warning("node record is not closed at the end of the document")
                .with_code(ErrorCode::E101)
                .with_label(open.span(), "node record opened here")
                .with_help("add `]` to close the node record"),
        );
        segments.push(Segment::Node(unfinished.into_block(false)));
    }

    segments
}

#[cfg(test)]
mod tests {
    use gmlfix_parser::split_lines;

    use super::*;

    fn run(source: &str) -> (Vec<Segment<'_>>, DiagnosticCollector) {
        let lines = split_lines(source);
        let mut collector = DiagnosticCollector::new();
        let segments = extract(&lines, &mut collector);
        (segments, collector)
    }

    fn node(segment: &Segment<'_>) -> Vec<String> {
        match segment {
            Segment::Node(block) => std::iter::once(block.open())
                .chain(block.body().iter().copied())
                .map(|line| line.text().to_string())
                .collect(),
            Segment::Passthrough(line) => panic!("Expected node, got `{}`", line.text()),
        }
    }

    const DOC: &str = "graph [\n  directed 1\n  node [\n    id 0\n    graphics [\n      type \"ellipse\"\n    ]\n  ]\n  edge [\n    source 0\n  ]\n]";

    #[test]
    fn test_extract_segments() {
        let (segments, collector) = run(DOC);

        assert!(collector.diagnostics().is_empty());
        assert_eq!(segments.len(), 7);
        assert!(matches!(segments[0], Segment::Passthrough(l) if l.text() == "graph ["));
        assert!(matches!(segments[1], Segment::Passthrough(l) if l.text() == "  directed 1"));
        assert_eq!(node(&segments[2]).len(), 6);
        assert_eq!(node(&segments[2])[5], "  ]");
        assert!(matches!(segments[3], Segment::Passthrough(l) if l.text() == "  edge ["));
        assert!(matches!(segments[6], Segment::Passthrough(l) if l.text() == "]"));
    }

    #[test]
    fn test_extract_terminated_block() {
        let (segments, _) = run(DOC);
        let Segment::Node(block) = &segments[2] else {
            panic!("Expected node");
        };

        assert!(block.is_terminated());
        assert_eq!(block.open().text(), "  node [");
        assert_eq!(block.body().len(), 5);
        assert_eq!(block.open().number(), 3);
    }

    #[test]
    fn test_interrupted_record_is_flushed() {
        let (segments, collector) = run("  node [\n    id 0\n  node [\n    id 1\n  ]\nafter");

        assert_eq!(segments.len(), 3);
        assert_eq!(node(&segments[0]), vec!["  node [", "    id 0"]);
        assert_eq!(node(&segments[1]), vec!["  node [", "    id 1", "  ]"]);
        assert!(matches!(segments[2], Segment::Passthrough(l) if l.text() == "after"));

        let diags = collector.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_unterminated_record_at_end() {
        let (segments, collector) = run("graph [\n  node [\n    id 0\n    name \"x\"");

        assert_eq!(segments.len(), 2);
        let Segment::Node(block) = &segments[1] else {
            panic!("Expected node");
        };
        assert!(!block.is_terminated());
        assert_eq!(block.body().len(), 2);
        assert_eq!(collector.diagnostics()[0].code(), Some(ErrorCode::E101));
    }

    #[test]
    fn test_close_is_structural_not_indentation_based() {
        let (segments, _) = run("node [\ngraphics [\n]\nid 0\n]\ntail");

        assert_eq!(node(&segments[0]).len(), 5);
        assert!(matches!(segments[1], Segment::Passthrough(l) if l.text() == "tail"));
    }

    #[test]
    fn test_single_line_node_is_a_record() {
        let (segments, collector) = run("graph [\n  node [ id 3 name \"Copper Plate\" ]\n]");

        assert!(collector.diagnostics().is_empty());
        assert_eq!(segments.len(), 3);
        let Segment::Node(block) = &segments[1] else {
            panic!("Expected node");
        };
        assert!(block.is_terminated());
        assert!(block.body().is_empty());
    }

    #[test]
    fn test_inline_sub_block_keeps_depth() {
        let (segments, _) = run("node [\n  graphics [ type \"oval\" ]\n  name \"[a]\"\n]\nafter");

        assert_eq!(node(&segments[0]).len(), 4);
        assert!(matches!(segments[1], Segment::Passthrough(l) if l.text() == "after"));
    }

    #[test]
    fn test_node_must_start_its_line() {
        let (segments, _) = run("  edge [ node [ id 1 ] ]");
        assert!(matches!(segments[0], Segment::Passthrough(_)));
    }
}
