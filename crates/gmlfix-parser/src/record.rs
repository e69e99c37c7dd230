//! Tree representation of a single GML node record.
//!
//! A [`NodeRecord`] is parsed from the tokens of one `node [ ... ]` record.
//! Every entry remembers where it came from, so the record is written back
//! with as little change as possible. A block laid out one entry per line is
//! written back line by line, and untouched entries keep their source bytes.
//! A block sharing lines between entries keeps its source text while only
//! values change, each new value spliced in place; once it gains or loses an
//! entry it is written out again one entry per line.

use std::borrow::Cow;

use log::trace;

use crate::{
    document::{Line, OutputLine},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lexer::{Token, TokenKind, tokenize},
    span::Span,
};

/// Move a line-relative span into document coordinates.
fn to_document(span: Span, line: Line<'_>) -> Span {
    let base = line.span().start();
    Span::new(base + span.start()..base + span.end())
}

/// A token together with its line.
#[derive(Debug, Clone, Copy)]
struct Placed<'a> {
    line: Line<'a>,
    token: Token<'a>,
    /// First token on its line.
    first: bool,
    /// Last token on its line.
    last: bool,
}

impl<'a> Placed<'a> {
    fn same_line(&self, other: &Placed<'_>) -> bool {
        self.line.number() == other.line.number()
    }

    /// Leading whitespace of the line, if this token starts it.
    fn indent(&self) -> &'a str {
        if self.first {
            &self.line.text()[..self.token.span().start()]
        } else {
            ""
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Item<'a> {
    Token(Placed<'a>),
    /// A line without tokens.
    Blank(Line<'a>),
}

/// A new value for part of a source line.
#[derive(Debug)]
struct Splice {
    line: usize,
    span: Span,
    text: String,
}

fn splice_line<'a>(line: Line<'a>, splices: &[Splice]) -> OutputLine<'a> {
    let mut edits: Vec<&Splice> = splices
        .iter()
        .filter(|splice| splice.line == line.number())
        .collect();
    if edits.is_empty() {
        return OutputLine::source(line);
    }
    edits.sort_by_key(|splice| splice.span.start());

    let source = line.text();
    let mut text = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in edits {
        text.push_str(&source[cursor..edit.span.start()]);
        text.push_str(&edit.text);
        cursor = edit.span.end();
    }
    text.push_str(&source[cursor..]);

    OutputLine::edited(text, line)
}

fn push_line<'a>(lines: &mut Vec<Line<'a>>, line: Line<'a>) {
    if lines.last().is_none_or(|last| last.number() != line.number()) {
        lines.push(line);
    }
}

/// Where a parsed attribute sits, relative to its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttributeSource<'a> {
    line: Line<'a>,
    key: Span,
    /// The value token, quotes included.
    value: Span,
}

/// A `key value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    indent: Cow<'a, str>,
    key: &'a str,
    value: Cow<'a, str>,
    quoted: bool,
    /// `None` when synthesized.
    source: Option<AttributeSource<'a>>,
    edited: bool,
}

impl<'a> Attribute<'a> {
    fn parsed(key: &Placed<'a>, name: &'a str, value: &Placed<'a>) -> Self {
        let (text, quoted) = match value.token.kind() {
            TokenKind::Quoted(text) => (text, true),
            TokenKind::Word(text) => (text, false),
            TokenKind::Open | TokenKind::Close | TokenKind::Unterminated(_) => ("", false),
        };

        Self {
            indent: Cow::Borrowed(key.indent()),
            key: name,
            value: Cow::Borrowed(text),
            quoted,
            source: Some(AttributeSource {
                line: key.line,
                key: key.token.span(),
                value: value.token.span(),
            }),
            edited: false,
        }
    }

    /// A new quoted attribute.
    pub fn quoted(indent: impl Into<String>, key: &'a str, value: impl Into<String>) -> Self {
        Self {
            indent: Cow::Owned(indent.into()),
            key,
            value: Cow::Owned(value.into()),
            quoted: true,
            source: None,
            edited: false,
        }
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    /// The value without quotes.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Source range from the key to the end of the value, `None` for
    /// synthesized attributes.
    pub fn span(&self) -> Option<Span> {
        self.source
            .map(|source| to_document(source.key.union(source.value), source.line))
    }

    /// Replace the value with a quoted string, keeping everything else on
    /// the line.
    pub fn set_quoted(&mut self, value: impl Into<String>) {
        self.value = Cow::Owned(value.into());
        self.quoted = true;
        self.edited = true;
    }

    fn value_text(&self) -> String {
        if self.quoted {
            format!("\"{}\"", self.value)
        } else {
            self.value.to_string()
        }
    }

    fn laid_out(&self, indent: &str) -> String {
        format!("{indent}{} {}", self.key, self.value_text())
    }

    fn splice(&self) -> Option<Splice> {
        let source = self.source.filter(|_| self.edited)?;
        Some(Splice {
            line: source.line.number(),
            span: source.value,
            text: self.value_text(),
        })
    }

    fn render(&self) -> OutputLine<'a> {
        match (self.source, self.splice()) {
            (Some(source), Some(splice)) => splice_line(source.line, &[splice]),
            (Some(source), None) => OutputLine::source(source.line),
            (None, _) => OutputLine::synthesized(self.laid_out(&self.indent)),
        }
    }
}

/// Tokens that form neither an attribute nor a block, kept as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Raw<'a> {
    line: Line<'a>,
    span: Span,
}

impl<'a> Raw<'a> {
    pub fn text(&self) -> &'a str {
        &self.line.text()[self.span.start()..self.span.end()]
    }
}

/// How a block ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closing<'a> {
    /// `tail` is whatever follows the `]` on its line.
    Source { line: Line<'a>, tail: &'a str },
    Synthesized,
    Missing,
}

/// A `key [ ... ]` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    indent: Cow<'a, str>,
    key: &'a str,
    /// The line holding `key [`; `None` for synthesized blocks.
    open: Option<Line<'a>>,
    entries: Vec<Entry<'a>>,
    closing: Closing<'a>,
    /// Laid out one entry per line in the source.
    lined: bool,
    /// An entry was added or removed.
    reshaped: bool,
}

impl<'a> Block<'a> {
    fn parsed(key: &Placed<'a>, name: &'a str, bracket: &Placed<'a>) -> Self {
        Self {
            indent: Cow::Borrowed(key.indent()),
            key: name,
            open: Some(key.line),
            entries: Vec::new(),
            closing: Closing::Missing,
            lined: bracket.last,
            reshaped: false,
        }
    }

    /// A new block with the given entries and its own `]` line.
    pub fn synthesized(indent: impl Into<String>, key: &'a str, entries: Vec<Entry<'a>>) -> Self {
        Self {
            indent: Cow::Owned(indent.into()),
            key,
            open: None,
            entries,
            closing: Closing::Synthesized,
            lined: false,
            reshaped: false,
        }
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    /// Indentation for a new entry inside this block: one `unit` deeper than
    /// the block's own opening line.
    pub fn child_indent(&self, unit: &str) -> String {
        format!("{}{}", self.indent, unit)
    }

    /// The line holding `key [`, `None` for synthesized blocks.
    pub fn open_line(&self) -> Option<Line<'a>> {
        self.open
    }

    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Entry<'a>] {
        &mut self.entries
    }

    pub fn insert(&mut self, index: usize, entry: Entry<'a>) {
        self.reshaped = true;
        self.entries.insert(index, entry);
    }

    pub fn push(&mut self, entry: Entry<'a>) {
        self.reshaped = true;
        self.entries.push(entry);
    }

    pub fn remove(&mut self, index: usize) -> Entry<'a> {
        self.reshaped = true;
        self.entries.remove(index)
    }

    /// Whether the block has a closing `]`.
    pub fn is_closed(&self) -> bool {
        !matches!(self.closing, Closing::Missing)
    }

    /// Index of the first direct attribute named `key`.
    pub fn find_attribute(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.as_attribute().is_some_and(|attr| attr.key() == key))
    }

    fn push_parsed(&mut self, entry: Entry<'a>, starts_line: bool, ends_line: bool) {
        self.lined &= starts_line && ends_line;
        self.entries.push(entry);
    }

    fn is_reshaped(&self) -> bool {
        self.reshaped
            || self
                .entries
                .iter()
                .filter_map(Entry::as_block)
                .any(Block::is_reshaped)
    }

    fn render(&self, unit: &str, out: &mut Vec<OutputLine<'a>>) {
        match self.open {
            None => self.render_laid_out(&self.indent, unit, out),
            Some(_) if self.lined => self.render_lined(unit, out),
            Some(_) if self.is_reshaped() => self.render_laid_out(&self.indent, unit, out),
            Some(_) => self.render_source(out),
        }
    }

    fn render_lined(&self, unit: &str, out: &mut Vec<OutputLine<'a>>) {
        if let Some(line) = self.open {
            out.push(OutputLine::source(line));
        }
        for entry in &self.entries {
            entry.render(unit, out);
        }
        if let Closing::Source { line, .. } = self.closing {
            out.push(OutputLine::source(line));
        }
    }

    /// The block's source lines with edited values spliced in.
    fn render_source(&self, out: &mut Vec<OutputLine<'a>>) {
        let mut lines = Vec::new();
        self.collect_lines(&mut lines);
        let mut splices = Vec::new();
        self.collect_splices(&mut splices);

        out.extend(lines.into_iter().map(|line| splice_line(line, &splices)));
    }

    /// One entry per line, each nested block one `unit` deeper.
    fn render_laid_out(&self, indent: &str, unit: &str, out: &mut Vec<OutputLine<'a>>) {
        let header = if self.key.is_empty() {
            format!("{indent}[")
        } else {
            format!("{indent}{} [", self.key)
        };
        out.push(OutputLine::synthesized(header));

        let child = format!("{indent}{unit}");
        for entry in &self.entries {
            entry.render_laid_out(&child, unit, out);
        }

        match self.closing {
            Closing::Source { tail, .. } => {
                out.push(OutputLine::synthesized(format!("{indent}]{tail}")));
            }
            Closing::Synthesized => out.push(OutputLine::synthesized(format!("{indent}]"))),
            Closing::Missing => {}
        }
    }

    fn collect_lines(&self, lines: &mut Vec<Line<'a>>) {
        if let Some(line) = self.open {
            push_line(lines, line);
        }
        for entry in &self.entries {
            match entry {
                Entry::Attribute(attr) => {
                    if let Some(source) = attr.source {
                        push_line(lines, source.line);
                    }
                }
                Entry::Block(block) => block.collect_lines(lines),
                Entry::Raw(raw) => push_line(lines, raw.line),
                Entry::Blank(line) => push_line(lines, *line),
            }
        }
        if let Closing::Source { line, .. } = self.closing {
            push_line(lines, line);
        }
    }

    fn collect_splices(&self, splices: &mut Vec<Splice>) {
        for entry in &self.entries {
            match entry {
                Entry::Attribute(attr) => splices.extend(attr.splice()),
                Entry::Block(block) => block.collect_splices(splices),
                Entry::Raw(_) | Entry::Blank(_) => {}
            }
        }
    }
}

/// One child of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<'a> {
    Attribute(Attribute<'a>),
    Block(Block<'a>),
    Raw(Raw<'a>),
    /// A line with nothing on it.
    Blank(Line<'a>),
}

impl<'a> Entry<'a> {
    pub fn as_attribute(&self) -> Option<&Attribute<'a>> {
        match self {
            Entry::Attribute(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn as_attribute_mut(&mut self) -> Option<&mut Attribute<'a>> {
        match self {
            Entry::Attribute(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block<'a>> {
        match self {
            Entry::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut Block<'a>> {
        match self {
            Entry::Block(block) => Some(block),
            _ => None,
        }
    }

    fn render(&self, unit: &str, out: &mut Vec<OutputLine<'a>>) {
        match self {
            Entry::Attribute(attr) => out.push(attr.render()),
            Entry::Block(block) => block.render(unit, out),
            Entry::Raw(raw) => out.push(OutputLine::source(raw.line)),
            Entry::Blank(line) => out.push(OutputLine::source(*line)),
        }
    }

    fn render_laid_out(&self, indent: &str, unit: &str, out: &mut Vec<OutputLine<'a>>) {
        match self {
            Entry::Attribute(attr) => out.push(OutputLine::synthesized(attr.laid_out(indent))),
            Entry::Block(block) => block.render_laid_out(indent, unit, out),
            Entry::Raw(raw) => out.push(OutputLine::synthesized(format!("{indent}{}", raw.text()))),
            Entry::Blank(_) => out.push(OutputLine::synthesized(String::new())),
        }
    }
}

/// A parsed `node [ ... ]` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord<'a> {
    root: Block<'a>,
    /// Lines after the line holding the record's own `]`. Never produced by
    /// block extraction, kept so that parsing arbitrary line ranges loses
    /// nothing.
    trailing: Vec<Line<'a>>,
}

impl<'a> NodeRecord<'a> {
    /// The record's own block: its `node [`, entries and closing `]`.
    pub fn root(&self) -> &Block<'a> {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Block<'a> {
        &mut self.root
    }

    /// Whether the record ends with its own `]`.
    pub fn is_terminated(&self) -> bool {
        self.root.is_closed()
    }

    /// Flatten the record back into lines. Blocks that have to be laid out
    /// again indent each level by `indent_unit`.
    pub fn render(&self, indent_unit: &str) -> Vec<OutputLine<'a>> {
        let mut out = Vec::new();
        self.root.render(indent_unit, &mut out);
        out.extend(self.trailing.iter().copied().map(OutputLine::source));
        out
    }
}

/// A block still waiting for its `]`.
struct Frame<'a> {
    block: Block<'a>,
    /// The block's key is the first token on its line.
    starts_line: bool,
}

struct RecordParser<'a, 'c> {
    items: Vec<Item<'a>>,
    pos: usize,
    collector: &'c mut DiagnosticCollector,
}

impl<'a, 'c> RecordParser<'a, 'c> {
    fn new(lines: impl IntoIterator<Item = Line<'a>>, collector: &'c mut DiagnosticCollector) -> Self {
        let mut items = Vec::new();
        for line in lines {
            let tokens = tokenize(line.text());
            if tokens.is_empty() {
                items.push(Item::Blank(line));
                continue;
            }
            let count = tokens.len();
            items.extend(tokens.into_iter().enumerate().map(|(index, token)| {
                Item::Token(Placed {
                    line,
                    token,
                    first: index == 0,
                    last: index + 1 == count,
                })
            }));
        }

        Self {
            items,
            pos: 0,
            collector,
        }
    }

    fn next_item(&mut self) -> Option<Item<'a>> {
        let item = self.items.get(self.pos).copied()?;
        self.pos += 1;
        Some(item)
    }

    fn token_at(&self, pos: usize) -> Option<Placed<'a>> {
        match self.items.get(pos) {
            Some(Item::Token(placed)) => Some(*placed),
            _ => None,
        }
    }

    /// The next token, if it sits on the same line as `current`.
    fn peek_same_line(&self, current: &Placed<'a>) -> Option<Placed<'a>> {
        self.token_at(self.pos)
            .filter(|next| next.same_line(current))
    }

    /// `key [` at the start of the record.
    fn header(&mut self) -> Option<Block<'a>> {
        let key = self.token_at(0)?;
        let bracket = self.token_at(1)?;
        let name = key.token.key()?;
        if !key.same_line(&bracket) || bracket.token.kind() != TokenKind::Open {
            return None;
        }

        self.pos = 2;
        Some(Block::parsed(&key, name, &bracket))
    }

    /// Everything from `start` up to the next bracket or the end of the line.
    /// Returns the entry and whether it ends its line.
    fn raw(&mut self, start: Placed<'a>) -> (Raw<'a>, bool) {
        self.report_unterminated(&start);

        let mut end = start;
        while let Some(next) = self.peek_same_line(&end) {
            if matches!(next.token.kind(), TokenKind::Open | TokenKind::Close) {
                break;
            }
            self.pos += 1;
            self.report_unterminated(&next);
            end = next;
        }

        let raw = Raw {
            line: start.line,
            span: start.token.span().union(end.token.span()),
        };
        (raw, end.last)
    }

    fn report_unterminated(&mut self, placed: &Placed<'a>) {
        if let TokenKind::Unterminated(_) = placed.token.kind() {
            let start = to_document(placed.token.span(), placed.line).start();
            self.collector.emit(
                Diagnostic::warning("unterminated string literal")
                    .with_code(ErrorCode::E001)
                    .with_label(
                        Span::new(start..placed.line.span().end()),
                        "string starts here",
                    )
                    .with_help("add the closing `\"`"),
            );
        }
    }
}

/// The block new entries go into: the innermost open sub-block, or the
/// record itself.
fn innermost<'b, 'a>(root: &'b mut Block<'a>, stack: &'b mut [Frame<'a>]) -> &'b mut Block<'a> {
    match stack.last_mut() {
        Some(frame) => &mut frame.block,
        None => root,
    }
}

/// Parse the lines of one node record into a tree.
///
/// `open` is the line holding `node [`; `body` the lines that follow it, up
/// to and including the line with the record's closing `]` if there is one.
/// Brackets are matched by token, so a whole record or sub-block may sit on
/// one line. Problems are reported to `collector` and never abort parsing:
/// - an unterminated string is kept verbatim with the rest of its line
///   ([`ErrorCode::E001`])
/// - a sub-block still open at the end of the record is closed implicitly
///   ([`ErrorCode::E102`])
pub fn parse_record<'a>(
    open: Line<'a>,
    body: &[Line<'a>],
    collector: &mut DiagnosticCollector,
) -> NodeRecord<'a> {
    let mut parser = RecordParser::new(std::iter::once(open).chain(body.iter().copied()), collector);

    let mut root = parser.header().unwrap_or_else(|| Block {
        indent: Cow::Borrowed(""),
        key: "node",
        open: Some(open),
        entries: Vec::new(),
        closing: Closing::Missing,
        lined: false,
        reshaped: false,
    });
    let mut stack: Vec<Frame<'a>> = Vec::new();
    let mut close_line = None;

    while let Some(item) = parser.next_item() {
        let placed = match item {
            Item::Token(placed) => placed,
            Item::Blank(line) => {
                innermost(&mut root, &mut stack)
                    .entries
                    .push(Entry::Blank(line));
                continue;
            }
        };

        match placed.token.kind() {
            TokenKind::Close => match stack.pop() {
                Some(frame) => {
                    let mut block = frame.block;
                    block.closing = Closing::Source {
                        line: placed.line,
                        tail: "",
                    };
                    block.lined &= placed.first;
                    innermost(&mut root, &mut stack).push_parsed(
                        Entry::Block(block),
                        frame.starts_line,
                        placed.last,
                    );
                }
                None => {
                    let tail = placed.line.text()[placed.token.span().end()..].trim_end();
                    root.closing = Closing::Source {
                        line: placed.line,
                        tail,
                    };
                    root.lined &= placed.first;
                    close_line = Some(placed.line.number());
                    break;
                }
            },
            // `[` without a key opens an unnamed block
            TokenKind::Open => stack.push(Frame {
                block: Block::parsed(&placed, "", &placed),
                starts_line: placed.first,
            }),
            TokenKind::Quoted(_) | TokenKind::Word(_) | TokenKind::Unterminated(_) => {
                let key = placed.token.key();
                let next = parser.peek_same_line(&placed);

                match (key, next) {
                    (Some(name), Some(bracket)) if bracket.token.kind() == TokenKind::Open => {
                        parser.pos += 1;
                        stack.push(Frame {
                            block: Block::parsed(&placed, name, &bracket),
                            starts_line: placed.first,
                        });
                    }
                    (Some(name), Some(value)) if value.token.is_value() => {
                        parser.pos += 1;
                        let attr = Attribute::parsed(&placed, name, &value);
                        innermost(&mut root, &mut stack).push_parsed(
                            Entry::Attribute(attr),
                            placed.first,
                            value.last,
                        );
                    }
                    _ => {
                        let (raw, ends_line) = parser.raw(placed);
                        innermost(&mut root, &mut stack).push_parsed(
                            Entry::Raw(raw),
                            placed.first,
                            ends_line,
                        );
                    }
                }
            }
        }
    }

    while let Some(frame) = stack.pop() {
        let block = frame.block;
        if let Some(line) = block.open {
            parser.collector.emit(
                Diagnostic::warning(format!("`{}` block is not closed", block.key))
                    .with_code(ErrorCode::E102)
                    .with_label(line.span(), "block opened here")
                    .with_secondary_label(open.span(), "node record opened here")
                    .with_help("add `]` to close the block"),
            );
        }
        innermost(&mut root, &mut stack).push_parsed(Entry::Block(block), frame.starts_line, true);
    }

    let trailing = match close_line {
        Some(number) => body
            .iter()
            .filter(|line| line.number() > number)
            .copied()
            .collect(),
        None => Vec::new(),
    };

    trace!(
        line = open.number(),
        entries = root.entries.len(),
        lined = root.lined;
        "Parsed node record"
    );

    NodeRecord { root, trailing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::split_lines;

    fn parse(source: &str) -> (NodeRecord<'_>, DiagnosticCollector) {
        let lines = split_lines(source);
        let mut collector = DiagnosticCollector::new();
        let record = parse_record(lines[0], &lines[1..], &mut collector);
        (record, collector)
    }

    fn texts(record: &NodeRecord<'_>) -> Vec<String> {
        record
            .render("  ")
            .iter()
            .map(|line| line.text().to_string())
            .collect()
    }

    const NODE: &str = "  node [\n    id 0\n    name \"Iron Plate\"\n    graphics [\n      type \"ellipse\"\n      fill \"#FFCC99\"\n    ]\n  ]";

    #[test]
    fn test_parse_structure() {
        let (record, collector) = parse(NODE);

        assert!(collector.diagnostics().is_empty());
        assert!(record.is_terminated());

        let root = record.root();
        assert_eq!(root.key(), "node");
        assert_eq!(root.indent, "  ");
        assert_eq!(root.entries().len(), 3);
        assert_eq!(root.find_attribute("name"), Some(1));

        let name = root.entries()[1].as_attribute().unwrap();
        assert_eq!(name.value(), "Iron Plate");
        assert_eq!(name.indent, "    ");

        let graphics = root.entries()[2].as_block().unwrap();
        assert_eq!(graphics.key(), "graphics");
        assert!(graphics.is_closed());
        assert_eq!(graphics.find_attribute("type"), Some(0));
        assert_eq!(graphics.child_indent("  "), "      ");
    }

    #[test]
    fn test_untouched_record_renders_identically() {
        let (record, _) = parse(NODE);
        assert_eq!(texts(&record).join("\n"), NODE);
    }

    #[test]
    fn test_edited_attribute_keeps_rest_of_line() {
        let (mut record, _) = parse("  node [\n    graphics [\n      type  ellipse   \n    ]\n  ]");
        let graphics = record.root_mut().entries_mut()[0].as_block_mut().unwrap();
        graphics.entries_mut()[0]
            .as_attribute_mut()
            .unwrap()
            .set_quoted("rectangle");

        assert_eq!(texts(&record)[2], "      type  \"rectangle\"   ");
    }

    #[test]
    fn test_synthesized_block_renders() {
        let (mut record, _) = parse("  node [\n    id 1\n  ]");
        let indent = record.root().child_indent("  ");
        let block = Block::synthesized(
            indent.clone(),
            "graphics",
            vec![Entry::Attribute(Attribute::quoted(
                format!("{indent}  "),
                "type",
                "rectangle",
            ))],
        );
        record.root_mut().push(Entry::Block(block));

        assert_eq!(
            texts(&record),
            vec![
                "  node [",
                "    id 1",
                "    graphics [",
                "      type \"rectangle\"",
                "    ]",
                "  ]"
            ]
        );
    }

    #[test]
    fn test_single_line_record() {
        let source = "  node [ id 3 name \"Copper Plate\" ]";
        let (record, collector) = parse(source);

        assert!(collector.diagnostics().is_empty());
        assert!(record.is_terminated());
        assert_eq!(record.root().entries().len(), 2);
        assert_eq!(record.root().find_attribute("name"), Some(1));
        assert_eq!(texts(&record), vec![source]);
    }

    #[test]
    fn test_single_line_record_is_laid_out_when_reshaped() {
        let (mut record, _) = parse("  node [ id 3 name \"Copper Plate\" ]");
        record
            .root_mut()
            .insert(2, Entry::Attribute(Attribute::quoted("", "label", "copper plate")));

        assert_eq!(
            texts(&record),
            vec![
                "  node [",
                "    id 3",
                "    name \"Copper Plate\"",
                "    label \"copper plate\"",
                "  ]",
            ]
        );
    }

    #[test]
    fn test_inline_block_value_is_spliced() {
        let (mut record, _) = parse("  node [\n    graphics [ type \"oval\" w 3 ]  \n  ]");
        let graphics = record.root_mut().entries_mut()[0].as_block_mut().unwrap();
        assert_eq!(graphics.entries().len(), 2);
        graphics.entries_mut()[0]
            .as_attribute_mut()
            .unwrap()
            .set_quoted("rectangle");

        assert_eq!(
            texts(&record),
            vec!["  node [", "    graphics [ type \"rectangle\" w 3 ]  ", "  ]"]
        );
    }

    #[test]
    fn test_reshaped_inline_block_is_laid_out_alone() {
        let (mut record, _) = parse("  node [\n    name \"A\"\n    graphics [ w 30 ]\n  ]");
        let graphics = record.root_mut().entries_mut()[1].as_block_mut().unwrap();
        let indent = graphics.child_indent("  ");
        graphics.push(Entry::Attribute(Attribute::quoted(indent, "type", "rectangle")));

        assert_eq!(
            texts(&record),
            vec![
                "  node [",
                "    name \"A\"",
                "    graphics [",
                "      w 30",
                "      type \"rectangle\"",
                "    ]",
                "  ]",
            ]
        );
    }

    #[test]
    fn test_removal_from_inline_block() {
        let (mut record, _) = parse("node [ LabelGraphics [ text \"X\" fontSize 12 ] ]");
        let label_graphics = record.root_mut().entries_mut()[0].as_block_mut().unwrap();
        label_graphics.remove(0);

        assert_eq!(
            texts(&record),
            vec!["node [", "  LabelGraphics [", "    fontSize 12", "  ]", "]"]
        );
    }

    #[test]
    fn test_attribute_span() {
        let lines = split_lines("x\n  node [ name \"A\" ]");
        let mut collector = DiagnosticCollector::new();
        let record = parse_record(lines[1], &lines[2..], &mut collector);

        let name = record.root().entries()[0].as_attribute().unwrap();
        assert_eq!(name.span(), Some(Span::new(11..19)));
        assert_eq!(Attribute::quoted("", "label", "a").span(), None);
    }

    #[test]
    fn test_source_terminators_are_kept() {
        let (record, _) = parse("node [\r\n  id 1\n]");
        let lines = record.render("  ");

        assert_eq!(lines[0].terminator(), Some("\r\n"));
        assert_eq!(lines[1].terminator(), Some("\n"));
        assert_eq!(lines[2].terminator(), Some(""));
    }

    #[test]
    fn test_unterminated_record() {
        let (record, collector) = parse("  node [\n    id 1\n    name \"a\"");

        assert!(!record.is_terminated());
        assert!(collector.diagnostics().is_empty());
        assert_eq!(record.render("  ").len(), 3);
    }

    #[test]
    fn test_unclosed_sub_block() {
        let (record, collector) = parse("  node [\n    graphics [\n      type \"oval\"");

        let diags = collector.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code(), Some(ErrorCode::E102));

        let graphics = record.root().entries()[0].as_block().unwrap();
        assert!(!graphics.is_closed());
        assert_eq!(graphics.entries().len(), 1);
    }

    #[test]
    fn test_unterminated_string_is_raw() {
        let (record, collector) = parse("  node [\n    name \"broken\n  ]");

        assert_eq!(collector.diagnostics()[0].code(), Some(ErrorCode::E001));
        let Entry::Raw(raw) = record.root().entries()[0] else {
            panic!("Expected raw entry");
        };
        assert_eq!(raw.text(), "name \"broken");
        assert_eq!(record.root().find_attribute("name"), None);
        assert!(record.is_terminated());
    }

    #[test]
    fn test_unknown_tokens_are_one_raw_entry() {
        let (record, _) = parse("  node [\n    # a note\n\n  ]");

        let entries = record.root().entries();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], Entry::Raw(raw) if raw.text() == "# a note"));
        assert!(matches!(entries[1], Entry::Blank(_)));
    }

    #[test]
    fn test_lines_after_close_are_kept() {
        let (record, _) = parse("  node [\n  ]\n  edge [");
        assert_eq!(texts(&record), vec!["  node [", "  ]", "  edge ["]);
    }

    #[test]
    fn test_nested_blocks_match_structurally() {
        let source = "node [\ngraphics [\nLine [\npoint [\n]\n]\n]\nid 1\n]";
        let (record, collector) = parse(source);

        assert!(collector.diagnostics().is_empty());
        assert!(record.is_terminated());
        assert_eq!(record.root().entries().len(), 2);
        assert_eq!(texts(&record).join("\n"), source);
    }
}
