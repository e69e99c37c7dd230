//! Node record transformation.
//!
//! Each node record is parsed into a tree, checked for the attributes that
//! matter (`name`, `label`, the `graphics` block and its `type`, the
//! `LabelGraphics` block and its `text`), and edited so that:
//! - a record with a name or label carries exactly one lowercase `label`
//! - its first `graphics` block has `type "rectangle"`
//! - `LabelGraphics.text` matches the label
//!
//! Edits are applied in a fixed order, each one seeing the result of the
//! previous ones. Entries that are not edited keep their source bytes.

use log::debug;

use gmlfix_parser::{
    Attribute, Block, Entry, NodeRecord, OutputLine,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    parse_record,
};

use crate::{extract::NodeBlock, label::target_label};

/// Shape every node record ends up with.
pub const RECTANGLE: &str = "rectangle";

const NAME: &str = "name";
const LABEL: &str = "label";
const GRAPHICS: &str = "graphics";
const TYPE: &str = "type";
const LABEL_GRAPHICS: &str = "LabelGraphics";
const TEXT: &str = "text";

/// What happened to a record's `label`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAction {
    /// The existing label was rewritten in place.
    Replaced,
    /// A new label was added after `name`.
    Inserted,
    /// A new label was added as the last entry of the record.
    Appended,
    /// The existing label was removed because it had no usable text.
    Dropped,
    /// The record had no label and none could be derived.
    Unlabeled,
}

/// How the record's shape was fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeAction {
    /// `graphics.type` was rewritten in place.
    TypeReplaced,
    /// `graphics` had no `type`; one was added.
    TypeInserted,
    /// The record had no `graphics` block; one was added.
    GraphicsSynthesized,
}

/// What happened to `LabelGraphics.text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAction {
    Replaced,
    Dropped,
}

/// Summary of the edits made to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReport {
    target: Option<String>,
    label: LabelAction,
    shape: ShapeAction,
    label_graphics_text: Option<TextAction>,
    duplicate_labels: usize,
}

impl RecordReport {
    /// The sanitized label, if one could be derived.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn label(&self) -> LabelAction {
        self.label
    }

    pub fn shape(&self) -> ShapeAction {
        self.shape
    }

    /// `None` when the record has no `LabelGraphics.text`.
    pub fn label_graphics_text(&self) -> Option<TextAction> {
        self.label_graphics_text
    }

    /// Number of extra top-level `label` lines that were removed.
    pub fn duplicate_labels(&self) -> usize {
        self.duplicate_labels
    }
}

/// The replacement lines for one node record.
#[derive(Debug, Clone)]
pub struct Transformed<'a> {
    lines: Vec<OutputLine<'a>>,
    report: RecordReport,
}

impl<'a> Transformed<'a> {
    pub fn report(&self) -> &RecordReport {
        &self.report
    }

    pub fn into_lines(self) -> Vec<OutputLine<'a>> {
        self.lines
    }
}

/// Where the interesting entries of a record are, as indices into its
/// top-level entries.
#[derive(Debug, Default)]
struct Landmarks {
    name: Option<usize>,
    /// Every top-level `label`; the first one is authoritative.
    labels: Vec<usize>,
}

fn locate(root: &Block<'_>) -> Landmarks {
    let mut marks = Landmarks::default();

    for (index, entry) in root.entries().iter().enumerate() {
        match entry {
            Entry::Attribute(attr) if attr.key() == NAME && marks.name.is_none() => {
                marks.name = Some(index);
            }
            Entry::Attribute(attr) if attr.key() == LABEL => marks.labels.push(index),
            _ => {}
        }
    }

    marks
}

fn value_at<'r>(block: &'r Block<'_>, index: usize) -> Option<&'r str> {
    block
        .entries()
        .get(index)
        .and_then(Entry::as_attribute)
        .map(Attribute::value)
}

/// First direct sub-block named `key`.
fn block_mut<'b, 'a>(entries: &'b mut [Entry<'a>], key: &str) -> Option<&'b mut Block<'a>> {
    entries
        .iter_mut()
        .filter_map(Entry::as_block_mut)
        .find(|block| block.key() == key)
}

/// Apply the normalization rules to a parsed record.
///
/// Rules, in order:
/// 1. rewrite the existing `label` (or drop it when there is no target);
///    extra top-level labels are dropped
/// 2. rewrite `graphics.type` to `"rectangle"`
/// 3. rewrite `LabelGraphics.text` (or drop it when there is no target)
/// 4. add a missing label after `name`
/// 5. add a missing `type` at the end of `graphics`
/// 6. add a `graphics` block when there is none, after the label, else after
///    `name`, else at the end of the record
/// 7. add a still missing label at the end of the record
///
/// New lines are indented one `indent_unit` deeper than their parent block.
/// A block written on one line that gains or loses an entry is laid out
/// again, one entry per line.
pub fn normalize_record(
    record: &mut NodeRecord<'_>,
    indent_unit: &str,
    collector: &mut DiagnosticCollector,
) -> RecordReport {
    let open_span = record
        .root()
        .open_line()
        .map(|line| line.span())
        .unwrap_or_default();
    let root = record.root_mut();
    let marks = locate(root);

    let target = target_label(
        marks
            .labels
            .first()
            .and_then(|&index| value_at(root, index)),
        marks.name.and_then(|index| value_at(root, index)),
    );

    if target.is_none() {
        collector.emit(
            Diagnostic::warning("node record has no name or label")
                .with_code(ErrorCode::E200)
                .with_label(open_span, "this record stays unlabeled")
                .with_help("add a `name` or `label` attribute to the node"),
        );
    }

    let label_indent = root.child_indent(indent_unit);

    // Rule 1
    let mut label_action = None;
    let mut duplicate_labels = 0;
    if let Some((&first, duplicates)) = marks.labels.split_first() {
        let mut removed: Vec<usize> = duplicates.to_vec();
        match (&target, root.entries_mut()[first].as_attribute_mut()) {
            (Some(text), Some(label)) => {
                label.set_quoted(text.clone());
                label_action = Some(LabelAction::Replaced);
            }
            _ => {
                removed.push(first);
                label_action = Some(LabelAction::Dropped);
            }
        }

        for &index in duplicates {
            let span = root.entries()[index]
                .as_attribute()
                .and_then(Attribute::span)
                .unwrap_or(open_span);
            collector.emit(
                Diagnostic::warning("node record has more than one label")
                    .with_code(ErrorCode::E201)
                    .with_label(span, "this label is removed")
                    .with_secondary_label(open_span, "node record opened here")
                    .with_help("keep a single `label` per node"),
            );
        }
        duplicate_labels = duplicates.len();

        removed.sort_unstable();
        for index in removed.into_iter().rev() {
            root.remove(index);
        }
    }

    // Rule 2
    let mut shape_action = None;
    if let Some(graphics) = block_mut(root.entries_mut(), GRAPHICS) {
        if let Some(index) = graphics.find_attribute(TYPE) {
            if let Some(shape) = graphics.entries_mut()[index].as_attribute_mut() {
                shape.set_quoted(RECTANGLE);
                shape_action = Some(ShapeAction::TypeReplaced);
            }
        }
    }

    // Rule 3
    let mut text_action = None;
    if let Some(label_graphics) = block_mut(root.entries_mut(), LABEL_GRAPHICS) {
        if let Some(index) = label_graphics.find_attribute(TEXT) {
            match (&target, label_graphics.entries_mut()[index].as_attribute_mut()) {
                (Some(label), Some(text)) => {
                    text.set_quoted(label.clone());
                    text_action = Some(TextAction::Replaced);
                }
                _ => {
                    label_graphics.remove(index);
                    text_action = Some(TextAction::Dropped);
                }
            }
        }
    }

    // Rule 4
    if let (None, Some(text), Some(name)) = (label_action, &target, root.find_attribute(NAME)) {
        // Directly after `name`. When `LabelGraphics` follows `name` this is
        // the slot in front of it, so `label` always precedes `LabelGraphics`.
        root.insert(
            name + 1,
            Entry::Attribute(Attribute::quoted(label_indent.clone(), LABEL, text.clone())),
        );
        label_action = Some(LabelAction::Inserted);
    }

    // Rule 5
    if shape_action.is_none() {
        if let Some(graphics) = block_mut(root.entries_mut(), GRAPHICS) {
            let indent = graphics.child_indent(indent_unit);
            graphics.push(Entry::Attribute(Attribute::quoted(indent, TYPE, RECTANGLE)));
            shape_action = Some(ShapeAction::TypeInserted);
        }
    }

    // Rule 6
    let shape = match shape_action {
        Some(action) => action,
        None => {
            let slot = root
                .find_attribute(LABEL)
                .or_else(|| root.find_attribute(NAME))
                .map_or(root.entries().len(), |index| index + 1);
            let type_indent = format!("{label_indent}{indent_unit}");
            let graphics = Block::synthesized(
                label_indent.clone(),
                GRAPHICS,
                vec![Entry::Attribute(Attribute::quoted(
                    type_indent,
                    TYPE,
                    RECTANGLE,
                ))],
            );
            root.insert(slot, Entry::Block(graphics));
            ShapeAction::GraphicsSynthesized
        }
    };

    // Rule 7
    let label = match (label_action, &target) {
        (Some(action), _) => action,
        (None, Some(text)) => {
            root.push(Entry::Attribute(Attribute::quoted(
                label_indent,
                LABEL,
                text.clone(),
            )));
            LabelAction::Appended
        }
        (None, None) => LabelAction::Unlabeled,
    };

    RecordReport {
        target,
        label,
        shape,
        label_graphics_text: text_action,
        duplicate_labels,
    }
}

/// Transform one extracted node record into its replacement lines.
///
/// Never fails: problems are reported to `collector` and the record is
/// rewritten as far as its content allows.
pub fn transform<'a>(
    block: &NodeBlock<'a>,
    indent_unit: &str,
    collector: &mut DiagnosticCollector,
) -> Transformed<'a> {
    let mut record = parse_record(block.open(), block.body(), collector);
    let report = normalize_record(&mut record, indent_unit, collector);

    debug!(
        line = block.open().number(),
        terminated = record.is_terminated(),
        target:? = report.target(),
        label:? = report.label(),
        shape:? = report.shape(),
        label_graphics_text:? = report.label_graphics_text(),
        duplicate_labels = report.duplicate_labels();
        "Normalized node record"
    );

    Transformed {
        lines: record.render(indent_unit),
        report,
    }
}
