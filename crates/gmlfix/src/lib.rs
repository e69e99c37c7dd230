//! gmlfix - normalizes node records in GML graph documents.
//!
//! Every `node [ ... ]` record of a document is rewritten so that it carries
//! a lowercase `label` (taken from its label or its name), a `graphics` block
//! with `type "rectangle"`, and a `LabelGraphics.text` matching the label.
//! All other lines are left byte for byte as they were.
//!
//! The work happens in three stages, each in its own module:
//! - [`extract`] splits the document into node records and passthrough lines
//! - [`transform`] rewrites one node record
//! - [`assemble`] joins the lines back into a document

pub mod assemble;
pub mod config;
pub mod extract;
pub mod transform;

mod error;
mod label;

pub use gmlfix_parser::{
    LineEnding, Span,
    error::{Diagnostic, ErrorCode, ParseError, Severity},
};

pub use error::GmlfixError;
pub use label::{sanitize_label, target_label};

use log::{info, trace};

use gmlfix_parser::{OutputLine, error::DiagnosticCollector, split_lines};

use assemble::assemble;
use config::AppConfig;
use extract::{NodeBlock, Segment, extract};
use transform::{LabelAction, RecordReport, ShapeAction, transform};

/// Counts of what one normalization run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub node_records: usize,
    pub labels_replaced: usize,
    pub labels_inserted: usize,
    pub labels_dropped: usize,
    /// Records left without a label because they have no name or label.
    pub unlabeled: usize,
    pub types_replaced: usize,
    pub types_inserted: usize,
    pub graphics_synthesized: usize,
    /// Records cut short by another record or by the end of the document.
    pub unterminated: usize,
}

impl NormalizeStats {
    fn record(&mut self, block: &NodeBlock<'_>, report: &RecordReport) {
        self.node_records += 1;
        if !block.is_terminated() {
            self.unterminated += 1;
        }

        match report.label() {
            LabelAction::Replaced => self.labels_replaced += 1,
            LabelAction::Inserted | LabelAction::Appended => self.labels_inserted += 1,
            LabelAction::Dropped => self.labels_dropped += 1,
            LabelAction::Unlabeled => {}
        }
        if report.target().is_none() {
            self.unlabeled += 1;
        }

        match report.shape() {
            ShapeAction::TypeReplaced => self.types_replaced += 1,
            ShapeAction::TypeInserted => self.types_inserted += 1,
            ShapeAction::GraphicsSynthesized => self.graphics_synthesized += 1,
        }
    }
}

/// The result of a successful normalization run.
#[derive(Debug, Clone)]
pub struct Normalized {
    text: String,
    warnings: Vec<Diagnostic>,
    stats: NormalizeStats,
}

impl Normalized {
    /// The normalized document.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Problems found in the input that were recovered from.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn stats(&self) -> NormalizeStats {
        self.stats
    }
}

/// Entry point for normalizing GML documents.
///
/// # Examples
///
/// ```
/// use gmlfix::{Normalizer, config::AppConfig};
///
/// let source = "graph [\n  node [\n    id 3\n    name \"Copper Plate\"\n  ]\n]\n";
///
/// let normalizer = Normalizer::new(AppConfig::default());
/// let normalized = normalizer.normalize(source).expect("Failed to normalize");
///
/// assert!(normalized.text().contains("    label \"copper plate\"\n"));
/// assert_eq!(normalized.stats().graphics_synthesized, 1);
/// ```
#[derive(Debug, Default)]
pub struct Normalizer {
    config: AppConfig,
}

impl Normalizer {
    /// Create a new normalizer with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Normalize every node record in `source`.
    ///
    /// Malformed records are recovered and reported as warnings in the
    /// result.
    ///
    /// # Errors
    ///
    /// An invalid configuration fails with [`GmlfixError::Config`]. In strict
    /// mode any warning fails the run with [`GmlfixError::Parse`], carrying
    /// every diagnostic and the source.
    pub fn normalize(&self, source: &str) -> Result<Normalized, GmlfixError> {
        self.config.validate().map_err(GmlfixError::Config)?;

        let detected = LineEnding::detect(source);
        let lines = split_lines(source);
        info!(lines = lines.len(), line_ending:% = detected; "Normalizing document");

        let mut collector = if self.config.normalize().strict() {
            DiagnosticCollector::strict()
        } else {
            DiagnosticCollector::new()
        };

        let segments = extract(&lines, &mut collector);
        trace!(segments = segments.len(); "Document split into segments");

        let indent_unit = self.config.normalize().indent_unit();
        let mut stats = NormalizeStats::default();
        let mut output: Vec<OutputLine<'_>> = Vec::with_capacity(lines.len());

        for segment in &segments {
            match segment {
                Segment::Passthrough(line) => output.push(OutputLine::source(*line)),
                Segment::Node(block) => {
                    let transformed = transform(block, &indent_unit, &mut collector);
                    stats.record(block, transformed.report());
                    output.extend(transformed.into_lines());
                }
            }
        }

        let terminators = self.config.output().line_ending().resolve(detected);
        let text = assemble(output, terminators);

        let warnings = collector
            .finish()
            .map_err(|err| GmlfixError::new_parse_error(err, source))?;

        info!(
            node_records = stats.node_records,
            labels_inserted = stats.labels_inserted,
            labels_replaced = stats.labels_replaced,
            graphics_synthesized = stats.graphics_synthesized,
            unlabeled = stats.unlabeled,
            warnings = warnings.len();
            "Document normalized"
        );

        Ok(Normalized {
            text,
            warnings,
            stats,
        })
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use gmlfix_parser::{Block, NodeRecord, parse_record};

    use super::*;

    // ===================
    // Strategies
    // ===================

    #[derive(Debug, Clone)]
    struct NodeSpec {
        name: Option<String>,
        label: Option<String>,
        /// `Some(None)` is a `graphics` block without `type`.
        shape: Option<Option<String>>,
        label_graphics: bool,
    }

    /// Strategy for attribute text, including the reserved `&`.
    fn text_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 &]{0,12}"
    }

    fn node_strategy() -> impl Strategy<Value = NodeSpec> {
        (
            proptest::option::of(text_strategy()),
            proptest::option::of(text_strategy()),
            proptest::option::of(proptest::option::of("[a-z]{1,9}")),
            any::<bool>(),
        )
            .prop_map(|(name, label, shape, label_graphics)| NodeSpec {
                name,
                label,
                shape,
                label_graphics,
            })
    }

    fn render_node(id: usize, node: &NodeSpec) -> String {
        let mut out = format!("  node [\n    id {id}\n");
        if let Some(name) = &node.name {
            out.push_str(&format!("    name \"{name}\"\n"));
        }
        if let Some(label) = &node.label {
            out.push_str(&format!("    label \"{label}\"\n"));
        }
        match &node.shape {
            Some(Some(shape)) => {
                out.push_str(&format!("    graphics [\n      type \"{shape}\"\n    ]\n"));
            }
            Some(None) => out.push_str("    graphics [\n      w 30.0\n    ]\n"),
            None => {}
        }
        if node.label_graphics {
            out.push_str("    LabelGraphics [\n      text \"Stale\"\n    ]\n");
        }
        out.push_str("  ]\n");
        out
    }

    fn render_document(nodes: &[NodeSpec]) -> String {
        let mut out = String::from("Creator \"test\"\ngraph [\n  directed 1\n");
        for (id, node) in nodes.iter().enumerate() {
            out.push_str(&render_node(id, node));
        }
        out.push_str("  edge [\n    source 0\n    target 1\n  ]\n]\n");
        out
    }

    fn parse_records(text: &str) -> Vec<NodeRecord<'_>> {
        let lines = split_lines(text);
        let mut collector = DiagnosticCollector::new();
        extract(&lines, &mut collector)
            .iter()
            .filter_map(|segment| match segment {
                Segment::Node(block) => {
                    Some(parse_record(block.open(), block.body(), &mut collector))
                }
                Segment::Passthrough(_) => None,
            })
            .collect()
    }

    fn passthrough_lines(text: &str) -> Vec<&str> {
        let lines = split_lines(text);
        let mut collector = DiagnosticCollector::new();
        extract(&lines, &mut collector)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Passthrough(line) => Some(line.text()),
                Segment::Node(_) => None,
            })
            .collect()
    }

    fn attribute_values<'r>(block: &'r Block<'_>, key: &str) -> Vec<&'r str> {
        block
            .entries()
            .iter()
            .filter_map(|entry| entry.as_attribute())
            .filter(|attr| attr.key() == key)
            .map(|attr| attr.value())
            .collect()
    }

    fn blocks<'r, 'a>(block: &'r Block<'a>, key: &str) -> Vec<&'r Block<'a>> {
        block
            .entries()
            .iter()
            .filter_map(|entry| entry.as_block())
            .filter(|sub| sub.key() == key)
            .collect()
    }

    fn normalize(source: &str) -> Result<Normalized, TestCaseError> {
        Normalizer::default()
            .normalize(source)
            .map_err(|err| TestCaseError::fail(format!("normalize failed: {err}")))
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Every record with a name or label ends up with exactly one sanitized
    /// top-level label; records with neither get none.
    fn check_label_coverage(nodes: &[NodeSpec]) -> Result<(), TestCaseError> {
        let normalized = normalize(&render_document(nodes))?;
        let records = parse_records(normalized.text());
        prop_assert_eq!(records.len(), nodes.len());

        for (node, record) in nodes.iter().zip(&records) {
            let expected = target_label(node.label.as_deref(), node.name.as_deref());
            let labels = attribute_values(record.root(), "label");
            match &expected {
                Some(target) => prop_assert_eq!(labels, vec![target.as_str()]),
                None => prop_assert!(labels.is_empty()),
            }
        }
        Ok(())
    }

    /// Every record has exactly one graphics block, of type rectangle.
    fn check_shape_normalization(nodes: &[NodeSpec]) -> Result<(), TestCaseError> {
        let normalized = normalize(&render_document(nodes))?;

        for record in parse_records(normalized.text()) {
            let graphics = blocks(record.root(), "graphics");
            prop_assert_eq!(graphics.len(), 1);
            prop_assert_eq!(attribute_values(graphics[0], "type"), vec!["rectangle"]);
        }
        Ok(())
    }

    /// `LabelGraphics.text` always matches the label.
    fn check_label_graphics_consistency(nodes: &[NodeSpec]) -> Result<(), TestCaseError> {
        let normalized = normalize(&render_document(nodes))?;
        let records = parse_records(normalized.text());

        for (node, record) in nodes.iter().zip(&records) {
            let expected = target_label(node.label.as_deref(), node.name.as_deref());
            for label_graphics in blocks(record.root(), "LabelGraphics") {
                let text = attribute_values(label_graphics, "text");
                match &expected {
                    Some(target) => prop_assert_eq!(text, vec![target.as_str()]),
                    None => prop_assert!(text.is_empty()),
                }
            }
        }
        Ok(())
    }

    /// Lines outside node records come out unchanged and in order.
    fn check_passthrough_fidelity(nodes: &[NodeSpec]) -> Result<(), TestCaseError> {
        let source = render_document(nodes);
        let normalized = normalize(&source)?;

        prop_assert_eq!(
            passthrough_lines(normalized.text()),
            passthrough_lines(&source)
        );
        Ok(())
    }

    /// Sanitized labels are lowercase and never contain `&`.
    fn check_sanitization(text: &str) -> Result<(), TestCaseError> {
        let sanitized = sanitize_label(text);
        prop_assert!(!sanitized.contains('&'));
        prop_assert_eq!(sanitized.clone(), sanitized.to_lowercase());
        prop_assert_eq!(sanitized.matches('+').count(), text.matches(['&', '+']).count());
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn label_coverage(nodes in prop::collection::vec(node_strategy(), 0..6)) {
            check_label_coverage(&nodes)?;
        }

        #[test]
        fn shape_normalization(nodes in prop::collection::vec(node_strategy(), 0..6)) {
            check_shape_normalization(&nodes)?;
        }

        #[test]
        fn label_graphics_consistency(nodes in prop::collection::vec(node_strategy(), 0..6)) {
            check_label_graphics_consistency(&nodes)?;
        }

        #[test]
        fn passthrough_fidelity(nodes in prop::collection::vec(node_strategy(), 0..6)) {
            check_passthrough_fidelity(&nodes)?;
        }

        #[test]
        fn sanitization(text in text_strategy()) {
            check_sanitization(&text)?;
        }
    }
}
