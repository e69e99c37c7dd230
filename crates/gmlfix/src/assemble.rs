//! Document assembly.

use gmlfix_parser::{LineEnding, OutputLine};

/// How output lines are terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminators {
    /// Source lines keep their own terminator; synthesized lines and a last
    /// line without one get `fallback`.
    Keep { fallback: LineEnding },
    /// Every line gets the same terminator.
    Uniform(LineEnding),
}

/// Join `lines` into a document.
///
/// The result always ends with a terminator; an empty document becomes a
/// single terminator.
pub fn assemble<'a, I>(lines: I, terminators: Terminators) -> String
where
    I: IntoIterator<Item = OutputLine<'a>>,
{
    let fallback = match terminators {
        Terminators::Keep { fallback } => fallback,
        Terminators::Uniform(ending) => ending,
    };
    let mut out = String::new();

    for line in lines {
        out.push_str(line.text());
        let terminator = match (terminators, line.terminator()) {
            (Terminators::Keep { .. }, Some(source)) if !source.is_empty() => source,
            _ => fallback.as_str(),
        };
        out.push_str(terminator);
    }

    if out.is_empty() {
        out.push_str(fallback.as_str());
    }

    out
}

#[cfg(test)]
mod tests {
    use gmlfix_parser::split_lines;

    use super::*;

    fn synthesized(texts: &[&str]) -> Vec<OutputLine<'static>> {
        texts
            .iter()
            .map(|text| OutputLine::synthesized(text.to_string()))
            .collect()
    }

    const KEEP_LF: Terminators = Terminators::Keep {
        fallback: LineEnding::Lf,
    };

    #[test]
    fn test_assemble_synthesized_lines_use_fallback() {
        assert_eq!(assemble(synthesized(&["a", "b"]), KEEP_LF), "a\nb\n");
        assert_eq!(
            assemble(
                synthesized(&["a", "b"]),
                Terminators::Keep {
                    fallback: LineEnding::CrLf
                }
            ),
            "a\r\nb\r\n"
        );
    }

    #[test]
    fn test_assemble_empty_document() {
        assert_eq!(assemble(Vec::new(), KEEP_LF), "\n");
        assert_eq!(
            assemble(Vec::new(), Terminators::Uniform(LineEnding::CrLf)),
            "\r\n"
        );
    }

    #[test]
    fn test_assemble_keeps_blank_lines() {
        assert_eq!(assemble(synthesized(&["a", "", ""]), KEEP_LF), "a\n\n\n");
    }

    #[test]
    fn test_mixed_terminators_survive() {
        let source = "graph [\r\n  directed 1\n  node [\r\n  ]\n]\r\n";
        let lines = split_lines(source).into_iter().map(OutputLine::source);

        assert_eq!(
            assemble(
                lines,
                Terminators::Keep {
                    fallback: LineEnding::CrLf
                }
            ),
            source
        );
    }

    #[test]
    fn test_missing_final_terminator_is_added() {
        let lines = split_lines("a\r\nb").into_iter().map(OutputLine::source);
        assert_eq!(
            assemble(
                lines,
                Terminators::Keep {
                    fallback: LineEnding::CrLf
                }
            ),
            "a\r\nb\r\n"
        );
    }

    #[test]
    fn test_uniform_rewrites_every_terminator() {
        let lines = split_lines("a\r\nb\nc").into_iter().map(OutputLine::source);
        assert_eq!(
            assemble(lines, Terminators::Uniform(LineEnding::Lf)),
            "a\nb\nc\n"
        );
    }
}
