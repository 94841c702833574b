//! File Parser: walks a file's lines and tracks the active section prefix.

use log::Level;

use crate::classify::LineClassifier;
use crate::config::MatchMode;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::model::ParsedFile;

/// Parse one file's lines (line endings already stripped) into observations.
///
/// A line equal to a known section header switches the prefix and is never
/// classified as a result line. The first result line seen before any header
/// emits a single `MissingSection` warning; it and every later line until a
/// header use the empty prefix.
pub fn parse_file<I, S>(
    lines: I,
    classifier: &LineClassifier,
    mode: MatchMode,
    sink: &mut dyn DiagnosticSink,
) -> ParsedFile
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedFile::default();
    let mut prefix: Option<String> = None;

    for line in lines {
        let line = line.as_ref();
        parsed.lines_read += 1;

        if let Some(section) = classifier.match_header(line) {
            parsed.header_lines += 1;
            prefix = Some(section.prefix.clone());
            if sink.wants(Level::Debug) {
                sink.emit(Diagnostic::SectionEntered {
                    header: section.header.clone(),
                    prefix: section.prefix.clone(),
                });
            }
            continue;
        }

        let active = prefix.as_deref().unwrap_or("");
        let observations = match mode {
            MatchMode::All => classifier.classify(line, active),
            MatchMode::First => classifier.classify_first(line, active).into_iter().collect(),
        };

        if observations.is_empty() {
            parsed.unmatched_lines += 1;
            if sink.wants(Level::Debug) {
                sink.emit(Diagnostic::LineUnmatched {
                    line: line.to_string(),
                });
            }
            continue;
        }

        if prefix.is_none() {
            sink.emit(Diagnostic::MissingSection {
                line: line.to_string(),
            });
            prefix = Some(String::new());
        }

        parsed.matched_lines += 1;
        if sink.wants(Level::Debug) {
            sink.emit(Diagnostic::LineMatched {
                line: line.to_string(),
                grammars: observations.iter().map(|o| o.grammar).collect(),
            });
        }
        parsed.observations.extend(observations);
    }

    parsed
}
