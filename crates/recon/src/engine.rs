use crate::classify::LineClassifier;
use crate::config::LabConfig;
use crate::diagnostics::DiagnosticSink;
use crate::error::ReconError;
use crate::merge::merge_all;
use crate::model::{FileObservationSet, MergeSummary, MergedTable, SourceFile};
use crate::parser::parse_file;

/// Lines of one input file, already decoded and split.
#[derive(Debug, Clone)]
pub struct SourceInput {
    pub source: SourceFile,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub table: MergedTable,
    pub summary: MergeSummary,
}

/// Parse every input in order, then merge. Input order is column order.
pub fn run(
    config: &LabConfig,
    inputs: &[SourceInput],
    sink: &mut dyn DiagnosticSink,
) -> Result<RunOutput, ReconError> {
    config.validate()?;
    let classifier = LineClassifier::new(config)?;

    let mut counts = Vec::with_capacity(inputs.len());
    let mut sets = Vec::with_capacity(inputs.len());
    for input in inputs {
        let file = parse_file(&input.lines, &classifier, config.match_mode, sink);
        log::debug!(
            "{}: {} lines, {} headers, {} matched, {} unmatched, {} observations",
            input.source.id,
            file.lines_read,
            file.header_lines,
            file.matched_lines,
            file.unmatched_lines,
            file.observations.len()
        );
        counts.push((file.observations.len(), file.unmatched_lines));
        sets.push(FileObservationSet {
            source: input.source.clone(),
            observations: file.observations,
        });
    }

    let table = merge_all(&sets, sink);
    let summary = MergeSummary::new(counts, &table);

    Ok(RunOutput { table, summary })
}
