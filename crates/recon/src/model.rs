use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One input report, as handed over by file discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceFile {
    /// Stable identity of the file (its path as given).
    pub id: String,
    /// Human-facing name, before header sanitizing.
    pub display_name: String,
}

impl SourceFile {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// Result-line grammars, in the priority order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grammar {
    /// `<parameter> <value> <qualitative word...>`
    Descriptive,
    /// `<parameter> <value> <min> - <max> <units>`
    Range,
    /// `<parameter> <value> < <max> <units>`
    LessThan,
    /// `<parameter> <value> > <min> <units>`
    GreaterThan,
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Descriptive => write!(f, "descriptive"),
            Self::Range => write!(f, "range"),
            Self::LessThan => write!(f, "less_than"),
            Self::GreaterThan => write!(f, "greater_than"),
        }
    }
}

/// One parsed result line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    /// Section prefix + parameter text, spacing preserved.
    pub parameter: String,
    pub current_value: String,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
    pub units: Option<String>,
    pub grammar: Grammar,
}

impl Observation {
    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::MinValue => self.min_value.as_deref(),
            Field::MaxValue => self.max_value.as_deref(),
            Field::Units => self.units.as_deref(),
        }
    }
}

/// Output of parsing one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedFile {
    pub observations: Vec<Observation>,
    pub lines_read: usize,
    /// Result lines that produced at least one observation.
    pub matched_lines: usize,
    /// Lines that were neither a section header nor a result line.
    pub unmatched_lines: usize,
    pub header_lines: usize,
}

/// Ordered observations of one source file, ready for merging.
#[derive(Debug, Clone, Serialize)]
pub struct FileObservationSet {
    pub source: SourceFile,
    pub observations: Vec<Observation>,
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Reference metadata that must agree across files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    MinValue,
    MaxValue,
    Units,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::MinValue, Field::MaxValue, Field::Units];
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MinValue => write!(f, "min_val"),
            Self::MaxValue => write!(f, "max_val"),
            Self::Units => write!(f, "units"),
        }
    }
}

/// A merged min/max/units field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Every reporting file carried this same value (possibly absent).
    Agreed(Option<String>),
    /// Reporting files disagree; no single value was chosen.
    Conflict,
}

impl FieldValue {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict)
    }

    /// The agreed value, or `None` for absent and conflicting fields.
    pub fn agreed(&self) -> Option<&str> {
        match self {
            Self::Agreed(v) => v.as_deref(),
            Self::Conflict => None,
        }
    }

    /// Render for a report cell: absent is empty, conflict is `conflict_marker`.
    pub fn display<'a>(&'a self, conflict_marker: &'a str) -> &'a str {
        match self {
            Self::Agreed(Some(v)) => v,
            Self::Agreed(None) => "",
            Self::Conflict => conflict_marker,
        }
    }
}

/// One row of the merged table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedParameterRecord {
    pub parameter: String,
    pub min_value: FieldValue,
    pub max_value: FieldValue,
    pub units: FieldValue,
    /// Source id → current value. Files that do not report the parameter are absent.
    pub values: BTreeMap<String, String>,
}

/// A min/max/units disagreement found while merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldConflict {
    pub parameter: String,
    pub field: Field,
    /// Distinct values in first-seen file order; `None` is an absent value.
    pub values: Vec<Option<String>>,
}

impl std::fmt::Display for FieldConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self
            .values
            .iter()
            .map(|v| match v {
                Some(s) => format!("{s:?}"),
                None => "<absent>".to_string(),
            })
            .collect();
        write!(
            f,
            "multiple values for {} on parameter {:?}: {}",
            self.field,
            self.parameter,
            values.join(", ")
        )
    }
}

/// The unified parameter table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergedTable {
    /// Input files in column order.
    pub sources: Vec<SourceFile>,
    /// Parameter → record. Iteration order is the report row order.
    pub records: BTreeMap<String, MergedParameterRecord>,
    pub conflicts: Vec<FieldConflict>,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub files: usize,
    pub observations: usize,
    pub parameters: usize,
    pub conflicts: usize,
    pub unmatched_lines: usize,
}

impl MergeSummary {
    /// `parsed` holds `(observations, unmatched_lines)` per file.
    pub fn new(parsed: impl IntoIterator<Item = (usize, usize)>, table: &MergedTable) -> Self {
        let (observations, unmatched_lines) = parsed
            .into_iter()
            .fold((0, 0), |(o, u), (fo, fu)| (o + fo, u + fu));
        Self {
            files: table.sources.len(),
            observations,
            parameters: table.records.len(),
            conflicts: table.conflicts.len(),
            unmatched_lines,
        }
    }
}

impl std::fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files, {} observations, {} parameters, {} conflicts, {} unmatched lines",
            self.files, self.observations, self.parameters, self.conflicts, self.unmatched_lines
        )
    }
}
