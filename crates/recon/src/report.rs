//! Report table model shared by every output writer.
//!
//! Writers never look at a [`MergedTable`] directly: they render a [`Report`],
//! so the delimited-text and spreadsheet outputs carry the same cells in the
//! same order. Only the spreadsheet writer acts on [`ReportCell::emphasis`].

use serde::Serialize;

use crate::config::LabConfig;
use crate::model::MergedTable;

/// Fixed leading columns, before one column per input file.
pub const BASE_HEADERS: [&str; 4] = ["Parameter", "Min Val", "Max Val", "Units"];

#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Removed from every file display name before trimming.
    pub strip_from_name: String,
    pub missing_marker: String,
    pub conflict_marker: String,
}

impl ReportOptions {
    pub fn from_config(config: &LabConfig) -> Self {
        Self {
            strip_from_name: config.strip_from_name.clone(),
            missing_marker: config.missing_marker.clone(),
            conflict_marker: config.conflict_marker.clone(),
        }
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::from_config(&LabConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportCell {
    pub text: String,
    /// Numeric reading of `text`, for writers that store typed cells.
    pub number: Option<f64>,
    /// Value lies outside the row's numeric reference range.
    pub emphasis: bool,
}

impl ReportCell {
    /// A cell always written as text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            number: None,
            emphasis: false,
        }
    }

    /// A cell written as a number when its text parses as one.
    pub fn value(text: impl Into<String>) -> Self {
        let text = text.into();
        let number = parse_number(&text);
        Self {
            text,
            number,
            emphasis: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ReportCell>>,
}

impl Report {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Plain text grid, header first. What the delimited-text writer emits.
    pub fn text_rows(&self) -> Vec<Vec<&str>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(self.headers.iter().map(String::as_str).collect());
        for row in &self.rows {
            out.push(row.iter().map(|c| c.text.as_str()).collect());
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Numeric reading of a cell value. Never fails: anything that is not a
/// finite decimal number (after trimming whitespace) is `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Column header for a file: `strip` removed everywhere, then trimmed.
pub fn sanitize_header(display_name: &str, strip: &str) -> String {
    if strip.is_empty() {
        return display_name.trim().to_string();
    }
    display_name.replace(strip, "").trim().to_string()
}

/// True when `value` is below a numeric `min` or above a numeric `max`.
/// Each bound applies only if it parsed.
pub fn is_out_of_range(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    let Some(v) = value else {
        return false;
    };
    min.is_some_and(|lo| v < lo) || max.is_some_and(|hi| v > hi)
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Lay out the merged table: one row per parameter in parameter order, then
/// `Parameter, Min Val, Max Val, Units` and one column per source file.
pub fn build_report(table: &MergedTable, options: &ReportOptions) -> Report {
    let mut headers: Vec<String> = BASE_HEADERS.iter().map(|h| h.to_string()).collect();
    headers.extend(
        table
            .sources
            .iter()
            .map(|s| sanitize_header(&s.display_name, &options.strip_from_name)),
    );

    let conflict = options.conflict_marker.as_str();
    let rows = table
        .records
        .values()
        .map(|record| {
            let min = ReportCell::value(record.min_value.display(conflict));
            let max = ReportCell::value(record.max_value.display(conflict));
            let (lo, hi) = (min.number, max.number);

            let mut row = Vec::with_capacity(headers.len());
            row.push(ReportCell::text(record.parameter.as_str()));
            row.push(min);
            row.push(max);
            row.push(ReportCell::text(record.units.display(conflict)));

            for source in &table.sources {
                let cell = match record.values.get(&source.id) {
                    Some(v) => {
                        let mut cell = ReportCell::value(v.as_str());
                        cell.emphasis = is_out_of_range(cell.number, lo, hi);
                        cell
                    }
                    None => ReportCell::text(options.missing_marker.as_str()),
                };
                row.push(cell);
            }
            row
        })
        .collect();

    Report { headers, rows }
}
