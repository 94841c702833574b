//! Merge Engine: one record per parameter across all input files.

use std::collections::BTreeMap;

use log::Level;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::model::{
    Field, FieldConflict, FieldValue, FileObservationSet, MergedParameterRecord, MergedTable,
    Observation,
};

/// Merge per-file observations into the unified table.
///
/// Within one file a later observation for the same parameter replaces the
/// earlier one. For each parameter, min/max/units must be identical across
/// every file that reports it (absent counts as a value); otherwise the field
/// becomes [`FieldValue::Conflict`] and one error diagnostic is emitted per
/// conflicting field.
pub fn merge_all(files: &[FileObservationSet], sink: &mut dyn DiagnosticSink) -> MergedTable {
    // Phase 1: parameter -> (file position -> observation)
    let mut grouped: BTreeMap<&str, BTreeMap<usize, &Observation>> = BTreeMap::new();
    for (file_idx, file) in files.iter().enumerate() {
        for obs in &file.observations {
            let per_file = grouped.entry(obs.parameter.as_str()).or_default();
            if per_file.insert(file_idx, obs).is_some() && sink.wants(Level::Debug) {
                sink.emit(Diagnostic::DuplicateParameter {
                    source: file.source.id.clone(),
                    parameter: obs.parameter.clone(),
                });
            }
        }
    }

    // Phase 2 + 3: agreement check and assembly
    let mut records = BTreeMap::new();
    let mut conflicts = Vec::new();
    for (parameter, per_file) in &grouped {
        let mut merge_field = |field: Field| -> FieldValue {
            let distinct = distinct_values(per_file.values().map(|obs| obs.field(field)));
            if let [only] = distinct.as_slice() {
                return FieldValue::Agreed(only.map(str::to_string));
            }
            let conflict = FieldConflict {
                parameter: parameter.to_string(),
                field,
                values: distinct.iter().map(|v| v.map(str::to_string)).collect(),
            };
            sink.emit(Diagnostic::FieldConflict(conflict.clone()));
            conflicts.push(conflict);
            FieldValue::Conflict
        };

        let [min_value, max_value, units] = Field::ALL.map(&mut merge_field);

        let values = per_file
            .iter()
            .map(|(&file_idx, obs)| (files[file_idx].source.id.clone(), obs.current_value.clone()))
            .collect();

        let record = MergedParameterRecord {
            parameter: parameter.to_string(),
            min_value,
            max_value,
            units,
            values,
        };
        records.insert(parameter.to_string(), record);
    }

    MergedTable {
        sources: files.iter().map(|f| f.source.clone()).collect(),
        records,
        conflicts,
    }
}

/// Distinct values in first-seen order.
fn distinct_values<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<Option<&'a str>> {
    let mut distinct: Vec<Option<&str>> = Vec::new();
    for v in values {
        if !distinct.contains(&v) {
            distinct.push(v);
        }
    }
    distinct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Grammar, SourceFile};

    fn obs(parameter: &str, value: &str, min: Option<&str>, max: Option<&str>, units: Option<&str>) -> Observation {
        Observation {
            parameter: parameter.into(),
            current_value: value.into(),
            min_value: min.map(Into::into),
            max_value: max.map(Into::into),
            units: units.map(Into::into),
            grammar: Grammar::Range,
        }
    }

    fn file(id: &str, observations: Vec<Observation>) -> FileObservationSet {
        FileObservationSet {
            source: SourceFile::new(id, id),
            observations,
        }
    }

    fn errors(diags: &[Diagnostic]) -> Vec<&FieldConflict> {
        diags
            .iter()
            .filter_map(|d| match d {
                Diagnostic::FieldConflict(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn agreement_keeps_common_metadata_and_all_values() {
        let files = vec![
            file("a", vec![obs("Sangre.Glucosa", "95", Some("70"), Some("110"), Some("mg/dL"))]),
            file("b", vec![obs("Sangre.Glucosa", "101", Some("70"), Some("110"), Some("mg/dL"))]),
        ];
        let mut diags: Vec<Diagnostic> = Vec::new();
        let table = merge_all(&files, &mut diags);

        assert_eq!(table.records.len(), 1);
        let rec = &table.records["Sangre.Glucosa"];
        assert_eq!(rec.min_value, FieldValue::Agreed(Some("70".into())));
        assert_eq!(rec.max_value, FieldValue::Agreed(Some("110".into())));
        assert_eq!(rec.units, FieldValue::Agreed(Some("mg/dL".into())));
        assert_eq!(rec.values["a"], "95");
        assert_eq!(rec.values["b"], "101");
        assert!(table.conflicts.is_empty());
        assert!(errors(&diags).is_empty());
    }

    #[test]
    fn units_conflict_is_flagged_once() {
        let files = vec![
            file("a", vec![obs("Sangre.Glucosa", "95", Some("70"), Some("110"), Some("mg/dL"))]),
            file("b", vec![obs("Sangre.Glucosa", "0.95", Some("70"), Some("110"), Some("g/L"))]),
        ];
        let mut diags: Vec<Diagnostic> = Vec::new();
        let table = merge_all(&files, &mut diags);

        let rec = &table.records["Sangre.Glucosa"];
        assert_eq!(rec.units, FieldValue::Conflict);
        assert_eq!(rec.min_value, FieldValue::Agreed(Some("70".into())));
        assert_eq!(rec.max_value, FieldValue::Agreed(Some("110".into())));

        let errs = errors(&diags);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].parameter, "Sangre.Glucosa");
        assert_eq!(errs[0].field, Field::Units);
        assert_eq!(errs[0].values, vec![Some("mg/dL".to_string()), Some("g/L".to_string())]);
        assert_eq!(table.conflicts.len(), 1);
    }

    #[test]
    fn absent_counts_as_distinct_value() {
        let files = vec![
            file("a", vec![obs("Sangre.Urea", "30", Some("15"), Some("45"), None)]),
            file("b", vec![obs("Sangre.Urea", "32", None, Some("45"), None)]),
        ];
        let mut diags: Vec<Diagnostic> = Vec::new();
        let table = merge_all(&files, &mut diags);

        let rec = &table.records["Sangre.Urea"];
        assert_eq!(rec.min_value, FieldValue::Conflict);
        assert_eq!(rec.max_value, FieldValue::Agreed(Some("45".into())));
        assert_eq!(rec.units, FieldValue::Agreed(None));
        assert_eq!(errors(&diags)[0].values, vec![Some("15".to_string()), None]);
    }

    #[test]
    fn missing_parameter_is_absent_from_values() {
        let files = vec![
            file("a", vec![obs("Sangre.Glucosa", "95", Some("70"), Some("110"), Some("mg/dL"))]),
            file("b", vec![obs("Sangre.Urea", "30", Some("15"), Some("45"), Some("mg/dL"))]),
        ];
        let table = merge_all(&files, &mut Vec::<Diagnostic>::new());

        assert_eq!(table.records.len(), 2);
        assert!(!table.records["Sangre.Glucosa"].values.contains_key("b"));
        assert!(!table.records["Sangre.Urea"].values.contains_key("a"));
        assert_eq!(table.sources.len(), 2);
        assert!(table.conflicts.is_empty());
    }

    #[test]
    fn last_write_wins_within_a_file() {
        let files = vec![file(
            "a",
            vec![
                obs("Orina.pH", "5", Some("5"), Some("8"), None),
                obs("Orina.pH", "6", Some("5"), Some("8"), None),
            ],
        )];
        let mut diags: Vec<Diagnostic> = Vec::new();
        let table = merge_all(&files, &mut diags);

        assert_eq!(table.records["Orina.pH"].values["a"], "6");
        assert!(diags.iter().any(|d| matches!(
            d,
            Diagnostic::DuplicateParameter { parameter, .. } if parameter == "Orina.pH"
        )));
    }

    #[test]
    fn intra_file_duplicate_only_compares_the_kept_observation() {
        // File a reports pH twice with different ranges; only the later one
        // takes part in the cross-file check.
        let files = vec![
            file(
                "a",
                vec![
                    obs("Orina.pH", "5", Some("4"), Some("9"), None),
                    obs("Orina.pH", "6", Some("5"), Some("8"), None),
                ],
            ),
            file("b", vec![obs("Orina.pH", "7", Some("5"), Some("8"), None)]),
        ];
        let mut diags: Vec<Diagnostic> = Vec::new();
        let table = merge_all(&files, &mut diags);
        assert!(table.conflicts.is_empty());
        assert_eq!(table.records["Orina.pH"].min_value, FieldValue::Agreed(Some("5".into())));
    }

    #[test]
    fn records_sorted_by_parameter() {
        let files = vec![file(
            "a",
            vec![
                obs("Sangre.Urea", "30", None, None, None),
                obs("Orina.pH", "6", None, None, None),
                obs("Sangre.Glucosa", "95", None, None, None),
            ],
        )];
        let table = merge_all(&files, &mut Vec::<Diagnostic>::new());
        let keys: Vec<&str> = table.records.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Orina.pH", "Sangre.Glucosa", "Sangre.Urea"]);
    }

    #[test]
    fn empty_input() {
        let table = merge_all(&[], &mut Vec::<Diagnostic>::new());
        assert!(table.records.is_empty());
        assert!(table.sources.is_empty());
    }
}
