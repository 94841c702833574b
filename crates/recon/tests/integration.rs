use std::path::PathBuf;

use labmerge_recon::diagnostics::{CountingSink, Diagnostic};
use labmerge_recon::model::{Field, FieldValue};
use labmerge_recon::{build_report, run, LabConfig, ReportOptions, RunOutput, SourceFile, SourceInput};

const MARCH_2023: &str = "2023-03 Antonio Luna.txt";
const JANUARY_2024: &str = "2024-01 Antonio Luna.txt";
const JUNE_2024: &str = "2024-06 Antonio Luna.txt";

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load(name: &str) -> SourceInput {
    let path = fixtures_dir().join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    let stem = name.trim_end_matches(".txt");
    SourceInput {
        source: SourceFile::new(name, stem),
        lines: text.lines().map(str::to_string).collect(),
    }
}

fn load_and_run(names: &[&str]) -> (RunOutput, Vec<Diagnostic>) {
    let inputs: Vec<SourceInput> = names.iter().map(|n| load(n)).collect();
    let mut diags: Vec<Diagnostic> = Vec::new();
    let out = run(&LabConfig::default(), &inputs, &mut diags).unwrap();
    (out, diags)
}

// -------------------------------------------------------------------------
// Merge
// -------------------------------------------------------------------------

#[test]
fn two_reports_merge_without_conflicts() {
    let (out, diags) = load_and_run(&[MARCH_2023, JANUARY_2024]);

    let params: Vec<&str> = out.table.records.keys().map(String::as_str).collect();
    assert_eq!(
        params,
        vec![
            "Orina.Aspecto",
            "Orina.Color",
            "Orina.Nitritos",
            "Orina.pH",
            "Sangre.Colesterol HDL",
            "Sangre.Colesterol total",
            "Sangre.Creatinina",
            "Sangre.Glucosa",
            "Sangre.Hemoglobina glicosilada",
            "Sangre.Triglicéridos",
            "Sangre.Urea",
        ]
    );

    let glucosa = &out.table.records["Sangre.Glucosa"];
    assert_eq!(glucosa.min_value, FieldValue::Agreed(Some("70".into())));
    assert_eq!(glucosa.max_value, FieldValue::Agreed(Some("110".into())));
    assert_eq!(glucosa.units, FieldValue::Agreed(Some("mg/dL".into())));
    assert_eq!(glucosa.values[MARCH_2023], "95");
    assert_eq!(glucosa.values[JANUARY_2024], "101");

    assert!(out.table.conflicts.is_empty());
    assert_eq!(out.summary.files, 2);
    assert_eq!(out.summary.parameters, 11);
    assert_eq!(out.summary.conflicts, 0);
    assert!(!diags.iter().any(|d| d.level() <= log::Level::Warn));
}

#[test]
fn unit_change_produces_conflicts() {
    let (out, diags) = load_and_run(&[MARCH_2023, JANUARY_2024, JUNE_2024]);

    let glucosa = &out.table.records["Sangre.Glucosa"];
    assert_eq!(glucosa.min_value, FieldValue::Conflict);
    assert_eq!(glucosa.max_value, FieldValue::Conflict);
    assert_eq!(glucosa.units, FieldValue::Conflict);
    assert_eq!(glucosa.values[JUNE_2024], "0.99");

    // Urea agrees in every file
    let urea = &out.table.records["Sangre.Urea"];
    assert_eq!(urea.units, FieldValue::Agreed(Some("mg/dL".into())));
    assert_eq!(urea.values.len(), 3);

    let fields: Vec<Field> = out.table.conflicts.iter().map(|c| c.field).collect();
    assert_eq!(fields, vec![Field::MinValue, Field::MaxValue, Field::Units]);
    assert!(out.table.conflicts.iter().all(|c| c.parameter == "Sangre.Glucosa"));
    assert_eq!(
        out.table.conflicts[2].values,
        vec![Some("mg/dL".to_string()), Some("g/L".to_string())]
    );

    let errors = diags.iter().filter(|d| d.level() == log::Level::Error).count();
    assert_eq!(errors, 3);
    assert_eq!(out.summary.conflicts, 3);
}

#[test]
fn counting_sink_matches_conflict_list() {
    let inputs: Vec<SourceInput> = [MARCH_2023, JANUARY_2024, JUNE_2024]
        .iter()
        .map(|n| load(n))
        .collect();
    let mut sink = CountingSink::new(Vec::<Diagnostic>::new());
    let out = run(&LabConfig::default(), &inputs, &mut sink).unwrap();
    assert_eq!(sink.errors, out.table.conflicts.len());
    assert_eq!(sink.warnings, 0);
}

// -------------------------------------------------------------------------
// Report
// -------------------------------------------------------------------------

#[test]
fn report_columns_and_missing_marker() {
    let (out, _) = load_and_run(&[MARCH_2023, JANUARY_2024]);
    let report = build_report(&out.table, &ReportOptions::default());

    assert_eq!(
        report.headers,
        vec!["Parameter", "Min Val", "Max Val", "Units", "2023-03", "2024-01"]
    );

    let rows = report.text_rows();
    let hba1c = rows
        .iter()
        .find(|r| r[0] == "Sangre.Hemoglobina glicosilada")
        .unwrap();
    assert_eq!(hba1c[1..], ["4.0", "6.0", "%", ".", "5.4"]);

    let color = rows.iter().find(|r| r[0] == "Orina.Color").unwrap();
    assert_eq!(color[1..], ["", "", "Amarillo", "Amarillo", "Amarillo"]);
}

#[test]
fn report_highlights_out_of_range_values() {
    let (out, _) = load_and_run(&[MARCH_2023, JANUARY_2024]);
    let report = build_report(&out.table, &ReportOptions::default());

    let flagged: Vec<(&str, &str)> = report
        .rows
        .iter()
        .flat_map(|row| {
            row[4..]
                .iter()
                .filter(|c| c.emphasis)
                .map(move |c| (row[0].text.as_str(), c.text.as_str()))
        })
        .collect();

    assert_eq!(
        flagged,
        vec![("Sangre.Triglicéridos", "160"), ("Sangre.Urea", "48")]
    );
}

#[test]
fn conflicting_range_disables_highlighting() {
    let (out, _) = load_and_run(&[MARCH_2023, JANUARY_2024, JUNE_2024]);
    let report = build_report(&out.table, &ReportOptions::default());

    let glucosa = report
        .rows
        .iter()
        .find(|r| r[0].text == "Sangre.Glucosa")
        .unwrap();
    assert_eq!(glucosa[1].text, "## MULTIPLE ##");
    assert_eq!(glucosa[2].text, "## MULTIPLE ##");
    assert_eq!(glucosa[3].text, "## MULTIPLE ##");
    assert!(glucosa.iter().all(|c| !c.emphasis));
}

#[test]
fn rerun_is_identical() {
    let (first, _) = load_and_run(&[MARCH_2023, JANUARY_2024, JUNE_2024]);
    let (second, _) = load_and_run(&[MARCH_2023, JANUARY_2024, JUNE_2024]);
    let options = ReportOptions::default();
    assert_eq!(
        build_report(&first.table, &options),
        build_report(&second.table, &options)
    );
}
