// CSV report export

use std::path::Path;

use labmerge_recon::Report;

use crate::commit::commit_with;

/// Write the report as comma-separated text: header row, then one row per
/// parameter, CRLF-terminated.
pub fn write_report(report: &Report, path: &Path) -> Result<(), String> {
    commit_with(path, |part| export_rows(report, part))
}

fn export_rows(report: &Report, path: &Path) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .terminator(csv::Terminator::CRLF)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    for row in report.text_rows() {
        writer.write_record(&row).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
