// Excel report export (xlsx only)
//
// One worksheet, bold frozen header row. Cells that parse as numbers are
// stored as numbers; out-of-range values get a red font.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, Workbook as XlsxWorkbook, Worksheet};

use labmerge_recon::report::ReportCell;
use labmerge_recon::Report;

use crate::commit::commit_with;

pub const SHEET_NAME: &str = "Results";

/// Column widths are clamped to this range (Excel character units).
const MIN_COL_WIDTH: f64 = 8.0;
const MAX_COL_WIDTH: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellStyle {
    Plain,
    Emphasis,
}

fn style_for(cell: &ReportCell) -> CellStyle {
    if cell.emphasis {
        CellStyle::Emphasis
    } else {
        CellStyle::Plain
    }
}

struct Formats {
    header: Format,
    plain: Format,
    emphasis: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            plain: Format::new(),
            emphasis: Format::new().set_font_color(Color::Red),
        }
    }

    fn get(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::Plain => &self.plain,
            CellStyle::Emphasis => &self.emphasis,
        }
    }
}

/// Write the report as a single-sheet workbook.
pub fn write_report(report: &Report, path: &Path) -> Result<(), String> {
    commit_with(path, |part| export(report, part))
}

fn export(report: &Report, path: &Path) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();
    let formats = Formats::new();

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| format!("Failed to create sheet '{}': {}", SHEET_NAME, e))?;

    for (col, header) in report.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &formats.header)
            .map_err(|e| format!("Failed to write header ({}): {}", col, e))?;
    }

    for (row_idx, row) in report.rows.iter().enumerate() {
        let row32 = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            write_cell(worksheet, row32, col as u16, cell, formats.get(style_for(cell)))?;
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("Failed to set freeze panes: {}", e))?;
    apply_column_widths(worksheet, report)?;

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &ReportCell,
    format: &Format,
) -> Result<(), String> {
    let result = match cell.number {
        Some(n) => worksheet.write_number_with_format(row, col, n, format).map(|_| ()),
        // Absent min/max/units stay blank
        None if cell.text.is_empty() => Ok(()),
        None => worksheet
            .write_string_with_format(row, col, &cell.text, format)
            .map(|_| ()),
    };
    result.map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))
}

fn apply_column_widths(worksheet: &mut Worksheet, report: &Report) -> Result<(), String> {
    for col in 0..report.column_count() {
        let longest = report
            .rows
            .iter()
            .filter_map(|row| row.get(col))
            .map(|cell| cell.text.chars().count())
            .chain(std::iter::once(report.headers[col].chars().count()))
            .max()
            .unwrap_or(0);
        let width = (longest as f64 + 1.0).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH);
        worksheet
            .set_column_width(col as u16, width)
            .map_err(|e| format!("Failed to set column {} width: {}", col, e))?;
    }
    Ok(())
}
