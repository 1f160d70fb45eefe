//! XLSX error workbook.
//!
//! Sheet layout:
//!
//! - `Summary`: counts per category and severity
//! - one sheet per non-empty category, one row per observation
//! - `Critical Fields`: uniqueness and required-field observations
//! - `Statistics`: observation types ranked by count
//! - `Original Data`: the input records as read

use cleanse_model::{Observation, Severity, display_value};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use serde_json::Value;

use crate::reports::ReportInput;

/// Longest sheet name a workbook accepts.
const MAX_SHEET_NAME: usize = 31;
/// Longest text a single cell accepts.
const MAX_CELL_TEXT: usize = 32_767;

const ERROR_FILL: u32 = 0xFFC7CE;
const WARNING_FILL: u32 = 0xFFEB9C;
const INFO_FILL: u32 = 0xDDEBF7;

const OBSERVATION_COLUMNS: [&str; 8] = [
    "Severity", "Type", "Entity ID", "Row", "Field", "Original", "New", "Message",
];

/// Workbook-safe sheet name: forbidden characters removed, length capped.
pub fn sheet_name(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .filter(|ch| !matches!(ch, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME)
        .collect();
    let trimmed = cleaned.trim().trim_matches('\'');
    if trimmed.is_empty() {
        "Sheet".to_string()
    } else {
        trimmed.to_string()
    }
}

struct Styles {
    header: Format,
    title: Format,
    error: Format,
    warning: Format,
    info: Format,
}

impl Styles {
    fn new() -> Self {
        let fill = |rgb| Format::new().set_background_color(Color::RGB(rgb));
        Self {
            header: Format::new()
                .set_bold()
                .set_border_bottom(FormatBorder::Thin),
            title: Format::new().set_bold().set_font_size(14),
            error: fill(ERROR_FILL),
            warning: fill(WARNING_FILL),
            info: fill(INFO_FILL),
        }
    }

    fn severity(&self, severity: Severity) -> &Format {
        match severity {
            Severity::Error => &self.error,
            Severity::Warning => &self.warning,
            Severity::Info => &self.info,
        }
    }
}

fn cell_text(text: &str) -> String {
    text.chars().take(MAX_CELL_TEXT).collect()
}

fn write_header(sheet: &mut Worksheet, row: u32, columns: &[&str], styles: &Styles) -> Result<(), XlsxError> {
    for (col, title) in (0u16..).zip(columns) {
        sheet.write_string_with_format(row, col, *title, &styles.header)?;
    }
    Ok(())
}

/// Builds the full workbook in memory.
pub fn render_workbook(input: &ReportInput<'_>) -> Result<Vec<u8>, XlsxError> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();

    workbook.push_worksheet(summary_sheet(input, &styles)?);
    for (category, observations) in input.errors.categories() {
        let sheet = observation_sheet(
            &sheet_name(category.label()),
            observations.iter(),
            false,
            &styles,
        )?;
        workbook.push_worksheet(sheet);
    }
    let critical = input
        .errors
        .iter()
        .filter(|obs| obs.category.is_critical());
    workbook.push_worksheet(observation_sheet("Critical Fields", critical, true, &styles)?);
    workbook.push_worksheet(statistics_sheet(input, &styles)?);
    workbook.push_worksheet(original_data_sheet(input.original, &styles)?);

    workbook.save_to_buffer()
}

fn summary_sheet(input: &ReportInput<'_>, styles: &Styles) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name("Summary")?;
    sheet.write_string_with_format(
        0,
        0,
        format!("{} error report", input.entity.label()),
        &styles.title,
    )?;
    sheet.write_string(1, 0, "Records")?;
    sheet.write_number(1, 1, input.original.len() as f64)?;

    let header_row = 3;
    write_header(
        &mut sheet,
        header_row,
        &["Category", "Error", "Warning", "Info", "Total"],
        styles,
    )?;
    let mut row = header_row + 1;
    for (category, counts) in input.errors.counts_by_category() {
        sheet.write_string(row, 0, category.label())?;
        for (col, severity) in (1u16..).zip(Severity::all()) {
            let count = counts.get(*severity);
            if count > 0 {
                sheet.write_number_with_format(row, col, count as f64, styles.severity(*severity))?;
            } else {
                sheet.write_number(row, col, 0)?;
            }
        }
        sheet.write_number(row, 4, counts.total() as f64)?;
        row += 1;
    }
    let totals = input.errors.counts();
    sheet.write_string_with_format(row, 0, "Total", &styles.header)?;
    for (col, severity) in (1u16..).zip(Severity::all()) {
        sheet.write_number(row, col, totals.get(*severity) as f64)?;
    }
    sheet.write_number(row, 4, totals.total() as f64)?;
    sheet.set_column_width(0, 24)?;
    Ok(sheet)
}

fn observation_sheet<'a>(
    name: &str,
    observations: impl Iterator<Item = &'a Observation>,
    with_category: bool,
    styles: &Styles,
) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(name)?;
    let mut columns: Vec<&str> = Vec::new();
    if with_category {
        columns.push("Category");
    }
    columns.extend(OBSERVATION_COLUMNS);
    write_header(&mut sheet, 0, &columns, styles)?;

    let offset = u16::from(with_category);
    let mut row = 1u32;
    for obs in observations {
        let fill = styles.severity(obs.severity);
        if with_category {
            sheet.write_string_with_format(row, 0, obs.category.label(), fill)?;
        }
        let cells = [
            obs.severity.label().to_string(),
            obs.kind.clone(),
            obs.entity_id.map(|id| id.to_string()).unwrap_or_default(),
            obs.row.map(|row| row.to_string()).unwrap_or_default(),
            obs.field.clone().unwrap_or_default(),
            obs.original.as_ref().map(display_value).unwrap_or_default(),
            obs.new.as_ref().map(display_value).unwrap_or_default(),
            obs.message.clone(),
        ];
        for (col, text) in (offset..).zip(&cells) {
            sheet.write_string_with_format(row, col, cell_text(text), fill)?;
        }
        row += 1;
    }

    let last_col = offset + OBSERVATION_COLUMNS.len() as u16 - 1;
    sheet.set_freeze_panes(1, 0)?;
    if row > 1 {
        sheet.autofilter(0, 0, row - 1, last_col)?;
    }
    sheet.set_column_width(offset + 1, 28)?;
    sheet.set_column_width(offset + 4, 28)?;
    sheet.set_column_width(last_col, 60)?;
    Ok(sheet)
}

fn statistics_sheet(input: &ReportInput<'_>, styles: &Styles) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name("Statistics")?;
    write_header(&mut sheet, 0, &["Type", "Severity", "Count"], styles)?;
    for (row, (kind, severity, count)) in (1u32..).zip(input.errors.counts_by_kind()) {
        let fill = styles.severity(severity);
        sheet.write_string_with_format(row, 0, kind, fill)?;
        sheet.write_string_with_format(row, 1, severity.label(), fill)?;
        sheet.write_number_with_format(row, 2, count as f64, fill)?;
    }
    sheet.set_column_width(0, 32)?;
    Ok(sheet)
}

/// Input records as read: one column per field in first-seen order, plus a
/// raw column when some elements were not objects.
fn original_data_sheet(original: &[Value], styles: &Styles) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name("Original Data")?;

    let mut fields: Vec<&str> = Vec::new();
    let mut has_raw = false;
    for value in original {
        match value {
            Value::Object(map) => {
                for key in map.keys() {
                    if !fields.contains(&key.as_str()) {
                        fields.push(key);
                    }
                }
            }
            _ => has_raw = true,
        }
    }

    let mut columns = vec!["Row"];
    columns.extend(fields.iter().copied());
    if has_raw {
        columns.push("(raw value)");
    }
    write_header(&mut sheet, 0, &columns, styles)?;

    let raw_col = fields.len() as u16 + 1;
    for (row, (position, value)) in (1u32..).zip(original.iter().enumerate()) {
        sheet.write_number(row, 0, position as f64)?;
        match value {
            Value::Object(map) => {
                for (col, field) in (1u16..).zip(&fields) {
                    if let Some(cell) = map.get(*field) {
                        sheet.write_string(row, col, cell_text(&display_value(cell)))?;
                    }
                }
            }
            other => {
                sheet.write_string(row, raw_col, cell_text(&other.to_string()))?;
            }
        }
    }
    sheet.set_freeze_panes(1, 1)?;
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_are_workbook_safe() {
        assert_eq!(sheet_name("Required Fields"), "Required Fields");
        assert_eq!(sheet_name("a/b[c]:d*e?f\\g"), "abcdefg");
        let long = "Very long category label that exceeds the limit";
        assert_eq!(sheet_name(long).chars().count(), MAX_SHEET_NAME);
        assert_eq!(sheet_name("[]"), "Sheet");
    }

    #[test]
    fn long_cells_are_capped() {
        let text = "x".repeat(MAX_CELL_TEXT + 10);
        assert_eq!(cell_text(&text).len(), MAX_CELL_TEXT);
    }
}
