use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use cleanse_cli::CleanResult;
use cleanse_model::{Category, Severity, SeverityCounts};

pub fn print_summary(results: &[CleanResult]) {
    for result in results {
        println!("{}: {}", result.entity.label(), result.output_path.display());
        for path in &result.report_paths {
            println!("  Report: {}", path.display());
        }
        if let Some(path) = &result.manifest_path {
            println!("  Manifest: {}", path.display());
        }
    }
    println!("{}", entity_table(results));

    let categories = merged_categories(results);
    if !categories.is_empty() {
        println!();
        println!("Observations:");
        println!("{}", category_table(&categories));
    }
}

fn entity_table(results: &[CleanResult]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Records"),
        header_cell("Valid"),
        header_cell("Errors"),
        header_cell("Warnings"),
        header_cell("Info"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 6, CellAlignment::Center);

    let mut totals = SeverityCounts::default();
    let mut total_records = 0usize;
    let mut total_valid = 0usize;
    for result in results {
        total_records += result.record_count;
        total_valid += result.valid_count;
        totals.info += result.counts.info;
        totals.warning += result.counts.warning;
        totals.error += result.counts.error;
        table.add_row(vec![
            Cell::new(result.entity.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(result.record_count),
            Cell::new(result.valid_count),
            count_cell(result.counts.error, Severity::Error),
            count_cell(result.counts.warning, Severity::Warning),
            count_cell(result.counts.info, Severity::Info),
            status_cell(result.success),
        ]);
    }
    if results.len() > 1 {
        table.add_row(vec![
            Cell::new("TOTAL")
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new(total_records).add_attribute(Attribute::Bold),
            Cell::new(total_valid).add_attribute(Attribute::Bold),
            count_cell(totals.error, Severity::Error).add_attribute(Attribute::Bold),
            count_cell(totals.warning, Severity::Warning).add_attribute(Attribute::Bold),
            count_cell(totals.info, Severity::Info).add_attribute(Attribute::Bold),
            dim_cell("-"),
        ]);
    }
    table
}

fn merged_categories(results: &[CleanResult]) -> BTreeMap<Category, SeverityCounts> {
    let mut merged: BTreeMap<Category, SeverityCounts> = BTreeMap::new();
    for result in results {
        for (category, counts) in &result.counts_by_category {
            let entry = merged.entry(*category).or_default();
            entry.info += counts.info;
            entry.warning += counts.warning;
            entry.error += counts.error;
        }
    }
    merged
}

fn category_table(categories: &BTreeMap<Category, SeverityCounts>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Errors"),
        header_cell("Warnings"),
        header_cell("Info"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (category, counts) in categories {
        table.add_row(vec![
            Cell::new(category.label()),
            count_cell(counts.error, Severity::Error),
            count_cell(counts.warning, Severity::Warning),
            count_cell(counts.info, Severity::Info),
        ]);
    }
    table
}

fn count_cell(count: usize, severity: Severity) -> Cell {
    if count == 0 {
        return dim_cell(count);
    }
    Cell::new(count)
        .fg(severity_color(severity))
        .add_attribute(Attribute::Bold)
}

fn status_cell(success: bool) -> Cell {
    if success {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("FAILED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Blue,
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
