use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::RunResult;

/// Maximum data quality issues listed individually.
const ISSUE_DISPLAY_LIMIT: usize = 20;

pub fn print_summary(result: &RunResult) {
    println!("Database: {}", result.database);
    if result.dry_run {
        println!("Dry run: shaping only, nothing was loaded");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Relation"),
        header_cell("Derived"),
        header_cell("Loaded"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);

    let mut total_derived = 0usize;
    for (name, derived) in &result.derived {
        total_derived += derived;
        let (loaded_cell, status_cell) = match &result.report {
            None => (dim_cell("-"), dim_cell("-")),
            Some(report) => match report.rows_for(name) {
                Some(rows) => (
                    Cell::new(rows),
                    Cell::new("ok").fg(Color::Green).add_attribute(Attribute::Bold),
                ),
                None => (
                    dim_cell("-"),
                    Cell::new("failed")
                        .fg(Color::Red)
                        .add_attribute(Attribute::Bold),
                ),
            },
        };
        table.add_row(vec![
            Cell::new(name).fg(Color::Blue),
            Cell::new(derived),
            loaded_cell,
            status_cell,
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_derived).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");

    if let Some(report) = &result.report
        && !report.fk_violations.is_empty()
    {
        println!();
        println!("Foreign key violations:");
        for violation in &report.fk_violations {
            println!(
                "- {} row(s) in {} reference missing {} row(s)",
                violation.rows, violation.table, violation.referenced_table
            );
        }
    }

    if !result.issues.is_empty() {
        println!();
        println!("Data quality issues ({}):", result.issues.len());
        for issue in result.issues.iter().take(ISSUE_DISPLAY_LIMIT) {
            println!("- {issue}");
        }
        if result.issues.len() > ISSUE_DISPLAY_LIMIT {
            println!("  ... and {} more", result.issues.len() - ISSUE_DISPLAY_LIMIT);
        }
    }

    if !result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {error}");
        }
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
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
