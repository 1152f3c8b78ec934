use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rpt_cli::commands::{CheckReport, PreviewReport, StepReport};
use rpt_validate::FailureRecord;

/// Failing rows listed before the table is cut off.
const MAX_LISTED_FAILURES: usize = 50;

pub fn print_step(report: &StepReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Input"),
        header_cell("Output"),
        header_cell("Rows in"),
        header_cell("Rows out"),
        header_cell("Columns"),
        header_cell("Changed"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 3..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(report.step)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(report.input.display()),
        Cell::new(report.output.display()),
        Cell::new(report.rows_in),
        row_delta_cell(report.rows_in, report.rows_out),
        Cell::new(report.columns),
        match report.changed {
            Some(count) => count_cell(count, Color::Yellow),
            None => dim_cell("-"),
        },
    ]);
    println!("{table}");
}

pub fn print_preview(report: &PreviewReport) {
    println!("Input: {}", report.input.display());
    println!("Rows: {}", report.rows);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Nulls"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for column in &report.columns {
        table.add_row(vec![
            Cell::new(&column.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            dim_cell(&column.dtype),
            count_cell(column.nulls, Color::Yellow),
        ]);
    }
    println!("{table}");
    println!();
    println!("{}", report.head);
}

pub fn print_check(report: &CheckReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Check"),
        header_cell("Rows"),
        header_cell("Failures"),
        header_cell("Result"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    table.add_row(vec![
        Cell::new(report.check)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(report.rows),
        count_cell(report.failures.len(), Color::Red),
        if report.passed() {
            Cell::new("PASS")
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new("FAIL")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold)
        },
    ]);
    println!("{table}");
    if let Some(path) = &report.output {
        println!("Failures written to: {}", path.display());
    }
    print_failure_table(&report.failures);
}

fn print_failure_table(failures: &[FailureRecord]) {
    if failures.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Check"),
        header_cell("Message"),
        header_cell("Fields"),
    ]);
    apply_failure_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, failure) in failures.iter().take(MAX_LISTED_FAILURES).enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(&failure.check),
            Cell::new(&failure.message),
            Cell::new(render_fields(failure)),
        ]);
    }
    println!();
    println!("Failures:");
    println!("{table}");
    if failures.len() > MAX_LISTED_FAILURES {
        println!("... and {} more", failures.len() - MAX_LISTED_FAILURES);
    }
}

fn render_fields(failure: &FailureRecord) -> String {
    failure
        .fields
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_failure_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn row_delta_cell(rows_in: usize, rows_out: usize) -> Cell {
    match rows_out.cmp(&rows_in) {
        std::cmp::Ordering::Equal => Cell::new(rows_out),
        std::cmp::Ordering::Greater => Cell::new(rows_out).fg(Color::Green),
        std::cmp::Ordering::Less => Cell::new(rows_out).fg(Color::Yellow),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
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
