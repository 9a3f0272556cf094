use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use mch_cli::config::RunConfig;
use mch_cli::types::{RunSummary, StageSummary};
use mch_core::ReconcileIssue;
use mch_model::redact;

pub fn print_summary(config: &RunConfig, result: &RunSummary) {
    println!("Datasets: {}", config.datasets.root().display());
    println!("Survey date: {}", config.date);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Collection"),
        header_cell("Rows"),
        header_cell("Duplicates"),
        header_cell("Skipped"),
        header_cell("Excluded"),
        header_cell("Degraded"),
        header_cell("Inserted"),
        header_cell("Updated"),
        header_cell("Unchanged"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..10 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for stage in &result.stages {
        table.add_row(vec![
            Cell::new(stage.stage)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(stage.collection),
            Cell::new(stage.rows_read),
            count_cell(stage.duplicates, Color::Yellow),
            count_cell(stage.skipped, Color::Yellow),
            count_cell(stage.excluded.len(), Color::Red),
            count_cell(stage.degraded.len(), Color::Yellow),
            Cell::new(stage.upserts.inserted),
            Cell::new(stage.upserts.updated),
            dim_cell(stage.upserts.unchanged),
        ]);
    }
    println!("{table}");
    print_issue_table(result);
}

/// Lists excluded and degraded patients; contacts follow the `--log-data` setting.
fn print_issue_table(result: &RunSummary) {
    let rows: Vec<(&StageSummary, &ReconcileIssue, bool)> = result
        .stages
        .iter()
        .flat_map(|stage| {
            let excluded = stage.excluded.iter().map(move |issue| (stage, issue, true));
            let degraded = stage.degraded.iter().map(move |issue| (stage, issue, false));
            excluded.chain(degraded)
        })
        .collect();
    if rows.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Contact"),
        header_cell("Outcome"),
        header_cell("Reason"),
    ]);
    apply_summary_table_style(&mut table);
    for (stage, issue, excluded) in rows {
        let outcome = if excluded {
            Cell::new("EXCLUDED").fg(Color::Red)
        } else {
            Cell::new("DEGRADED").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(stage.stage),
            Cell::new(redact(issue.mobile.as_str())),
            outcome,
            Cell::new(issue.error.to_string()),
        ]);
    }
    println!("{table}");
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
