use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use reclaim_model::{BatchMetrics, EscalationReason, IssueCode};

use crate::types::RunResult;

pub fn print_summary(result: &RunResult) {
    let output = &result.output;
    println!("Input: {}", result.input.display());
    match &result.written {
        Some(written) => println!("Output: {}", written.dir.display()),
        None => println!("Output: (dry run, nothing written)"),
    }
    println!("Schema: {}", output.schema_fingerprint);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Batch"),
        header_cell("Records"),
        header_cell("Clean"),
        header_cell("Quarantined"),
        header_cell("Escalated"),
        header_cell("Retries"),
        header_cell("Error rate"),
        header_cell("Flags"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for batch in &output.batches {
        table.add_row(vec![
            Cell::new(&batch.batch_id).fg(Color::Blue),
            Cell::new(batch.total),
            Cell::new(batch.clean),
            count_cell(batch.quarantined, Color::Yellow),
            count_cell(batch.escalated, Color::Red),
            count_cell(batch.retries, Color::Yellow),
            rate_cell(batch.error_rate),
            flags_cell(batch),
        ]);
    }
    let summary = &output.summary;
    let retries: u64 = output.batches.iter().map(|b| b.retries).sum();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.total).add_attribute(Attribute::Bold),
        Cell::new(summary.clean).add_attribute(Attribute::Bold),
        count_cell(summary.quarantined, Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(summary.escalated, Color::Red).add_attribute(Attribute::Bold),
        count_cell(retries, Color::Yellow).add_attribute(Attribute::Bold),
        Cell::new(format!("{:.1}% ok", summary.success_rate)).add_attribute(Attribute::Bold),
        dim_cell(format!(
            "{} ms, {:.0} rec/s",
            summary.elapsed_ms, summary.records_per_second
        )),
    ]);
    println!("{table}");
    print_issue_table(result);
    print_escalation_table(result);
}

fn print_issue_table(result: &RunResult) {
    let mut tally: BTreeMap<IssueCode, (usize, usize)> = BTreeMap::new();
    for entry in &result.output.issues {
        let counts = tally.entry(entry.code).or_default();
        counts.0 += 1;
        if entry.blocking {
            counts.1 += 1;
        }
    }
    if tally.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Issue"),
        header_cell("Count"),
        header_cell("Blocking"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for (code, (count, blocking)) in tally {
        table.add_row(vec![
            Cell::new(code.as_str()),
            Cell::new(count).fg(Color::Yellow),
            count_cell(blocking, Color::Red),
        ]);
    }
    println!();
    println!("Issues:");
    println!("{table}");
}

fn print_escalation_table(result: &RunResult) {
    let mut tally: BTreeMap<&'static str, (EscalationReason, usize)> = BTreeMap::new();
    for verdict in &result.output.escalated {
        if let Some(reason) = verdict.escalation {
            tally.entry(reason.as_str()).or_insert((reason, 0)).1 += 1;
        }
    }
    if tally.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Escalation"),
        header_cell("Records"),
        header_cell("Suggested actions"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, (reason, count)) in tally {
        table.add_row(vec![
            Cell::new(label).fg(Color::Red),
            Cell::new(count).add_attribute(Attribute::Bold),
            Cell::new(reason.suggested_actions().join("\n")),
        ]);
    }
    println!();
    println!("Escalations:");
    println!("{table}");
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
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn flags_cell(batch: &BatchMetrics) -> Cell {
    let mut flags = Vec::new();
    if batch.circuit_tripped {
        flags.push("circuit open");
    }
    if batch.threshold_breached {
        flags.push("threshold");
    }
    if batch.timed_out {
        flags.push("timed out");
    }
    if flags.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(flags.join(", "))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    }
}

fn rate_cell(rate: f64) -> Cell {
    let text = format!("{:.1}%", rate * 100.0);
    if rate > 0.0 {
        Cell::new(text).fg(Color::Yellow)
    } else {
        dim_cell(text)
    }
}

fn count_cell<T: ToString + PartialOrd + Default>(count: T, color: Color) -> Cell {
    if count > T::default() {
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
