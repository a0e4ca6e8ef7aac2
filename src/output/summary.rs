use std::fmt::Write;

use comfy_table::Cell;

use crate::report::{BuildRow, ChartSet, ReportSection};

use super::styling::{heading, label, toned, value, Tone};
use super::tables::{
    color_coded_result_cell, color_coded_success_cell, create_cyan_header, create_table, share_bar,
};

/// Prints a human-readable rendition of the report to stdout.
///
/// Shows the report header, one table per pipeline, the category breakdowns
/// of every chart set and the closing summary counts.
pub fn print_summary(sections: &[ReportSection]) {
    println!("{}", render_summary(sections));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{emoji} {}", heading(title));
}

#[allow(clippy::cast_precision_loss)]
fn success_rate(succeeded: usize, total: usize) -> f64 {
    if total > 0 {
        (succeeded as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

fn render_cover(output: &mut String, generated_at: &str, window_hours: u32) {
    add_section_header(output, "📋", "ADO Builds Report");
    let _ = writeln!(
        output,
        "{} {}",
        label("Window:"),
        value(format!("last {window_hours} hours"))
    );
    let _ = writeln!(output, "{} {}\n", label("Generated:"), value(generated_at));
}

fn render_pipeline_table(output: &mut String, pipeline_name: &str, rows: &[BuildRow]) {
    add_section_header(output, "🔧", &format!("Pipeline: {pipeline_name}"));

    let mut table = create_table();
    table.set_header(create_cyan_header(&[
        "Build #",
        "Result",
        "Reason",
        "Finish Time",
        "Build Duration",
        "Requested By",
    ]));
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.build_number),
            color_coded_result_cell(&row.result),
            Cell::new(&row.reason),
            Cell::new(&row.finish_time),
            Cell::new(&row.build_duration),
            Cell::new(&row.requested_by),
        ]);
    }
    let _ = writeln!(output, "{table}\n");
}

fn render_chart_set(output: &mut String, heading: &str, set: &ChartSet) {
    add_section_header(output, "📊", heading);
    let _ = writeln!(output, "{} {}", label("Total builds:"), value(set.total));

    for chart in &set.charts {
        let mut table = create_table();
        table.set_header(create_cyan_header(&[chart.title.as_str(), "Count", ""]));
        if chart.buckets.is_empty() {
            table.add_row(vec![Cell::new(label("No data")), Cell::new(""), Cell::new("")]);
        }
        let max = chart.buckets.iter().map(|b| b.count).max().unwrap_or(0);
        for bucket in &chart.buckets {
            table.add_row(vec![
                Cell::new(&bucket.name),
                Cell::new(bucket.count),
                Cell::new(share_bar(bucket.count, max)),
            ]);
        }
        let _ = writeln!(output, "{table}");
    }

    if !set.pull_requests.is_empty() {
        let mut table = create_table();
        table.set_header(create_cyan_header(&["PR Sender", "PR Title", "Result", "Status"]));
        for pr in &set.pull_requests {
            table.add_row(vec![
                Cell::new(&pr.sender),
                Cell::new(&pr.title),
                color_coded_result_cell(&pr.result),
                Cell::new(&pr.status),
            ]);
        }
        let _ = writeln!(output, "{table}");
    }
    output.push('\n');
}

fn render_totals(output: &mut String, total: usize, succeeded: usize, failed: usize) {
    add_section_header(output, "✅", "Summary");

    let mut table = create_table();
    table.set_header(create_cyan_header(&[
        "Total Builds",
        "Succeeded",
        "Failed",
        "Success Rate",
    ]));
    table.add_row(vec![
        Cell::new(total),
        Cell::new(succeeded),
        Cell::new(failed),
        color_coded_success_cell(success_rate(succeeded, total)),
    ]);
    let _ = writeln!(output, "{table}");

    if total == 0 {
        let note = toned("No builds finished in the window.", Tone::Warning);
        let _ = writeln!(output, "{note}");
    } else if failed == 0 {
        let _ = writeln!(output, "{}", toned("No failed builds.", Tone::Good));
    } else {
        let _ = writeln!(
            output,
            "{}",
            toned(format!("{failed} failed build(s) need attention."), Tone::Bad)
        );
    }
}

/// Renders the report sections as terminal text.
pub fn render_summary(sections: &[ReportSection]) -> String {
    let mut output = String::new();

    for section in sections {
        match section {
            ReportSection::Cover {
                generated_at_display,
                window_hours,
                ..
            } => render_cover(&mut output, generated_at_display, *window_hours),
            ReportSection::PipelineTable {
                pipeline_name,
                rows,
            } => render_pipeline_table(&mut output, pipeline_name, rows),
            ReportSection::PipelineCharts {
                pipeline_name,
                charts,
            } => render_chart_set(&mut output, &format!("Analytics: {pipeline_name}"), charts),
            ReportSection::AggregateCharts { charts } => {
                render_chart_set(&mut output, "Aggregate Analytics (All Pipelines)", charts);
            }
            ReportSection::Summary {
                total,
                succeeded,
                failed,
            } => render_totals(&mut output, *total, *succeeded, *failed),
        }
    }

    output
}
