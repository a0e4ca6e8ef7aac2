use anyhow::Result;
use std::io::Write;

use crate::config::OutputFormat;
use crate::report::{BuildRow, ChartSet, ReportSection, RESULT_FAILED, RESULT_SUCCEEDED};

use super::pdf::write_pdf;
use super::summary::render_summary;

/// Writes the assembled report in the requested format.
///
/// - PDF: paginated document, the default deliverable
/// - HTML: self-contained page with tables and CSS bar charts
/// - JSON: the section list as data
/// - Summary: terminal rendition
pub fn export_report(
    sections: &[ReportSection],
    format: OutputFormat,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Pdf => write_pdf(sections, output)?,
        OutputFormat::Html => export_html(sections, output)?,
        OutputFormat::Json => export_json(sections, pretty, output)?,
        OutputFormat::Summary => write!(output, "{}", render_summary(sections))?,
    }
    Ok(())
}

fn export_json(sections: &[ReportSection], pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(sections)?
    } else {
        serde_json::to_string(sections)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn result_class(result: &str) -> &'static str {
    match result {
        RESULT_SUCCEEDED => "good",
        "partiallySucceeded" => "warning",
        RESULT_FAILED => "bad",
        _ => "",
    }
}

fn export_html(sections: &[ReportSection], output: &mut dyn Write) -> Result<()> {
    writeln!(output, "<!DOCTYPE html>")?;
    writeln!(output, "<html lang=\"en\">")?;
    writeln!(output, "<head>")?;
    writeln!(output, "    <meta charset=\"UTF-8\">")?;
    writeln!(output, "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">")?;
    writeln!(output, "    <title>ADO Builds Report</title>")?;
    writeln!(output, "    <style>")?;
    writeln!(output, "        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 40px; background: #f5f5f5; }}")?;
    writeln!(output, "        .container {{ max-width: 1400px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}")?;
    writeln!(output, "        h1 {{ color: #2c3e50; border-bottom: 3px solid #2980b9; padding-bottom: 10px; }}")?;
    writeln!(output, "        h2 {{ color: #34495e; margin-top: 30px; }}")?;
    writeln!(output, "        .cover {{ background: #ecf0f1; padding: 20px; border-radius: 5px; margin: 20px 0; }}")?;
    writeln!(output, "        table {{ width: 100%; border-collapse: collapse; margin: 20px 0; font-size: 13px; }}")?;
    writeln!(output, "        th, td {{ padding: 8px; text-align: left; border-bottom: 1px solid #ddd; }}")?;
    writeln!(output, "        th {{ background: #2980b9; color: white; }}")?;
    writeln!(output, "        tr:nth-child(even) {{ background: #f8f9fa; }}")?;
    writeln!(output, "        .charts {{ display: grid; grid-template-columns: repeat(2, 1fr); gap: 16px; }}")?;
    writeln!(output, "        .chart {{ border: 1px solid #ddd; border-radius: 5px; padding: 12px; }}")?;
    writeln!(output, "        .chart h3 {{ margin: 0 0 8px 0; font-size: 15px; }}")?;
    writeln!(output, "        .bar {{ background: #3498db; height: 12px; display: inline-block; }}")?;
    writeln!(output, "        .good {{ color: #27ae60; }}")?;
    writeln!(output, "        .warning {{ color: #f39c12; }}")?;
    writeln!(output, "        .bad {{ color: #e74c3c; }}")?;
    writeln!(output, "    </style>")?;
    writeln!(output, "</head>")?;
    writeln!(output, "<body>")?;
    writeln!(output, "    <div class=\"container\">")?;

    for section in sections {
        match section {
            ReportSection::Cover {
                generated_at_display,
                window_hours,
                ..
            } => {
                writeln!(output, "        <h1>ADO Builds Report</h1>")?;
                writeln!(output, "        <div class=\"cover\">")?;
                writeln!(output, "            <p><strong>Window:</strong> last {window_hours} hours</p>")?;
                writeln!(output, "            <p><strong>Time of report:</strong> {}</p>", escape_html(generated_at_display))?;
                writeln!(output, "        </div>")?;
            }
            ReportSection::PipelineTable {
                pipeline_name,
                rows,
            } => html_table(pipeline_name, rows, output)?,
            ReportSection::PipelineCharts {
                pipeline_name,
                charts,
            } => html_charts(&format!("Analytics: {pipeline_name}"), charts, output)?,
            ReportSection::AggregateCharts { charts } => {
                html_charts("Aggregate Analytics (All Pipelines)", charts, output)?;
            }
            ReportSection::Summary {
                total,
                succeeded,
                failed,
            } => {
                writeln!(output, "        <h2>Summary</h2>")?;
                writeln!(output, "        <p><strong>Total builds:</strong> {total}</p>")?;
                writeln!(output, "        <p><strong>Succeeded:</strong> <span class=\"good\">{succeeded}</span></p>")?;
                writeln!(output, "        <p><strong>Failed:</strong> <span class=\"bad\">{failed}</span></p>")?;
            }
        }
    }

    writeln!(output, "        <footer style=\"margin-top: 40px; padding-top: 20px; border-top: 1px solid #ddd; color: #666; text-align: center;\">")?;
    writeln!(output, "            <p>Report generated by ado-report v{}</p>", env!("CARGO_PKG_VERSION"))?;
    writeln!(output, "        </footer>")?;
    writeln!(output, "    </div>")?;
    writeln!(output, "</body>")?;
    writeln!(output, "</html>")?;

    Ok(())
}

fn html_table(pipeline_name: &str, rows: &[BuildRow], output: &mut dyn Write) -> Result<()> {
    writeln!(output, "        <h2>Pipeline: {}</h2>", escape_html(pipeline_name))?;
    writeln!(output, "        <table>")?;
    writeln!(output, "            <thead>")?;
    writeln!(output, "                <tr>")?;
    for header in BuildRow::HEADERS {
        writeln!(output, "                    <th>{header}</th>")?;
    }
    writeln!(output, "                </tr>")?;
    writeln!(output, "            </thead>")?;
    writeln!(output, "            <tbody>")?;

    for row in rows {
        writeln!(output, "                <tr>")?;
        for (index, cell) in row.cells().into_iter().enumerate() {
            let text = escape_html(cell);
            match (index, &row.link) {
                (0, Some(link)) => writeln!(
                    output,
                    "                    <td><a href=\"{}\">{text}</a></td>",
                    escape_html(link)
                )?,
                (2, _) => writeln!(
                    output,
                    "                    <td class=\"{}\">{text}</td>",
                    result_class(cell)
                )?,
                _ => writeln!(output, "                    <td>{text}</td>")?,
            }
        }
        writeln!(output, "                </tr>")?;
    }
    writeln!(output, "            </tbody>")?;
    writeln!(output, "        </table>")?;
    Ok(())
}

fn html_charts(heading: &str, set: &ChartSet, output: &mut dyn Write) -> Result<()> {
    writeln!(output, "        <h2>{}</h2>", escape_html(heading))?;
    writeln!(output, "        <p><strong>Total builds:</strong> {}</p>", set.total)?;
    writeln!(output, "        <div class=\"charts\">")?;

    for chart in &set.charts {
        writeln!(output, "            <div class=\"chart\">")?;
        writeln!(output, "                <h3>{}</h3>", escape_html(&chart.title))?;
        if chart.buckets.is_empty() {
            writeln!(output, "                <p>No data</p>")?;
        }
        let max = chart.buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        for bucket in &chart.buckets {
            #[allow(clippy::cast_precision_loss)]
            let width = bucket.count as f64 / max as f64 * 100.0;
            writeln!(
                output,
                "                <div>{} ({}) <span class=\"bar\" style=\"width: {width:.0}px\"></span></div>",
                escape_html(&bucket.name),
                bucket.count
            )?;
        }
        writeln!(output, "            </div>")?;
    }

    if !set.pull_requests.is_empty() {
        writeln!(output, "            <div class=\"chart\">")?;
        writeln!(output, "                <h3>PR Build Results</h3>")?;
        writeln!(output, "                <ul>")?;
        for pr in &set.pull_requests {
            writeln!(
                output,
                "                    <li><strong>{}</strong>: {} <span class=\"{}\">{}</span> ({})</li>",
                escape_html(&pr.sender),
                escape_html(&pr.title),
                result_class(&pr.result),
                escape_html(&pr.result),
                escape_html(&pr.status)
            )?;
        }
        writeln!(output, "                </ul>")?;
        writeln!(output, "            </div>")?;
    }

    writeln!(output, "        </div>")?;
    Ok(())
}
