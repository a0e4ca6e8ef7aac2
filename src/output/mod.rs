mod exports;
mod pdf;
mod progress;
mod styling;
mod summary;
mod tables;

use chrono::NaiveDate;

use crate::config::OutputFormat;

use styling::{banner_title, label};

pub use exports::export_report;
pub use progress::PhaseProgress;
pub use summary::print_summary;

const REPORT_STEM: &str = "ADO_Builds_Report";

/// Prints the ado-report banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        banner_title("📋 ADO Report"),
        label(env!("CARGO_PKG_VERSION")),
        label("Azure DevOps Builds Report")
    );
}

/// Default file name of a written report, e.g. `ADO_Builds_Report_2024-03-02.pdf`.
///
/// Without a date the name is `ADO_Builds_Report.<ext>`. Terminal-only
/// formats have no file name.
pub fn report_filename(format: OutputFormat, date: Option<NaiveDate>) -> Option<String> {
    let extension = format.extension()?;
    Some(match date {
        Some(date) => format!("{REPORT_STEM}_{}.{extension}", date.format("%Y-%m-%d")),
        None => format!("{REPORT_STEM}.{extension}"),
    })
}
